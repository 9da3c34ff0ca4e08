//! Wi-Fi Rate-vs-Range workbook comparison.
//!
//! The library half holds everything that does not draw pixels: workbook
//! extraction ([`data`]), the report tree ([`catalog`]), the comparison
//! session ([`state`]) and CSV export ([`export`]). The `rvr-compare` binary
//! renders it with egui.

pub mod catalog;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod state;
