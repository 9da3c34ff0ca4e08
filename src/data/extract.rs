//! Sheet selection, header discovery and per-row point extraction.

use crate::error::SheetError;

use super::band::determine_band;
use super::columns::ColumnIndexMap;
use super::model::{CellValue, DataPoint, Perspective, RawRow, UNKNOWN};
use super::workbook::Sheet;

/// Points pulled from one data sheet, before grouping.
#[derive(Debug, Clone, Default)]
pub struct SheetExtraction {
    pub sheet_name: String,
    pub points: Vec<DataPoint>,
    /// Rows dropped by the channel-0 / throughput-0 rule.
    pub skipped: usize,
}

/// Data sheets are the ones named like "Rate vs Range ...".
pub fn is_rvr_sheet(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("rate") && lower.contains("range")
}

/// Index of the first row with an `Attenuation` cell and a `throughput` cell.
///
/// `Attenuation` is matched case-sensitively while `throughput` is not;
/// report generators in the field rely on exactly this pairing.
pub fn find_header_row(rows: &[RawRow]) -> Option<usize> {
    rows.iter().position(|row| {
        let texts: Vec<String> = row.iter().filter_map(CellValue::as_text).collect();
        texts.iter().any(|t| t.contains("Attenuation"))
            && texts.iter().any(|t| t.to_lowercase().contains("throughput"))
    })
}

/// Extract every valid point of a data sheet.
pub fn extract_points(sheet: &Sheet) -> Result<SheetExtraction, SheetError> {
    let header_idx = find_header_row(&sheet.rows).ok_or(SheetError::MissingHeaderRow)?;
    log::debug!("Found header row at index {header_idx} in '{}'", sheet.name);

    let columns = ColumnIndexMap::resolve(&sheet.rows[header_idx]);
    let (att_idx, tput_idx) = columns.required()?;

    let mut out = SheetExtraction {
        sheet_name: sheet.name.clone(),
        ..Default::default()
    };

    for row in &sheet.rows[header_idx + 1..] {
        let (Some(att_cell), Some(tput_cell)) = (row.get(att_idx), row.get(tput_idx)) else {
            continue;
        };
        if att_cell.is_blank() || tput_cell.is_blank() {
            continue;
        }
        let (Some(attenuation), Some(throughput)) = (parse_number(att_cell), parse_number(tput_cell))
        else {
            continue;
        };

        let channel = numeric_or_zero(row, columns.channel);
        let frequency = numeric_or_zero(row, columns.frequency);

        if channel == 0.0 || throughput == 0.0 {
            log::debug!(
                "Skipping invalid data point: channel={channel}, throughput={throughput}, attenuation={attenuation}"
            );
            out.skipped += 1;
            continue;
        }

        let direction = text_at(row, columns.direction);
        let perspective = Perspective::from_direction(direction.as_deref().unwrap_or(UNKNOWN));
        let phy = columns.phy_columns(perspective);

        let bandwidth = text_at(row, phy.bandwidth).map(strip_commas);
        let nss = text_at(row, phy.nss).map(strip_commas);

        // Without generic columns the measured values stand in for the configured ones.
        let configured_bandwidth = match columns.shared.bandwidth {
            Some(idx) => text_at(row, Some(idx)).map(strip_commas),
            None => bandwidth.clone(),
        };
        let configured_nss = match columns.shared.nss {
            Some(idx) => text_at(row, Some(idx)).map(strip_commas),
            None => nss.clone(),
        };

        out.points.push(DataPoint {
            attenuation,
            throughput,
            channel,
            frequency,
            band: determine_band(frequency),
            direction,
            security: text_at(row, columns.security),
            configured_bandwidth,
            configured_nss,
            bandwidth,
            nss,
            mode: text_at(row, phy.mode),
            mcs: text_at(row, phy.mcs),
        });
    }

    Ok(out)
}

fn text_at(row: &RawRow, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| row.get(i)).and_then(CellValue::as_text)
}

fn numeric_or_zero(row: &RawRow, idx: Option<usize>) -> f64 {
    idx.and_then(|i| row.get(i))
        .and_then(parse_number)
        .unwrap_or(0.0)
}

fn strip_commas(s: String) -> String {
    if s.contains(',') {
        s.replace(',', "")
    } else {
        s
    }
}

/// Numeric value of a dirty cell: thousands separators removed, then the
/// longest leading decimal number (`"1,234 Mbps"` → 1234).
pub fn parse_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(v) if !v.is_nan() => Some(*v),
        CellValue::Empty => None,
        other => parse_leading_float(&other.to_string().replace(',', "")),
    }
}

/// Parse the longest prefix of `s` (after leading whitespace) that forms a
/// decimal floating point literal.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].parse::<f64>().ok();
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}
