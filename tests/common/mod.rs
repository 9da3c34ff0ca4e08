#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use rust_xlsxwriter::Workbook;

pub const RVR_HEADER: [&str; 9] = [
    "Attenuation",
    "Throughput",
    "Direction",
    "Channel",
    "Frequency",
    "BW",
    "NSS",
    "Mode",
    "Security",
];

/// One data row in `RVR_HEADER` order.
pub type Row = (f64, f64, &'static str, f64, f64, f64, f64, &'static str, &'static str);

pub fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("rvr_compare_{}_{}", std::process::id(), name));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p
}

/// An xlsx document with an optional device sheet and one data sheet.
pub fn rvr_xlsx(device: Option<(&str, &str, &str)>, sheet: &str, header: &[&str], rows: &[Row]) -> Vec<u8> {
    let mut wb = Workbook::new();

    if let Some((name, model, version)) = device {
        let ws = wb.add_worksheet().set_name("Device Under Test Information").unwrap();
        ws.write_string(0, 0, "Item").unwrap();
        ws.write_string(0, 1, "Value").unwrap();
        for (r, (k, v)) in [("Name", name), ("Model Number", model), ("Software Version", version)]
            .iter()
            .enumerate()
        {
            ws.write_string(r as u32 + 1, 0, *k).unwrap();
            ws.write_string(r as u32 + 1, 1, *v).unwrap();
        }
    }

    let ws = wb.add_worksheet().set_name(sheet).unwrap();
    ws.write_string(0, 0, "Test Case Description").unwrap();
    for (c, h) in header.iter().enumerate() {
        ws.write_string(2, c as u16, *h).unwrap();
    }
    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 3;
        ws.write_number(r, 0, row.0).unwrap();
        ws.write_number(r, 1, row.1).unwrap();
        ws.write_string(r, 2, row.2).unwrap();
        ws.write_number(r, 3, row.3).unwrap();
        ws.write_number(r, 4, row.4).unwrap();
        ws.write_number(r, 5, row.5).unwrap();
        ws.write_number(r, 6, row.6).unwrap();
        ws.write_string(r, 7, row.7).unwrap();
        ws.write_string(r, 8, row.8).unwrap();
    }

    wb.save_to_buffer().unwrap()
}

/// A two-direction, two-point sweep on channel 36 / 5180 MHz.
pub fn sweep() -> Vec<Row> {
    vec![
        (0.0, 500.0, "DUT-TX", 36.0, 5180.0, 80.0, 2.0, "HE80", "WPA2"),
        (10.0, 300.0, "DUT-TX", 36.0, 5180.0, 80.0, 2.0, "HE80", "WPA2"),
        (0.0, 480.0, "DUT-RX", 36.0, 5180.0, 80.0, 2.0, "HE80", "WPA2"),
        (10.0, 290.0, "DUT-RX", 36.0, 5180.0, 80.0, 2.0, "HE80", "WPA2"),
    ]
}
