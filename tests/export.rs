mod common;

use std::collections::BTreeMap;

use common::{RVR_HEADER, rvr_xlsx, sweep};
use rvr_compare::data::loader::load_bytes;
use rvr_compare::data::model::{Origin, SelectedTest};
use rvr_compare::export::write_comparison_csv;

#[test]
fn csv_round_trip_recovers_rows_and_throughput() {
    let a = load_bytes(
        rvr_xlsx(Some(("Max7", "M7-A", "1.2.3")), "Rate vs Range", &RVR_HEADER, &sweep()),
        "eero.xlsx",
        Origin::Local,
    )
    .unwrap();
    let mut rows = sweep();
    rows.push((20.0, 120.0, "DUT-TX", 36.0, 5180.0, 80.0, 2.0, "HE80", "WPA2"));
    let b = load_bytes(rvr_xlsx(None, "Rate vs Range", &RVR_HEADER, &rows), "other.xlsx", Origin::Local).unwrap();

    let selected: Vec<SelectedTest> = a
        .tests
        .iter()
        .map(|test| SelectedTest { workbook: &a, test })
        .chain(b.tests.iter().map(|test| SelectedTest { workbook: &b, test }))
        .collect();

    let mut out = Vec::new();
    write_comparison_csv(&mut out, &selected).unwrap();

    let mut rdr = csv::Reader::from_reader(out.as_slice());
    let header: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        header,
        vec![
            "Device", "Model", "Software Version", "Test Configuration", "Direction", "Band",
            "Mode (0dB)", "0dB", "10dB", "20dB",
        ]
    );

    let records: Vec<csv::StringRecord> = rdr.records().map(Result::unwrap).collect();
    assert_eq!(records.len(), selected.len());

    for (sel, rec) in selected.iter().zip(&records) {
        let fixed: Vec<&str> = rec.iter().take(7).collect();
        let test_name = sel.test.test_name();
        assert_eq!(
            fixed,
            vec![
                sel.device_name(),
                sel.model_number(),
                sel.software_version(),
                test_name.as_str(),
                sel.test.direction_label(),
                sel.test.band.as_str(),
                sel.test.mode.as_deref().unwrap_or("Unknown"),
            ]
        );

        let by_att: BTreeMap<String, f64> = sel
            .test
            .data
            .iter()
            .map(|p| (format!("{}dB", p.attenuation), p.throughput))
            .collect();
        for (col, name) in header.iter().enumerate().skip(7) {
            let cell = &rec[col];
            match by_att.get(name) {
                Some(v) => assert_eq!(cell.parse::<f64>().unwrap(), *v),
                None => assert_eq!(cell, ""),
            }
        }
    }

    // absent device sheet falls back to identity and Unknown
    assert_eq!(&records[2][0], "other.xlsx");
    assert_eq!(&records[2][1], "Unknown");
}
