use std::io::Write;

use chrono::{Local, NaiveDate};

use crate::data::model::{SelectedTest, or_unknown};

/// Fixed leading columns of the comparison CSV.
pub const LEADING_COLUMNS: [&str; 7] = [
    "Device",
    "Model",
    "Software Version",
    "Test Configuration",
    "Direction",
    "Band",
    "Mode (0dB)",
];

/// `wifi_rvr_comparison_{YYYY-MM-DD}.csv` for today.
pub fn default_file_name() -> String {
    file_name_for(Local::now().date_naive())
}

pub fn file_name_for(date: NaiveDate) -> String {
    format!("wifi_rvr_comparison_{}.csv", date.format("%Y-%m-%d"))
}

/// Every attenuation observed across the selection, ascending and distinct.
pub fn attenuation_columns(selected: &[SelectedTest<'_>]) -> Vec<f64> {
    let mut atts: Vec<f64> = selected
        .iter()
        .flat_map(|s| s.test.data.iter().map(|p| p.attenuation))
        .collect();
    atts.sort_by(f64::total_cmp);
    atts.dedup();
    atts
}

/// Write the selection as one row per test with throughput pivoted into
/// one column per attenuation. Cells with no measurement stay empty.
pub fn write_comparison_csv<W: Write>(
    writer: W,
    selected: &[SelectedTest<'_>],
) -> Result<(), csv::Error> {
    let attenuations = attenuation_columns(selected);
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = LEADING_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(attenuations.iter().map(|att| format!("{att}dB")));
    wtr.write_record(&header)?;

    for sel in selected {
        let mut record: Vec<String> = vec![
            sel.device_name().to_string(),
            sel.model_number().to_string(),
            sel.software_version().to_string(),
            sel.test.test_name(),
            sel.test.direction_label().to_string(),
            sel.test.band.to_string(),
            or_unknown(&sel.test.mode).to_string(),
        ];
        record.extend(attenuations.iter().map(|att| {
            // later points win on duplicate attenuations
            sel.test
                .data
                .iter()
                .rev()
                .find(|p| p.attenuation == *att)
                .map(|p| p.throughput.to_string())
                .unwrap_or_default()
        }));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    log::info!("Exported {} test configurations to CSV", selected.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(file_name_for(date), "wifi_rvr_comparison_2025-03-07.csv");
    }

    #[test]
    fn empty_selection_writes_only_the_header() {
        let mut out = Vec::new();
        write_comparison_csv(&mut out, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Device,Model,Software Version,Test Configuration,Direction,Band,Mode (0dB)\n"
        );
    }
}
