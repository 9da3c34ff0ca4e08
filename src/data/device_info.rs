use super::model::DeviceInfo;
use super::workbook::Workbook;

/// Sheet names that may carry device metadata, in lookup order.
pub const DEVICE_INFO_SHEETS: &[&str] = &[
    "Device Under Test Information",
    "DUT Information",
    "Device Info",
];

/// Read label/value pairs from the first device information sheet found.
///
/// Every row with a non-empty first cell contributes, including the first
/// row of the sheet. Later duplicates overwrite earlier ones.
pub fn extract_device_info(workbook: &Workbook) -> DeviceInfo {
    let mut info = DeviceInfo::default();

    let Some(sheet) = DEVICE_INFO_SHEETS
        .iter()
        .find_map(|name| workbook.sheet(name))
    else {
        return info;
    };

    for row in &sheet.rows {
        if row.len() < 2 {
            continue;
        }
        if let Some(label) = row[0].as_text() {
            info.insert(label, row[1].to_string());
        }
    }
    info
}
