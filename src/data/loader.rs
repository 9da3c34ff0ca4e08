use std::path::Path;

use crate::error::LoadError;

use super::device_info::extract_device_info;
use super::extract::{extract_points, is_rvr_sheet};
use super::group::group_points;
use super::model::{LoadedWorkbook, Origin, TestConfiguration};
use super::workbook::Workbook;

/// Spreadsheet extensions accepted by the loader (compared lower-cased).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Whether `name` looks like a spreadsheet we can open.
pub fn is_supported(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Load a workbook from a local path.
///
/// The extension is checked before anything is read.
pub fn load_file(path: &Path) -> Result<LoadedWorkbook, LoadError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if !is_supported(&name) {
        return Err(LoadError::UnsupportedFileType { name });
    }

    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        name: name.clone(),
        source,
    })?;
    load_bytes(bytes, &name, Origin::Local)
}

/// Parse workbook bytes and extract device info and test configurations.
pub fn load_bytes(bytes: Vec<u8>, identity: &str, origin: Origin) -> Result<LoadedWorkbook, LoadError> {
    let source = if origin.is_server() { "server" } else { "local" };
    log::info!("Loading file: {identity} ({source})");

    let workbook = Workbook::from_bytes(bytes).map_err(|source| LoadError::Workbook {
        name: identity.to_string(),
        source,
    })?;
    load_workbook(&workbook, identity, origin)
}

/// Build a [`LoadedWorkbook`] from an already parsed workbook.
pub fn load_workbook(
    workbook: &Workbook,
    identity: &str,
    origin: Origin,
) -> Result<LoadedWorkbook, LoadError> {
    let device_info = extract_device_info(workbook);
    let extraction = extract_rvr_data(workbook);

    if extraction.tests.is_empty() {
        log::error!(
            "No RvR data found in {identity}; sheets: {:?}",
            workbook.sheet_names().collect::<Vec<_>>()
        );
        return Err(LoadError::EmptyWorkbook {
            name: identity.to_string(),
        });
    }

    let loaded = LoadedWorkbook {
        identity: identity.to_string(),
        device_info,
        tests: extraction.tests,
        origin,
        skipped: extraction.skipped,
    };
    log::info!(
        "Successfully loaded {identity}: {} test configurations, {} data points",
        loaded.tests.len(),
        loaded.total_points()
    );
    Ok(loaded)
}

// ---------------------------------------------------------------------------
// Workbook-level extraction
// ---------------------------------------------------------------------------

/// Test configurations from every "Rate vs Range" sheet of a workbook.
#[derive(Debug, Clone, Default)]
pub struct RvrExtraction {
    pub tests: Vec<TestConfiguration>,
    pub skipped: usize,
}

/// Run extraction and grouping over every data sheet.
///
/// A malformed sheet is logged and contributes nothing; it never stops the
/// remaining sheets.
pub fn extract_rvr_data(workbook: &Workbook) -> RvrExtraction {
    let mut out = RvrExtraction::default();

    for sheet in workbook.sheets.iter().filter(|s| is_rvr_sheet(&s.name)) {
        log::info!("Processing sheet: {}", sheet.name);

        let extraction = match extract_points(sheet) {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping sheet '{}': {e}", sheet.name);
                continue;
            }
        };

        let tests = group_points(&sheet.name, extraction.points);
        log::info!(
            "Found {} valid test configurations in {}",
            tests.len(),
            sheet.name
        );
        if extraction.skipped > 0 {
            log::warn!(
                "Filtered out {} invalid data points (channel=0 or throughput=0) in {}",
                extraction.skipped,
                sheet.name
            );
        }

        out.tests.extend(tests);
        out.skipped += extraction.skipped;
    }

    // Names are unique per sheet; keep them unique across sheets too.
    super::group::disambiguate_names(&mut out.tests);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_supported("report.xlsx"));
        assert!(is_supported("REPORT.XLS"));
        assert!(is_supported("a.b.ods"));
        assert!(!is_supported("report.csv"));
        assert!(!is_supported("report"));
    }

    #[test]
    fn unsupported_file_is_rejected_without_reading() {
        let err = load_file(Path::new("/definitely/not/here/notes.txt")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFileType { ref name } if name == "notes.txt"));
    }

    #[test]
    fn missing_local_file_is_an_io_error() {
        let err = load_file(Path::new("/definitely/not/here/report.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn workbook_without_data_sheets_is_empty() {
        let wb = Workbook::default();
        let err = load_workbook(&wb, "empty.xlsx", Origin::Local).unwrap_err();
        assert!(matches!(err, LoadError::EmptyWorkbook { .. }));
    }

    #[test]
    fn names_stay_unique_across_sheets() {
        use super::super::model::CellValue;
        use super::super::workbook::Sheet;

        let t = |s: &str| CellValue::from(s);
        let n = CellValue::Number;
        let header = |security: bool| {
            let mut h = vec![t("Attenuation"), t("Throughput"), t("Direction"), t("Channel"), t("BW"), t("NSS")];
            if security {
                h.push(t("Security"));
            }
            h
        };
        let first = Sheet::new(
            "Rate vs Range",
            vec![
                header(true),
                vec![n(0.0), n(900.0), t("DUT-TX"), n(36.0), n(80.0), n(2.0), CellValue::Empty],
                vec![n(3.0), n(800.0), t("DUT-TX"), n(36.0), n(80.0), n(2.0), t("Unknown")],
            ],
        );
        let second = Sheet::new(
            "Rate vs Range 2",
            vec![
                header(false),
                vec![n(0.0), n(700.0), t("DUT-TX"), n(36.0), n(80.0), n(2.0)],
            ],
        );
        let wb = Workbook {
            sheets: vec![first, second],
        };

        let out = extract_rvr_data(&wb);
        let names: Vec<&str> = out.tests.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "DUT-TX_CH36_80MHz_2SS_Unknown",
                "DUT-TX_CH36_80MHz_2SS_Unknown#2",
                "DUT-TX_CH36_80MHz_2SS_Unknown#3",
            ]
        );
    }
}
