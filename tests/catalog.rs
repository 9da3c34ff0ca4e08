mod common;

use std::fs;
use std::path::Path;

use common::tmp_dir;
use rvr_compare::catalog::{ReportCatalog, ReportId, ReportRoot};
use rvr_compare::error::CatalogError;

fn touch(path: &Path, bytes: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

fn sample_tree(name: &str) -> std::path::PathBuf {
    let root = tmp_dir(name);
    touch(&root.join("Adtran/logo.png"), b"png");
    touch(&root.join("Adtran/SDG-8612/model.png"), b"png");
    touch(&root.join("Adtran/SDG-8612/25.6.3.1/5g_2x2_ch44/report.xlsx"), b"old");
    touch(&root.join("Adtran/SDG-8612/25.6.4.0/5g_2x2_ch44/report.xlsx"), b"new");
    touch(&root.join("Adtran/SDG-8612/25.6.4.0/5g_2x2_ch44/report_5g_2x2_ch44.pdf"), b"%PDF");
    touch(&root.join("Adtran/SDG-8612/25.6.4.0/5g_2x2_ch44/Report_a.PDF"), b"%PDF");
    touch(&root.join("Adtran/SDG-8612/25.6.4.0/5g_2x2_ch149/report.xlsx"), b"new");
    touch(&root.join("Eero/Max7/1.2.3/5g_2x2_ch44/report.xlsx"), b"eero");
    // no report.xlsx: config skipped, version kept
    fs::create_dir_all(root.join("Eero/Max7/1.3.0/5g_2x2_ch44")).unwrap();
    touch(&root.join(".hidden/Model/1.0/cfg/report.xlsx"), b"x");
    touch(&root.join("stray.txt"), b"x");
    root
}

#[test]
fn scan_builds_the_tree() {
    let root = sample_tree("scan");
    let catalog = ReportCatalog::scan(&root);

    assert_eq!(catalog.vendors.keys().collect::<Vec<_>>(), vec!["Adtran", "Eero"]);
    let adtran = &catalog.vendors["Adtran"];
    assert_eq!(adtran.logo.as_deref(), Some("Adtran/logo.png"));
    let model = &adtran.models["SDG-8612"];
    assert_eq!(model.image.as_deref(), Some("Adtran/SDG-8612/model.png"));

    let report = &model.versions["25.6.3.1"].test_configs["5g_2x2_ch44"];
    assert_eq!(report.name, "report.xlsx");
    assert_eq!(report.path, "Adtran/SDG-8612/25.6.3.1/5g_2x2_ch44/report.xlsx");
    assert_eq!(report.size, 3);
    assert!(report.modified.ends_with('Z'));

    let eero = &catalog.vendors["Eero"].models["Max7"];
    assert!(eero.versions["1.3.0"].test_configs.is_empty());

    let s = catalog.summary();
    assert_eq!((s.vendors, s.models, s.versions, s.test_configs), (2, 2, 4, 4));
    assert_eq!((s.vendor_logos, s.model_images), (1, 1));
}

#[test]
fn missing_root_is_an_empty_catalog() {
    let root = tmp_dir("missing").join("nope");
    assert!(ReportCatalog::scan(&root).is_empty());
}

#[test]
fn json_uses_camel_case_and_omits_absent_images() {
    let root = sample_tree("json");
    let json: serde_json::Value = serde_json::from_str(&ReportCatalog::scan(&root).to_json().unwrap()).unwrap();

    let version = &json["vendors"]["Adtran"]["models"]["SDG-8612"]["versions"]["25.6.4.0"];
    assert!(version["testConfigs"]["5g_2x2_ch149"]["path"].is_string());
    assert!(json["vendors"]["Eero"].get("logo").is_none());
}

#[test]
fn search_is_case_insensitive() {
    let catalog = ReportCatalog::scan(&sample_tree("search"));

    let hits = catalog.search("CH149");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].test_config, "5g_2x2_ch149");
    assert_eq!(hits[0].vendor_logo.as_deref(), Some("Adtran/logo.png"));

    assert_eq!(catalog.search("eero").len(), 1);
    assert_eq!(catalog.search("").len(), 4);
    assert!(catalog.search("netgear").is_empty());
}

#[test]
fn latest_versions_skip_empty_ones() {
    let catalog = ReportCatalog::scan(&sample_tree("latest"));
    // Eero's newest version has no reports, so Eero is left out entirely
    assert_eq!(
        catalog.latest_versions(),
        vec![ReportId::new("Adtran", "SDG-8612", "25.6.4.0")]
    );
}

#[test]
fn traversal_is_forbidden() {
    let root = sample_tree("traversal");
    let reports = ReportRoot::new(&root, "report");

    assert!(matches!(
        reports.resolve("../catalog_secret"),
        Err(CatalogError::Forbidden { .. })
    ));
    assert!(matches!(
        reports.read("Adtran/../../etc/passwd"),
        Err(CatalogError::Forbidden { .. })
    ));
    assert!(matches!(
        reports.read("Adtran/nothing.png"),
        Err(CatalogError::NotFound { .. })
    ));
    assert_eq!(reports.read("/Adtran/logo.png").unwrap(), b"png");
}

#[test]
fn pdf_lookup_takes_first_prefixed_match() {
    let root = sample_tree("pdf");
    let reports = ReportRoot::new(&root, "report");

    let pdf = reports
        .find_pdf("Adtran/SDG-8612/25.6.4.0/5g_2x2_ch44/report.xlsx")
        .unwrap();
    // "Report_a.PDF" sorts before "report_5g..." by byte order
    assert_eq!(pdf.file_name().unwrap(), "Report_a.PDF");

    assert!(matches!(
        reports.find_pdf("Adtran/SDG-8612/25.6.3.1/5g_2x2_ch44/report.xlsx"),
        Err(CatalogError::NoPdf { .. })
    ));
}
