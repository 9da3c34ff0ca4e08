//! Report catalog over a `vendor/model/version/testConfig/report.xlsx` tree.
//!
//! ```text
//! reports/
//!   Adtran/
//!     logo.png              (optional)
//!     SDG-8612/
//!       model.png           (optional)
//!       25.6.3.1/
//!         5g_2x2_ch44/
//!           report.xlsx
//!           report_5g_2x2_ch44.pdf   (optional)
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::CatalogError;

pub const REPORT_FILE: &str = "report.xlsx";
pub const VENDOR_LOGO: &str = "logo.png";
pub const MODEL_IMAGE: &str = "model.png";

// ---------------------------------------------------------------------------
// Catalog structure (serialises to the /api/reports JSON shape)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportCatalog {
    pub vendors: BTreeMap<String, VendorEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VendorEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub models: BTreeMap<String, ModelEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub versions: BTreeMap<String, VersionEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub test_configs: BTreeMap<String, ReportFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportFile {
    pub name: String,
    /// Relative to the reports root, `/`-separated.
    pub path: String,
    pub size: u64,
    /// RFC 3339, UTC, millisecond precision.
    pub modified: String,
}

/// One `/api/search` result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub vendor: String,
    pub model: String,
    pub version: String,
    pub test_config: String,
    pub file: String,
    pub path: String,
    pub size: u64,
    pub modified: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_image: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    pub vendors: usize,
    pub models: usize,
    pub versions: usize,
    pub test_configs: usize,
    pub vendor_logos: usize,
    pub model_images: usize,
}

/// A selectable device firmware: `vendor|model|version`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportId {
    pub vendor: String,
    pub model: String,
    pub version: String,
}

impl ReportId {
    pub fn new(vendor: impl Into<String>, model: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            model: model.into(),
            version: version.into(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.splitn(3, '|');
        let vendor = parts.next().filter(|p| !p.is_empty())?;
        let model = parts.next().filter(|p| !p.is_empty())?;
        let version = parts.next().filter(|p| !p.is_empty())?;
        Some(Self::new(vendor, model, version))
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.vendor, self.model, self.version)
    }
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

impl ReportCatalog {
    /// Walk the report tree. Never fails: unreadable parts are logged and
    /// left out, a missing root gives an empty catalog.
    pub fn scan(root: &Path) -> Self {
        let mut catalog = ReportCatalog::default();

        for (vendor, vendor_path) in subdirs(root) {
            let mut vendor_entry = VendorEntry {
                logo: image_at(root, &vendor_path.join(VENDOR_LOGO)),
                ..Default::default()
            };

            for (model, model_path) in subdirs(&vendor_path) {
                let mut model_entry = ModelEntry {
                    image: image_at(root, &model_path.join(MODEL_IMAGE)),
                    ..Default::default()
                };

                for (version, version_path) in subdirs(&model_path) {
                    let mut version_entry = VersionEntry::default();

                    for (config, config_path) in subdirs(&version_path) {
                        let report = config_path.join(REPORT_FILE);
                        if !report.exists() {
                            continue;
                        }
                        match report_file(root, &report) {
                            Ok(file) => {
                                version_entry.test_configs.insert(config, file);
                            }
                            Err(e) => {
                                log::error!("Error reading report file {}: {e}", report.display())
                            }
                        }
                    }
                    model_entry.versions.insert(version, version_entry);
                }
                vendor_entry.models.insert(model, model_entry);
            }
            catalog.vendors.insert(vendor, vendor_entry);
        }

        let s = catalog.summary();
        log::info!(
            "Found {} vendors, {} models, {} versions, {} test configurations; images: {} vendor logos, {} device images",
            s.vendors,
            s.models,
            s.versions,
            s.test_configs,
            s.vendor_logos,
            s.model_images
        );
        catalog
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn version(&self, id: &ReportId) -> Option<&VersionEntry> {
        self.vendors
            .get(&id.vendor)?
            .models
            .get(&id.model)?
            .versions
            .get(&id.version)
    }

    /// Case-insensitive substring search over vendor, model, version and
    /// test configuration names.
    pub fn search(&self, term: &str) -> Vec<SearchHit> {
        let term = term.to_lowercase();
        let mut hits = Vec::new();

        for (vendor, vendor_entry) in &self.vendors {
            for (model, model_entry) in &vendor_entry.models {
                for (version, version_entry) in &model_entry.versions {
                    for (config, file) in &version_entry.test_configs {
                        let matched = [vendor, model, version, config]
                            .iter()
                            .any(|s| s.to_lowercase().contains(&term));
                        if !matched {
                            continue;
                        }
                        hits.push(SearchHit {
                            vendor: vendor.clone(),
                            model: model.clone(),
                            version: version.clone(),
                            test_config: config.clone(),
                            file: file.name.clone(),
                            path: file.path.clone(),
                            size: file.size,
                            modified: file.modified.clone(),
                            vendor_logo: vendor_entry.logo.clone(),
                            model_image: model_entry.image.clone(),
                        });
                    }
                }
            }
        }
        hits
    }

    pub fn summary(&self) -> CatalogSummary {
        let mut s = CatalogSummary::default();
        for vendor in self.vendors.values() {
            s.vendors += 1;
            s.vendor_logos += usize::from(vendor.logo.is_some());
            for model in vendor.models.values() {
                s.models += 1;
                s.model_images += usize::from(model.image.is_some());
                for version in model.versions.values() {
                    s.versions += 1;
                    s.test_configs += version.test_configs.len();
                }
            }
        }
        s
    }

    /// The highest version of every model, when it has test configurations.
    pub fn latest_versions(&self) -> Vec<ReportId> {
        let mut out = Vec::new();
        for (vendor, vendor_entry) in &self.vendors {
            for (model, model_entry) in &vendor_entry.models {
                let latest = model_entry.versions.iter().reduce(|best, cand| {
                    if compare_versions(cand.0, best.0) == Ordering::Greater {
                        cand
                    } else {
                        best
                    }
                });
                if let Some((version, entry)) = latest {
                    if !entry.test_configs.is_empty() {
                        out.push(ReportId::new(vendor, model, version));
                    }
                }
            }
        }
        out
    }
}

/// Compare dotted version strings numerically; non-numeric parts count as 0.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let pa: Vec<u64> = a.split('.').map(leading_int).collect();
    let pb: Vec<u64> = b.split('.').map(leading_int).collect();
    for i in 0..pa.len().max(pb.len()) {
        let na = pa.get(i).copied().unwrap_or(0);
        let nb = pb.get(i).copied().unwrap_or(0);
        if na != nb {
            return na.cmp(&nb);
        }
    }
    Ordering::Equal
}

fn leading_int(part: &str) -> u64 {
    let digits: String = part
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

/// Visible subdirectories of `dir`, sorted by name.
fn subdirs(dir: &Path) -> Vec<(String, PathBuf)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if dir.exists() {
                log::error!("Error scanning reports directory {}: {e}", dir.display());
            }
            return Vec::new();
        }
    };

    let mut out: Vec<(String, PathBuf)> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            (!name.starts_with('.') && path.is_dir()).then_some((name, path))
        })
        .collect();
    out.sort();
    out
}

fn image_at(root: &Path, path: &Path) -> Option<String> {
    path.is_file().then(|| relative_path(root, path))
}

fn report_file(root: &Path, path: &Path) -> io::Result<ReportFile> {
    let meta = fs::metadata(path)?;
    let modified: DateTime<Utc> = meta.modified()?.into();
    Ok(ReportFile {
        name: REPORT_FILE.to_string(),
        path: relative_path(root, path),
        size: meta.len(),
        modified: modified.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// ---------------------------------------------------------------------------
// File access inside the root
// ---------------------------------------------------------------------------

/// Guarded access to files below the reports root.
#[derive(Debug, Clone)]
pub struct ReportRoot {
    root: PathBuf,
    pdf_prefix: String,
}

impl ReportRoot {
    pub fn new(root: impl Into<PathBuf>, pdf_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            pdf_prefix: pdf_prefix.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scan(&self) -> ReportCatalog {
        ReportCatalog::scan(&self.root)
    }

    /// Map a root-relative path to a filesystem path that must exist and
    /// must not leave the root.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, CatalogError> {
        let rel = normalize(relative).ok_or_else(|| {
            log::warn!("Path traversal attempt detected: {relative}");
            CatalogError::Forbidden {
                path: relative.to_string(),
            }
        })?;
        let path = self.root.join(rel);

        if !path.exists() {
            return Err(CatalogError::NotFound {
                path: relative.to_string(),
            });
        }

        // Symlinks may still point outside.
        if let (Ok(real_root), Ok(real_path)) = (self.root.canonicalize(), path.canonicalize()) {
            if !real_path.starts_with(&real_root) {
                log::warn!("Path traversal attempt detected: {relative}");
                return Err(CatalogError::Forbidden {
                    path: relative.to_string(),
                });
            }
        }
        Ok(path)
    }

    /// Read a report or image file.
    pub fn read(&self, relative: &str) -> Result<Vec<u8>, CatalogError> {
        let path = self.resolve(relative)?;
        if !path.is_file() {
            return Err(CatalogError::NotFound {
                path: relative.to_string(),
            });
        }
        let bytes = fs::read(&path)?;
        log::debug!("Serving file: {} ({} bytes)", path.display(), bytes.len());
        Ok(bytes)
    }

    /// Locate the PDF rendition stored next to a workbook: the first `.pdf`
    /// (by name) whose lower-cased name starts with the configured prefix.
    pub fn find_pdf(&self, relative_xlsx: &str) -> Result<PathBuf, CatalogError> {
        let workbook = self.resolve(relative_xlsx)?;
        let dir = if workbook.is_dir() {
            workbook
        } else {
            workbook
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.root.clone())
        };

        let prefix = self.pdf_prefix.to_lowercase();
        let mut candidates: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().to_lowercase())
                    .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(".pdf"))
            })
            .collect();
        candidates.sort();

        candidates
            .into_iter()
            .next()
            .ok_or(CatalogError::NoPdf { dir })
    }
}

/// Lexically normalise a relative path; `None` if it climbs above the root.
fn normalize(relative: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for comp in Path::new(relative).components() {
        match comp {
            Component::Normal(part) => out.push(part),
            Component::CurDir | Component::RootDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_ordering() {
        assert_eq!(compare_versions("25.6.4.0", "25.6.3.1"), Ordering::Greater);
        assert_eq!(compare_versions("1.10", "1.9"), Ordering::Greater);
        assert_eq!(compare_versions("1.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.beta", "1.0"), Ordering::Equal);
        assert_eq!(compare_versions("2.3rc1", "2.2"), Ordering::Greater);
    }

    #[test]
    fn normalize_rejects_escapes() {
        assert_eq!(normalize("a/b/../c"), Some(PathBuf::from("a/c")));
        assert_eq!(normalize("/a/./b"), Some(PathBuf::from("a/b")));
        assert_eq!(normalize("../etc/passwd"), None);
        assert_eq!(normalize("a/../../b"), None);
    }

    #[test]
    fn report_id_round_trips() {
        let id = ReportId::new("Eero", "Max7", "1.2.3");
        assert_eq!(id.to_string(), "Eero|Max7|1.2.3");
        assert_eq!(ReportId::parse("Eero|Max7|1.2.3"), Some(id));
        assert_eq!(ReportId::parse("Eero|Max7"), None);
        assert_eq!(ReportId::parse("Eero||1.2.3"), None);
    }
}
