use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::cell::Cell;
use std::rc::Rc;

use crate::catalog::{ReportCatalog, ReportId, ReportRoot, SearchHit};
use crate::config::Settings;
use crate::data::filter::{Facet, FilterState, passes, sync_filter_state, unique_values};
use crate::data::loader::{self, is_supported};
use crate::data::model::{
    LoadedWorkbook, Origin, SelectedTest, SelectionKey, TestConfiguration, UNKNOWN,
};
use crate::data::stats::{ComparisonGroup, comparison_rows};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Info(s) | Status::Error(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

/// Outcome of a batch load: what made it in, and what did not.
#[derive(Debug, Default)]
pub struct LoadSummary {
    /// Identities of the workbooks loaded, in load order.
    pub loaded: Vec<String>,
    pub failures: Vec<(String, LoadError)>,
}

impl LoadSummary {
    pub fn test_count(&self, state: &AppState) -> usize {
        self.loaded
            .iter()
            .filter_map(|id| state.workbook(id))
            .map(|wb| wb.tests.len())
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Aggregated views
// ---------------------------------------------------------------------------

/// All tests of one device, across its loaded files.
#[derive(Debug)]
pub struct DeviceGroup<'a> {
    pub name: String,
    pub files: Vec<&'a str>,
    pub software_versions: BTreeSet<String>,
    pub tests: Vec<SelectedTest<'a>>,
}

/// Loaded files sharing a (`Name`, `Model Number`) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelGroup {
    pub name: String,
    pub model: String,
    pub files: Vec<String>,
    pub server_files: usize,
    pub local_files: usize,
}

// ---------------------------------------------------------------------------
// Batch flag
// ---------------------------------------------------------------------------

/// Raises the batch-loading flag for its lifetime.
struct BatchGuard(Rc<Cell<bool>>);

impl BatchGuard {
    fn raise(flag: &Rc<Cell<bool>>) -> Self {
        flag.set(true);
        BatchGuard(Rc::clone(flag))
    }
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The comparison session, independent of rendering.
pub struct AppState {
    pub settings: Settings,
    report_root: ReportRoot,

    /// Last scan of the report tree.
    pub catalog: ReportCatalog,

    /// Catalog search box.
    pub search: String,

    /// Loaded workbooks in load order; identities are unique.
    workbooks: Vec<LoadedWorkbook>,

    /// Catalog versions ticked for loading.
    pub selected_reports: BTreeSet<ReportId>,

    /// Tests ticked for plotting.
    pub selected_tests: BTreeSet<SelectionKey>,

    /// Per-facet filter over the test list.
    pub filters: FilterState,
    known_values: BTreeMap<Facet, BTreeSet<String>>,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,

    batch_loading: Rc<Cell<bool>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            report_root: settings.report_root(),
            settings,
            catalog: ReportCatalog::default(),
            search: String::new(),
            workbooks: Vec::new(),
            selected_reports: BTreeSet::new(),
            selected_tests: BTreeSet::new(),
            filters: FilterState::new(),
            known_values: BTreeMap::new(),
            status: None,
            batch_loading: Rc::new(Cell::new(false)),
        }
    }

    pub fn report_root(&self) -> &ReportRoot {
        &self.report_root
    }

    pub fn is_batch_loading(&self) -> bool {
        self.batch_loading.get()
    }

    // ---- Registry -------------------------------------------------------

    pub fn workbooks(&self) -> &[LoadedWorkbook] {
        &self.workbooks
    }

    pub fn workbook(&self, identity: &str) -> Option<&LoadedWorkbook> {
        self.workbooks.iter().find(|wb| wb.identity == identity)
    }

    /// Add a workbook, replacing any earlier one with the same identity.
    pub fn insert_workbook(&mut self, workbook: LoadedWorkbook) {
        log::info!(
            "Registered {} ({} tests, {} points)",
            workbook.identity,
            workbook.tests.len(),
            workbook.total_points()
        );
        match self
            .workbooks
            .iter_mut()
            .find(|wb| wb.identity == workbook.identity)
        {
            Some(slot) => *slot = workbook,
            None => self.workbooks.push(workbook),
        }
        self.after_registry_change();
    }

    fn after_registry_change(&mut self) {
        let unique = unique_values(&self.workbooks);
        sync_filter_state(&mut self.filters, &unique, &self.known_values);
        self.known_values = unique;

        let workbooks = &self.workbooks;
        self.selected_tests.retain(|key| {
            workbooks
                .iter()
                .find(|wb| wb.identity == key.file)
                .is_some_and(|wb| wb.test(&key.test).is_some())
        });
    }

    // ---- Loading --------------------------------------------------------

    /// Load local files one after another. A failure only affects its own file.
    pub fn load_local_files(&mut self, paths: &[PathBuf]) -> LoadSummary {
        let mut summary = LoadSummary::default();

        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            if !is_supported(&name) {
                log::warn!("Rejected {name}: not an Excel file");
                summary.failures.push((name.clone(), LoadError::UnsupportedFileType { name }));
                continue;
            }

            match loader::load_file(path) {
                Ok(wb) => {
                    summary.loaded.push(wb.identity.clone());
                    self.insert_workbook(wb);
                }
                Err(e) => {
                    log::error!("Failed to load {name}: {e}");
                    summary.failures.push((name, e));
                }
            }
        }

        self.status = Some(self.summarize_batch(&summary, "file"));
        summary
    }

    /// Load every test configuration of every ticked catalog version.
    ///
    /// Report selections are cleared afterwards. Fails with
    /// [`LoadError::NothingLoaded`] only when reports were selected and none
    /// of them could be loaded.
    pub fn load_selected_reports(&mut self) -> Result<LoadSummary, LoadError> {
        if self.selected_reports.is_empty() {
            log::debug!("No reports selected");
            return Ok(LoadSummary::default());
        }
        let _batch = BatchGuard::raise(&self.batch_loading);

        let mut jobs: Vec<(String, String)> = Vec::new();
        for id in &self.selected_reports {
            let Some(version) = self.catalog.version(id) else {
                log::error!("Version data not found for: {id}");
                continue;
            };
            for (config, file) in &version.test_configs {
                let identity = format!(
                    "{}_{}_v{}_{}_{}",
                    id.vendor, id.model, id.version, config, file.name
                );
                jobs.push((identity, file.path.clone()));
            }
        }

        let mut summary = LoadSummary::default();
        for (identity, path) in jobs {
            let result = self
                .report_root
                .read(&path)
                .map_err(LoadError::from)
                .and_then(|bytes| {
                    loader::load_bytes(bytes, &identity, Origin::Server { path: path.clone() })
                });
            match result {
                Ok(wb) => {
                    log::info!("Successfully loaded: {identity}");
                    summary.loaded.push(identity);
                    self.insert_workbook(wb);
                }
                Err(e) => {
                    log::warn!("Error loading {path}: {e}");
                    summary.failures.push((identity, e));
                }
            }
        }
        log::info!("Loaded {} test configuration files", summary.loaded.len());

        self.selected_reports.clear();

        if summary.loaded.is_empty() {
            self.status = Some(Status::Error(LoadError::NothingLoaded.to_string()));
            return Err(LoadError::NothingLoaded);
        }
        self.status = Some(self.summarize_batch(&summary, "report"));
        Ok(summary)
    }

    fn summarize_batch(&self, summary: &LoadSummary, what: &str) -> Status {
        let tests = summary.test_count(self);
        let mut text = format!(
            "Loaded {tests} test configurations from {} {what}(s)",
            summary.loaded.len()
        );
        if let Some((name, err)) = summary.failures.first() {
            text.push_str(&format!("; {} failed ({name}: {err})", summary.failures.len()));
        }
        if summary.loaded.is_empty() && !summary.failures.is_empty() {
            Status::Error(text)
        } else {
            Status::Info(text)
        }
    }

    // ---- Catalog --------------------------------------------------------

    pub fn refresh_catalog(&mut self) {
        self.catalog = self.report_root.scan();
        let known = &self.catalog;
        self.selected_reports.retain(|id| known.version(id).is_some());
    }

    pub fn search_hits(&self) -> Vec<SearchHit> {
        self.catalog.search(&self.search)
    }

    pub fn toggle_report(&mut self, id: ReportId) {
        if !self.selected_reports.remove(&id) {
            self.selected_reports.insert(id);
        }
    }

    /// Replace the report selection with the newest version of every model.
    pub fn select_latest_versions(&mut self) {
        self.selected_reports = self.catalog.latest_versions().into_iter().collect();
    }

    // ---- Test selection -------------------------------------------------

    /// Tests passing the facet filters, in registry order.
    pub fn visible_tests(&self) -> impl Iterator<Item = SelectedTest<'_>> + '_ {
        self.workbooks.iter().flat_map(move |wb| {
            wb.tests
                .iter()
                .filter(move |t| passes(&self.filters, wb, t))
                .map(move |test| SelectedTest { workbook: wb, test })
        })
    }

    pub fn is_selected(&self, workbook: &LoadedWorkbook, test: &TestConfiguration) -> bool {
        self.selected_tests
            .contains(&SelectionKey::new(&workbook.identity, &test.name))
    }

    pub fn toggle_test(&mut self, key: SelectionKey) {
        if !self.selected_tests.remove(&key) {
            self.selected_tests.insert(key);
        }
    }

    pub fn select_all_tests(&mut self) {
        let keys: Vec<SelectionKey> = self.visible_tests().map(|s| s.key()).collect();
        self.selected_tests.extend(keys);
    }

    pub fn select_no_tests(&mut self) {
        self.selected_tests.clear();
    }

    /// Tick or untick every visible test of one device group.
    pub fn select_device(&mut self, name: &str, on: bool) {
        let keys: Vec<SelectionKey> = self
            .visible_tests()
            .filter(|s| s.workbook.device_group_name() == name)
            .map(|s| s.key())
            .collect();
        for key in keys {
            if on {
                self.selected_tests.insert(key);
            } else {
                self.selected_tests.remove(&key);
            }
        }
    }

    /// Select one test per device for every configuration that at least two
    /// devices have; everything else is deselected.
    pub fn select_matching_tests(&mut self) {
        let mut by_config: BTreeMap<String, BTreeMap<String, SelectionKey>> = BTreeMap::new();
        for sel in self.visible_tests() {
            let config = format!("{} {}", sel.test.test_name(), sel.test.direction_label());
            by_config
                .entry(config)
                .or_default()
                .entry(sel.workbook.device_group_name().to_string())
                .or_insert_with(|| sel.key());
        }

        self.selected_tests = by_config
            .into_values()
            .filter(|devices| devices.len() > 1)
            .flat_map(BTreeMap::into_values)
            .collect();
    }

    /// Selected tests resolved against their workbooks, in registry order.
    pub fn selected_tests(&self) -> Vec<SelectedTest<'_>> {
        self.workbooks
            .iter()
            .flat_map(|wb| wb.tests.iter().map(move |test| SelectedTest { workbook: wb, test }))
            .filter(|s| self.selected_tests.contains(&s.key()))
            .collect()
    }

    pub fn comparison(&self) -> Vec<ComparisonGroup> {
        comparison_rows(&self.selected_tests(), self.settings.effective_range_floor_mbps)
    }

    // ---- Aggregated views -----------------------------------------------

    /// Tests grouped by device, sorted by device name.
    pub fn device_groups(&self) -> Vec<DeviceGroup<'_>> {
        let mut groups: BTreeMap<&str, DeviceGroup<'_>> = BTreeMap::new();
        for wb in &self.workbooks {
            let name = wb.device_group_name();
            let group = groups.entry(name).or_insert_with(|| DeviceGroup {
                name: name.to_string(),
                files: Vec::new(),
                software_versions: BTreeSet::new(),
                tests: Vec::new(),
            });
            group.files.push(wb.identity.as_str());
            if let Some(v) = wb.device_info.software_version() {
                group.software_versions.insert(v.to_string());
            }
            group
                .tests
                .extend(wb.tests.iter().map(|test| SelectedTest { workbook: wb, test }));
        }
        groups.into_values().collect()
    }

    /// Loaded files grouped by device name and model number.
    pub fn model_groups(&self) -> Vec<ModelGroup> {
        let mut groups: BTreeMap<(String, String), ModelGroup> = BTreeMap::new();
        for wb in &self.workbooks {
            let name = wb.device_info.name().unwrap_or(UNKNOWN);
            let model = wb.device_info.model_number().unwrap_or(UNKNOWN);
            let group = groups
                .entry((name.to_string(), model.to_string()))
                .or_insert_with(|| ModelGroup {
                    name: name.to_string(),
                    model: model.to_string(),
                    files: Vec::new(),
                    server_files: 0,
                    local_files: 0,
                });
            group.files.push(wb.identity.clone());
            if wb.origin.is_server() {
                group.server_files += 1;
            } else {
                group.local_files += 1;
            }
        }
        groups.into_values().collect()
    }

    // ---- Removal --------------------------------------------------------

    fn remove_where(&mut self, pred: impl Fn(&LoadedWorkbook) -> bool) -> usize {
        let before = self.workbooks.len();
        self.workbooks.retain(|wb| !pred(wb));
        let removed = before - self.workbooks.len();
        if removed > 0 {
            log::info!("Removed {removed} workbook(s)");
            self.after_registry_change();
        }
        removed
    }

    pub fn remove_file(&mut self, identity: &str) -> bool {
        self.remove_where(|wb| wb.identity == identity) > 0
    }

    pub fn clear_device_model(&mut self, name: &str, model: &str) -> usize {
        self.remove_where(|wb| {
            wb.device_info.name().unwrap_or(UNKNOWN) == name
                && wb.device_info.model_number().unwrap_or(UNKNOWN) == model
        })
    }

    /// Remove every catalog-loaded (`from_server`) or every local file.
    pub fn clear_origin(&mut self, from_server: bool) -> usize {
        self.remove_where(|wb| wb.origin.is_server() == from_server)
    }

    pub fn clear_all(&mut self) {
        self.workbooks.clear();
        self.after_registry_change();
        self.status = None;
    }
}
