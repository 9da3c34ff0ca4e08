use std::collections::BTreeMap;
use std::fmt;

use super::band::format_channel_number;

/// Display sentinel for absent optional fields.
pub const UNKNOWN: &str = "Unknown";

/// Render an optional field, falling back to [`UNKNOWN`].
pub fn or_unknown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(UNKNOWN)
}

// ---------------------------------------------------------------------------
// CellValue – a single raw spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as produced by the workbook reader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    /// ISO-8601 date string kept as text for simplicity.
    Date(String),
}

impl CellValue {
    /// Empty cells and empty strings carry no value.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// The stringified cell, or `None` when blank.
    pub fn as_text(&self) -> Option<String> {
        if self.is_blank() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Text(s) | CellValue::Date(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Number(v as f64)
    }
}

/// One positional sheet row; column meaning comes from the header row.
pub type RawRow = Vec<CellValue>;

// ---------------------------------------------------------------------------
// Band / Perspective
// ---------------------------------------------------------------------------

/// Coarse Wi-Fi spectrum classification derived from centre frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Band {
    TwoG,
    FiveG,
    SixG,
    Unknown,
}

impl Band {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Band::TwoG => "2G",
            Band::FiveG => "5G",
            Band::SixG => "6G",
            Band::Unknown => "UNK",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which family of direction-specific columns describes a row.
///
/// Column names like `Tx Mode` are written from the test equipment's side
/// while the `Direction` cell (`DUT-TX`) names the device under test. The
/// workbooks pair them by matching token: a direction containing `TX` reads
/// the `tx *` columns, one containing `RX` reads the `rx *` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Perspective {
    Tx,
    Rx,
    Neutral,
}

impl Perspective {
    pub fn from_direction(direction: &str) -> Self {
        if direction.contains("TX") {
            Perspective::Tx
        } else if direction.contains("RX") {
            Perspective::Rx
        } else {
            Perspective::Neutral
        }
    }

    /// Short label used in tooltips ("TX Config", "PHY Mode", ...).
    pub const fn label(&self) -> &'static str {
        match self {
            Perspective::Tx => "TX",
            Perspective::Rx => "RX",
            Perspective::Neutral => "PHY",
        }
    }
}

// ---------------------------------------------------------------------------
// DataPoint – one measured sample
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    /// dB
    pub attenuation: f64,
    /// Mbps
    pub throughput: f64,
    pub channel: f64,
    /// MHz, 0 when absent.
    pub frequency: f64,
    pub band: Band,
    pub direction: Option<String>,
    pub security: Option<String>,

    /// Generic `BW` / `NSS` columns: the configured link, used for grouping.
    pub configured_bandwidth: Option<String>,
    pub configured_nss: Option<String>,

    /// Direction-resolved PHY state actually measured at this attenuation.
    pub bandwidth: Option<String>,
    pub nss: Option<String>,
    pub mode: Option<String>,
    pub mcs: Option<String>,
}

impl DataPoint {
    pub fn direction_label(&self) -> &str {
        or_unknown(&self.direction)
    }

    pub fn perspective(&self) -> Perspective {
        Perspective::from_direction(self.direction_label())
    }
}

// ---------------------------------------------------------------------------
// TestConfiguration – a named group of points sharing a baseline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TestConfiguration {
    /// Stable key: `{direction}_CH{channel}_{bw}MHz_{nss}SS_{security}`.
    pub name: String,
    pub direction: Option<String>,
    pub channel: f64,
    pub frequency: f64,
    pub band: Band,
    pub bandwidth: Option<String>,
    pub nss: Option<String>,
    pub mode: Option<String>,
    pub security: Option<String>,
    pub sheet_name: String,
    /// Sorted ascending by attenuation, never empty.
    pub data: Vec<DataPoint>,
}

impl TestConfiguration {
    pub fn direction_label(&self) -> &str {
        or_unknown(&self.direction)
    }

    pub fn perspective(&self) -> Perspective {
        Perspective::from_direction(self.direction_label())
    }

    /// Channel number as shown to users (6 GHz numbering folded back).
    pub fn display_channel(&self) -> f64 {
        format_channel_number(self.channel, self.band)
    }

    /// Human-readable baseline description, e.g. `5G CH36 80MHz 2SS HE80`.
    pub fn test_name(&self) -> String {
        format!(
            "{} CH{} {}MHz {}SS {}",
            self.band,
            self.display_channel(),
            or_unknown(&self.bandwidth),
            or_unknown(&self.nss),
            or_unknown(&self.mode),
        )
    }
}

// ---------------------------------------------------------------------------
// DeviceInfo
// ---------------------------------------------------------------------------

/// Label → value pairs from the device information sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceInfo {
    entries: BTreeMap<String, String>,
}

impl DeviceInfo {
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(label.into(), value.into());
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.get("Name")
    }

    pub fn model_number(&self) -> Option<&str> {
        self.get("Model Number")
    }

    pub fn software_version(&self) -> Option<&str> {
        self.get("Software Version")
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// LoadedWorkbook – the result of loading one file
// ---------------------------------------------------------------------------

/// Where a workbook came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Local,
    /// Loaded from the report catalog; `path` is relative to the reports root.
    Server { path: String },
}

impl Origin {
    pub fn is_server(&self) -> bool {
        matches!(self, Origin::Server { .. })
    }
}

#[derive(Debug, Clone)]
pub struct LoadedWorkbook {
    /// File name (local) or synthesised catalog name (server).
    pub identity: String,
    pub device_info: DeviceInfo,
    pub tests: Vec<TestConfiguration>,
    pub origin: Origin,
    /// Points dropped as sentinel "no link" rows.
    pub skipped: usize,
}

impl LoadedWorkbook {
    /// Device label used for charts and exports.
    pub fn device_name(&self) -> &str {
        self.device_info.name().unwrap_or(&self.identity)
    }

    /// Device label used when grouping the test list.
    pub fn device_group_name(&self) -> &str {
        if let Some(name) = self.device_info.name() {
            return name;
        }
        match self.identity.split('_').next() {
            Some(prefix) if !prefix.is_empty() => prefix,
            _ => "Unknown Device",
        }
    }

    pub fn total_points(&self) -> usize {
        self.tests.iter().map(|t| t.data.len()).sum()
    }

    pub fn test(&self, name: &str) -> Option<&TestConfiguration> {
        self.tests.iter().find(|t| t.name == name)
    }
}

// ---------------------------------------------------------------------------
// SelectionKey – `{fileIdentity}|{testKey}`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionKey {
    pub file: String,
    pub test: String,
}

impl SelectionKey {
    pub fn new(file: impl Into<String>, test: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            test: test.into(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let (file, test) = s.rsplit_once('|')?;
        Some(Self::new(file, test))
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.file, self.test)
    }
}

// ---------------------------------------------------------------------------
// SelectedTest – a test configuration resolved against its workbook
// ---------------------------------------------------------------------------

/// A selected test together with the workbook that produced it.
#[derive(Debug, Clone, Copy)]
pub struct SelectedTest<'a> {
    pub workbook: &'a LoadedWorkbook,
    pub test: &'a TestConfiguration,
}

impl<'a> SelectedTest<'a> {
    pub fn key(&self) -> SelectionKey {
        SelectionKey::new(&self.workbook.identity, &self.test.name)
    }

    pub fn device_name(&self) -> &'a str {
        self.workbook.device_name()
    }

    pub fn model_number(&self) -> &'a str {
        self.workbook.device_info.model_number().unwrap_or(UNKNOWN)
    }

    pub fn software_version(&self) -> &'a str {
        self.workbook.device_info.software_version().unwrap_or(UNKNOWN)
    }

    /// Chart legend label: `{device} v{version} - {testName} {direction}`.
    pub fn legend_label(&self) -> String {
        let version = self
            .workbook
            .device_info
            .software_version()
            .map(|v| format!(" v{v}"))
            .unwrap_or_default();
        format!(
            "{}{version} - {} {}",
            self.device_name(),
            self.test.test_name(),
            self.test.direction_label()
        )
    }
}
