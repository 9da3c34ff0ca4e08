use std::collections::{BTreeMap, BTreeSet};

use super::model::{LoadedWorkbook, TestConfiguration};

// ---------------------------------------------------------------------------
// Facet filter: which values are shown per facet of the test list
// ---------------------------------------------------------------------------

/// Attributes the test list can be narrowed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Facet {
    Device,
    Band,
    Direction,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::Device, Facet::Band, Facet::Direction];

    pub const fn label(&self) -> &'static str {
        match self {
            Facet::Device => "Device",
            Facet::Band => "Band",
            Facet::Direction => "Direction",
        }
    }

    pub fn value_of(&self, workbook: &LoadedWorkbook, test: &TestConfiguration) -> String {
        match self {
            Facet::Device => workbook.device_group_name().to_string(),
            Facet::Band => test.band.to_string(),
            Facet::Direction => test.direction_label().to_string(),
        }
    }
}

/// Per-facet selection state: facet → set of shown values.
/// A facet absent from the map is unconstrained; an empty set hides everything.
pub type FilterState = BTreeMap<Facet, BTreeSet<String>>;

/// All values present in the loaded workbooks, per facet.
pub fn unique_values<'a>(
    workbooks: impl IntoIterator<Item = &'a LoadedWorkbook>,
) -> BTreeMap<Facet, BTreeSet<String>> {
    let mut out: BTreeMap<Facet, BTreeSet<String>> = BTreeMap::new();
    for wb in workbooks {
        for test in &wb.tests {
            for facet in Facet::ALL {
                out.entry(facet).or_default().insert(facet.value_of(wb, test));
            }
        }
    }
    out
}

/// Add newly seen values as shown, and drop values no longer present.
pub fn sync_filter_state(
    filters: &mut FilterState,
    unique: &BTreeMap<Facet, BTreeSet<String>>,
    previous: &BTreeMap<Facet, BTreeSet<String>>,
) {
    for (facet, values) in unique {
        let selected = filters.entry(*facet).or_default();
        let known = previous.get(facet);
        for v in values {
            if known.map_or(true, |k| !k.contains(v)) {
                selected.insert(v.clone());
            }
        }
        selected.retain(|v| values.contains(v));
    }
    filters.retain(|facet, _| unique.contains_key(facet));
}

/// Whether a test passes every active facet filter.
pub fn passes(filters: &FilterState, workbook: &LoadedWorkbook, test: &TestConfiguration) -> bool {
    filters
        .iter()
        .all(|(facet, selected)| selected.contains(&facet.value_of(workbook, test)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Band, DeviceInfo, Origin};

    fn wb(identity: &str, tests: Vec<(Band, &str)>) -> LoadedWorkbook {
        LoadedWorkbook {
            identity: identity.into(),
            device_info: DeviceInfo::default(),
            tests: tests
                .into_iter()
                .map(|(band, dir)| TestConfiguration {
                    name: format!("{dir}_{band}"),
                    direction: Some(dir.into()),
                    channel: 36.0,
                    frequency: 0.0,
                    band,
                    bandwidth: None,
                    nss: None,
                    mode: None,
                    security: None,
                    sheet_name: "s".into(),
                    data: Vec::new(),
                })
                .collect(),
            origin: Origin::Local,
            skipped: 0,
        }
    }

    #[test]
    fn new_values_start_selected() {
        let a = wb("alpha_1.xlsx", vec![(Band::FiveG, "DUT-TX")]);
        let mut filters = FilterState::new();
        let before = BTreeMap::new();
        let unique = unique_values([&a]);
        sync_filter_state(&mut filters, &unique, &before);
        assert!(passes(&filters, &a, &a.tests[0]));

        // user hides 5G, then a 2G workbook arrives
        filters.get_mut(&Facet::Band).unwrap().remove("5G");
        let b = wb("beta_1.xlsx", vec![(Band::TwoG, "DUT-RX")]);
        let unique2 = unique_values([&a, &b]);
        sync_filter_state(&mut filters, &unique2, &unique);
        assert!(!passes(&filters, &a, &a.tests[0]));
        assert!(passes(&filters, &b, &b.tests[0]));
    }

    #[test]
    fn empty_selection_hides_everything() {
        let a = wb("alpha_1.xlsx", vec![(Band::FiveG, "DUT-TX")]);
        let mut filters = FilterState::new();
        filters.insert(Facet::Direction, BTreeSet::new());
        assert!(!passes(&filters, &a, &a.tests[0]));
        assert!(passes(&FilterState::new(), &a, &a.tests[0]));
    }
}
