use super::model::{Band, SelectedTest, TestConfiguration};

/// Headline numbers for one test configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestSummary {
    pub max_throughput: f64,
    /// Rounded to the nearest Mbps.
    pub avg_throughput: f64,
    /// Attenuation of the last point above the throughput floor, 0 if none.
    pub effective_range: f64,
}

pub fn summarize(test: &TestConfiguration, floor_mbps: f64) -> TestSummary {
    let throughputs: Vec<f64> = test
        .data
        .iter()
        .map(|p| p.throughput)
        .filter(|t| *t > 0.0)
        .collect();

    let max_throughput = throughputs.iter().copied().fold(0.0, f64::max);
    let avg_throughput = if throughputs.is_empty() {
        0.0
    } else {
        (throughputs.iter().sum::<f64>() / throughputs.len() as f64).round()
    };

    TestSummary {
        max_throughput,
        avg_throughput,
        effective_range: effective_range(test, floor_mbps),
    }
}

pub fn effective_range(test: &TestConfiguration, floor_mbps: f64) -> f64 {
    test.data
        .iter()
        .rev()
        .find(|p| p.throughput > floor_mbps)
        .map(|p| p.attenuation)
        .unwrap_or(0.0)
}

/// One line of the cross-device comparison table.
#[derive(Debug, Clone)]
pub struct ComparisonRow {
    pub device: String,
    pub software_version: String,
    pub band: Band,
    pub mode: String,
    pub summary: TestSummary,
    pub best_max: bool,
    pub best_range: bool,
}

/// Rows sharing a configuration label (`{test name} {direction}`).
#[derive(Debug, Clone)]
pub struct ComparisonGroup {
    pub config: String,
    pub rows: Vec<ComparisonRow>,
}

/// Group selected tests by configuration and flag the best performers.
pub fn comparison_rows(selected: &[SelectedTest<'_>], floor_mbps: f64) -> Vec<ComparisonGroup> {
    let mut groups: Vec<ComparisonGroup> = Vec::new();

    for sel in selected {
        let config = format!("{} {}", sel.test.test_name(), sel.test.direction_label());
        let row = ComparisonRow {
            device: sel.device_name().to_string(),
            software_version: sel.software_version().to_string(),
            band: sel.test.band,
            mode: super::model::or_unknown(&sel.test.mode).to_string(),
            summary: summarize(sel.test, floor_mbps),
            best_max: false,
            best_range: false,
        };
        match groups.iter_mut().find(|g| g.config == config) {
            Some(g) => g.rows.push(row),
            None => groups.push(ComparisonGroup {
                config,
                rows: vec![row],
            }),
        }
    }

    for group in &mut groups {
        let best_max = group
            .rows
            .iter()
            .map(|r| r.summary.max_throughput)
            .fold(f64::NEG_INFINITY, f64::max);
        let best_range = group
            .rows
            .iter()
            .map(|r| r.summary.effective_range)
            .fold(f64::NEG_INFINITY, f64::max);
        for row in &mut group.rows {
            row.best_max = row.summary.max_throughput == best_max;
            row.best_range = row.summary.effective_range == best_range;
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{DataPoint, DeviceInfo, LoadedWorkbook, Origin};

    fn test_with(series: &[(f64, f64)]) -> TestConfiguration {
        let data = series
            .iter()
            .map(|&(att, tput)| DataPoint {
                attenuation: att,
                throughput: tput,
                channel: 36.0,
                frequency: 5180.0,
                band: Band::FiveG,
                direction: Some("DUT-TX".into()),
                security: None,
                configured_bandwidth: Some("80".into()),
                configured_nss: Some("2".into()),
                bandwidth: Some("80".into()),
                nss: Some("2".into()),
                mode: Some("HE".into()),
                mcs: None,
            })
            .collect();
        TestConfiguration {
            name: "DUT-TX_CH36_80MHz_2SS_Unknown".into(),
            direction: Some("DUT-TX".into()),
            channel: 36.0,
            frequency: 5180.0,
            band: Band::FiveG,
            bandwidth: Some("80".into()),
            nss: Some("2".into()),
            mode: Some("HE".into()),
            security: None,
            sheet_name: "Rate vs Range".into(),
            data,
        }
    }

    #[test]
    fn summary_numbers() {
        let t = test_with(&[(0.0, 900.0), (10.0, 401.0), (20.0, 12.0), (30.0, 5.0)]);
        let s = summarize(&t, 10.0);
        assert_eq!(s.max_throughput, 900.0);
        assert_eq!(s.avg_throughput, 330.0);
        assert_eq!(s.effective_range, 20.0);
    }

    #[test]
    fn no_point_above_floor_means_zero_range() {
        let t = test_with(&[(0.0, 8.0), (3.0, 4.0)]);
        assert_eq!(effective_range(&t, 10.0), 0.0);
    }

    #[test]
    fn best_values_are_flagged_per_group() {
        let a = LoadedWorkbook {
            identity: "a.xlsx".into(),
            device_info: DeviceInfo::default(),
            tests: vec![test_with(&[(0.0, 900.0), (30.0, 20.0)])],
            origin: Origin::Local,
            skipped: 0,
        };
        let b = LoadedWorkbook {
            identity: "b.xlsx".into(),
            device_info: DeviceInfo::default(),
            tests: vec![test_with(&[(0.0, 950.0), (20.0, 20.0)])],
            origin: Origin::Local,
            skipped: 0,
        };
        let selected = [
            SelectedTest { workbook: &a, test: &a.tests[0] },
            SelectedTest { workbook: &b, test: &b.tests[0] },
        ];
        let groups = comparison_rows(&selected, 10.0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].config, "5G CH36 80MHz 2SS HE DUT-TX");
        let rows = &groups[0].rows;
        assert!(!rows[0].best_max && rows[0].best_range);
        assert!(rows[1].best_max && !rows[1].best_range);
    }
}
