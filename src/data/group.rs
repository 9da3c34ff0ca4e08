//! Partition extracted points into named test configurations.
//!
//! A configuration is identified by the PHY setup observed at its baseline,
//! the lowest-attenuation point of its direction + channel, so a link that
//! drops from 2SS to 1SS deep into the sweep stays in one series.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::model::{or_unknown, DataPoint, TestConfiguration};

/// Structured grouping identity. Absent fields stay `None` so they never
/// compare equal to a cell that literally reads "Unknown".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    direction: Option<String>,
    channel: u64,
    bandwidth: Option<String>,
    nss: Option<String>,
    security: Option<String>,
}

/// Render a configuration key: `{direction}_CH{channel}_{bw}MHz_{nss}SS_{security}`.
pub fn config_key(
    direction: &Option<String>,
    channel: f64,
    bandwidth: &Option<String>,
    nss: &Option<String>,
    security: &Option<String>,
) -> String {
    format!(
        "{}_CH{}_{}MHz_{}SS_{}",
        or_unknown(direction),
        channel,
        or_unknown(bandwidth),
        or_unknown(nss),
        or_unknown(security),
    )
}

fn point_order(a: &DataPoint, b: &DataPoint) -> Ordering {
    a.direction_label()
        .cmp(b.direction_label())
        .then(a.channel.total_cmp(&b.channel))
        .then(a.attenuation.total_cmp(&b.attenuation))
}

/// Group one sheet's points. Output order follows the first appearance of
/// each group in (direction, channel, attenuation) order.
pub fn group_points(sheet_name: &str, mut points: Vec<DataPoint>) -> Vec<TestConfiguration> {
    points.sort_by(point_order);

    // Sorted by attenuation within each (direction, channel), so the first
    // occurrence of a pair is its minimum-attenuation baseline.
    let mut baselines: HashMap<(Option<String>, u64), usize> = HashMap::new();
    for (idx, p) in points.iter().enumerate() {
        baselines
            .entry((p.direction.clone(), p.channel.to_bits()))
            .or_insert(idx);
    }

    let mut slots: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<TestConfiguration> = Vec::new();

    for (idx, point) in points.iter().enumerate() {
        let baseline_idx = baselines
            .get(&(point.direction.clone(), point.channel.to_bits()))
            .copied()
            .unwrap_or(idx);
        let baseline = &points[baseline_idx];

        let key = GroupKey {
            direction: point.direction.clone(),
            channel: point.channel.to_bits(),
            bandwidth: baseline.configured_bandwidth.clone(),
            nss: baseline.configured_nss.clone(),
            security: point.security.clone(),
        };

        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push(TestConfiguration {
                name: config_key(
                    &point.direction,
                    point.channel,
                    &baseline.configured_bandwidth,
                    &baseline.configured_nss,
                    &point.security,
                ),
                direction: point.direction.clone(),
                channel: point.channel,
                frequency: baseline.frequency,
                band: baseline.band,
                bandwidth: baseline.configured_bandwidth.clone(),
                nss: baseline.configured_nss.clone(),
                mode: baseline.mode.clone(),
                security: point.security.clone(),
                sheet_name: sheet_name.to_string(),
                data: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].data.push(point.clone());
    }

    let mut tests: Vec<TestConfiguration> = Vec::with_capacity(groups.len());
    for mut test in groups {
        if test.data.is_empty() {
            log::debug!("Skipping test configuration with no valid data: {}", test.name);
            continue;
        }
        test.data
            .sort_by(|a, b| a.attenuation.total_cmp(&b.attenuation));

        let at_zero = test.data.iter().find(|p| p.attenuation == 0.0);
        test.mode = at_zero.unwrap_or(&test.data[0]).mode.clone();
        tests.push(test);
    }

    disambiguate_names(&mut tests);
    tests
}

/// Suffix `#2`, `#3`, ... onto configurations whose rendered keys collide,
/// skipping any suffixed name that is already taken.
pub fn disambiguate_names(tests: &mut [TestConfiguration]) {
    let mut used: HashSet<String> = HashSet::with_capacity(tests.len());
    for test in tests.iter_mut() {
        if used.insert(test.name.clone()) {
            continue;
        }
        let mut n = 2;
        let renamed = loop {
            let candidate = format!("{}#{n}", test.name);
            if !used.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        log::warn!("Duplicate test key {}, renamed to {renamed}", test.name);
        used.insert(renamed.clone());
        test.name = renamed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::band::determine_band;

    fn point(direction: &str, channel: f64, att: f64, tput: f64, bw: &str, nss: &str) -> DataPoint {
        DataPoint {
            attenuation: att,
            throughput: tput,
            channel,
            frequency: 5180.0,
            band: determine_band(5180.0),
            direction: Some(direction.to_string()),
            security: Some("WPA2".into()),
            configured_bandwidth: Some(bw.into()),
            configured_nss: Some(nss.into()),
            bandwidth: Some(bw.into()),
            nss: Some(nss.into()),
            mode: Some(format!("HE{bw}")),
            mcs: None,
        }
    }

    #[test]
    fn drift_after_baseline_stays_in_group() {
        let points = vec![
            point("DUT-TX", 36.0, 20.0, 100.0, "40", "1"),
            point("DUT-TX", 36.0, 0.0, 900.0, "80", "2"),
            point("DUT-TX", 36.0, 10.0, 500.0, "80", "2"),
        ];
        let tests = group_points("Rate vs Range", points);
        assert_eq!(tests.len(), 1);
        let t = &tests[0];
        assert_eq!(t.name, "DUT-TX_CH36_80MHz_2SS_WPA2");
        assert_eq!(t.mode.as_deref(), Some("HE80"));
        let atts: Vec<f64> = t.data.iter().map(|p| p.attenuation).collect();
        assert_eq!(atts, vec![0.0, 10.0, 20.0]);
        // per-point measured values are kept
        assert_eq!(t.data[2].bandwidth.as_deref(), Some("40"));
    }

    #[test]
    fn directions_and_channels_split_groups() {
        let points = vec![
            point("DUT-RX", 36.0, 0.0, 800.0, "80", "2"),
            point("DUT-TX", 149.0, 0.0, 700.0, "80", "2"),
            point("DUT-TX", 36.0, 0.0, 900.0, "80", "2"),
        ];
        let tests = group_points("s", points);
        let names: Vec<&str> = tests.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "DUT-RX_CH36_80MHz_2SS_WPA2",
                "DUT-TX_CH36_80MHz_2SS_WPA2",
                "DUT-TX_CH149_80MHz_2SS_WPA2",
            ]
        );
    }

    #[test]
    fn mode_falls_back_to_lowest_attenuation_point() {
        let mut a = point("DUT-TX", 36.0, 3.0, 900.0, "80", "2");
        a.mode = Some("VHT80".into());
        let b = point("DUT-TX", 36.0, 6.0, 800.0, "80", "2");
        let tests = group_points("s", vec![b, a]);
        assert_eq!(tests[0].mode.as_deref(), Some("VHT80"));
    }

    #[test]
    fn absent_and_literal_unknown_do_not_merge() {
        let mut absent = point("DUT-TX", 36.0, 0.0, 900.0, "80", "2");
        absent.security = None;
        let mut literal = point("DUT-TX", 36.0, 3.0, 800.0, "80", "2");
        literal.security = Some("Unknown".into());
        let tests = group_points("s", vec![absent, literal]);
        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].name, "DUT-TX_CH36_80MHz_2SS_Unknown");
        assert_eq!(tests[1].name, "DUT-TX_CH36_80MHz_2SS_Unknown#2");
    }

    #[test]
    fn shuffled_input_groups_identically() {
        let base = vec![
            point("DUT-TX", 36.0, 0.0, 900.0, "80", "2"),
            point("DUT-TX", 36.0, 3.0, 850.0, "80", "2"),
            point("DUT-TX", 36.0, 6.0, 800.0, "40", "2"),
            point("DUT-RX", 36.0, 0.0, 700.0, "80", "2"),
            point("DUT-RX", 36.0, 3.0, 650.0, "80", "1"),
            point("DUT-TX", 44.0, 0.0, 600.0, "80", "2"),
        ];
        let mut shuffled = base.clone();
        shuffled.reverse();
        shuffled.swap(0, 3);

        let a = group_points("s", base);
        let b = group_points("s", shuffled);
        assert_eq!(a, b);
    }

    fn named(name: &str) -> TestConfiguration {
        let mut test = group_points("s", vec![point("DUT-TX", 36.0, 0.0, 900.0, "80", "2")]).remove(0);
        test.name = name.to_string();
        test
    }

    #[test]
    fn suffix_skips_names_already_taken() {
        let mut tests = vec![named("X"), named("X#2"), named("X"), named("X")];
        disambiguate_names(&mut tests);
        let names: Vec<&str> = tests.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["X", "X#2", "X#3", "X#4"]);
    }
}
