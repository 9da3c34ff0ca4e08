use crate::error::SheetError;

use super::model::{CellValue, Perspective};

// Alias spellings tried in order for the direction-specific columns.
pub const TX_BANDWIDTH: &[&str] = &["tx bw", "txbw", "tx_bw", "tx bandwidth"];
pub const TX_NSS: &[&str] = &["tx nss", "txnss", "tx_nss"];
pub const TX_MODE: &[&str] = &["tx mode", "txmode", "tx_mode"];
pub const TX_MCS: &[&str] = &["tx mcs", "txmcs", "tx_mcs"];

pub const RX_BANDWIDTH: &[&str] = &["rx bw", "rxbw", "rx_bw", "rx bandwidth"];
pub const RX_NSS: &[&str] = &["rx nss", "rxnss", "rx_nss"];
pub const RX_MODE: &[&str] = &["rx mode", "rxmode", "rx_mode"];
pub const RX_MCS: &[&str] = &["rx mcs", "rxmcs", "rx_mcs"];

/// Find the column for `field`: exact case-insensitive match first, then
/// the first header containing it as a substring.
pub fn find_column(headers: &[CellValue], field: &str) -> Option<usize> {
    find_unclaimed(headers, field, &[])
}

/// Like [`find_column`], but never returns an index in `claimed`.
pub fn find_unclaimed(headers: &[CellValue], field: &str, claimed: &[usize]) -> Option<usize> {
    let needle = field.to_lowercase();
    let lowered: Vec<Option<String>> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if claimed.contains(&i) {
                None
            } else {
                h.as_text().map(|s| s.to_lowercase())
            }
        })
        .collect();

    lowered
        .iter()
        .position(|h| h.as_deref() == Some(needle.as_str()))
        .or_else(|| {
            lowered
                .iter()
                .position(|h| h.as_deref().is_some_and(|s| s.contains(&needle)))
        })
}

/// First alias that resolves, in order.
pub fn find_first(headers: &[CellValue], aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|alias| find_column(headers, alias))
}

/// PHY columns specific to one direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionalColumns {
    pub bandwidth: Option<usize>,
    pub nss: Option<usize>,
    pub mode: Option<usize>,
    pub mcs: Option<usize>,
}

impl DirectionalColumns {
    fn resolve(headers: &[CellValue], bw: &[&str], nss: &[&str], mode: &[&str], mcs: &[&str]) -> Self {
        Self {
            bandwidth: find_first(headers, bw),
            nss: find_first(headers, nss),
            mode: find_first(headers, mode),
            mcs: find_first(headers, mcs),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bandwidth.is_none() && self.nss.is_none() && self.mode.is_none() && self.mcs.is_none()
    }

    fn indices(&self) -> impl Iterator<Item = usize> {
        [self.bandwidth, self.nss, self.mode, self.mcs].into_iter().flatten()
    }
}

/// Logical field → column position for one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnIndexMap {
    pub attenuation: Option<usize>,
    pub throughput: Option<usize>,
    pub direction: Option<usize>,
    pub channel: Option<usize>,
    pub frequency: Option<usize>,
    pub security: Option<usize>,
    /// Generic columns; also the fallback for missing directional ones.
    pub shared: DirectionalColumns,
    pub tx: DirectionalColumns,
    pub rx: DirectionalColumns,
}

impl ColumnIndexMap {
    pub fn resolve(headers: &[CellValue]) -> Self {
        let tx = DirectionalColumns::resolve(headers, TX_BANDWIDTH, TX_NSS, TX_MODE, TX_MCS);
        let rx = DirectionalColumns::resolve(headers, RX_BANDWIDTH, RX_NSS, RX_MODE, RX_MCS);
        // "TX BW" contains "bw": generic fields skip columns a direction already owns.
        let claimed: Vec<usize> = tx.indices().chain(rx.indices()).collect();

        let map = Self {
            attenuation: find_column(headers, "attenuation"),
            throughput: find_column(headers, "throughput"),
            direction: find_column(headers, "direction"),
            channel: find_column(headers, "channel"),
            frequency: find_column(headers, "frequency"),
            security: find_column(headers, "security"),
            shared: DirectionalColumns {
                bandwidth: find_unclaimed(headers, "bw", &claimed),
                nss: find_unclaimed(headers, "nss", &claimed),
                mode: find_unclaimed(headers, "mode", &claimed),
                mcs: find_unclaimed(headers, "mcs", &claimed),
            },
            tx,
            rx,
        };
        log::debug!("Column indices: {map:?}");
        map
    }

    /// Attenuation and throughput columns, which every data sheet must have.
    pub fn required(&self) -> Result<(usize, usize), SheetError> {
        let att = self
            .attenuation
            .ok_or(SheetError::MissingColumn { field: "attenuation" })?;
        let tput = self
            .throughput
            .ok_or(SheetError::MissingColumn { field: "throughput" })?;
        Ok((att, tput))
    }

    /// Effective PHY columns for a row read from `perspective`: the
    /// direction-specific column where present, else the generic one.
    pub fn phy_columns(&self, perspective: Perspective) -> DirectionalColumns {
        let specific = match perspective {
            Perspective::Tx => self.tx,
            Perspective::Rx => self.rx,
            Perspective::Neutral => return self.shared,
        };
        DirectionalColumns {
            bandwidth: specific.bandwidth.or(self.shared.bandwidth),
            nss: specific.nss.or(self.shared.nss),
            mode: specific.mode.or(self.shared.mode),
            mcs: specific.mcs.or(self.shared.mcs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<CellValue> {
        names.iter().map(|n| CellValue::from(*n)).collect()
    }

    #[test]
    fn exact_match_beats_earlier_substring() {
        let h = headers(&["Tx Mode", "Mode"]);
        assert_eq!(find_column(&h, "mode"), Some(1));
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let h = headers(&["Test Band Configuration", "Throughput (Mbps)", "Attenuation"]);
        assert_eq!(find_column(&h, "throughput"), Some(1));
        assert_eq!(find_column(&h, "ATTENUATION"), Some(2));
        assert_eq!(find_column(&h, "channel"), None);
    }

    #[test]
    fn blank_headers_are_ignored() {
        let h = vec![CellValue::Empty, CellValue::from(""), CellValue::from("BW")];
        assert_eq!(find_column(&h, "bw"), Some(2));
    }

    #[test]
    fn aliases_are_tried_in_order() {
        let h = headers(&["tx_bw", "TX Bandwidth"]);
        assert_eq!(find_first(&h, TX_BANDWIDTH), Some(0));
        let h = headers(&["TX Bandwidth"]);
        assert_eq!(find_first(&h, TX_BANDWIDTH), Some(0));
        assert_eq!(find_first(&h, RX_BANDWIDTH), None);
    }

    #[test]
    fn tx_direction_prefers_tx_columns() {
        let map = ColumnIndexMap::resolve(&headers(&["TX BW", "BW"]));
        assert_eq!(map.shared.bandwidth, Some(1));
        assert_eq!(map.phy_columns(Perspective::Tx).bandwidth, Some(0));
        assert_eq!(map.phy_columns(Perspective::Rx).bandwidth, Some(1));
        assert_eq!(map.phy_columns(Perspective::Neutral).bandwidth, Some(1));
    }

    #[test]
    fn missing_directional_column_falls_back_per_field() {
        let map = ColumnIndexMap::resolve(&headers(&["RX NSS", "NSS", "BW", "Mode"]));
        let rx = map.phy_columns(Perspective::Rx);
        assert_eq!(rx.nss, Some(0));
        assert_eq!(rx.bandwidth, Some(2));
        assert_eq!(rx.mode, Some(3));
    }

    #[test]
    fn directional_only_headers_have_no_generic_columns() {
        let map = ColumnIndexMap::resolve(&headers(&[
            "Attenuation", "Throughput", "Direction", "Channel", "Frequency",
            "TX BW", "RX BW", "TX NSS", "RX NSS",
        ]));
        assert_eq!(map.shared.bandwidth, None);
        assert_eq!(map.shared.nss, None);
        assert_eq!(map.phy_columns(Perspective::Rx).bandwidth, Some(6));
        assert_eq!(map.phy_columns(Perspective::Rx).nss, Some(8));
        assert_eq!(map.phy_columns(Perspective::Tx).bandwidth, Some(5));
    }

    #[test]
    fn required_columns() {
        let map = ColumnIndexMap::resolve(&headers(&["Attenuation", "Thruput"]));
        assert_eq!(
            map.required(),
            Err(SheetError::MissingColumn { field: "throughput" })
        );
        let map = ColumnIndexMap::resolve(&headers(&["Throughput", "Attenuation"]));
        assert_eq!(map.required(), Ok((1, 0)));
    }
}
