use super::model::Band;

/// Classify a centre frequency (MHz). Ranges are inclusive and disjoint.
pub fn determine_band(frequency: f64) -> Band {
    if (2412.0..=2484.0).contains(&frequency) {
        Band::TwoG
    } else if (5160.0..=5885.0).contains(&frequency) {
        Band::FiveG
    } else if (5925.0..=7125.0).contains(&frequency) {
        Band::SixG
    } else {
        Band::Unknown
    }
}

/// Channel number for display and export.
///
/// Some vendors continue 6 GHz numbering past 190; fold it back.
pub fn format_channel_number(channel: f64, band: Band) -> f64 {
    if band == Band::SixG && channel >= 191.0 {
        channel - 190.0
    } else {
        channel
    }
}
