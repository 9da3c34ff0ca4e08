//! Writes sample RvR workbooks into a `reports/` tree.
//!
//! ```text
//! generate_sample                 one 5g_2x2_ch44 report for Adtran SDG-8612
//! generate_sample --multiple      six test configurations for that device
//! generate_sample --comparison    four device versions sharing two configurations
//! generate_sample --structure     directories only
//! generate_sample --custom <vendor> <model> <version> <test_config>
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::Local;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

const REPORTS_DIR: &str = "reports";

const DEFAULT_DEVICE: (&str, &str, &str) = ("Adtran", "SDG-8612", "25.6.3.1");
const DEFAULT_CONFIG: &str = "5g_2x2_ch44";

const MULTIPLE_CONFIGS: [&str; 6] = [
    "5g_2x2_ch44",
    "5g_2x2_ch149",
    "2g_2x2_ch6",
    "5g_4x4_ch44",
    "5g_4x4_ch149",
    "6g_2x2_ch37",
];

const COMPARISON_DEVICES: [(&str, &str, &str); 4] = [
    ("Adtran", "SDG-8612", "25.6.3.1"),
    ("Adtran", "SDG-8612", "25.6.4.0"),
    ("Eero", "Max7", "1.2.3"),
    ("Netgear", "RAX80", "3.0.1.4"),
];
const COMPARISON_CONFIGS: [&str; 2] = ["5g_2x2_ch44", "5g_2x2_ch149"];

const RVR_HEADERS: [&str; 15] = [
    "Test Band Configuration",
    "STA Reported",
    "Throughput (Mbps)",
    "Direction",
    "Type",
    "Payload Size",
    "Channel",
    "Frequency",
    "NSS",
    "BW",
    "Security",
    "Angle",
    "Attenuation",
    "Tilt",
    "Tx Mode",
];

// ---------------------------------------------------------------------------
// Test configuration names: `5g_2x2_ch44`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct TestParams {
    max_throughput: f64,
    bandwidth: u32,
    nss: u32,
    channel: u32,
    frequency: u32,
}

impl Default for TestParams {
    fn default() -> Self {
        Self {
            max_throughput: 1000.0,
            bandwidth: 80,
            nss: 2,
            channel: 44,
            frequency: 5220,
        }
    }
}

/// Parts are applied left to right, so later parts override earlier ones.
fn parse_test_config(config: &str) -> TestParams {
    let mut p = TestParams::default();

    for part in config.to_lowercase().split('_') {
        if let Some(ch) = part.strip_prefix("ch") {
            let Ok(channel) = ch.parse::<u32>() else {
                continue;
            };
            p.channel = channel;
            match channel {
                0..=14 => {
                    p.frequency = 2412 + channel.saturating_sub(1) * 5;
                    p.max_throughput = 200.0;
                    p.bandwidth = 20;
                }
                36..=64 => p.frequency = 5180 + (channel - 36) * 5,
                100..=144 => p.frequency = 5500 + (channel - 100) * 5,
                149..=165 => p.frequency = 5745 + (channel - 149) * 5,
                1..=233 => {
                    p.frequency = 5955 + (channel - 1) * 5;
                    p.max_throughput = 1200.0;
                    p.bandwidth = 160;
                }
                _ => {}
            }
        } else if part.contains('x') {
            if let Some(Ok(nss)) = part.split('x').next().map(str::parse::<u32>) {
                p.nss = nss;
                p.max_throughput = (p.max_throughput * nss as f64 / 2.0).min(2000.0);
            }
        } else if part.starts_with("2g") {
            p.max_throughput = 200.0;
            p.bandwidth = 20;
        } else if part.starts_with("5g") {
            p.max_throughput = 1000.0;
            p.bandwidth = 80;
        } else if part.starts_with("6g") {
            p.max_throughput = 1200.0;
            p.bandwidth = 160;
        }
    }
    p
}

/// Throughput before noise: flat-ish, a steep fall, a floor, then link loss.
fn throughput_model(base: f64, att: f64) -> f64 {
    if att <= 15.0 {
        base - att * 2.0
    } else if att <= 30.0 {
        base - 30.0 - (att - 15.0) * 20.0
    } else if att <= 45.0 {
        (base - 330.0 - (att - 30.0) * 30.0).max(50.0)
    } else {
        (50.0 - (att - 45.0) * 10.0).max(0.0)
    }
}

// ---------------------------------------------------------------------------
// PRNG
// ---------------------------------------------------------------------------

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

// ---------------------------------------------------------------------------
// Workbook writing
// ---------------------------------------------------------------------------

fn write_item_value_sheet(
    sheet: &mut Worksheet,
    bold: &Format,
    rows: &[(&str, String)],
) -> Result<(), XlsxError> {
    sheet.write_string_with_format(0, 0, "Item", bold)?;
    sheet.write_string_with_format(0, 1, "Value", bold)?;
    for (i, (item, value)) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, *item)?;
        sheet.write_string(r, 1, value)?;
    }
    Ok(())
}

fn set_widths(sheet: &mut Worksheet) -> Result<(), XlsxError> {
    sheet.set_column_range_width(0, 1, 25)?;
    sheet.set_column_range_width(2, 14, 15)?;
    Ok(())
}

fn write_rvr_sheet(
    sheet: &mut Worksheet,
    bold: &Format,
    config: &str,
    params: &TestParams,
    rng: &mut SimpleRng,
) -> Result<(), XlsxError> {
    // preamble the extractor has to skip over
    sheet.write_string(0, 0, "Test Case Description")?;
    sheet.write_string(
        1,
        0,
        format!("Rate vs Range Loop: 1 - {config}\nDownstream port: 1.1.18 wlan2 with OS: Linux"),
    )?;

    let header_row = 5;
    for (c, h) in RVR_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(header_row, c as u16, *h, bold)?;
    }

    // one blank row after the header, then the sweeps
    let mut row = header_row + 2;
    for direction in ["DUT-TX", "DUT-RX"] {
        for att in (0..=60).step_by(3) {
            let att = att as f64;
            let mut base = params.max_throughput;
            if direction == "DUT-RX" {
                base *= 0.98;
            }
            let throughput = (throughput_model(base, att) + rng.gauss(0.0, 10.0))
                .trunc()
                .max(0.0);
            let rssi = -40 - att as i32;

            sheet.write_string(row, 0, "AUTO")?;
            sheet.write_string(
                row,
                1,
                format!(
                    "STA-RSSI Data/Beacon: {rssi}/{} Rx-Rate: 1.201G Tx-Rate: 1.201G",
                    rssi + 5
                ),
            )?;
            sheet.write_number(row, 2, throughput)?;
            sheet.write_string(row, 3, direction)?;
            sheet.write_string(row, 4, "TCP")?;
            sheet.write_string(row, 5, "MTU")?;
            sheet.write_number(row, 6, params.channel)?;
            sheet.write_number(row, 7, params.frequency)?;
            sheet.write_number(row, 8, params.nss)?;
            sheet.write_number(row, 9, params.bandwidth)?;
            sheet.write_string(row, 10, "WPA3")?;
            sheet.write_string(row, 11, "NA")?;
            sheet.write_number(row, 12, att)?;
            sheet.write_string(row, 13, "NA")?;
            sheet.write_string(row, 14, if throughput > 10.0 { "HE" } else { "OFDM" })?;
            row += 1;
        }
    }
    Ok(())
}

fn report_dir(vendor: &str, model: &str, version: &str, config: &str) -> PathBuf {
    Path::new(REPORTS_DIR)
        .join(vendor)
        .join(model)
        .join(version)
        .join(config)
}

fn create_report(
    vendor: &str,
    model: &str,
    version: &str,
    config: &str,
    rng: &mut SimpleRng,
) -> anyhow::Result<PathBuf> {
    let dir = report_dir(vendor, model, version, config);
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join("report.xlsx");

    let params = parse_test_config(config);
    let now = Local::now();
    let bold = Format::new().set_bold();
    let mut workbook = Workbook::new();

    // 1. Summary
    {
        let sheet = workbook.add_worksheet().set_name("Summary")?;
        let headers = ["Test", "Result", "Score", "Elapsed", "Details"];
        for (c, h) in headers.iter().enumerate() {
            sheet.write_string_with_format(0, c as u16, *h, &bold)?;
        }
        let values = [
            "Rate vs Range Test".to_string(),
            "Complete".to_string(),
            "N/A".to_string(),
            "00:15:00".to_string(),
            format!("Automated test run for {config}"),
        ];
        for (c, v) in values.iter().enumerate() {
            sheet.write_string(1, c as u16, v)?;
        }
        set_widths(sheet)?;
    }

    // 2. Device Under Test Information
    {
        let sheet = workbook
            .add_worksheet()
            .set_name("Device Under Test Information")?;
        let rows = [
            ("Name", format!("{vendor} {model}")),
            ("Software Version", version.to_string()),
            ("Hardware Version", "Rev A".to_string()),
            ("Model Number", model.to_string()),
            ("Serial Number", "SN123456".to_string()),
            ("Test Date", now.format("%Y-%m-%d").to_string()),
            ("Tester", "Test Engineer".to_string()),
        ];
        write_item_value_sheet(sheet, &bold, &rows)?;
        set_widths(sheet)?;
    }

    // 3. Rate vs Range data
    {
        let sheet = workbook.add_worksheet().set_name("Rate vs Range 1")?;
        write_rvr_sheet(sheet, &bold, config, &params, rng)?;
        set_widths(sheet)?;
    }

    // 4. Testbed Information
    {
        let sheet = workbook.add_worksheet().set_name("Testbed Information")?;
        let rows = [
            ("Current Date", now.format("%a %b %d %H:%M:%S %Z %Y").to_string()),
            ("Testbed Manufacturer", "Test Equipment Vendor".to_string()),
            ("Build Date", now.format("%a %b %d %I:%M:%S %p %Z %Y").to_string()),
            ("Modes", "AUTO".to_string()),
            ("Test Environment", "RF Chamber".to_string()),
            ("Temperature", "23°C".to_string()),
            ("Humidity", "45%".to_string()),
        ];
        write_item_value_sheet(sheet, &bold, &rows)?;
        set_widths(sheet)?;
    }

    workbook
        .save(&path)
        .with_context(|| format!("writing {}", path.display()))?;

    println!("Excel template created: {}", path.display());
    println!("Test configuration: {config}");
    println!("Parameters: {params:?}");
    Ok(path)
}

fn usage() {
    println!("Available options:");
    println!("  --multiple    : Create multiple test configs for default device");
    println!("  --comparison  : Create comparison example with multiple devices");
    println!("  --structure   : Create directory structure only");
    println!("  --custom <vendor> <model> <version> <test_config>");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut rng = SimpleRng::new(42);
    let (vendor, model, version) = DEFAULT_DEVICE;

    match args.first().map(String::as_str) {
        None => {
            create_report(vendor, model, version, DEFAULT_CONFIG, &mut rng)?;
        }
        Some("--multiple") => {
            let mut created = Vec::new();
            for config in MULTIPLE_CONFIGS {
                match create_report(vendor, model, version, config, &mut rng) {
                    Ok(path) => created.push(path),
                    Err(e) => eprintln!("Error creating {config}: {e:#}"),
                }
            }
            println!("\nCreated {} test configuration templates:", created.len());
            for path in &created {
                println!("  {}", path.display());
            }
        }
        Some("--comparison") => {
            println!("Creating device comparison example...");
            for (vendor, model, version) in COMPARISON_DEVICES {
                println!("\nCreating templates for {vendor} {model} v{version}...");
                for config in COMPARISON_CONFIGS {
                    create_report(vendor, model, version, config, &mut rng)?;
                }
            }
            println!("\nExample comparison structure created!");
        }
        Some("--structure") => {
            let layout: [(&str, &str, [&str; 2], &[&str]); 3] = [
                ("Adtran", "SDG-8612", ["25.6.3.1", "25.6.4.0"], &["5g_2x2_ch44", "5g_2x2_ch149", "2g_2x2_ch6"]),
                ("Eero", "Max7", ["1.2.3", "1.3.0"], &["5g_4x4_ch44", "5g_4x4_ch149"]),
                ("Netgear", "RAX80", ["3.0.1.4", "3.0.2.0"], &["5g_4x4_ch44", "5g_4x4_ch149"]),
            ];
            for (vendor, model, versions, configs) in layout {
                for version in versions {
                    for config in configs {
                        let dir = report_dir(vendor, model, version, config);
                        std::fs::create_dir_all(&dir)
                            .with_context(|| format!("creating {}", dir.display()))?;
                        println!("Created directory: {}", dir.display());
                    }
                }
            }
        }
        Some("--custom") => {
            let [_, vendor, model, version, config, ..] = args.as_slice() else {
                usage();
                bail!("--custom needs <vendor> <model> <version> <test_config>");
            };
            create_report(vendor, model, version, config, &mut rng)?;
        }
        Some(other) => {
            usage();
            bail!("unknown command: {other}");
        }
    }
    Ok(())
}
