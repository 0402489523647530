#![doc = include_str!("../README.md")]
use anyhow::Result;
use log::debug;

use std::{io::Write, path::PathBuf};

pub mod chart;
pub mod record;
pub mod report;
pub mod svg;

pub use chart::{Chart, ChartKind, Renderer, Rgb};
pub use record::{Dataset, InputMissing, Record};
pub use report::{Ranking, Report};
pub use svg::SvgRenderer;

/// The default input file.
pub const DEFAULT_PATH: &str = "vgsales.csv";
/// The default target year for the best-selling titles report.
pub const DEFAULT_YEAR: i32 = 2016;

/// Settings for a reporting run.
#[derive(Clone, Debug)]
pub struct Config {
    /// CSV file to read.
    pub path: PathBuf,
    /// Target year for the best-selling titles report.
    pub year: i32,
    /// Whether to draw charts.
    pub charts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: DEFAULT_PATH.into(),
            year: DEFAULT_YEAR,
            charts: true,
        }
    }
}

/// Loads the data at `config.path`, then prints each report section to
/// `out` and draws its chart, if any, with `renderer`.
///
/// Nothing is written to `out` if the data cannot be loaded.
///
/// # Errors
///
/// Returns any error from loading the data, writing to `out`, or drawing a
/// chart.
pub fn run(config: &Config, out: &mut impl Write, renderer: &mut impl Renderer) -> Result<()> {
    let data = Dataset::from_path(&config.path)?;
    debug!(
        "loaded {} records from {} ({} dropped)",
        data.len(),
        config.path.display(),
        data.dropped()
    );
    let report = Report::build(&data, config.year);
    for section in report.sections() {
        write!(out, "{}", section.text)?;
        let Some(chart) = section.chart.filter(|_| config.charts) else {
            continue;
        };
        let path = renderer.render(&chart)?;
        let name = path.file_name().unwrap_or(path.as_os_str());
        writeln!(out, "Chart '{}' saved!", name.to_string_lossy())?;
    }
    writeln!(out, "\n\n--- ALL ANALYSIS COMPLETE ---")?;
    Ok(())
}
