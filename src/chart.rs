use anyhow::Result;

use std::path::PathBuf;

/// An RGB color, independent of any drawing library.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const STEEL_BLUE: Self = Self(70, 130, 180);
    pub const SEA_GREEN: Self = Self(46, 139, 87);
}

/// The shape of a chart, and how its bars or slices are colored.
#[derive(Clone, Debug, PartialEq)]
pub enum ChartKind {
    /// Vertical bars in a single color.
    ///
    /// `rotate_labels` turns category labels a quarter turn (90°), since
    /// plotters only supports quarter-turn text transforms.
    Bar { color: Rgb, rotate_labels: bool },
    /// Vertical bars, each with its own color.
    ColoredBar { colors: Vec<Rgb> },
    /// Horizontal bars; the first entry is drawn at the bottom.
    HorizontalBar { color: Rgb },
    /// Slices labelled with their share of the chart's total.
    Pie,
}

/// Describes a chart to be drawn: what it shows and where it goes.
///
/// Charts are plain data, so that reports can be checked without drawing
/// anything. A [`Renderer`] turns a `Chart` into an image file.
#[derive(Clone, Debug, PartialEq)]
pub struct Chart {
    /// File name, without extension.
    pub stem: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
    pub entries: Vec<(String, f64)>,
}

impl Chart {
    /// Returns each entry's label with its percentage share of the total, to
    /// one decimal place, as shown on pie slices.
    ///
    /// ```
    /// # use vgsales::chart::{Chart, ChartKind};
    /// let chart = Chart {
    ///     stem: "pie".into(),
    ///     title: String::new(),
    ///     x_label: String::new(),
    ///     y_label: String::new(),
    ///     kind: ChartKind::Pie,
    ///     entries: vec![("A".into(), 3.0), ("B".into(), 1.0)],
    /// };
    /// assert_eq!(chart.share_labels(), vec!["A (75.0%)", "B (25.0%)"]);
    /// ```
    #[must_use]
    pub fn share_labels(&self) -> Vec<String> {
        let total: f64 = self.entries.iter().map(|(_, v)| v).sum();
        self.entries
            .iter()
            .map(|(label, value)| {
                let pct = if total > 0.0 { value / total * 100.0 } else { 0.0 };
                format!("{label} ({pct:.1}%)")
            })
            .collect()
    }
}

/// Draws charts to image files.
pub trait Renderer {
    /// Draws `chart`, overwriting any existing file, and returns the path
    /// written.
    ///
    /// # Errors
    ///
    /// Returns any error from drawing or writing the image.
    fn render(&mut self, chart: &Chart) -> Result<PathBuf>;
}
