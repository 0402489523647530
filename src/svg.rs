use anyhow::Result;
use log::debug;
use plotters::{element::Pie, prelude::*};

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::chart::{Chart, ChartKind, Renderer, Rgb};

const SIZE: (u32, u32) = (1200, 800);
const FONT: &str = "sans-serif";

/// Slice colors for pie charts, repeated if there are more slices.
const PALETTE: [Rgb; 10] = [
    Rgb(0x1f, 0x77, 0xb4),
    Rgb(0xff, 0x7f, 0x0e),
    Rgb(0x2c, 0xa0, 0x2c),
    Rgb(0xd6, 0x27, 0x28),
    Rgb(0x94, 0x67, 0xbd),
    Rgb(0x8c, 0x56, 0x4b),
    Rgb(0xe3, 0x77, 0xc2),
    Rgb(0x7f, 0x7f, 0x7f),
    Rgb(0xbc, 0xbd, 0x22),
    Rgb(0x17, 0xbe, 0xcf),
];

impl From<Rgb> for RGBColor {
    fn from(c: Rgb) -> Self {
        RGBColor(c.0, c.1, c.2)
    }
}

/// Renders charts as SVG files in a given directory.
#[derive(Debug)]
pub struct SvgRenderer {
    out_dir: PathBuf,
}

impl SvgRenderer {
    #[must_use]
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, chart: &Chart) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(format!("{}.svg", chart.stem));
        match &chart.kind {
            ChartKind::Bar {
                color,
                rotate_labels,
            } => {
                let colors = vec![*color; chart.entries.len()];
                draw_vertical(&path, chart, &colors, *rotate_labels)?;
            }
            ChartKind::ColoredBar { colors } => draw_vertical(&path, chart, colors, false)?,
            ChartKind::HorizontalBar { color } => draw_horizontal(&path, chart, *color)?,
            ChartKind::Pie => draw_pie(&path, chart)?,
        }
        debug!("wrote chart {}", path.display());
        Ok(path)
    }
}

/// Returns an upper bound for the value axis with some headroom.
fn axis_max(entries: &[(String, f64)]) -> f64 {
    let max = entries.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn category_label(labels: &[(String, f64)], v: &SegmentValue<usize>) -> String {
    match v {
        SegmentValue::CenterOf(i) => labels.get(*i).map(|(l, _)| l.clone()).unwrap_or_default(),
        _ => String::new(),
    }
}

fn draw_vertical(path: &Path, chart: &Chart, colors: &[Rgb], rotate_labels: bool) -> Result<()> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let n = chart.entries.len();
    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT, 28))
        .margin(20)
        .x_label_area_size(if rotate_labels { 90 } else { 50 })
        .y_label_area_size(70)
        .build_cartesian_2d((0..n.max(1)).into_segmented(), 0.0..axis_max(&chart.entries))?;

    let label_style = if rotate_labels {
        TextStyle::from((FONT, 14).into_font()).transform(FontTransform::Rotate90)
    } else {
        TextStyle::from((FONT, 14).into_font())
    };
    let formatter = |v: &SegmentValue<usize>| category_label(&chart.entries, v);
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(n.max(1))
        .x_label_style(label_style)
        .x_label_formatter(&formatter)
        .x_desc(&chart.x_label)
        .y_desc(&chart.y_label)
        .axis_desc_style((FONT, 16))
        .draw()?;

    for (i, (_, value)) in chart.entries.iter().enumerate() {
        let color: RGBColor = colors.get(i).copied().unwrap_or(Rgb::STEEL_BLUE).into();
        ctx.draw_series(
            Histogram::vertical(&ctx)
                .style(color.filled())
                .margin(8)
                .data([(i, *value)]),
        )?;
    }
    root.present()?;
    Ok(())
}

fn draw_horizontal(path: &Path, chart: &Chart, color: Rgb) -> Result<()> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let n = chart.entries.len();
    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(320)
        .build_cartesian_2d(0.0..axis_max(&chart.entries), (0..n.max(1)).into_segmented())?;

    let formatter = |v: &SegmentValue<usize>| category_label(&chart.entries, v);
    ctx.configure_mesh()
        .disable_y_mesh()
        .y_labels(n.max(1))
        .y_label_formatter(&formatter)
        .x_desc(&chart.x_label)
        .y_desc(&chart.y_label)
        .axis_desc_style((FONT, 16))
        .draw()?;

    let color: RGBColor = color.into();
    ctx.draw_series(
        Histogram::horizontal(&ctx)
            .style(color.filled())
            .margin(6)
            .data(chart.entries.iter().enumerate().map(|(i, (_, v))| (i, *v))),
    )?;
    root.present()?;
    Ok(())
}

fn draw_pie(path: &Path, chart: &Chart) -> Result<()> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(&chart.title, (FONT, 28))?;

    let sizes: Vec<f64> = chart.entries.iter().map(|(_, v)| *v).collect();
    let total: f64 = sizes.iter().sum();
    if total > 0.0 {
        let (w, h) = root.dim_in_pixel();
        let center = (i32::try_from(w / 2)?, i32::try_from(h / 2)?);
        let radius = f64::from(w.min(h)) * 0.35;
        let colors: Vec<RGBColor> = (0..sizes.len())
            .map(|i| PALETTE[i % PALETTE.len()].into())
            .collect();
        let labels = chart.share_labels();
        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(140.0);
        pie.label_style((FONT, 18).into_font().color(&BLACK));
        root.draw(&pie)?;
    }
    root.present()?;
    Ok(())
}
