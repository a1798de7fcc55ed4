//! Chart description and rendering
//!
//! Reports describe what to draw with a [`ChartSpec`] (categorical x labels,
//! one or two y axes holding labelled series of optional values) and hand it
//! to a [`SeriesRenderer`]. [`PlottersRenderer`] draws it to a bitmap file
//! with plotters; tests substitute a recording renderer.
//!
//! ## Axis scales
//!
//! - [`AxisScale::Rank`]: inverted axis, rank 1 at the top, ticks at 1..=limit
//!   and half a rank of margin on either side. Plotted as `-rank` so the
//!   coordinate range stays ascending.
//! - [`AxisScale::Linear`]: zero-based, 10% headroom, optional [`UnitScale`]
//!   tick labels.
//!
//! Missing values (`None`) split a series into separate runs, leaving a gap.

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const BACKGROUND: RGBColor = RGBColor(0, 0, 0);
const TEXT: RGBColor = RGBColor(230, 230, 230);
const AXIS: RGBColor = RGBColor(150, 150, 150);
const GRID: RGBColor = RGBColor(45, 45, 45);

const MAX_X_LABELS: usize = 24;
const LINEAR_Y_LABELS: usize = 8;

const LEGEND_ROWS: usize = 8;
const LEGEND_ROW_HEIGHT: u32 = 22;
const LEGEND_PADDING: u32 = 10;
const LEGEND_INDENT: u32 = 110;

/// Series colors for the dark theme, cycled in order
pub const PALETTE: [Rgb; 10] = [
    Rgb(0x8d, 0xd3, 0xc7),
    Rgb(0xfe, 0xff, 0xb3),
    Rgb(0xbf, 0xbb, 0xd9),
    Rgb(0xfa, 0x81, 0x74),
    Rgb(0x81, 0xb1, 0xd2),
    Rgb(0xfd, 0xb4, 0x62),
    Rgb(0xb3, 0xde, 0x69),
    Rgb(0xbc, 0x82, 0xbd),
    Rgb(0xcc, 0xeb, 0xc4),
    Rgb(0xff, 0xed, 0x6f),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#RRGGBB` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some(Self(channel(0)?, channel(2)?, channel(4)?))
    }

    fn to_plotters(self) -> RGBColor {
        RGBColor(self.0, self.1, self.2)
    }
}

/// Human-readable tick labels: `value / divisor`, fixed precision, thousands
/// separators, then the suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitScale {
    pub divisor: f64,
    pub suffix: String,
    pub precision: usize,
}

impl UnitScale {
    pub fn new(divisor: f64, suffix: &str, precision: usize) -> Self {
        Self {
            divisor,
            suffix: suffix.to_string(),
            precision,
        }
    }

    /// Request counts in billions
    pub fn billions() -> Self {
        Self::new(1_000_000_000.0, "bil.", 0)
    }

    /// Bandwidth stored in gigabytes, shown in petabytes
    pub fn petabytes_from_gigabytes() -> Self {
        Self::new(1_000_000.0, "PB", 1)
    }

    pub fn format(&self, value: f64) -> String {
        let scaled = format!("{:.*}", self.precision, value / self.divisor);
        format!("{} {}", group_thousands(&scaled), self.suffix)
    }
}

/// Insert `,` every three digits of the integer part of a formatted number
pub fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}{}{}", sign, grouped, frac_part)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisScale {
    Rank { limit: usize },
    Linear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub label: String,
    /// One value per x label; `None` leaves a gap
    pub values: Vec<Option<f64>>,
    pub color: Option<Rgb>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub scale: AxisScale,
    pub units: Option<UnitScale>,
    /// Tick label color; defaults to the theme text color
    pub color: Option<Rgb>,
    pub series: Vec<PlotSeries>,
}

impl Axis {
    pub fn new(scale: AxisScale) -> Self {
        Self {
            scale,
            units: None,
            color: None,
            series: Vec::new(),
        }
    }

    /// Coordinate range in plot space, ascending
    pub fn y_range(&self) -> (f64, f64) {
        match self.scale {
            AxisScale::Rank { limit } => (-(limit as f64 + 0.5), -0.5),
            AxisScale::Linear => {
                let max = self
                    .series
                    .iter()
                    .flat_map(|s| s.values.iter().flatten())
                    .fold(0.0_f64, |acc, v| acc.max(*v));
                if max > 0.0 {
                    (0.0, max * 1.1)
                } else {
                    (0.0, 1.0)
                }
            }
        }
    }

    pub fn to_plot(&self, value: f64) -> f64 {
        match self.scale {
            AxisScale::Rank { .. } => -value,
            AxisScale::Linear => value,
        }
    }

    pub fn tick_count(&self) -> usize {
        match self.scale {
            AxisScale::Rank { limit } => limit,
            AxisScale::Linear => LINEAR_Y_LABELS,
        }
    }

    /// Label for a tick at plot-space coordinate `y`
    pub fn tick_label(&self, y: f64) -> String {
        match self.scale {
            AxisScale::Rank { limit } => {
                let rank = -y;
                let rounded = rank.round();
                if (rank - rounded).abs() > 1e-6 || rounded < 1.0 || rounded > limit as f64 {
                    String::new()
                } else {
                    format!("{}", rounded as usize)
                }
            }
            AxisScale::Linear => match &self.units {
                Some(units) => units.format(y),
                None => group_thousands(&format!("{:.0}", y)),
            },
        }
    }

    /// Contiguous runs of present values, as plot-space points
    pub fn runs(&self, series: &PlotSeries) -> Vec<Vec<(f64, f64)>> {
        let mut runs = Vec::new();
        let mut current = Vec::new();

        for (i, value) in series.values.iter().enumerate() {
            match value {
                Some(v) => current.push((i as f64, self.to_plot(*v))),
                None => {
                    if !current.is_empty() {
                        runs.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }

        runs
    }

    fn label_color(&self) -> RGBColor {
        self.color.map(Rgb::to_plotters).unwrap_or(TEXT)
    }
}

/// Everything a renderer needs to draw one chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_labels: Vec<String>,
    pub primary: Axis,
    /// Right-hand axis sharing the x axis
    pub secondary: Option<Axis>,
    pub markers: bool,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        let no_series = self.primary.series.is_empty()
            && self.secondary.as_ref().map_or(true, |s| s.series.is_empty());
        self.x_labels.is_empty() || no_series
    }

    pub fn series_count(&self) -> usize {
        self.primary.series.len() + self.secondary.as_ref().map_or(0, |s| s.series.len())
    }
}

/// Capability to turn a [`ChartSpec`] into an image file
pub trait SeriesRenderer {
    fn render(&self, chart: &ChartSpec, output: &Path) -> Result<()>;
}

impl<R: SeriesRenderer + ?Sized> SeriesRenderer for &R {
    fn render(&self, chart: &ChartSpec, output: &Path) -> Result<()> {
        (**self).render(chart, output)
    }
}

pub struct PlottersRenderer {
    width: u32,
    height: u32,
}

impl PlottersRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn draw_blank(&self, root: &DrawingArea<BitMapBackend<'_>, Shift>, chart: &ChartSpec) -> Result<()> {
        let (width, height) = root.dim_in_pixel();
        root.draw(&Text::new(
            chart.title.clone(),
            (20, 20),
            ("sans-serif", 32).into_font().color(&TEXT),
        ))?;
        root.draw(&Text::new(
            "No data".to_string(),
            (width as i32 / 2 - 50, height as i32 / 2),
            ("sans-serif", 28).into_font().color(&AXIS),
        ))?;
        Ok(())
    }

    fn draw_single(&self, root: &DrawingArea<BitMapBackend<'_>, Shift>, chart: &ChartSpec) -> Result<()> {
        let axis = &chart.primary;
        let (y_min, y_max) = axis.y_range();

        // Legend below the axes so it never covers the latest months
        let (_, height) = root.dim_in_pixel();
        let legend_height = legend_height(axis.series.len()).min(height / 2);
        let (plot_area, legend_area) = root.split_vertically(height - legend_height);

        let mut ctx = ChartBuilder::on(&plot_area)
            .caption(&chart.title, ("sans-serif", 32).into_font().color(&TEXT))
            .margin(20)
            .x_label_area_size(70)
            .y_label_area_size(90)
            .build_cartesian_2d(x_range(chart.x_labels.len()), y_min..y_max)?;

        let x_formatter = |x: &f64| x_label_at(&chart.x_labels, *x);
        let y_formatter = |y: &f64| axis.tick_label(*y);

        ctx.configure_mesh()
            .x_labels(chart.x_labels.len().min(MAX_X_LABELS))
            .y_labels(axis.tick_count())
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .axis_style(ShapeStyle::from(&AXIS).stroke_width(2))
            .light_line_style(ShapeStyle::from(&GRID).stroke_width(1))
            .bold_line_style(ShapeStyle::from(&GRID).stroke_width(1))
            .x_label_style(("sans-serif", 14).into_font().color(&TEXT))
            .y_label_style(("sans-serif", 16).into_font().color(&axis.label_color()))
            .draw()?;

        let mut legend = Vec::with_capacity(axis.series.len());
        for (index, series) in axis.series.iter().enumerate() {
            let color = series_color(series, index);
            let runs = axis.runs(series);

            for run in &runs {
                ctx.draw_series(LineSeries::new(run.iter().copied(), color.stroke_width(2)))?;
            }
            if chart.markers {
                ctx.draw_series(runs.iter().flatten().map(|&p| Circle::new(p, 4, color.filled())))?;
            }
            legend.push((series.label.as_str(), color));
        }

        draw_legend(&legend_area, &legend, chart.markers)?;

        Ok(())
    }

    fn draw_dual(
        &self,
        root: &DrawingArea<BitMapBackend<'_>, Shift>,
        chart: &ChartSpec,
        secondary: &Axis,
    ) -> Result<()> {
        let primary = &chart.primary;
        let (y_min, y_max) = primary.y_range();
        let (s_min, s_max) = secondary.y_range();
        let x = x_range(chart.x_labels.len());

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, ("sans-serif", 32).into_font().color(&TEXT))
            .margin(20)
            .x_label_area_size(70)
            .y_label_area_size(110)
            .right_y_label_area_size(110)
            .build_cartesian_2d(x.clone(), y_min..y_max)?
            .set_secondary_coord(x, s_min..s_max);

        let x_formatter = |x: &f64| x_label_at(&chart.x_labels, *x);
        let y_formatter = |y: &f64| primary.tick_label(*y);
        let s_formatter = |y: &f64| secondary.tick_label(*y);

        ctx.configure_mesh()
            .x_labels(chart.x_labels.len().min(MAX_X_LABELS))
            .y_labels(primary.tick_count())
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .axis_style(ShapeStyle::from(&AXIS).stroke_width(2))
            .light_line_style(ShapeStyle::from(&GRID).stroke_width(1))
            .bold_line_style(ShapeStyle::from(&GRID).stroke_width(1))
            .x_label_style(("sans-serif", 14).into_font().color(&TEXT))
            .y_label_style(("sans-serif", 16).into_font().color(&primary.label_color()))
            .draw()?;

        ctx.configure_secondary_axes()
            .y_labels(secondary.tick_count())
            .y_label_formatter(&s_formatter)
            .axis_style(ShapeStyle::from(&AXIS).stroke_width(2))
            .label_style(("sans-serif", 16).into_font().color(&secondary.label_color()))
            .draw()?;

        for (index, series) in primary.series.iter().enumerate() {
            let color = series_color(series, index);
            for (run_index, run) in primary.runs(series).into_iter().enumerate() {
                let drawn = ctx.draw_series(LineSeries::new(run, color.stroke_width(2)))?;
                if run_index == 0 {
                    drawn
                        .label(series.label.clone())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
                }
            }
        }

        let offset = primary.series.len();
        for (index, series) in secondary.series.iter().enumerate() {
            let color = series_color(series, offset + index);
            for (run_index, run) in secondary.runs(series).into_iter().enumerate() {
                let drawn = ctx.draw_secondary_series(LineSeries::new(run, color.stroke_width(2)))?;
                if run_index == 0 {
                    drawn
                        .label(series.label.clone())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
                }
            }
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&BACKGROUND.mix(0.85))
            .border_style(&AXIS)
            .label_font(("sans-serif", 14).into_font().color(&TEXT))
            .draw()?;

        Ok(())
    }
}

impl SeriesRenderer for PlottersRenderer {
    fn render(&self, chart: &ChartSpec, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
            }
        }

        debug!(
            title = %chart.title,
            points = chart.x_labels.len(),
            series = chart.series_count(),
            "Rendering chart"
        );

        let root = BitMapBackend::new(output, (self.width, self.height)).into_drawing_area();
        root.fill(&BACKGROUND)?;

        if chart.is_empty() {
            self.draw_blank(&root, chart)?;
        } else if let Some(secondary) = &chart.secondary {
            self.draw_dual(&root, chart, secondary)?;
        } else {
            self.draw_single(&root, chart)?;
        }

        root.present()
            .with_context(|| format!("Failed to write chart image: {}", output.display()))?;

        info!(path = %output.display(), title = %chart.title, "Chart rendered");
        Ok(())
    }
}

/// Pixel height of a legend strip holding `entries` rows, laid out in columns
fn legend_height(entries: usize) -> u32 {
    let rows = entries.clamp(1, LEGEND_ROWS) as u32;
    LEGEND_PADDING * 2 + rows * LEGEND_ROW_HEIGHT
}

/// One line sample (and marker) plus label per entry, column-major
fn draw_legend(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    entries: &[(&str, RGBColor)],
    markers: bool,
) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }

    let (width, _) = area.dim_in_pixel();
    let columns = ((entries.len() + LEGEND_ROWS - 1) / LEGEND_ROWS) as u32;
    let column_width = (width.saturating_sub(2 * LEGEND_INDENT) / columns) as i32;

    for (i, (label, color)) in entries.iter().enumerate() {
        let column = (i / LEGEND_ROWS) as i32;
        let row = (i % LEGEND_ROWS) as i32;
        let x = LEGEND_INDENT as i32 + column * column_width;
        let y = (LEGEND_PADDING + LEGEND_ROW_HEIGHT / 2) as i32 + row * LEGEND_ROW_HEIGHT as i32;

        area.draw(&PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(2)))?;
        if markers {
            area.draw(&Circle::new((x + 12, y), 4, color.filled()))?;
        }
        area.draw(&Text::new(
            label.to_string(),
            (x + 34, y - 7),
            ("sans-serif", 13).into_font().color(&TEXT),
        ))?;
    }

    Ok(())
}

/// Categorical x axis: label `i` sits at `x = i`, half a slot of margin each side
fn x_range(len: usize) -> std::ops::Range<f64> {
    -0.5..(len.max(1) as f64 - 0.5)
}

fn x_label_at(labels: &[String], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

fn series_color(series: &PlotSeries, index: usize) -> RGBColor {
    series
        .color
        .unwrap_or(PALETTE[index % PALETTE.len()])
        .to_plotters()
}
