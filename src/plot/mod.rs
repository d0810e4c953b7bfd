//! Error-bar charts of benchmark CSV results
//!
//! Rows are grouped by (case, size); each case becomes one series of
//! mean ± sample standard deviation over trials on a log-scaled size axis.

use std::collections::BTreeMap;
use std::path::Path;

use clap::ValueEnum;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::BenchError;
use crate::output::SweepRecord;
use crate::stats::metrics;
use crate::stats::robust_statistics::RobustStatistics;

pub const DEFAULT_CPU_HZ: f64 = 2.5e9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Metric {
    Runtime,
    Gflops,
    Cpe,
}

impl Metric {
    pub fn axis_label(&self) -> &'static str {
        match self {
            Metric::Runtime => "Runtime (ms)",
            Metric::Gflops => "GFLOP/s",
            Metric::Cpe => "Cycles per Element (CPE)",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Metric::Runtime => "Runtime",
            Metric::Gflops => "GFLOPs",
            Metric::Cpe => "CPE",
        }
    }

    /// Value of this metric for one row, in plotted units.
    pub fn value(&self, row: &SweepRecord, cpu_hz: f64) -> f64 {
        match self {
            Metric::Runtime => row.time_ns as f64 / 1e6,
            Metric::Gflops => row.gflops,
            Metric::Cpe => metrics::cycles_per_element(row.time_ns as f64, cpu_hz, row.size as f64),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryPoint {
    pub size: usize,
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub case: String,
    pub points: Vec<SummaryPoint>,
}

pub fn load_rows(path: &Path) -> Result<Vec<SweepRecord>, BenchError> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<Result<Vec<SweepRecord>, _>>()?;
    Ok(rows)
}

/// Groups rows by case and size. An optional kernel filter keeps one kernel.
pub fn summarize(rows: &[SweepRecord], metric: Metric, cpu_hz: f64, kernel: Option<&str>) -> Vec<Series> {
    let mut groups: BTreeMap<&str, BTreeMap<usize, Vec<f64>>> = BTreeMap::new();
    for row in rows {
        if kernel.is_some_and(|k| !row.kernel.eq_ignore_ascii_case(k)) {
            continue;
        }
        groups
            .entry(row.case.as_str())
            .or_default()
            .entry(row.size)
            .or_default()
            .push(metric.value(row, cpu_hz));
    }

    groups
        .into_iter()
        .map(|(case, sizes)| Series {
            case: case.to_string(),
            points: sizes
                .into_iter()
                .filter_map(|(size, values)| {
                    RobustStatistics::from_samples(&values).map(|s| SummaryPoint {
                        size,
                        mean: s.mean,
                        std: s.stdev,
                    })
                })
                .collect(),
        })
        .filter(|s| !s.points.is_empty())
        .collect()
}

/// Chart title naming the plotted cases, e.g. `Aligned vs Misaligned (GFLOPs)`.
pub fn caption(series: &[Series], metric: Metric) -> String {
    let cases: Vec<&str> = series.iter().map(|s| s.case.as_str()).collect();
    format!("{} ({})", cases.join(" vs "), metric.title())
}

/// Renders to PNG when `path` ends in `.png`, SVG otherwise.
pub fn render(series: &[Series], metric: Metric, path: &Path) -> Result<(), BenchError> {
    if series.is_empty() {
        return Err(BenchError::Plot("no rows to plot".into()));
    }
    let size = (1024, 768);
    let is_png = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png {
        draw(BitMapBackend::new(path, size).into_drawing_area(), series, metric)
    } else {
        draw(SVGBackend::new(path, size).into_drawing_area(), series, metric)
    }
}

fn draw<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, series: &[Series], metric: Metric) -> Result<(), BenchError> {
    let plot_err = |e: DrawingAreaErrorKind<DB::ErrorType>| BenchError::Plot(e.to_string());

    let points = series.iter().flat_map(|s| s.points.iter());
    let x_min = points.clone().map(|p| p.size).min().unwrap_or(1).max(1) as f64;
    let x_max = points.clone().map(|p| p.size).max().unwrap_or(2) as f64;
    let y_max = points.map(|p| p.mean + p.std).fold(0.0f64, f64::max);
    let x_range = (x_min / 1.5)..(x_max * 1.5);
    let y_range = 0.0..(y_max * 1.1).max(f64::EPSILON);

    root.fill(&WHITE).map_err(plot_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption(series, metric), ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range.log_scale(), y_range)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Problem Size")
        .y_desc(metric.axis_label())
        .x_label_formatter(&|x| format!("{:.0}", x))
        .draw()
        .map_err(plot_err)?;

    for (i, s) in series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(
                s.points.iter().map(|p| (p.size as f64, p.mean)),
                color.stroke_width(2),
            ))
            .map_err(plot_err)?
            .label(s.case.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart
            .draw_series(s.points.iter().map(|p| {
                ErrorBar::new_vertical(
                    p.size as f64,
                    p.mean - p.std,
                    p.mean,
                    p.mean + p.std,
                    color.filled(),
                    8,
                )
            }))
            .map_err(plot_err)?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::KernelKind;

    fn rows() -> Vec<SweepRecord> {
        vec![
            SweepRecord::new(KernelKind::Saxpy, 512, 1_000, "Aligned", 1),
            SweepRecord::new(KernelKind::Saxpy, 512, 3_000, "Aligned", 2),
            SweepRecord::new(KernelKind::Saxpy, 1024, 4_000, "Aligned", 1),
            SweepRecord::new(KernelKind::Saxpy, 512, 2_000, "Misaligned", 1),
            SweepRecord::new(KernelKind::Stencil, 512, 9_000, "Misaligned", 1),
        ]
    }

    #[test]
    fn runtime_groups_by_case_and_size() {
        let series = summarize(&rows(), Metric::Runtime, DEFAULT_CPU_HZ, Some("saxpy"));
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].case, "Aligned");
        assert_eq!(series[0].points.len(), 2);

        let p = &series[0].points[0];
        assert_eq!(p.size, 512);
        assert!((p.mean - 0.002).abs() < 1e-12);
        // sample std of 0.001 and 0.003 ms
        assert!((p.std - 0.001_414_213_562_373_095).abs() < 1e-12);
    }

    #[test]
    fn kernel_filter_is_optional() {
        let series = summarize(&rows(), Metric::Runtime, DEFAULT_CPU_HZ, None);
        let misaligned = series.iter().find(|s| s.case == "Misaligned").unwrap();
        assert!((misaligned.points[0].mean - 0.0055).abs() < 1e-12);
    }

    #[test]
    fn cpe_uses_cpu_frequency() {
        let rows = vec![SweepRecord::new(KernelKind::Saxpy, 1000, 1_000, "Aligned", 1)];
        let series = summarize(&rows, Metric::Cpe, 2.5e9, None);
        assert!((series[0].points[0].mean - 2.5).abs() < 1e-12);
    }

    #[test]
    fn caption_follows_the_plotted_cases() {
        let series = summarize(&rows(), Metric::Gflops, DEFAULT_CPU_HZ, None);
        assert_eq!(caption(&series, Metric::Gflops), "Aligned vs Misaligned (GFLOPs)");

        let sweep = vec![SweepRecord::new(KernelKind::Stencil, 512, 1_000, "Vectorized", 1)];
        let series = summarize(&sweep, Metric::Runtime, DEFAULT_CPU_HZ, None);
        assert_eq!(caption(&series, Metric::Runtime), "Vectorized (Runtime)");
    }

    #[test]
    fn empty_input_is_a_plot_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = render(&[], Metric::Gflops, &dir.path().join("out.svg")).unwrap_err();
        assert!(matches!(err, BenchError::Plot(_)));
    }
}
