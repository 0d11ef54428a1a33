// Rendering of the chart panels.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::analysis::report::{format_count, format_signed, summary_lines};
use crate::analysis::*;

type DrawResult = Result<(), Box<dyn Error>>;

const COLOR_A: RGBColor = RED;
const COLOR_B: RGBColor = BLUE;
const COLOR_WELFARE: RGBColor = RGBColor(0, 140, 70);

const FONT: &str = "sans-serif";

pub fn extension(format: ChartFormat) -> &'static str {
    match format {
        ChartFormat::Svg => "svg",
        ChartFormat::Png => "png",
    }
}

// Calls the drawing function with the backend matching the format.
macro_rules! with_backend {
    ($format:expr, $path:expr, $size:expr, $draw:ident $(, $arg:expr)*) => {
        match $format {
            ChartFormat::Svg => $draw(SVGBackend::new($path, $size).into_drawing_area() $(, $arg)*),
            ChartFormat::Png => $draw(BitMapBackend::new($path, $size).into_drawing_area() $(, $arg)*),
        }
    };
}

/// The upper bound of an axis starting at zero, with some room above the largest value.
fn upper_bound(values: &[f64]) -> f64 {
    let m = values.iter().cloned().fold(0.0_f64, f64::max);
    if m > 0.0 {
        m * 1.1
    } else {
        1.0
    }
}

/// A range containing all the values, with 5% of padding on each side.
fn padded_range(values: &[f64]) -> std::ops::Range<f64> {
    let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad)..(hi + pad)
}

fn segment_label(labels: &[String], v: &SegmentValue<i32>) -> String {
    match v {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

fn draw_no_data<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, title: &str) -> DrawResult
where
    DB::ErrorType: 'static,
{
    let inner = area.titled(title, (FONT, 20))?;
    inner.draw(&Text::new("(no data)", (20, 20), (FONT, 16).into_font()))?;
    Ok(())
}

/// Vertical bars, one per label, in the given order.
fn draw_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    bars: &[(String, f64)],
    color: RGBColor,
) -> DrawResult
where
    DB::ErrorType: 'static,
{
    if bars.is_empty() {
        return draw_no_data(area, title);
    }
    let labels: Vec<String> = bars.iter().map(|(l, _)| l.clone()).collect();
    let values: Vec<f64> = bars.iter().map(|(_, v)| *v).collect();
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(80)
        .build_cartesian_2d((0..bars.len() as i32).into_segmented(), 0.0..upper_bound(&values))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_style((FONT, 11))
        .x_label_formatter(&|v| segment_label(&labels, v))
        .y_label_formatter(&|y| format_count(y.round() as u64))
        .draw()?;
    chart.draw_series(
        Histogram::vertical(&chart)
            .style(color.filled())
            .margin(2)
            .data(values.iter().enumerate().map(|(i, v)| (i as i32, *v))),
    )?;
    Ok(())
}

fn draw_text_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    lines: &[String],
) -> DrawResult
where
    DB::ErrorType: 'static,
{
    let inner = area.titled(title, (FONT, 20))?;
    for (idx, line) in lines.iter().enumerate() {
        let y = 20 + 26 * idx as i32;
        inner.draw(&Text::new(line.as_str(), (20, y), (FONT, 16).into_font()))?;
    }
    Ok(())
}

fn draw_dashboard<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    analysis: &Analysis,
    rules: &AnalysisRules,
) -> DrawResult
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 2));
    let sides = [(&rules.candidate_a, COLOR_A), (&rules.candidate_b, COLOR_B)];
    for ((selector, color), panel) in sides.iter().zip(panels.iter()) {
        let bars: Vec<(String, f64)> = analysis
            .candidate_rows(selector)
            .iter()
            .map(|r| (r.state.clone(), r.votes as f64))
            .collect();
        draw_bars(
            panel,
            &format!("Votes for {} by state", selector.label),
            &bars,
            *color,
        )?;
    }
    draw_bars(
        &panels[2],
        "Bolsa Família payments by state (R$)",
        &analysis.welfare_by_state(),
        COLOR_WELFARE,
    )?;
    draw_text_panel(&panels[3], "Summary", &summary_lines(analysis))?;
    root.present()?;
    Ok(())
}

fn draw_reverse_ranking<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    analysis: &Analysis,
    rules: &AnalysisRules,
) -> DrawResult
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let title = format!(
        "Margin {} - {} by state",
        rules.candidate_a.label, rules.candidate_b.label
    );
    let margins = analysis.ranking.diverging();
    if margins.is_empty() {
        draw_no_data(&root, &title)?;
        root.present()?;
        return Ok(());
    }
    let labels: Vec<String> = margins.iter().map(|sm| sm.state.clone()).collect();
    let values: Vec<f64> = margins.iter().map(|sm| sm.margin as f64).collect();
    let bound = values.iter().cloned().fold(0.0_f64, |m, v| m.max(v.abs()));
    let bound = if bound > 0.0 { bound * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-bound..bound, (0..labels.len() as i32).into_segmented())?;
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(labels.len())
        .y_label_formatter(&|v| segment_label(&labels, v))
        .x_label_formatter(&|x| format_signed(x.round() as i64))
        .x_desc("Votes")
        .draw()?;

    let positive = values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v > 0.0)
        .map(|(i, v)| (i as i32, *v));
    chart
        .draw_series(
            Histogram::horizontal(&chart)
                .style(COLOR_A.filled())
                .margin(2)
                .data(positive),
        )?
        .label(rules.candidate_a.label.as_str())
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], COLOR_A.filled()));
    let negative = values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v < 0.0)
        .map(|(i, v)| (i as i32, *v));
    chart
        .draw_series(
            Histogram::horizontal(&chart)
                .style(COLOR_B.filled())
                .margin(2)
                .data(negative),
        )?
        .label(rules.candidate_b.label.as_str())
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], COLOR_B.filled()));
    chart.draw_series(std::iter::once(PathElement::new(
        vec![(0.0, SegmentValue::Exact(0)), (0.0, SegmentValue::Last)],
        BLACK.stroke_width(2),
    )))?;
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

fn draw_scatter_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    selector: &CandidateSelector,
    points: &[(String, f64, f64)],
    color: RGBColor,
) -> DrawResult
where
    DB::ErrorType: 'static,
{
    let title = format!("{}: votes and payments by state", selector.label);
    if points.is_empty() {
        return draw_no_data(area, &title);
    }
    let xs: Vec<f64> = points.iter().map(|(_, x, _)| *x).collect();
    let ys: Vec<f64> = points.iter().map(|(_, _, y)| *y).collect();
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(padded_range(&xs), padded_range(&ys))?;
    chart
        .configure_mesh()
        .x_desc("Votes")
        .y_desc("Bolsa Família payments (R$)")
        .x_label_formatter(&|x| format_count(x.max(0.0).round() as u64))
        .y_label_formatter(&|y| format_count(y.max(0.0).round() as u64))
        .draw()?;
    let style = color.mix(0.7).filled();
    chart.draw_series(points.iter().map(|(state, x, y)| {
        EmptyElement::at((*x, *y))
            + Circle::new((0, 0), 5, style)
            + Text::new(state.clone(), (6, -12), (FONT, 11).into_font())
    }))?;
    Ok(())
}

/// One point per state: the label, the votes (x) and the payments (y).
fn scatter_points(analysis: &Analysis, selector: &CandidateSelector) -> Vec<(String, f64, f64)> {
    analysis
        .candidate_rows(selector)
        .iter()
        .map(|r| (r.state.clone(), r.votes as f64, r.amount))
        .collect()
}

fn draw_scatter<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    analysis: &Analysis,
    rules: &AnalysisRules,
) -> DrawResult
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));
    let sides = [(&rules.candidate_a, COLOR_A), (&rules.candidate_b, COLOR_B)];
    for ((selector, color), panel) in sides.iter().zip(panels.iter()) {
        let points = scatter_points(analysis, selector);
        draw_scatter_panel(panel, selector, &points, *color)?;
    }
    root.present()?;
    Ok(())
}

/// Writes the three charts in the directory of the settings, and returns their paths.
pub fn render_charts(
    analysis: &Analysis,
    rules: &AnalysisRules,
    settings: &ChartSettings,
) -> BAResult<Vec<PathBuf>> {
    let dir = &settings.directory;
    fs::create_dir_all(dir).context(CreatingDirectorySnafu {
        path: dir.display().to_string(),
    })?;

    let chart_path = |name: &str| dir.join(format!("{}.{}", name, extension(settings.format)));
    let failed = |path: &Path, e: Box<dyn Error>| {
        Box::new(
            ChartRenderingSnafu {
                path: path.display().to_string(),
                message: e.to_string(),
            }
            .build(),
        )
    };

    let mut res: Vec<PathBuf> = Vec::new();

    let p = chart_path("dashboard");
    debug!("render_charts: {:?}", p);
    with_backend!(settings.format, &p, (1600, 1200), draw_dashboard, analysis, rules)
        .map_err(|e| failed(&p, e))?;
    res.push(p);

    let p = chart_path("reverse_ranking");
    debug!("render_charts: {:?}", p);
    with_backend!(settings.format, &p, (1000, 900), draw_reverse_ranking, analysis, rules)
        .map_err(|e| failed(&p, e))?;
    res.push(p);

    let p = chart_path("scatter");
    debug!("render_charts: {:?}", p);
    with_backend!(settings.format, &p, (1600, 700), draw_scatter, analysis, rules)
        .map_err(|e| failed(&p, e))?;
    res.push(p);

    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bolsa_votos::builder::Builder;
    use tempfile::TempDir;

    fn analysis() -> Analysis {
        let rules = AnalysisRules::runoff_2022();
        let mut b = Builder::new(&rules);
        b.add_votes(2, 13, "SP", "LUIZ INÁCIO LULA DA SILVA", 1_000)
            .add_votes(2, 22, "SP", "JAIR MESSIAS BOLSONARO", 800)
            .add_votes(2, 13, "RJ", "LUIZ INÁCIO LULA DA SILVA", 600)
            .add_votes(2, 22, "RJ", "JAIR MESSIAS BOLSONARO", 900)
            .add_payment("SP", 500.0)
            .add_payment("RJ", 300.0);
        let rows = b.prepare().unwrap();
        let summary = summarize(&rows);
        Analysis {
            margin: margin_report(&summary, &rules).unwrap(),
            ranking: rank_states(&rows, &rules).unwrap(),
            correlations: correlate(&rows).unwrap(),
            summary,
            rows,
        }
    }

    fn assert_written(paths: &[PathBuf], dir: &Path, ext: &str) {
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                format!("dashboard.{}", ext),
                format!("reverse_ranking.{}", ext),
                format!("scatter.{}", ext),
            ]
        );
        for p in paths {
            assert!(p.starts_with(dir));
            assert!(fs::metadata(p).unwrap().len() > 0, "{:?} is empty", p);
        }
    }

    #[test]
    fn render_all_formats() {
        let _ = env_logger::builder().is_test(true).try_init();
        let a = analysis();
        let rules = AnalysisRules::runoff_2022();
        for format in [ChartFormat::Svg, ChartFormat::Png] {
            let dir = TempDir::new().unwrap();
            let settings = ChartSettings {
                directory: dir.path().join("charts"),
                format,
            };
            let paths = render_charts(&a, &rules, &settings).unwrap();
            assert_written(&paths, &settings.directory, extension(format));
        }
    }

    #[test]
    fn render_without_ranked_states() {
        let mut a = analysis();
        a.ranking = StateRanking {
            winners_a: vec![],
            winners_b: vec![],
            ties: vec![],
            dropped: vec!["SP".to_string(), "RJ".to_string()],
        };
        let dir = TempDir::new().unwrap();
        let settings = ChartSettings {
            directory: dir.path().to_path_buf(),
            format: ChartFormat::Svg,
        };
        let paths = render_charts(&a, &AnalysisRules::runoff_2022(), &settings).unwrap();
        assert_written(&paths, dir.path(), "svg");
        let svg = fs::read_to_string(&paths[1]).unwrap();
        assert!(svg.contains("(no data)"));
    }

    #[test]
    fn scatter_puts_votes_on_the_x_axis() {
        let a = analysis();
        let rules = AnalysisRules::runoff_2022();
        let mut points = scatter_points(&a, &rules.candidate_a);
        points.sort_by(|x, y| x.0.cmp(&y.0));
        assert_eq!(
            points,
            vec![
                ("RJ".to_string(), 600.0, 300.0),
                ("SP".to_string(), 1_000.0, 500.0),
            ]
        );
    }

    #[test]
    fn axis_bounds() {
        assert_eq!(upper_bound(&[]), 1.0);
        assert_eq!(upper_bound(&[0.0, 0.0]), 1.0);
        assert!((upper_bound(&[10.0, 100.0]) - 110.0).abs() < 1e-9);

        assert_eq!(padded_range(&[]), 0.0..1.0);
        assert_eq!(padded_range(&[5.0]), 4.0..6.0);
        let r = padded_range(&[0.0, 100.0]);
        assert!((r.start + 5.0).abs() < 1e-9);
        assert!((r.end - 105.0).abs() < 1e-9);
    }

    #[test]
    fn labels_of_segments() {
        let labels = vec!["SP".to_string(), "RJ".to_string()];
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(1)), "RJ");
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(2)), "");
        assert_eq!(segment_label(&labels, &SegmentValue::Exact(0)), "");
    }

    #[test]
    fn file_names() {
        assert_eq!(extension(ChartFormat::Svg), "svg");
        assert_eq!(extension(ChartFormat::Png), "png");
    }
}
