//! Chart specifications serialised to JSON and drawn by `static/js/plots.js`.

use phenosaurus_common::DisplayConfig;
use serde::Serialize;

use crate::frame::FishtailFrame;
use crate::geneplot::{geneplot_width, MultipleGeneplot};
use crate::params::{OnClickAction, PlotWidth};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub label: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub label: &'static str,
    pub field: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickBehaviour {
    /// Open `template` with `{gene}` replaced by the clicked gene
    OpenUrl { template: String },
    /// Label the selected points and dim the rest
    HighlightAndLabel {
        nonselected_fill_alpha: f64,
        nonselected_line_alpha: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FishtailPoint {
    pub x: f64,
    pub y: f64,
    pub gene: String,
    pub fcpv: f64,
    pub color: String,
    pub linecolor: String,
    /// Gene name for significant points, empty otherwise
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FishtailChart {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x_axis: Axis,
    pub y_axis: Axis,
    /// Line at y = 0 accenting the x axis
    pub baseline: [[f64; 2]; 2],
    pub points: Vec<FishtailPoint>,
    pub tooltips: Vec<Tooltip>,
    pub label_significant: bool,
    pub text_size: String,
    pub click: ClickBehaviour,
}

#[derive(Debug, Clone)]
pub struct FishtailOptions {
    pub label_significant: bool,
    pub text_size: String,
    pub click: OnClickAction,
    /// Gene plot URL with a `{gene}` placeholder, used by [`OnClickAction::Gp`]
    pub gene_plot_url: String,
}

/// y range centred on zero: ±max(|min|, |max|) plus 10%.
pub fn symmetric_range<I: IntoIterator<Item = f64>>(values: I) -> (f64, f64) {
    let extent = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if extent == 0.0 {
        return (-1.0, 1.0);
    }
    (-extent * 1.1, extent * 1.1)
}

pub fn fishtail_chart(
    title: &str,
    frame: &FishtailFrame,
    options: &FishtailOptions,
    display: &DisplayConfig,
) -> FishtailChart {
    let (y_min, y_max) = symmetric_range(frame.rows.iter().map(|r| r.logmi));
    let x_max = frame
        .rows
        .iter()
        .map(|r| r.loginsertions)
        .fold(f64::NEG_INFINITY, f64::max);
    let x_max = if x_max.is_finite() && x_max != 0.0 { x_max.abs() * 1.05 } else { 1.0 };

    let click = match options.click {
        OnClickAction::Gc => ClickBehaviour::OpenUrl {
            template: format!("{}{{gene}}", display.genecards_link),
        },
        OnClickAction::Gp => ClickBehaviour::OpenUrl {
            template: options.gene_plot_url.clone(),
        },
        OnClickAction::Hah => ClickBehaviour::HighlightAndLabel {
            nonselected_fill_alpha: display.nonselected_fill_alpha,
            nonselected_line_alpha: display.nonselected_line_alpha,
        },
    };

    FishtailChart {
        title: title.to_string(),
        width: display.fishtail_width,
        height: display.fishtail_height,
        x_axis: Axis { label: "Insertions [10log]".to_string(), min: 0.0, max: x_max },
        y_axis: Axis { label: "Mutational index [2log]".to_string(), min: y_min, max: y_max },
        baseline: [[0.0, 0.0], [120.0, 0.0]],
        points: frame
            .rows
            .iter()
            .map(|r| FishtailPoint {
                x: r.loginsertions,
                y: r.logmi,
                gene: r.gene.clone(),
                fcpv: r.fcpv,
                color: r.color.clone(),
                linecolor: r.linecolor.clone(),
                label: r.signame.clone(),
            })
            .collect(),
        tooltips: vec![
            Tooltip { label: "P-Value", field: "fcpv" },
            Tooltip { label: "Gene", field: "gene" },
        ],
        label_significant: options.label_significant,
        text_size: options.text_size.clone(),
        click,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPoint {
    pub screen: String,
    pub y: f64,
    pub fcpv: f64,
    pub logmi: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendItem {
    pub label: &'static str,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenePlotChart {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub categories: Vec<String>,
    pub y_axis: Axis,
    pub points: Vec<CategoryPoint>,
    pub tooltips: Vec<Tooltip>,
    pub legend: Option<Vec<LegendItem>>,
    pub legend_background: String,
}

/// One chart per gene, in the order of `plot.series`. All charts share the
/// same screen categories so they line up when stacked.
pub fn gene_plot_charts(
    plot: &MultipleGeneplot,
    width: PlotWidth,
    hide_legend: bool,
    display: &DisplayConfig,
) -> Vec<GenePlotChart> {
    let mut categories: Vec<String> = Vec::new();
    for point in plot.series.iter().flat_map(|s| &s.points) {
        if !categories.contains(&point.screen) {
            categories.push(point.screen.clone());
        }
    }
    let width = geneplot_width(width, categories.len(), display);

    let legend = (!hide_legend).then(|| {
        vec![
            LegendItem { label: "Pos. reg", color: display.color_sb.clone() },
            LegendItem { label: "Neg. reg", color: display.color_st.clone() },
            LegendItem { label: "Not sign", color: display.color_ns.clone() },
        ]
    });

    plot.series
        .iter()
        .map(|series| {
            let (min, max) = symmetric_range(series.points.iter().map(|p| p.logmi));
            GenePlotChart {
                title: series.gene.clone(),
                width,
                height: display.geneplot_height,
                categories: categories.clone(),
                y_axis: Axis { label: String::new(), min, max },
                points: series
                    .points
                    .iter()
                    .filter(|p| p.logmi.is_finite())
                    .map(|p| CategoryPoint {
                        screen: p.screen.clone(),
                        y: p.logmi,
                        fcpv: p.fcpv,
                        logmi: p.logmi,
                        color: p.color.clone(),
                    })
                    .collect(),
                tooltips: vec![
                    Tooltip { label: "P-Value", field: "fcpv" },
                    Tooltip { label: "log(MI)", field: "logmi" },
                    Tooltip { label: "Screen", field: "screen" },
                ],
                legend: legend.clone(),
                legend_background: display.legend_background.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::fishtail_frame;
    use crate::frame::tests::{gene, point};
    use crate::geneplot::multiple_geneplot;
    use pretty_assertions::assert_eq;

    fn options(click: OnClickAction) -> FishtailOptions {
        FishtailOptions {
            label_significant: true,
            text_size: "11px".to_string(),
            click,
            gene_plot_url: "/opengenefinder/?screens=1&genes={gene}".to_string(),
        }
    }

    #[test]
    fn test_symmetric_range() {
        let (min, max) = symmetric_range([-2.0, 1.0]);
        assert!((min + 2.2).abs() < 1e-12);
        assert!((max - 2.2).abs() < 1e-12);
        let (min, max) = symmetric_range([0.5, 3.0]);
        assert!((min + 3.3).abs() < 1e-12 && (max - 3.3).abs() < 1e-12);
        assert_eq!(symmetric_range(std::iter::empty()), (-1.0, 1.0));
        assert_eq!(symmetric_range([f64::NEG_INFINITY]), (-1.0, 1.0));
    }

    #[test]
    fn test_fishtail_axes_and_click() {
        let display = DisplayConfig::default();
        let frame = fishtail_frame(
            &[point("A", "s", 0.01, 0.25, 100), point("B", "s", 0.5, 2.0, 1000)],
            &[gene("A"), gene("B")],
            0.05,
            &display,
        );
        let chart = fishtail_chart("PD-L1 in HAP1", &frame, &options(OnClickAction::Gc), &display);

        assert_eq!((chart.width, chart.height), (1000, 700));
        assert_eq!(chart.x_axis.min, 0.0);
        assert!((chart.x_axis.max - 3.15).abs() < 1e-9);
        assert!((chart.y_axis.max - 2.2).abs() < 1e-9);
        assert_eq!(chart.baseline, [[0.0, 0.0], [120.0, 0.0]]);
        assert_eq!(chart.points[0].label, "A");
        assert_eq!(chart.points[1].label, "");
        assert_eq!(
            chart.click,
            ClickBehaviour::OpenUrl {
                template: "https://www.genecards.org/cgi-bin/carddisp.pl?gene={gene}".to_string()
            }
        );

        let gp = fishtail_chart("t", &frame, &options(OnClickAction::Gp), &display);
        assert!(matches!(gp.click, ClickBehaviour::OpenUrl { ref template } if template.starts_with("/opengenefinder/")));
        let hah = fishtail_chart("t", &frame, &options(OnClickAction::Hah), &display);
        assert!(matches!(hah.click, ClickBehaviour::HighlightAndLabel { .. }));
    }

    #[test]
    fn test_gene_plot_categories_shared() {
        let display = DisplayConfig::default();
        let points = vec![
            point("EZH2", "S1", 0.01, 2.0, 10),
            point("EED", "S2", 0.01, 0.5, 10),
            point("EED", "S1", 0.01, 0.5, 10),
        ];
        let genes = vec!["EZH2".to_string(), "EED".to_string()];
        let plot = multiple_geneplot(&genes, &points, 0.05, &display);
        let charts = gene_plot_charts(&plot, PlotWidth::Dynamic, false, &display);

        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0].title, "EZH2");
        assert_eq!(charts[0].categories, vec!["S1", "S2"]);
        assert_eq!(charts[1].categories, charts[0].categories);
        assert_eq!(charts[0].width, 2 * 40 + 100);
        assert_eq!(charts[0].height, 400);
        assert_eq!(charts[0].legend.as_ref().map(Vec::len), Some(3));

        let hidden = gene_plot_charts(&plot, PlotWidth::Small, true, &display);
        assert!(hidden[0].legend.is_none());
        assert_eq!(hidden[0].width, 400);
    }
}
