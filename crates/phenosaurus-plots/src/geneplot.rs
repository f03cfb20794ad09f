//! Per-gene comparison across screens.

use phenosaurus_common::DisplayConfig;
use phenosaurus_db::IpsDatapointView;
use serde::Serialize;

use crate::frame::regulator_color;
use crate::genes::Notice;
use crate::params::PlotWidth;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneplotPoint {
    pub screen_id: i64,
    pub screen: String,
    pub fcpv: f64,
    pub mi: f64,
    pub logmi: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneplotSeries {
    pub gene: String,
    pub points: Vec<GeneplotPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MultipleGeneplot {
    /// One entry per requested gene with data, in request order
    pub series: Vec<GeneplotSeries>,
    pub descriptions: Vec<String>,
    /// Genes without any datapoint in the selected screens
    pub without_data: Vec<String>,
}

impl MultipleGeneplot {
    pub fn notice(&self, ucsc_link: &str) -> Option<Notice> {
        if self.without_data.is_empty() {
            None
        } else {
            Some(Notice::no_data(&self.without_data, ucsc_link))
        }
    }
}

/// Group `points` by the requested genes. `points` must already be limited
/// to the selected authorized screens.
pub fn multiple_geneplot(
    genes: &[String],
    points: &[IpsDatapointView],
    cutoff: f64,
    display: &DisplayConfig,
) -> MultipleGeneplot {
    let mut plot = MultipleGeneplot::default();

    for gene in genes {
        let gene_points: Vec<GeneplotPoint> = points
            .iter()
            .filter(|p| &p.gene_name == gene)
            .map(|p| GeneplotPoint {
                screen_id: p.screen_id,
                screen: p.screen_name.clone(),
                fcpv: p.fcpv,
                mi: p.mi,
                logmi: p.mi.log2(),
                color: regulator_color(p.fcpv, p.mi, cutoff, display).to_string(),
            })
            .collect();

        if gene_points.is_empty() {
            plot.without_data.push(gene.clone());
            continue;
        }
        plot.descriptions.push(describe_gene(gene, &gene_points, cutoff));
        plot.series.push(GeneplotSeries { gene: gene.clone(), points: gene_points });
    }
    plot
}

/// One-paragraph summary of the significant effects of a gene.
pub fn describe_gene(gene: &str, points: &[GeneplotPoint], cutoff: f64) -> String {
    let significant = points.iter().filter(|p| p.fcpv <= cutoff);
    let (positive, negative): (Vec<&GeneplotPoint>, Vec<&GeneplotPoint>) =
        significant.partition(|p| p.mi < 1.0);
    let positive: Vec<&str> = positive.iter().map(|p| p.screen.as_str()).collect();
    let negative: Vec<&str> = negative.iter().map(|p| p.screen.as_str()).collect();

    let mut text = format!(
        "In {} screen(s) in human haploid (HAP1) cells {} was found to be regulator.",
        positive.len() + negative.len(),
        gene
    );
    if positive.is_empty() && negative.is_empty() {
        return text;
    }

    text.push_str(" Specifically it was found to");
    if !negative.is_empty() {
        text.push_str(&format!(" negatively affect the abundance of {}", join_and(&negative)));
    }
    if !positive.is_empty() {
        if !negative.is_empty() {
            text.push_str(" and");
        }
        text.push_str(&format!(" positively affect the abundance of {}", join_and(&positive)));
    }
    text
}

/// "A", "A and B", "A, B and C"
fn join_and(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Pixel width of one gene plot.
pub fn geneplot_width(width: PlotWidth, n_screens: usize, display: &DisplayConfig) -> u32 {
    match width {
        PlotWidth::Dynamic => n_screens as u32 * display.dynamic_geneplot_width + 100,
        PlotWidth::Small => display.small_geneplot_width,
        PlotWidth::Normal => display.normal_geneplot_width,
        PlotWidth::Wide => display.wide_geneplot_width,
    }
}
