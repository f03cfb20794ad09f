//! The fishtail frame: one row per datapoint of a screen with the derived
//! plotting columns.

use std::collections::HashMap;

use phenosaurus_common::DisplayConfig;
use phenosaurus_db::{Gene, IpsDatapointView};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FishtailRow {
    pub gene: String,
    pub chromosome: String,
    pub orientation: String,
    pub description: String,
    pub low: i64,
    pub high: i64,
    pub fcpv: f64,
    pub mi: f64,
    pub insertions: i64,
    pub loginsertions: f64,
    pub logmi: f64,
    pub color: String,
    pub linecolor: String,
    /// Gene name when significant, empty otherwise
    pub signame: String,
}

impl FishtailRow {
    pub fn is_significant(&self) -> bool {
        !self.signame.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FishtailFrame {
    pub rows: Vec<FishtailRow>,
    /// Datapoints left out because `mi` or `insertions` was not positive
    pub dropped: usize,
}

/// Colour of a datapoint: significant positive regulators (mi < 1) and
/// negative regulators (mi >= 1) get their own colour, everything above the
/// cutoff is grey.
pub fn regulator_color<'a>(fcpv: f64, mi: f64, cutoff: f64, display: &'a DisplayConfig) -> &'a str {
    if fcpv <= cutoff {
        if mi < 1.0 {
            &display.color_sb
        } else {
            &display.color_st
        }
    } else {
        &display.color_ns
    }
}

/// Build the frame for one screen. Datapoints whose gene is missing from
/// `genes` are left out, as are those whose logarithms are not finite.
pub fn fishtail_frame(
    points: &[IpsDatapointView],
    genes: &[Gene],
    cutoff: f64,
    display: &DisplayConfig,
) -> FishtailFrame {
    let by_name: HashMap<&str, &Gene> = genes.iter().map(|g| (g.name.as_str(), g)).collect();
    let mut frame = FishtailFrame::default();

    for point in points {
        let Some(gene) = by_name.get(point.gene_name.as_str()) else {
            continue;
        };
        let loginsertions = (point.insertions as f64).log10();
        let logmi = point.mi.log2();
        if !loginsertions.is_finite() || !logmi.is_finite() {
            frame.dropped += 1;
            continue;
        }

        let color = regulator_color(point.fcpv, point.mi, cutoff, display).to_string();
        let signame = if point.fcpv <= cutoff { point.gene_name.clone() } else { String::new() };
        frame.rows.push(FishtailRow {
            gene: point.gene_name.clone(),
            chromosome: gene.chromosome.clone(),
            orientation: gene.orientation.clone(),
            description: gene.description.clone(),
            low: point.low,
            high: point.high,
            fcpv: point.fcpv,
            mi: point.mi,
            insertions: point.insertions,
            loginsertions,
            logmi,
            linecolor: color.clone(),
            color,
            signame,
        });
    }

    if frame.dropped > 0 {
        debug!("Dropped {} datapoint(s) with non-finite logarithms", frame.dropped);
    }
    frame
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn point(gene: &str, screen: &str, fcpv: f64, mi: f64, insertions: i64) -> IpsDatapointView {
        IpsDatapointView {
            id: 0,
            screen_id: 1,
            screen_name: screen.to_string(),
            gene_id: 0,
            gene_name: gene.to_string(),
            low: 10,
            high: 20,
            pv: fcpv,
            fcpv,
            mi,
            insertions,
        }
    }

    pub(crate) fn gene(name: &str) -> Gene {
        Gene {
            id: 0,
            name: name.to_string(),
            description: format!("{name} protein"),
            chromosome: "7".to_string(),
            orientation: "-".to_string(),
        }
    }

    #[test]
    fn test_colors_and_logs() {
        let display = DisplayConfig::default();
        let points = vec![
            point("POS", "s", 0.01, 0.5, 100),
            point("NEG", "s", 0.05, 4.0, 1000),
            point("NS", "s", 0.2, 0.5, 10),
        ];
        let genes = vec![gene("POS"), gene("NEG"), gene("NS")];
        let frame = fishtail_frame(&points, &genes, 0.05, &display);

        assert_eq!(frame.rows.len(), 3);
        let pos = &frame.rows[0];
        assert_eq!(pos.color, display.color_sb);
        assert_eq!(pos.linecolor, pos.color);
        assert_eq!(pos.signame, "POS");
        assert_eq!(pos.logmi, -1.0);
        assert_eq!(pos.loginsertions, 2.0);
        assert_eq!(pos.chromosome, "7");

        // fcpv equal to the cutoff still counts as significant
        assert_eq!(frame.rows[1].color, display.color_st);
        assert_eq!(frame.rows[1].logmi, 2.0);
        assert!(frame.rows[1].is_significant());

        assert_eq!(frame.rows[2].color, display.color_ns);
        assert_eq!(frame.rows[2].signame, "");
    }

    #[test]
    fn test_drops_non_finite_and_unknown_genes() {
        let display = DisplayConfig::default();
        let points = vec![
            point("A", "s", 0.01, 0.0, 100),
            point("B", "s", 0.01, 2.0, 0),
            point("C", "s", 0.01, 2.0, 10),
            point("GHOST", "s", 0.01, 2.0, 10),
        ];
        let genes = vec![gene("A"), gene("B"), gene("C")];
        let frame = fishtail_frame(&points, &genes, 0.05, &display);
        assert_eq!(frame.rows.len(), 1);
        assert_eq!(frame.rows[0].gene, "C");
        assert_eq!(frame.dropped, 2);
    }
}
