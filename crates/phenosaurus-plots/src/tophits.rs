//! Tables of significant hits shown below a fishtail plot.

use std::cmp::Ordering;

use serde::Serialize;

use crate::frame::FishtailFrame;
use crate::genes::GeneLink;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopHit {
    pub gene: GeneLink,
    pub low: i64,
    pub high: i64,
    pub fcpv: f64,
    pub log2_mi: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopHits {
    /// log2(MI) >= 0, strongest first
    pub negative: Vec<TopHit>,
    /// log2(MI) < 0, strongest first
    pub positive: Vec<TopHit>,
}

impl TopHits {
    pub fn is_empty(&self) -> bool {
        self.negative.is_empty() && self.positive.is_empty()
    }
}

pub fn top_hits(frame: &FishtailFrame, ucsc_link: &str) -> TopHits {
    let (mut negative, mut positive): (Vec<TopHit>, Vec<TopHit>) = frame
        .rows
        .iter()
        .filter(|row| row.is_significant())
        .map(|row| TopHit {
            gene: GeneLink::genome_browser(&row.gene, ucsc_link),
            low: row.low,
            high: row.high,
            fcpv: row.fcpv,
            log2_mi: row.logmi,
        })
        .partition(|hit| hit.log2_mi >= 0.0);

    negative.sort_by(|a, b| b.log2_mi.partial_cmp(&a.log2_mi).unwrap_or(Ordering::Equal));
    positive.sort_by(|a, b| a.log2_mi.partial_cmp(&b.log2_mi).unwrap_or(Ordering::Equal));
    TopHits { negative, positive }
}
