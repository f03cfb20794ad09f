//! phenosaurus-plots — Turns authorized datapoints into chart specifications.
//!
//! Everything in this crate is synchronous and side-effect free: the web
//! layer queries the database, hands the rows to these functions and
//! serialises the resulting chart specs to JSON for the browser.

pub mod params;
pub mod genes;
pub mod frame;
pub mod tophits;
pub mod geneplot;
pub mod charts;

pub use params::{is_checked, parse_screen_ids, resolve_pvalue, resolve_text_size, OnClickAction, PlotWidth};
pub use genes::{gene_plot_url, split_gene_input, validate_gene_list, GeneLink, GeneValidation, Notice};
pub use frame::{fishtail_frame, regulator_color, FishtailFrame, FishtailRow};
pub use tophits::{top_hits, TopHit, TopHits};
pub use geneplot::{describe_gene, geneplot_width, multiple_geneplot, GeneplotPoint, GeneplotSeries, MultipleGeneplot};
pub use charts::{
    fishtail_chart, gene_plot_charts, symmetric_range, Axis, CategoryPoint, ClickBehaviour, FishtailChart,
    FishtailOptions, FishtailPoint, GenePlotChart, LegendItem, Tooltip,
};
