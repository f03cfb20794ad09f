//! User-facing notices shown on the plot pages.

pub const FORM_ERROR: &str =
    "Please select a screen and submit the form to draw a plot.";

pub const SCREEN_AUTHORIZATION_ERROR: &str =
    "You are not authorized to view (one of) the requested screen(s).";

pub const GENE_NOT_FOUND_ERROR: &str =
    "The following gene(s) could not be found in the database:";

pub const GENOME_BROWSER_LINK_TEXT: &str =
    "(follow the link to look the gene up in the UCSC genome browser).";

pub const SUGGESTED_GENES_TEXT: &str =
    "Genes with a similar name:";

pub const GENEPLOT_NO_DATA: &str =
    "No data is available in the selected screen(s) for:";

pub fn max_graphs_warning(max: usize) -> String {
    format!("Too many genes requested. At most {max} genes can be plotted at the same time.")
}
