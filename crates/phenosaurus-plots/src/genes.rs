//! Gene list validation, notices and link helpers.

use std::collections::HashSet;

use phenosaurus_common::messages;
use phenosaurus_db::Gene;
use serde::Serialize;

/// A gene name rendered as a link, usually to the genome browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneLink {
    pub name: String,
    pub href: String,
}

impl GeneLink {
    /// Link to the genome browser. Extended names (`GENE@2`) are looked up
    /// by the symbol before the `@`.
    pub fn genome_browser(name: &str, ucsc_link: &str) -> Self {
        let symbol = name.split('@').next().unwrap_or(name);
        Self {
            name: name.to_string(),
            href: format!("{ucsc_link}{symbol}"),
        }
    }
}

/// A message shown above a plot. Structured so the template decides on the
/// markup and every user-supplied name is escaped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Text {
        message: String,
    },
    GenesNotFound {
        message: &'static str,
        missing: Vec<GeneLink>,
        link_hint: &'static str,
        suggestion_label: &'static str,
        suggestions: Vec<String>,
    },
    NoData {
        message: &'static str,
        genes: Vec<GeneLink>,
    },
}

impl Notice {
    pub fn text(message: impl Into<String>) -> Self {
        Notice::Text { message: message.into() }
    }

    pub fn genes_not_found(missing: &[String], suggestions: Vec<String>, ucsc_link: &str) -> Self {
        Notice::GenesNotFound {
            message: messages::GENE_NOT_FOUND_ERROR,
            missing: missing.iter().map(|g| GeneLink::genome_browser(g, ucsc_link)).collect(),
            link_hint: messages::GENOME_BROWSER_LINK_TEXT,
            suggestion_label: messages::SUGGESTED_GENES_TEXT,
            suggestions,
        }
    }

    pub fn no_data(genes: &[String], ucsc_link: &str) -> Self {
        Notice::NoData {
            message: messages::GENEPLOT_NO_DATA,
            genes: genes.iter().map(|g| GeneLink::genome_browser(g, ucsc_link)).collect(),
        }
    }
}

/// Whitespace separated gene names, duplicates removed, input order kept.
pub fn split_gene_input(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    input
        .split_whitespace()
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneValidation {
    /// Requested genes present in the database, in request order
    pub genes: Vec<String>,
    /// Requested genes unknown to the database, in request order
    pub missing: Vec<String>,
}

/// Check the requested genes against `known`, the rows the gene table
/// returned for them.
pub fn validate_gene_list(requested: &[String], known: &[Gene]) -> GeneValidation {
    let known: HashSet<&str> = known.iter().map(|g| g.name.as_str()).collect();
    let (genes, missing) = requested
        .iter()
        .cloned()
        .partition(|name| known.contains(name.as_str()));
    GeneValidation { genes, missing }
}

/// URL of the gene plot page across `ip_screen_ids`, with a literal
/// `{gene}` placeholder that the browser fills in.
pub fn gene_plot_url(ip_screen_ids: &[i64]) -> String {
    let mut url = String::from("/opengenefinder/?");
    for id in ip_screen_ids {
        url.push_str(&format!("screens={id}&"));
    }
    url.push_str("genes={gene}&oca=gc&textsize=11px&plot_width=small");
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const UCSC: &str = "https://genome.ucsc.edu/cgi-bin/hgTracks?db=hg38&position=";

    fn gene(name: &str) -> Gene {
        Gene {
            id: 0,
            name: name.to_string(),
            description: String::new(),
            chromosome: "1".to_string(),
            orientation: "+".to_string(),
        }
    }

    #[test]
    fn test_split_dedupes_in_order() {
        assert_eq!(split_gene_input("  EZH2\tEED \n EZH2 SUZ12"), vec!["EZH2", "EED", "SUZ12"]);
        assert!(split_gene_input("   ").is_empty());
    }

    #[test]
    fn test_validate_partitions() {
        let requested = split_gene_input("SUZ12 FOO EZH2 BAR");
        let validation = validate_gene_list(&requested, &[gene("EZH2"), gene("SUZ12")]);
        assert_eq!(validation.genes, vec!["SUZ12", "EZH2"]);
        assert_eq!(validation.missing, vec!["FOO", "BAR"]);
    }

    #[test]
    fn test_genome_browser_link_strips_suffix() {
        let link = GeneLink::genome_browser("KRAS@2", UCSC);
        assert_eq!(link.name, "KRAS@2");
        assert_eq!(link.href, format!("{UCSC}KRAS"));
    }

    #[test]
    fn test_not_found_notice_serialises_with_kind() {
        let notice = Notice::genes_not_found(&["TP5".to_string()], vec!["TP53".to_string()], UCSC);
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["kind"], "genes_not_found");
        assert_eq!(json["missing"][0]["name"], "TP5");
        assert_eq!(json["suggestions"][0], "TP53");
    }

    #[test]
    fn test_gene_plot_url() {
        assert_eq!(
            gene_plot_url(&[2, 5]),
            "/opengenefinder/?screens=2&screens=5&genes={gene}&oca=gc&textsize=11px&plot_width=small"
        );
    }
}
