//! Sanitation of query-string parameters.
//!
//! URLs are user editable, so every parameter is checked against what the
//! plotting code accepts and silently replaced by its default otherwise.

use phenosaurus_common::DisplayConfig;
use serde::Serialize;
use tracing::warn;

/// Text size for labels: `given` if it is one of the configured sizes,
/// otherwise the standard size.
pub fn resolve_text_size(given: &str, display: &DisplayConfig) -> String {
    if display.text_sizes.iter().any(|size| size == given) {
        given.to_string()
    } else {
        display.standard_text_size.clone()
    }
}

/// P-value cutoff for colouring. Accepts scientific notation (`1E-5`).
pub fn resolve_pvalue(given: &str, display: &DisplayConfig) -> f64 {
    match given.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => display.pvalue_cutoff,
    }
}

/// Parse screen ids from repeated query values. A single value that is not
/// an integer invalidates the whole list.
pub fn parse_screen_ids<S: AsRef<str>>(values: &[S]) -> Vec<i64> {
    let parsed: Result<Vec<i64>, _> = values.iter().map(|v| v.as_ref().trim().parse::<i64>()).collect();
    match parsed {
        Ok(ids) => ids,
        Err(e) => {
            warn!("Rejecting screen id list: {}", e);
            Vec::new()
        }
    }
}

/// HTML checkboxes submit `on` when ticked.
pub fn is_checked(value: Option<&str>) -> bool {
    value == Some("on")
}

/// What happens when a point in the fishtail plot is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OnClickAction {
    /// Open the gene on GeneCards
    #[default]
    Gc,
    /// Highlight the point and label it
    Hah,
    /// Open the gene plot of the gene across all screens
    Gp,
}

impl OnClickAction {
    pub fn from_param(value: &str) -> Self {
        match value {
            "hah" => OnClickAction::Hah,
            "gp" => OnClickAction::Gp,
            _ => OnClickAction::Gc,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            OnClickAction::Gc => "gc",
            OnClickAction::Hah => "hah",
            OnClickAction::Gp => "gp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotWidth {
    Small,
    #[default]
    Normal,
    Wide,
    /// Grows with the number of screens on the x axis
    Dynamic,
}

impl PlotWidth {
    pub fn from_param(value: &str) -> Self {
        match value {
            "small" => PlotWidth::Small,
            "wide" => PlotWidth::Wide,
            "dynamic" => PlotWidth::Dynamic,
            _ => PlotWidth::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_size() {
        let display = DisplayConfig::default();
        assert_eq!(resolve_text_size("14px", &display), "14px");
        assert_eq!(resolve_text_size("HOI", &display), "11px");
        assert_eq!(resolve_text_size("", &display), "11px");
        assert_eq!(resolve_text_size("21px", &display), "11px");
    }

    #[test]
    fn test_pvalue() {
        let display = DisplayConfig::default();
        assert_eq!(resolve_pvalue("0.01", &display), 0.01);
        assert_eq!(resolve_pvalue("1E-5", &display), 1e-5);
        assert_eq!(resolve_pvalue("", &display), 0.05);
        assert_eq!(resolve_pvalue("HOI", &display), 0.05);
        assert_eq!(resolve_pvalue("NaN", &display), 0.05);
        assert_eq!(resolve_pvalue("-1", &display), 0.05);
    }

    #[test]
    fn test_screen_ids_all_or_nothing() {
        assert_eq!(parse_screen_ids(&["3", "1", " 7 "]), vec![3, 1, 7]);
        assert!(parse_screen_ids(&["3", "HOI"]).is_empty());
        assert!(parse_screen_ids::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_enums_fall_back() {
        assert_eq!(OnClickAction::from_param("hah"), OnClickAction::Hah);
        assert_eq!(OnClickAction::from_param("gp"), OnClickAction::Gp);
        assert_eq!(OnClickAction::from_param("??"), OnClickAction::Gc);
        assert_eq!(PlotWidth::from_param("dynamic"), PlotWidth::Dynamic);
        assert_eq!(PlotWidth::from_param("huge"), PlotWidth::Normal);
        assert!(is_checked(Some("on")));
        assert!(!is_checked(Some("off")));
        assert!(!is_checked(None));
    }
}
