//! Gene plots: requested genes compared across screens.

use axum::{extract::State, http::StatusCode, response::Html};
use axum_extra::extract::Query;
use minijinja::context;
use phenosaurus_common::{messages, ApiError};
use phenosaurus_db::ScreenType;
use phenosaurus_plots::{
    gene_plot_charts, is_checked, multiple_geneplot, parse_screen_ids, resolve_pvalue,
    split_gene_input, validate_gene_list, Notice, PlotWidth,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::state::{AppState, SharedState};
use crate::templates::{render, script_json};
use crate::viewer::Viewer;

#[derive(Debug, Default, Deserialize)]
pub struct GeneFinderParams {
    /// Repeated `screens=` values; all authorized screens when absent
    #[serde(default)]
    pub screens: Vec<String>,
    #[serde(default)]
    pub genes: String,
    pub pvalue: Option<String>,
    pub description: Option<String>,
    pub hidelegend: Option<String>,
    pub plot_width: Option<String>,
}

/// GET /opengenefinder/
pub async fn opengenefinder(
    State(state): State<SharedState>,
    viewer: Viewer,
    Query(params): Query<GeneFinderParams>,
) -> Result<(StatusCode, Html<String>), ApiError> {
    let authorized = viewer.authorized_screen_ids(&state).await?;
    let display = state.display().await?;
    let ip_screens = state
        .screens()
        .authorized_of_type(&authorized, ScreenType::IntracellularPhenotype)
        .await?;

    let requested_screens = if params.screens.is_empty() {
        authorized.clone()
    } else {
        parse_screen_ids(&params.screens)
    };
    let plot_width = PlotWidth::from_param(params.plot_width.as_deref().unwrap_or(""));
    let hidelegend = is_checked(params.hidelegend.as_deref());
    let description = is_checked(params.description.as_deref());

    let form = context! {
        screens => &ip_screens,
        selected => &requested_screens,
        genes => &params.genes,
        pvalue => params.pvalue.as_deref().unwrap_or(""),
        plot_width => plot_width,
        hidelegend,
        description,
    };

    let screens_ok = !requested_screens.is_empty() || params.screens.is_empty();
    if !screens_ok || !requested_screens.iter().all(|id| authorized.contains(id)) {
        warn!("Refused gene plot of screens {:?}", params.screens);
        let page = render(
            &state.templates,
            "opengenefinder.html",
            context! {
                title => "Gene plots",
                form,
                notices => vec![Notice::text(messages::SCREEN_AUTHORIZATION_ERROR)],
            },
        )?;
        return Ok((StatusCode::FORBIDDEN, page));
    }

    let pvalue = resolve_pvalue(params.pvalue.as_deref().unwrap_or(""), &display);
    let requested_genes = split_gene_input(&params.genes);
    let known = state.genes().find_by_names(&requested_genes).await?;
    let validation = validate_gene_list(&requested_genes, &known);

    let mut notices = Vec::new();
    if !validation.missing.is_empty() {
        let suggestions = suggest_genes(&state, &validation.missing).await?;
        notices.push(Notice::genes_not_found(&validation.missing, suggestions, &display.ucsc_link));
    }

    let mut charts = Vec::new();
    let mut descriptions = Vec::new();
    if validation.genes.len() > display.max_geneplots {
        notices.push(Notice::text(messages::max_graphs_warning(display.max_geneplots)));
    } else if !validation.genes.is_empty() {
        let points = state
            .ips()
            .for_genes(&validation.genes, &requested_screens, &authorized)
            .await?;
        let plot = multiple_geneplot(&validation.genes, &points, pvalue, &display);
        debug!(
            "Gene plots for {} gene(s) over {} screen(s)",
            plot.series.len(),
            requested_screens.len()
        );
        notices.extend(plot.notice(&display.ucsc_link));
        charts = gene_plot_charts(&plot, plot_width, hidelegend, &display);
        if description {
            descriptions = plot.descriptions;
        }
    }

    let charts_json = if charts.is_empty() { None } else { Some(script_json(&charts)?) };
    let page = render(
        &state.templates,
        "opengenefinder.html",
        context! { title => "Gene plots", form, notices, descriptions, charts_json },
    )?;
    Ok((StatusCode::OK, page))
}

/// Gene names containing any of the missing names, without duplicates.
async fn suggest_genes(state: &AppState, missing: &[String]) -> Result<Vec<String>, ApiError> {
    let genes = state.genes();
    let mut suggestions: Vec<String> = Vec::new();
    for name in missing {
        for candidate in genes.names_containing(name).await? {
            if !suggestions.contains(&candidate) {
                suggestions.push(candidate);
            }
        }
    }
    Ok(suggestions)
}
