//! Fishtail plot of a single intracellular phenotype screen.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use minijinja::context;
use phenosaurus_common::{messages, ApiError};
use phenosaurus_db::ScreenType;
use phenosaurus_plots::{
    fishtail_chart, fishtail_frame, gene_plot_url, is_checked, resolve_pvalue, resolve_text_size,
    top_hits, FishtailOptions, Notice, OnClickAction,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::state::SharedState;
use crate::templates::{render, script_json};
use crate::viewer::Viewer;

#[derive(Debug, Default, Deserialize)]
pub struct FishtailParams {
    pub screen: Option<String>,
    /// On-click action: gc, hah or gp
    pub oca: Option<String>,
    pub textsize: Option<String>,
    pub pvalue: Option<String>,
    /// Label all significant genes
    pub sag: Option<String>,
    pub showtable: Option<String>,
}

/// GET /simpleplot/
pub async fn simpleplot(
    State(state): State<SharedState>,
    viewer: Viewer,
    Query(params): Query<FishtailParams>,
) -> Result<(StatusCode, Html<String>), ApiError> {
    let authorized = viewer.authorized_screen_ids(&state).await?;
    let display = state.display().await?;
    let screens = state.screens();
    let ip_screens = screens
        .authorized_of_type(&authorized, ScreenType::IntracellularPhenotype)
        .await?;

    let textsize = resolve_text_size(params.textsize.as_deref().unwrap_or(""), &display);
    let pvalue = resolve_pvalue(params.pvalue.as_deref().unwrap_or(""), &display);
    let oca = OnClickAction::from_param(params.oca.as_deref().unwrap_or(""));
    let sag = is_checked(params.sag.as_deref());
    let showtable = is_checked(params.showtable.as_deref());

    let form = context! {
        screens => &ip_screens,
        selected => params.screen.as_deref().unwrap_or(""),
        text_sizes => &display.text_sizes,
        textsize => &textsize,
        pvalue => params.pvalue.as_deref().unwrap_or(""),
        oca => oca.code(),
        sag,
        showtable,
    };

    let requested = params.screen.as_deref().map(str::trim).unwrap_or("");
    if requested.is_empty() {
        let page = render(
            &state.templates,
            "simpleplot.html",
            context! { title => "Fishtail plot", form, notices => vec![Notice::text(messages::FORM_ERROR)] },
        )?;
        return Ok((StatusCode::OK, page));
    }

    let screen = match requested.parse::<i64>() {
        Ok(id) => screens.find_authorized(id, &authorized).await?,
        Err(_) => None,
    };
    let Some(screen) = screen else {
        warn!("Refused fishtail plot of screen {:?}", requested);
        let page = render(
            &state.templates,
            "simpleplot.html",
            context! {
                title => "Fishtail plot",
                form,
                notices => vec![Notice::text(messages::SCREEN_AUTHORIZATION_ERROR)],
            },
        )?;
        return Ok((StatusCode::FORBIDDEN, page));
    };

    let points = state.ips().for_screen(screen.id, &authorized).await?;
    let genes = state.genes().all().await?;
    let frame = fishtail_frame(&points, &genes, pvalue, &display);
    debug!("Fishtail of {}: {} point(s)", screen.name, frame.rows.len());

    let ip_ids: Vec<i64> = ip_screens.iter().map(|s| s.id).collect();
    let options = FishtailOptions {
        label_significant: sag,
        text_size: textsize.clone(),
        click: oca,
        gene_plot_url: gene_plot_url(&ip_ids),
    };
    let chart = fishtail_chart(&screen.description, &frame, &options, &display);
    let tophits = showtable.then(|| top_hits(&frame, &display.ucsc_link));

    let page = render(
        &state.templates,
        "simpleplot.html",
        context! {
            title => "Fishtail plot",
            form,
            screen => &screen,
            chart_json => script_json(&chart)?,
            dropped => frame.dropped,
            tophits,
        },
    )?;
    Ok((StatusCode::OK, page))
}
