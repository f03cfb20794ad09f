//! HTML templates, embedded at compile time.

use axum::response::Html;
use chrono::Datelike;
use minijinja::Environment;
use phenosaurus_common::ApiError;
use serde::Serialize;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("notices.html", include_str!("../templates/notices.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("simpleplot.html", include_str!("../templates/simpleplot.html")),
    ("opengenefinder.html", include_str!("../templates/opengenefinder.html")),
    ("listgenes.html", include_str!("../templates/listgenes.html")),
    ("updates.html", include_str!("../templates/updates.html")),
    ("help.html", include_str!("../templates/help.html")),
    ("about.html", include_str!("../templates/about.html")),
    ("contact.html", include_str!("../templates/contact.html")),
    ("404.html", include_str!("../templates/404.html")),
    ("admin.html", include_str!("../templates/admin.html")),
];

pub fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    for &(name, source) in TEMPLATES {
        env.add_template(name, source)?;
    }
    env.add_function("current_year", || chrono::Utc::now().year());
    env.add_filter("sci", |value: f64| format!("{value:.3e}"));
    env.add_filter("fixed", |value: f64| format!("{value:.3}"));
    Ok(env)
}

pub fn render<S: Serialize>(env: &Environment<'_>, name: &str, ctx: S) -> Result<Html<String>, ApiError> {
    let template = env
        .get_template(name)
        .map_err(|e| ApiError::Internal(format!("template {name}: {e}")))?;
    template
        .render(ctx)
        .map(Html)
        .map_err(|e| ApiError::Internal(format!("template {name}: {e}")))
}

/// JSON for embedding in a `<script type="application/json">` element.
/// `<` is escaped so a gene or screen name cannot close the element.
pub fn script_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    let json = serde_json::to_string(value).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(json.replace('<', "\\u003c"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_parse() {
        let env = environment().unwrap();
        for (name, _) in TEMPLATES {
            assert!(env.get_template(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_footer_year_is_current() {
        let env = environment().unwrap();
        let page = render(&env, "about.html", minijinja::context! { title => "About", message => "" }).unwrap();
        assert!(page.0.contains(&format!("&copy; {} Phenosaurus", chrono::Utc::now().year())));
    }

    #[test]
    fn test_number_filters() {
        let env = environment().unwrap();
        let out = env
            .render_str("{{ p|sci }} {{ m|fixed }}", minijinja::context! { p => 0.000123, m => -1.5 })
            .unwrap();
        assert_eq!(out, "1.230e-4 -1.500");
    }

    #[test]
    fn test_script_json_escapes_tags() {
        let json = script_json(&vec!["</script><b>"]).unwrap();
        assert!(!json.contains('<'));
        let back: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec!["</script><b>"]);
    }
}
