//! Stylesheet and script tags, and the built-in assets they point at.

use crate::facets::FacetConfig;

pub const STYLESHEET_FILE: &str = "singletablefacets.css";
pub const SCRIPT_FILE: &str = "singletablefacets.js";

/// Built-in stylesheet, served when no override exists on disk.
pub const DEFAULT_STYLESHEET: &str = include_str!("../../assets/singletablefacets.css");

/// Built-in script, served when no override exists on disk.
pub const DEFAULT_SCRIPT: &str = include_str!("../../assets/singletablefacets.js");

pub fn render_styles(config: &FacetConfig) -> String {
    format!(
        r#"<link rel="stylesheet" href="{}" />"#,
        asset_url(config, STYLESHEET_FILE)
    )
}

pub fn render_javascript(config: &FacetConfig) -> String {
    format!(
        r#"<script type="text/javascript" src="{}"></script>"#,
        asset_url(config, SCRIPT_FILE)
    )
}

fn asset_url(config: &FacetConfig, file: &str) -> String {
    let prefix = config.asset_path.trim_end_matches('/');
    if prefix.is_empty() {
        file.to_string()
    } else {
        format!("{prefix}/{file}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tags() {
        let config = FacetConfig::new("grants");
        assert_eq!(
            render_styles(&config),
            r#"<link rel="stylesheet" href="assets/singletablefacets.css" />"#
        );
        assert_eq!(
            render_javascript(&config),
            r#"<script type="text/javascript" src="assets/singletablefacets.js"></script>"#
        );
    }

    #[test]
    fn custom_prefix() {
        let mut config = FacetConfig::new("grants");
        config.asset_path = "/static/facets/".to_string();
        assert_eq!(
            render_styles(&config),
            r#"<link rel="stylesheet" href="/static/facets/singletablefacets.css" />"#
        );
    }

    #[test]
    fn built_in_assets_are_not_empty() {
        assert!(DEFAULT_STYLESHEET.contains(".doj-facet-search-results"));
        assert!(!DEFAULT_SCRIPT.is_empty());
    }
}
