use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning constants for path selection, parallel fan-out and snapping.
///
/// The defaults are the empirically tuned values of the editor; the
/// straight/curve thresholds interact only through the fixed priority order
/// in [`crate::routing::compute_path`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfig {
    pub edge_spacing: f32,
    pub snap_threshold: f32,
    pub straight_axis_threshold: f32,
    pub straight_distance_threshold: f32,
    pub smooth_curve_min_distance: f32,
    pub curve_bulge_ratio: f32,
    pub curve_bulge_max: f32,
    /// Default bend position for orthogonal-style edges, as a fraction of the
    /// preferred axis.
    pub orthogonal_bend_ratio: f32,
    /// Default bend position for curved edges that fall through to the
    /// Manhattan route.
    pub fallback_bend_ratio: f32,
    /// Offset tolerance under which parallel lanes count as axis aligned.
    pub parallel_align_epsilon: f32,
    pub multiplicity_label_offset: f32,
    pub multiplicity_label_inset: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            edge_spacing: 25.0,
            snap_threshold: 30.0,
            straight_axis_threshold: 150.0,
            straight_distance_threshold: 800.0,
            smooth_curve_min_distance: 500.0,
            curve_bulge_ratio: 0.25,
            curve_bulge_max: 120.0,
            orthogonal_bend_ratio: 0.5,
            fallback_bend_ratio: 0.6,
            parallel_align_epsilon: 0.5,
            multiplicity_label_offset: 14.0,
            multiplicity_label_inset: 18.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub padding: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
            padding: 24.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub routing: RoutingConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            routing: RoutingConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    node_fill: Option<String>,
    node_border: Option<String>,
    text_color: Option<String>,
    line_color: Option<String>,
    hover_color: Option<String>,
    selected_color: Option<String>,
    merge_dot_color: Option<String>,
    edge_label_background: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutingConfigFile {
    edge_spacing: Option<f32>,
    snap_threshold: Option<f32>,
    straight_axis_threshold: Option<f32>,
    straight_distance_threshold: Option<f32>,
    smooth_curve_min_distance: Option<f32>,
    curve_bulge_ratio: Option<f32>,
    curve_bulge_max: Option<f32>,
    orthogonal_bend_ratio: Option<f32>,
    fallback_bend_ratio: Option<f32>,
    parallel_align_epsilon: Option<f32>,
    multiplicity_label_offset: Option<f32>,
    multiplicity_label_inset: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    padding: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    routing: Option<RoutingConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a config document (JSON, or JSON5 as a fallback) and overlays it on
/// the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("invalid config file: {json_err}"))?,
    };

    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_border = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.hover_color {
            config.theme.hover_color = v;
        }
        if let Some(v) = vars.selected_color {
            config.theme.selected_color = v;
        }
        if let Some(v) = vars.merge_dot_color {
            config.theme.merge_dot_color = v;
        }
        if let Some(v) = vars.edge_label_background {
            config.theme.edge_label_background = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
    }

    if let Some(routing) = parsed.routing {
        let r = &mut config.routing;
        if let Some(v) = routing.edge_spacing {
            r.edge_spacing = v;
        }
        if let Some(v) = routing.snap_threshold {
            r.snap_threshold = v;
        }
        if let Some(v) = routing.straight_axis_threshold {
            r.straight_axis_threshold = v;
        }
        if let Some(v) = routing.straight_distance_threshold {
            r.straight_distance_threshold = v;
        }
        if let Some(v) = routing.smooth_curve_min_distance {
            r.smooth_curve_min_distance = v;
        }
        if let Some(v) = routing.curve_bulge_ratio {
            r.curve_bulge_ratio = v;
        }
        if let Some(v) = routing.curve_bulge_max {
            r.curve_bulge_max = v;
        }
        if let Some(v) = routing.orthogonal_bend_ratio {
            r.orthogonal_bend_ratio = v.clamp(0.0, 1.0);
        }
        if let Some(v) = routing.fallback_bend_ratio {
            r.fallback_bend_ratio = v.clamp(0.0, 1.0);
        }
        if let Some(v) = routing.parallel_align_epsilon {
            r.parallel_align_epsilon = v.max(0.0);
        }
        if let Some(v) = routing.multiplicity_label_offset {
            r.multiplicity_label_offset = v;
        }
        if let Some(v) = routing.multiplicity_label_inset {
            r.multiplicity_label_inset = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.padding {
            config.render.padding = v;
        }
    }

    Ok(config)
}
