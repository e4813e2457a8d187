use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub node_fill: String,
    pub node_border: String,
    pub text_color: String,
    pub line_color: String,
    pub hover_color: String,
    pub selected_color: String,
    pub merge_dot_color: String,
    pub edge_label_background: String,
    pub background: String,
    pub stroke_width: f32,
    pub emphasized_stroke_width: f32,
    pub merge_dot_radius: f32,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 14.0,
            node_fill: "#ECECFF".to_string(),
            node_border: "#9370DB".to_string(),
            text_color: "#333333".to_string(),
            line_color: "#333333".to_string(),
            hover_color: "#F5A623".to_string(),
            selected_color: "#1E6FD9".to_string(),
            merge_dot_color: "#333333".to_string(),
            edge_label_background: "#E8E8E8".to_string(),
            background: "#FFFFFF".to_string(),
            stroke_width: 1.4,
            emphasized_stroke_width: 2.6,
            merge_dot_radius: 4.0,
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            node_fill: "#F8FAFF".to_string(),
            node_border: "#C7D2E5".to_string(),
            text_color: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            hover_color: "#E8A33D".to_string(),
            selected_color: "#2F6FEB".to_string(),
            merge_dot_color: "#5B6B86".to_string(),
            edge_label_background: "#FFFFFF".to_string(),
            background: "#FFFFFF".to_string(),
            stroke_width: 1.3,
            emphasized_stroke_width: 2.4,
            merge_dot_radius: 4.0,
        }
    }
}
