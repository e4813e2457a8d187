use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::ir::{Edge, NodeId};

const DEFAULT_HUES: usize = 12;

/// Evenly spaced hues at fixed saturation and lightness.
static DEFAULT_COLORS: Lazy<Vec<String>> =
    Lazy::new(|| (0..DEFAULT_HUES).map(|i| hsl_to_hex(i as f32 * 360.0 / DEFAULT_HUES as f32, 0.55, 0.42)).collect());

pub fn default_colors() -> &'static [String] {
    &DEFAULT_COLORS
}

fn hsl_to_hex(h: f32, s: f32, l: f32) -> String {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h / 60.0) % 6.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("#{:02X}{:02X}{:02X}", byte(r), byte(g), byte(b))
}

/// Colors keyed by `(source, target)`, assigned from a cycle on first use.
#[derive(Debug, Clone)]
pub struct PairPalette {
    colors: Vec<String>,
    assigned: HashMap<(NodeId, NodeId), String>,
}

impl Default for PairPalette {
    fn default() -> Self {
        Self::new(default_colors().to_vec())
    }
}

impl PairPalette {
    pub fn new(colors: Vec<String>) -> Self {
        Self {
            colors,
            assigned: HashMap::new(),
        }
    }

    /// Assigns a color to every `(source, target)` pair in edge order.
    pub fn for_edges(edges: &[Edge]) -> Self {
        let mut palette = Self::default();
        for edge in edges {
            palette.color_for(&edge.source, &edge.target);
        }
        palette
    }

    pub fn get(&self, source: &str, target: &str) -> Option<&str> {
        self.assigned
            .get(&(source.to_string(), target.to_string()))
            .map(String::as_str)
    }

    pub fn color_for(&mut self, source: &str, target: &str) -> Option<&str> {
        if self.colors.is_empty() {
            return None;
        }
        let next = self.colors[self.assigned.len() % self.colors.len()].clone();
        Some(
            self.assigned
                .entry((source.to_string(), target.to_string()))
                .or_insert(next)
                .as_str(),
        )
    }

    pub fn set(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>, color: impl Into<String>) {
        self.assigned.insert((source.into(), target.into()), color.into());
    }

    pub fn clear(&mut self) {
        self.assigned.clear();
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}
