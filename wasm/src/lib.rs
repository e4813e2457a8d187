use relroute::config::parse_config;
use relroute::{
    Config, Diagram, DragController, DragEvent, HoverTracker, PairPalette, Point, SelectionSnapshot,
    Viewport, parse_document,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn js_err(error: impl ToString) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn to_json(value: &impl Serialize) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_err)
}

/// One editor session: the diagram, its view state and the drag gesture.
#[wasm_bindgen]
pub struct EdgeRouter {
    diagram: Diagram,
    drag: DragController,
    hover: HoverTracker,
    selection: SelectionSnapshot,
    viewport: Viewport,
    config: Config,
}

#[wasm_bindgen]
impl EdgeRouter {
    #[wasm_bindgen(constructor)]
    pub fn new(document_json: &str, config_json: Option<String>) -> Result<EdgeRouter, JsValue> {
        let document = parse_document(document_json).map_err(js_err)?;
        let config = match config_json {
            Some(raw) => parse_config(&raw).map_err(js_err)?,
            None => Config::default(),
        };
        let mut hover = HoverTracker::new();
        hover.set(document.hovered_group.clone());
        Ok(EdgeRouter {
            diagram: Diagram::from_document(&document),
            drag: DragController::new(),
            hover,
            selection: document.selection.clone(),
            viewport: document.viewport,
            config,
        })
    }

    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(&mut self, pan_x: f32, pan_y: f32, zoom: f32) {
        self.viewport = Viewport::new(pan_x, pan_y, zoom);
    }

    #[wasm_bindgen(js_name = setSelection)]
    pub fn set_selection(&mut self, selection_json: &str) -> Result<(), JsValue> {
        self.selection = serde_json::from_str(selection_json).map_err(js_err)?;
        Ok(())
    }

    /// Returns the newly hovered group id (or `null`) when it changed,
    /// `undefined` otherwise.
    #[wasm_bindgen(js_name = hoverEdge)]
    pub fn hover_edge(&mut self, edge_id: Option<String>) -> JsValue {
        match self.hover.hover_edge(edge_id.as_deref(), self.diagram.merge_groups()) {
            Some(Some(group)) => JsValue::from_str(&group),
            Some(None) => JsValue::NULL,
            None => JsValue::UNDEFINED,
        }
    }

    #[wasm_bindgen(js_name = moveNode)]
    pub fn move_node(&mut self, node_id: &str, x: f32, y: f32) -> bool {
        self.diagram.move_node(node_id, x, y)
    }

    #[wasm_bindgen(js_name = removeEdge)]
    pub fn remove_edge(&mut self, edge_id: &str) -> Result<(), JsValue> {
        self.diagram
            .remove_edge(edge_id, &mut self.drag)
            .map(|_| ())
            .map_err(js_err)
    }

    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, node_id: &str) -> usize {
        self.diagram.remove_node(node_id, &mut self.drag).len()
    }

    /// Routed edges of the current frame as JSON.
    pub fn paths(&self) -> Result<String, JsValue> {
        let routed = self.diagram.frame(
            &self.config.routing,
            &self.drag,
            &self.selection,
            self.hover.hovered_group(),
        );
        to_json(&routed)
    }

    #[wasm_bindgen(js_name = renderSvg)]
    pub fn render_svg(&self) -> String {
        let routed = self.diagram.frame(
            &self.config.routing,
            &self.drag,
            &self.selection,
            self.hover.hovered_group(),
        );
        let palette = PairPalette::for_edges(self.diagram.edges());
        relroute::render::render_svg(
            &self.diagram,
            &routed,
            &self.config.theme,
            &palette,
            &self.config.render,
        )
    }

    #[wasm_bindgen(js_name = validate)]
    pub fn validate(&self) -> Result<String, JsValue> {
        let problems: Vec<String> = self.diagram.validate().iter().map(ToString::to_string).collect();
        to_json(&problems)
    }

    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self, edge_id: &str, screen_x: f32, screen_y: f32) -> Result<String, JsValue> {
        let handle = self
            .diagram
            .handle_position(edge_id, &self.config.routing)
            .ok_or_else(|| js_err(format!("edge {edge_id} has no control handle")))?;
        let event = self
            .drag
            .start(edge_id, handle, Point::new(screen_x, screen_y), &self.viewport);
        self.apply(event)
    }

    #[wasm_bindgen(js_name = dragMove)]
    pub fn drag_move(&mut self, edge_id: &str, screen_x: f32, screen_y: f32) -> Result<String, JsValue> {
        let event = self
            .drag
            .on_move(edge_id, Point::new(screen_x, screen_y), &self.viewport);
        self.apply(event)
    }

    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&mut self, edge_id: &str, screen_x: f32, screen_y: f32) -> Result<String, JsValue> {
        let event = self
            .drag
            .end(edge_id, Point::new(screen_x, screen_y), &self.viewport);
        self.apply(event)
    }

    #[wasm_bindgen(js_name = resetControlPoint)]
    pub fn reset_control_point(&mut self, edge_id: &str) -> Result<String, JsValue> {
        let event = self.drag.reset(edge_id);
        self.apply(Some(event))
    }

    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&mut self) -> bool {
        self.drag.cancel()
    }
}

impl EdgeRouter {
    fn apply(&mut self, event: Option<DragEvent>) -> Result<String, JsValue> {
        let events: Vec<DragEvent> = event.into_iter().collect();
        for event in &events {
            self.diagram
                .apply(event, &self.config.routing)
                .map_err(js_err)?;
        }
        to_json(&events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "nodes": [
            { "id": "A", "x": 0, "y": -30, "width": 100, "height": 60 },
            { "id": "B", "x": 400, "y": -30, "width": 100, "height": 60 }
        ],
        "edges": [
            { "id": "e", "source": "A", "target": "B", "sourceSide": "right", "targetSide": "left", "routingStyle": "orthogonal" }
        ]
    }"#;

    #[test]
    fn drag_gesture_commits_snapped_point() {
        let mut router = EdgeRouter::new(DOC, None).expect("router");
        let started = router.drag_start("e", 250.0, 0.0).expect("start");
        assert!(started.contains("\"started\""));
        router.drag_move("e", 105.0, 5.0).expect("move");
        let committed = router.drag_end("e", 105.0, 5.0).expect("end");
        assert!(committed.contains("\"committed\""));
        let edge = router.diagram.edge("e").expect("edge");
        assert_eq!(edge.custom_control_point, Some(Point::new(100.0, 5.0)));
    }

    #[test]
    fn paths_serialize_every_edge() {
        let router = EdgeRouter::new(DOC, None).expect("router");
        let json = router.paths().expect("paths");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("json");
        assert_eq!(parsed.as_array().map(Vec::len), Some(1));
        assert!(router.render_svg().contains("<svg"));
    }
}
