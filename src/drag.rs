use serde::Serialize;
use tracing::debug;

use crate::geometry::Point;
use crate::ir::EdgeId;
use crate::viewport::CoordinateTransform;

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub edge_id: EdgeId,
    /// `control point - pointer` at gesture start, in model space.
    pub pointer_offset: Point,
    pub last_point: Point,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DragEvent {
    #[serde(rename_all = "camelCase")]
    Started { edge_id: EdgeId, point: Point },
    #[serde(rename_all = "camelCase")]
    Moved { edge_id: EdgeId, point: Point },
    /// `point == None` clears the edge's custom control point.
    #[serde(rename_all = "camelCase")]
    Committed { edge_id: EdgeId, point: Option<Point> },
}

impl DragEvent {
    pub fn edge_id(&self) -> &str {
        match self {
            DragEvent::Started { edge_id, .. }
            | DragEvent::Moved { edge_id, .. }
            | DragEvent::Committed { edge_id, .. } => edge_id,
        }
    }
}

#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref().filter(|s| s.active)
    }

    pub fn is_dragging(&self) -> bool {
        self.session().is_some()
    }

    /// Live control point of `edge_id` if it is the edge being dragged.
    pub fn live_point(&self, edge_id: &str) -> Option<Point> {
        self.session()
            .filter(|s| s.edge_id == edge_id)
            .map(|s| s.last_point)
    }

    /// Pointer-down on an edge's control handle.
    ///
    /// `control_point` is the handle's current model position, so the point
    /// does not jump to the pointer. Rejected while another session is active.
    pub fn start(
        &mut self,
        edge_id: &str,
        control_point: Point,
        pointer: Point,
        transform: &impl CoordinateTransform,
    ) -> Option<DragEvent> {
        if let Some(active) = self.session() {
            debug!(active = %active.edge_id, requested = %edge_id, "drag start rejected");
            return None;
        }
        let pointer_model = transform.screen_to_model(pointer);
        self.session = Some(DragSession {
            edge_id: edge_id.to_string(),
            pointer_offset: control_point.sub(pointer_model),
            last_point: control_point,
            active: true,
        });
        debug!(edge = %edge_id, "drag started");
        Some(DragEvent::Started {
            edge_id: edge_id.to_string(),
            point: control_point,
        })
    }

    pub fn on_move(
        &mut self,
        edge_id: &str,
        pointer: Point,
        transform: &impl CoordinateTransform,
    ) -> Option<DragEvent> {
        let session = self
            .session
            .as_mut()
            .filter(|s| s.active && s.edge_id == edge_id)?;
        let point = transform.screen_to_model(pointer).add(session.pointer_offset);
        session.last_point = point;
        Some(DragEvent::Moved {
            edge_id: edge_id.to_string(),
            point,
        })
    }

    /// Pointer-up: commits the final point and ends the session.
    pub fn end(
        &mut self,
        edge_id: &str,
        pointer: Point,
        transform: &impl CoordinateTransform,
    ) -> Option<DragEvent> {
        let session = self.session.as_ref().filter(|s| s.active && s.edge_id == edge_id)?;
        let point = transform.screen_to_model(pointer).add(session.pointer_offset);
        self.session = None;
        debug!(edge = %edge_id, x = point.x, y = point.y, "drag committed");
        Some(DragEvent::Committed {
            edge_id: edge_id.to_string(),
            point: Some(point),
        })
    }

    /// Reset gesture: clears the custom control point. Works without a
    /// session; a session on the same edge is dropped.
    pub fn reset(&mut self, edge_id: &str) -> DragEvent {
        if self.session.as_ref().is_some_and(|s| s.edge_id == edge_id) {
            self.session = None;
        }
        DragEvent::Committed {
            edge_id: edge_id.to_string(),
            point: None,
        }
    }

    /// Drops the session without emitting a commit.
    pub fn cancel(&mut self) -> bool {
        self.session.take().is_some()
    }

    /// Drops the session if it belongs to one of `edge_ids`.
    pub fn discard_edges<'a>(&mut self, edge_ids: impl IntoIterator<Item = &'a str>) -> bool {
        let Some(active) = self.session.as_ref().map(|s| s.edge_id.clone()) else {
            return false;
        };
        if edge_ids.into_iter().any(|id| id == active) {
            debug!(edge = %active, "drag discarded");
            self.session = None;
            return true;
        }
        false
    }
}
