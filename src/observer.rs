use crate::drag::DragEvent;
use crate::geometry::Point;
use crate::ir::MergeGroupId;

/// Host callbacks for gesture and hover notifications. Every method has an
/// empty default so a host implements only what it renders.
pub trait RouteObserver {
    fn on_drag_start(&mut self, _edge_id: &str) {}
    fn on_drag_move(&mut self, _edge_id: &str, _point: Point) {}
    fn on_drag_commit(&mut self, _edge_id: &str, _point: Option<Point>) {}
    fn on_merge_group_hover_change(&mut self, _group_id: Option<&str>) {}
}

impl DragEvent {
    pub fn dispatch(&self, observer: &mut impl RouteObserver) {
        match self {
            DragEvent::Started { edge_id, .. } => observer.on_drag_start(edge_id),
            DragEvent::Moved { edge_id, point } => observer.on_drag_move(edge_id, *point),
            DragEvent::Committed { edge_id, point } => observer.on_drag_commit(edge_id, *point),
        }
    }
}

/// Forwards the result of [`crate::highlight::HoverTracker`] to `observer`
/// when the hovered group changed.
pub fn dispatch_hover_change(change: Option<Option<MergeGroupId>>, observer: &mut impl RouteObserver) {
    if let Some(group) = change {
        observer.on_merge_group_hover_change(group.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::DragController;
    use crate::viewport::Viewport;

    #[derive(Default)]
    struct Log(Vec<String>);

    impl RouteObserver for Log {
        fn on_drag_start(&mut self, edge_id: &str) {
            self.0.push(format!("start {edge_id}"));
        }
        fn on_drag_move(&mut self, edge_id: &str, point: Point) {
            self.0.push(format!("move {edge_id} {} {}", point.x, point.y));
        }
        fn on_drag_commit(&mut self, edge_id: &str, point: Option<Point>) {
            self.0.push(format!("commit {edge_id} {}", point.is_some()));
        }
        fn on_merge_group_hover_change(&mut self, group_id: Option<&str>) {
            self.0.push(format!("hover {group_id:?}"));
        }
    }

    #[test]
    fn gesture_reaches_the_observer_in_order() {
        let vp = Viewport::default();
        let mut drag = DragController::new();
        let mut log = Log::default();
        let events = [
            drag.start("e", Point::new(0.0, 0.0), Point::new(0.0, 0.0), &vp),
            drag.on_move("e", Point::new(3.0, 4.0), &vp),
            drag.end("e", Point::new(3.0, 4.0), &vp),
            Some(drag.reset("e")),
        ];
        for event in events.iter().flatten() {
            event.dispatch(&mut log);
        }
        assert_eq!(
            log.0,
            vec!["start e", "move e 3 4", "commit e true", "commit e false"]
        );
    }

    #[test]
    fn unchanged_hover_is_not_forwarded() {
        let mut log = Log::default();
        dispatch_hover_change(None, &mut log);
        dispatch_hover_change(Some(Some("g".to_string())), &mut log);
        assert_eq!(log.0, vec!["hover Some(\"g\")"]);
    }
}
