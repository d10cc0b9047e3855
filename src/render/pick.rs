//! CPU picking against node bounds.
//!
//! A ray is cast from the camera through the cursor and tested against the
//! world-space bounds of every node that carries bounds; the nearest hit wins.
//! On top of raw picks the service tracks the hovered node (emitting
//! [`HoverObjectChanged`] only on change) and the selected node the transform
//! gizmo is attached to.

use crate::render::{Viewport, ViewerCamera};
use crate::scene::{NodeId, Scene};

// ========================================================================
// Events
// ========================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    pub distance: f32,
    pub screen_x: f32,
    pub screen_y: f32,
}

/// Fired when the node under the cursor changes. `None` means background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverObjectChanged {
    pub object: Option<NodeId>,
}

/// Fired on click. Handlers may rewrite `selected_object` to redirect what
/// the transform gizmo attaches to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitObject {
    pub selected_object: Option<NodeId>,
    pub hit: Option<PickHit>,
}

// ========================================================================
// PickingService
// ========================================================================

pub struct PickingService {
    /// Draw a bounding box widget around the selection.
    pub widget_enabled: bool,
    /// Track the hovered node and emit hover changes.
    pub hover_enabled: bool,
    hover_object: Option<NodeId>,
    selected_object: Option<NodeId>,
}

impl PickingService {
    pub fn new(widget_enabled: bool, hover_enabled: bool) -> Self {
        Self {
            widget_enabled,
            hover_enabled,
            hover_object: None,
            selected_object: None,
        }
    }

    #[cfg(test)]
    pub fn hover_object(&self) -> Option<NodeId> {
        self.hover_object
    }

    pub fn selected_object(&self) -> Option<NodeId> {
        self.selected_object
    }

    /// Nearest node whose world bounds the cursor ray hits.
    pub fn pick(
        &self,
        scene: &Scene,
        camera: &ViewerCamera,
        viewport: &Viewport,
        screen_x: f32,
        screen_y: f32,
    ) -> Option<PickHit> {
        let ray = camera.ray_from_screen(screen_x, screen_y, viewport);
        scene
            .nodes()
            .filter_map(|(id, _)| {
                let bounds = scene.world_bounds(id)?;
                let distance = bounds.ray_distance(ray.origin, ray.dir)?;
                Some(PickHit {
                    node: id,
                    distance,
                    screen_x,
                    screen_y,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Record the node under the cursor; returns an event when it changed.
    pub fn update_hover(&mut self, object: Option<NodeId>) -> Option<HoverObjectChanged> {
        if !self.hover_enabled {
            self.hover_object = None;
            return None;
        }
        if self.hover_object == object {
            return None;
        }
        self.hover_object = object;
        Some(HoverObjectChanged { object })
    }

    pub fn click(&self, hit: Option<PickHit>) -> HitObject {
        HitObject {
            selected_object: hit.map(|hit| hit.node),
            hit,
        }
    }

    /// Attach the gizmo to whatever the hit handlers left in `selected_object`.
    pub fn commit_selection(&mut self, event: &HitObject) {
        if self.selected_object == event.selected_object {
            return;
        }
        self.selected_object = event.selected_object;
        if self.widget_enabled {
            log::debug!("Selection widget moved to {:?}", self.selected_object);
        }
    }
}

// ========================================================================
// Tests
// ========================================================================
