//! World to screen projection for the chase camera.
//!
//! The camera never rotates, so projection is a perspective divide along Z:
//! `scale = fov / dz`, with screen Y growing downward.

use crate::data::WorldPoint;

/// Points closer than this to the camera along Z are not projected
pub const NEAR_PLANE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub x: f32,
    pub y: f32,
    /// Perspective scale, `fov / depth`
    pub scale: f32,
    pub depth: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    pub field_of_view: f32,
    pub screen_width: f32,
    pub screen_height: f32,
}

impl Projector {
    pub fn new(field_of_view: f32, screen_width: f32, screen_height: f32) -> Self {
        Self {
            field_of_view,
            screen_width,
            screen_height,
        }
    }

    /// Project a world point as seen from `camera`.
    ///
    /// Returns `None` when the point is on or behind the near plane.
    pub fn project(&self, world: WorldPoint, camera: WorldPoint) -> Option<Projection> {
        let dx = world.x - camera.x;
        let dy = world.y - camera.y;
        let dz = world.z - camera.z;

        if dz <= NEAR_PLANE {
            return None;
        }

        let scale = self.field_of_view / dz;
        Some(Projection {
            x: self.screen_width / 2.0 + dx * scale,
            y: self.screen_height / 2.0 - dy * scale,
            scale,
            depth: dz,
        })
    }
}
