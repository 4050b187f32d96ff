//! Screen-space collision between the player's car and roadside objects.

use crate::config::CollisionSettings;
use crate::data::{RoadsideObject, Sprite};

/// Axis-aligned rectangle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_sprite(sprite: &Sprite) -> Self {
        let (left, top, width, height) = sprite.rect();
        Self::new(left, top, width, height)
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Sub-rectangle given as fractions of this one
    pub fn sub_rect(&self, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(
            self.left + self.width * x,
            self.top + self.height * y,
            self.width * width,
            self.height * height,
        )
    }

    /// Same centre, scaled extents
    pub fn shrink(&self, width_factor: f32, height_factor: f32) -> Self {
        self.sub_rect(
            (1.0 - width_factor) * 0.5,
            (1.0 - height_factor) * 0.5,
            width_factor,
            height_factor,
        )
    }

    /// Touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

pub fn player_bounds(sprite: &Sprite, settings: &CollisionSettings) -> Rect {
    Rect::from_sprite(sprite).shrink(settings.player_hitbox_width, settings.player_hitbox_height)
}

/// Solid part of an object's sprite, e.g. only the trunk of a tree
pub fn object_bounds(object: &RoadsideObject) -> Rect {
    let (x, y, w, h) = object.sprite_key.hitbox();
    Rect::from_sprite(&object.sprite).sub_rect(x, y, w, h)
}

pub fn can_collide(object: &RoadsideObject) -> bool {
    object.sprite.visible && object.collision_eligible && !object.consumed
}

/// Index of the first object the player overlaps, if any
pub fn find_hit(player: &Rect, objects: &[RoadsideObject]) -> Option<usize> {
    objects
        .iter()
        .position(|object| can_collide(object) && player.overlaps(&object_bounds(object)))
}
