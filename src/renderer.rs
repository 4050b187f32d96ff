//! Painter's-algorithm road renderer.
//!
//! The road is walked from the camera outward so the curvature and elevation
//! accumulators integrate in track order, but the resulting quads are painted
//! back to front. Roadside objects are then sorted far to near, projected on
//! top of the road offset at their own Z, and given a depth that keeps nearer
//! sprites above farther ones and every sprite below the player's car.

use crate::config::{GameConfig, ObjectSettings};
use crate::data::{Rgb, ScreenPoint, WorldPoint};
use crate::objects::ObjectPool;
use crate::projection::{Projection, Projector, NEAR_PLANE};
use crate::segment_store::SegmentStore;

pub const ROAD_DEPTH: f32 = 1.0;
pub const OBJECT_DEPTH_BASE: f32 = 10.0;
pub const PLAYER_DEPTH: f32 = 1.0e7;

/// Host drawing surface
pub trait DrawSurface {
    fn clear(&mut self);
    fn fill_polygon(&mut self, points: &[ScreenPoint], color: Rgb);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    pub segments_drawn: usize,
    /// Smallest far-edge screen Y reached by the road this frame
    pub horizon_y: f32,
    pub objects_visible: usize,
}

#[derive(Debug, Clone, Copy)]
struct SegmentQuad {
    near: Projection,
    far: Projection,
    surface_color: Rgb,
    rumble_color: Rgb,
    grass_color: Rgb,
}

#[derive(Debug, Clone)]
pub struct Renderer {
    projector: Projector,
    segment_length: f32,
    road_half_width: f32,
    draw_distance: usize,
    rumble_ratio: f32,
    camera_height: f32,
    objects: ObjectSettings,
}

impl Renderer {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            projector: Projector::new(
                config.camera.field_of_view,
                config.screen.width,
                config.screen.height,
            ),
            segment_length: config.track.segment_length,
            road_half_width: config.track.road_half_width(),
            draw_distance: config.track.draw_distance,
            rumble_ratio: config.track.rumble_ratio,
            camera_height: config.camera.camera_height,
            objects: config.objects.clone(),
        }
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Camera pose for a player at `lane` with the camera at `camera_z`.
    /// Moving the camera sideways makes the road slide the other way.
    pub fn camera(&self, lane: f32, camera_z: f32) -> WorldPoint {
        WorldPoint::new(lane * self.road_half_width, self.camera_height, camera_z)
    }

    pub fn render<S: DrawSurface + ?Sized>(
        &self,
        store: &SegmentStore,
        pool: &mut ObjectPool,
        camera: WorldPoint,
        surface: &mut S,
    ) -> RenderStats {
        surface.clear();
        let (segments_drawn, horizon_y) = self.render_road(store, camera, surface);
        let objects_visible = self.place_objects(store, pool, camera, horizon_y);

        tracing::trace!(segments_drawn, horizon_y, objects_visible, "Frame rendered");
        RenderStats {
            segments_drawn,
            horizon_y,
            objects_visible,
        }
    }

    fn render_road<S: DrawSurface + ?Sized>(
        &self,
        store: &SegmentStore,
        camera: WorldPoint,
        surface: &mut S,
    ) -> (usize, f32) {
        let screen_height = self.projector.screen_height;
        let mut quads = Vec::with_capacity(self.draw_distance);
        let mut x_offset = 0.0f32;
        let mut y_offset = 0.0f32;
        let mut horizon_y = screen_height;

        for segment in store.iter().take(self.draw_distance) {
            if !SegmentStore::is_ahead(segment, camera.z) {
                continue;
            }

            let near = self
                .projector
                .project(WorldPoint::new(x_offset, y_offset, segment.z), camera);
            x_offset += segment.curve_delta;
            y_offset += segment.elevation_delta;
            let far = self.projector.project(
                WorldPoint::new(x_offset, y_offset, segment.z + self.segment_length),
                camera,
            );

            let (Some(near), Some(far)) = (near, far) else {
                continue;
            };
            if near.y < far.y || far.y >= screen_height || near.y < 0.0 {
                continue;
            }

            horizon_y = horizon_y.min(far.y);
            quads.push(SegmentQuad {
                near,
                far,
                surface_color: segment.surface_color,
                rumble_color: segment.rumble_color,
                grass_color: segment.grass_color,
            });
        }

        for quad in quads.iter().rev() {
            self.draw_quad(quad, surface);
        }
        (quads.len(), horizon_y)
    }

    fn draw_quad<S: DrawSurface + ?Sized>(&self, quad: &SegmentQuad, surface: &mut S) {
        let (p1, p2) = (quad.near, quad.far);
        let w1 = self.road_half_width * p1.scale;
        let w2 = self.road_half_width * p2.scale;
        let inner = 1.0 - self.rumble_ratio;
        let screen_width = self.projector.screen_width;

        // Grass either side, out to the screen edges
        surface.fill_polygon(
            &[
                ScreenPoint::new(0.0, p1.y),
                ScreenPoint::new(p1.x - w1, p1.y),
                ScreenPoint::new(p2.x - w2, p2.y),
                ScreenPoint::new(0.0, p2.y),
            ],
            quad.grass_color,
        );
        surface.fill_polygon(
            &[
                ScreenPoint::new(p1.x + w1, p1.y),
                ScreenPoint::new(screen_width, p1.y),
                ScreenPoint::new(screen_width, p2.y),
                ScreenPoint::new(p2.x + w2, p2.y),
            ],
            quad.grass_color,
        );

        surface.fill_polygon(
            &[
                ScreenPoint::new(p1.x - w1, p1.y),
                ScreenPoint::new(p1.x + w1, p1.y),
                ScreenPoint::new(p2.x + w2, p2.y),
                ScreenPoint::new(p2.x - w2, p2.y),
            ],
            quad.surface_color,
        );

        surface.fill_polygon(
            &[
                ScreenPoint::new(p1.x - w1, p1.y),
                ScreenPoint::new(p1.x - w1 * inner, p1.y),
                ScreenPoint::new(p2.x - w2 * inner, p2.y),
                ScreenPoint::new(p2.x - w2, p2.y),
            ],
            quad.rumble_color,
        );
        surface.fill_polygon(
            &[
                ScreenPoint::new(p1.x + w1 * inner, p1.y),
                ScreenPoint::new(p1.x + w1, p1.y),
                ScreenPoint::new(p2.x + w2, p2.y),
                ScreenPoint::new(p2.x + w2 * inner, p2.y),
            ],
            quad.rumble_color,
        );
    }

    /// Draw order value for a sprite `depth` units in front of the camera
    pub fn object_depth(&self, depth: f32) -> f32 {
        (OBJECT_DEPTH_BASE + self.objects.depth_constant / depth.max(NEAR_PLANE))
            .min(PLAYER_DEPTH - 1.0)
    }

    fn place_objects(
        &self,
        store: &SegmentStore,
        pool: &mut ObjectPool,
        camera: WorldPoint,
        horizon_y: f32,
    ) -> usize {
        let settings = &self.objects;
        let max_ahead = self.draw_distance as f32 * self.segment_length * settings.visible_fraction;
        let min_y = horizon_y * settings.horizon_band;
        let mut visible = 0;

        pool.sort_far_to_near();
        for object in pool.objects_mut() {
            let ahead = object.world_z - camera.z;
            if object.consumed || ahead < NEAR_PLANE || ahead >= max_ahead {
                object.sprite.visible = false;
                continue;
            }

            let offset = store.road_offset_at(camera.z, object.world_z);
            let world = WorldPoint::new(
                object.world_x * self.road_half_width + offset.x,
                offset.y,
                object.world_z,
            );

            match self.projector.project(world, camera) {
                Some(p) if p.y < self.projector.screen_height && p.y > min_y => {
                    object.sprite.x = p.x;
                    object.sprite.y = p.y;
                    object.sprite.scale =
                        p.scale * object.base_scale * settings.sprite_scale_multiplier;
                    object.sprite.depth = self.object_depth(p.depth);
                    object.sprite.visible = true;
                    visible += 1;
                }
                _ => object.sprite.visible = false,
            }
        }
        visible
    }
}
