//! Fixed-size window of track segments around the camera.
//!
//! Segments that fall behind the camera are popped from the front and
//! re-appended at the back with a new index, position and generated shape.
//! The number of resident segments never changes after construction.

use crate::data::Segment;
use crate::projection::NEAR_PLANE;
use crate::track_generator::TrackGenerator;
use rand::Rng;
use std::collections::VecDeque;

/// Segments are recycled once their near edge is this many lengths behind the camera
pub const RECYCLE_LAG_SEGMENTS: f32 = 2.0;

/// Accumulated road offset at some point down the track
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoadOffset {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone)]
pub struct SegmentStore {
    segments: VecDeque<Segment>,
    segment_length: f32,
}

impl SegmentStore {
    /// Build `count` flat segments starting at z = 0
    pub fn new(count: usize, segment_length: f32) -> Self {
        let segments = (0..count)
            .map(|i| Segment::new(i as u64, i as f32 * segment_length))
            .collect();
        Self {
            segments,
            segment_length,
        }
    }

    /// Adopt an existing run of segments, e.g. a hand-shaped test track
    pub fn from_segments(segments: Vec<Segment>, segment_length: f32) -> Self {
        Self {
            segments: segments.into(),
            segment_length,
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment_length(&self) -> f32 {
        self.segment_length
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn front(&self) -> Option<&Segment> {
        self.segments.front()
    }

    pub fn back(&self) -> Option<&Segment> {
        self.segments.back()
    }

    /// Segment containing world `z`, clamped to the resident window
    pub fn segment_at(&self, z: f32) -> Option<&Segment> {
        let front = self.segments.front()?;
        let offset = ((z - front.z) / self.segment_length).floor();
        let index = if offset <= 0.0 {
            0
        } else {
            (offset as usize).min(self.segments.len() - 1)
        };
        self.segments.get(index)
    }

    /// Curvature of the segment under world `z`; flat if the store is empty
    pub fn curve_at(&self, z: f32) -> f32 {
        self.segment_at(z).map_or(0.0, |s| s.curve_delta)
    }

    /// Whether a segment takes part in the road walk for this camera position.
    ///
    /// Segments whose near edge sits on or behind the near plane are neither
    /// drawn nor accumulated, for the road and the objects alike.
    pub fn is_ahead(segment: &Segment, camera_z: f32) -> bool {
        segment.z - camera_z >= NEAR_PLANE
    }

    /// Road offset accumulated from the camera up to world `z`.
    ///
    /// Matches the renderer's running accumulators at every segment edge and
    /// interpolates linearly inside the segment that straddles `z`.
    pub fn road_offset_at(&self, camera_z: f32, z: f32) -> RoadOffset {
        let mut offset = RoadOffset::default();
        for segment in self.segments.iter() {
            if segment.z >= z {
                break;
            }
            if !Self::is_ahead(segment, camera_z) {
                continue;
            }
            let fraction = ((z - segment.z) / self.segment_length).min(1.0);
            offset.x += segment.curve_delta * fraction;
            offset.y += segment.elevation_delta * fraction;
        }
        offset
    }

    /// Move every segment that fell behind the camera to the back of the
    /// window. Returns how many were recycled.
    pub fn recycle<R: Rng + ?Sized>(
        &mut self,
        camera_z: f32,
        generator: &mut TrackGenerator,
        rng: &mut R,
    ) -> usize {
        let threshold = camera_z - self.segment_length * RECYCLE_LAG_SEGMENTS;
        let mut recycled = 0;

        while self.segments.front().is_some_and(|s| s.z < threshold) {
            let Some(mut segment) = self.segments.pop_front() else {
                break;
            };
            // The popped segment is the new back when it was the only one
            let (last_index, last_z) = match self.segments.back() {
                Some(back) => (back.index, back.z),
                None => (segment.index, segment.z),
            };

            segment.index = last_index + 1;
            segment.z = last_z + self.segment_length;
            segment.paint();
            generator.stamp(&mut segment, rng);

            self.segments.push_back(segment);
            recycled += 1;
        }

        if recycled > 1 {
            tracing::debug!(recycled, camera_z, "Recycled segment burst");
        }
        recycled
    }
}
