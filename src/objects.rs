//! Roadside object pool.
//!
//! A fixed set of decorations is created with the track and relocated far
//! ahead whenever an object drops behind the camera, so no object is ever
//! allocated during play.

use crate::config::ObjectSettings;
use crate::data::{RoadsideObject, SpriteKey};
use crate::segment_store::{SegmentStore, RECYCLE_LAG_SEGMENTS};
use rand::Rng;

#[derive(Debug, Clone)]
pub struct ObjectPool {
    objects: Vec<RoadsideObject>,
    settings: ObjectSettings,
}

fn random_key<R: Rng + ?Sized>(rng: &mut R) -> SpriteKey {
    SpriteKey::ROADSIDE[rng.random_range(0..SpriteKey::ROADSIDE.len())]
}

fn random_side<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if rng.random_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}

impl ObjectPool {
    /// Scatter one object every `spawn_interval` segments along the initial store
    pub fn new<R: Rng + ?Sized>(
        settings: ObjectSettings,
        store: &SegmentStore,
        rng: &mut R,
    ) -> Self {
        let segment_length = store.segment_length();
        let objects = store
            .iter()
            .enumerate()
            .filter(|(i, _)| *i >= settings.spawn_start && i % settings.spawn_interval == 0)
            .map(|(_, segment)| {
                let world_x = random_side(rng)
                    * (settings.min_offset + rng.random::<f32>() * settings.initial_offset_spread);
                let world_z = segment.z + rng.random::<f32>() * segment_length;
                let scale = settings.min_scale + rng.random::<f32>() * settings.scale_spread;
                RoadsideObject::new(random_key(rng), world_x, world_z, scale)
            })
            .collect::<Vec<_>>();

        tracing::debug!(count = objects.len(), "Roadside object pool created");
        Self { objects, settings }
    }

    pub fn from_objects(settings: ObjectSettings, objects: Vec<RoadsideObject>) -> Self {
        Self { objects, settings }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[RoadsideObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [RoadsideObject] {
        &mut self.objects
    }

    /// Paint order: farthest first
    pub fn sort_far_to_near(&mut self) {
        self.objects.sort_by(|a, b| b.world_z.total_cmp(&a.world_z));
    }

    /// Relocate every object that fell behind the camera. Returns how many moved.
    pub fn recycle<R: Rng + ?Sized>(
        &mut self,
        camera_z: f32,
        store: &SegmentStore,
        rng: &mut R,
    ) -> usize {
        let Some(last) = store.back() else {
            return 0;
        };
        let segment_length = store.segment_length();
        let threshold = camera_z - segment_length * RECYCLE_LAG_SEGMENTS;
        let s = &self.settings;
        let mut recycled = 0;

        for object in self.objects.iter_mut().filter(|o| o.world_z < threshold) {
            object.world_z =
                last.z + rng.random::<f32>() * segment_length * s.recycle_spread_segments;
            object.world_x =
                random_side(rng) * (s.min_offset + rng.random::<f32>() * s.recycle_offset_spread);
            object.sprite_key = random_key(rng);
            object.sprite.texture = object.sprite_key;
            object.sprite.visible = false;
            object.base_scale = s.min_scale + rng.random::<f32>() * s.scale_spread;
            object.collision_eligible = true;
            object.consumed = false;
            recycled += 1;
        }
        recycled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pool_with_store(seed: u64) -> (ObjectPool, SegmentStore, Pcg32) {
        let store = SegmentStore::new(350, 100.0);
        let mut rng = Pcg32::seed_from_u64(seed);
        let pool = ObjectPool::new(ObjectSettings::default(), &store, &mut rng);
        (pool, store, rng)
    }

    #[test]
    fn test_initial_spawn_pattern() {
        let (pool, _, _) = pool_with_store(1);
        // Multiples of 15 from 15 up to 345
        assert_eq!(pool.len(), 23);
        for object in pool.objects() {
            assert!(object.world_x.abs() >= 1.5 && object.world_x.abs() <= 4.0);
            assert!(object.base_scale >= 0.3 && object.base_scale <= 0.7);
            assert!(object.collision_eligible);
            assert!(!object.sprite.visible);
        }
    }

    #[test]
    fn test_recycle_relocates_past_track_end() {
        let (mut pool, store, mut rng) = pool_with_store(2);
        let mut consumed = RoadsideObject::new(SpriteKey::Tree, 2.0, 0.0, 0.5);
        consumed.collision_eligible = false;
        consumed.consumed = true;
        pool.objects.push(consumed);

        let camera_z = 3000.0;
        let moved = pool.recycle(camera_z, &store, &mut rng);
        assert!(moved >= 1);

        let last_z = store.back().unwrap().z;
        for object in pool.objects() {
            assert!(object.world_z >= camera_z - 200.0);
            assert!(object.collision_eligible);
            assert!(!object.consumed);
        }
        let relocated = pool.objects().last().unwrap();
        assert!(relocated.world_z >= last_z && relocated.world_z <= last_z + 1000.0);
        assert!(relocated.world_x.abs() >= 1.5 && relocated.world_x.abs() <= 5.0);
        assert_eq!(relocated.sprite.texture, relocated.sprite_key);
    }

    #[test]
    fn test_sort_far_to_near() {
        let (mut pool, _, _) = pool_with_store(3);
        pool.sort_far_to_near();
        let zs: Vec<f32> = pool.objects().iter().map(|o| o.world_z).collect();
        assert!(zs.windows(2).all(|w| w[0] >= w[1]));
    }
}
