use crate::collision;
use crate::config::GameConfig;
use crate::data::*;
use crate::objects::ObjectPool;
use crate::player::{self, ROAD_EDGE};
use crate::renderer::{DrawSurface, RenderStats, Renderer, PLAYER_DEPTH};
use crate::segment_store::SegmentStore;
use crate::track_generator::TrackGenerator;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use tracing::{debug, info};

/// What happened during one `Game::update`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub dt: f32,
    pub render: RenderStats,
    pub segments_recycled: usize,
    pub objects_recycled: usize,
    pub hit: bool,
    pub phase: GamePhase,
}

/// One independent endless-road simulation
pub struct Game {
    config: GameConfig,
    seed: u64,
    rng: Pcg32,
    renderer: Renderer,
    generator: TrackGenerator,
    store: SegmentStore,
    pool: ObjectPool,
    player: PlayerState,
    player_sprite: Sprite,
    /// Simulation clock in seconds
    clock: f64,
    frame: u64,
}

impl Game {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let store = SegmentStore::new(config.track.segment_count(), config.track.segment_length);
        let pool = ObjectPool::new(config.objects.clone(), &store, &mut rng);

        info!(
            seed,
            segments = store.len(),
            objects = pool.len(),
            "Track initialised"
        );

        let mut game = Self {
            renderer: Renderer::from_config(&config),
            generator: TrackGenerator::new(config.generator.clone()),
            player: PlayerState::new(config.collision.starting_lives),
            player_sprite: Sprite::new(SpriteKey::PlayerCar),
            config,
            seed,
            rng,
            store,
            pool,
            clock: 0.0,
            frame: 0,
        };
        game.update_player_sprite();
        game
    }

    /// Discard all state and rebuild the initial track
    pub fn restart(&mut self) {
        info!(score = self.player.score, "Restarting");
        let config = self.config.clone();
        *self = Self::new(config, self.seed);
    }

    /// Advance the simulation by `elapsed_ms` and draw the frame onto `surface`
    pub fn update<S: DrawSurface + ?Sized>(
        &mut self,
        elapsed_ms: f64,
        input: &InputState,
        surface: &mut S,
    ) -> FrameReport {
        if self.player.is_game_over() && input.restart {
            self.restart();
        }

        let dt = (elapsed_ms / 1000.0).clamp(0.0, self.config.screen.max_frame_dt as f64) as f32;
        self.clock += dt as f64;
        self.frame += 1;

        let mut distance = 0.0;
        if self.player.phase == GamePhase::Racing {
            let player_z = self.player.camera_z + self.config.camera.player_distance;
            let curve = self.store.curve_at(player_z);
            distance =
                player::update_player(&mut self.player, &self.config.player, input, curve, dt);
        }

        let camera = self.renderer.camera(self.player.lane_position, self.player.camera_z);
        let render = self.renderer.render(&self.store, &mut self.pool, camera, surface);
        self.update_player_sprite();

        let hit = self.player.phase == GamePhase::Racing && self.check_collisions();

        let segments_recycled =
            self.store
                .recycle(self.player.camera_z, &mut self.generator, &mut self.rng);
        let objects_recycled = self.pool.recycle(self.player.camera_z, &self.store, &mut self.rng);

        self.update_score(distance);

        FrameReport {
            dt,
            render,
            segments_recycled,
            objects_recycled,
            hit,
            phase: self.player.phase,
        }
    }

    fn update_player_sprite(&mut self) {
        let screen = &self.config.screen;
        let settings = &self.config.player;
        let sprite = &mut self.player_sprite;

        sprite.x = screen.width / 2.0 + self.player.lane_position * settings.lane_px;
        sprite.y = screen.height - settings.bottom_px;
        sprite.scale = settings.sprite_scale;
        sprite.depth = PLAYER_DEPTH;
        sprite.rotation = self.player.lane_position * settings.tilt_per_lane;
        sprite.visible = match self.player.invincible_until {
            Some(until) if self.clock < until => {
                let interval = self.config.collision.flash_interval_secs.max(1e-3);
                ((until - self.clock) / interval).floor() as i64 % 2 == 0
            }
            _ => true,
        };
    }

    /// At most one hit per tick
    fn check_collisions(&mut self) -> bool {
        if self.player.is_invincible(self.clock) {
            return false;
        }

        let settings = &self.config.collision;
        let bounds = collision::player_bounds(&self.player_sprite, settings);
        let Some(index) = collision::find_hit(&bounds, self.pool.objects()) else {
            return false;
        };

        let object = &mut self.pool.objects_mut()[index];
        object.collision_eligible = false;
        object.consumed = true;
        object.sprite.visible = false;
        let struck = object.sprite_key;

        self.player.lives = self.player.lives.saturating_sub(1);
        self.player.invincible_until = Some(self.clock + settings.invincibility_secs);
        self.player.speed *= settings.hit_speed_factor;
        debug!(?struck, lives = self.player.lives, "Player hit roadside object");

        if self.player.lives == 0 {
            self.player.phase = GamePhase::GameOver;
            self.player.speed = 0.0;
            info!(score = self.player.score, frame = self.frame, "Game over");
        }
        self.update_player_sprite();
        true
    }

    fn update_score(&mut self, distance: f32) {
        if self.player.lane_position.abs() <= ROAD_EDGE {
            self.player.score += distance as f64 * self.config.scoring.points_per_unit;
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn player_sprite(&self) -> &Sprite {
        &self.player_sprite
    }

    pub fn segments(&self) -> &SegmentStore {
        &self.store
    }

    pub fn objects(&self) -> &ObjectPool {
        &self.pool
    }

    pub fn objects_mut(&mut self) -> &mut ObjectPool {
        &mut self.pool
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn score(&self) -> f64 {
        self.player.score
    }

    pub fn lives(&self) -> u32 {
        self.player.lives
    }

    pub fn is_game_over(&self) -> bool {
        self.player.is_game_over()
    }

    /// Visible sprites in draw order, the player's car last
    pub fn sprites(&self) -> Vec<&Sprite> {
        let mut sprites: Vec<&Sprite> = self
            .pool
            .objects()
            .iter()
            .map(|o| &o.sprite)
            .chain(std::iter::once(&self.player_sprite))
            .filter(|s| s.visible)
            .collect();
        sprites.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        sprites
    }
}
