use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen: ScreenSettings,
    pub camera: CameraSettings,
    pub track: TrackSettings,
    pub generator: GeneratorSettings,
    pub objects: ObjectSettings,
    pub player: PlayerSettings,
    pub collision: CollisionSettings,
    pub scoring: ScoringSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSettings {
    pub width: f32,
    pub height: f32,
    pub target_fps: u16,
    /// Longest frame the simulation will integrate in one step (seconds)
    pub max_frame_dt: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub field_of_view: f32,
    pub camera_height: f32,
    /// How far ahead of the camera the player's car sits (world units)
    pub player_distance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackSettings {
    pub segment_length: f32,
    pub road_width: f32,
    /// Number of segments walked by the renderer each frame
    pub draw_distance: usize,
    /// Extra resident segments beyond the draw distance
    pub segment_margin: usize,
    /// Fraction of the road half width painted as rumble strip
    pub rumble_ratio: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub curve_probability: f64,
    /// Largest curvature delta a curve run can carry (world X per segment)
    pub max_curve_strength: f32,
    pub min_curve_run: u32,
    pub max_curve_run: u32,
    pub min_straight_run: u32,
    pub max_straight_run: u32,
    pub elevation_probability: f64,
    pub max_elevation: f32,
    pub elevation_damping: f32,
    pub elevation_epsilon: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectSettings {
    /// One object every N segments at startup
    pub spawn_interval: usize,
    /// First segment index eligible for a startup object
    pub spawn_start: usize,
    /// Closest an object may sit to the road centre (road half widths)
    pub min_offset: f32,
    pub initial_offset_spread: f32,
    pub recycle_offset_spread: f32,
    pub min_scale: f32,
    pub scale_spread: f32,
    /// Recycled objects land up to this many segments past the last segment
    pub recycle_spread_segments: f32,
    /// Objects are placed while closer than draw distance times this fraction
    pub visible_fraction: f32,
    pub sprite_scale_multiplier: f32,
    /// Objects must sit below `horizon_y * horizon_band` to be shown
    pub horizon_band: f32,
    pub depth_constant: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SteeringModel {
    /// Lane eases toward a target set from the held keys
    #[default]
    DirectLerp,
    /// Key presses nudge an inertial pull that the lane integrates
    Pull,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub steering: SteeringModel,
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub braking: f32,
    pub off_road_drag: f32,
    pub lane_limit: f32,
    pub lerp_target: f32,
    /// Blend factor per 1/60 s tick
    pub lerp_factor: f32,
    pub pull_step: f32,
    pub max_pull: f32,
    pub sideways_factor: f32,
    pub pull_decay: f32,
    pub centrifugal_factor: f32,
    /// Screen pixels per lane unit
    pub lane_px: f32,
    /// Distance of the car sprite centre from the screen bottom
    pub bottom_px: f32,
    pub sprite_scale: f32,
    /// Car sprite rotation in degrees per lane unit
    pub tilt_per_lane: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionSettings {
    pub starting_lives: u32,
    pub invincibility_secs: f64,
    pub flash_interval_secs: f64,
    pub hit_speed_factor: f32,
    pub player_hitbox_width: f32,
    pub player_hitbox_height: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub points_per_unit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// Log file used while the terminal is in use for rendering
    pub file: String,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            target_fps: 60,
            max_frame_dt: 0.25,
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            field_of_view: 100.0,
            camera_height: 1000.0,
            player_distance: 1000.0,
        }
    }
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            segment_length: 100.0,
            road_width: 2000.0,
            draw_distance: 300,
            segment_margin: 50,
            rumble_ratio: 0.05,
        }
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            curve_probability: 0.7,
            max_curve_strength: 60.0,
            min_curve_run: 20,
            max_curve_run: 80,
            min_straight_run: 10,
            max_straight_run: 40,
            elevation_probability: 0.01,
            max_elevation: 20.0,
            elevation_damping: 0.8,
            elevation_epsilon: 1.0,
        }
    }
}

impl Default for ObjectSettings {
    fn default() -> Self {
        Self {
            spawn_interval: 15,
            spawn_start: 11,
            min_offset: 1.5,
            initial_offset_spread: 2.5,
            recycle_offset_spread: 3.5,
            min_scale: 0.3,
            scale_spread: 0.4,
            recycle_spread_segments: 10.0,
            visible_fraction: 0.8,
            sprite_scale_multiplier: 20.0,
            horizon_band: 0.8,
            depth_constant: 100_000.0,
        }
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            steering: SteeringModel::DirectLerp,
            max_speed: 600.0,
            acceleration: 200.0,
            deceleration: 300.0,
            braking: 800.0,
            off_road_drag: 150.0,
            lane_limit: 2.5,
            lerp_target: 1.5,
            lerp_factor: 0.1,
            pull_step: 0.5,
            max_pull: 1.5,
            sideways_factor: 2.0,
            pull_decay: 3.0,
            centrifugal_factor: 0.05,
            lane_px: 80.0,
            bottom_px: 80.0,
            sprite_scale: 0.25,
            tilt_per_lane: 5.0,
        }
    }
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            invincibility_secs: 2.0,
            flash_interval_secs: 0.1,
            hit_speed_factor: 0.5,
            player_hitbox_width: 0.7,
            player_hitbox_height: 0.6,
        }
    }
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            points_per_unit: 0.01,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: "apexsim-arcade.log".to_string(),
        }
    }
}

impl TrackSettings {
    /// Resident segment count of the store
    pub fn segment_count(&self) -> usize {
        self.draw_distance + self.segment_margin
    }

    pub fn road_half_width(&self) -> f32 {
        self.road_width * 0.5
    }
}

impl GameConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: GameConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Self::default()
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.screen.width <= 0.0 || self.screen.height <= 0.0 {
            return invalid("screen dimensions must be positive");
        }
        if self.screen.target_fps == 0 {
            return invalid("target_fps must be at least 1");
        }
        if !(self.screen.max_frame_dt.is_finite() && self.screen.max_frame_dt > 0.0) {
            return invalid("max_frame_dt must be positive");
        }
        if self.camera.field_of_view <= 0.0 {
            return invalid("field_of_view must be positive");
        }
        if self.track.segment_length <= 0.0 || self.track.road_width <= 0.0 {
            return invalid("segment_length and road_width must be positive");
        }
        if self.track.draw_distance == 0 {
            return invalid("draw_distance must be at least 1");
        }
        // Two segments trail the camera before recycling, plus the one it sits in.
        if self.track.segment_margin < 3 {
            return invalid("segment_margin must be at least 3");
        }
        if !(0.0..=1.0).contains(&self.track.rumble_ratio) {
            return invalid("rumble_ratio must be within [0, 1]");
        }

        let generator = &self.generator;
        if !(0.0..=1.0).contains(&generator.curve_probability)
            || !(0.0..=1.0).contains(&generator.elevation_probability)
        {
            return invalid("generator probabilities must be within [0, 1]");
        }
        if generator.elevation_damping <= 0.0 || generator.elevation_damping >= 1.0 {
            return invalid("elevation_damping must be within (0, 1)");
        }
        if generator.max_curve_strength.is_nan() || generator.max_curve_strength < 0.0 {
            return invalid("max_curve_strength must not be negative");
        }
        if generator.max_elevation.is_nan() || generator.max_elevation < 0.0 {
            return invalid("max_elevation must not be negative");
        }
        if generator.elevation_epsilon <= 0.0 {
            return invalid("elevation_epsilon must be positive");
        }
        if generator.min_curve_run == 0 || generator.min_curve_run > generator.max_curve_run {
            return invalid("curve run range must be non-empty and start at 1 or more");
        }
        if generator.min_straight_run == 0
            || generator.min_straight_run > generator.max_straight_run
        {
            return invalid("straight run range must be non-empty and start at 1 or more");
        }

        if self.objects.spawn_interval == 0 {
            return invalid("spawn_interval must be at least 1");
        }
        if self.objects.min_offset <= 1.0 {
            return invalid("min_offset must keep objects off the road (> 1)");
        }

        let player = &self.player;
        if player.max_speed <= 0.0 || player.lane_limit <= 0.0 {
            return invalid("max_speed and lane_limit must be positive");
        }
        if player.acceleration < 0.0 || player.deceleration < 0.0 || player.braking < 0.0 {
            return invalid("speed rates must not be negative");
        }
        if !(0.0..=1.0).contains(&player.lerp_factor) {
            return invalid("lerp_factor must be within [0, 1]");
        }
        if !(0.0..=player.lane_limit).contains(&player.lerp_target) {
            return invalid("lerp_target must be within [0, lane_limit]");
        }
        if player.max_pull.is_nan() || player.max_pull < 0.0 {
            return invalid("max_pull must not be negative");
        }

        if self.collision.starting_lives == 0 {
            return invalid("starting_lives must be at least 1");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.track.segment_count(), 350);
        assert_eq!(config.track.road_half_width(), 1000.0);
        assert_eq!(config.player.steering, SteeringModel::DirectLerp);
        assert_eq!(SteeringModel::default(), SteeringModel::DirectLerp);
    }

    #[test]
    fn test_config_serialization() {
        let config = GameConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("segment_length"));
        assert!(toml_str.contains("steering = \"direct_lerp\""));

        let parsed: GameConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.track.draw_distance, config.track.draw_distance);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: GameConfig = toml::from_str(
            r#"
            [player]
            steering = "pull"
            max_speed = 900.0
            "#,
        )
        .unwrap();

        assert_eq!(parsed.player.steering, SteeringModel::Pull);
        assert_eq!(parsed.player.max_speed, 900.0);
        assert_eq!(parsed.player.acceleration, 200.0);
        assert_eq!(parsed.track.segment_length, 100.0);
    }

    #[test]
    fn test_invalid_damping_rejected() {
        let mut config = GameConfig::default();
        config.generator.elevation_damping = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_positive_frame_cap_rejected() {
        let mut config = GameConfig::default();
        config.screen.max_frame_dt = -0.1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.screen.max_frame_dt = f32::NAN;
        assert!(config.validate().is_err());
        config.screen.max_frame_dt = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_max_pull_rejected() {
        let mut config = GameConfig::default();
        config.player.max_pull = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_negative_max_elevation_rejected() {
        let mut config = GameConfig::default();
        config.generator.max_elevation = -5.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_negative_curve_strength_rejected() {
        let mut config = GameConfig::default();
        config.generator.max_curve_strength = -10.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_lerp_target_beyond_lane_limit_rejected() {
        let mut config = GameConfig::default();
        config.player.lerp_target = 3.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.player.lerp_target = config.player.lane_limit;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_small_margin_rejected() {
        let mut config = GameConfig::default();
        config.track.segment_margin = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arcade.toml");

        let mut config = GameConfig::default();
        config.collision.starting_lives = 5;
        config.save(&path).unwrap();

        let loaded = GameConfig::load(&path).unwrap();
        assert_eq!(loaded.collision.starting_lives, 5);
    }

    #[test]
    fn test_load_or_default_on_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        let config = GameConfig::load_or_default(&path);
        assert_eq!(config.screen.width, 800.0);
    }

    #[test]
    fn test_load_or_default_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arcade.toml");
        fs::write(&path, "[player]\nmax_pull = -1.0\nmax_speed = 900.0\n").unwrap();

        assert!(GameConfig::load(&path).is_err());
        let config = GameConfig::load_or_default(&path);
        assert_eq!(config.player.max_pull, 1.5);
        assert_eq!(config.player.max_speed, 600.0);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig::load_or_default(dir.path().join("absent.toml"));
        assert!(config.validate().is_ok());
    }
}
