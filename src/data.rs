use serde::{Deserialize, Serialize};

// --- Colours ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }
}

pub const ROAD_LIGHT: Rgb = Rgb::from_hex(0x444444);
pub const ROAD_DARK: Rgb = Rgb::from_hex(0x3D3D3D);
pub const RUMBLE_WHITE: Rgb = Rgb::from_hex(0xFFFFFF);
pub const RUMBLE_RED: Rgb = Rgb::from_hex(0xBB0000);
pub const GRASS_LIGHT: Rgb = Rgb::from_hex(0x10AA10);
pub const GRASS_DARK: Rgb = Rgb::from_hex(0x009A00);
pub const SKY: Rgb = Rgb::from_hex(0x72B4E8);

// Stripe bands, in segments
const ROAD_BAND: u64 = 10;
const RUMBLE_BAND: u64 = 5;
const GRASS_BAND: u64 = 3;

// --- Geometry ---
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// --- Track ---
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub index: u64,
    /// World Z of the near edge
    pub z: f32,
    /// Lateral offset added while traversing this segment (world X)
    pub curve_delta: f32,
    /// Vertical offset added while traversing this segment (world Y)
    pub elevation_delta: f32,
    pub surface_color: Rgb,
    pub rumble_color: Rgb,
    pub grass_color: Rgb,
}

impl Segment {
    pub fn new(index: u64, z: f32) -> Self {
        let mut segment = Self {
            index,
            z,
            curve_delta: 0.0,
            elevation_delta: 0.0,
            surface_color: ROAD_LIGHT,
            rumble_color: RUMBLE_WHITE,
            grass_color: GRASS_LIGHT,
        };
        segment.paint();
        segment
    }

    /// Recompute the stripe colours from the current index
    pub fn paint(&mut self) {
        self.surface_color = if (self.index / ROAD_BAND) % 2 == 0 {
            ROAD_LIGHT
        } else {
            ROAD_DARK
        };
        self.rumble_color = if (self.index / RUMBLE_BAND) % 2 == 0 {
            RUMBLE_WHITE
        } else {
            RUMBLE_RED
        };
        self.grass_color = if (self.index / GRASS_BAND) % 2 == 0 {
            GRASS_LIGHT
        } else {
            GRASS_DARK
        };
    }
}

// --- Sprites ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKey {
    Tree,
    Sign,
    Stone,
    PlayerCar,
}

impl SpriteKey {
    pub const ROADSIDE: [SpriteKey; 3] = [SpriteKey::Tree, SpriteKey::Sign, SpriteKey::Stone];

    /// Source texture size in pixels (width, height)
    pub fn base_size(self) -> (f32, f32) {
        match self {
            SpriteKey::Tree => (64.0, 96.0),
            SpriteKey::Sign => (48.0, 40.0),
            SpriteKey::Stone => (40.0, 24.0),
            SpriteKey::PlayerCar => (320.0, 180.0),
        }
    }

    /// Solid part of the texture as (x, y, width, height) fractions of the sprite rect
    pub fn hitbox(self) -> (f32, f32, f32, f32) {
        match self {
            // Trunk only, not the canopy
            SpriteKey::Tree => (0.4, 0.6, 0.2, 0.4),
            // Post plus lower half of the board
            SpriteKey::Sign => (0.3, 0.4, 0.4, 0.6),
            SpriteKey::Stone => (0.1, 0.2, 0.8, 0.8),
            SpriteKey::PlayerCar => (0.0, 0.0, 1.0, 1.0),
        }
    }

    pub fn placeholder_color(self) -> Rgb {
        match self {
            SpriteKey::Tree => Rgb::from_hex(0x1E5B1E),
            SpriteKey::Sign => Rgb::from_hex(0xC8A060),
            SpriteKey::Stone => Rgb::from_hex(0x8A8A8A),
            SpriteKey::PlayerCar => Rgb::from_hex(0xD01818),
        }
    }
}

/// Positionable visual instance. Position is the sprite centre in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub texture: SpriteKey,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub visible: bool,
    pub depth: f32,
    /// Degrees, positive clockwise. Hosts may ignore it; bounds stay axis-aligned.
    pub rotation: f32,
}

impl Sprite {
    pub fn new(texture: SpriteKey) -> Self {
        Self {
            texture,
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            visible: false,
            depth: 0.0,
            rotation: 0.0,
        }
    }

    /// On-screen rectangle as (left, top, width, height)
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let (w, h) = self.texture.base_size();
        let w = w * self.scale;
        let h = h * self.scale;
        (self.x - w * 0.5, self.y - h * 0.5, w, h)
    }
}

// --- Roadside Objects ---
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadsideObject {
    pub sprite_key: SpriteKey,
    /// Signed offset from the road centre in road half widths
    pub world_x: f32,
    pub world_z: f32,
    pub base_scale: f32,
    pub collision_eligible: bool,
    /// Struck this lap; hidden until recycled
    pub consumed: bool,
    pub sprite: Sprite,
}

impl RoadsideObject {
    pub fn new(sprite_key: SpriteKey, world_x: f32, world_z: f32, base_scale: f32) -> Self {
        Self {
            sprite_key,
            world_x,
            world_z,
            base_scale,
            collision_eligible: true,
            consumed: false,
            sprite: Sprite::new(sprite_key),
        }
    }
}

// --- Player ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Racing,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// 0 is the road centre, +-1 the road edges
    pub lane_position: f32,
    pub target_lane: f32,
    pub steering_pull: f32,
    pub speed: f32,
    pub camera_z: f32,
    /// Simulation clock deadline (seconds)
    pub invincible_until: Option<f64>,
    pub lives: u32,
    pub score: f64,
    pub phase: GamePhase,
}

impl PlayerState {
    pub fn new(lives: u32) -> Self {
        Self {
            lane_position: 0.0,
            target_lane: 0.0,
            steering_pull: 0.0,
            speed: 0.0,
            camera_z: 0.0,
            invincible_until: None,
            lives,
            score: 0.0,
            phase: GamePhase::Racing,
        }
    }

    pub fn is_invincible(&self, now: f64) -> bool {
        self.invincible_until.is_some_and(|until| now < until)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

// --- Input ---
/// Keyboard state sampled once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub left_pressed: bool,
    pub right_pressed: bool,
    pub restart: bool,
}

impl InputState {
    pub fn accelerate() -> Self {
        Self {
            up: true,
            ..Self::default()
        }
    }
}
