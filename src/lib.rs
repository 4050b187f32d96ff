pub mod collision;
pub mod config;
pub mod data;
pub mod game;
pub mod objects;
pub mod player;
pub mod projection;
pub mod raster;
pub mod renderer;
pub mod segment_store;
pub mod terminal;
pub mod track_generator;

pub use config::GameConfig;
pub use game::{FrameReport, Game};
pub use renderer::DrawSurface;
