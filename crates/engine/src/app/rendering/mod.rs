mod hud;
mod raster;
mod renderer;
mod transform;

pub use hud::{hud_lines, HudData};
pub use renderer::Renderer;
pub use transform::{ArenaProjection, Viewport, ENTITY_RADIUS, PLAYER_RADIUS};
