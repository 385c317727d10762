use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{Entity, EntityVariant, FrameSnapshot, Vec2};

use super::hud::{draw_hud, HudData};
use super::raster::{clear, draw_circle_outline, draw_filled_circle, draw_filled_triangle};
use super::{ArenaProjection, Viewport};

const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];
const ARENA_COLOR: [u8; 4] = [0x33, 0x33, 0x33, 255];
const JITTERED_ENTITY_COLOR: [u8; 4] = [0xFF, 0x77, 0x00, 255];
const OFFSET_ENTITY_COLOR: [u8; 4] = [0xFF, 0xB0, 0x40, 255];
const PLAYER_COLOR: [u8; 4] = [232, 236, 244, 255];

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    spawn_distance: f32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, spawn_distance: f32) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            spawn_distance,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn render_frame(
        &mut self,
        snapshot: &FrameSnapshot<'_>,
        hud: &HudData,
    ) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        draw_scene(
            self.pixels.frame_mut(),
            self.viewport,
            self.spawn_distance,
            snapshot,
            hud,
        );
        self.pixels.render()
    }
}

/// Paints arena, approaching entities, player arrow and HUD, back to front.
pub(crate) fn draw_scene(
    frame: &mut [u8],
    viewport: Viewport,
    spawn_distance: f32,
    snapshot: &FrameSnapshot<'_>,
    hud: &HudData,
) {
    clear(frame, CLEAR_COLOR);
    let projection = ArenaProjection::new(viewport, spawn_distance);
    let center = viewport.center();

    draw_filled_circle(
        frame,
        viewport,
        center,
        viewport.arena_radius_px() as i32,
        ARENA_COLOR,
    );

    let entity_radius = projection.entity_radius_px();
    for entity in snapshot.visible_entities() {
        let position = entity_screen_px(&projection, entity, snapshot.now_ms);
        draw_filled_circle(
            frame,
            viewport,
            position,
            entity_radius,
            entity_color(entity.variant()),
        );
    }

    draw_player(frame, viewport, &projection, snapshot);
    draw_hud(frame, viewport, snapshot, hud);
}

fn entity_screen_px(projection: &ArenaProjection, entity: &Entity, now_ms: u64) -> (i32, i32) {
    let lane_start = Vec2::new(0.0, projection.lane_origin()).rotate_toward(entity.direction());
    let travelled = entity.approach_position(now_ms, projection.spawn_distance());
    projection.to_screen_px(lane_start + travelled)
}

fn entity_color(variant: EntityVariant) -> [u8; 4] {
    match variant {
        EntityVariant::Jittered => JITTERED_ENTITY_COLOR,
        EntityVariant::Offset => OFFSET_ENTITY_COLOR,
    }
}

fn draw_player(
    frame: &mut [u8],
    viewport: Viewport,
    projection: &ArenaProjection,
    snapshot: &FrameSnapshot<'_>,
) {
    let radius = projection.player_radius_px();
    let (cx, cy) = viewport.center();
    let center = Vec2::new(cx as f32, cy as f32);
    let direction = snapshot.state.accepted_direction;

    // Arrow is built pointing up in arena space, then flipped to screen y.
    let r = radius as f32;
    let arrow = [
        Vec2::new(0.0, r * 0.8),
        Vec2::new(-r * 0.55, -r * 0.5),
        Vec2::new(r * 0.55, -r * 0.5),
    ]
    .map(|vertex| {
        let rotated = vertex.rotate_toward(direction);
        center + Vec2::new(rotated.x, -rotated.y)
    });

    draw_filled_triangle(frame, viewport, arrow, PLAYER_COLOR);
    draw_circle_outline(frame, viewport, (cx, cy), radius, PLAYER_COLOR);
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU64;

    use super::*;
    use crate::app::rendering::raster::pixel_at;
    use crate::app::{Direction, EntityId, GameState};

    const VIEWPORT: Viewport = Viewport {
        width: 600,
        height: 600,
    };

    fn entity(direction: Direction, expiry_ms: u64, variant: EntityVariant) -> Entity {
        Entity::new(
            EntityId(1),
            expiry_ms,
            NonZeroU64::new(1_000).expect("lifetime"),
            direction,
            variant,
        )
    }

    fn render(entities: &[Entity], now_ms: u64, aim: Direction) -> Vec<u8> {
        let mut frame = vec![0; (VIEWPORT.width * VIEWPORT.height * 4) as usize];
        let state = GameState {
            accepted_direction: aim,
            ..GameState::default()
        };
        let snapshot = FrameSnapshot {
            now_ms,
            entities,
            state,
        };
        draw_scene(&mut frame, VIEWPORT, 1.0, &snapshot, &HudData::default());
        frame
    }

    #[test]
    fn right_entity_approaches_from_the_right() {
        let entities = [entity(Direction::Right, 2_000, EntityVariant::Jittered)];
        let frame = render(&entities, 1_500, Direction::Up);

        let projection = ArenaProjection::new(VIEWPORT, 1.0);
        let (x, y) = entity_screen_px(&projection, &entities[0], 1_500);
        assert!(x > 450, "x = {x}");
        assert_eq!(y, 300);
        assert_eq!(
            pixel_at(&frame, VIEWPORT, x as u32, y as u32),
            JITTERED_ENTITY_COLOR
        );
    }

    #[test]
    fn entities_outside_lifetime_window_are_not_drawn() {
        let far = entity(Direction::Down, 5_000, EntityVariant::Offset);
        let frame = render(&[far], 1_000, Direction::Up);

        assert!(frame
            .chunks_exact(4)
            .all(|pixel| pixel != OFFSET_ENTITY_COLOR));
    }

    #[test]
    fn arena_disc_fills_center_region_outside_player() {
        let frame = render(&[], 0, Direction::Up);
        assert_eq!(pixel_at(&frame, VIEWPORT, 300, 510), ARENA_COLOR);
        assert_eq!(pixel_at(&frame, VIEWPORT, 599, 599), CLEAR_COLOR);
    }

    #[test]
    fn player_arrow_points_along_aim() {
        let up = render(&[], 0, Direction::Up);
        let down = render(&[], 0, Direction::Down);

        assert_eq!(pixel_at(&up, VIEWPORT, 300, 280), PLAYER_COLOR);
        assert_eq!(pixel_at(&down, VIEWPORT, 300, 280), ARENA_COLOR);
        assert_eq!(pixel_at(&down, VIEWPORT, 300, 320), PLAYER_COLOR);
    }
}
