use crate::app::Vec2;

/// Player disc radius as a fraction of the arena radius.
pub const PLAYER_RADIUS: f32 = 0.1;
/// Entity disc diameter as a fraction of the lane scale.
pub const ENTITY_RADIUS: f32 = 0.06;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn center(self) -> (i32, i32) {
        ((self.width / 2) as i32, (self.height / 2) as i32)
    }

    pub fn arena_radius_px(self) -> f32 {
        self.width.min(self.height) as f32 * 0.5
    }
}

/// Maps arena space (y-up, origin at the player) onto the pixel grid.
///
/// Approach lanes start just outside the player disc and end at the arena
/// rim, with `spawn_distance` arena units spanning the whole lane.
#[derive(Debug, Clone, Copy)]
pub struct ArenaProjection {
    viewport: Viewport,
    spawn_distance: f32,
    pixels_per_unit: f32,
}

impl ArenaProjection {
    pub fn new(viewport: Viewport, spawn_distance: f32) -> Self {
        let spawn_distance = if spawn_distance.is_finite() && spawn_distance > 0.0 {
            spawn_distance
        } else {
            1.0
        };
        let lane_px = (1.0 - lane_inner_offset()) * viewport.arena_radius_px();
        Self {
            viewport,
            spawn_distance,
            pixels_per_unit: lane_px / spawn_distance,
        }
    }

    pub fn spawn_distance(&self) -> f32 {
        self.spawn_distance
    }

    pub fn to_screen(&self, point: Vec2) -> Vec2 {
        let (cx, cy) = self.viewport.center();
        Vec2::new(
            cx as f32 + point.x * self.pixels_per_unit,
            cy as f32 - point.y * self.pixels_per_unit,
        )
    }

    pub fn to_screen_px(&self, point: Vec2) -> (i32, i32) {
        let screen = self.to_screen(point);
        (screen.x.round() as i32, screen.y.round() as i32)
    }

    /// Distance from the arena centre at which every lane begins.
    pub fn lane_origin(&self) -> f32 {
        let inner = lane_inner_offset();
        inner / (1.0 - inner) * self.spawn_distance
    }

    pub fn player_radius_px(&self) -> i32 {
        (PLAYER_RADIUS * self.viewport.arena_radius_px()).round() as i32
    }

    pub fn entity_radius_px(&self) -> i32 {
        let diameter = ENTITY_RADIUS * self.pixels_per_unit * self.spawn_distance;
        ((diameter * 0.5).round() as i32).max(2)
    }
}

fn lane_inner_offset() -> f32 {
    PLAYER_RADIUS + ENTITY_RADIUS * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 200,
        height: 200,
    };

    #[test]
    fn origin_maps_to_viewport_center() {
        let projection = ArenaProjection::new(VIEWPORT, 1.0);
        assert_eq!(projection.to_screen_px(Vec2::ZERO), (100, 100));
    }

    #[test]
    fn arena_space_is_y_up() {
        let projection = ArenaProjection::new(VIEWPORT, 1.0);
        let (_, up_y) = projection.to_screen_px(Vec2::new(0.0, 0.5));
        let (right_x, _) = projection.to_screen_px(Vec2::new(0.5, 0.0));
        assert!(up_y < 100);
        assert!(right_x > 100);
    }

    #[test]
    fn full_lane_ends_at_arena_rim() {
        let projection = ArenaProjection::new(VIEWPORT, 2.0);
        let rim = projection.lane_origin() + projection.spawn_distance();
        let (x, _) = projection.to_screen_px(Vec2::new(rim, 0.0));
        assert_eq!(x, 200);
    }

    #[test]
    fn invalid_spawn_distance_falls_back_to_unit() {
        let projection = ArenaProjection::new(VIEWPORT, f32::NAN);
        assert_eq!(projection.spawn_distance(), 1.0);
    }

    #[test]
    fn radii_scale_with_smaller_viewport_side() {
        let wide = ArenaProjection::new(
            Viewport {
                width: 1_000,
                height: 200,
            },
            1.0,
        );
        assert_eq!(wide.player_radius_px(), 10);
        assert_eq!(wide.entity_radius_px(), 3);
    }
}
