use crate::app::{FrameSnapshot, LoopMetricsSnapshot};

use super::raster::{draw_filled_rect, draw_rect_outline, write_pixel_rgba_clipped};
use super::Viewport;

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;
const TEXT_SCALE: i32 = 3;
const GLYPH_ADVANCE: i32 = (GLYPH_WIDTH + 1) * TEXT_SCALE;
const LINE_ADVANCE: i32 = (GLYPH_HEIGHT + 2) * TEXT_SCALE;
const HUD_PADDING: i32 = 6 * TEXT_SCALE;
const HUD_PANEL_INSET_X: i32 = 4 * TEXT_SCALE;
const HUD_PANEL_INSET_Y: i32 = 3 * TEXT_SCALE;
const HUD_TEXT_COLOR: [u8; 4] = [244, 248, 252, 255];
const HUD_TEXT_DIM_COLOR: [u8; 4] = [176, 198, 220, 255];
const HUD_PANEL_BG_COLOR: [u8; 4] = [10, 12, 16, 255];
const HUD_PANEL_BORDER_COLOR: [u8; 4] = [92, 106, 126, 255];

/// Render-thread values that are not part of a frame snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct HudData {
    pub metrics: LoopMetricsSnapshot,
}

pub fn hud_lines(frame: &FrameSnapshot<'_>, data: &HudData) -> Vec<String> {
    let state = frame.state;
    vec![
        format!("HITS {}  MISSES {}", state.hits, state.misses),
        format!(
            "TIME {:.1}  BEST {:.1}",
            frame.elapsed_secs(),
            state.high_score_secs()
        ),
        format!("AIM {}", state.accepted_direction.as_str().to_ascii_uppercase()),
        format!("FPS {:.0}  TPS {:.0}", data.metrics.fps, data.metrics.tps),
    ]
}

pub(crate) fn draw_hud(
    frame: &mut [u8],
    viewport: Viewport,
    snapshot: &FrameSnapshot<'_>,
    data: &HudData,
) {
    if viewport.width == 0 || viewport.height == 0 {
        return;
    }

    let lines = hud_lines(snapshot, data);
    let longest_line_chars = lines
        .iter()
        .map(|line| line.chars().count() as i32)
        .max()
        .unwrap_or(0);
    let panel_left = HUD_PADDING - HUD_PANEL_INSET_X;
    let panel_top = HUD_PADDING - HUD_PANEL_INSET_Y;
    let panel_width = longest_line_chars * GLYPH_ADVANCE + HUD_PANEL_INSET_X * 2;
    let panel_height = lines.len() as i32 * LINE_ADVANCE + HUD_PANEL_INSET_Y * 2;
    draw_filled_rect(
        frame,
        viewport,
        panel_left,
        panel_top,
        panel_width,
        panel_height,
        HUD_PANEL_BG_COLOR,
    );
    draw_rect_outline(
        frame,
        viewport,
        panel_left,
        panel_top,
        panel_width,
        panel_height,
        HUD_PANEL_BORDER_COLOR,
    );

    let last = lines.len().saturating_sub(1);
    let mut y = HUD_PADDING;
    for (index, line) in lines.iter().enumerate() {
        // Metrics line is secondary.
        let color = if index == last {
            HUD_TEXT_DIM_COLOR
        } else {
            HUD_TEXT_COLOR
        };
        draw_text_clipped(frame, viewport, HUD_PADDING, y, line, color);
        y += LINE_ADVANCE;
    }
}

fn draw_text_clipped(
    frame: &mut [u8],
    viewport: Viewport,
    mut x: i32,
    y: i32,
    text: &str,
    color: [u8; 4],
) {
    for ch in text.chars() {
        if let Some(rows) = glyph_rows(ch) {
            draw_glyph_clipped(frame, viewport, x, y, rows, color);
        }
        x += GLYPH_ADVANCE;
    }
}

fn draw_glyph_clipped(
    frame: &mut [u8],
    viewport: Viewport,
    x: i32,
    y: i32,
    rows: [u8; GLYPH_HEIGHT as usize],
    color: [u8; 4],
) {
    for (row_index, row_bits) in rows.iter().enumerate() {
        let glyph_y = y + row_index as i32 * TEXT_SCALE;
        for col in 0..GLYPH_WIDTH {
            if (row_bits & (1 << (GLYPH_WIDTH - 1 - col))) == 0 {
                continue;
            }
            let glyph_x = x + col * TEXT_SCALE;
            for sy in 0..TEXT_SCALE {
                for sx in 0..TEXT_SCALE {
                    write_pixel_rgba_clipped(frame, viewport, glyph_x + sx, glyph_y + sy, color);
                }
            }
        }
    }
}

/// 3x5 bitmap rows, most significant of the low three bits is the left
/// column. Lowercase letters share the uppercase shapes; anything else
/// renders as a blank cell.
fn glyph_rows(ch: char) -> Option<[u8; 5]> {
    let rows = match ch.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        _ => return None,
    };
    Some(rows)
}
