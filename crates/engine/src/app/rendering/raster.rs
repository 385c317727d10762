use crate::app::Vec2;

use super::Viewport;

pub(crate) fn clear(frame: &mut [u8], color: [u8; 4]) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

pub(crate) fn write_pixel_rgba_clipped(
    frame: &mut [u8],
    viewport: Viewport,
    x: i32,
    y: i32,
    color: [u8; 4],
) {
    if x < 0 || y < 0 || x >= viewport.width as i32 || y >= viewport.height as i32 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    let Some(pixel_offset) = y
        .checked_mul(viewport.width as usize)
        .and_then(|row| row.checked_add(x))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

pub(crate) fn draw_filled_rect(
    frame: &mut [u8],
    viewport: Viewport,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: [u8; 4],
) {
    let start_x = x.max(0);
    let start_y = y.max(0);
    let end_x = x.saturating_add(rect_width).min(viewport.width as i32);
    let end_y = y.saturating_add(rect_height).min(viewport.height as i32);
    for py in start_y..end_y {
        for px in start_x..end_x {
            write_pixel_rgba_clipped(frame, viewport, px, py, color);
        }
    }
}

pub(crate) fn draw_rect_outline(
    frame: &mut [u8],
    viewport: Viewport,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: [u8; 4],
) {
    if rect_width <= 1 || rect_height <= 1 {
        return;
    }
    draw_filled_rect(frame, viewport, x, y, rect_width, 1, color);
    draw_filled_rect(
        frame,
        viewport,
        x,
        y + rect_height - 1,
        rect_width,
        1,
        color,
    );
    draw_filled_rect(frame, viewport, x, y, 1, rect_height, color);
    draw_filled_rect(
        frame,
        viewport,
        x + rect_width - 1,
        y,
        1,
        rect_height,
        color,
    );
}

pub(crate) fn draw_filled_circle(
    frame: &mut [u8],
    viewport: Viewport,
    center: (i32, i32),
    radius: i32,
    color: [u8; 4],
) {
    if radius <= 0 {
        return;
    }
    let (cx, cy) = center;
    let radius_sq = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius_sq {
                write_pixel_rgba_clipped(frame, viewport, cx + dx, cy + dy, color);
            }
        }
    }
}

/// One-pixel ring between `radius - 1` and `radius`.
pub(crate) fn draw_circle_outline(
    frame: &mut [u8],
    viewport: Viewport,
    center: (i32, i32),
    radius: i32,
    color: [u8; 4],
) {
    if radius <= 0 {
        return;
    }
    let (cx, cy) = center;
    let outer_sq = radius * radius;
    let inner_sq = (radius - 1) * (radius - 1);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let dist_sq = dx * dx + dy * dy;
            if dist_sq <= outer_sq && dist_sq > inner_sq {
                write_pixel_rgba_clipped(frame, viewport, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Fills the triangle with vertices in screen pixels, either winding.
pub(crate) fn draw_filled_triangle(
    frame: &mut [u8],
    viewport: Viewport,
    vertices: [Vec2; 3],
    color: [u8; 4],
) {
    let [a, b, c] = vertices;
    let area = edge(a, b, c);
    if area.abs() <= f32::EPSILON {
        return;
    }

    let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as i32;
    let max_x = a.x.max(b.x).max(c.x).ceil().min(viewport.width as f32 - 1.0) as i32;
    let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as i32;
    let max_y = a.y.max(b.y).max(c.y).ceil().min(viewport.height as f32 - 1.0) as i32;

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
            let w0 = edge(b, c, p) * area.signum();
            let w1 = edge(c, a, p) * area.signum();
            let w2 = edge(a, b, p) * area.signum();
            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                write_pixel_rgba_clipped(frame, viewport, px, py, color);
            }
        }
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

#[cfg(test)]
pub(crate) fn pixel_at(frame: &[u8], viewport: Viewport, x: u32, y: u32) -> [u8; 4] {
    let offset = ((y * viewport.width + x) * 4) as usize;
    [
        frame[offset],
        frame[offset + 1],
        frame[offset + 2],
        frame[offset + 3],
    ]
}
