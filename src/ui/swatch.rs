//! Swatch preview — draws a rendered swatch with Unicode half-blocks.

use image::imageops::FilterType;
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Color,
};

use crate::core::swatch::Swatch;

/// Render a swatch into `area` using `▀` half-blocks (2 pixels per cell).
///
/// The swatch is scaled to exactly fill the area: one pixel per column and
/// two per row.  Transparent pixels leave the cell's colour untouched.
pub fn render_swatch_halfblocks(swatch: &Swatch, area: Rect, buf: &mut Buffer) {
    if area.width == 0 || area.height == 0 || swatch.width() == 0 || swatch.height() == 0 {
        return;
    }

    let px_w = u32::from(area.width);
    let px_h = u32::from(area.height) * 2;
    let scaled = image::imageops::resize(swatch, px_w, px_h, FilterType::Triangle);

    for row in 0..area.height {
        let yt = u32::from(row) * 2;
        for col in 0..area.width {
            let top = scaled.get_pixel(u32::from(col), yt);
            let bottom = scaled.get_pixel(u32::from(col), yt + 1);
            let Some(cell) = buf.cell_mut(Position::new(area.x + col, area.y + row)) else {
                continue;
            };
            match (opaque(top.0), opaque(bottom.0)) {
                (Some(fg), Some(bg)) => {
                    cell.set_char('▀').set_fg(fg).set_bg(bg);
                }
                (Some(fg), None) => {
                    cell.set_char('▀').set_fg(fg);
                }
                (None, Some(fg)) => {
                    cell.set_char('▄').set_fg(fg);
                }
                (None, None) => {}
            }
        }
    }
}

/// Terminal colour for a pixel, or `None` when it is mostly transparent.
fn opaque([r, g, b, a]: [u8; 4]) -> Option<Color> {
    (a >= 128).then_some(Color::Rgb(r, g, b))
}
