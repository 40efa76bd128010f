//! Swatch rendering — turn a [`Symbol`] into a small RGBA image.
//!
//! The row model only knows the [`SwatchRenderer`] trait; it calls it from a
//! worker thread and treats any error as "no image".  [`ImageSwatchRenderer`]
//! is the stock implementation: simple symbols are rasterised directly into
//! a square canvas, picture markers are decoded from disk and scaled to fit.

use std::path::PathBuf;

use image::{imageops::FilterType, Rgba as Pixel, RgbaImage};
use thiserror::Error;

use super::symbol::{LineStyle, MarkerStyle, Outline, Rgba, Symbol};

/// A rendered swatch.
pub type Swatch = RgbaImage;

/// Default edge length of a swatch, in pixels.
pub const DEFAULT_SWATCH_SIZE: u32 = 24;

#[derive(Debug, Error)]
pub enum SwatchError {
    #[error("symbol has no drawable area")]
    EmptySymbol,
    #[error("failed to load picture marker {}", path.display())]
    Picture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Something that can draw a symbol.  Implementations are called off the UI
/// thread, so they must be `Send + Sync`.
pub trait SwatchRenderer: Send + Sync {
    fn render(&self, symbol: &Symbol) -> Result<Swatch, SwatchError>;
}

// ───────────────────────────────────────── renderer ──────────

/// Rasterises symbols with the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct ImageSwatchRenderer {
    size: u32,
}

impl Default for ImageSwatchRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_SWATCH_SIZE)
    }
}

impl ImageSwatchRenderer {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }
}

impl SwatchRenderer for ImageSwatchRenderer {
    fn render(&self, symbol: &Symbol) -> Result<Swatch, SwatchError> {
        let mut canvas = RgbaImage::new(self.size, self.size);
        match symbol {
            Symbol::SimpleMarker {
                style,
                color,
                size,
                outline,
            } => {
                if *size == 0 {
                    return Err(SwatchError::EmptySymbol);
                }
                draw_marker(&mut canvas, *style, *color, *size, *outline);
            }
            Symbol::SimpleLine {
                style,
                color,
                width,
            } => {
                if *width == 0 {
                    return Err(SwatchError::EmptySymbol);
                }
                draw_line(&mut canvas, *style, *color, *width);
            }
            Symbol::SimpleFill { color, outline } => {
                draw_fill(&mut canvas, *color, *outline);
            }
            Symbol::PictureMarker { path } => {
                let picture = image::open(path)
                    .map_err(|source| SwatchError::Picture {
                        path: path.clone(),
                        source,
                    })?
                    .to_rgba8();
                if picture.width() == 0 || picture.height() == 0 {
                    return Err(SwatchError::EmptySymbol);
                }
                return Ok(fit_picture(&picture, self.size));
            }
        }
        Ok(canvas)
    }
}

// ───────────────────────────────────────── drawing ───────────

/// Draw a centred marker.  Shapes are tested per pixel against the marker's
/// radius; the outline is the band within `outline.width` of the edge.
fn draw_marker(
    canvas: &mut RgbaImage,
    style: MarkerStyle,
    color: Rgba,
    size: u32,
    outline: Option<Outline>,
) {
    let edge = canvas.width();
    let r = (size.min(edge) as f32) / 2.0;
    let c = (edge as f32) / 2.0;
    let band = outline.map_or(0.0, |o| o.width as f32);
    let stroke = (r / 4.0).max(1.0);

    for (x, y, px) in canvas.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - c;
        let dy = y as f32 + 0.5 - c;
        // `depth` is how far inside the shape the pixel sits (negative = outside).
        let depth = match style {
            MarkerStyle::Circle => r - (dx * dx + dy * dy).sqrt(),
            MarkerStyle::Square => r - dx.abs().max(dy.abs()),
            MarkerStyle::Diamond => r - (dx.abs() + dy.abs()),
            MarkerStyle::Triangle => {
                // Apex at the top, base at the bottom of the marker box.
                let t = (dy + r) / (2.0 * r);
                let half_width = t * r;
                (half_width - dx.abs()).min(r - dy.abs())
            }
            MarkerStyle::Cross => {
                if dx.abs().max(dy.abs()) > r {
                    -1.0
                } else {
                    stroke - dx.abs().min(dy.abs())
                }
            }
            MarkerStyle::X => {
                if dx.abs().max(dy.abs()) > r {
                    -1.0
                } else {
                    stroke - (dx.abs() - dy.abs()).abs() / std::f32::consts::SQRT_2
                }
            }
        };
        if depth < 0.0 {
            continue;
        }
        *px = match outline {
            Some(o) if depth < band => Pixel(o.color),
            _ => Pixel(color),
        };
    }
}

/// Draw a horizontal stroke through the middle of the canvas.
fn draw_line(canvas: &mut RgbaImage, style: LineStyle, color: Rgba, width: u32) {
    let edge = canvas.width();
    let width = width.min(edge);
    let top = (edge - width) / 2;
    let (on, period) = match style {
        LineStyle::Solid => (edge, edge),
        LineStyle::Dash => (4, 6),
        LineStyle::Dot => (1, 3),
    };

    for y in top..top + width {
        for x in 0..edge {
            if x % period < on {
                canvas.put_pixel(x, y, Pixel(color));
            }
        }
    }
}

/// Fill the canvas with a two-pixel margin, then stroke the outline inside it.
fn draw_fill(canvas: &mut RgbaImage, color: Rgba, outline: Option<Outline>) {
    let edge = canvas.width();
    let margin = if edge > 8 { 2 } else { 0 };
    let (lo, hi) = (margin, edge - margin);
    let band = outline.map_or(0, |o| o.width);

    for y in lo..hi {
        for x in lo..hi {
            let inset = (x - lo).min(y - lo).min(hi - 1 - x).min(hi - 1 - y);
            let px = match outline {
                Some(o) if inset < band => o.color,
                _ => color,
            };
            canvas.put_pixel(x, y, Pixel(px));
        }
    }
}

/// Scale a picture to fit a `size`×`size` canvas, preserving aspect ratio,
/// and centre it.
fn fit_picture(picture: &RgbaImage, size: u32) -> Swatch {
    let (w, h) = (picture.width() as f64, picture.height() as f64);
    let scale = (size as f64 / w).min(size as f64 / h);
    let fit_w = (w * scale).round().clamp(1.0, size as f64) as u32;
    let fit_h = (h * scale).round().clamp(1.0, size as f64) as u32;
    let scaled = image::imageops::resize(picture, fit_w, fit_h, FilterType::Triangle);

    let mut canvas = RgbaImage::new(size, size);
    let x = i64::from((size - fit_w) / 2);
    let y = i64::from((size - fit_h) / 2);
    image::imageops::overlay(&mut canvas, &scaled, x, y);
    canvas
}
