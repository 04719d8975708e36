// ABOUTME: Raster surface for the impact-slides canvas exporter
// ABOUTME: tiny-skia drawing with cosmic-text glyph outlines for text

use crate::errors::{Result, SlideError};
use crate::layout::TextMeasure;
use cosmic_text::{
    Attrs, Buffer, CacheKeyFlags, Command, Family, FontSystem, Metrics, Shaping, Style, SwashCache,
    Weight,
};
use log::debug;
use std::path::PathBuf;
use tiny_skia::{
    Color, FillRule, GradientStop, LinearGradient, Paint, PathBuilder, Pixmap, PixmapPaint, Point,
    Rect, SpreadMode, Transform,
};

/// Family tried first for every text run.
pub const PREFERRED_FAMILY: &str = "Inter";

/// Where the canvas gets its fonts from.
#[derive(Debug, Clone, Default)]
pub struct FontOptions {
    /// Extra directory scanned after the system fonts.
    pub font_dir: Option<PathBuf>,
}

/// Font and colour of one run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: u16,
    pub italic: bool,
    pub color: Color,
}

impl TextStyle {
    pub fn new(size: f32, weight: u16, color: Color) -> Self {
        Self {
            size,
            weight,
            italic: false,
            color,
        }
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

/// Parse `#rrggbb` into an opaque colour.
pub fn hex_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(0)
    };
    Color::from_rgba8(channel(0), channel(2), channel(4), 255)
}

/// Decode PNG/JPEG bytes into a premultiplied pixmap.
pub fn decode_pixmap(bytes: &[u8]) -> Result<Pixmap> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| SlideError::ImageDecodeError(format!("empty image {}x{}", width, height)))?;

    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = tiny_skia::ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// An off-screen canvas of fixed pixel size.
pub struct SlideCanvas {
    pixmap: Pixmap,
    font_system: FontSystem,
    swash_cache: SwashCache,
    family: Option<String>,
}

impl SlideCanvas {
    pub fn new(width: u32, height: u32, fonts: &FontOptions) -> Result<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            SlideError::RenderError(format!("Invalid canvas size {}x{}", width, height))
        })?;

        let mut font_system = FontSystem::new();
        if let Some(dir) = &fonts.font_dir {
            debug!("Loading fonts from {:?}", dir);
            font_system.db_mut().load_fonts_dir(dir);
        }

        let has_preferred = font_system
            .db()
            .faces()
            .any(|face| face.families.iter().any(|(name, _)| name == PREFERRED_FAMILY));
        let family = has_preferred.then(|| PREFERRED_FAMILY.to_string());

        Ok(Self {
            pixmap,
            font_system,
            swash_cache: SwashCache::new(),
            family,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Fill the whole canvas with a linear gradient from `start` to `end`.
    pub fn fill_linear_gradient(&mut self, start: (f32, f32), end: (f32, f32), stops: &[(f32, Color)]) {
        let stops: Vec<GradientStop> = stops
            .iter()
            .map(|(offset, color)| GradientStop::new(*offset, *color))
            .collect();
        let Some(shader) = LinearGradient::new(
            Point::from_xy(start.0, start.1),
            Point::from_xy(end.0, end.1),
            stops,
            SpreadMode::Pad,
            Transform::identity(),
        ) else {
            return;
        };
        let Some(rect) = Rect::from_xywh(0.0, 0.0, self.width() as f32, self.height() as f32)
        else {
            return;
        };

        let mut paint = Paint::default();
        paint.shader = shader;
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    pub fn fill_round_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Color) {
        let r = radius.max(0.0).min(w / 2.0).min(h / 2.0);
        let mut pb = PathBuilder::new();
        pb.move_to(x + r, y);
        pb.line_to(x + w - r, y);
        pb.quad_to(x + w, y, x + w, y + r);
        pb.line_to(x + w, y + h - r);
        pb.quad_to(x + w, y + h, x + w - r, y + h);
        pb.line_to(x + r, y + h);
        pb.quad_to(x, y + h, x, y + h - r);
        pb.line_to(x, y + r);
        pb.quad_to(x, y, x + r, y);
        pb.close();
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    /// Draw `image` scaled into the given box.
    pub fn draw_pixmap_scaled(&mut self, image: &Pixmap, x: f32, y: f32, w: f32, h: f32) {
        if image.width() == 0 || image.height() == 0 {
            return;
        }
        let transform = Transform::from_translate(x, y)
            .pre_scale(w / image.width() as f32, h / image.height() as f32);
        let paint = PixmapPaint {
            quality: tiny_skia::FilterQuality::Bicubic,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);
    }

    /// Scale `image` to cover the canvas, centered, cropping the overflow.
    pub fn draw_pixmap_cover(&mut self, image: &Pixmap) {
        let (w, h) = (self.width() as f32, self.height() as f32);
        let (iw, ih) = (image.width() as f32, image.height() as f32);
        if iw == 0.0 || ih == 0.0 {
            return;
        }
        let scale = (w / iw).max(h / ih);
        let x = w / 2.0 - iw / 2.0 * scale;
        let y = h / 2.0 - ih / 2.0 * scale;
        self.draw_pixmap_scaled(image, x, y, iw * scale, ih * scale);
    }

    fn shape(&mut self, text: &str, style: &TextStyle) -> Buffer {
        let metrics = Metrics::new(style.size, style.size * 1.2);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);

        let family = self
            .family
            .as_deref()
            .map(Family::Name)
            .unwrap_or(Family::SansSerif);
        let attrs = Attrs::new()
            .family(family)
            .weight(Weight(style.weight))
            .style(if style.italic {
                Style::Italic
            } else {
                Style::Normal
            })
            .cache_key_flags(CacheKeyFlags::DISABLE_HINTING);

        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }

    pub fn measure_text(&mut self, text: &str, style: &TextStyle) -> f32 {
        let buffer = self.shape(text, style);
        buffer
            .layout_runs()
            .fold(0.0f32, |width, run| width.max(run.line_w))
    }

    /// Fill one line of text centered on `cx`, with its baseline at `baseline`.
    pub fn fill_text_centered(&mut self, text: &str, cx: f32, baseline: f32, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        let buffer = self.shape(text, style);
        let width = buffer
            .layout_runs()
            .fold(0.0f32, |width, run| width.max(run.line_w));
        let base_x = cx - width / 2.0;

        let mut paint = Paint::default();
        paint.set_color(style.color);
        paint.anti_alias = true;

        for run in buffer.layout_runs() {
            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((base_x, baseline), 1.0);
                let glyph_x = base_x + glyph.x + glyph.font_size * glyph.x_offset;
                let glyph_y = baseline + glyph.y - glyph.font_size * glyph.y_offset;

                let Some(commands) = self
                    .swash_cache
                    .get_outline_commands(&mut self.font_system, physical.cache_key)
                else {
                    continue;
                };

                // Font outlines are y-up; the canvas is y-down
                let mut pb = PathBuilder::new();
                for cmd in commands {
                    match cmd {
                        Command::MoveTo(p) => pb.move_to(p.x, -p.y),
                        Command::LineTo(p) => pb.line_to(p.x, -p.y),
                        Command::QuadTo(ctrl, end) => pb.quad_to(ctrl.x, -ctrl.y, end.x, -end.y),
                        Command::CurveTo(c1, c2, end) => {
                            pb.cubic_to(c1.x, -c1.y, c2.x, -c2.y, end.x, -end.y)
                        }
                        Command::Close => pb.close(),
                    }
                }

                if let Some(path) = pb.finish() {
                    self.pixmap.fill_path(
                        &path,
                        &paint,
                        FillRule::Winding,
                        Transform::from_translate(glyph_x, glyph_y),
                        None,
                    );
                }
            }
        }
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| SlideError::RenderError(format!("PNG encoding failed: {}", e)))
    }

    /// A measurer bound to one text style, for [`crate::layout::wrap_text`].
    pub fn measurer<'a>(&'a mut self, style: &'a TextStyle) -> CanvasMeasure<'a> {
        CanvasMeasure {
            canvas: self,
            style,
        }
    }
}

pub struct CanvasMeasure<'a> {
    canvas: &'a mut SlideCanvas,
    style: &'a TextStyle,
}

impl TextMeasure for CanvasMeasure<'_> {
    fn text_width(&mut self, text: &str) -> f32 {
        self.canvas.measure_text(text, self.style)
    }
}
