// ABOUTME: Canvas exporter for the impact-slides application
// ABOUTME: Rebuilds a slide's layout at fixed resolution and writes it as PNG

use crate::canvas::{hex_color, FontOptions, SlideCanvas, TextStyle};
use crate::errors::{Result, SlideError};
use crate::layout::{wrap_text, OverflowPolicy, TextColumn};
use crate::models::{AspectRatio, GenerationResult, SlideData};
use crate::resources::ImageSource;
use crate::utils;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tiny_skia::{Color, Pixmap};

/// Branding printed at the bottom of every exported image.
pub const FOOTER_LABEL: &str = "IMPACT ENGLISH";

const LOGO_HEIGHT: f32 = 80.0;
const LOGO_TOP: f32 = 40.0;
const LOGO_PILL_PAD: f32 = 20.0;
const LOGO_PILL_RADIUS: f32 = 30.0;
const FOOTER_OFFSET: f32 = 40.0;
/// Body text baselines must stay above `height - FOOTER_SAFE_AREA`.
const FOOTER_SAFE_AREA: f32 = 90.0;

const ACCENT: &str = "#fb923c";

/// Settings for exporting slides to PNG.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub overflow: OverflowPolicy,
    pub fonts: FontOptions,
    /// Logo to composite at the top; `None` skips it.
    pub logo: Option<ImageSource>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            overflow: OverflowPolicy::default(),
            fonts: FontOptions::default(),
            logo: None,
        }
    }
}

/// Load the configured logo, tolerating any failure.
pub fn load_logo(options: &ExportOptions) -> Option<Pixmap> {
    let source = options.logo.as_ref()?;
    match source.load_pixmap() {
        Ok(pixmap) => Some(pixmap),
        Err(e) => {
            warn!("Could not load logo {}: {}", source.path, e);
            None
        }
    }
}

/// Decode a slide's base64 image payload.
pub fn decode_slide_image(data: &str) -> Result<Pixmap> {
    let bytes = STANDARD.decode(data.trim())?;
    crate::canvas::decode_pixmap(&bytes)
}

/// Vertical cursor that lays text blocks out one below the other.
///
/// Text is collected first and drawn by [`finish`](Self::finish), so a cut in
/// a later block can still mark the line above it.
struct TextFlow<'a> {
    canvas: &'a mut SlideCanvas,
    center_x: f32,
    y: f32,
    limit_y: f32,
    policy: OverflowPolicy,
    column: TextColumn<TextStyle>,
}

impl TextFlow<'_> {
    fn gap(&mut self, dy: f32) {
        self.y += dy;
    }

    fn block(&mut self, text: &str, style: TextStyle, max_width: f32, line_height: f32) {
        if self.column.is_cut() {
            return;
        }

        let mut measure = self.canvas.measurer(&style);
        let block = wrap_text(&mut measure, text, self.y, max_width, line_height);
        self.y = block.next_y;

        let limit = (self.policy == OverflowPolicy::Truncate).then_some(self.limit_y);
        if self.column.push(block, style, limit) {
            warn!("Slide text overflows the footer area; truncating");
        }
    }

    fn separator(&mut self) {
        if self.column.is_cut() {
            return;
        }
        self.gap(20.0);
        self.canvas
            .fill_rect(self.center_x - 30.0, self.y, 60.0, 4.0, hex_color(ACCENT));
        self.gap(40.0);
    }

    fn finish(mut self) {
        for (line, style) in self.column.lines() {
            self.canvas
                .fill_text_centered(&line.text, self.center_x, line.y, style);
        }
    }
}

fn draw_background(canvas: &mut SlideCanvas, slide: &SlideData, has_image: bool) {
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);

    let image = if has_image {
        slide
            .image_base64
            .as_deref()
            .filter(|data| !data.is_empty())
            .and_then(|data| match decode_slide_image(data) {
                Ok(pixmap) => Some(pixmap),
                Err(e) => {
                    warn!("Slide {} image could not be decoded: {}", slide.id, e);
                    None
                }
            })
    } else {
        None
    };

    match image {
        Some(image) => {
            canvas.draw_pixmap_cover(&image);
            // Darken the lower part so the text stays legible
            canvas.fill_linear_gradient(
                (0.0, h * 0.3),
                (0.0, h),
                &[
                    (0.0, Color::from_rgba8(0, 0, 0, 0)),
                    (0.5, Color::from_rgba8(0, 0, 0, 153)),
                    (1.0, Color::from_rgba8(0, 0, 0, 230)),
                ],
            );
        }
        None => {
            canvas.fill_linear_gradient(
                (0.0, 0.0),
                (w, h),
                &[(0.0, hex_color("#2563eb")), (1.0, hex_color("#f97316"))],
            );
        }
    }
}

fn draw_logo(canvas: &mut SlideCanvas, logo: &Pixmap) {
    if logo.height() == 0 {
        return;
    }
    let w = canvas.width() as f32;
    let logo_width = logo.width() as f32 * (LOGO_HEIGHT / logo.height() as f32);
    let left = (w - logo_width) / 2.0;

    canvas.fill_round_rect(
        left - LOGO_PILL_PAD,
        LOGO_TOP - LOGO_PILL_PAD / 2.0,
        logo_width + LOGO_PILL_PAD * 2.0,
        LOGO_HEIGHT + LOGO_PILL_PAD,
        LOGO_PILL_RADIUS,
        Color::from_rgba8(255, 255, 255, 230),
    );
    canvas.draw_pixmap_scaled(logo, left, LOGO_TOP, logo_width, LOGO_HEIGHT);
}

/// Draw one slide onto a fresh canvas sized for `ratio`.
pub fn render_slide(
    slide: &SlideData,
    ratio: AspectRatio,
    has_image: bool,
    logo: Option<&Pixmap>,
    options: &ExportOptions,
) -> Result<SlideCanvas> {
    let (width, height) = ratio.canvas_size();
    let mut canvas = SlideCanvas::new(width, height, &options.fonts)?;
    let (w, h) = (width as f32, height as f32);

    draw_background(&mut canvas, slide, has_image);
    if let Some(logo) = logo {
        draw_logo(&mut canvas, logo);
    }

    let white = hex_color("#ffffff");
    let mut flow = TextFlow {
        canvas: &mut canvas,
        center_x: w / 2.0,
        // Leave the picture visible when there is one
        y: if has_image { h * 0.60 } else { h * 0.35 },
        limit_y: h - FOOTER_SAFE_AREA,
        policy: options.overflow,
        column: TextColumn::new(),
    };

    flow.block(&slide.title, TextStyle::new(60.0, 700, white), w - 100.0, 70.0);
    flow.separator();

    flow.block(
        &slide.main_text,
        TextStyle::new(40.0, 500, hex_color("#f8fafc")),
        w - 120.0,
        55.0,
    );
    flow.gap(20.0);

    if !slide.content_list.is_empty() {
        flow.gap(10.0);
        for item in &slide.content_list {
            flow.block(item, TextStyle::new(36.0, 500, white), w - 150.0, 50.0);
            flow.gap(20.0);
        }
        flow.gap(20.0);
    }

    if let Some(secondary) = slide.secondary() {
        flow.block(
            secondary,
            TextStyle::new(32.0, 400, hex_color("#cbd5e1")).italic(),
            w - 120.0,
            45.0,
        );
    }
    flow.finish();

    canvas.fill_text_centered(
        FOOTER_LABEL,
        w / 2.0,
        h - FOOTER_OFFSET,
        &TextStyle::new(24.0, 700, hex_color(ACCENT)),
    );

    Ok(canvas)
}

/// Render a slide and write it as `impact-content-<id>.png` into the output directory.
pub fn export_slide(
    slide: &SlideData,
    ratio: AspectRatio,
    has_image: bool,
    logo: Option<&Pixmap>,
    options: &ExportOptions,
) -> Result<PathBuf> {
    utils::ensure_directory_exists(&options.output_dir)?;

    let canvas = render_slide(slide, ratio, has_image, logo, options)?;
    let png = canvas.encode_png()?;

    let path = options.output_dir.join(slide.export_file_name());
    fs::write(&path, png).map_err(SlideError::FileReadError)?;
    info!("Exported slide {} to {:?}", slide.id, path);
    Ok(path)
}

/// Export every slide of a generation; a failing slide does not stop the others.
pub fn export_all(result: &GenerationResult, options: &ExportOptions) -> Result<Vec<PathBuf>> {
    utils::ensure_directory_exists(&options.output_dir)?;
    let logo = load_logo(options);

    let mut written = Vec::with_capacity(result.slides.len());
    for slide in &result.slides {
        match export_slide(
            slide,
            result.request.aspect_ratio,
            result.request.has_image,
            logo.as_ref(),
            options,
        ) {
            Ok(path) => written.push(path),
            Err(e) => warn!("Failed to export slide {}: {}", slide.id, e),
        }
    }

    if written.is_empty() && !result.slides.is_empty() {
        return Err(SlideError::RenderError(
            "no slide could be exported".to_string(),
        ));
    }
    Ok(written)
}

/// Path a slide would be exported to.
pub fn export_path(output_dir: &Path, slide: &SlideData) -> PathBuf {
    output_dir.join(slide.export_file_name())
}
