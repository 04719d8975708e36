// ABOUTME: HTML slide renderer for the impact-slides application
// ABOUTME: Renders generated slides as styled cards with a full-screen preview overlay

use crate::errors::{Result, SlideError};
use crate::models::{AspectRatio, GenerationResult, SlideData};
use crate::utils::{self, escape_html};
use log::info;
use std::fs;
use std::path::Path;

/// Options for the gallery page.
#[derive(Debug, Clone, Default)]
pub struct GalleryOptions {
    /// Logo shown in the pill at the top of every card.
    pub logo_src: Option<String>,
    /// Link each card to its exported `impact-content-<id>.png`.
    pub link_downloads: bool,
}

const STYLE: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; font-family: Inter, system-ui, sans-serif; background: #f8fafc; color: #1e293b; }
header { background: #fff; border-bottom: 1px solid #f1f5f9; padding: 16px 32px; display: flex; justify-content: space-between; align-items: center; }
header h1 { font-size: 20px; margin: 0; }
header h1 span { color: #2563eb; }
.badge { background: #dbeafe; color: #1d4ed8; font-size: 12px; font-weight: 700; padding: 4px 12px; border-radius: 999px; text-transform: uppercase; letter-spacing: .05em; }
main { max-width: 1200px; margin: 0 auto; padding: 32px; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(300px, 1fr)); gap: 24px; }
.card { display: flex; flex-direction: column; gap: 12px; }
.slide { position: relative; width: 100%; border-radius: 8px; overflow: hidden; background: #0f172a; box-shadow: 0 4px 12px rgba(0,0,0,.15); }
.ratio-square { aspect-ratio: 1 / 1; }
.ratio-portrait { aspect-ratio: 3 / 4; }
.ratio-story { aspect-ratio: 9 / 16; }
.bg { position: absolute; inset: 0; width: 100%; height: 100%; object-fit: cover; }
.bg-clean { background: linear-gradient(to bottom right, #2563eb, #f97316); }
.logo { position: absolute; top: 16px; left: 0; right: 0; display: flex; justify-content: center; z-index: 10; }
.logo div { background: rgba(255,255,255,.9); padding: 8px 16px; border-radius: 999px; }
.logo img { height: 28px; display: block; }
.content { position: absolute; inset: 0; display: flex; flex-direction: column; align-items: center; justify-content: center; padding: 64px 24px 24px; text-align: center; color: #fff; }
.content.with-image { background: rgba(0,0,0,.5); }
.content h3 { font-size: 24px; margin: 0 0 8px; text-shadow: 0 2px 4px rgba(0,0,0,.4); }
.rule { height: 3px; width: 48px; background: #fb923c; border-radius: 999px; margin-bottom: 16px; }
.main { font-size: 20px; font-weight: 500; color: #f8fafc; white-space: pre-wrap; line-height: 1.6; margin: 0 0 16px; }
.fields { display: flex; flex-direction: column; gap: 8px; width: 100%; max-width: 80%; margin-bottom: 16px; }
.fields div { background: rgba(255,255,255,.15); border: 1px solid rgba(255,255,255,.2); padding: 8px 16px; border-radius: 8px; font-weight: 500; }
.secondary { font-size: 16px; color: #e2e8f0; font-style: italic; font-weight: 300; margin: 0; }
.footer { position: absolute; bottom: 16px; font-size: 11px; font-weight: 700; letter-spacing: .2em; color: #fb923c; text-transform: uppercase; }
.controls { display: flex; gap: 8px; }
.controls a { flex: 1; text-align: center; padding: 8px; border-radius: 8px; font-size: 14px; font-weight: 500; text-decoration: none; }
.controls .preview { background: #fff; border: 1px solid #d1d5db; color: #374151; }
.controls .download { background: #2563eb; color: #fff; }
.empty { border: 2px dashed #e5e7eb; border-radius: 16px; padding: 64px; text-align: center; color: #9ca3af; }
.overlay { display: none; position: fixed; inset: 0; z-index: 50; background: rgba(0,0,0,.8); align-items: center; justify-content: center; padding: 16px; }
.overlay:target { display: flex; }
.overlay .frame { background: #fff; border-radius: 12px; overflow: hidden; max-width: 900px; width: 100%; max-height: 90vh; display: flex; flex-direction: column; }
.overlay .bar { padding: 16px; border-bottom: 1px solid #e5e7eb; display: flex; justify-content: space-between; background: #f9fafb; }
.overlay .bar a { text-decoration: none; color: #374151; font-size: 20px; }
.overlay .stage { flex: 1; overflow: auto; padding: 32px; background: #f3f4f6; display: flex; justify-content: center; }
.overlay .slide.square { width: 500px; height: 500px; }
.overlay .slide.portrait { width: 450px; height: 600px; }
.overlay .slide.story { width: 450px; height: 800px; }
.overlay .content h3 { font-size: 30px; }
.overlay .main { font-size: 28px; }
"#;

fn ratio_class(ratio: AspectRatio) -> &'static str {
    match ratio {
        AspectRatio::Square => "square",
        AspectRatio::Portrait => "portrait",
        AspectRatio::Story => "story",
    }
}

/// Background layer: the generated picture, or the clean gradient.
fn background(slide: &SlideData, has_image: bool) -> String {
    match slide.image_base64.as_deref() {
        Some(data) if has_image && !data.is_empty() => format!(
            r#"<img class="bg" src="data:image/png;base64,{}" alt="Slide Background">"#,
            escape_html(data)
        ),
        _ => r#"<div class="bg bg-clean"></div>"#.to_string(),
    }
}

fn slide_body(slide: &SlideData, has_image: bool, options: &GalleryOptions) -> String {
    let mut html = background(slide, has_image);

    if let Some(logo) = &options.logo_src {
        html.push_str(&format!(
            r#"<div class="logo"><div><img src="{}" alt="Impact Logo"></div></div>"#,
            escape_html(logo)
        ));
    }

    let layer = if has_image {
        "content with-image"
    } else {
        "content"
    };
    html.push_str(&format!(r#"<div class="{}">"#, layer));
    html.push_str(&format!("<h3>{}</h3>", escape_html(&slide.title)));
    html.push_str(r#"<div class="rule"></div>"#);
    html.push_str(&format!(
        r#"<p class="main">{}</p>"#,
        escape_html(&slide.main_text)
    ));

    if !slide.content_list.is_empty() {
        html.push_str(r#"<div class="fields">"#);
        for item in &slide.content_list {
            html.push_str(&format!("<div>{}</div>", escape_html(item)));
        }
        html.push_str("</div>");
    }

    if let Some(secondary) = slide.secondary() {
        html.push_str(&format!(
            r#"<p class="secondary">{}</p>"#,
            escape_html(secondary)
        ));
    }

    html.push_str(r#"<div class="footer">Impact English</div>"#);
    html.push_str("</div>");
    html
}

/// One card in the results grid.
pub fn render_card(
    slide: &SlideData,
    ratio: AspectRatio,
    has_image: bool,
    options: &GalleryOptions,
) -> String {
    let mut html = String::from(r#"<div class="card">"#);
    html.push_str(&format!(
        r#"<div class="slide ratio-{}">{}</div>"#,
        ratio_class(ratio),
        slide_body(slide, has_image, options)
    ));

    html.push_str(r#"<div class="controls">"#);
    html.push_str(&format!(
        r##"<a class="preview" href="#preview-{}">Preview</a>"##,
        slide.id
    ));
    if options.link_downloads {
        html.push_str(&format!(
            r#"<a class="download" href="{}" download>Download</a>"#,
            slide.export_file_name()
        ));
    }
    html.push_str("</div></div>");
    html
}

/// Full-screen preview overlay, shown when its anchor is targeted.
pub fn render_preview(
    slide: &SlideData,
    ratio: AspectRatio,
    has_image: bool,
    options: &GalleryOptions,
) -> String {
    format!(
        r##"<section class="overlay" id="preview-{id}"><div class="frame"><div class="bar"><strong>Preview: {title}</strong><a href="#" title="Close">&times;</a></div><div class="stage"><div class="slide {ratio}">{body}</div></div></div></section>"##,
        id = slide.id,
        title = escape_html(&slide.title),
        ratio = ratio_class(ratio),
        body = slide_body(slide, has_image, options),
    )
}

/// Build the complete results page for a generation.
pub fn generate_gallery(result: &GenerationResult, options: &GalleryOptions) -> String {
    let request = &result.request;

    let mut html_doc = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html_doc.push_str("<meta charset=\"UTF-8\">\n");
    html_doc.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html_doc.push_str("<title>Impact Generator</title>\n");
    html_doc.push_str(&format!("<style>{}</style>\n", STYLE));
    html_doc.push_str("</head>\n<body>\n");

    html_doc.push_str(&format!(
        "<header><h1>Impact <span>Generator</span></h1><span class=\"badge\">{}</span></header>\n",
        escape_html(request.content_type.label())
    ));
    html_doc.push_str("<main>\n");

    if result.slides.is_empty() {
        html_doc.push_str(
            "<div class=\"empty\"><h3>No Content Yet</h3><p>Fill out the settings and generate to see your slides here.</p></div>\n",
        );
    } else {
        html_doc.push_str(&format!(
            "<h2>Generated Results</h2>\n<p>Generated {}</p>\n<div class=\"grid\">\n",
            result.generated_at.format("%Y-%m-%d %H:%M UTC")
        ));
        for slide in &result.slides {
            html_doc.push_str(&render_card(
                slide,
                request.aspect_ratio,
                request.has_image,
                options,
            ));
            html_doc.push('\n');
        }
        html_doc.push_str("</div>\n");

        for slide in &result.slides {
            html_doc.push_str(&render_preview(
                slide,
                request.aspect_ratio,
                request.has_image,
                options,
            ));
            html_doc.push('\n');
        }
    }

    html_doc.push_str("</main>\n</body>\n</html>");
    html_doc
}

/// Utility function to write HTML content to a file
pub fn write_html_to_file(html_content: &str, output_path: &Path) -> Result<()> {
    info!("Writing HTML to file: {:?}", output_path);

    utils::ensure_parent_directory_exists(output_path)?;
    fs::write(output_path, html_content).map_err(SlideError::FileReadError)?;

    Ok(())
}
