use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::GenericImageView;
use impact::export::{self, export_all, export_slide, render_slide, ExportOptions};
use impact::models::{AspectRatio, ContentRequest, ContentType, GenerationResult, SlideData};
use impact::resources::ImageSource;
use impact::SlideError;
use std::fs;
use tempfile::TempDir;
use tiny_skia::{Color, Pixmap};

fn sample_slide(id: u32) -> SlideData {
    SlideData {
        id,
        title: "Break a leg".to_string(),
        main_text: "Used to wish someone good luck before a performance.\nNot literal!"
            .to_string(),
        content_list: vec!["Idiom".to_string(), "Informal".to_string()],
        secondary_text: Some("Arti: Semoga sukses".to_string()),
        visual_prompt: Some("a theatre stage".to_string()),
        image_base64: None,
        footer: "Impact English Course".to_string(),
    }
}

fn solid_png(width: u32, height: u32, color: Color) -> Vec<u8> {
    let mut pixmap = Pixmap::new(width, height).expect("valid size");
    pixmap.fill(color);
    pixmap.encode_png().expect("Failed to encode PNG")
}

fn options_in(dir: &TempDir) -> ExportOptions {
    ExportOptions {
        output_dir: dir.path().to_path_buf(),
        ..ExportOptions::default()
    }
}

#[test]
fn test_canvas_size_follows_ratio() {
    let options = ExportOptions::default();
    let cases = [
        (AspectRatio::Square, 1080, 1080),
        (AspectRatio::Portrait, 1080, 1440),
        (AspectRatio::Story, 1080, 1920),
    ];

    for (ratio, width, height) in cases {
        let canvas = render_slide(&sample_slide(1), ratio, false, None, &options)
            .expect("render should succeed");
        assert_eq!((canvas.width(), canvas.height()), (width, height), "{}", ratio);
    }
}

#[test]
fn test_clean_background_is_blue_to_orange() {
    let canvas = render_slide(
        &sample_slide(1),
        AspectRatio::Square,
        false,
        None,
        &ExportOptions::default(),
    )
    .unwrap();

    let top_left = canvas.pixmap().pixel(0, 0).expect("pixel in bounds");
    assert!(top_left.blue() > top_left.red());

    let bottom_right = canvas.pixmap().pixel(1079, 1079).expect("pixel in bounds");
    assert!(bottom_right.red() > bottom_right.blue());
}

#[test]
fn test_slide_image_covers_background() {
    let mut slide = sample_slide(1);
    slide.image_base64 = Some(STANDARD.encode(solid_png(8, 8, Color::from_rgba8(200, 0, 0, 255))));

    let canvas = render_slide(
        &slide,
        AspectRatio::Portrait,
        true,
        None,
        &ExportOptions::default(),
    )
    .unwrap();

    // Above the dark overlay the picture is untouched
    let top = canvas.pixmap().pixel(5, 5).unwrap();
    assert!(top.red() > 150);
    assert!(top.green() < 40 && top.blue() < 40);

    // Near the bottom the overlay darkens it
    let bottom = canvas.pixmap().pixel(5, 1435).unwrap();
    assert!(bottom.red() < top.red());
}

#[test]
fn test_image_ignored_when_request_has_no_image() {
    let mut slide = sample_slide(1);
    slide.image_base64 = Some(STANDARD.encode(solid_png(8, 8, Color::from_rgba8(200, 0, 0, 255))));

    let canvas = render_slide(
        &slide,
        AspectRatio::Square,
        false,
        None,
        &ExportOptions::default(),
    )
    .unwrap();
    let top_left = canvas.pixmap().pixel(0, 0).unwrap();
    assert!(top_left.blue() > top_left.red());
}

#[test]
fn test_undecodable_image_falls_back_to_gradient() {
    let mut slide = sample_slide(1);
    slide.image_base64 = Some("this is not base64 at all!".to_string());

    let canvas = render_slide(
        &slide,
        AspectRatio::Square,
        true,
        None,
        &ExportOptions::default(),
    )
    .unwrap();
    let top_left = canvas.pixmap().pixel(0, 0).unwrap();
    assert!(top_left.blue() > top_left.red());
}

#[test]
fn test_logo_drawn_at_top_center() {
    let logo = Pixmap::decode_png(&solid_png(10, 5, Color::from_rgba8(0, 200, 0, 255))).unwrap();

    let canvas = render_slide(
        &sample_slide(1),
        AspectRatio::Square,
        false,
        Some(&logo),
        &ExportOptions::default(),
    )
    .unwrap();

    // 10x5 scaled to 80 px high is 160 px wide, centered at y 40..120
    let center = canvas.pixmap().pixel(540, 80).unwrap();
    assert!(center.green() > 150);
    assert!(center.red() < 40 && center.blue() < 40);
}

#[test]
fn test_export_slide_writes_named_png() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let options = ExportOptions {
        output_dir: dir.path().join("nested").join("out"),
        ..ExportOptions::default()
    };

    let path = export_slide(&sample_slide(3), AspectRatio::Story, false, None, &options)
        .expect("export should succeed");

    assert_eq!(path, options.output_dir.join("impact-content-3.png"));
    assert_eq!(path, export::export_path(&options.output_dir, &sample_slide(3)));

    let written = image::open(&path).expect("exported file is a readable image");
    assert_eq!(written.dimensions(), (1080, 1920));
}

#[test]
fn test_export_all_with_local_logo() {
    let dir = TempDir::new().unwrap();
    let logo_path = dir.path().join("logo.png");
    fs::write(&logo_path, solid_png(4, 4, Color::WHITE)).unwrap();

    let mut request = ContentRequest::new(ContentType::Idioms);
    request.topic = "theatre".to_string();
    let result = GenerationResult::new(vec![sample_slide(1), sample_slide(2)], request);

    let options = ExportOptions {
        logo: Some(ImageSource::new(logo_path.to_str().unwrap())),
        ..options_in(&dir)
    };
    let written = export_all(&result, &options).unwrap();

    assert_eq!(written.len(), 2);
    assert!(dir.path().join("impact-content-1.png").is_file());
    assert!(dir.path().join("impact-content-2.png").is_file());
}

#[test]
fn test_missing_logo_is_tolerated() {
    let dir = TempDir::new().unwrap();
    let mut request = ContentRequest::new(ContentType::Grammar);
    request.topic = "articles".to_string();
    let result = GenerationResult::new(vec![sample_slide(1)], request);

    let options = ExportOptions {
        logo: Some(ImageSource::new("/definitely/not/here/logo.png")),
        ..options_in(&dir)
    };
    assert!(export::load_logo(&options).is_none());

    let written = export_all(&result, &options).unwrap();
    assert_eq!(written.len(), 1);
}

#[test]
fn test_export_into_a_file_path_fails() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "x").unwrap();

    let options = ExportOptions {
        output_dir: blocker,
        ..ExportOptions::default()
    };
    let err = export_slide(&sample_slide(1), AspectRatio::Square, false, None, &options)
        .unwrap_err();
    assert!(matches!(err, SlideError::ValidationError(_)));
}
