// ABOUTME: Main entry point for the impact-slides program.
// ABOUTME: Provides CLI interface and executes commands from the library.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use impact::html::GalleryOptions;
use impact::models::{AspectRatio, ContentRequest, ContentType, GenerationResult};
use impact::session::{RetryPolicy, Session};
use impact::{export, html, serve, utils, Config, GeminiClient, OverflowPolicy};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

const RESULT_FILE: &str = "slides.json";
const GALLERY_FILE: &str = "index.html";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate slides with Gemini
    ///
    /// A failed attempt is retried after a 10 second countdown. Without
    /// --max-retries this repeats until the process is stopped with Ctrl+C.
    Generate(GenerateArgs),

    /// Export slides from a previous generation as PNG images
    Export(ExportArgs),

    /// Render the HTML gallery for a previous generation
    Preview(PreviewArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Content type: grammar, vocabulary, slang, idioms or announcement
    #[arg(long = "type", default_value = "grammar")]
    content_type: ContentType,

    /// Topic to write about (not used for announcements)
    #[arg(long, default_value = "")]
    topic: String,

    /// Generate an illustration for every slide
    #[arg(long)]
    image: bool,

    /// Number of slides (1-3, always 1 for announcements)
    #[arg(long, default_value_t = 1)]
    slides: u8,

    /// Aspect ratio: 1:1, 4:3 or 9:16
    #[arg(long, default_value = "1:1")]
    ratio: AspectRatio,

    /// Announcement title
    #[arg(long, default_value = "")]
    title: String,

    /// Announcement main text
    #[arg(long, default_value = "")]
    body1: String,

    /// Announcement highlight (repeat for up to 5)
    #[arg(long = "field")]
    fields: Vec<String>,

    /// Announcement closing text
    #[arg(long, default_value = "")]
    body2: String,

    /// Directory for slides.json and any rendered output
    #[arg(short, long, default_value = "impact-output")]
    output: PathBuf,

    /// Also export every slide as PNG
    #[arg(long)]
    export: bool,

    /// Also write the HTML gallery
    #[arg(long)]
    html: bool,

    /// Stop after this many automatic retries (default: retry until Ctrl+C)
    #[arg(long)]
    max_retries: Option<u32>,

    /// Let text run past the footer instead of truncating it
    #[arg(long)]
    allow_overflow: bool,
}

#[derive(Args)]
struct ExportArgs {
    /// Path to a slides.json written by `generate`
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for the PNG files
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Export only the slide with this id
    #[arg(long)]
    slide: Option<u32>,

    /// Skip the logo at the top of each image
    #[arg(long)]
    no_logo: bool,

    /// Let text run past the footer instead of truncating it
    #[arg(long)]
    allow_overflow: bool,
}

#[derive(Args)]
struct PreviewArgs {
    /// Path to a slides.json written by `generate`
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the output HTML file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Serve the gallery directory over HTTP after writing it
    #[arg(long)]
    serve: bool,

    /// Port for the preview server
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn overflow_policy(allow: bool) -> OverflowPolicy {
    if allow {
        OverflowPolicy::Allow
    } else {
        OverflowPolicy::Truncate
    }
}

fn gallery_options(config: &Config, link_downloads: bool) -> GalleryOptions {
    GalleryOptions {
        logo_src: (!config.logo.is_empty()).then(|| config.logo.clone()),
        link_downloads,
    }
}

fn load_result(path: &Path) -> anyhow::Result<GenerationResult> {
    utils::require_file(path)?;
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read generation file {:?}", path))?;
    let result = GenerationResult::from_json(&json)
        .with_context(|| format!("Failed to parse generation file {:?}", path))?;
    Ok(result)
}

fn build_request(args: &GenerateArgs) -> ContentRequest {
    let mut request = ContentRequest::new(args.content_type);
    request.topic = args.topic.clone();
    request.has_image = args.image;
    request.set_slide_count(args.slides);
    request.aspect_ratio = args.ratio;
    request.announcement_title = args.title.clone();
    request.announcement_body1 = args.body1.clone();
    if args.fields.len() > impact::models::MAX_ANNOUNCEMENT_FIELDS {
        warn!(
            "Only the first {} announcement fields are used",
            impact::models::MAX_ANNOUNCEMENT_FIELDS
        );
    }
    request.set_announcement_fields(args.fields.iter().cloned());
    request.announcement_body2 = args.body2.clone();
    request
}

fn run_generate(args: &GenerateArgs, config: &Config) -> anyhow::Result<()> {
    let request = build_request(args);
    request.validate()?;
    utils::prepare_output_dir(&args.output)?;

    let client = GeminiClient::new(config.get_client_config())
        .context("Set GEMINI_API_KEY to call Gemini")?;

    let policy = RetryPolicy {
        max_retries: args.max_retries,
        ..RetryPolicy::default()
    };
    let mut session = Session::new(request, client).with_policy(policy);
    session.set_observer(|state| match state.banner() {
        Some(banner) => eprintln!("{}", banner),
        None if state.is_generating() => println!("{}", state),
        None => {}
    });

    let report = session.generate_report()?;
    if report.images_missing > 0 {
        eprintln!(
            "Warning: {} slide(s) were generated without an image",
            report.images_missing
        );
    }

    let result = GenerationResult::new(report.slides, session.request().clone());

    let result_path = args.output.join(RESULT_FILE);
    fs::write(&result_path, result.to_json()?)
        .with_context(|| format!("Failed to write {:?}", result_path))?;
    println!(
        "Generated {} slide(s): {:?}",
        result.slides.len(),
        result_path
    );

    if args.export {
        let options = config.get_export_config(
            args.output.clone(),
            Some(overflow_policy(args.allow_overflow)),
            true,
        );
        let written = export::export_all(&result, &options)?;
        for path in written {
            println!("Exported {:?}", path);
        }
    }

    if args.html {
        let gallery = html::generate_gallery(&result, &gallery_options(config, args.export));
        let gallery_path = args.output.join(GALLERY_FILE);
        html::write_html_to_file(&gallery, &gallery_path)
            .with_context(|| format!("Failed to write {:?}", gallery_path))?;
        println!("Gallery written: {:?}", gallery_path);
    }

    Ok(())
}

fn run_export(args: &ExportArgs, config: &Config) -> anyhow::Result<()> {
    let mut result = load_result(&args.input)?;

    if let Some(id) = args.slide {
        let slide = result
            .slide(id)
            .cloned()
            .with_context(|| format!("No slide with id {} in {:?}", id, args.input))?;
        result.slides = vec![slide];
    }

    let options = config.get_export_config(
        args.output.clone(),
        Some(overflow_policy(args.allow_overflow)),
        !args.no_logo,
    );
    let written = export::export_all(&result, &options)?;
    for path in written {
        println!("Exported {:?}", path);
    }
    Ok(())
}

fn run_preview(args: &PreviewArgs, config: &Config) -> anyhow::Result<()> {
    let result = load_result(&args.input)?;

    let output = args.output.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .map(|dir| dir.join(GALLERY_FILE))
            .unwrap_or_else(|| PathBuf::from(GALLERY_FILE))
    });
    let root = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let link_downloads = result
        .slides
        .iter()
        .any(|slide| export::export_path(&root, slide).is_file());
    let gallery = html::generate_gallery(&result, &gallery_options(config, link_downloads));
    html::write_html_to_file(&gallery, &output)
        .with_context(|| format!("Failed to write {:?}", output))?;
    println!("Gallery written: {:?}", output);

    if args.serve {
        let index = output
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| GALLERY_FILE.to_string());
        info!("Serving {:?}", root);
        serve::serve_directory(&root, &index, args.port)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let result = match &cli.command {
        Some(Commands::Generate(args)) => {
            println!("Executing generate command...");
            run_generate(args, &config)
        }
        Some(Commands::Export(args)) => {
            println!("Executing export command...");
            run_export(args, &config)
        }
        Some(Commands::Preview(args)) => {
            println!("Executing preview command...");
            run_preview(args, &config)
        }
        None => {
            println!("No command specified. Use --help for usage information.");
            Ok(())
        }
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
