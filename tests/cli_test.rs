use image::GenericImageView;
use impact::models::{ContentRequest, ContentType, GenerationResult, SlideData};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use tiny_http::{Response, Server};

fn impact_command() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_impact-slides"));
    command
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .env_remove("GEMINI_API_BASE")
        .env("IMPACT_LOGO", "/no/such/logo.png")
        .env("RUST_LOG", "warn");
    command
}

fn run_command(args: &[&str]) -> Output {
    impact_command()
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn slide(id: u32, title: &str) -> SlideData {
    SlideData {
        id,
        title: title.to_string(),
        main_text: "Example sentence".to_string(),
        content_list: vec!["Tip".to_string()],
        footer: "Impact English Course".to_string(),
        ..SlideData::default()
    }
}

fn write_result(dir: &Path) -> PathBuf {
    let mut request = ContentRequest::new(ContentType::Slang);
    request.topic = "Gen Z words".to_string();
    let result = GenerationResult::new(vec![slide(1, "No cap"), slide(2, "Slay")], request);

    let path = dir.join("slides.json");
    fs::write(&path, result.to_json().unwrap()).unwrap();
    path
}

fn count_pngs(dir: &Path) -> usize {
    fs::read_dir(dir)
        .expect("Failed to read output dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "png"))
        .count()
}

#[test]
fn test_no_command_prints_usage_hint() {
    let output = run_command(&[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No command specified"));
}

#[test]
fn test_preview_writes_gallery_next_to_input() {
    let dir = TempDir::new().unwrap();
    let input = write_result(dir.path());

    let output = run_command(&["preview", "--input", input.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let html = fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(html.contains("No cap"));
    assert!(html.contains("Slang Words"));
    assert!(html.contains("/no/such/logo.png"));
    // Nothing exported yet, so no download links
    assert!(!html.contains("impact-content-1.png"));
}

#[test]
fn test_export_all_and_single_slide() {
    let dir = TempDir::new().unwrap();
    let input = write_result(dir.path());
    let all = dir.path().join("all");
    let single = dir.path().join("single");

    let output = run_command(&[
        "export",
        "--input",
        input.to_str().unwrap(),
        "--output",
        all.to_str().unwrap(),
        "--no-logo",
    ]);
    assert!(output.status.success());
    assert_eq!(count_pngs(&all), 2);

    let output = run_command(&[
        "export",
        "--input",
        input.to_str().unwrap(),
        "--output",
        single.to_str().unwrap(),
        "--slide",
        "2",
    ]);
    assert!(output.status.success());
    assert_eq!(count_pngs(&single), 1);
    assert!(single.join("impact-content-2.png").is_file());
}

#[test]
fn test_export_unknown_slide_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_result(dir.path());

    let output = run_command(&["export", "--input", input.to_str().unwrap(), "--slide", "9"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No slide with id 9"));
}

#[test]
fn test_missing_input_fails() {
    let output = run_command(&["preview", "--input", "/no/such/slides.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Path not found"));
}

#[test]
fn test_generate_requires_topic_then_key() {
    let output = run_command(&["generate", "--type", "idioms"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("topic is required"));

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("run");
    let output = run_command(&[
        "generate",
        "--type",
        "idioms",
        "--topic",
        "weather",
        "--output",
        out.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("GEMINI_API_KEY"));
}

#[test]
fn test_generate_help_explains_stopping() {
    let output = run_command(&["generate", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ctrl+C"));
    assert!(stdout.contains("--max-retries"));
}

#[test]
fn test_generate_rejects_file_output_before_calling_api() {
    let server = Server::http("127.0.0.1:0").expect("Failed to start mock server");
    let port = server.server_addr().to_ip().unwrap().port();
    let (seen_tx, seen_rx) = mpsc::channel();

    thread::spawn(move || {
        for request in server.incoming_requests() {
            let _ = seen_tx.send(request.url().to_string());
            let _ = request.respond(Response::from_string("{}").with_status_code(500u16));
        }
    });

    let dir = TempDir::new().unwrap();
    let not_a_dir = dir.path().join("slides.txt");
    fs::write(&not_a_dir, "taken").unwrap();

    let output = impact_command()
        .env("GEMINI_API_KEY", "test-key")
        .env("GEMINI_API_BASE", format!("http://127.0.0.1:{}/v1beta", port))
        .args([
            "generate",
            "--type",
            "vocabulary",
            "--topic",
            "kitchen",
            "--output",
            not_a_dir.to_str().unwrap(),
            "--max-retries",
            "0",
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not a directory"));
    assert!(seen_rx.recv_timeout(Duration::from_millis(300)).is_err());
    assert_eq!(fs::read_to_string(&not_a_dir).unwrap(), "taken");
}

#[test]
fn test_generate_against_mock_api() {
    let server = Server::http("127.0.0.1:0").expect("Failed to start mock server");
    let port = server.server_addr().to_ip().unwrap().port();
    let drafts = r#"[{"title":"Weekend Class","mainText":"Join us on Saturday","contentList":["10 AM","Room 2"],"secondaryText":"Bring a friend","visualPrompt":"a calendar"}]"#;
    let reply = serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": drafts }] } }]
    })
    .to_string();

    thread::spawn(move || {
        for request in server.incoming_requests() {
            let _ = request.respond(Response::from_string(reply.clone()));
        }
    });

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("run");
    let output = impact_command()
        .env("GEMINI_API_KEY", "test-key")
        .env("GEMINI_API_BASE", format!("http://127.0.0.1:{}/v1beta", port))
        .args([
            "generate",
            "--type",
            "announcement",
            "--title",
            "Weekend Class",
            "--body1",
            "Join us on Saturday",
            "--field",
            "10 AM",
            "--field",
            "Room 2",
            "--ratio",
            "9:16",
            "--output",
            out.to_str().unwrap(),
            "--export",
            "--html",
            "--max-retries",
            "0",
        ])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json = fs::read_to_string(out.join("slides.json")).unwrap();
    let result = GenerationResult::from_json(&json).unwrap();
    assert_eq!(result.slides.len(), 1);
    assert_eq!(result.slides[0].content_list, vec!["10 AM", "Room 2"]);
    assert_eq!(
        result.request.announcement_fields,
        vec!["10 AM".to_string(), "Room 2".to_string()]
    );

    let png = image::open(out.join("impact-content-1.png")).unwrap();
    assert_eq!(png.dimensions(), (1080, 1920));

    let html = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(html.contains("Weekend Class"));
    assert!(html.contains("impact-content-1.png"));
}
