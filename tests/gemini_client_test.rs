use impact::generator::{ImageGenerator, TextGenerator};
use impact::models::{AspectRatio, ContentRequest, ContentType};
use impact::{GeminiClient, GeminiConfig, SlideError};
use std::io::Read;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use tiny_http::{Header, Response, Server};

/// A request as seen by the mock server.
struct Captured {
    url: String,
    api_key: Option<String>,
    body: serde_json::Value,
}

/// Start a mock Gemini endpoint that answers every request with `status` and `body`.
fn start_mock_server(status: u16, body: String) -> (String, Receiver<Captured>) {
    let server = Server::http("127.0.0.1:0").expect("Failed to start mock server");
    let port = server
        .server_addr()
        .to_ip()
        .expect("Mock server has no IP address")
        .port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut raw = String::new();
            let _ = request.as_reader().read_to_string(&mut raw);
            let api_key = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("x-goog-api-key"))
                .map(|h| h.value.to_string());

            let _ = tx.send(Captured {
                url: request.url().to_string(),
                api_key,
                body: serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null),
            });

            let response = Response::from_string(body.clone())
                .with_status_code(status)
                .with_header(
                    "Content-Type: application/json"
                        .parse::<Header>()
                        .expect("valid header"),
                );
            let _ = request.respond(response);
        }
    });

    (format!("http://127.0.0.1:{}/v1beta", port), rx)
}

fn client_for(base_url: String) -> GeminiClient {
    GeminiClient::new(GeminiConfig {
        api_key: "test-key".to_string(),
        base_url,
        timeout_ms: 5000,
        ..GeminiConfig::default()
    })
    .expect("Failed to build client")
}

fn text_reply(text: &str) -> String {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    })
    .to_string()
}

fn grammar_request() -> ContentRequest {
    let mut request = ContentRequest::new(ContentType::Grammar);
    request.topic = "Present perfect".to_string();
    request.set_slide_count(2);
    request
}

#[test]
fn test_generate_text_parses_slide_array() {
    let drafts = r#"[
        {"title": "Have you ever...?", "mainText": "I have visited Bali.", "contentList": ["have + V3"], "visualPrompt": "a traveller"},
        {"title": "Since and for", "mainText": "I have lived here for 3 years.", "visualPrompt": "a calendar"}
    ]"#;
    let (base, requests) = start_mock_server(200, text_reply(drafts));
    let client = client_for(base);

    let slides = client
        .generate_text(&grammar_request())
        .expect("text generation should succeed");

    assert_eq!(slides.len(), 2);
    assert_eq!(slides[0].title, "Have you ever...?");
    assert_eq!(slides[0].content_list, Some(vec!["have + V3".to_string()]));
    assert_eq!(slides[1].visual_prompt.as_deref(), Some("a calendar"));

    let captured = requests.recv().expect("request was captured");
    assert_eq!(
        captured.url,
        "/v1beta/models/gemini-3-flash-preview:generateContent"
    );
    assert_eq!(captured.api_key.as_deref(), Some("test-key"));
    assert_eq!(
        captured.body["generationConfig"]["responseMimeType"],
        "application/json"
    );
    assert_eq!(
        captured.body["generationConfig"]["responseSchema"]["type"],
        "ARRAY"
    );
    let prompt = captured.body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default();
    assert!(prompt.contains("Create 2 slides about Grammar"));
    assert!(captured.body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .contains("always valid JSON"));
}

#[test]
fn test_empty_text_reply_means_no_slides() {
    let (base, _requests) = start_mock_server(200, r#"{"candidates": []}"#.to_string());
    let client = client_for(base);

    let slides = client.generate_text(&grammar_request()).unwrap();
    assert!(slides.is_empty());
}

#[test]
fn test_rate_limit_maps_to_quota_error() {
    let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
    let (base, _requests) = start_mock_server(429, body.to_string());
    let client = client_for(base);

    match client.generate_text(&grammar_request()) {
        Err(SlideError::QuotaExceeded(message)) => {
            assert_eq!(message, "Resource has been exhausted")
        }
        Err(other) => panic!("expected quota error, got {}", other),
        Ok(_) => panic!("expected quota error, got slides"),
    }
}

#[test]
fn test_server_error_maps_to_api_error() {
    let (base, _requests) = start_mock_server(503, "upstream overloaded".to_string());
    let client = client_for(base);

    let err = client.generate_text(&grammar_request()).unwrap_err();
    assert!(!err.is_quota());
    match err {
        SlideError::ApiError { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream overloaded");
        }
        other => panic!("expected API error, got {}", other),
    }
}

#[test]
fn test_malformed_model_output_is_a_format_error() {
    let (base, _requests) = start_mock_server(200, text_reply("Sorry, I cannot do that."));
    let client = client_for(base);

    let err = client.generate_text(&grammar_request()).unwrap_err();
    assert!(matches!(err, SlideError::ResponseFormat(_)));
}

#[test]
fn test_generate_image_returns_inline_data() {
    let body = serde_json::json!({
        "candidates": [{
            "content": {
                "parts": [
                    { "text": "Here is your picture" },
                    { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
                ]
            }
        }]
    })
    .to_string();
    let (base, requests) = start_mock_server(200, body);
    let client = client_for(base);

    let image = client
        .generate_image("a megaphone", AspectRatio::Story)
        .expect("image generation should succeed");
    assert_eq!(image.as_deref(), Some("iVBORw0KGgo="));

    let captured = requests.recv().unwrap();
    assert_eq!(
        captured.url,
        "/v1beta/models/gemini-2.5-flash-image:generateContent"
    );
    assert_eq!(
        captured.body["generationConfig"]["imageConfig"]["aspectRatio"],
        "9:16"
    );
    assert!(captured.body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .contains("a megaphone"));
}

#[test]
fn test_generate_image_without_inline_part() {
    let (base, _requests) = start_mock_server(200, text_reply("no image today"));
    let client = client_for(base);

    let image = client
        .generate_image("a megaphone", AspectRatio::Square)
        .unwrap();
    assert!(image.is_none());
}
