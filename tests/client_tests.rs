// End-to-end client tests against a mock HTTP server

use base64::Engine;
use mockito::Matcher;
use serde_json::json;
use tempfile::TempDir;

use prompt2png::client::ImageClient;
use prompt2png::config::AppConfig;
use prompt2png::error::Error;
use prompt2png::protocol::ReferenceMode;

// Smallest valid PNG: 1x1 transparent pixel.
const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

fn png_b64() -> String {
    base64::engine::general_purpose::STANDARD.encode(PNG_1X1)
}

fn client_for(server_url: &str, model: &str, dir: &TempDir) -> ImageClient {
    let mut config = AppConfig::default();
    config.api.api_key = "test-key".to_string();
    config.api.base_url = server_url.to_string();
    config.api.model = model.to_string();
    config.output.save_dir = dir.path().to_path_buf();
    config.transport.retry_backoff_secs = 0.01;
    ImageClient::new(&config).unwrap()
}

const GEMINI_PATH: &str = "/v1beta/models/gemini-3-pro-image-preview:generateContent";

#[tokio::test]
async fn test_generate_saves_camel_case_inline_data() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let mock = server
        .mock("POST", GEMINI_PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::Json(json!({
            "contents": [{"parts": [{"text": "a red square"}]}],
            "generationConfig": {"response_mime_type": "image/png"},
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{"content": {"parts": [
                    {"inlineData": {"mimeType": "image/png", "data": png_b64()}}
                ]}}],
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url(), "gemini-3-pro-image-preview", &dir);
    let result = client
        .generate("a red square", Some("out.png".to_string()))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.byte_length, PNG_1X1.len());
    assert_eq!(result.saved_path, dir.path().join("out.png"));
    assert_eq!(std::fs::read(&result.saved_path).unwrap(), PNG_1X1);
}

#[tokio::test]
async fn test_generate_accepts_snake_case_inline_data() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let mock = server
        .mock("POST", GEMINI_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{"content": {"parts": [
                    {"inline_data": {"mime_type": "image/png", "data": png_b64()}}
                ]}}],
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server.url(), "gemini-3-pro-image-preview", &dir);
    let result = client
        .generate("a red square", Some("out.png".to_string()))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(std::fs::read(&result.saved_path).unwrap(), PNG_1X1);
}

#[tokio::test]
async fn test_text_answer_surfaces_as_text_instead_of_image() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    server
        .mock("POST", GEMINI_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{"content": {"parts": [
                    {"text": "I can only describe that, not draw it"}
                ]}}],
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server.url(), "gemini-3-pro-image-preview", &dir);
    let err = client.generate("a red square", None).await.unwrap_err();

    match err {
        Error::TextInsteadOfImage(excerpt) => {
            assert!(excerpt.contains("I can only describe"));
        }
        other => panic!("expected TextInsteadOfImage, got {:?}", other),
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_api_errors_are_returned_without_retrying() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let mock = server
        .mock("POST", GEMINI_PATH)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(json!({"error": {"message": "invalid argument"}}).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url(), "gemini-3-pro-image-preview", &dir);
    let err = client.generate("a red square", None).await.unwrap_err();

    mock.assert_async().await;
    match err {
        Error::Api { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid argument"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_openai_backend_decodes_b64_json() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let mock = server
        .mock("POST", "/v1/images/generations")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::Json(json!({
            "prompt": "a tiny logo",
            "model": "nano-banana-pro",
            "n": 1,
            "size": "1024x1024",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"data": [{"b64_json": png_b64()}]}).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url(), "nano-banana-pro", &dir);
    let result = client
        .generate("a tiny logo", Some("logo.png".to_string()))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(std::fs::read(&result.saved_path).unwrap(), PNG_1X1);
}

#[tokio::test]
async fn test_openai_backend_downloads_url_payloads() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let generations = server
        .mock("POST", "/v1/images/generations")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"data": [{"url": format!("{}/files/out.png", server.url())}]}).to_string(),
        )
        .create_async()
        .await;
    let download = server
        .mock("GET", "/files/out.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(PNG_1X1)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url(), "dall-e-3", &dir);
    let result = client
        .generate("a tiny logo", Some("logo.png".to_string()))
        .await
        .unwrap();

    generations.assert_async().await;
    download.assert_async().await;
    assert_eq!(std::fs::read(&result.saved_path).unwrap(), PNG_1X1);
}

#[tokio::test]
async fn test_reference_fallback_degrades_to_text_only() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    // The prompt must arrive unframed and without any image payload.
    let mock = server
        .mock("POST", "/v1/images/generations")
        .match_body(Matcher::Json(json!({
            "prompt": "neon poster",
            "model": "nano-banana-pro",
            "n": 1,
            "size": "1024x1024",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"data": [{"b64_json": png_b64()}]}).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url(), "nano-banana-pro", &dir);
    let result = client
        .generate_with_references("neon poster", &[vec![1, 2, 3]], ReferenceMode::Style, None)
        .await
        .unwrap();

    mock.assert_async().await;
    let name = result.saved_path.file_name().unwrap().to_string_lossy();
    assert!(
        name.starts_with("infographic_"),
        "fallback should save through the text-only path, got {name}"
    );
}

#[tokio::test]
async fn test_edit_sends_instruction_then_image() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let mock = server
        .mock("POST", GEMINI_PATH)
        .match_body(Matcher::Json(json!({
            "contents": [{"parts": [
                {"text": "make the sky purple"},
                {"inline_data": {"mime_type": "image/png", "data": png_b64()}},
            ]}],
            "generationConfig": {"response_mime_type": "image/png"},
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{"content": {"parts": [
                    {"inlineData": {"mimeType": "image/png", "data": png_b64()}}
                ]}}],
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url(), "gemini-3-pro-image-preview", &dir);
    let result = client
        .edit_with_image("make the sky purple", PNG_1X1, Some("edited.png".to_string()))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(std::fs::read(&result.saved_path).unwrap(), PNG_1X1);
}

#[tokio::test]
async fn test_empty_candidates_is_a_format_error() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    server
        .mock("POST", GEMINI_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"candidates": []}).to_string())
        .create_async()
        .await;

    let client = client_for(&server.url(), "gemini-3-pro-image-preview", &dir);
    let err = client.generate("a red square", None).await.unwrap_err();
    match err {
        Error::ResponseFormat(msg) => assert!(msg.contains("candidates")),
        other => panic!("expected ResponseFormat, got {:?}", other),
    }
}
