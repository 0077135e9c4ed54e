//! Gemini REST clients against a loopback server.
//!
//! The server answers each connection with the next canned response and
//! records what it was sent, so tests can check paging, the key header and
//! how HTTP errors map onto the client error types.

use gemini_vision_lib::credentials::Credential;
use gemini_vision_lib::llm::{
    CatalogError, GeminiCatalog, GeminiVision, GenerationError, ModelCatalog, VisionClient,
};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const KEY: &str = "loopback-key-42";

#[derive(Debug, Clone)]
struct Recorded {
    request_line: String,
    head: String,
    body: String,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

/// Serve `responses` in order, one per connection. Returns the API base.
async fn serve(responses: Vec<(u16, String)>) -> (String, Log) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/v1beta", listener.local_addr().unwrap());
    let log: Log = Arc::default();

    let recorded = log.clone();
    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            recorded.lock().unwrap().push(request);

            let reply = format!(
                "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(reply.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
    });

    (base, log)
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> Recorded {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Recorded {
        request_line: head.lines().next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
        head,
    }
}

fn key() -> Credential {
    Credential::parse(KEY).unwrap()
}

fn write_png(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("shot.png");
    image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]))
        .save(&path)
        .unwrap();
    path
}

// ── Catalog ─────────────────────────────────────────────────────────

#[tokio::test]
async fn catalog_follows_pages_and_ranks() {
    let page1 = r#"{
        "models": [
            {"name": "models/gemini-2.0-flash", "displayName": "Gemini 2.0 Flash",
             "supportedGenerationMethods": ["generateContent", "countTokens"]},
            {"name": "models/text-embedding-004",
             "supportedGenerationMethods": ["embedContent"]}
        ],
        "nextPageToken": "page-2"
    }"#;
    let page2 = r#"{
        "models": [
            {"name": "models/gemini-2.5-flash",
             "supportedGenerationMethods": ["generateContent"]},
            {"name": "models/gemini-pro",
             "supportedGenerationMethods": ["generateContent"]}
        ]
    }"#;
    let (base, log) = serve(vec![(200, page1.into()), (200, page2.into())]).await;

    let models = GeminiCatalog::new(&base).fetch_models(&key()).await.unwrap();
    let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["models/gemini-2.5-flash", "models/gemini-2.0-flash"]);
    assert_eq!(models[1].display_name.as_deref(), Some("Gemini 2.0 Flash"));

    let requests = log.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].request_line.starts_with("GET /v1beta/models?"));
    assert!(!requests[0].request_line.contains("pageToken"));
    assert!(requests[1].request_line.contains("pageToken=page-2"));
    for r in &requests {
        assert!(r.head.to_lowercase().contains(&format!("x-goog-api-key: {}", KEY)));
        assert!(!r.request_line.contains(KEY));
    }
}

#[tokio::test]
async fn catalog_http_error_is_auth_or_network() {
    let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
    let (base, _log) = serve(vec![(400, body.into())]).await;

    let err = GeminiCatalog::new(&base).fetch_models(&key()).await.unwrap_err();
    assert_eq!(
        err,
        CatalogError::AuthOrNetwork(
            "HTTP 400: API key not valid. Please pass a valid API key.".to_string()
        )
    );
}

#[tokio::test]
async fn catalog_without_vision_models_is_no_compatible() {
    let body = r#"{"models":[{"name":"models/gemini-pro","supportedGenerationMethods":["generateContent"]}]}"#;
    let (base, _log) = serve(vec![(200, body.into())]).await;

    let err = GeminiCatalog::new(&base).fetch_models(&key()).await.unwrap_err();
    assert_eq!(err, CatalogError::NoCompatibleModels);
}

#[tokio::test]
async fn catalog_unreachable_host_does_not_leak_key() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/v1beta", listener.local_addr().unwrap());
    drop(listener);

    match GeminiCatalog::new(&base).fetch_models(&key()).await {
        Err(CatalogError::AuthOrNetwork(msg)) => assert!(!msg.contains(KEY), "{}", msg),
        other => panic!("expected a transport error, got {:?}", other),
    }
}

// ── Vision ──────────────────────────────────────────────────────────

#[tokio::test]
async fn vision_posts_prompt_and_inline_image() {
    let body = r##"{"candidates":[{"content":{"parts":[{"text":"# Heading\n"},{"text":"text"}]},"finishReason":"STOP"}]}"##;
    let (base, log) = serve(vec![(200, body.into())]).await;
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path());

    let text = GeminiVision::new(&base)
        .generate(&key(), "models/gemini-2.5-flash", "Describe.", &image)
        .await
        .unwrap();
    assert_eq!(text, "# Heading\ntext");

    let request = log.lock().unwrap()[0].clone();
    assert!(request
        .request_line
        .starts_with("POST /v1beta/models/gemini-2.5-flash:generateContent"));
    assert!(!request.request_line.contains(KEY));

    let sent: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    let parts = &sent["contents"][0]["parts"];
    assert_eq!(parts[0]["text"], "Describe.");
    assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
    assert!(!parts[1]["inline_data"]["data"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn vision_quota_error_keeps_server_message() {
    let body = r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
    let (base, _log) = serve(vec![(429, body.into())]).await;
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path());

    let err = GeminiVision::new(&base)
        .generate(&key(), "models/gemini-2.5-flash", "Describe.", &image)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GenerationError::Api {
            status: 429,
            message: "quota exceeded".to_string()
        }
    );
}

#[tokio::test]
async fn vision_error_echoing_key_is_scrubbed() {
    let body = format!(r#"{{"error":{{"message":"bad key {}"}}}}"#, KEY);
    let (base, _log) = serve(vec![(403, body)]).await;
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path());

    let err = GeminiVision::new(&base)
        .generate(&key(), "models/gemini-2.5-flash", "Describe.", &image)
        .await
        .unwrap_err();
    assert!(!err.to_string().contains(KEY), "{}", err);
}

#[tokio::test]
async fn vision_missing_image_fails_before_any_request() {
    let (base, log) = serve(vec![]).await;
    let err = GeminiVision::new(&base)
        .generate(
            &key(),
            "models/gemini-2.5-flash",
            "Describe.",
            std::path::Path::new("/nonexistent/shot.png"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::ImageRead { .. }));
    assert!(log.lock().unwrap().is_empty());
}
