//! Google Gemini implementation of [`GenerativeService`]

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, instrument};

use super::{AiError, Citation, GeneratedImage, GenerativeService, GroundedAnswer, Schema};

/// Environment variable for the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Model for text, JSON and search-grounded requests
pub const TEXT_MODEL: &str = "gemini-3-flash-preview";

/// Model for image synthesis
pub const IMAGE_MODEL: &str = "gemini-2.5-flash-image";

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user_text(text: &str) -> Self {
        Self {
            role: Some("user".to_owned()),
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_owned()),
            inline_data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

impl GeminiResponse {
    fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.as_ref().and_then(|c| c.first())
    }

    /// Concatenated text of the first candidate
    fn text(&self) -> Option<String> {
        let parts = &self.first_candidate()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.is_empty()).then_some(text)
    }

    fn inline_data(&self) -> Option<&InlineData> {
        self.first_candidate()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.inline_data.as_ref())
    }

    fn citations(&self) -> Vec<Citation> {
        self.first_candidate()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| {
                m.grounding_chunks
                    .iter()
                    .map(|chunk| Citation {
                        title: chunk.web.as_ref().and_then(|w| w.title.clone()),
                        uri: chunk.web.as_ref().and_then(|w| w.uri.clone()),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ============================================================================
// Client
// ============================================================================

pub struct GeminiClient {
    api_key: String,
    client: Client,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: API_BASE_URL.to_owned(),
            text_model: TEXT_MODEL.to_owned(),
            image_model: IMAGE_MODEL.to_owned(),
        }
    }

    /// Client keyed from `GEMINI_API_KEY`
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var(GEMINI_API_KEY_ENV)
            .map_err(|_| anyhow::anyhow!("{GEMINI_API_KEY_ENV} environment variable not set"))?;
        Ok(Self::new(api_key))
    }

    /// Point at a different endpoint (proxies, local fakes)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_models(mut self, text_model: impl Into<String>, image_model: impl Into<String>) -> Self {
        self.text_model = text_model.into();
        self.image_model = image_model.into();
        self
    }

    fn build_url(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    async fn send(&self, model: &str, request: &GeminiRequest) -> Result<GeminiResponse, AiError> {
        debug!(model, "sending request to Gemini API");

        let response = self
            .client
            .post(self.build_url(model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(map_api_error(status.as_u16(), &body));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "failed to parse Gemini response");
            AiError::from(e)
        })?;

        if let Some(err) = &parsed.error {
            return Err(AiError::Api {
                status: status.as_u16(),
                message: err.message.clone(),
            });
        }

        Ok(parsed)
    }
}

/// Prefer the JSON error message over the raw body
fn map_api_error(status: u16, body: &str) -> AiError {
    let message = serde_json::from_str::<GeminiResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .map_or_else(|| body.to_owned(), |e| e.message);
    AiError::Api { status, message }
}

#[async_trait]
impl GenerativeService for GeminiClient {
    #[instrument(skip_all)]
    async fn generate_text(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String, AiError> {
        let request = GeminiRequest {
            contents: vec![Content::user_text(prompt)],
            system_instruction: system_instruction.map(|s| Content {
                role: None,
                parts: vec![Part::text(s)],
            }),
            generation_config: None,
            tools: Vec::new(),
        };
        let response = self.send(&self.text_model, &request).await?;
        response.text().ok_or(AiError::EmptyResponse)
    }

    #[instrument(skip_all)]
    async fn generate_json(&self, prompt: &str, schema: Option<&Schema>) -> Result<Value, AiError> {
        let request = GeminiRequest {
            contents: vec![Content::user_text(prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json"),
                response_schema: schema.cloned(),
                ..Default::default()
            }),
            tools: Vec::new(),
        };
        let response = self.send(&self.text_model, &request).await?;
        let text = response.text().ok_or(AiError::EmptyResponse)?;
        Ok(serde_json::from_str(&text)?)
    }

    #[instrument(skip_all, fields(aspect_ratio = %aspect_ratio))]
    async fn generate_image(&self, prompt: &str, aspect_ratio: &str) -> Result<GeneratedImage, AiError> {
        let request = GeminiRequest {
            contents: vec![Content::user_text(prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: aspect_ratio.to_owned(),
                }),
                ..Default::default()
            }),
            tools: Vec::new(),
        };
        let response = self.send(&self.image_model, &request).await?;
        let inline = response.inline_data().ok_or(AiError::EmptyResponse)?;
        let data = STANDARD
            .decode(&inline.data)
            .map_err(|e| AiError::Decode(format!("invalid base64 image: {e}")))?;
        Ok(GeneratedImage {
            mime_type: inline.mime_type.clone(),
            aspect_ratio: aspect_ratio.to_owned(),
            data,
        })
    }

    #[instrument(skip_all)]
    async fn search_grounded(&self, prompt: &str) -> Result<GroundedAnswer, AiError> {
        let request = GeminiRequest {
            contents: vec![Content::user_text(prompt)],
            system_instruction: None,
            generation_config: None,
            tools: vec![Tool {
                google_search: Value::Object(Default::default()),
            }],
        };
        let response = self.send(&self.text_model, &request).await?;
        Ok(GroundedAnswer {
            text: response.text().unwrap_or_default(),
            citations: response.citations(),
        })
    }
}

impl Debug for GeminiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_uses_camel_case_fields() {
        let schema = Schema::array(Schema::String);
        let request = GeminiRequest {
            contents: vec![Content::user_text("oi")],
            system_instruction: Some(Content { role: None, parts: vec![Part::text("sys")] }),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json"),
                response_schema: Some(schema),
                ..Default::default()
            }),
            tools: Vec::new(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_search_tool_shape() {
        let request = GeminiRequest {
            contents: vec![Content::user_text("oi")],
            system_instruction: None,
            generation_config: None,
            tools: vec![Tool { google_search: json!({}) }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["tools"], json!([{ "googleSearch": {} }]));
    }

    #[test]
    fn test_response_extracts_text_image_and_citations() {
        let body = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [
                    { "text": "olá " },
                    { "inlineData": { "mimeType": "image/png", "data": "aGk=" } },
                    { "text": "mundo" }
                ]},
                "groundingMetadata": { "groundingChunks": [
                    { "web": { "uri": "https://youtube.com/watch?v=1", "title": "Vídeo" } },
                    { "retrievedContext": {} }
                ]}
            }]
        });
        let response: GeminiResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.text().as_deref(), Some("olá mundo"));
        assert_eq!(response.inline_data().unwrap().data, "aGk=");
        let citations = response.citations();
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].title.as_deref(), Some("Vídeo"));
        assert_eq!(citations[1].uri, None);
    }

    #[test]
    fn test_map_api_error_prefers_json_message() {
        let err = map_api_error(400, r#"{"error":{"message":"bad key"}}"#);
        assert!(matches!(err, AiError::Api { status: 400, ref message } if message == "bad key"));

        let err = map_api_error(502, "gateway");
        assert!(matches!(err, AiError::Api { status: 502, ref message } if message == "gateway"));
    }

    /// Answer one HTTP request with `status` and `body`; yields the raw request
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn test_generate_text_against_local_endpoint() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Bora!"}]}}]}"#;
        let (url, server) = serve_once("200 OK", body).await;
        let client = GeminiClient::new("test-key")
            .with_base_url(url)
            .with_models("text-model", "image-model");

        let reply = client.generate_text("oi", Some("sys")).await.unwrap();
        assert_eq!(reply, "Bora!");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /models/text-model:generateContent"));
        assert!(request.to_lowercase().contains("x-goog-api-key: test-key"));
        assert!(request.contains(r#""systemInstruction""#));
    }

    #[tokio::test]
    async fn test_api_error_from_local_endpoint() {
        let body = r#"{"error":{"message":"quota exceeded"}}"#;
        let (url, server) = serve_once("429 Too Many Requests", body).await;
        let client = GeminiClient::new("k").with_base_url(url);

        let err = client.generate_json("oi", None).await.unwrap_err();
        assert!(matches!(err, AiError::Api { status: 429, ref message } if message == "quota exceeded"));
        assert!(server.await.unwrap().contains(&format!("/models/{TEXT_MODEL}:generateContent")));
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = GeminiClient::new("secret-key");
        assert!(!format!("{client:?}").contains("secret-key"));
    }
}
