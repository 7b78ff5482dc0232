//! HTTP client for the generative-language REST API.

use {
    gembot_sessions::Turn,
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, info, warn},
};

use crate::{
    error::{Error, Result},
    types::{
        Content, FileInfo, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
        ListFilesResponse, Part, UploadFileResponse, default_safety_settings,
    },
};

/// Production API base.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Gemini API client bound to one model.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Secret<String>,
}

impl GeminiClient {
    pub fn new(model: impl Into<String>, api_key: Secret<String>) -> Self {
        Self::with_base_url(DEFAULT_API_BASE, model, api_key)
    }

    /// Point the client at a different API base (tests use a mock server).
    pub fn with_base_url(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Secret<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        }
    }

    fn key(&self) -> [(&'static str, &str); 1] {
        [("key", self.api_key.expose_secret())]
    }

    /// Generate the next model reply for a full conversation history.
    pub async fn chat(&self, history: &[Turn]) -> Result<String> {
        let contents: Vec<Content> = history.iter().map(Content::from).collect();
        self.generate(contents, "chat").await
    }

    /// One-shot description of an uploaded file, independent of any session
    /// history: `["What is this", <file>]`.
    pub async fn describe_file(&self, file: &FileInfo) -> Result<String> {
        let contents = vec![Content {
            role: "user".into(),
            parts: vec![
                Part::text("What is this"),
                Part::file(file.mime_type.clone(), file.uri.clone()),
            ],
        }];
        self.generate(contents, "describe file").await
    }

    async fn generate(&self, contents: Vec<Content>, operation: &'static str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GenerateContentRequest {
            contents,
            generation_config: GenerationConfig::default(),
            safety_settings: default_safety_settings(),
        };

        let response = self
            .http
            .post(&url)
            .query(&self.key())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::ApiStatus {
                operation,
                status: response.status(),
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        let text = body.first_text().ok_or(Error::EmptyResponse)?.to_string();
        debug!(operation, reply_len = text.len(), "gemini reply received");
        Ok(text)
    }

    /// Upload raw media bytes to the file store.
    pub async fn upload_file(&self, bytes: Vec<u8>, mime_type: &str) -> Result<FileInfo> {
        let url = format!("{}/upload/v1beta/files", self.base_url);
        let byte_count = bytes.len();

        let response = self
            .http
            .post(&url)
            .query(&self.key())
            .query(&[("uploadType", "media")])
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::ApiStatus {
                operation: "upload file",
                status: response.status(),
            });
        }

        let uploaded: UploadFileResponse = response.json().await?;
        debug!(
            name = %uploaded.file.name,
            bytes = byte_count,
            "file uploaded to gemini store"
        );
        Ok(uploaded.file)
    }

    /// List every file currently in the file store.
    pub async fn list_files(&self) -> Result<Vec<FileInfo>> {
        let url = format!("{}/v1beta/files", self.base_url);
        let response = self.http.get(&url).query(&self.key()).send().await?;

        if !response.status().is_success() {
            return Err(Error::ApiStatus {
                operation: "list files",
                status: response.status(),
            });
        }

        let listing: ListFilesResponse = response.json().await?;
        Ok(listing.files)
    }

    /// Delete one file by resource name (`files/...`).
    pub async fn delete_file(&self, name: &str) -> Result<()> {
        let url = format!("{}/v1beta/{}", self.base_url, name);
        let response = self.http.delete(&url).query(&self.key()).send().await?;

        if !response.status().is_success() {
            return Err(Error::ApiStatus {
                operation: "delete file",
                status: response.status(),
            });
        }
        debug!(name, "gemini file deleted");
        Ok(())
    }

    /// Delete every file in the store. Returns how many were removed.
    ///
    /// This is the global sweep the relay used to run after every media
    /// message; it now backs the `files sweep` maintenance command instead.
    pub async fn sweep_files(&self) -> Result<usize> {
        let files = self.list_files().await?;
        let mut removed = 0usize;
        for file in &files {
            match self.delete_file(&file.name).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(name = %file.name, error = %e, "sweep: delete failed"),
            }
        }
        info!(removed, total = files.len(), "gemini file store swept");
        Ok(removed)
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use {super::*, gembot_sessions::Turn};

    fn client(base: &str) -> GeminiClient {
        GeminiClient::with_base_url(base, "gemini-1.5-flash-latest", Secret::new("gem-key".into()))
    }

    fn reply_body(text: &str) -> String {
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] }
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn chat_sends_full_history_and_parses_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                "/v1beta/models/gemini-1.5-flash-latest:generateContent",
            )
            .match_query(mockito::Matcher::UrlEncoded("key".into(), "gem-key".into()))
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "contents": [
                    { "role": "user", "parts": [{ "text": "persona seed" }] },
                    { "role": "user", "parts": [{ "text": "hello" }] }
                ],
                "generationConfig": { "maxOutputTokens": 8192 }
            })))
            .with_body(reply_body("hi, I am the bot"))
            .create_async()
            .await;

        let history = vec![Turn::user("persona seed"), Turn::user("hello")];
        let reply = client(&server.url()).chat(&history).await.unwrap();
        assert_eq!(reply, "hi, I am the bot");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn describe_file_is_one_shot() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                "/v1beta/models/gemini-1.5-flash-latest:generateContent",
            )
            .match_query(mockito::Matcher::Any)
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "What is this" },
                        { "fileData": { "mimeType": "image/jpeg", "fileUri": "uri-1" } }
                    ]
                }]
            })))
            .with_body(reply_body("a photo of a cat"))
            .create_async()
            .await;

        let file = FileInfo {
            name: "files/x".into(),
            uri: "uri-1".into(),
            mime_type: "image/jpeg".into(),
        };
        let description = client(&server.url()).describe_file(&file).await.unwrap();
        assert_eq!(description, "a photo of a cat");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_candidates_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "POST",
                "/v1beta/models/gemini-1.5-flash-latest:generateContent",
            )
            .match_query(mockito::Matcher::Any)
            .with_body("{}")
            .create_async()
            .await;

        let err = client(&server.url())
            .chat(&[Turn::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyResponse));
    }

    #[tokio::test]
    async fn upload_file_posts_bytes_with_mime() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload/v1beta/files")
            .match_query(mockito::Matcher::Any)
            .match_header("content-type", "image/jpeg")
            .with_body(
                serde_json::json!({
                    "file": { "name": "files/up-1", "uri": "uri-up-1", "mimeType": "image/jpeg" }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let file = client(&server.url())
            .upload_file(b"jpeg".to_vec(), "image/jpeg")
            .await
            .unwrap();
        assert_eq!(file.name, "files/up-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn sweep_deletes_every_listed_file() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1beta/files")
            .match_query(mockito::Matcher::Any)
            .with_body(
                serde_json::json!({
                    "files": [
                        { "name": "files/a" },
                        { "name": "files/b" }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let del_a = server
            .mock("DELETE", "/v1beta/files/a")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .create_async()
            .await;
        let del_b = server
            .mock("DELETE", "/v1beta/files/b")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .create_async()
            .await;

        let removed = client(&server.url()).sweep_files().await.unwrap();
        assert_eq!(removed, 2);
        del_a.assert_async().await;
        del_b.assert_async().await;
    }
}
