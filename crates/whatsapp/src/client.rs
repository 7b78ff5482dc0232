//! Thin Graph API client for outbound sends and media retrieval.

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    tracing::{debug, info},
};

use crate::error::{Error, Result};

/// Production Graph API base.
pub const DEFAULT_GRAPH_BASE: &str = "https://graph.facebook.com/v18.0";

/// Outbound text payload for `POST /{phone_id}/messages`.
#[derive(Debug, Serialize)]
struct SendTextRequest<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    message_type: &'static str,
    text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

/// Media metadata response for `GET /{media_id}/`. The `url` is short-lived.
#[derive(Debug, Deserialize)]
struct MediaMetadata {
    url: String,
}

/// WhatsApp Graph API client.
#[derive(Clone)]
pub struct WhatsAppClient {
    http: reqwest::Client,
    base_url: String,
    phone_id: String,
    token: Secret<String>,
}

impl WhatsAppClient {
    pub fn new(phone_id: impl Into<String>, token: Secret<String>) -> Self {
        Self::with_base_url(DEFAULT_GRAPH_BASE, phone_id, token)
    }

    /// Point the client at a different Graph base URL (tests use a mock
    /// server here).
    pub fn with_base_url(
        base_url: impl Into<String>,
        phone_id: impl Into<String>,
        token: Secret<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            phone_id: phone_id.into(),
            token,
        }
    }

    fn bearer(&self) -> &str {
        self.token.expose_secret()
    }

    /// Send a text message to `to`.
    ///
    /// Fire-and-forget from the relay's perspective: delivery receipts come
    /// back through the webhook, not through this response.
    pub async fn send_text(&self, to: &str, body: &str) -> Result<()> {
        let url = format!("{}/{}/messages", self.base_url, self.phone_id);
        let request = SendTextRequest {
            messaging_product: "whatsapp",
            to,
            message_type: "text",
            text: TextBody { body },
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.bearer())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::ApiStatus {
                operation: "send message",
                status: response.status(),
            });
        }

        info!(to, body_len = body.len(), "whatsapp text sent");
        Ok(())
    }

    /// Fetch the short-lived download URL for a media reference id.
    pub async fn media_url(&self, media_id: &str) -> Result<String> {
        let url = format!("{}/{}/", self.base_url, media_id);
        let response = self.http.get(&url).bearer_auth(self.bearer()).send().await?;

        if !response.status().is_success() {
            return Err(Error::ApiStatus {
                operation: "media metadata",
                status: response.status(),
            });
        }

        let metadata: MediaMetadata = response.json().await?;
        debug!(media_id, "resolved media download url");
        Ok(metadata.url)
    }

    /// Download media bytes from a URL obtained via [`Self::media_url`].
    /// The download endpoint requires the same bearer token.
    pub async fn download_media(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).bearer_auth(self.bearer()).send().await?;

        if !response.status().is_success() {
            return Err(Error::ApiStatus {
                operation: "media download",
                status: response.status(),
            });
        }

        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), "media downloaded");
        Ok(bytes.to_vec())
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> WhatsAppClient {
        WhatsAppClient::with_base_url(base, "555000", Secret::new("wa-token".into()))
    }

    #[tokio::test]
    async fn send_text_posts_expected_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/555000/messages")
            .match_header("authorization", "Bearer wa-token")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "messaging_product": "whatsapp",
                "to": "15550001111",
                "type": "text",
                "text": { "body": "hello there" }
            })))
            .with_status(200)
            .with_body(r#"{"messages":[{"id":"wamid.X"}]}"#)
            .create_async()
            .await;

        client(&server.url())
            .send_text("15550001111", "hello there")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn send_text_surfaces_api_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/555000/messages")
            .with_status(401)
            .create_async()
            .await;

        let err = client(&server.url())
            .send_text("15550001111", "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ApiStatus { status, .. } if status.as_u16() == 401));
    }

    #[tokio::test]
    async fn media_url_parses_metadata() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/media-42/")
            .match_header("authorization", "Bearer wa-token")
            .with_body(r#"{"url":"https://lookaside.example/media-42","mime_type":"image/jpeg"}"#)
            .create_async()
            .await;

        let url = client(&server.url()).media_url("media-42").await.unwrap();
        assert_eq!(url, "https://lookaside.example/media-42");
    }

    #[tokio::test]
    async fn download_media_returns_bytes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/blob")
            .match_header("authorization", "Bearer wa-token")
            .with_body(&b"\xff\xd8jpeg-bytes"[..])
            .create_async()
            .await;

        let bytes = client(&server.url())
            .download_media(&format!("{}/blob", server.url()))
            .await
            .unwrap();
        assert_eq!(bytes, b"\xff\xd8jpeg-bytes");
    }
}
