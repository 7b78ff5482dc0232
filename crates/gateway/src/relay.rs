//! The relay pipeline: session resolution, type dispatch, model round trips
//! and outbound delivery.

use {
    gembot_gemini::FileInfo,
    gembot_media::remove_quietly,
    gembot_sessions::{Session, persona_seed},
    gembot_whatsapp::{MessageKind, WebhookPayload},
    tracing::{debug, info, warn},
};

use crate::{error::RelayError, state::AppState};

/// Notice sent back for message types the relay does not handle.
pub const UNSUPPORTED_NOTICE: &str = "This format is not supported by the bot \u{2639}";

/// Wrapper instruction for voice and image descriptions fed into a session.
const MEDIA_WRAPPER: &str = "This is a voice/image message from the user transcribed by an \
                             LLM model, reply to the user based on the transcription: ";

/// Wrapper instruction for per-page document descriptions.
const PAGE_WRAPPER: &str = "This message is created by an LLM model based on the image \
                            prompt of user, reply to the user based on this: ";

/// Outcome reported to the webhook caller. Both map to HTTP 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStatus {
    Ok,
    UnsupportedFormat,
}

impl IngestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::UnsupportedFormat => "unsupported_format",
        }
    }
}

/// Handle one webhook delivery end to end.
///
/// Errors bubble to the HTTP handler where they are logged and acknowledged
/// with 200 regardless; only the status string distinguishes the unsupported
/// path.
pub async fn handle_payload(
    state: &AppState,
    payload: WebhookPayload,
) -> Result<IngestStatus, RelayError> {
    let inbound = payload.first_message().map_err(RelayError::Parse)?;
    let sender = inbound.sender_id.clone();

    // Unsupported formats never touch the model or the session store.
    if let MessageKind::Unsupported(ref message_type) = inbound.kind {
        info!(sender = %sender, message_type, "unsupported message type");
        state
            .whatsapp
            .send_text(&sender, UNSUPPORTED_NOTICE)
            .await
            .map_err(RelayError::Send)?;
        return Ok(IngestStatus::UnsupportedFormat);
    }

    // Lazy session creation: the persona seed is committed to the store
    // before any reply is generated.
    let persona = persona_seed(&state.settings.bot_name, &state.settings.owner_name);
    let (mut session, created) = state.sessions.get_or_create(&sender, &persona).await;
    if created {
        info!(sender = %sender, "session created");
    }

    match inbound.kind {
        MessageKind::Text(body) => {
            relay_text(state, &mut session, &sender, body).await?;
        },
        MessageKind::Audio(media_id) => {
            let bytes = fetch_media(state, &media_id).await?;
            describe_and_reply(state, &mut session, &sender, &bytes, "audio/mpeg", "mp3", MEDIA_WRAPPER)
                .await?;
        },
        MessageKind::Image(media_id) => {
            let bytes = fetch_media(state, &media_id).await?;
            describe_and_reply(state, &mut session, &sender, &bytes, "image/jpeg", "jpg", MEDIA_WRAPPER)
                .await?;
        },
        MessageKind::Document(media_id) => {
            let bytes = fetch_media(state, &media_id).await?;
            relay_document(state, &mut session, &sender, bytes).await?;
        },
        MessageKind::Unsupported(_) => unreachable!("handled above"),
    }

    // Commit point: store the mutated conversation back under the sender.
    state.sessions.put(session).await;
    Ok(IngestStatus::Ok)
}

async fn relay_text(
    state: &AppState,
    session: &mut Session,
    sender: &str,
    body: String,
) -> Result<(), RelayError> {
    debug!(sender, turns = session.len(), "text message");
    session.push_user(body);

    let reply = state
        .gemini
        .chat(&session.history)
        .await
        .map_err(RelayError::Model)?;
    state
        .whatsapp
        .send_text(sender, &reply)
        .await
        .map_err(RelayError::Send)?;

    session.push_model(reply);
    Ok(())
}

async fn fetch_media(state: &AppState, media_id: &str) -> Result<Vec<u8>, RelayError> {
    let url = state
        .whatsapp
        .media_url(media_id)
        .await
        .map_err(RelayError::MediaFetch)?;
    state
        .whatsapp
        .download_media(&url)
        .await
        .map_err(RelayError::MediaFetch)
}

/// Document path: every page rendered and relayed independently, one
/// outbound message per page, in page order.
async fn relay_document(
    state: &AppState,
    session: &mut Session,
    sender: &str,
    bytes: Vec<u8>,
) -> Result<(), RelayError> {
    let pages = state
        .rasterizer
        .rasterize(&bytes)
        .map_err(RelayError::Rasterize)?;
    info!(sender, pages = pages.len(), "document rasterized");

    for (page_index, jpeg) in pages.iter().enumerate() {
        debug!(sender, page = page_index, "relaying document page");
        describe_and_reply(state, session, sender, jpeg, "image/jpeg", "jpg", PAGE_WRAPPER).await?;
    }
    Ok(())
}

/// One upload → describe → feed-into-session → send-reply cycle. The scratch
/// file is removed before the function returns, so the next page's write
/// never observes a stale file; the uploaded model file is deleted as well
/// (only the files this request created, never a global sweep).
async fn describe_and_reply(
    state: &AppState,
    session: &mut Session,
    sender: &str,
    bytes: &[u8],
    mime_type: &str,
    extension: &str,
    wrapper: &str,
) -> Result<(), RelayError> {
    let scratch = state
        .scratch
        .write(bytes, extension)
        .await
        .map_err(RelayError::Scratch)?;
    let staged = tokio::fs::read(&scratch)
        .await
        .map_err(|e| RelayError::Scratch(e.into()))?;

    let uploaded = state
        .gemini
        .upload_file(staged, mime_type)
        .await
        .map_err(RelayError::Model)?;

    let result = describe_into_session(state, session, sender, &uploaded, wrapper).await;

    // Cleanup runs on success and failure alike; an error between download
    // and deletion must not leak the scratch file.
    remove_quietly(&[scratch]).await;
    cleanup_upload(state, &uploaded).await;

    result
}

async fn describe_into_session(
    state: &AppState,
    session: &mut Session,
    sender: &str,
    uploaded: &FileInfo,
    wrapper: &str,
) -> Result<(), RelayError> {
    let description = state
        .gemini
        .describe_file(uploaded)
        .await
        .map_err(RelayError::Model)?;

    session.push_user(format!("{wrapper}{description}"));
    let reply = state
        .gemini
        .chat(&session.history)
        .await
        .map_err(RelayError::Model)?;
    state
        .whatsapp
        .send_text(sender, &reply)
        .await
        .map_err(RelayError::Send)?;
    session.push_model(reply);
    Ok(())
}

/// Delete the file this request uploaded from the model file store. Failure
/// is logged, not propagated: the reply already went out.
async fn cleanup_upload(state: &AppState, uploaded: &FileInfo) {
    if let Err(e) = state.gemini.delete_file(&uploaded.name).await {
        warn!(name = %uploaded.name, error = %e, "uploaded file cleanup failed");
    }
}
