//! Shared application state.

use std::sync::Arc;

use {
    gembot_config::Settings,
    gembot_gemini::GeminiClient,
    gembot_media::{PdfRasterizer, PdfiumRasterizer, Scratch},
    gembot_sessions::{MemorySessionStore, SessionStore},
    gembot_whatsapp::WhatsAppClient,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: Arc<dyn SessionStore>,
    pub whatsapp: WhatsAppClient,
    pub gemini: GeminiClient,
    pub rasterizer: Arc<dyn PdfRasterizer>,
    pub scratch: Scratch,
}

impl AppState {
    /// Production wiring: real API bases, in-memory sessions, system pdfium.
    pub fn new(settings: Settings) -> Self {
        let whatsapp = WhatsAppClient::new(settings.phone_id.clone(), settings.wa_token.clone());
        let gemini = GeminiClient::new(settings.model_name.clone(), settings.gen_api_key.clone());
        Self {
            settings: Arc::new(settings),
            sessions: Arc::new(MemorySessionStore::new()),
            whatsapp,
            gemini,
            rasterizer: Arc::new(PdfiumRasterizer::new()),
            scratch: Scratch::system(),
        }
    }
}
