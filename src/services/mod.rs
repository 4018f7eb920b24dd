use crate::config::AppConfig;
use crate::llm::AnswerProvider;
use crate::services::session::SessionService;
use crate::store::ContextStore;
use crate::translate::Translator;
use std::sync::Arc;

pub mod session;

// A container for all services to be injected into routes
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<SessionService>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn ContextStore>,
        answerers: Vec<Arc<dyn AnswerProvider>>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        let pivot = config
            .translation
            .languages
            .first()
            .cloned()
            .unwrap_or_else(|| "en".to_string());

        Self {
            config,
            sessions: Arc::new(SessionService::new(store, answerers, translator, pivot)),
        }
    }
}
