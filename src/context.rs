use crate::broker::EnvelopePublisher;
use crate::config::Config;
use crate::db::DbPool;
use std::sync::Arc;

/// Application context containing shared dependencies.
/// Handles are created once at startup and passed by reference to each gate
/// rather than living as ambient globals.
#[derive(Clone)]
pub struct AppContext {
    pub db_pool: Arc<DbPool>,
    pub publisher: Arc<EnvelopePublisher>,
    pub config: Arc<Config>,
}

impl AppContext {
    pub fn new(db_pool: Arc<DbPool>, publisher: Arc<EnvelopePublisher>, config: Arc<Config>) -> Self {
        Self {
            db_pool,
            publisher,
            config,
        }
    }
}
