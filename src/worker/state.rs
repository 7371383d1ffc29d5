use crate::config::Config;
use crate::db::DbPool;
use std::sync::Arc;

/// Shared state for the persistence worker
#[derive(Clone)]
pub struct WorkerState {
    pub db_pool: DbPool,
    pub config: Arc<Config>,
}

impl WorkerState {
    pub fn new(db_pool: DbPool, config: Arc<Config>) -> Self {
        Self { db_pool, config }
    }
}
