use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::services::review::ReviewThresholds;
use crate::store::LearningStore;

pub struct AppState<S> {
    started_at: Instant,
    store: Arc<S>,
    config: Arc<Config>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            started_at: self.started_at,
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: LearningStore> AppState<S> {
    pub fn new(store: Arc<S>, config: Config) -> Self {
        Self {
            started_at: Instant::now(),
            store,
            config: Arc::new(config),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn review_thresholds(&self) -> &ReviewThresholds {
        &self.config.review
    }
}
