//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use devotional_core::orchestrator::Orchestrator;
use devotional_core::ports::{Clock, PersistenceStore, SystemClock, VerseTextLookup};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub store: Arc<dyn PersistenceStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn PersistenceStore>,
        lookup: Arc<dyn VerseTextLookup>,
    ) -> Self {
        Self::with_clock(config, store, lookup, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: Arc<Config>,
        store: Arc<dyn PersistenceStore>,
        lookup: Arc<dyn VerseTextLookup>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let orchestrator = Orchestrator::new(store.clone(), lookup)
            .with_clock(clock)
            .with_lookup_timeout(config.verse_lookup_timeout);
        Self {
            orchestrator: Arc::new(orchestrator),
            store,
            config,
        }
    }
}
