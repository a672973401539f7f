//! Business logic services

pub mod bound_with;
pub mod holdings;
pub mod normalizer;
pub mod patron;
pub mod policies;
pub mod redis;
pub mod session;
pub mod symws;

use std::sync::Arc;

use crate::config::BehaviorsConfig;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub holdings: holdings::HoldingsService,
    pub patron: patron::PatronService,
    pub sessions: Arc<dyn session::SessionStore>,
}

impl Services {
    /// Create all services on top of one symws client and one session store
    pub fn new(
        symws: Arc<dyn symws::SymphonyService>,
        sessions: Arc<dyn session::SessionStore>,
        behaviors: BehaviorsConfig,
    ) -> Self {
        Self {
            holdings: holdings::HoldingsService::new(symws.clone(), sessions.clone(), behaviors.clone()),
            patron: patron::PatronService::new(symws, sessions.clone(), behaviors),
            sessions,
        }
    }
}
