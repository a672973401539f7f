//! Holdings and status lookups for catalog records

use std::sync::Arc;

use crate::{
    config::BehaviorsConfig,
    error::AppResult,
    models::{Holding, PickUpLocation},
    services::{
        bound_with,
        normalizer::{self, DisplayMode, NormalizeOptions, TitleContext},
        policies::PolicyCache,
        session::SessionStore,
        symws::SymphonyService,
    },
};

/// Outcome of one id in a batch status lookup
#[derive(Debug)]
pub struct StatusLookup {
    pub id: String,
    pub result: AppResult<Vec<Holding>>,
}

#[derive(Clone)]
pub struct HoldingsService {
    symws: Arc<dyn SymphonyService>,
    sessions: Arc<dyn SessionStore>,
    behaviors: BehaviorsConfig,
}

impl HoldingsService {
    pub fn new(
        symws: Arc<dyn SymphonyService>,
        sessions: Arc<dyn SessionStore>,
        behaviors: BehaviorsConfig,
    ) -> Self {
        Self {
            symws,
            sessions,
            behaviors,
        }
    }

    /// Policy tables of a session
    pub fn policies(&self, session_id: &str) -> PolicyCache {
        PolicyCache::new(self.sessions.clone(), session_id)
    }

    /// Holdings of one title, in call group then item order
    pub async fn get_holding(
        &self,
        session_id: &str,
        id: &str,
        display_mode: DisplayMode,
    ) -> AppResult<Vec<Holding>> {
        let policies = self.policies(session_id).ensure_all(self.symws.as_ref()).await?;

        let record = self.symws.lookup_title_info(id).await?;
        let is_holdable = record.holdable;
        let base_call_number = record.base_call_number.clone();

        let resolved = bound_with::resolve(self.symws.as_ref(), record).await?;

        let title = TitleContext {
            requested_id: id,
            base_call_number: base_call_number.as_deref(),
            is_holdable,
        };
        let options = NormalizeOptions::new(&self.behaviors, display_mode);
        let holdings = normalizer::normalize(title, &resolved, &policies, &options);

        tracing::debug!("Title {} resolved to {} holdings", id, holdings.len());
        Ok(holdings)
    }

    pub async fn get_status(
        &self,
        session_id: &str,
        id: &str,
        display_mode: DisplayMode,
    ) -> AppResult<Vec<Holding>> {
        self.get_holding(session_id, id, display_mode).await
    }

    /// Status of many titles; a failing id is reported in its own slot
    pub async fn get_statuses(
        &self,
        session_id: &str,
        ids: &[String],
        display_mode: DisplayMode,
    ) -> Vec<StatusLookup> {
        let mut statuses = Vec::with_capacity(ids.len());
        for id in ids {
            let result = self.get_status(session_id, id, display_mode).await;
            if let Err(e) = &result {
                tracing::warn!("Status lookup failed for {}: {}", id, e);
            }
            statuses.push(StatusLookup {
                id: id.clone(),
                result,
            });
        }
        statuses
    }

    pub async fn get_pick_up_locations(&self, session_id: &str) -> AppResult<Vec<PickUpLocation>> {
        self.policies(session_id)
            .pick_up_locations(self.symws.as_ref())
            .await
    }
}
