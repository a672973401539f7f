//! Session-scoped memoization of the policy code tables

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{
        policy::flatten_policy_groups, PickUpLocation, Policies, PolicyKind, PolicyTable,
    },
    services::{
        session::{session_key, SessionStore},
        symws::SymphonyService,
    },
};

/// Policy tables of one session.
///
/// A table is fetched from symws on first need, stored whole, and read back
/// unchanged for the rest of the session. Failed lookups are not stored.
#[derive(Clone)]
pub struct PolicyCache {
    store: Arc<dyn SessionStore>,
    session_id: String,
}

impl PolicyCache {
    pub fn new(store: Arc<dyn SessionStore>, session_id: impl Into<String>) -> Self {
        Self {
            store,
            session_id: session_id.into(),
        }
    }

    pub async fn ensure_libraries(&self, symws: &dyn SymphonyService) -> AppResult<PolicyTable> {
        self.ensure(PolicyKind::Libraries, symws).await
    }

    pub async fn ensure_locations(&self, symws: &dyn SymphonyService) -> AppResult<PolicyTable> {
        self.ensure(PolicyKind::Locations, symws).await
    }

    pub async fn ensure_types(&self, symws: &dyn SymphonyService) -> AppResult<PolicyTable> {
        self.ensure(PolicyKind::Types, symws).await
    }

    /// Load all three tables; the first failure aborts
    pub async fn ensure_all(&self, symws: &dyn SymphonyService) -> AppResult<Policies> {
        Ok(Policies {
            libraries: self.ensure_libraries(symws).await?,
            locations: self.ensure_locations(symws).await?,
            types: self.ensure_types(symws).await?,
        })
    }

    /// Drop every table of this session (session teardown)
    pub async fn invalidate(&self) -> AppResult<()> {
        for kind in PolicyKind::ALL {
            self.store.remove(&self.key(kind)).await?;
        }
        tracing::debug!("Policy tables cleared for session {}", self.session_id);
        Ok(())
    }

    /// Libraries offered as hold pickup locations
    pub async fn pick_up_locations(&self, symws: &dyn SymphonyService) -> AppResult<Vec<PickUpLocation>> {
        let libraries = self.ensure_libraries(symws).await?;
        Ok(libraries
            .into_iter()
            .map(|(location_id, location_display)| PickUpLocation {
                location_id,
                location_display,
            })
            .collect())
    }

    fn key(&self, kind: PolicyKind) -> String {
        session_key(&self.session_id, kind.key_suffix())
    }

    async fn ensure(&self, kind: PolicyKind, symws: &dyn SymphonyService) -> AppResult<PolicyTable> {
        let key = self.key(kind);

        if let Some(cached) = self.store.get(&key).await? {
            match serde_json::from_str::<PolicyTable>(&cached) {
                Ok(table) => return Ok(table),
                Err(e) => tracing::warn!("Ignoring unreadable cached {}: {}", kind.key_suffix(), e),
            }
        }

        let groups = match kind {
            PolicyKind::Libraries => symws.lookup_library_policies().await?,
            PolicyKind::Locations => symws.lookup_location_policies().await?,
            PolicyKind::Types => symws.lookup_item_type_policies().await?,
        };
        let table = flatten_policy_groups(groups);
        tracing::info!(
            "Loaded {} {} for session {}",
            table.len(),
            kind.key_suffix(),
            self.session_id
        );

        // Concurrent populators may race; last write wins
        let serialized = serde_json::to_string(&table)
            .map_err(|e| AppError::Internal(format!("Failed to serialize policy table: {}", e)))?;
        self.store.set(&key, &serialized).await?;

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::PolicyCode,
        models::PolicyGroup,
        services::{session::MemorySessionStore, symws::MockSymphonyService},
    };

    fn groups(entries: &[(&str, &str)]) -> Vec<PolicyGroup> {
        vec![PolicyGroup {
            entries: entries
                .iter()
                .map(|(code, description)| PolicyCode {
                    code: code.to_string(),
                    description: description.to_string(),
                })
                .collect(),
        }]
    }

    #[tokio::test]
    async fn test_second_call_uses_cache() {
        let mut symws = MockSymphonyService::new();
        symws
            .expect_lookup_library_policies()
            .times(1)
            .returning(|| Ok(groups(&[("MAIN", "Main Library")])));

        let cache = PolicyCache::new(Arc::new(MemorySessionStore::new()), "s1");
        let first = cache.ensure_libraries(&symws).await.unwrap();
        let second = cache.ensure_libraries(&symws).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.get("MAIN").map(String::as_str), Some("Main Library"));
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let mut symws = MockSymphonyService::new();
        let mut seq = mockall::Sequence::new();
        symws
            .expect_lookup_location_policies()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(AppError::ExternalService("down".to_string())));
        symws
            .expect_lookup_location_policies()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(groups(&[("STACKS", "Stacks")])));

        let cache = PolicyCache::new(Arc::new(MemorySessionStore::new()), "s1");
        let err = cache.ensure_locations(&symws).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));

        let table = cache.ensure_locations(&symws).await.unwrap();
        assert_eq!(table.get("STACKS").map(String::as_str), Some("Stacks"));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated_and_invalidate() {
        let mut symws = MockSymphonyService::new();
        symws
            .expect_lookup_item_type_policies()
            .times(3)
            .returning(|| Ok(groups(&[("BOOK", "Book")])));

        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let a = PolicyCache::new(store.clone(), "a");
        let b = PolicyCache::new(store.clone(), "b");

        a.ensure_types(&symws).await.unwrap();
        b.ensure_types(&symws).await.unwrap();
        a.ensure_types(&symws).await.unwrap();

        a.invalidate().await.unwrap();
        assert!(store.get("symws:a:policies.types").await.unwrap().is_none());
        assert!(store.get("symws:b:policies.types").await.unwrap().is_some());
        a.ensure_types(&symws).await.unwrap();
    }

    #[tokio::test]
    async fn test_pick_up_locations_follow_library_order() {
        let mut symws = MockSymphonyService::new();
        symws
            .expect_lookup_library_policies()
            .times(1)
            .returning(|| Ok(groups(&[("MAIN", "Main Library"), ("LAW", "Law Library")])));

        let cache = PolicyCache::new(Arc::new(MemorySessionStore::new()), "s1");
        let locations = cache.pick_up_locations(&symws).await.unwrap();

        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].location_id, "MAIN");
        assert_eq!(locations[1].location_display, "Law Library");
    }
}
