//! Project lookup with an optional time-bounded cache.
//!
//! Every tool resolves its `project` argument before doing anything else, so
//! repeated calls against the same project would otherwise cost an extra
//! round trip each.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use log::debug;

use ado_mcp_client::{DevOpsApi, Result};
use ado_mcp_common::{Config, Project};

struct CachedProject {
    project: Project,
    stored_at: Instant,
}

/// Concurrent map of resolved projects that expire after a fixed lifetime.
pub struct ProjectCache {
    entries: DashMap<String, CachedProject>,
    ttl: Duration,
}

impl ProjectCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns a live entry, evicting it if it has expired.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Project> {
        if let Some(entry) = self.entries.get(key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.project.clone());
            }
        }

        self.entries
            .remove_if(key, |_, entry| entry.stored_at.elapsed() >= self.ttl);
        None
    }

    pub fn insert(&self, key: impl Into<String>, project: Project) {
        self.entries.insert(
            key.into(),
            CachedProject {
                project,
                stored_at: Instant::now(),
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Resolves project names or ids to projects, consulting the cache first.
///
/// Only successful lookups are cached; a missing project is asked for again
/// on the next call.
pub struct ProjectResolver {
    api: Arc<dyn DevOpsApi>,
    cache: Option<ProjectCache>,
}

impl ProjectResolver {
    /// Resolver without caching.
    #[must_use]
    pub fn new(api: Arc<dyn DevOpsApi>) -> Self {
        Self { api, cache: None }
    }

    /// Resolver that caches projects for `ttl`.
    #[must_use]
    pub fn with_cache(api: Arc<dyn DevOpsApi>, ttl: Duration) -> Self {
        Self {
            api,
            cache: Some(ProjectCache::new(ttl)),
        }
    }

    /// Resolver honouring `enable_caching` and `cache_ttl_seconds`.
    #[must_use]
    pub fn from_config(api: Arc<dyn DevOpsApi>, config: &Config) -> Self {
        if config.enable_caching {
            Self::with_cache(api, config.cache_ttl())
        } else {
            Self::new(api)
        }
    }

    /// Looks up a project, returning `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn resolve(&self, project: &str) -> Result<Option<Project>> {
        // Project names are case-insensitive in Azure DevOps
        let key = project.trim().to_lowercase();

        if let Some(hit) = self.cache.as_ref().and_then(|cache| cache.get(&key)) {
            debug!("Project cache hit for '{project}'");
            return Ok(Some(hit));
        }

        let found = self.api.get_project(project).await?;

        if let (Some(cache), Some(found)) = (&self.cache, &found) {
            cache.insert(key, found.clone());
        }

        Ok(found)
    }

    #[must_use]
    pub const fn cache(&self) -> Option<&ProjectCache> {
        self.cache.as_ref()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::{MockDevOpsApi, project};

    #[test]
    fn test_cache_expiry() {
        let cache = ProjectCache::new(Duration::from_secs(60));
        cache.insert("web", project("p1", "web"));
        assert_eq!(cache.get("web").unwrap().id, "p1");
        assert!(cache.get("api").is_none());

        let expired = ProjectCache::new(Duration::ZERO);
        expired.insert("web", project("p1", "web"));
        assert!(expired.get("web").is_none());
        assert!(expired.is_empty());
    }

    #[tokio::test]
    async fn test_resolver_caches_hits() {
        let api = Arc::new(MockDevOpsApi::new().with_project(project("p1", "web")));
        let resolver = ProjectResolver::with_cache(api.clone(), Duration::from_secs(300));

        assert_eq!(resolver.resolve("web").await.unwrap().unwrap().id, "p1");
        assert_eq!(resolver.resolve("WEB").await.unwrap().unwrap().id, "p1");
        assert_eq!(api.project_lookups.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cache().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resolver_does_not_cache_misses() {
        let api = Arc::new(MockDevOpsApi::new());
        let resolver = ProjectResolver::with_cache(api.clone(), Duration::from_secs(300));

        assert!(resolver.resolve("ghost").await.unwrap().is_none());
        assert!(resolver.resolve("ghost").await.unwrap().is_none());
        assert_eq!(api.project_lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_resolver_without_cache() {
        let api = Arc::new(MockDevOpsApi::new().with_project(project("p1", "web")));
        let config = Config::new("org", "pat").with_caching(false, 300);
        let resolver = ProjectResolver::from_config(api.clone(), &config);

        resolver.resolve("web").await.unwrap();
        resolver.resolve("web").await.unwrap();
        assert_eq!(api.project_lookups.load(Ordering::SeqCst), 2);
        assert!(resolver.cache().is_none());
    }

    #[tokio::test]
    async fn test_resolver_propagates_errors() {
        let api = Arc::new(MockDevOpsApi::new().failing_with(503));
        let resolver = ProjectResolver::new(api);

        let err = resolver.resolve("web").await.unwrap_err();
        assert_eq!(err.status_code(), Some(503));
    }
}
