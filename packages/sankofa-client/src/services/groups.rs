use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::SankofaApi;
use crate::error::Result;
use crate::types::{CreateGroupRequest, JoinGroupRequest, JoinOptions, NewGroup, SusuGroup};

/// Groups the signed-in member belongs to or can join.
pub struct GroupService {
    api: Arc<dyn SankofaApi>,
    cache: RwLock<Option<Vec<SusuGroup>>>,
}

impl GroupService {
    pub fn new(api: Arc<dyn SankofaApi>) -> Self {
        Self {
            api,
            cache: RwLock::new(None),
        }
    }

    /// List groups, from the cache unless `force_refresh`.
    ///
    /// When the API fails and a cached list exists, the cached list is
    /// returned instead of the error.
    pub async fn groups(&self, force_refresh: bool) -> Result<Vec<SusuGroup>> {
        if !force_refresh {
            if let Some(cached) = self.cache.read().await.as_ref() {
                return Ok(cached.clone());
            }
        }

        match self.api.list_groups().await {
            Ok(groups) => {
                debug!(count = groups.len(), "Fetched groups");
                *self.cache.write().await = Some(groups.clone());
                Ok(groups)
            }
            Err(e) => match self.cache.read().await.as_ref() {
                Some(cached) => {
                    warn!(error = %e, "Failed to fetch groups, using cache");
                    Ok(cached.clone())
                }
                None => Err(e),
            },
        }
    }

    /// One group, from the cache first. `None` when the server has no such group.
    pub async fn group(&self, id: &str) -> Result<Option<SusuGroup>> {
        if let Some(cached) = self.cached(id).await {
            return Ok(Some(cached));
        }

        match self.api.get_group(id).await {
            Ok(group) => {
                self.upsert(group.clone()).await;
                Ok(Some(group))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create_group(&self, group: &NewGroup) -> Result<SusuGroup> {
        let request = CreateGroupRequest::from(group);
        let created = self.api.create_group(&request).await?;
        debug!(group_id = %created.id, "Created group");

        self.cache
            .write()
            .await
            .get_or_insert_with(Vec::new)
            .insert(0, created.clone());
        Ok(created)
    }

    pub async fn join_group(&self, id: &str, options: &JoinOptions) -> Result<SusuGroup> {
        let request = JoinGroupRequest::from(options);
        let group = self.api.join_group(id, &request).await?;
        debug!(group_id = %group.id, "Joined group");
        self.upsert(group.clone()).await;
        Ok(group)
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.take();
    }

    async fn cached(&self, id: &str) -> Option<SusuGroup> {
        self.cache
            .read()
            .await
            .as_ref()
            .and_then(|groups| groups.iter().find(|g| g.id == id).cloned())
    }

    async fn upsert(&self, group: SusuGroup) {
        let mut cache = self.cache.write().await;
        let groups = cache.get_or_insert_with(Vec::new);
        match groups.iter_mut().find(|g| g.id == group.id) {
            Some(existing) => *existing = group,
            None => groups.push(group),
        }
    }
}
