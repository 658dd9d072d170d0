use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::SankofaApi;
use crate::error::Result;
use crate::types::{SusuGroup, Transaction, TransactionType};

/// Wallet and group transaction history.
pub struct TransactionService {
    api: Arc<dyn SankofaApi>,
    cache: RwLock<Option<Vec<Transaction>>>,
}

impl TransactionService {
    pub fn new(api: Arc<dyn SankofaApi>) -> Self {
        Self {
            api,
            cache: RwLock::new(None),
        }
    }

    /// Same caching and fallback policy as `GroupService::groups`.
    pub async fn transactions(&self, force_refresh: bool) -> Result<Vec<Transaction>> {
        if !force_refresh {
            if let Some(cached) = self.cache.read().await.as_ref() {
                return Ok(cached.clone());
            }
        }

        match self.api.list_transactions().await {
            Ok(transactions) => {
                debug!(count = transactions.len(), "Fetched transactions");
                *self.cache.write().await = Some(transactions.clone());
                Ok(transactions)
            }
            Err(e) => match self.cache.read().await.as_ref() {
                Some(cached) => {
                    warn!(error = %e, "Failed to fetch transactions, using cache");
                    Ok(cached.clone())
                }
                None => Err(e),
            },
        }
    }

    pub async fn transaction(&self, id: &str) -> Result<Option<Transaction>> {
        let cached = self
            .cache
            .read()
            .await
            .as_ref()
            .and_then(|txs| txs.iter().find(|t| t.id == id).cloned());
        if cached.is_some() {
            return Ok(cached);
        }

        match self.api.get_transaction(id).await {
            Ok(tx) => {
                self.record_remote_transaction(tx.clone()).await;
                Ok(Some(tx))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Replace the cached copy in place, or put a new one at the front.
    pub async fn record_remote_transaction(&self, tx: Transaction) {
        let mut cache = self.cache.write().await;
        let txs = cache.get_or_insert_with(Vec::new);
        match txs.iter_mut().find(|t| t.id == tx.id) {
            Some(existing) => *existing = tx,
            None => txs.insert(0, tx),
        }
    }

    /// Up to `limit` cached non-deposit transactions that belong to `group`.
    pub async fn recent_for_group(&self, group: &SusuGroup, limit: usize) -> Vec<Transaction> {
        let cache = self.cache.read().await;
        let Some(txs) = cache.as_ref() else {
            return Vec::new();
        };

        txs.iter()
            .filter(|tx| tx.kind != TransactionType::Deposit)
            .filter(|tx| {
                tx.description
                    .as_deref()
                    .is_some_and(|d| d.contains(&group.id))
                    || tx.counterparty.as_deref() == Some(group.name.as_str())
            })
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.take();
    }
}
