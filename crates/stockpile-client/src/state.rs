//! Shared optimistic-insert state.
//!
//! Wraps [`OptimisticCache`] for use across tasks, and provides the create
//! and list flows that keep it in step with the API.

use std::sync::Arc;

use chrono::Utc;
use stockpile_core::types::Identified;
use stockpile_core::validation::SalesOrderForm;
use stockpile_core::{OptimisticCache, SalesOrder};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::InventoryApi;
use crate::error::ClientResult;

/// Optimistic inserts of one entity type, shareable between tasks.
pub struct OptimisticStore<T> {
    cache: Arc<RwLock<OptimisticCache<T>>>,
}

impl<T> Clone for OptimisticStore<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<T: Identified + Clone + Send + Sync> OptimisticStore<T> {
    pub fn new(ttl: chrono::Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(OptimisticCache::new(ttl))),
        }
    }

    /// Holds `record` until the API lists it.
    pub async fn record(&self, record: T) -> Uuid {
        let id = record.id().to_string();
        let correlation_id = self.cache.write().await.insert(record, Utc::now());
        debug!(%correlation_id, record_id = %id, "Optimistic insert recorded");
        correlation_id
    }

    /// Pending inserts in front of `authoritative`.
    pub async fn merge(&self, authoritative: Vec<T>) -> Vec<T> {
        self.cache.write().await.merge(authoritative, Utc::now())
    }

    pub async fn forget(&self, correlation_id: Uuid) -> Option<T> {
        self.cache.write().await.remove(correlation_id)
    }

    pub async fn pending_count(&self) -> usize {
        self.cache.read().await.len()
    }
}

/// Validates and submits a sales order, holding the result optimistically.
pub async fn create_sales_order<A: InventoryApi + ?Sized>(
    api: &A,
    store: &OptimisticStore<SalesOrder>,
    form: &SalesOrderForm,
) -> ClientResult<SalesOrder> {
    let body = form.validate()?;
    let created = api.create_sales_order(&body).await?;
    info!(
        order = %created.display_number(),
        items = created.items.len(),
        total = %created.total_amount,
        "Sales order created"
    );
    store.record(created.clone()).await;
    Ok(created)
}

/// Sales orders from the API with pending inserts in front.
pub async fn list_sales_orders<A: InventoryApi + ?Sized>(
    api: &A,
    store: &OptimisticStore<SalesOrder>,
) -> ClientResult<Vec<SalesOrder>> {
    let listed = api.sales_orders().await?;
    Ok(store.merge(listed).await)
}
