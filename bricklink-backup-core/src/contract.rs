//! # contract: the seam between the pipeline and the remote store API
//!
//! The backup pipeline only needs "give me the records of this resource". The
//! [`InventoryApi`] trait captures exactly that, so the pipeline can run
//! against the real OAuth-signed client, a mock, or any other source.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; `MockInventoryApi` is exported when
//!   the `test-export-mocks` feature is enabled (the default).

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde_json::Value;

use crate::category::Category;
use crate::error::FetchError;

/// Read access to the store's inventory and catalog resources.
///
/// Implementors unwrap the API's response envelope and return only the
/// payload. Any non-success response must surface as a [`FetchError`] rather
/// than an empty or partial payload.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Every inventory lot in the store.
    async fn fetch_inventories(&self) -> Result<Vec<Value>, FetchError>;

    /// A single inventory lot by id.
    async fn fetch_inventory(&self, inventory_id: i64) -> Result<Value, FetchError>;

    /// The full category list, used to name each inventory's category.
    async fn fetch_categories(&self) -> Result<Vec<Category>, FetchError>;
}
