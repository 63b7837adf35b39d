//! Per-resource configuration handed to the generic handlers as router state.
//!
//! A binding is built once when the resource is mounted and never mutated
//! afterwards; it is `Clone` so any number of concurrent requests can share
//! it. One binding per mounted resource, so two resources can page
//! differently or carry different policy tables against the same database.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::errors::ApiError;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::policy::{Caller, PolicyTable, ResourceAction};

/// Wire name of the activation field unless the binding overrides it
pub const DEFAULT_STATUS_KEY: &str = "is_active";

/// State for one mounted resource: database handle, policy table, page size,
/// and the status-field key used by the toggle endpoints
#[derive(Clone)]
pub struct ResourceBinding {
    db: DatabaseConnection,
    policies: Arc<PolicyTable>,
    page_size: u64,
    status_key: String,
}

impl ResourceBinding {
    /// A binding with every action open, pages of ten, and the standard
    /// status key
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            policies: Arc::new(PolicyTable::default()),
            page_size: DEFAULT_PAGE_SIZE,
            status_key: DEFAULT_STATUS_KEY.to_string(),
        }
    }

    #[must_use]
    pub fn with_policies(mut self, policies: PolicyTable) -> Self {
        self.policies = Arc::new(policies);
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Override the wire name of the field the activate/deactivate endpoints
    /// inject into their payload
    #[must_use]
    pub fn with_status_key(mut self, key: impl Into<String>) -> Self {
        self.status_key = key.into();
        self
    }

    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    #[must_use]
    pub fn status_key(&self) -> &str {
        &self.status_key
    }

    #[must_use]
    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// Check the caller against the rules governing `action`
    pub fn authorize(
        &self,
        action: ResourceAction,
        caller: Option<&Caller>,
    ) -> Result<(), ApiError> {
        self.policies.authorize(action, caller)
    }
}
