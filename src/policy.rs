//! Per-action authorization.
//!
//! Each resource binding carries an immutable [`PolicyTable`] mapping every
//! action to the access rules it must satisfy. Actions without an entry fall
//! back to a table-wide default. Hosts resolve the caller however they like
//! (JWT, session, Keycloak) and install middleware that inserts a [`Caller`]
//! request extension; handlers treat a missing extension as an anonymous
//! request.
//!
//! # Example
//!
//! ```rust,ignore
//! use scrud::{AccessRule, PolicyTable, ResourceAction};
//!
//! let policies = PolicyTable::new()
//!     .require(ResourceAction::Delete, [AccessRule::AdminOnly])
//!     .require(ResourceAction::Inactives, [AccessRule::AdminOnly])
//!     .fallback([AccessRule::Authenticated]);
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};
use std::collections::HashMap;
use std::convert::Infallible;
use uuid::Uuid;

use crate::errors::ApiError;

/// The fixed action set a resource router exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceAction {
    List,
    Get,
    Create,
    Edit,
    Delete,
    Activate,
    Deactivate,
    Inactives,
    Search,
}

impl ResourceAction {
    /// Stable lowercase name, used in log events
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Inactives => "inactives",
            Self::Search => "search",
        }
    }
}

/// Authenticated caller identity, inserted by host middleware as a request
/// extension
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: Uuid,
    pub is_admin: bool,
}

impl Caller {
    /// A regular authenticated caller
    #[must_use]
    pub fn user(id: Uuid) -> Self {
        Self {
            id,
            is_admin: false,
        }
    }

    /// An administrator
    #[must_use]
    pub fn admin(id: Uuid) -> Self {
        Self { id, is_admin: true }
    }
}

/// Extractor reading the caller from the request extensions.
///
/// Never rejects: a request without a [`Caller`] extension is simply
/// anonymous, so resources stay usable when the host installs no auth
/// middleware at all.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Option<Caller>);

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Caller>().cloned()))
    }
}

/// A single access requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    /// Anyone, including anonymous callers
    AllowAny,
    /// Any authenticated caller
    Authenticated,
    /// Authenticated callers with the admin flag
    AdminOnly,
}

impl AccessRule {
    /// Check the rule against the caller, if any
    ///
    /// Anonymous callers failing a rule get 401; authenticated callers
    /// failing `AdminOnly` get 403.
    pub fn check(self, caller: Option<&Caller>) -> Result<(), ApiError> {
        match self {
            Self::AllowAny => Ok(()),
            Self::Authenticated => {
                if caller.is_some() {
                    Ok(())
                } else {
                    Err(ApiError::unauthorized(
                        "Authentication credentials were not provided.",
                    ))
                }
            }
            Self::AdminOnly => match caller {
                None => Err(ApiError::unauthorized(
                    "Authentication credentials were not provided.",
                )),
                Some(caller) if caller.is_admin => Ok(()),
                Some(_) => Err(ApiError::forbidden(
                    "You do not have permission to perform this action.",
                )),
            },
        }
    }
}

/// Immutable action-to-rules table with a fallback for unlisted actions
///
/// Built once per binding with the consuming builder methods; cloning is
/// cheap enough that bindings share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    rules: HashMap<ResourceAction, Vec<AccessRule>>,
    fallback: Vec<AccessRule>,
}

impl Default for PolicyTable {
    /// Every action open to anyone, like a freshly bound resource
    fn default() -> Self {
        Self {
            rules: HashMap::new(),
            fallback: vec![AccessRule::AllowAny],
        }
    }
}

impl PolicyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rules for one action; all listed rules must pass
    #[must_use]
    pub fn require(
        mut self,
        action: ResourceAction,
        rules: impl IntoIterator<Item = AccessRule>,
    ) -> Self {
        self.rules.insert(action, rules.into_iter().collect());
        self
    }

    /// Set the rules applied to actions without an entry
    #[must_use]
    pub fn fallback(mut self, rules: impl IntoIterator<Item = AccessRule>) -> Self {
        self.fallback = rules.into_iter().collect();
        self
    }

    /// The rules that govern an action
    #[must_use]
    pub fn rules_for(&self, action: ResourceAction) -> &[AccessRule] {
        self.rules.get(&action).map_or(&self.fallback, Vec::as_slice)
    }

    /// Check every rule governing `action` against the caller
    ///
    /// Returns the first failure, before any database work happens.
    pub fn authorize(
        &self,
        action: ResourceAction,
        caller: Option<&Caller>,
    ) -> Result<(), ApiError> {
        for rule in self.rules_for(action) {
            if let Err(err) = rule.check(caller) {
                tracing::debug!(
                    action = action.as_str(),
                    authenticated = caller.is_some(),
                    "authorization denied"
                );
                return Err(err);
            }
        }
        Ok(())
    }
}
