//! Domain reconciler.
//!
//! One [`DomainReconciler`] per registrar account; the surrounding driver
//! invokes it once per create/read/update cycle and persists whatever state
//! it needs. All registrar I/O funnels through the configured
//! [`RetryPolicy`].

mod dns;
mod provision;

pub use dns::{normalize_address, record_key};
pub use provision::ContactCache;

use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::gateway::RegistrarGateway;
use crate::lifecycle::{LifecycleAction, decide};
use crate::retry::RetryPolicy;
use crate::types::{DomainDescriptor, RemoteDomainSnapshot};

/// Reconciles a caller-declared domain + DNS desired state against the
/// registrar.
///
/// Holds no domain state of its own: every pass fetches the remote state
/// fresh. The only cross-pass cache is the [`ContactCache`] (immutable
/// account data), which can be shared between reconcilers.
pub struct DomainReconciler<G> {
    pub(crate) gateway: G,
    pub(crate) retry: RetryPolicy,
    pub(crate) contacts: Arc<ContactCache>,
}

impl<G: RegistrarGateway> DomainReconciler<G> {
    /// Builds a reconciler with the default retry policy and a fresh
    /// contact cache.
    pub fn new(gateway: G) -> Self {
        Self::with_retry_policy(gateway, RetryPolicy::default())
    }

    /// Builds a reconciler with an explicit retry policy.
    pub fn with_retry_policy(gateway: G, retry: RetryPolicy) -> Self {
        Self {
            gateway,
            retry,
            contacts: Arc::new(ContactCache::new()),
        }
    }

    /// Builds a reconciler sharing a contact cache with other reconcilers
    /// against the same account.
    pub fn with_contact_cache(gateway: G, retry: RetryPolicy, contacts: Arc<ContactCache>) -> Self {
        Self {
            gateway,
            retry,
            contacts,
        }
    }

    /// The wrapped gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Fetches the registrar's current view of `name`.
    pub async fn snapshot(&self, name: &str) -> Result<RemoteDomainSnapshot> {
        let name = name.to_ascii_lowercase();
        let lookup = self
            .retry
            .call("lookup_domain", || self.gateway.lookup_domain(&name))
            .await?;
        Ok(lookup.into_snapshot(&name))
    }

    /// Runs one lifecycle pass: fetch the snapshot, decide, execute.
    ///
    /// Returns the action that was taken. Safe to call again after any
    /// failure; the fresh snapshot at the start of each pass is what keeps
    /// repeated passes convergent.
    pub async fn ensure_domain(&self, descriptor: &DomainDescriptor) -> Result<LifecycleAction> {
        descriptor.validate()?;
        let snapshot = self.snapshot(&descriptor.name).await?;
        let action = decide(descriptor, &snapshot, Utc::now());

        match action {
            LifecycleAction::Create => {
                self.create(descriptor).await?;
            }
            LifecycleAction::Renew => {
                self.renew(&descriptor.name, descriptor.years).await?;
            }
            LifecycleAction::Reactivate => {
                self.reactivate(&descriptor.name, descriptor.years).await?;
            }
            LifecycleAction::Skip => {}
        }

        Ok(action)
    }
}
