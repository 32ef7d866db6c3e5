//! # registrar-reconciler
//!
//! A reconciliation engine for registrar-managed domains: it converges a
//! caller-declared desired state — registration lifecycle plus DNS
//! configuration — onto whatever the registrar currently reports.
//!
//! ## What it does
//!
//! - **Lifecycle decisions** — [`decide`] maps a [`DomainDescriptor`] and a
//!   freshly fetched [`RemoteDomainSnapshot`] onto exactly one
//!   [`LifecycleAction`]: create, renew, reactivate, or skip.
//! - **Provisioning** — [`DomainReconciler::create`] purchases a domain
//!   after an availability and price-ceiling check,
//!   [`DomainReconciler::renew`] and [`DomainReconciler::reactivate`] keep
//!   an existing registration alive.
//! - **DNS reconciliation** — [`DomainReconciler::reconcile_dns`] diffs a
//!   desired record set (or nameserver delegation) against the remote one
//!   and issues full-replacement writes; hosted records and delegated
//!   nameservers are mutually exclusive on the registrar side and the
//!   reconciler sequences the mode switch correctly.
//! - **Retries** — every registrar call runs under a [`RetryPolicy`] with
//!   bounded exponential backoff; only transport-class failures are
//!   retried, registrar business errors return immediately.
//!
//! The registrar itself is consumed through the [`RegistrarGateway`] trait;
//! wire concerns (XML marshaling, authentication, endpoints) live in the
//! gateway implementation, not here.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use registrar_reconciler::{
//!     DesiredDns, DomainDescriptor, DomainReconciler, HostRecord, RecordType,
//! };
//!
//! # async fn example(gateway: impl registrar_reconciler::RegistrarGateway) -> registrar_reconciler::Result<()> {
//! let reconciler = DomainReconciler::new(gateway);
//!
//! // Keep the registration alive.
//! let descriptor = DomainDescriptor {
//!     name: "example.com".to_string(),
//!     years: 1,
//!     min_days_remaining: 30,
//!     auto_renew: true,
//!     max_price: 10.0,
//!     nameservers: vec![],
//! };
//! let action = reconciler.ensure_domain(&descriptor).await?;
//! println!("lifecycle action taken: {action:?}");
//!
//! // Converge the hosted record set.
//! let desired = DesiredDns {
//!     records: vec![HostRecord::new("www", RecordType::A, "203.0.113.10")],
//!     email_type: None,
//!     nameservers: vec![],
//! };
//! reconciler.reconcile_dns(&descriptor.name, &desired).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Convergence model
//!
//! Writes are **total replacements**, never incremental patches: the
//! desired state is the complete target, and anything not in it is removed.
//! That is the registrar's actual contract, and it is what makes repeated
//! reconciliation passes idempotent — applying the same desired state twice
//! leaves no remote-visible difference after the first application.
//!
//! Each pass fetches remote state fresh and owns no storage; the only
//! process-wide cache is the account contact address
//! ([`ContactCache`]), which is immutable account data.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, RegistrarError>`](RegistrarError).
//! Transient transport errors (`Transport`, `Timeout`, `RateLimited`) are
//! retried automatically and only surface as
//! [`RegistrarError::TransientFailure`] once the retry budget is exhausted;
//! every registrar-reported business failure (`AlreadyExists`,
//! `NotAvailable`, `OverBudget`, ...) is returned immediately and carries
//! the registrar's own codes and messages where available.

mod error;
mod gateway;
mod lifecycle;
mod reconciler;
mod retry;
mod types;
mod utils;

// Re-export error types
pub use error::{RegistrarError, Result};

// Re-export the gateway trait and its operation payloads
pub use gateway::{
    AvailabilityCheck, CreateDomainRequest, CreateReceipt, DomainLookup, HostRecordsSnapshot,
    NameserverStatus, PricingAction, ReactivateReceipt, RegistrarGateway, RenewReceipt,
};

// Re-export the decision engine
pub use lifecycle::{LifecycleAction, days_remaining, decide};

// Re-export the reconciler and its helpers
pub use reconciler::{ContactCache, DomainReconciler, normalize_address, record_key};

// Re-export the retry policy
pub use retry::RetryPolicy;

// Re-export the domain model
pub use types::{
    ContactAddress, DEFAULT_MX_PREF, DEFAULT_TTL, DesiredDns, DnsMode, DomainDescriptor,
    EmailType, HostRecord, MAX_PURCHASE_YEARS, MAX_TTL, MIN_TTL, RecordType, RemoteDnsState,
    RemoteDomainSnapshot, parse_record_type,
};

// Re-export datetime serde helpers for gateway implementations
pub use utils::datetime;
