use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ContactAddress, EmailType, HostRecord, RemoteDomainSnapshot};

/// Result of a domain lookup against the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainLookup {
    /// Whether the registrar returned a domain for the search term.
    pub found: bool,
    /// The name the registrar actually returned. A search can match a
    /// different domain, so callers must compare against the requested name.
    pub name: String,
    /// Whether the registration has lapsed.
    pub expired: bool,
    /// Expiry timestamp, when reported. Always UTC.
    #[serde(with = "crate::utils::datetime::option")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl DomainLookup {
    /// Collapses the lookup into a [`RemoteDomainSnapshot`] for the given
    /// name. A result whose name differs from the requested one counts as
    /// not found.
    pub fn into_snapshot(self, requested: &str) -> RemoteDomainSnapshot {
        if !self.found || !self.name.eq_ignore_ascii_case(requested) {
            return RemoteDomainSnapshot::absent();
        }
        RemoteDomainSnapshot {
            found: true,
            expired: self.expired,
            expires_at: self.expires_at,
        }
    }
}

/// Result of an availability check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCheck {
    /// Whether the domain can be registered.
    pub available: bool,
    /// Premium price as the registrar's decimal string; `"0"` means the
    /// domain is not premium and standard TLD pricing applies.
    pub premium_price: String,
}

/// Pricing table to consult in a pricing lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingAction {
    /// First-time registration pricing.
    Register,
    /// Renewal pricing.
    Renew,
    /// Post-expiry reactivation pricing.
    Reactivate,
}

impl PricingAction {
    /// The registrar's wire string for this pricing table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Renew => "renew",
            Self::Reactivate => "reactivate",
        }
    }
}

/// Parameters for a domain creation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDomainRequest {
    /// Domain name to register.
    pub name: String,
    /// Registration period in years.
    pub years: u32,
    /// Nameservers to delegate to. Empty means the registrar's default DNS.
    pub nameservers: Vec<String>,
    /// Contact used for the registrant/admin/tech/billing roles alike.
    pub contact: ContactAddress,
}

/// Registrar acknowledgement of a creation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceipt {
    /// Whether the domain was registered.
    pub registered: bool,
    /// Amount charged, as the registrar's decimal string.
    pub charged_amount: String,
}

/// Registrar acknowledgement of a renewal call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewReceipt {
    /// Positive confirmation flag. `false` means the renewal was rejected.
    pub renewed: bool,
}

/// Registrar acknowledgement of a reactivation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactivateReceipt {
    /// Positive confirmation flag. `false` means the reactivation was
    /// rejected.
    pub success: bool,
}

/// Hosted record set as the registrar reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRecordsSnapshot {
    /// Records currently served by the registrar.
    pub records: Vec<HostRecord>,
    /// Active mail-routing mode.
    pub email_type: EmailType,
    /// Whether the registrar's own DNS is serving the domain.
    pub using_registrar_dns: bool,
}

/// Delegation status as the registrar reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameserverStatus {
    /// Whether the registrar's own DNS is serving the domain.
    pub using_registrar_dns: bool,
    /// External nameservers, when delegation is active.
    pub nameservers: Vec<String>,
}

/// The remote registrar, reduced to the operations reconciliation needs.
///
/// Implementations own the wire format (XML marshaling, authentication,
/// sandbox/production endpoints) and map registrar-reported business errors
/// into [`RegistrarError`](crate::RegistrarError) — typically
/// [`Api`](crate::RegistrarError::Api) with the code and message verbatim.
/// Transport-level failures must surface as the retryable variants so
/// [`RetryPolicy`](crate::RetryPolicy) can do its job.
///
/// Every method is a single registrar call; none of them retry internally.
#[async_trait]
pub trait RegistrarGateway: Send + Sync {
    /// Looks the domain up in the account's domain list.
    async fn lookup_domain(&self, name: &str) -> Result<DomainLookup>;

    /// Checks whether the domain is available for registration.
    async fn check_availability(&self, name: &str) -> Result<AvailabilityCheck>;

    /// Looks up the account's price for `tld` under the given pricing table
    /// and duration.
    async fn lookup_pricing(&self, action: PricingAction, tld: &str, years: u32) -> Result<f64>;

    /// Fetches the account's primary contact address.
    async fn get_contact_address(&self) -> Result<ContactAddress>;

    /// Registers a new domain.
    async fn create_domain(&self, req: &CreateDomainRequest) -> Result<CreateReceipt>;

    /// Renews an active registration.
    async fn renew_domain(&self, name: &str, years: u32) -> Result<RenewReceipt>;

    /// Reactivates an expired registration.
    async fn reactivate_domain(&self, name: &str, years: u32) -> Result<ReactivateReceipt>;

    /// Fetches the hosted record set. Only meaningful while the registrar's
    /// own DNS is active.
    async fn get_host_records(&self, name: &str) -> Result<HostRecordsSnapshot>;

    /// Replaces the hosted record set wholesale.
    async fn set_host_records(
        &self,
        name: &str,
        records: &[HostRecord],
        email_type: EmailType,
    ) -> Result<()>;

    /// Fetches the current delegation status.
    async fn get_nameservers(&self, name: &str) -> Result<NameserverStatus>;

    /// Delegates the domain to the given nameservers, replacing any previous
    /// list.
    async fn set_nameservers(&self, name: &str, nameservers: &[String]) -> Result<()>;

    /// Resets the domain to the registrar's default DNS, clearing any
    /// delegation.
    async fn reset_nameservers(&self, name: &str) -> Result<()>;
}
