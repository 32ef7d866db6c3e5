use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RegistrarError, Result};

// ============ Record Schema ============

/// Lowest TTL the registrar accepts, in seconds.
pub const MIN_TTL: u32 = 60;
/// Highest TTL the registrar accepts, in seconds.
pub const MAX_TTL: u32 = 60_000;
/// TTL applied when the caller does not specify one.
pub const DEFAULT_TTL: u32 = 1799;
/// MX preference applied when the caller does not specify one.
pub const DEFAULT_MX_PREF: u8 = 10;
/// Longest registration/renewal period the registrar sells, in years.
pub const MAX_PURCHASE_YEARS: u32 = 10;

/// DNS record types the registrar hosts.
///
/// Serialized as the registrar's uppercase wire strings (`"A"`, `"AAAA"`,
/// `"URL301"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// ALIAS record (CNAME-like, allowed at the apex).
    Alias,
    /// Certificate Authority Authorization record.
    Caa,
    /// Canonical name (alias) record.
    Cname,
    /// Frame-based URL forwarding record.
    Frame,
    /// Mail exchange record.
    Mx,
    /// Mail-easy record (points mail at an IP address).
    Mxe,
    /// Name server record.
    Ns,
    /// Text record.
    Txt,
    /// URL redirect record (HTTP 302).
    Url,
    /// Permanent URL redirect record (HTTP 301).
    Url301,
}

impl RecordType {
    /// The registrar's uppercase wire string for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Alias => "ALIAS",
            Self::Caa => "CAA",
            Self::Cname => "CNAME",
            Self::Frame => "FRAME",
            Self::Mx => "MX",
            Self::Mxe => "MXE",
            Self::Ns => "NS",
            Self::Txt => "TXT",
            Self::Url => "URL",
            Self::Url301 => "URL301",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a registrar record-type string (case-insensitive).
pub fn parse_record_type(record_type: &str) -> Result<RecordType> {
    match record_type.to_uppercase().as_str() {
        "A" => Ok(RecordType::A),
        "AAAA" => Ok(RecordType::Aaaa),
        "ALIAS" => Ok(RecordType::Alias),
        "CAA" => Ok(RecordType::Caa),
        "CNAME" => Ok(RecordType::Cname),
        "FRAME" => Ok(RecordType::Frame),
        "MX" => Ok(RecordType::Mx),
        "MXE" => Ok(RecordType::Mxe),
        "NS" => Ok(RecordType::Ns),
        "TXT" => Ok(RecordType::Txt),
        "URL" => Ok(RecordType::Url),
        "URL301" => Ok(RecordType::Url301),
        _ => Err(RegistrarError::InvalidParameter {
            param: "record_type".to_string(),
            detail: format!("Unsupported record type: {record_type}"),
        }),
    }
}

/// Mail-routing mode attached to a hosted record set.
///
/// An independent axis from the records themselves, but constrained by them:
/// [`Mx`](Self::Mx)/[`Mxe`](Self::Mxe) are meaningless without a record of
/// the corresponding type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EmailType {
    /// No registrar-side mail routing.
    #[default]
    None,
    /// Email forwarding.
    Fwd,
    /// Custom MX records.
    Mx,
    /// Mail-easy (MXE) routing.
    Mxe,
    /// Open-Xchange hosted mail.
    Ox,
    /// Google Workspace mail.
    Gmail,
}

impl EmailType {
    /// The registrar's uppercase wire string for this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Fwd => "FWD",
            Self::Mx => "MX",
            Self::Mxe => "MXE",
            Self::Ox => "OX",
            Self::Gmail => "GMAIL",
        }
    }
}

/// A single hosted DNS record.
///
/// Identity for diff purposes is `(hostname, record_type, address)` after
/// address normalization; `mx_pref` and `ttl` never block equality and are
/// simply overwritten on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRecord {
    /// Sub-domain/hostname the record applies to (`"@"` for the apex).
    pub hostname: String,
    /// Record type.
    pub record_type: RecordType,
    /// Record value; IP address, hostname or arbitrary text depending on
    /// the record type.
    pub address: String,
    /// MX preference. Meaningful for MX records only.
    pub mx_pref: u8,
    /// Time to live in seconds, within the registrar's accepted range.
    pub ttl: u32,
}

impl HostRecord {
    /// Creates a record with the registrar's default `mx_pref` and `ttl`.
    pub fn new(
        hostname: impl Into<String>,
        record_type: RecordType,
        address: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            record_type,
            address: address.into(),
            mx_pref: DEFAULT_MX_PREF,
            ttl: DEFAULT_TTL,
        }
    }

    /// Checks field-level constraints the registrar would reject.
    pub fn validate(&self) -> Result<()> {
        if self.hostname.is_empty() {
            return Err(RegistrarError::InvalidParameter {
                param: "hostname".to_string(),
                detail: "hostname must not be empty".to_string(),
            });
        }
        if self.ttl < MIN_TTL || self.ttl > MAX_TTL {
            return Err(RegistrarError::InvalidParameter {
                param: "ttl".to_string(),
                detail: format!(
                    "ttl {} outside accepted range {MIN_TTL}..={MAX_TTL}",
                    self.ttl
                ),
            });
        }
        Ok(())
    }
}

// ============ Domain Lifecycle ============

/// Caller-declared desired state for one domain registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainDescriptor {
    /// Domain name to manage. Compared case-insensitively; stored lowercase.
    pub name: String,
    /// Number of years to purchase or renew (1..=10).
    pub years: u32,
    /// Renew when fewer than this many days remain before expiry.
    /// Zero or negative disables renewal entirely.
    pub min_days_remaining: i64,
    /// Whether the reconciler may renew/reactivate at all. `false` behaves
    /// like a disabled `min_days_remaining`.
    pub auto_renew: bool,
    /// Maximum acceptable purchase price.
    pub max_price: f64,
    /// Nameservers to delegate to on creation. Empty means the registrar's
    /// default DNS.
    pub nameservers: Vec<String>,
}

impl DomainDescriptor {
    /// Checks constraints the registrar would reject.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RegistrarError::InvalidParameter {
                param: "name".to_string(),
                detail: "domain name must not be empty".to_string(),
            });
        }
        if self.years == 0 || self.years > MAX_PURCHASE_YEARS {
            return Err(RegistrarError::InvalidParameter {
                param: "years".to_string(),
                detail: format!(
                    "purchase years {} outside accepted range 1..={MAX_PURCHASE_YEARS}",
                    self.years
                ),
            });
        }
        Ok(())
    }
}

/// The registrar's view of one domain, fetched fresh on every pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDomainSnapshot {
    /// Whether the domain exists in this account.
    pub found: bool,
    /// Whether the registration has lapsed past its expiry date.
    pub expired: bool,
    /// Expiry timestamp, when known. Always UTC.
    #[serde(with = "crate::utils::datetime::option")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl RemoteDomainSnapshot {
    /// A snapshot for a domain the registrar does not know about.
    pub fn absent() -> Self {
        Self {
            found: false,
            expired: false,
            expires_at: None,
        }
    }
}

/// The account's registered contact address, applied identically to the
/// registrant/admin/tech/billing roles on domain creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactAddress {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    pub city: String,
    pub state_province: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub email: String,
}

// ============ DNS Desired / Remote State ============

/// Which of the registrar's two mutually exclusive DNS modes is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DnsMode {
    /// The registrar serves the hosted record set.
    Hosted,
    /// DNS authority is delegated to external nameservers.
    Delegated,
}

/// Caller-declared desired DNS state for one domain.
///
/// A non-empty `nameservers` list selects delegated mode; otherwise the
/// record set (possibly empty) is written in hosted mode. Setting both is a
/// [`ModeConflict`](RegistrarError::ModeConflict).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredDns {
    /// Complete target record set. Anything not listed is removed.
    pub records: Vec<HostRecord>,
    /// Explicit mail-routing mode. `None` lets the reconciler carry the
    /// remote value forward, degrading MX/MXE to NONE when the last record
    /// of that type is removed.
    pub email_type: Option<EmailType>,
    /// Nameservers to delegate to. Non-empty switches the domain to
    /// delegated mode and supersedes `records`.
    pub nameservers: Vec<String>,
}

impl DesiredDns {
    /// The mode this desired state selects.
    pub fn mode(&self) -> DnsMode {
        if self.nameservers.is_empty() {
            DnsMode::Hosted
        } else {
            DnsMode::Delegated
        }
    }

    /// Rejects desired states that ask for both modes at once.
    pub fn validate(&self) -> Result<()> {
        if !self.nameservers.is_empty() && (!self.records.is_empty() || self.email_type.is_some()) {
            return Err(RegistrarError::ModeConflict {
                detail: "delegated nameservers and hosted records/email type requested together"
                    .to_string(),
            });
        }
        for record in &self.records {
            record.validate()?;
        }
        Ok(())
    }
}

/// Remote DNS state as reported by [`read_dns`](crate::DomainReconciler::read_dns).
///
/// Exactly one of `records`/`nameservers` is populated: the registrar
/// considers hosted records meaningless while delegation is active, so the
/// inactive mode's side is always empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDnsState {
    /// Hosted records. Empty when delegation is active.
    pub records: Vec<HostRecord>,
    /// Mail-routing mode. `None` when delegation is active.
    pub email_type: Option<EmailType>,
    /// Delegated nameservers. Empty when the registrar's DNS is active.
    pub nameservers: Vec<String>,
}
