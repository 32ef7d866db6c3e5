//! DNS reconciliation: hosted records vs. delegated nameservers.
//!
//! The registrar allows at most one active mode per domain, and record
//! writes are whole-set replacements. Convergence therefore means: pick the
//! desired mode, clear the other one when necessary, and write the complete
//! desired state.

use crate::error::{RegistrarError, Result};
use crate::gateway::RegistrarGateway;
use crate::types::{DesiredDns, DnsMode, EmailType, HostRecord, RecordType, RemoteDnsState};

use super::DomainReconciler;

/// CNAME target of the registrar's auto-created parking page record.
const PARKING_CNAME_TARGET: &str = "parkingpage.namecheap.com.";

/// Appends the trailing dot FQDN canonicalization when it is missing.
fn ensure_trailing_dot(address: &str) -> String {
    if address.ends_with('.') {
        address.to_string()
    } else {
        format!("{address}.")
    }
}

/// Rewrites a CAA `iodef` value into the registrar's canonical shape.
///
/// The value must consist of exactly three whitespace-separated fields
/// (flags, tag, reporting URI); the URI is wrapped in double quotes when it
/// is not already. A half-quoted URI or any other field count is malformed.
fn fix_caa_iodef_address(address: &str) -> Result<String> {
    let mut fields: Vec<String> = address.split_whitespace().map(str::to_string).collect();

    if fields.len() != 3 {
        return Err(RegistrarError::InvalidRecordValue {
            detail: format!("invalid CAA value \"{address}\""),
        });
    }

    let has_prefix_quote = fields[2].starts_with('"');
    let has_suffix_quote = fields[2].ends_with('"');

    if !has_prefix_quote && !has_suffix_quote {
        fields[2] = format!("\"{}\"", fields[2]);
    } else if !has_prefix_quote || !has_suffix_quote {
        return Err(RegistrarError::InvalidRecordValue {
            detail: format!("invalid CAA value \"{address}\""),
        });
    }

    Ok(fields.join(" "))
}

/// Canonicalizes a record address for comparison and writing.
///
/// - `CNAME`, `ALIAS`, `NS`, `MX`: trailing-dot FQDN form.
/// - `CAA` values containing `iodef`: quoted three-field form (see
///   [`fix_caa_iodef_address`]).
/// - Everything else passes through unchanged.
///
/// Normalization is idempotent: feeding a normalized address back in
/// returns it unchanged.
pub fn normalize_address(record_type: RecordType, address: &str) -> Result<String> {
    match record_type {
        RecordType::Cname | RecordType::Alias | RecordType::Ns | RecordType::Mx => {
            Ok(ensure_trailing_dot(address))
        }
        RecordType::Caa if address.contains("iodef") => fix_caa_iodef_address(address),
        _ => Ok(address.to_string()),
    }
}

/// Identity key for diffing: `(hostname, type, address)`, case-sensitive.
/// `mx_pref` and `ttl` are deliberately excluded; they are overwritten on
/// every write and never block equality.
pub fn record_key(record: &HostRecord) -> String {
    format!(
        "[{}:{}:{}]",
        record.hostname, record.record_type, record.address
    )
}

/// Returns the record set with every address normalized.
fn normalize_records(records: &[HostRecord]) -> Result<Vec<HostRecord>> {
    records
        .iter()
        .map(|record| {
            let address = normalize_address(record.record_type, &record.address)?;
            Ok(HostRecord {
                address,
                ..record.clone()
            })
        })
        .collect()
}

/// Carries the remote mail-routing mode forward, degrading `MX`/`MXE` to
/// `NONE` when the desired set no longer contains a record of the
/// corresponding type. Without this the registrar keeps a mail mode that
/// references records which are about to be deleted.
fn resolve_email_type(remote: EmailType, records: &[HostRecord]) -> EmailType {
    let required = match remote {
        EmailType::Mx => RecordType::Mx,
        EmailType::Mxe => RecordType::Mxe,
        _ => return remote,
    };

    if records.iter().any(|r| r.record_type == required) {
        remote
    } else {
        EmailType::None
    }
}

/// Drops the registrar's auto-created parking records (the `www` parking
/// CNAME and the apex redirect) so they never show up as drift.
fn filter_parking_records(records: Vec<HostRecord>, domain: &str) -> Vec<HostRecord> {
    let apex_redirect_prefix = format!("http://www.{domain}");
    records
        .into_iter()
        .filter(|record| {
            !(record.record_type == RecordType::Cname
                && record.hostname == "www"
                && record.address == PARKING_CNAME_TARGET)
                && !(record.record_type == RecordType::Url
                    && record.hostname == "@"
                    && record.address.starts_with(&apex_redirect_prefix))
        })
        .collect()
}

/// Rewrites remote addresses back to the caller's pre-normalization form
/// wherever the identity keys match, so normalization alone never reads as
/// a difference.
fn restore_known_addresses(
    mut remote: Vec<HostRecord>,
    known_desired: &[HostRecord],
) -> Result<Vec<HostRecord>> {
    for remote_record in &mut remote {
        let remote_hash = record_key(remote_record);
        for desired in known_desired {
            let normalized = HostRecord {
                address: normalize_address(desired.record_type, &desired.address)?,
                ..desired.clone()
            };
            if record_key(&normalized) == remote_hash {
                remote_record.address = desired.address.clone();
                break;
            }
        }
    }
    Ok(remote)
}

impl<G: RegistrarGateway> DomainReconciler<G> {
    /// Converges the domain's DNS configuration onto `desired`.
    ///
    /// Delegated mode (non-empty nameserver list) overwrites the delegation
    /// wholesale. Hosted mode first clears any active delegation — the
    /// registrar rejects record writes while the domain is delegated — then
    /// replaces the full record set. An empty desired state is written out
    /// explicitly (empty record set, email type `NONE`) rather than treated
    /// as a no-op, so removal actually removes.
    pub async fn reconcile_dns(&self, name: &str, desired: &DesiredDns) -> Result<()> {
        desired.validate()?;
        let name = name.to_ascii_lowercase();

        match desired.mode() {
            DnsMode::Delegated => {
                log::debug!(
                    "delegating {name} to {} nameservers",
                    desired.nameservers.len()
                );
                self.retry
                    .call("set_nameservers", || {
                        self.gateway.set_nameservers(&name, &desired.nameservers)
                    })
                    .await
            }
            DnsMode::Hosted => {
                let status = self
                    .retry
                    .call("get_nameservers", || self.gateway.get_nameservers(&name))
                    .await?;

                if !status.using_registrar_dns {
                    log::debug!("{name} is delegated, resetting to registrar DNS before writing");
                    self.retry
                        .call("reset_nameservers", || {
                            self.gateway.reset_nameservers(&name)
                        })
                        .await?;
                }

                let records = normalize_records(&desired.records)?;

                let email_type = match desired.email_type {
                    Some(explicit) => explicit,
                    // Host records are unreadable while delegation is
                    // active, and the reset wipes any hosted mail mode.
                    None if !status.using_registrar_dns => EmailType::None,
                    None => {
                        let remote = self
                            .retry
                            .call("get_host_records", || self.gateway.get_host_records(&name))
                            .await?;
                        resolve_email_type(remote.email_type, &records)
                    }
                };

                log::debug!(
                    "writing {} hosted records to {name} (email type {})",
                    records.len(),
                    email_type.as_str()
                );
                self.retry
                    .call("set_host_records", || {
                        self.gateway.set_host_records(&name, &records, email_type)
                    })
                    .await
            }
        }
    }

    /// Reads the domain's remote DNS state.
    ///
    /// Delegation status is queried before host records: while delegation
    /// is active the registrar considers hosted records meaningless, so the
    /// record side is reported empty without being queried. `known_desired`
    /// is the caller's last desired record set; remote records matching one
    /// of its entries are reported with the caller's original address so
    /// normalization never surfaces as drift.
    pub async fn read_dns(
        &self,
        name: &str,
        known_desired: &[HostRecord],
    ) -> Result<RemoteDnsState> {
        let name = name.to_ascii_lowercase();

        let status = self
            .retry
            .call("get_nameservers", || self.gateway.get_nameservers(&name))
            .await?;

        if !status.using_registrar_dns {
            return Ok(RemoteDnsState {
                records: vec![],
                email_type: None,
                nameservers: status.nameservers,
            });
        }

        let snapshot = self
            .retry
            .call("get_host_records", || self.gateway.get_host_records(&name))
            .await?;

        let records = filter_parking_records(snapshot.records, &name);
        let records = restore_known_addresses(records, known_desired)?;

        Ok(RemoteDnsState {
            records,
            email_type: Some(snapshot.email_type),
            nameservers: vec![],
        })
    }
}
