//! Provisioning actions: purchase, renew, reactivate.

use tokio::sync::Mutex;

use crate::error::{RegistrarError, Result};
use crate::gateway::{CreateDomainRequest, CreateReceipt, PricingAction, RegistrarGateway};
use crate::types::{ContactAddress, DomainDescriptor};

use super::DomainReconciler;

/// Process-wide cache for the account's primary contact address.
///
/// Contact data is immutable account configuration, so it is fetched at
/// most once and reused for every subsequent domain creation. The mutex
/// makes the single write safe when the cache is shared across threads.
#[derive(Debug, Default)]
pub struct ContactCache {
    slot: Mutex<Option<ContactAddress>>,
}

impl ContactCache {
    /// An empty cache; the first creation fills it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached address, fetching it from the registrar on first
    /// use.
    pub(crate) async fn get_or_fetch<G: RegistrarGateway>(
        &self,
        gateway: &G,
    ) -> Result<ContactAddress> {
        let mut slot = self.slot.lock().await;
        if let Some(contact) = slot.as_ref() {
            return Ok(contact.clone());
        }
        let contact = gateway.get_contact_address().await?;
        *slot = Some(contact.clone());
        Ok(contact)
    }
}

/// Uppercased final label of a domain name, for pricing lookups.
fn tld_of(name: &str) -> String {
    name.rsplit('.').next().unwrap_or(name).to_uppercase()
}

/// Parses a registrar decimal price string.
fn parse_price(raw: &str, domain: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| RegistrarError::InvalidRecordValue {
            detail: format!("unparseable price '{raw}' for domain '{domain}'"),
        })
}

impl<G: RegistrarGateway> DomainReconciler<G> {
    /// Purchases the descriptor's domain.
    ///
    /// Fails with [`AlreadyExists`](RegistrarError::AlreadyExists) when the
    /// account already holds the domain,
    /// [`NotAvailable`](RegistrarError::NotAvailable) when it cannot be
    /// registered, and [`OverBudget`](RegistrarError::OverBudget) when the
    /// resolved price exceeds the descriptor's ceiling.
    ///
    /// The whole attempt — existence check included — sits inside the retry
    /// loop, so a create whose confirmation was lost to a transport failure
    /// is re-checked before it is ever re-issued.
    pub async fn create(&self, descriptor: &DomainDescriptor) -> Result<CreateReceipt> {
        descriptor.validate()?;
        let name = descriptor.name.to_ascii_lowercase();
        self.retry
            .call("create_domain", || self.try_create(&name, descriptor))
            .await
    }

    /// One unretried creation attempt.
    async fn try_create(&self, name: &str, descriptor: &DomainDescriptor) -> Result<CreateReceipt> {
        let lookup = self.gateway.lookup_domain(name).await?;
        if lookup.into_snapshot(name).found {
            return Err(RegistrarError::AlreadyExists {
                domain: name.to_string(),
            });
        }

        let check = self.gateway.check_availability(name).await?;
        if !check.available {
            return Err(RegistrarError::NotAvailable {
                domain: name.to_string(),
                raw_message: None,
            });
        }

        // A premium price reported by the availability check wins; "0"
        // means the domain is standard and the TLD pricing table applies.
        let price = if check.premium_price.trim() == "0" {
            self.gateway
                .lookup_pricing(PricingAction::Register, &tld_of(name), descriptor.years)
                .await?
        } else {
            parse_price(&check.premium_price, name)?
        };

        if price > descriptor.max_price {
            return Err(RegistrarError::OverBudget {
                domain: name.to_string(),
                price,
                max_price: descriptor.max_price,
            });
        }

        log::debug!("domain {name} is available at {price}, creating");

        let contact = self.contacts.get_or_fetch(&self.gateway).await?;
        let receipt = self
            .gateway
            .create_domain(&CreateDomainRequest {
                name: name.to_string(),
                years: descriptor.years,
                nameservers: descriptor.nameservers.clone(),
                contact,
            })
            .await?;

        if !receipt.registered {
            return Err(RegistrarError::Api {
                code: None,
                message: format!("registrar did not confirm registration of '{name}'"),
            });
        }

        log::debug!(
            "registered {name} for {} years, charged {}",
            descriptor.years,
            receipt.charged_amount
        );
        Ok(receipt)
    }

    /// Renews the domain for `years`.
    ///
    /// Fails with [`RenewalRejected`](RegistrarError::RenewalRejected) when
    /// the registrar answers without a positive confirmation flag.
    pub async fn renew(&self, name: &str, years: u32) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let receipt = self
            .retry
            .call("renew_domain", || self.gateway.renew_domain(&name, years))
            .await?;

        if !receipt.renewed {
            return Err(RegistrarError::RenewalRejected {
                domain: name,
                raw_message: None,
            });
        }

        log::debug!("renewed {name} for {years} years");
        Ok(())
    }

    /// Reactivates an expired domain for `years`.
    ///
    /// Fails with
    /// [`ReactivationRejected`](RegistrarError::ReactivationRejected) when
    /// the registrar answers without a positive confirmation flag.
    pub async fn reactivate(&self, name: &str, years: u32) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let receipt = self
            .retry
            .call("reactivate_domain", || {
                self.gateway.reactivate_domain(&name, years)
            })
            .await?;

        if !receipt.success {
            return Err(RegistrarError::ReactivationRejected {
                domain: name,
                raw_message: None,
            });
        }

        log::debug!("reactivated {name} for {years} years");
        Ok(())
    }
}
