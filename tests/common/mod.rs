//! Shared test helpers: an in-memory, scriptable registrar gateway.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use registrar_reconciler::{
    AvailabilityCheck, ContactAddress, CreateDomainRequest, CreateReceipt, DomainLookup,
    EmailType, HostRecord, HostRecordsSnapshot, NameserverStatus, PricingAction,
    ReactivateReceipt, RegistrarError, RegistrarGateway, RenewReceipt, Result,
};

/// One domain as the fake registrar sees it.
#[derive(Debug, Clone)]
pub struct MockDomain {
    pub expired: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub records: Vec<HostRecord>,
    pub email_type: EmailType,
    pub using_registrar_dns: bool,
    pub nameservers: Vec<String>,
}

impl MockDomain {
    /// An active registration expiring `days` from now.
    pub fn active(days: i64) -> Self {
        Self {
            expired: false,
            expires_at: Some(Utc::now() + Duration::days(days)),
            records: vec![],
            email_type: EmailType::None,
            using_registrar_dns: true,
            nameservers: vec![],
        }
    }

    /// A registration that has lapsed past expiry.
    pub fn expired() -> Self {
        Self {
            expired: true,
            expires_at: Some(Utc::now() - Duration::days(5)),
            records: vec![],
            email_type: EmailType::None,
            using_registrar_dns: true,
            nameservers: vec![],
        }
    }

    pub fn with_records(mut self, records: Vec<HostRecord>, email_type: EmailType) -> Self {
        self.records = records;
        self.email_type = email_type;
        self
    }

    pub fn delegated(mut self, nameservers: Vec<String>) -> Self {
        self.using_registrar_dns = false;
        self.nameservers = nameservers;
        self
    }
}

#[derive(Debug, Default)]
pub struct MockState {
    pub domains: HashMap<String, MockDomain>,
    /// Availability responses keyed by domain name.
    pub availability: HashMap<String, AvailabilityCheck>,
    /// Prices keyed by `(action, tld, years)`.
    pub pricing: HashMap<(String, String, u32), f64>,
    pub contact: ContactAddress,
    /// Whether create/renew/reactivate confirm positively.
    pub create_registered: bool,
    pub renew_ok: bool,
    pub reactivate_ok: bool,
    /// Remaining injected transient failures per operation name.
    pub fail_remaining: HashMap<String, u32>,
    /// Every operation invocation, in order.
    pub calls: Vec<String>,
}

/// In-memory [`RegistrarGateway`] with scriptable responses, injectable
/// transient failures and a call log.
pub struct MockGateway {
    pub state: Mutex<MockState>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                contact: test_contact(),
                create_registered: true,
                renew_ok: true,
                reactivate_ok: true,
                ..MockState::default()
            }),
        }
    }

    pub fn with_domain(name: &str, domain: MockDomain) -> Self {
        let gateway = Self::new();
        gateway
            .state
            .lock()
            .unwrap()
            .domains
            .insert(name.to_string(), domain);
        gateway
    }

    /// Scripts the availability answer for `name`.
    pub fn set_availability(&self, name: &str, available: bool, premium_price: &str) {
        self.state.lock().unwrap().availability.insert(
            name.to_string(),
            AvailabilityCheck {
                available,
                premium_price: premium_price.to_string(),
            },
        );
    }

    /// Scripts a pricing-table entry.
    pub fn set_price(&self, action: PricingAction, tld: &str, years: u32, price: f64) {
        self.state
            .lock()
            .unwrap()
            .pricing
            .insert((action.as_str().to_string(), tld.to_string(), years), price);
    }

    /// Makes the next `times` invocations of `op` fail with a transport
    /// error.
    pub fn fail_times(&self, op: &str, times: u32) {
        self.state
            .lock()
            .unwrap()
            .fail_remaining
            .insert(op.to_string(), times);
    }

    /// Number of times `op` was invoked (failed attempts included).
    pub fn calls_of(&self, op: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.as_str() == op)
            .count()
    }

    /// The full operation log, in order.
    pub fn call_log(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn domain(&self, name: &str) -> Option<MockDomain> {
        self.state.lock().unwrap().domains.get(name).cloned()
    }

    /// Records the call and pops one injected failure if any is pending.
    fn enter(&self, op: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op.to_string());
        if let Some(remaining) = state.fail_remaining.get_mut(op) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(RegistrarError::Transport {
                    detail: format!("injected failure for {op}"),
                });
            }
        }
        Ok(())
    }
}

pub fn test_contact() -> ContactAddress {
    ContactAddress {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        address1: "1 Infinite Loop".to_string(),
        address2: String::new(),
        city: "Cupertino".to_string(),
        state_province: "CA".to_string(),
        postal_code: "95014".to_string(),
        country: "US".to_string(),
        phone: "+1.4085551234".to_string(),
        email: "jane@example.com".to_string(),
    }
}

#[async_trait]
impl RegistrarGateway for MockGateway {
    async fn lookup_domain(&self, name: &str) -> Result<DomainLookup> {
        self.enter("lookup_domain")?;
        let state = self.state.lock().unwrap();
        match state.domains.get(name) {
            Some(domain) => Ok(DomainLookup {
                found: true,
                name: name.to_string(),
                expired: domain.expired,
                expires_at: domain.expires_at,
            }),
            None => Ok(DomainLookup {
                found: false,
                name: String::new(),
                expired: false,
                expires_at: None,
            }),
        }
    }

    async fn check_availability(&self, name: &str) -> Result<AvailabilityCheck> {
        self.enter("check_availability")?;
        let state = self.state.lock().unwrap();
        Ok(state
            .availability
            .get(name)
            .cloned()
            .unwrap_or(AvailabilityCheck {
                available: false,
                premium_price: "0".to_string(),
            }))
    }

    async fn lookup_pricing(&self, action: PricingAction, tld: &str, years: u32) -> Result<f64> {
        self.enter("lookup_pricing")?;
        let state = self.state.lock().unwrap();
        state
            .pricing
            .get(&(action.as_str().to_string(), tld.to_string(), years))
            .copied()
            .ok_or_else(|| RegistrarError::Api {
                code: Some("2011170".to_string()),
                message: format!("no pricing for {tld}"),
            })
    }

    async fn get_contact_address(&self) -> Result<ContactAddress> {
        self.enter("get_contact_address")?;
        Ok(self.state.lock().unwrap().contact.clone())
    }

    async fn create_domain(&self, req: &CreateDomainRequest) -> Result<CreateReceipt> {
        self.enter("create_domain")?;
        let mut state = self.state.lock().unwrap();
        if state.domains.contains_key(&req.name) {
            return Err(RegistrarError::Api {
                code: Some("2033407".to_string()),
                message: format!("domain {} is already registered", req.name),
            });
        }
        let registered = state.create_registered;
        if registered {
            let delegated = !req.nameservers.is_empty();
            state.domains.insert(
                req.name.clone(),
                MockDomain {
                    expired: false,
                    expires_at: Some(Utc::now() + Duration::days(365 * i64::from(req.years))),
                    records: vec![],
                    email_type: EmailType::None,
                    using_registrar_dns: !delegated,
                    nameservers: req.nameservers.clone(),
                },
            );
        }
        Ok(CreateReceipt {
            registered,
            charged_amount: "8.88".to_string(),
        })
    }

    async fn renew_domain(&self, name: &str, years: u32) -> Result<RenewReceipt> {
        self.enter("renew_domain")?;
        let mut state = self.state.lock().unwrap();
        let renewed = state.renew_ok;
        if renewed {
            if let Some(domain) = state.domains.get_mut(name) {
                domain.expires_at = domain
                    .expires_at
                    .map(|at| at + Duration::days(365 * i64::from(years)));
            }
        }
        Ok(RenewReceipt { renewed })
    }

    async fn reactivate_domain(&self, name: &str, years: u32) -> Result<ReactivateReceipt> {
        self.enter("reactivate_domain")?;
        let mut state = self.state.lock().unwrap();
        let success = state.reactivate_ok;
        if success {
            if let Some(domain) = state.domains.get_mut(name) {
                domain.expired = false;
                domain.expires_at = Some(Utc::now() + Duration::days(365 * i64::from(years)));
            }
        }
        Ok(ReactivateReceipt { success })
    }

    async fn get_host_records(&self, name: &str) -> Result<HostRecordsSnapshot> {
        self.enter("get_host_records")?;
        let state = self.state.lock().unwrap();
        let domain = state
            .domains
            .get(name)
            .ok_or_else(|| RegistrarError::NotFound {
                domain: name.to_string(),
            })?;
        Ok(HostRecordsSnapshot {
            records: domain.records.clone(),
            email_type: domain.email_type,
            using_registrar_dns: domain.using_registrar_dns,
        })
    }

    async fn set_host_records(
        &self,
        name: &str,
        records: &[HostRecord],
        email_type: EmailType,
    ) -> Result<()> {
        self.enter("set_host_records")?;
        let mut state = self.state.lock().unwrap();
        let domain = state
            .domains
            .get_mut(name)
            .ok_or_else(|| RegistrarError::NotFound {
                domain: name.to_string(),
            })?;
        // The real registrar rejects record writes while the domain is
        // delegated elsewhere.
        if !domain.using_registrar_dns {
            return Err(RegistrarError::Api {
                code: Some("2030288".to_string()),
                message: "cannot set hosts while custom DNS is active".to_string(),
            });
        }
        domain.records = records.to_vec();
        domain.email_type = email_type;
        Ok(())
    }

    async fn get_nameservers(&self, name: &str) -> Result<NameserverStatus> {
        self.enter("get_nameservers")?;
        let state = self.state.lock().unwrap();
        let domain = state
            .domains
            .get(name)
            .ok_or_else(|| RegistrarError::NotFound {
                domain: name.to_string(),
            })?;
        Ok(NameserverStatus {
            using_registrar_dns: domain.using_registrar_dns,
            nameservers: domain.nameservers.clone(),
        })
    }

    async fn set_nameservers(&self, name: &str, nameservers: &[String]) -> Result<()> {
        self.enter("set_nameservers")?;
        let mut state = self.state.lock().unwrap();
        let domain = state
            .domains
            .get_mut(name)
            .ok_or_else(|| RegistrarError::NotFound {
                domain: name.to_string(),
            })?;
        domain.using_registrar_dns = false;
        domain.nameservers = nameservers.to_vec();
        Ok(())
    }

    async fn reset_nameservers(&self, name: &str) -> Result<()> {
        self.enter("reset_nameservers")?;
        let mut state = self.state.lock().unwrap();
        let domain = state
            .domains
            .get_mut(name)
            .ok_or_else(|| RegistrarError::NotFound {
                domain: name.to_string(),
            })?;
        domain.using_registrar_dns = true;
        domain.nameservers = vec![];
        Ok(())
    }
}
