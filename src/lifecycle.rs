//! Domain lifecycle decision engine.
//!
//! A pure function from `(descriptor, remote snapshot, now)` to the single
//! corrective action a reconciliation pass should take. All gateway I/O
//! happens before (snapshot fetch) or after (provisioning) this module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DomainDescriptor, RemoteDomainSnapshot};

/// The action one reconciliation pass should take for a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    /// Register the domain; the account does not hold it.
    Create,
    /// Renew the active registration before it expires.
    Renew,
    /// Recover a registration that has lapsed past expiry.
    Reactivate,
    /// Nothing to do.
    Skip,
}

/// Decides what to do with a domain, in fixed precedence order:
///
/// 1. Not present in the account → [`Create`](LifecycleAction::Create).
/// 2. Renewal disabled (`min_days_remaining <= 0` or `auto_renew` off) →
///    [`Skip`](LifecycleAction::Skip), regardless of expiry state.
/// 3. Expired → [`Reactivate`](LifecycleAction::Reactivate). A lapsed
///    registration has its own registrar flow and pricing, so it is never
///    renewed.
/// 4. Fewer whole days remaining than `min_days_remaining` →
///    [`Renew`](LifecycleAction::Renew).
/// 5. Otherwise → [`Skip`](LifecycleAction::Skip).
///
/// Expiry arithmetic is in UTC; `now` is explicit so the function stays
/// deterministic.
pub fn decide(
    descriptor: &DomainDescriptor,
    snapshot: &RemoteDomainSnapshot,
    now: DateTime<Utc>,
) -> LifecycleAction {
    if !snapshot.found {
        return LifecycleAction::Create;
    }

    if descriptor.min_days_remaining <= 0 || !descriptor.auto_renew {
        return LifecycleAction::Skip;
    }

    if snapshot.expired {
        return LifecycleAction::Reactivate;
    }

    // A found, unexpired domain without an expiry date gives us nothing to
    // compare; renewing on a guess risks a spurious charge.
    let Some(expires_at) = snapshot.expires_at else {
        return LifecycleAction::Skip;
    };

    if days_remaining(expires_at, now) < descriptor.min_days_remaining {
        return LifecycleAction::Renew;
    }

    LifecycleAction::Skip
}

/// Whole days between `now` and `expires_at`, truncated toward zero.
/// Negative once the expiry has passed.
pub fn days_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expires_at - now).num_days()
}
