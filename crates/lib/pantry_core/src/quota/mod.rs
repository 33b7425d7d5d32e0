//! Usage-quota metering.
//!
//! Two independent counter families on the user record: rolling quotas
//! reset on a fixed interval anchored to the last reset, monthly quotas
//! reset on the first day of the next calendar month. Both resets are
//! lazy — applied when a consume/check touches the record, never by a
//! background sweep.

pub mod ledger;
pub mod tiers;

use thiserror::Error;

use crate::models::quota::{LimitKind, RollingQuotaKind};

/// Quota errors. The exceeded variants carry the kind and numeric limit so
/// callers can render an actionable message; internal identifiers are never
/// exposed.
#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("{kind} limit of {limit} exceeded")]
    Exceeded { kind: RollingQuotaKind, limit: i64 },

    #[error("Monthly {kind} limit of {limit} reached")]
    MonthlyExceeded { kind: LimitKind, limit: i64 },

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}
