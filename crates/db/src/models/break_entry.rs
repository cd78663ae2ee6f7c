//! Break ledger entry model.

use fichaje_core::breaks::{BreakInterval, BreakKind};
use fichaje_core::error::CoreError;
use fichaje_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `shift_breaks` table. Open while `ended_at` is null.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BreakEntry {
    pub id: DbId,
    pub shift_id: DbId,
    pub kind: String,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub start_ip: String,
    pub start_user_agent: String,
    pub end_latitude: Option<f64>,
    pub end_longitude: Option<f64>,
    pub end_ip: Option<String>,
    pub end_user_agent: Option<String>,
    pub created_at: Timestamp,
}

impl BreakEntry {
    /// Resolve the stored kind, failing on an unknown value (the column has
    /// a CHECK constraint, so this only trips on schema drift).
    pub fn kind(&self) -> Result<BreakKind, CoreError> {
        BreakKind::parse(&self.kind).ok_or_else(|| {
            CoreError::Internal(format!(
                "break {} has unknown kind '{}'",
                self.id, self.kind
            ))
        })
    }

    /// View as the policy-layer interval.
    pub fn interval(&self) -> Result<BreakInterval, CoreError> {
        Ok(BreakInterval {
            kind: self.kind()?,
            started_at: self.started_at,
            ended_at: self.ended_at,
        })
    }
}
