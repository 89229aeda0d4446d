use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::AppError;

// ─── WithdrawalStatus ───────────────────────────────────────────────

/// Lifecycle of a withdrawal request. There is no rejected state: funds are
/// reserved at request time and only ever released by approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
}

impl WithdrawalStatus {
    /// Canonical string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the stored column value. Anything else means a corrupt row.
impl FromStr for WithdrawalStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(WithdrawalStatus::Pending),
            "approved" => Ok(WithdrawalStatus::Approved),
            _ => Err(AppError::Internal(format!("Unknown withdrawal status: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_storage_string() {
        for status in [WithdrawalStatus::Pending, WithdrawalStatus::Approved] {
            assert_eq!(status.as_str().parse::<WithdrawalStatus>().unwrap(), status);
        }
        assert!("rejected".parse::<WithdrawalStatus>().is_err());
    }
}
