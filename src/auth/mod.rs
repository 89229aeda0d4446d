use std::collections::HashSet;

use crate::error::{ AppError, Result };

pub mod telegram;
pub use telegram::TelegramInitDataVerifier;

/// Identity extracted from a verified client payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub user_id: String,
    pub first_name: String,
    pub username: String,
}

/// Turns an opaque signed client payload into a trusted identity.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, init_data: &str) -> Result<VerifiedIdentity>;
}

/// Admin allow-list, sourced from `ADMIN_IDS`.
#[derive(Debug, Clone, Default)]
pub struct AdminIds {
    ids: HashSet<String>,
}

impl AdminIds {
    /// Parse a comma-separated list. Entries are trimmed and empties dropped.
    pub fn parse(raw: &str) -> Self {
        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        Self { ids }
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.ids.contains(user_id)
    }

    pub fn ensure_admin(&self, user_id: &str) -> Result<()> {
        if self.contains(user_id) {
            Ok(())
        } else {
            tracing::warn!("Admin operation refused for user {}", user_id);
            Err(AppError::Unauthorized)
        }
    }
}
