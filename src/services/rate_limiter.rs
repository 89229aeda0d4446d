use chrono::{ DateTime, Duration, Utc };
use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::db::AdWatchRepository;
use crate::error::Result;

pub const HOURLY_AD_LIMIT: u64 = 10;
pub const DAILY_AD_LIMIT: u64 = 50;

/// Rolling windows the ad limits are counted over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateWindow {
    Hour,
    Day,
}

impl RateWindow {
    pub fn duration(&self) -> Duration {
        match self {
            RateWindow::Hour => Duration::hours(1),
            RateWindow::Day => Duration::days(1),
        }
    }
}

/// Current window usage against the fixed limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdCounts {
    pub hourly: u64,
    pub daily: u64,
    pub hourly_limit: u64,
    pub daily_limit: u64,
}

impl AdCounts {
    pub fn is_exhausted(&self) -> bool {
        self.hourly >= self.hourly_limit || self.daily >= self.daily_limit
    }
}

/// Ad-watch rate limiter over the append-only watch log.
pub struct AdRateLimiter<'a, C> {
    watches: AdWatchRepository<'a, C>,
}

impl<'a, C: ConnectionTrait> AdRateLimiter<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self {
            watches: AdWatchRepository::new(conn),
        }
    }

    pub async fn count_since(
        &self,
        user_id: &str,
        window: RateWindow,
        now: DateTime<Utc>
    ) -> Result<u64> {
        self.watches.count_since(user_id, now - window.duration()).await
    }

    pub async fn counts(&self, user_id: &str, now: DateTime<Utc>) -> Result<AdCounts> {
        Ok(AdCounts {
            hourly: self.count_since(user_id, RateWindow::Hour, now).await?,
            daily: self.count_since(user_id, RateWindow::Day, now).await?,
            hourly_limit: HOURLY_AD_LIMIT,
            daily_limit: DAILY_AD_LIMIT,
        })
    }

    pub async fn record_watch(&self, user_id: &str, now: DateTime<Utc>) -> Result<()> {
        self.watches.record(user_id, now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(hourly: u64, daily: u64) -> AdCounts {
        AdCounts {
            hourly,
            daily,
            hourly_limit: HOURLY_AD_LIMIT,
            daily_limit: DAILY_AD_LIMIT,
        }
    }

    #[test]
    fn test_exhaustion_thresholds() {
        assert!(!counts(9, 49).is_exhausted());
        assert!(counts(10, 10).is_exhausted());
        assert!(counts(0, 50).is_exhausted());
        assert!(counts(12, 60).is_exhausted());
    }
}
