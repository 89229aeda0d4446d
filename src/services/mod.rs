pub mod user_locks;
pub mod ledger_service;
pub mod config_service;
pub mod rate_limiter;
pub mod ad_service;
pub mod checkin_service;
pub mod task_service;
pub mod withdrawal_service;

pub use user_locks::UserLocks;
pub use ledger_service::{ GetOrCreateUser, LedgerService, ReferralSummary, UserProfile };
pub use config_service::ConfigService;
pub use rate_limiter::AdCounts;
pub use ad_service::{ AdReward, AdService };
pub use checkin_service::{ CheckinReward, CheckinService };
pub use task_service::{ NewTask, TaskReward, TaskService, TaskSummary };
pub use withdrawal_service::{
    PendingWithdrawal,
    WithdrawalReceipt,
    WithdrawalRecord,
    WithdrawalService,
};
