pub mod user;
pub mod reward_config;
pub mod task;
pub mod completed_task;
pub mod ad_watch;
pub mod withdrawal;

pub use user::Entity as User;
pub use reward_config::Entity as RewardConfig;
pub use task::Entity as Task;
pub use completed_task::Entity as CompletedTask;
pub use ad_watch::Entity as AdWatch;
pub use withdrawal::Entity as Withdrawal;
