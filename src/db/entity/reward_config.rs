use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// Id of the singleton configuration row.
pub const SINGLETON_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reward_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub ad_reward: Decimal,
    pub daily_login_reward: Decimal,
    pub referral_bonus: Decimal,
    pub new_user_bonus: Decimal,
    pub min_withdraw: Decimal,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
