use std::env;

use chrono::FixedOffset;

use crate::auth::AdminIds;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub telegram_bot_token: Option<String>,
    pub admin_ids: AdminIds,
    pub server_host: String,
    pub server_port: u16,
    /// Offset that defines the server's calendar day for daily check-in.
    pub day_boundary_offset: FixedOffset,
    pub require_init_data: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        // Absent token only disables /auth/verify
        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let admin_ids = AdminIds::parse(&env::var("ADMIN_IDS").unwrap_or_default());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;

        let offset_minutes: i32 = env::var("DAY_BOUNDARY_OFFSET_MINUTES")
            .unwrap_or_else(|_| "0".to_string())
            .parse()?;
        let day_boundary_offset = Self::parse_day_offset(offset_minutes)?;

        let require_init_data = Self::parse_flag(
            &env::var("REQUIRE_INIT_DATA").unwrap_or_else(|_| "false".to_string())
        )?;

        Ok(Config {
            database_url,
            telegram_bot_token,
            admin_ids,
            server_host,
            server_port,
            day_boundary_offset,
            require_init_data,
        })
    }

    fn parse_day_offset(minutes: i32) -> Result<FixedOffset, Box<dyn std::error::Error>> {
        FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            "DAY_BOUNDARY_OFFSET_MINUTES must be within -1439..=1439".into()
        })
    }

    fn parse_flag(value: &str) -> Result<bool, Box<dyn std::error::Error>> {
        match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" | "" => Ok(false),
            other => Err(format!("Invalid boolean flag: {}", other).into()),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
