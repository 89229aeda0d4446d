use hmac::{ Hmac, Mac };
use serde::Deserialize;
use sha2::Sha256;

use crate::error::{ AppError, Result };

use super::{ IdentityVerifier, VerifiedIdentity };

type HmacSha256 = Hmac<Sha256>;

const WEB_APP_KEY: &[u8] = b"WebAppData";

#[derive(Deserialize)]
struct TelegramUser {
    id: i64,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

/// Verifies Telegram Mini App `initData` against the bot token.
pub struct TelegramInitDataVerifier {
    secret_key: Vec<u8>,
}

impl TelegramInitDataVerifier {
    pub fn new(bot_token: &str) -> Result<Self> {
        let mut mac = HmacSha256::new_from_slice(WEB_APP_KEY).map_err(|e|
            AppError::Internal(e.to_string())
        )?;
        mac.update(bot_token.as_bytes());

        Ok(Self {
            secret_key: mac.finalize().into_bytes().to_vec(),
        })
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret_key).map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Hex signature for a data-check string.
    pub fn sign(&self, data_check_string: &str) -> Result<String> {
        let mut mac = self.mac()?;
        mac.update(data_check_string.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

/// Decode `application/x-www-form-urlencoded` pairs, `+` meaning space.
fn parse_pairs(init_data: &str) -> Result<Vec<(String, String)>> {
    let decode = |raw: &str| -> Result<String> {
        urlencoding
            ::decode(&raw.replace('+', " "))
            .map(|s| s.into_owned())
            .map_err(|_| AppError::InvalidInput("Malformed initData".to_string()))
    };

    init_data
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> Result<(String, String)> {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((decode(key)?, decode(value)?))
        })
        .collect()
}

/// Sorted `key=value` lines, excluding the signature itself.
fn data_check_string(pairs: &[(String, String)]) -> String {
    let mut fields: Vec<&(String, String)> = pairs
        .iter()
        .filter(|(key, _)| key != "hash")
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

impl IdentityVerifier for TelegramInitDataVerifier {
    fn verify(&self, init_data: &str) -> Result<VerifiedIdentity> {
        if init_data.trim().is_empty() {
            return Err(AppError::MissingInitData);
        }

        let pairs = parse_pairs(init_data)?;

        let supplied = pairs
            .iter()
            .find(|(key, _)| key == "hash")
            .map(|(_, value)| value.as_str())
            .ok_or(AppError::InvalidSignature)?;
        let supplied = hex::decode(supplied).map_err(|_| AppError::InvalidSignature)?;

        let mut mac = self.mac()?;
        mac.update(data_check_string(&pairs).as_bytes());
        mac.verify_slice(&supplied).map_err(|_| AppError::InvalidSignature)?;

        let user_json = pairs
            .iter()
            .find(|(key, _)| key == "user")
            .map(|(_, value)| value.as_str())
            .ok_or(AppError::MissingUserData)?;

        let user: TelegramUser = serde_json
            ::from_str(user_json)
            .map_err(|e| AppError::InvalidInput(format!("Malformed user data: {}", e)))?;

        Ok(VerifiedIdentity {
            user_id: user.id.to_string(),
            first_name: user.first_name.unwrap_or_default(),
            username: user.username.unwrap_or_default(),
        })
    }
}

/// Build a signed `initData` string. Used by tests across the crate.
#[cfg(test)]
pub(crate) fn signed_init_data(bot_token: &str, pairs: &[(&str, &str)]) -> String {
    let owned: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let verifier = TelegramInitDataVerifier::new(bot_token).unwrap();
    let hash = verifier.sign(&data_check_string(&owned)).unwrap();

    let mut query: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect();
    query.push(format!("hash={}", hash));
    query.join("&")
}
