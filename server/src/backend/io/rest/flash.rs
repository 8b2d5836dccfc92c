//! One-shot flash messages carried in a signed cookie.
//!
//! Cookie value: `level.hexmessage.hexsig` where the signature is
//! HMAC-SHA256 of `level.hexmessage` keyed with the secret. A cookie with a
//! bad signature or unknown level is ignored.

use axum::http::{header, HeaderMap};
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

pub const FLASH_COOKIE: &str = "flash";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Danger,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Danger => "danger",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "success" => Some(FlashLevel::Success),
            "danger" => Some(FlashLevel::Danger),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Success, message: message.into() }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Danger, message: message.into() }
    }
}

/// Signs and verifies flash cookies with a key derived from the secret
#[derive(Clone)]
pub struct FlashSigner {
    key: HmacSha256,
}

impl FlashSigner {
    pub fn new(secret: &str) -> Result<Self, InvalidLength> {
        Ok(Self {
            key: HmacSha256::new_from_slice(secret.as_bytes())?,
        })
    }

    fn mac(&self, payload: &str) -> HmacSha256 {
        let mut mac = self.key.clone();
        mac.update(payload.as_bytes());
        mac
    }

    pub fn encode(&self, flash: &FlashMessage) -> String {
        let payload = format!("{}.{}", flash.level.as_str(), hex::encode(flash.message.as_bytes()));
        let signature = hex::encode(self.mac(&payload).finalize().into_bytes());
        format!("{}.{}", payload, signature)
    }

    pub fn decode(&self, value: &str) -> Option<FlashMessage> {
        let (payload, signature) = value.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;
        if self.mac(payload).verify_slice(&signature).is_err() {
            warn!("Ignoring flash cookie with invalid signature");
            return None;
        }
        let (level, message) = payload.split_once('.')?;
        let bytes = hex::decode(message).ok()?;
        Some(FlashMessage {
            level: FlashLevel::parse(level)?,
            message: String::from_utf8(bytes).ok()?,
        })
    }

    /// `Set-Cookie` value carrying the message to the next page load
    pub fn set_cookie(&self, flash: &FlashMessage) -> String {
        format!("{}={}; Path=/; HttpOnly; SameSite=Lax", FLASH_COOKIE, self.encode(flash))
    }

    /// Pending message from the request's `Cookie` headers
    pub fn read(&self, headers: &HeaderMap) -> Option<FlashMessage> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == FLASH_COOKIE)
            .and_then(|(_, value)| self.decode(value))
    }
}

/// `Set-Cookie` value removing the flash cookie
pub fn clear_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", FLASH_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use sha2::Digest;

    #[test]
    fn test_encode_then_decode() {
        let signer = FlashSigner::new("secreto").unwrap();
        let flash = FlashMessage::success("✅ Registro guardado correctamente");

        let decoded = signer.decode(&signer.encode(&flash));
        assert_eq!(decoded, Some(flash));
    }

    #[test]
    fn test_tampered_or_foreign_cookie_is_ignored() {
        let signer = FlashSigner::new("secreto").unwrap();
        let encoded = signer.encode(&FlashMessage::danger("❌ Error"));

        let tampered = encoded.replacen("danger", "success", 1);
        assert_eq!(signer.decode(&tampered), None);
        assert_eq!(FlashSigner::new("otra").unwrap().decode(&encoded), None);
        assert_eq!(signer.decode("garbage"), None);
    }

    #[test]
    fn test_signature_is_keyed_hmac() {
        let signer = FlashSigner::new("secreto").unwrap();
        let encoded = signer.encode(&FlashMessage::success("ok"));
        let (payload, signature) = encoded.rsplit_once('.').unwrap();

        let mut mac = HmacSha256::new_from_slice(b"secreto").unwrap();
        mac.update(payload.as_bytes());
        assert_eq!(signature, hex::encode(mac.finalize().into_bytes()));

        // A plain prefix hash of the secret is not accepted
        let forged = format!("{}.{}", payload, hex::encode(sha2::Sha256::digest(format!("secreto.{}", payload))));
        assert_eq!(signer.decode(&forged), None);
    }

    #[test]
    fn test_read_from_cookie_header() {
        let signer = FlashSigner::new("secreto").unwrap();
        let flash = FlashMessage::danger("Nombre vacío");
        let mut headers = HeaderMap::new();
        let cookie = format!("theme=dark; {}={}", FLASH_COOKIE, signer.encode(&flash));
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());

        assert_eq!(signer.read(&headers), Some(flash));
        assert_eq!(signer.read(&HeaderMap::new()), None);
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        assert!(clear_cookie().starts_with("flash=;"));
        assert!(clear_cookie().contains("Max-Age=0"));
    }
}
