use crate::core::errors::ExchangeError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use zeroize::ZeroizeOnDrop;

type HmacSha256 = Hmac<Sha256>;

/// Signer trait for request authentication
///
/// The dispatcher hands over the already URL-encoded query string and form
/// body; implementations return the value of the `signature` query parameter.
pub trait Signer: Send + Sync {
    /// Key sent in the `X-MBX-APIKEY` header
    fn api_key(&self) -> &str;

    /// Sign the encoded query string followed by the encoded form body
    fn sign(&self, query_string: &str, form_string: &str) -> Result<String, ExchangeError>;
}

/// API key and secret owned by a client for its whole lifetime.
///
/// The secret is only ever used as an HMAC key and is wiped on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Credentials {
    api_key: String,
    secret_key: Box<[u8]>,
}

impl Credentials {
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key,
            secret_key: secret_key.into_bytes().into_boxed_slice(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// HMAC-SHA256 signer with lowercase hex output
#[derive(Debug, Clone)]
pub struct HmacSigner {
    credentials: Credentials,
}

impl HmacSigner {
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            credentials: Credentials::new(api_key, secret_key),
        }
    }

    pub fn from_credentials(credentials: Credentials) -> Self {
        Self { credentials }
    }

    fn generate_signature(&self, payload: &[&str]) -> Result<String, ExchangeError> {
        let mut mac = HmacSha256::new_from_slice(&self.credentials.secret_key)
            .map_err(|e| ExchangeError::AuthError(format!("Invalid secret key: {}", e)))?;
        for part in payload {
            mac.update(part.as_bytes());
        }
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl Signer for HmacSigner {
    fn api_key(&self) -> &str {
        self.credentials.api_key()
    }

    // Query string first, form body second, nothing in between. The exchange
    // recomputes exactly this concatenation.
    fn sign(&self, query_string: &str, form_string: &str) -> Result<String, ExchangeError> {
        self.generate_signature(&[query_string, form_string])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Published Binance signing examples.
    const TEST_SECRET: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
    const QUERY: &str = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC";
    const FORM: &str = "quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";

    fn signer() -> HmacSigner {
        HmacSigner::new("test_key".to_string(), TEST_SECRET.to_string())
    }

    #[test]
    fn test_query_only_vector() {
        assert_eq!(
            signer().sign("timestamp=1578963600000", "").unwrap(),
            "d84e6641b1e328e7b418fff030caed655c266299c9355e36ce801ed14631eed4"
        );
    }

    #[test]
    fn test_query_and_form_are_concatenated_without_separator() {
        assert_eq!(
            signer().sign(QUERY, FORM).unwrap(),
            "0fd168b8ddb4876a0358a8d14d0c9f3da0e9b20c5d52b2a00fcf7d1c602f9a77"
        );
    }

    #[test]
    fn test_reversed_order_does_not_match() {
        let signer = signer();
        assert_ne!(
            signer.sign(FORM, QUERY).unwrap(),
            signer.sign(QUERY, FORM).unwrap()
        );
    }

    #[test]
    fn test_ampersand_joined_payload_does_not_match() {
        let signer = signer();
        let joined = format!("{}&{}", QUERY, FORM);
        assert_eq!(
            signer.sign(&joined, "").unwrap(),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
        assert_ne!(signer.sign(&joined, "").unwrap(), signer.sign(QUERY, FORM).unwrap());
    }

    #[test]
    fn test_signature_is_deterministic_and_value_sensitive() {
        let signer = signer();
        let first = signer.sign("symbol=BTCUSDT&timestamp=1", "quantity=1").unwrap();
        let second = signer.sign("symbol=BTCUSDT&timestamp=1", "quantity=1").unwrap();
        let changed = signer.sign("symbol=BTCUSDT&timestamp=1", "quantity=2").unwrap();

        assert_eq!(first, second);
        assert_ne!(first, changed);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", signer());
        assert!(rendered.contains("test_key"));
        assert!(!rendered.contains(TEST_SECRET));
    }
}
