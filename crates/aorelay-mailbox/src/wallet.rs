//! Signing identity loaded from a key file

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use ed25519_dalek::{Signer, SigningKey};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

use aorelay_proto::{SignedEnvelope, Tag};

use crate::error::TransportError;

/// JWK key file contents (OKP / Ed25519)
#[derive(Debug, Deserialize)]
struct KeyFile {
    kty: String,
    crv: String,
    d: String,
}

/// Process identity used to sign outgoing submissions
///
/// Loaded once at startup; a load failure means the process cannot start.
pub struct WalletIdentity {
    signing_key: SigningKey,
    address: String,
}

impl WalletIdentity {
    /// Load the identity from a JWK file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let identity = Self::from_jwk_json(&raw)?;
        info!(address = %identity.address, "Loaded wallet identity");
        Ok(identity)
    }

    /// Parse the identity from JWK JSON
    pub fn from_jwk_json(raw: &str) -> Result<Self, TransportError> {
        let key: KeyFile = serde_json::from_str(raw)
            .map_err(|e| TransportError::Credential(format!("malformed key file: {}", e)))?;

        if key.kty != "OKP" || key.crv != "Ed25519" {
            return Err(TransportError::Credential(format!(
                "unsupported key type {}/{}",
                key.kty, key.crv
            )));
        }

        let secret = URL_SAFE_NO_PAD
            .decode(&key.d)
            .map_err(|e| TransportError::Credential(format!("invalid secret encoding: {}", e)))?;
        let secret: [u8; 32] = secret
            .try_into()
            .map_err(|_| TransportError::Credential("secret key must be 32 bytes".to_string()))?;

        Ok(Self::from_secret_bytes(&secret))
    }

    /// Build the identity from raw secret key bytes
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(secret);
        let public = signing_key.verifying_key();
        let address = URL_SAFE_NO_PAD.encode(Sha256::digest(public.as_bytes()));
        Self {
            signing_key,
            address,
        }
    }

    /// Address derived from the public key
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Public key, base64url
    pub fn owner(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.signing_key.verifying_key().as_bytes())
    }

    /// Sign a write and assemble the submission envelope
    pub fn seal(&self, process: &str, tags: Vec<Tag>, data: String) -> SignedEnvelope {
        let digest = envelope_digest(process, &tags, &data);
        let signature = self.signing_key.sign(&digest);

        SignedEnvelope {
            process: process.to_string(),
            owner: self.owner(),
            tags,
            data,
            signature: URL_SAFE_NO_PAD.encode(signature.to_bytes()),
        }
    }
}

/// Digest covered by an envelope signature: process address, tags in
/// order, then the payload.
fn envelope_digest(process: &str, tags: &[Tag], data: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(process.as_bytes());
    for tag in tags {
        hasher.update(tag.name.as_bytes());
        hasher.update(tag.value.as_bytes());
    }
    hasher.update(data.as_bytes());
    hasher.finalize().into()
}
