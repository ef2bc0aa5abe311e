//! Upload identifiers: short random ids plus a signature tying each id to
//! the submitting job's secret, so workers only write under keys the job
//! minted.

use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

const ID_LENGTH: usize = 8;

/// Random alphanumeric upload identifier.
pub fn generate_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}

/// A fresh identifier and its hex signature under `secret`.
pub fn generate_signed_id(secret: &str) -> (String, String) {
    let id = generate_id();
    let signature = sign_id(&id, secret);
    (id, signature)
}

/// Hex digest binding an id to a secret.
pub fn sign_id(id: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check an id/signature pair minted by `generate_signed_id`.
pub fn verify_id(id: &str, signature: &str, secret: &str) -> bool {
    sign_id(id, secret) == signature
}
