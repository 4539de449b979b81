use std::fmt::Write;

use sha2::{Digest, Sha256};

use super::*;

const TOKEN_BYTES: usize = 32;

/// Freshly generated invitation token. Only `hash` is ever persisted.
pub(super) struct InvitationToken {
    pub(super) raw: String,
    pub(super) hash: String,
}

impl InvitationToken {
    pub(super) fn generate() -> AppResult<Self> {
        let mut bytes = [0u8; TOKEN_BYTES];
        getrandom::fill(&mut bytes).map_err(|error| {
            AppError::Internal(format!("failed to generate invitation token: {error}"))
        })?;

        let raw = to_hex(&bytes);
        let hash = hash_token(&raw);
        Ok(Self { raw, hash })
    }
}

/// Computes the storage digest of a raw token.
pub(super) fn hash_token(raw_token: &str) -> String {
    to_hex(&Sha256::digest(raw_token.trim().as_bytes()))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        })
}
