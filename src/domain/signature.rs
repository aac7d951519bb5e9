//! Client signature derivation.

use sha2::{Digest, Sha256};
use std::fmt;

/// Fixed-width identity of a client, derived from its source address and
/// user agent.
///
/// The signature is the SHA-256 digest of `"{address}|{user_agent}"`, so it
/// is deterministic across processes and restarts and can key shared
/// storage. The digest is one-way: a storage key does not reveal the address
/// or user agent that produced it.
///
/// # Examples
///
/// ```
/// use client_throttle::ClientSignature;
///
/// let sig = ClientSignature::derive(Some("203.0.113.7"), "curl/8.4.0");
/// assert_eq!(sig, ClientSignature::derive(Some("203.0.113.7"), "curl/8.4.0"));
/// assert_eq!(sig.to_string().len(), 64);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientSignature([u8; 32]);

impl ClientSignature {
    /// Derive a signature from a source address and user agent.
    ///
    /// A missing source address hashes as the empty string, so clients
    /// without one still map onto a stable (shared) identity. The derivation
    /// is pure: no I/O, no clock, and it never fails.
    pub fn derive(source_address: Option<&str>, user_agent: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(source_address.unwrap_or("").as_bytes());
        hasher.update(b"|");
        hasher.update(user_agent.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Get the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ClientSignature {
    /// Formats the signature as 64 lowercase hex characters.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ClientSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientSignature({self})")
    }
}
