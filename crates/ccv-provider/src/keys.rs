//! Store key layout, including the time-ordered pending-spawn key codec.
//!
//! A pending-spawn key is `PENDING_CLIENT_PREFIX ‖ be_u64(nanos) ‖ '/' ‖ chain_id`.
//! The fixed-width big-endian time field makes byte-wise key order equal
//! chronological order, with ties broken by chain id bytes. The sweep stops at
//! the first entry that is not due, so any other encoding would strand due
//! entries behind a later one.

use std::str::Utf8Error;

use crate::types::Timestamp;

pub const PENDING_CLIENT_PREFIX: &[u8] = b"pendingclient/";
pub const CHAIN_TO_CLIENT_PREFIX: &[u8] = b"chaintoclient/";
pub const CONSUMER_GENESIS_PREFIX: &[u8] = b"consumergenesis/";

const KEY_SEPARATOR: u8 = b'/';
const TIME_WIDTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("key does not start with the pending-spawn prefix")]
    MissingPrefix,
    #[error("key suffix too short: {0} bytes")]
    Truncated(usize),
    #[error("expected '/' after the timestamp field")]
    MissingSeparator,
    #[error("chain id must not be empty")]
    EmptyChainId,
    #[error("chain id is not valid UTF-8: {0}")]
    InvalidChainId(#[from] Utf8Error),
}

/// Decoded pending-spawn key.
///
/// `Ord` matches the byte order of [`SpawnKey::encode`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpawnKey {
    spawn_time: Timestamp,
    chain_id: String,
}

impl SpawnKey {
    pub fn new(spawn_time: Timestamp, chain_id: impl Into<String>) -> Result<Self, KeyError> {
        let chain_id = chain_id.into();
        if chain_id.is_empty() {
            return Err(KeyError::EmptyChainId);
        }
        Ok(Self {
            spawn_time,
            chain_id,
        })
    }

    pub fn spawn_time(&self) -> Timestamp {
        self.spawn_time
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn into_parts(self) -> (Timestamp, String) {
        (self.spawn_time, self.chain_id)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(
            PENDING_CLIENT_PREFIX.len() + TIME_WIDTH + 1 + self.chain_id.len(),
        );
        key.extend_from_slice(PENDING_CLIENT_PREFIX);
        key.extend_from_slice(&self.spawn_time.unix_nanos().to_be_bytes());
        key.push(KEY_SEPARATOR);
        key.extend_from_slice(self.chain_id.as_bytes());
        key
    }

    pub fn decode(key: &[u8]) -> Result<Self, KeyError> {
        let suffix = key
            .strip_prefix(PENDING_CLIENT_PREFIX)
            .ok_or(KeyError::MissingPrefix)?;
        if suffix.len() <= TIME_WIDTH {
            return Err(KeyError::Truncated(suffix.len()));
        }
        let (time_bytes, rest) = suffix.split_at(TIME_WIDTH);
        let chain_bytes = rest
            .strip_prefix(&[KEY_SEPARATOR])
            .ok_or(KeyError::MissingSeparator)?;
        let mut nanos = [0u8; TIME_WIDTH];
        nanos.copy_from_slice(time_bytes);
        let chain_id = std::str::from_utf8(chain_bytes)?;
        SpawnKey::new(Timestamp::from_unix_nanos(u64::from_be_bytes(nanos)), chain_id)
    }
}

pub fn chain_to_client_key(chain_id: &str) -> Vec<u8> {
    prefixed(CHAIN_TO_CLIENT_PREFIX, chain_id)
}

pub fn consumer_genesis_key(chain_id: &str) -> Vec<u8> {
    prefixed(CONSUMER_GENESIS_PREFIX, chain_id)
}

fn prefixed(prefix: &[u8], chain_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + chain_id.len());
    key.extend_from_slice(prefix);
    key.extend_from_slice(chain_id.as_bytes());
    key
}
