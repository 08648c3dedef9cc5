use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::keys::KeyError;
use crate::types::{Height, ValAddress};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("store error: {0}")]
    Store(#[from] ccv_store::StoreError),
    #[error("CBOR serialization error: {0}")]
    Cbor(#[from] serde_cbor::Error),
    #[error("corrupt pending-spawn key: {0}")]
    CorruptKey(#[from] KeyError),
    #[error("client creation failed for chain '{chain_id}': {source}")]
    ClientCreation {
        chain_id: String,
        #[source]
        source: ClientKeeperError,
    },
    #[error("client record for chain '{chain_id}' is not UTF-8: {source}")]
    CorruptClientRecord {
        chain_id: String,
        #[source]
        source: FromUtf8Error,
    },
    #[error("self consensus state not found for height {0}")]
    SelfConsensusStateNotFound(Height),
    #[error("invalid proposal: {0}")]
    InvalidProposal(String),
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("params I/O error at {path:?}: {source}")]
    ParamsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("params JSON error: {0}")]
    ParamsJson(#[from] serde_json::Error),
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl ProviderError {
    /// Fatal errors mean staking and this module disagree about validator state.
    /// The enclosing block transition must abort rather than carry on.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProviderError::Invariant(_))
    }
}

/// Staking's validator snapshot contradicts its own records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("last validator power entry has malformed address '{address}': {reason}")]
    MalformedValidatorAddress { address: String, reason: String },
    #[error("validator {0} from last validator powers not found in staking")]
    ValidatorNotFound(ValAddress),
    #[error("validator {0} has no consensus public key")]
    MissingConsensusKey(ValAddress),
    #[error("validator {address} has an unusable consensus key: {reason}")]
    InvalidConsensusKey { address: ValAddress, reason: String },
}

/// Failure reported by the light-client engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ClientKeeperError(pub String);
