//! Value types shared by the scheduler, client factory and genesis builder.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ccv_cbor::Hash;
use serde::{Deserialize, Serialize};

/// Block time as nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_unix_nanos(nanos: u64) -> Self {
        Timestamp(nanos)
    }

    pub const fn from_unix_secs(secs: u64) -> Self {
        Timestamp(secs.saturating_mul(1_000_000_000))
    }

    pub const fn unix_nanos(&self) -> u64 {
        self.0
    }

    /// Strict ordering used for every "is it due yet" decision.
    pub fn is_after(&self, other: Timestamp) -> bool {
        self.0 > other.0
    }

    pub fn to_system_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_nanos(self.0)
    }
}

impl TryFrom<SystemTime> for Timestamp {
    type Error = TimestampError;

    fn try_from(value: SystemTime) -> Result<Self, Self::Error> {
        let since_epoch = value
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TimestampError::BeforeEpoch)?;
        let nanos = u64::try_from(since_epoch.as_nanos()).map_err(|_| TimestampError::Overflow)?;
        Ok(Timestamp(nanos))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:09}",
            self.0 / 1_000_000_000,
            self.0 % 1_000_000_000
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("timestamps before the Unix epoch are not representable")]
    BeforeEpoch,
    #[error("timestamp does not fit in 64 bits of nanoseconds")]
    Overflow,
}

/// IBC height. `(0, 0)` doubles as the "absent" sentinel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Height {
    pub revision_number: u64,
    pub revision_height: u64,
}

impl Height {
    pub const fn new(revision_number: u64, revision_height: u64) -> Self {
        Self {
            revision_number,
            revision_height,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.revision_number == 0 && self.revision_height == 0
    }

    /// Height of a block on a chain, with the revision taken from a `{name}-{N}` chain id.
    pub fn from_chain_id(chain_id: &str, block_height: u64) -> Self {
        Height::new(revision_number(chain_id), block_height)
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.revision_number, self.revision_height)
    }
}

/// Revision encoded in a chain id such as `provider-3`. Ids without a
/// well-formed numeric suffix (no leading zero) are revision 0.
pub fn revision_number(chain_id: &str) -> u64 {
    let Some((name, suffix)) = chain_id.rsplit_once('-') else {
        return 0;
    };
    if name.is_empty() || name.ends_with('-') || suffix.starts_with('0') {
        return 0;
    }
    if !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    suffix.parse().unwrap_or(0)
}

/// Light-client trust threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: u64,
    pub denominator: u64,
}

impl Fraction {
    pub const ONE_THIRD: Fraction = Fraction {
        numerator: 1,
        denominator: 3,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofSpec {
    Iavl,
    Tendermint,
}

/// Tendermint light-client state handed to the light-client engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    pub chain_id: String,
    pub trust_level: Fraction,
    pub trusting_period: Duration,
    pub unbonding_period: Duration,
    pub max_clock_drift: Duration,
    pub frozen_height: Height,
    pub latest_height: Height,
    pub proof_specs: Vec<ProofSpec>,
    pub upgrade_path: Vec<String>,
    pub allow_update_after_expiry: bool,
    pub allow_update_after_misbehaviour: bool,
}

/// Root placed in consensus states whose application hash is not known yet.
pub const SENTINEL_ROOT: &[u8] = b"sentinel_root";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentRoot(#[serde(with = "serde_bytes")] pub Vec<u8>);

impl CommitmentRoot {
    pub fn sentinel() -> Self {
        CommitmentRoot(SENTINEL_ROOT.to_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusState {
    pub timestamp: Timestamp,
    pub root: CommitmentRoot,
    pub next_validators_hash: Hash,
}

impl ConsensusState {
    pub fn new(timestamp: Timestamp, root: CommitmentRoot, next_validators_hash: Hash) -> Self {
        Self {
            timestamp,
            root,
            next_validators_hash,
        }
    }
}

/// Consensus public key carried in validator updates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicKey {
    Ed25519(#[serde(with = "serde_bytes")] Vec<u8>),
    Secp256k1(#[serde(with = "serde_bytes")] Vec<u8>),
}

impl PublicKey {
    fn expected_len(&self) -> usize {
        match self {
            PublicKey::Ed25519(_) => 32,
            PublicKey::Secp256k1(_) => 33,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PublicKey::Ed25519(bytes) | PublicKey::Secp256k1(bytes) => bytes,
        }
    }

    /// Checks the key length for its algorithm.
    pub fn check(&self) -> Result<(), String> {
        let expected = self.expected_len();
        let actual = self.as_bytes().len();
        if actual != expected {
            return Err(format!("expected {expected} key bytes, got {actual}"));
        }
        Ok(())
    }
}

pub const VAL_ADDRESS_LEN: usize = 20;

/// Validator operator address, rendered as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValAddress([u8; VAL_ADDRESS_LEN]);

impl ValAddress {
    pub const fn new(bytes: [u8; VAL_ADDRESS_LEN]) -> Self {
        ValAddress(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; VAL_ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for ValAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ValAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValAddress").field(&self.to_string()).finish()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValAddressError {
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("address must be {VAL_ADDRESS_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for ValAddress {
    type Err = ValAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let arr: [u8; VAL_ADDRESS_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ValAddressError::InvalidLength(bytes.len()))?;
        Ok(ValAddress(arr))
    }
}

impl Serialize for ValAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ValAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The slice of a staking validator record this module reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub operator_address: ValAddress,
    pub consensus_pubkey: Option<PublicKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorUpdate {
    pub pub_key: PublicKey,
    pub power: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerParams {
    pub enabled: bool,
}

/// Bootstrap state a new consumer chain initialises from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBundle {
    pub params: ConsumerParams,
    pub new_chain: bool,
    pub provider_client_state: ClientState,
    pub provider_consensus_state: ConsensusState,
    pub initial_val_set: Vec<ValidatorUpdate>,
}

/// Header fields of the block currently being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub chain_id: String,
    pub height: u64,
    pub time: Timestamp,
    pub next_validators_hash: Hash,
}
