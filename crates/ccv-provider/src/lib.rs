//! Provider-side cross-chain validation keeper: schedules consumer-chain
//! light clients by spawn time, creates them as block time advances, and
//! builds the genesis bundle each consumer bootstraps from.

pub mod capability;
pub mod context;
pub mod error;
pub mod factory;
pub mod genesis;
pub mod keeper;
pub mod keys;
pub mod params;
pub mod proposal;
pub mod scheduler;
pub mod types;

#[cfg(test)]
mod test_support;

pub use capability::{ClientKeeper, StakingKeeper};
pub use context::Context;
pub use error::{ClientKeeperError, InvariantViolation, ProviderError};
pub use keeper::Keeper;
pub use keys::{KeyError, SpawnKey};
pub use params::ProviderParams;
pub use proposal::{CreateConsumerChainProposal, ProposalOutcome};
pub use scheduler::{CreatedClient, FailedSpawn, PendingSpawnEntry, SweepReport};
pub use types::{
    BlockHeader, ClientState, CommitmentRoot, ConsensusState, ConsumerParams, Fraction,
    GenesisBundle, Height, ProofSpec, PublicKey, Timestamp, ValAddress, Validator,
    ValidatorUpdate,
};
