//! Capabilities the keeper consumes from the host's staking and light-client modules.

use std::time::Duration;

use crate::error::ClientKeeperError;
use crate::types::{BlockHeader, ClientState, ConsensusState, Height, ValAddress, Validator};

pub trait StakingKeeper {
    fn unbonding_time(&self) -> Duration;

    /// Visits `(operator address, power)` for the last committed validator set.
    /// Returning `true` from `visit` stops the walk.
    ///
    /// Implementations must visit in their canonical order, the same order the
    /// host uses for validator updates. Genesis snapshots keep that order as is.
    fn iterate_last_validator_powers(&self, visit: &mut dyn FnMut(&str, i64) -> bool);

    fn validator(&self, address: &ValAddress) -> Option<Validator>;
}

pub trait ClientKeeper {
    /// Registers a new light client and returns its client id.
    fn create_client(
        &self,
        client_state: ClientState,
        consensus_state: ConsensusState,
    ) -> Result<String, ClientKeeperError>;

    fn self_consensus_state(&self, height: Height) -> Option<ConsensusState>;

    fn self_height(&self, header: &BlockHeader) -> Height {
        Height::from_chain_id(&header.chain_id, header.height)
    }
}
