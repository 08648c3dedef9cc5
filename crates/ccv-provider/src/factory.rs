use crate::context::Context;
use crate::error::ProviderError;
use crate::keeper::Keeper;
use crate::keys::consumer_genesis_key;
use crate::types::{CommitmentRoot, ConsensusState, Height};

impl Keeper {
    /// Create the CCV light client for `chain_id` and record the consumer's
    /// genesis bundle. Returns the new client id.
    ///
    /// The consensus state is anchored at the current block time with a
    /// sentinel root, since the consumer has no application state yet, and the
    /// provider's next validators hash, which signs the headers the client
    /// will verify first.
    ///
    /// The genesis bundle is built and encoded before the light-client module
    /// is called. A failure in any step leaves no client behind in either
    /// module, so a retried entry registers at most one client.
    pub fn create_consumer_client(
        &self,
        ctx: &Context<'_>,
        chain_id: &str,
        initial_height: Height,
    ) -> Result<String, ProviderError> {
        let genesis = self.build_genesis(ctx)?;
        let encoded_genesis = ccv_cbor::to_canonical_cbor(&genesis)?;

        let unbonding_time = ctx.staking().unbonding_time();
        let client_state = self
            .params()
            .client_state_for(chain_id, initial_height, unbonding_time);
        let consensus_state = ConsensusState::new(
            ctx.block_time(),
            CommitmentRoot::sentinel(),
            ctx.header().next_validators_hash,
        );

        let client_id = ctx
            .clients()
            .create_client(client_state, consensus_state)
            .map_err(|source| ProviderError::ClientCreation {
                chain_id: chain_id.to_owned(),
                source,
            })?;

        ctx.store()
            .set(&consumer_genesis_key(chain_id), &encoded_genesis)?;
        self.set_consumer_client(ctx, chain_id, &client_id)?;

        log::info!(
            "created client {client_id} for consumer chain {chain_id} at height {initial_height} ({} genesis validators)",
            genesis.initial_val_set.len()
        );
        Ok(client_id)
    }
}
