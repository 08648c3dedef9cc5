//! Consumer genesis construction: the provider's light-client state plus the
//! validator set the consumer chain starts from.

use crate::context::Context;
use crate::error::{InvariantViolation, ProviderError};
use crate::keeper::Keeper;
use crate::types::{ConsumerParams, GenesisBundle, ValAddress, ValAddressError, ValidatorUpdate};

impl Keeper {
    /// Snapshot the provider chain into a consumer genesis bundle.
    ///
    /// Fails with [`ProviderError::SelfConsensusStateNotFound`] when the
    /// light-client module has no consensus state for the current height. That
    /// state does not appear later within the same block, so callers should not
    /// retry before the next one. A validator snapshot that disagrees with
    /// staking's own records is reported as [`ProviderError::Invariant`].
    pub fn build_genesis(&self, ctx: &Context<'_>) -> Result<GenesisBundle, ProviderError> {
        let unbonding_time = ctx.staking().unbonding_time();
        let height = ctx.clients().self_height(ctx.header());

        let client_state = self
            .params()
            .client_state_for(ctx.chain_id(), height, unbonding_time);
        let consensus_state = ctx
            .clients()
            .self_consensus_state(height)
            .ok_or(ProviderError::SelfConsensusStateNotFound(height))?;

        let mut last_powers = Vec::new();
        ctx.staking()
            .iterate_last_validator_powers(&mut |address: &str, power: i64| {
                last_powers.push((address.to_owned(), power));
                false
            });

        let initial_val_set = last_powers
            .into_iter()
            .map(|(address, power)| validator_update(ctx, &address, power))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GenesisBundle {
            params: ConsumerParams { enabled: true },
            new_chain: true,
            provider_client_state: client_state,
            provider_consensus_state: consensus_state,
            initial_val_set,
        })
    }
}

fn validator_update(
    ctx: &Context<'_>,
    address: &str,
    power: i64,
) -> Result<ValidatorUpdate, InvariantViolation> {
    let operator: ValAddress = address.parse().map_err(|err: ValAddressError| {
        InvariantViolation::MalformedValidatorAddress {
            address: address.to_owned(),
            reason: err.to_string(),
        }
    })?;
    let validator = ctx
        .staking()
        .validator(&operator)
        .ok_or(InvariantViolation::ValidatorNotFound(operator))?;
    let pub_key = validator
        .consensus_pubkey
        .ok_or(InvariantViolation::MissingConsensusKey(operator))?;
    pub_key
        .check()
        .map_err(|reason| InvariantViolation::InvalidConsensusKey {
            address: operator,
            reason,
        })?;
    Ok(ValidatorUpdate { pub_key, power })
}
