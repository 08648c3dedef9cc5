use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::ProviderError;
use crate::keeper::Keeper;
use crate::types::{Height, Timestamp};

/// Governance proposal to launch a consumer chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateConsumerChainProposal {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub chain_id: String,
    pub initial_height: Height,
    pub spawn_time: Timestamp,
}

impl CreateConsumerChainProposal {
    pub fn validate_basic(&self) -> Result<(), ProviderError> {
        if self.title.trim().is_empty() {
            return Err(ProviderError::InvalidProposal("title is blank".into()));
        }
        if self.chain_id.trim().is_empty() {
            return Err(ProviderError::InvalidProposal("chain id is blank".into()));
        }
        if self.initial_height.is_zero() {
            return Err(ProviderError::InvalidProposal(
                "initial height must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalOutcome {
    /// Spawn time had passed; the client exists now.
    ClientCreated { client_id: String },
    Scheduled { spawn_time: Timestamp },
}

impl Keeper {
    /// Handle a passed consumer-chain proposal: create the client right away
    /// if block time is already past the spawn time, otherwise queue it.
    pub fn handle_create_consumer_proposal(
        &self,
        ctx: &Context<'_>,
        proposal: &CreateConsumerChainProposal,
    ) -> Result<ProposalOutcome, ProviderError> {
        proposal.validate_basic()?;
        if ctx.block_time().is_after(proposal.spawn_time) {
            let client_id =
                self.create_consumer_client(ctx, &proposal.chain_id, proposal.initial_height)?;
            return Ok(ProposalOutcome::ClientCreated { client_id });
        }
        self.schedule_spawn(
            ctx,
            proposal.spawn_time,
            &proposal.chain_id,
            proposal.initial_height,
        )?;
        Ok(ProposalOutcome::Scheduled {
            spawn_time: proposal.spawn_time,
        })
    }
}
