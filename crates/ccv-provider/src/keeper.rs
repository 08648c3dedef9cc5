use ccv_store::KvStoreExt;

use crate::context::Context;
use crate::error::ProviderError;
use crate::keys::{chain_to_client_key, consumer_genesis_key};
use crate::params::ProviderParams;
use crate::types::GenesisBundle;

/// Provider-side CCV keeper. Holds configuration only; all state lives in the
/// store reached through the [`Context`] of each call.
#[derive(Debug, Clone)]
pub struct Keeper {
    params: ProviderParams,
}

impl Keeper {
    pub fn new(params: ProviderParams) -> Result<Self, ProviderError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &ProviderParams {
        &self.params
    }

    pub fn set_consumer_client(
        &self,
        ctx: &Context<'_>,
        chain_id: &str,
        client_id: &str,
    ) -> Result<(), ProviderError> {
        ctx.store()
            .set(&chain_to_client_key(chain_id), client_id.as_bytes())?;
        Ok(())
    }

    /// Client id recorded for `chain_id`, if a client was created for it.
    pub fn consumer_client(
        &self,
        ctx: &Context<'_>,
        chain_id: &str,
    ) -> Result<Option<String>, ProviderError> {
        let Some(bytes) = ctx.store().get(&chain_to_client_key(chain_id))? else {
            return Ok(None);
        };
        let client_id =
            String::from_utf8(bytes).map_err(|source| ProviderError::CorruptClientRecord {
                chain_id: chain_id.to_owned(),
                source,
            })?;
        Ok(Some(client_id))
    }

    pub fn consumer_genesis(
        &self,
        ctx: &Context<'_>,
        chain_id: &str,
    ) -> Result<Option<GenesisBundle>, ProviderError> {
        Ok(ctx.store().get_value(&consumer_genesis_key(chain_id))?)
    }
}
