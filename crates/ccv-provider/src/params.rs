use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::types::{ClientState, Fraction, Height, ProofSpec};

/// Keeper configuration. The template client is the baseline every created
/// client state is cloned from; per-chain fields are overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderParams {
    pub template_client: ClientState,
}

impl Default for ProviderParams {
    fn default() -> Self {
        Self {
            template_client: ClientState {
                chain_id: String::new(),
                trust_level: Fraction::ONE_THIRD,
                trusting_period: Duration::ZERO,
                unbonding_period: Duration::ZERO,
                max_clock_drift: Duration::from_secs(10),
                frozen_height: Height::default(),
                latest_height: Height::default(),
                proof_specs: vec![ProofSpec::Iavl, ProofSpec::Tendermint],
                upgrade_path: vec!["upgrade".into(), "upgradedIBCState".into()],
                allow_update_after_expiry: false,
                allow_update_after_misbehaviour: false,
            },
        }
    }
}

impl ProviderParams {
    pub fn from_json_str(json: &str) -> Result<Self, ProviderError> {
        let params: ProviderParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ProviderError::ParamsIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        let template = &self.template_client;
        let Fraction {
            numerator,
            denominator,
        } = template.trust_level;
        if denominator == 0 {
            return Err(ProviderError::InvalidParams(
                "trust level denominator is zero".into(),
            ));
        }
        // 1/3 <= n/d <= 1
        if u128::from(numerator) * 3 < u128::from(denominator) || numerator > denominator {
            return Err(ProviderError::InvalidParams(format!(
                "trust level {numerator}/{denominator} outside [1/3, 1]"
            )));
        }
        if template.max_clock_drift.is_zero() {
            return Err(ProviderError::InvalidParams(
                "max clock drift must be positive".into(),
            ));
        }
        if template.proof_specs.is_empty() {
            return Err(ProviderError::InvalidParams(
                "template client has no proof specs".into(),
            ));
        }
        Ok(())
    }

    /// Template client filled in for `chain_id`. The trusting period is half
    /// the unbonding period.
    pub fn client_state_for(
        &self,
        chain_id: &str,
        latest_height: Height,
        unbonding_time: Duration,
    ) -> ClientState {
        let mut client_state = self.template_client.clone();
        client_state.chain_id = chain_id.to_owned();
        client_state.latest_height = latest_height;
        client_state.trusting_period = unbonding_time / 2;
        client_state.unbonding_period = unbonding_time;
        client_state
    }
}
