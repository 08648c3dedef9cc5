use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ccv_cbor::Hash;
use ccv_provider::{
    ClientKeeper, ClientKeeperError, ClientState, ConsensusState, Height, PublicKey,
    StakingKeeper, ValAddress, Validator,
};

/// Three weeks, the usual staking unbonding period.
pub const DEFAULT_UNBONDING: Duration = Duration::from_secs(21 * 24 * 60 * 60);

/// Staking module with a fixed validator set.
///
/// `powers` is walked in insertion order, standing in for the staking module's
/// canonical power-ordered iteration.
#[derive(Debug, Clone)]
pub struct MockStaking {
    pub unbonding_time: Duration,
    pub powers: Vec<(String, i64)>,
    pub validators: HashMap<ValAddress, Validator>,
}

impl Default for MockStaking {
    fn default() -> Self {
        Self {
            unbonding_time: DEFAULT_UNBONDING,
            powers: Vec::new(),
            validators: HashMap::new(),
        }
    }
}

impl MockStaking {
    pub fn with_validator(mut self, address: ValAddress, key: PublicKey, power: i64) -> Self {
        self.powers.push((address.to_string(), power));
        self.validators.insert(
            address,
            Validator {
                operator_address: address,
                consensus_pubkey: Some(key),
            },
        );
        self
    }

    pub fn with_unbonding_time(mut self, unbonding_time: Duration) -> Self {
        self.unbonding_time = unbonding_time;
        self
    }

    /// Adds a power entry without a matching validator record.
    pub fn push_raw_power(&mut self, address: impl Into<String>, power: i64) {
        self.powers.push((address.into(), power));
    }

    pub fn remove_validator(&mut self, address: &ValAddress) -> Option<Validator> {
        self.validators.remove(address)
    }

    /// Hash of the `(address, power)` list, used as the block's next validators hash.
    pub fn validator_set_hash(&self) -> Hash {
        Hash::of_cbor(&self.powers).unwrap_or_else(|_| Hash::of_bytes(b""))
    }
}

impl StakingKeeper for MockStaking {
    fn unbonding_time(&self) -> Duration {
        self.unbonding_time
    }

    fn iterate_last_validator_powers(&self, visit: &mut dyn FnMut(&str, i64) -> bool) {
        for (address, power) in &self.powers {
            if visit(address, *power) {
                break;
            }
        }
    }

    fn validator(&self, address: &ValAddress) -> Option<Validator> {
        self.validators.get(address).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedClient {
    pub client_id: String,
    pub client_state: ClientState,
    pub consensus_state: ConsensusState,
}

#[derive(Debug, Default)]
struct ClientInner {
    created: Vec<RecordedClient>,
    self_states: BTreeMap<Height, ConsensusState>,
    failing_chains: HashSet<String>,
}

/// Light-client module that records every client it is asked to create.
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockClientKeeper {
    inner: Arc<Mutex<ClientInner>>,
}

impl MockClientKeeper {
    pub fn created(&self) -> Vec<RecordedClient> {
        self.inner.lock().unwrap().created.clone()
    }

    pub fn created_chain_ids(&self) -> Vec<String> {
        self.created()
            .into_iter()
            .map(|record| record.client_state.chain_id)
            .collect()
    }

    pub fn set_self_state(&self, height: Height, state: ConsensusState) {
        self.inner.lock().unwrap().self_states.insert(height, state);
    }

    pub fn clear_self_state(&self, height: Height) {
        self.inner.lock().unwrap().self_states.remove(&height);
    }

    /// Make `create_client` reject clients for `chain_id` until [`Self::allow_chain`].
    pub fn fail_chain(&self, chain_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .failing_chains
            .insert(chain_id.to_owned());
    }

    pub fn allow_chain(&self, chain_id: &str) {
        self.inner.lock().unwrap().failing_chains.remove(chain_id);
    }
}

impl ClientKeeper for MockClientKeeper {
    fn create_client(
        &self,
        client_state: ClientState,
        consensus_state: ConsensusState,
    ) -> Result<String, ClientKeeperError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failing_chains.contains(&client_state.chain_id) {
            return Err(ClientKeeperError(format!(
                "light client rejected state for {}",
                client_state.chain_id
            )));
        }
        let client_id = format!("07-tendermint-{}", inner.created.len());
        inner.created.push(RecordedClient {
            client_id: client_id.clone(),
            client_state,
            consensus_state,
        });
        Ok(client_id)
    }

    fn self_consensus_state(&self, height: Height) -> Option<ConsensusState> {
        self.inner.lock().unwrap().self_states.get(&height).cloned()
    }
}
