//! Minimal in-crate collaborators for unit tests. Integration tests use the
//! richer harness in `ccv-testkit`.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use ccv_cbor::Hash;
use ccv_store::MemStore;

use crate::capability::{ClientKeeper, StakingKeeper};
use crate::context::Context;
use crate::error::ClientKeeperError;
use crate::keeper::Keeper;
use crate::params::ProviderParams;
use crate::types::{
    BlockHeader, ClientState, CommitmentRoot, ConsensusState, Height, PublicKey, Timestamp,
    ValAddress, Validator,
};

pub const UNBONDING: Duration = Duration::from_secs(1_814_400);

pub fn address(n: u8) -> ValAddress {
    ValAddress::new([n; 20])
}

pub fn ed25519(n: u8) -> PublicKey {
    PublicKey::Ed25519(vec![n; 32])
}

#[derive(Default)]
pub struct StubStaking {
    pub powers: Vec<(String, i64)>,
    pub validators: HashMap<ValAddress, Validator>,
}

impl StubStaking {
    pub fn with_validator(mut self, n: u8, power: i64) -> Self {
        let addr = address(n);
        self.powers.push((addr.to_string(), power));
        self.validators.insert(
            addr,
            Validator {
                operator_address: addr,
                consensus_pubkey: Some(ed25519(n)),
            },
        );
        self
    }
}

impl StakingKeeper for StubStaking {
    fn unbonding_time(&self) -> Duration {
        UNBONDING
    }

    fn iterate_last_validator_powers(&self, visit: &mut dyn FnMut(&str, i64) -> bool) {
        for (addr, power) in &self.powers {
            if visit(addr, *power) {
                break;
            }
        }
    }

    fn validator(&self, address: &ValAddress) -> Option<Validator> {
        self.validators.get(address).cloned()
    }
}

#[derive(Default)]
pub struct StubClients {
    pub created: RefCell<Vec<(ClientState, ConsensusState)>>,
    pub self_states: BTreeMap<Height, ConsensusState>,
    pub rejected_chains: HashSet<String>,
}

impl StubClients {
    pub fn with_self_state(mut self, height: Height, time: Timestamp) -> Self {
        self.self_states.insert(
            height,
            ConsensusState::new(
                time,
                CommitmentRoot(vec![0xaa; 32]),
                Hash::of_bytes(b"provider-valset"),
            ),
        );
        self
    }

    pub fn created_chains(&self) -> Vec<String> {
        self.created
            .borrow()
            .iter()
            .map(|(state, _)| state.chain_id.clone())
            .collect()
    }
}

impl ClientKeeper for StubClients {
    fn create_client(
        &self,
        client_state: ClientState,
        consensus_state: ConsensusState,
    ) -> Result<String, ClientKeeperError> {
        if self.rejected_chains.contains(&client_state.chain_id) {
            return Err(ClientKeeperError(format!(
                "client for {} rejected",
                client_state.chain_id
            )));
        }
        let mut created = self.created.borrow_mut();
        let client_id = format!("07-tendermint-{}", created.len());
        created.push((client_state, consensus_state));
        Ok(client_id)
    }

    fn self_consensus_state(&self, height: Height) -> Option<ConsensusState> {
        self.self_states.get(&height).cloned()
    }
}

/// Store, header and collaborators for one block on `provider-1` at height 10.
pub struct Fixture {
    pub store: MemStore,
    pub header: BlockHeader,
    pub staking: StubStaking,
    pub clients: StubClients,
    pub keeper: Keeper,
}

impl Fixture {
    pub fn new(block_secs: u64) -> Self {
        let time = Timestamp::from_unix_secs(block_secs);
        Self {
            store: MemStore::new(),
            header: BlockHeader {
                chain_id: "provider-1".into(),
                height: 10,
                time,
                next_validators_hash: Hash::of_bytes(b"next-valset"),
            },
            staking: StubStaking::default()
                .with_validator(1, 100)
                .with_validator(2, 50),
            clients: StubClients::default().with_self_state(Height::new(1, 10), time),
            keeper: Keeper::new(ProviderParams::default()).expect("keeper"),
        }
    }

    pub fn ctx(&self) -> Context<'_> {
        Context::new(&self.store, &self.header, &self.staking, &self.clients)
    }
}
