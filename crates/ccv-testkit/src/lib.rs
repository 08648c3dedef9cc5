//! Deterministic stand-ins for the staking and light-client modules plus a
//! `TestChain` that advances block time and runs the provider's begin-block
//! hook, for exercising the keeper end to end.

mod mocks;

pub use mocks::{MockClientKeeper, MockStaking, RecordedClient};

use ccv_cbor::Hash;
use ccv_provider::{
    BlockHeader, CommitmentRoot, ConsensusState, Context, CreateConsumerChainProposal, Height,
    Keeper, ProposalOutcome, ProviderError, ProviderParams, PublicKey, SweepReport, Timestamp,
    ValAddress,
};
use ccv_store::MemStore;

pub type TestStore = MemStore;

pub const PROVIDER_CHAIN_ID: &str = "provider-1";

pub fn ts(secs: u64) -> Timestamp {
    Timestamp::from_unix_secs(secs)
}

pub fn validator_address(n: u8) -> ValAddress {
    let mut bytes = [0u8; 20];
    bytes[0] = 0xa0;
    bytes[19] = n;
    ValAddress::new(bytes)
}

pub fn consensus_key(n: u8) -> PublicKey {
    PublicKey::Ed25519(vec![n; 32])
}

pub fn consumer_proposal(chain_id: &str, spawn_time: Timestamp) -> CreateConsumerChainProposal {
    CreateConsumerChainProposal {
        title: format!("launch {chain_id}"),
        description: String::new(),
        chain_id: chain_id.to_owned(),
        initial_height: Height::new(0, 1),
        spawn_time,
    }
}

/// Provider chain with an in-memory store whose block clock tests drive.
///
/// Each committed block records a self consensus state for its height, as the
/// light-client module would, unless `record_self_states` is turned off.
pub struct TestChain {
    pub store: TestStore,
    pub header: BlockHeader,
    pub staking: MockStaking,
    pub clients: MockClientKeeper,
    pub keeper: Keeper,
    pub record_self_states: bool,
}

impl TestChain {
    pub fn new() -> Self {
        Self::with_params(ProviderParams::default())
    }

    pub fn with_params(params: ProviderParams) -> Self {
        let staking = MockStaking::default()
            .with_validator(validator_address(1), consensus_key(1), 300)
            .with_validator(validator_address(2), consensus_key(2), 200)
            .with_validator(validator_address(3), consensus_key(3), 100);
        let mut chain = Self {
            store: TestStore::new(),
            header: BlockHeader {
                chain_id: PROVIDER_CHAIN_ID.into(),
                height: 1,
                time: ts(1),
                next_validators_hash: Hash::default(),
            },
            staking,
            clients: MockClientKeeper::default(),
            keeper: Keeper::new(params).expect("valid params"),
            record_self_states: true,
        };
        chain.header.next_validators_hash = chain.staking.validator_set_hash();
        chain.record_self_state();
        chain
    }

    pub fn ctx(&self) -> Context<'_> {
        Context::new(&self.store, &self.header, &self.staking, &self.clients)
    }

    pub fn now(&self) -> Timestamp {
        self.header.time
    }

    pub fn self_height(&self) -> Height {
        Height::from_chain_id(&self.header.chain_id, self.header.height)
    }

    /// Start the next block at `time` and run the begin-block sweep.
    pub fn advance_to(&mut self, time: Timestamp) -> Result<SweepReport, ProviderError> {
        assert!(
            time >= self.header.time,
            "block time must not go backwards ({} -> {time})",
            self.header.time
        );
        self.header.height += 1;
        self.header.time = time;
        self.header.next_validators_hash = self.staking.validator_set_hash();
        if self.record_self_states {
            self.record_self_state();
        }
        log::debug!("test chain at height {} time {time}", self.header.height);
        self.keeper.begin_block(&self.ctx())
    }

    pub fn advance_secs(&mut self, secs: u64) -> Result<SweepReport, ProviderError> {
        let next = Timestamp::from_unix_nanos(self.now().unix_nanos() + secs * 1_000_000_000);
        self.advance_to(next)
    }

    pub fn propose(
        &self,
        proposal: &CreateConsumerChainProposal,
    ) -> Result<ProposalOutcome, ProviderError> {
        self.keeper.handle_create_consumer_proposal(&self.ctx(), proposal)
    }

    fn record_self_state(&self) {
        let state = ConsensusState::new(
            self.header.time,
            CommitmentRoot(Hash::of_bytes(&self.header.height.to_be_bytes()).as_bytes().to_vec()),
            self.header.next_validators_hash,
        );
        self.clients.set_self_state(self.self_height(), state);
    }
}

impl Default for TestChain {
    fn default() -> Self {
        Self::new()
    }
}
