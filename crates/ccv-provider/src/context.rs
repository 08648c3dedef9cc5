use ccv_store::KvStore;

use crate::capability::{ClientKeeper, StakingKeeper};
use crate::types::{BlockHeader, Timestamp};

/// Everything one block transition exposes to the keeper: the store, the
/// header of the block being processed and the collaborating modules.
///
/// A context is built per block and dropped with it.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    store: &'a dyn KvStore,
    header: &'a BlockHeader,
    staking: &'a dyn StakingKeeper,
    clients: &'a dyn ClientKeeper,
}

impl<'a> Context<'a> {
    pub fn new(
        store: &'a dyn KvStore,
        header: &'a BlockHeader,
        staking: &'a dyn StakingKeeper,
        clients: &'a dyn ClientKeeper,
    ) -> Self {
        Self {
            store,
            header,
            staking,
            clients,
        }
    }

    pub fn store(&self) -> &'a dyn KvStore {
        self.store
    }

    pub fn header(&self) -> &'a BlockHeader {
        self.header
    }

    pub fn block_time(&self) -> Timestamp {
        self.header.time
    }

    pub fn chain_id(&self) -> &'a str {
        &self.header.chain_id
    }

    pub fn staking(&self) -> &'a dyn StakingKeeper {
        self.staking
    }

    pub fn clients(&self) -> &'a dyn ClientKeeper {
        self.clients
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("header", self.header)
            .field("store", &"<store>")
            .finish()
    }
}
