//! Time-ordered queue of consumer clients waiting for their spawn time.

use ccv_store::KvStoreExt;

use crate::context::Context;
use crate::error::ProviderError;
use crate::keeper::Keeper;
use crate::keys::{PENDING_CLIENT_PREFIX, SpawnKey};
use crate::types::{Height, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSpawnEntry {
    pub spawn_time: Timestamp,
    pub chain_id: String,
    pub initial_height: Height,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedClient {
    pub chain_id: String,
    pub client_id: String,
    pub spawn_time: Timestamp,
}

/// Due entry whose creation failed; it stays queued for the next block.
#[derive(Debug)]
pub struct FailedSpawn {
    pub chain_id: String,
    pub spawn_time: Timestamp,
    pub error: ProviderError,
}

/// Outcome of one sweep over the pending queue.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub created: Vec<CreatedClient>,
    pub failed: Vec<FailedSpawn>,
    /// Spawn time of the entry that stopped the sweep, if any remain.
    pub next_spawn_time: Option<Timestamp>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.failed.is_empty()
    }
}

impl Keeper {
    /// Queue a client for creation once block time passes `spawn_time`.
    /// Scheduling the same `(spawn_time, chain_id)` twice overwrites the height;
    /// different spawn times for one chain are kept as separate entries.
    pub fn schedule_spawn(
        &self,
        ctx: &Context<'_>,
        spawn_time: Timestamp,
        chain_id: &str,
        initial_height: Height,
    ) -> Result<(), ProviderError> {
        let key = SpawnKey::new(spawn_time, chain_id)?;
        ctx.store().put_value(&key.encode(), &initial_height)?;
        log::debug!("scheduled consumer client for {chain_id} at {spawn_time}");
        Ok(())
    }

    /// Initial height queued for `(spawn_time, chain_id)`. A missing entry, a
    /// stored zero height and a chain id that can never be queued all read as
    /// `None`.
    pub fn pending_spawn(
        &self,
        ctx: &Context<'_>,
        spawn_time: Timestamp,
        chain_id: &str,
    ) -> Result<Option<Height>, ProviderError> {
        let Ok(key) = SpawnKey::new(spawn_time, chain_id) else {
            return Ok(None);
        };
        let height: Option<Height> = ctx.store().get_value(&key.encode())?;
        Ok(height.filter(|h| !h.is_zero()))
    }

    /// Every queued entry in spawn order.
    pub fn pending_entries(
        &self,
        ctx: &Context<'_>,
    ) -> Result<Vec<PendingSpawnEntry>, ProviderError> {
        let mut entries = Vec::new();
        for item in ctx.store().prefix_iter(PENDING_CLIENT_PREFIX)? {
            let (key, value) = item?;
            let (spawn_time, chain_id) = SpawnKey::decode(&key)?.into_parts();
            entries.push(PendingSpawnEntry {
                spawn_time,
                chain_id,
                initial_height: ccv_cbor::from_cbor_slice(&value)?,
            });
        }
        Ok(entries)
    }

    /// Create clients for every queued entry whose spawn time is strictly
    /// before `now`, in spawn order.
    ///
    /// The walk stops at the first entry that is not yet due. Key order is spawn
    /// order, so nothing after it can be due either. Created entries are removed
    /// from the queue so a client is never created twice for the same entry.
    /// An entry whose creation fails with an ordinary error is left in place and
    /// reported; an invariant violation aborts the sweep.
    pub fn sweep_pending(
        &self,
        ctx: &Context<'_>,
        now: Timestamp,
    ) -> Result<SweepReport, ProviderError> {
        let mut report = SweepReport::default();
        for item in ctx.store().prefix_iter(PENDING_CLIENT_PREFIX)? {
            let (key, value) = item?;
            let spawn_key = SpawnKey::decode(&key)?;
            if !now.is_after(spawn_key.spawn_time()) {
                report.next_spawn_time = Some(spawn_key.spawn_time());
                break;
            }
            let initial_height: Height = ccv_cbor::from_cbor_slice(&value)?;
            let (spawn_time, chain_id) = spawn_key.into_parts();

            match self.create_consumer_client(ctx, &chain_id, initial_height) {
                Ok(client_id) => {
                    ctx.store().delete(&key)?;
                    report.created.push(CreatedClient {
                        chain_id,
                        client_id,
                        spawn_time,
                    });
                }
                Err(err) if err.is_fatal() => {
                    log::error!("aborting spawn sweep at {chain_id}: {err}");
                    return Err(err);
                }
                Err(err) => {
                    log::warn!(
                        "consumer client for {chain_id} (spawn time {spawn_time}) not created, retrying next block: {err}"
                    );
                    report.failed.push(FailedSpawn {
                        chain_id,
                        spawn_time,
                        error: err,
                    });
                }
            }
        }
        Ok(report)
    }

    /// Per-block hook: sweep the queue against the current block time.
    pub fn begin_block(&self, ctx: &Context<'_>) -> Result<SweepReport, ProviderError> {
        self.sweep_pending(ctx, ctx.block_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvariantViolation;
    use crate::test_support::{Fixture, address};
    use ccv_store::KvStore;

    fn ts(secs: u64) -> Timestamp {
        Timestamp::from_unix_secs(secs)
    }

    #[test]
    fn lookup_returns_scheduled_height() {
        let fx = Fixture::new(10);
        let ctx = fx.ctx();
        fx.keeper
            .schedule_spawn(&ctx, ts(100), "chain-A", Height::new(0, 7))
            .expect("schedule");
        assert_eq!(
            fx.keeper.pending_spawn(&ctx, ts(100), "chain-A").expect("get"),
            Some(Height::new(0, 7))
        );
        assert_eq!(fx.keeper.pending_spawn(&ctx, ts(101), "chain-A").expect("get"), None);
        assert_eq!(fx.keeper.pending_spawn(&ctx, ts(100), "chain-B").expect("get"), None);
    }

    #[test]
    fn zero_height_reads_as_absent() {
        let fx = Fixture::new(10);
        let ctx = fx.ctx();
        fx.keeper
            .schedule_spawn(&ctx, ts(100), "chain-A", Height::default())
            .expect("schedule");
        assert_eq!(fx.keeper.pending_spawn(&ctx, ts(100), "chain-A").expect("get"), None);
    }

    #[test]
    fn empty_chain_id_is_rejected() {
        let fx = Fixture::new(10);
        let err = fx
            .keeper
            .schedule_spawn(&fx.ctx(), ts(100), "", Height::new(0, 1))
            .expect_err("empty chain id");
        assert!(matches!(err, ProviderError::CorruptKey(_)));
    }

    #[test]
    fn lookup_of_empty_chain_id_is_absent() {
        let fx = Fixture::new(10);
        assert_eq!(
            fx.keeper
                .pending_spawn(&fx.ctx(), ts(100), "")
                .expect("absent, not an error"),
            None
        );
    }

    #[test]
    fn sweep_before_spawn_time_creates_nothing() {
        let fx = Fixture::new(50);
        let ctx = fx.ctx();
        fx.keeper
            .schedule_spawn(&ctx, ts(100), "chain-A", Height::new(0, 1))
            .expect("schedule");
        let report = fx.keeper.begin_block(&ctx).expect("sweep");
        assert!(report.is_empty());
        assert_eq!(report.next_spawn_time, Some(ts(100)));
        assert!(fx.clients.created.borrow().is_empty());
        assert_eq!(fx.keeper.pending_entries(&ctx).expect("entries").len(), 1);
    }

    #[test]
    fn spawn_time_equal_to_now_is_not_due() {
        let fx = Fixture::new(100);
        let ctx = fx.ctx();
        fx.keeper
            .schedule_spawn(&ctx, ts(100), "chain-A", Height::new(0, 1))
            .expect("schedule");
        let report = fx.keeper.begin_block(&ctx).expect("sweep");
        assert!(report.created.is_empty());
    }

    #[test]
    fn sweep_stops_at_first_entry_not_due() {
        let fx = Fixture::new(150);
        let ctx = fx.ctx();
        fx.keeper
            .schedule_spawn(&ctx, ts(200), "chain-B", Height::new(0, 1))
            .expect("schedule");
        fx.keeper
            .schedule_spawn(&ctx, ts(100), "chain-A", Height::new(0, 1))
            .expect("schedule");

        let report = fx.keeper.begin_block(&ctx).expect("sweep");
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].chain_id, "chain-A");
        assert_eq!(report.next_spawn_time, Some(ts(200)));
        assert_eq!(fx.clients.created_chains(), vec!["chain-A".to_string()]);
        assert_eq!(fx.store.open_iterators(), 0);

        let remaining = fx.keeper.pending_entries(&ctx).expect("entries");
        assert_eq!(
            remaining,
            vec![PendingSpawnEntry {
                spawn_time: ts(200),
                chain_id: "chain-B".into(),
                initial_height: Height::new(0, 1),
            }]
        );
    }

    #[test]
    fn resweep_does_not_recreate() {
        let fx = Fixture::new(150);
        let ctx = fx.ctx();
        fx.keeper
            .schedule_spawn(&ctx, ts(100), "chain-A", Height::new(0, 1))
            .expect("schedule");
        fx.keeper.begin_block(&ctx).expect("first sweep");
        let second = fx.keeper.begin_block(&ctx).expect("second sweep");
        assert!(second.is_empty());
        assert_eq!(second.next_spawn_time, None);
        assert_eq!(fx.clients.created.borrow().len(), 1);
    }

    #[test]
    fn failed_entry_stays_queued_and_later_entries_proceed() {
        let mut fx = Fixture::new(150);
        fx.clients.rejected_chains.insert("chain-A".into());
        let ctx = fx.ctx();
        fx.keeper
            .schedule_spawn(&ctx, ts(100), "chain-A", Height::new(0, 1))
            .expect("schedule");
        fx.keeper
            .schedule_spawn(&ctx, ts(110), "chain-B", Height::new(0, 1))
            .expect("schedule");

        let report = fx.keeper.begin_block(&ctx).expect("sweep");
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].chain_id, "chain-A");
        assert!(matches!(
            report.failed[0].error,
            ProviderError::ClientCreation { .. }
        ));
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].chain_id, "chain-B");
        assert_eq!(
            fx.keeper.pending_spawn(&ctx, ts(100), "chain-A").expect("get"),
            Some(Height::new(0, 1))
        );
        assert_eq!(fx.keeper.consumer_client(&ctx, "chain-A").expect("get"), None);
    }

    #[test]
    fn invariant_violation_aborts_sweep_and_releases_iterator() {
        let mut fx = Fixture::new(150);
        fx.staking.powers.push((address(42).to_string(), 1));
        let ctx = fx.ctx();
        fx.keeper
            .schedule_spawn(&ctx, ts(100), "chain-A", Height::new(0, 1))
            .expect("schedule");
        let err = fx.keeper.begin_block(&ctx).expect_err("fatal");
        assert!(matches!(
            err,
            ProviderError::Invariant(InvariantViolation::ValidatorNotFound(_))
        ));
        assert_eq!(fx.store.open_iterators(), 0);
        assert_eq!(fx.keeper.pending_entries(&ctx).expect("entries").len(), 1);
    }

    #[test]
    fn corrupt_queue_key_is_reported() {
        let fx = Fixture::new(150);
        let mut bad_key = PENDING_CLIENT_PREFIX.to_vec();
        bad_key.extend_from_slice(b"abc");
        fx.store.set(&bad_key, b"").expect("set");
        let err = fx.keeper.begin_block(&fx.ctx()).expect_err("corrupt");
        assert!(matches!(err, ProviderError::CorruptKey(_)));
        assert_eq!(fx.store.open_iterators(), 0);
    }
}
