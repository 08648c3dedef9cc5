use anyhow::Result;
use ccv_provider::{CreateConsumerChainProposal, Height, ProposalOutcome, ProviderError};
use ccv_testkit::{TestChain, consumer_proposal, ts};

#[test]
fn proposal_for_future_spawn_is_queued_until_due() -> Result<()> {
    let mut chain = TestChain::new();
    chain.advance_to(ts(10))?;

    let outcome = chain.propose(&consumer_proposal("chain-A", ts(30)))?;
    assert_eq!(outcome, ProposalOutcome::Scheduled { spawn_time: ts(30) });
    assert!(chain.clients.created().is_empty());

    chain.advance_secs(20)?;
    assert!(chain.clients.created().is_empty(), "t=30 is not after the spawn time");

    let report = chain.advance_secs(1)?;
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.created[0].chain_id, "chain-A");
    Ok(())
}

#[test]
fn proposal_with_elapsed_spawn_time_creates_now() -> Result<()> {
    let mut chain = TestChain::new();
    chain.advance_to(ts(100))?;

    let outcome = chain.propose(&consumer_proposal("chain-B", ts(40)))?;
    let client_id = match outcome {
        ProposalOutcome::ClientCreated { client_id } => client_id,
        other => panic!("expected immediate creation, got {other:?}"),
    };
    let ctx = chain.ctx();
    assert_eq!(chain.keeper.consumer_client(&ctx, "chain-B")?, Some(client_id));
    assert!(chain.keeper.pending_entries(&ctx)?.is_empty());
    Ok(())
}

#[test]
fn proposal_at_exact_block_time_is_scheduled() -> Result<()> {
    let mut chain = TestChain::new();
    chain.advance_to(ts(100))?;
    let outcome = chain.propose(&consumer_proposal("chain-C", ts(100)))?;
    assert!(matches!(outcome, ProposalOutcome::Scheduled { .. }));
    Ok(())
}

#[test]
fn invalid_proposal_leaves_no_trace() {
    let chain = TestChain::new();
    let mut proposal = consumer_proposal("chain-D", ts(50));
    proposal.initial_height = Height::new(0, 0);

    let err = chain.propose(&proposal).expect_err("zero height rejected");
    assert!(matches!(err, ProviderError::InvalidProposal(_)));
    assert!(!err.is_fatal());
    assert!(chain.store.is_empty());
}

#[test]
fn proposal_decoded_from_json_flows_through() -> Result<()> {
    let json = r#"{
        "title": "launch chain-E",
        "chain_id": "chain-E",
        "initial_height": { "revision_number": 0, "revision_height": 5 },
        "spawn_time": 20000000000
    }"#;
    let proposal: CreateConsumerChainProposal = serde_json::from_str(json)?;
    assert_eq!(proposal.spawn_time, ts(20));
    assert!(proposal.description.is_empty());

    let mut chain = TestChain::new();
    chain.propose(&proposal)?;
    chain.advance_to(ts(21))?;
    let created = chain.clients.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].client_state.latest_height, Height::new(0, 5));
    Ok(())
}
