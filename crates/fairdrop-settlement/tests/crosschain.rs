//! Integration test: cross-domain claims
//!
//! SIGN → ROUTE → BRIDGE → CREDIT
//!
//! Covers signed claims paid to another domain, satellite-initiated claims
//! (two bridge hops), redelivery, and the bridge-only entrypoints.

use std::sync::Arc;

use ed25519_dalek::SigningKey;
use fairdrop_ledger::{MerkleTree, hash_leaf};
use fairdrop_settlement::{
    BridgeAdapter, DestinationCredits, Distributor, DistributorBuilder, InMemoryBridge,
    InboundOutcome, Satellite,
};
use fairdrop_types::*;

const T0: u64 = 1_700_000_000;
const HOME: Domain = Domain(1);
const AWAY: Domain = Domain(2);

struct World {
    distributor: Distributor,
    tree: MerkleTree,
    home_bridge: Arc<InMemoryBridge>,
    away_bridge: Arc<InMemoryBridge>,
    credits: DestinationCredits,
    alice_key: SigningKey,
}

fn token() -> Address {
    Address::from_low_u64(0xaa)
}

fn alice(key: &SigningKey) -> Address {
    Address::from_verifying_key(&key.verifying_key())
}

fn bob() -> Address {
    Address::from_low_u64(2)
}

fn carol() -> Address {
    Address::from_low_u64(3)
}

fn recipient() -> Address {
    Address::from_low_u64(0x7e)
}

/// Leaves: alice 1000 on HOME, bob 2000 on HOME, carol 800 on AWAY.
/// 50% vested at T0, 100% at T0 + 100.
fn world() -> World {
    let alice_key = SigningKey::from_bytes(&[1u8; 32]);
    let tree = MerkleTree::from_leaves(vec![
        hash_leaf(&alice(&alice_key), 1000, Some(HOME)),
        hash_leaf(&bob(), 2000, Some(HOME)),
        hash_leaf(&carol(), 800, Some(AWAY)),
    ])
    .unwrap();

    let home_bridge = Arc::new(InMemoryBridge::new(Address::from_low_u64(0xb1), HOME, [AWAY]));
    let away_bridge = Arc::new(InMemoryBridge::new(Address::from_low_u64(0xb2), AWAY, [HOME]));
    let config = DistributorConfig {
        token: token(),
        admin: Address::from_low_u64(0xad),
        domain: HOME,
        total: 3800,
        uri: "ipfs://QmCrosschain".into(),
        vote_factor: constants::DEFAULT_VOTE_FACTOR,
        max_delay: 0,
        schedule: ScheduleConfig::Tranche {
            tranches: vec![Tranche::new(T0, 5000), Tranche::new(T0 + 100, 10_000)],
        },
    };
    let mut distributor = DistributorBuilder::new(config)
        .domain_bound_merkle_root(tree.root())
        .bridge(home_bridge.clone())
        .clock(Arc::new(ManualClock::new(T0)))
        .build()
        .unwrap();
    distributor.fund(3800).unwrap();

    World {
        distributor,
        tree,
        credits: DestinationCredits::new(AWAY, away_bridge.address()),
        home_bridge,
        away_bridge,
        alice_key,
    }
}

fn claim_message(w: &World, recipient_domain: Domain) -> CrosschainClaim {
    CrosschainClaim {
        recipient: recipient(),
        recipient_domain,
        beneficiary: alice(&w.alice_key),
        beneficiary_domain: HOME,
        amount: 1000,
    }
}

#[test]
fn signed_claim_routes_tokens_to_recipient_domain() {
    let mut w = world();
    let signed = SignedClaim::sign(claim_message(&w, AWAY), &w.alice_key);
    let proof = w.tree.proof(0).unwrap();

    // =====================================================================
    // ROUTE: half vested, handed to the bridge
    // =====================================================================
    let paid = w.distributor.claim_by_signature(&signed, proof, 5).unwrap();
    assert_eq!(paid, 500);
    assert_eq!(w.distributor.token_balance(&w.home_bridge.address()), 500);
    assert_eq!(w.distributor.token_balance(&w.distributor.address()), 3300);
    assert_eq!(w.distributor.token_balance(&recipient()), 0);

    let record = w.distributor.get_distribution_record(&alice(&w.alice_key));
    assert_eq!(record.claimed, 500);

    let events = w.distributor.take_events();
    assert!(events.iter().any(|e| matches!(
        e,
        DistributorEvent::CrosschainClaimed {
            recipient_domain: AWAY,
            amount: 500,
            ..
        }
    )));

    // =====================================================================
    // BRIDGE + CREDIT: destination domain receives the tokens
    // =====================================================================
    let msgs = w.home_bridge.drain();
    assert_eq!(msgs.len(), 1);
    let msg = msgs.into_iter().next().unwrap();
    assert_eq!(msg.transfer.destination, AWAY);
    assert_eq!(msg.transfer.recipient, recipient());
    assert_eq!(msg.transfer.asset, token());
    assert_eq!(w.home_bridge.relayer_fee(&msg.transfer_id), Some(5));

    let outcome = w
        .credits
        .x_receive(w.away_bridge.address(), &msg.into_inbound())
        .unwrap();
    assert_eq!(
        outcome,
        InboundOutcome::Settled {
            amount: 500,
            forwarded: None
        }
    );
    assert_eq!(w.credits.balance(&token(), &recipient()), 500);
    w.distributor.verify_supply().unwrap();
}

#[test]
fn signed_claim_to_home_domain_pays_locally() {
    let mut w = world();
    let signed = SignedClaim::sign(claim_message(&w, HOME), &w.alice_key);
    let paid = w
        .distributor
        .claim_by_signature(&signed, w.tree.proof(0).unwrap(), 0)
        .unwrap();
    assert_eq!(paid, 500);
    assert_eq!(w.distributor.token_balance(&recipient()), 500);
    assert_eq!(w.home_bridge.sent_count(), 0);
}

#[test]
fn signature_from_someone_else_is_rejected() {
    let mut w = world();
    let mallory = SigningKey::from_bytes(&[9u8; 32]);
    let forged = SignedClaim::sign(claim_message(&w, AWAY), &mallory);
    let err = w
        .distributor
        .claim_by_signature(&forged, w.tree.proof(0).unwrap(), 0)
        .unwrap_err();
    assert!(matches!(err, FairdropError::SignatureMismatch { .. }));

    let mut tampered = SignedClaim::sign(claim_message(&w, AWAY), &w.alice_key);
    tampered.message.recipient = Address::from_low_u64(0xbad);
    assert!(matches!(
        w.distributor
            .claim_by_signature(&tampered, w.tree.proof(0).unwrap(), 0),
        Err(FairdropError::SignatureMismatch { .. })
    ));

    assert!(!w
        .distributor
        .get_distribution_record(&alice(&w.alice_key))
        .initialized);
    assert_eq!(w.home_bridge.sent_count(), 0);
}

#[test]
fn unroutable_destination_changes_nothing() {
    let mut w = world();
    let signed = SignedClaim::sign(claim_message(&w, Domain(9)), &w.alice_key);
    let err = w
        .distributor
        .claim_by_signature(&signed, w.tree.proof(0).unwrap(), 0)
        .unwrap_err();
    assert!(matches!(err, FairdropError::UnknownDomain(Domain(9))));
    assert_eq!(w.distributor.claimed(), 0);
    assert_eq!(w.distributor.token_balance(&w.distributor.address()), 3800);
    assert!(w.distributor.events().is_empty());
}

#[test]
fn satellite_claim_round_trip() {
    let mut w = world();
    let satellite = Satellite::new(
        Address::from_low_u64(0x5a),
        HOME,
        w.distributor.address(),
        w.tree.root(),
        w.away_bridge.clone(),
    )
    .unwrap();

    // =====================================================================
    // HOP 1: satellite -> distributor
    // =====================================================================
    satellite
        .initiate_claim(carol(), 800, w.tree.proof(2).unwrap(), 1)
        .unwrap();
    let request = w.away_bridge.drain().into_iter().next().unwrap();
    assert_eq!(request.transfer.amount, 0);
    let request = request.into_inbound();

    let outcome = w
        .distributor
        .x_receive(w.home_bridge.address(), &request)
        .unwrap();
    let InboundOutcome::Settled { amount, forwarded } = outcome else {
        panic!("expected settlement, got {outcome:?}");
    };
    assert_eq!(amount, 400);
    assert!(forwarded.is_some());

    let record = w.distributor.get_distribution_record(&carol());
    assert_eq!(record.total, 800);
    assert_eq!(record.claimed, 400);
    assert_eq!(w.distributor.token_balance(&carol()), 0);

    // =====================================================================
    // HOP 2: distributor -> satellite domain
    // =====================================================================
    let payout = w.home_bridge.drain().into_iter().next().unwrap();
    assert_eq!(Some(payout.transfer_id), forwarded);
    assert_eq!(payout.transfer.destination, AWAY);
    assert_eq!(payout.transfer.recipient, carol());
    w.credits
        .x_receive(w.away_bridge.address(), &payout.into_inbound())
        .unwrap();
    assert_eq!(w.credits.balance(&token(), &carol()), 400);

    // =====================================================================
    // REDELIVERY: the same request is applied once
    // =====================================================================
    assert_eq!(
        w.distributor
            .x_receive(w.home_bridge.address(), &request)
            .unwrap(),
        InboundOutcome::Duplicate
    );
    assert_eq!(w.distributor.get_distribution_record(&carol()).claimed, 400);
    assert_eq!(w.home_bridge.sent_count(), 1);
}

#[test]
fn satellite_rejects_leaf_bound_elsewhere() {
    let w = world();
    let satellite = Satellite::new(
        Address::from_low_u64(0x5a),
        HOME,
        w.distributor.address(),
        w.tree.root(),
        w.away_bridge.clone(),
    )
    .unwrap();
    // Alice's leaf is bound to HOME, not the satellite's domain.
    let err = satellite
        .initiate_claim(alice(&w.alice_key), 1000, w.tree.proof(0).unwrap(), 0)
        .unwrap_err();
    assert!(matches!(err, FairdropError::InvalidProof { .. }));
    assert_eq!(w.away_bridge.sent_count(), 0);
}

#[test]
fn away_leaf_cannot_be_claimed_at_home() {
    let mut w = world();
    let err = w
        .distributor
        .claim_by_merkle_proof(carol(), 800, w.tree.proof(2).unwrap())
        .unwrap_err();
    assert!(matches!(err, FairdropError::InvalidProof { .. }));
}

#[test]
fn only_bridge_may_call_x_receive() {
    let mut w = world();
    let request = InboundTransfer {
        transfer_id: TransferId::deterministic(AWAY, 0),
        amount: 0,
        asset: Address::ZERO,
        origin_sender: Address::from_low_u64(0x5a),
        origin_domain: AWAY,
        recipient: w.distributor.address(),
        payload: ClaimRequestPayload {
            beneficiary: carol(),
            amount: 800,
            proof: w.tree.proof(2).unwrap(),
        }
        .encode()
        .unwrap(),
    };
    let err = w
        .distributor
        .x_receive(carol(), &request)
        .unwrap_err();
    assert!(matches!(
        err,
        FairdropError::Unauthorized {
            action: "x_receive",
            ..
        }
    ));
    assert!(!w.distributor.get_distribution_record(&carol()).initialized);
}

#[test]
fn malformed_request_is_not_marked_applied() {
    let mut w = world();
    let mut request = InboundTransfer {
        transfer_id: TransferId::deterministic(AWAY, 0),
        amount: 0,
        asset: Address::ZERO,
        origin_sender: Address::from_low_u64(0x5a),
        origin_domain: AWAY,
        recipient: w.distributor.address(),
        payload: b"not json".to_vec(),
    };
    assert!(matches!(
        w.distributor.x_receive(w.home_bridge.address(), &request),
        Err(FairdropError::InvalidPayload { .. })
    ));

    // A corrected redelivery with the same id still settles.
    request.payload = ClaimRequestPayload {
        beneficiary: carol(),
        amount: 800,
        proof: w.tree.proof(2).unwrap(),
    }
    .encode()
    .unwrap();
    assert!(matches!(
        w.distributor.x_receive(w.home_bridge.address(), &request),
        Ok(InboundOutcome::Settled { amount: 400, .. })
    ));
}

// =========================================================================
// Evidence is checked on every bridged claim, not only the first
// =========================================================================

#[test]
fn initialized_record_cannot_be_redirected_by_inbound_request() {
    let mut w = world();
    let bob_leaf = MerkleEvidence::with_domain(2000, HOME, w.tree.proof(1).unwrap());
    w.distributor
        .initialize_distribution_record(bob(), &bob_leaf.into())
        .unwrap();

    // Bob's leaf is bound to HOME; a request from AWAY with no proof must fail.
    let request = InboundTransfer {
        transfer_id: TransferId::deterministic(AWAY, 7),
        amount: 0,
        asset: Address::ZERO,
        origin_sender: Address::from_low_u64(0x5a),
        origin_domain: AWAY,
        recipient: w.distributor.address(),
        payload: ClaimRequestPayload {
            beneficiary: bob(),
            amount: 1,
            proof: vec![],
        }
        .encode()
        .unwrap(),
    };
    let err = w
        .distributor
        .x_receive(w.home_bridge.address(), &request)
        .unwrap_err();
    assert!(matches!(err, FairdropError::InvalidProof { .. }));

    let record = w.distributor.get_distribution_record(&bob());
    assert!(record.initialized);
    assert_eq!(record.claimed, 0);
    assert_eq!(w.home_bridge.sent_count(), 0);
    assert_eq!(w.distributor.token_balance(&w.distributor.address()), 3800);
}

#[test]
fn initialized_record_cannot_be_redirected_by_signed_claim() {
    let mut w = world();
    let alice_leaf = MerkleEvidence::with_domain(1000, HOME, w.tree.proof(0).unwrap());
    w.distributor
        .initialize_distribution_record(alice(&w.alice_key), &alice_leaf.into())
        .unwrap();

    let mut wrong_domain = claim_message(&w, AWAY);
    wrong_domain.beneficiary_domain = AWAY;
    let signed = SignedClaim::sign(wrong_domain, &w.alice_key);
    assert!(matches!(
        w.distributor
            .claim_by_signature(&signed, w.tree.proof(0).unwrap(), 0),
        Err(FairdropError::InvalidProof { .. })
    ));

    let mut wrong_amount = claim_message(&w, AWAY);
    wrong_amount.amount = 1;
    let signed = SignedClaim::sign(wrong_amount, &w.alice_key);
    assert!(matches!(
        w.distributor.claim_by_signature(&signed, Vec::new(), 0),
        Err(FairdropError::InvalidProof { .. })
    ));

    assert_eq!(
        w.distributor
            .get_distribution_record(&alice(&w.alice_key))
            .claimed,
        0
    );
    assert_eq!(w.home_bridge.sent_count(), 0);

    // The genuine leaf still claims after initialization.
    let signed = SignedClaim::sign(claim_message(&w, AWAY), &w.alice_key);
    assert_eq!(
        w.distributor
            .claim_by_signature(&signed, w.tree.proof(0).unwrap(), 0)
            .unwrap(),
        500
    );
}

#[test]
fn inbound_transfer_for_another_recipient_is_rejected() {
    let mut w = world();
    let mut request = InboundTransfer {
        transfer_id: TransferId::deterministic(AWAY, 3),
        amount: 0,
        asset: Address::ZERO,
        origin_sender: Address::from_low_u64(0x5a),
        origin_domain: AWAY,
        recipient: carol(),
        payload: ClaimRequestPayload {
            beneficiary: carol(),
            amount: 800,
            proof: w.tree.proof(2).unwrap(),
        }
        .encode()
        .unwrap(),
    };
    assert!(matches!(
        w.distributor.x_receive(w.home_bridge.address(), &request),
        Err(FairdropError::InvalidPayload { .. })
    ));
    assert!(!w.distributor.get_distribution_record(&carol()).initialized);
    assert_eq!(w.home_bridge.sent_count(), 0);

    // Not marked applied: the same id addressed correctly settles.
    request.recipient = w.distributor.address();
    assert!(matches!(
        w.distributor.x_receive(w.home_bridge.address(), &request),
        Ok(InboundOutcome::Settled { amount: 400, .. })
    ));
}
