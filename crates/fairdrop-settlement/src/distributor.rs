//! Distributor: routes claims end to end.
//!
//! A claim runs in two phases:
//! 1. **Prepare** (read-only): resolve the entitlement (proof or sale),
//!    pass the fair-queue gate, read the vested fraction, compute the
//!    claimable amount and check the distributor holds it.
//! 2. **Commit**: hand tokens to the recipient or the bridge, initialize
//!    the record if needed, debit the ledger, append the event.
//!
//! Any error in phase 1 leaves the distributor untouched. Phase 2 calls the
//! bridge first, so a refused send also changes nothing.

use std::sync::Arc;

use fairdrop_ledger::{
    AllocationSource, DistributionLedger, EligibilityVerifier, FairQueue, SaleAllocation,
    TokenTreasury, VotingPowerTracker, claimable_amount,
};
use fairdrop_schedule::{PriceFeed, VestingScheduler};
use fairdrop_types::{
    Address, ClaimRequestPayload, Clock, DistributionRecord, DistributorConfig, DistributorEvent,
    Domain, Evidence, FairdropError, Hash32, InboundTransfer, MerkleEvidence, OutboundTransfer,
    PriceTier, Result, ScheduleKind, SignedClaim, SystemClock, Tranche, TransferId,
};
use sha2::{Digest, Sha256};

use crate::{AppliedTransfers, BridgeAdapter};

/// Result of an inbound bridge delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
    /// The claim was settled. `forwarded` is the outbound transfer carrying
    /// the tokens back, if they left this domain.
    Settled {
        amount: u128,
        forwarded: Option<TransferId>,
    },
    /// This transfer id was already applied. Nothing changed.
    Duplicate,
}

/// Where a claim's tokens go.
#[derive(Debug, Clone, Copy)]
enum Payout {
    Local {
        recipient: Address,
    },
    Bridge {
        recipient: Address,
        destination: Domain,
        relayer_fee: u128,
    },
}

/// Validated claim, ready to commit.
#[derive(Debug, Clone, Copy)]
struct ClaimPlan {
    beneficiary: Address,
    /// Entitlement to record if the beneficiary is new.
    initialize: Option<u128>,
    amount: u128,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Assembles a [`Distributor`] from config and collaborators.
pub struct DistributorBuilder {
    config: DistributorConfig,
    source: Option<AllocationSource>,
    oracle: Option<Arc<dyn PriceFeed>>,
    bridge: Option<Arc<dyn BridgeAdapter>>,
    clock: Arc<dyn Clock>,
    address: Option<Address>,
    seed: Option<Address>,
}

impl DistributorBuilder {
    #[must_use]
    pub fn new(config: DistributorConfig) -> Self {
        Self {
            config,
            source: None,
            oracle: None,
            bridge: None,
            clock: Arc::new(SystemClock),
            address: None,
            seed: None,
        }
    }

    /// Entitlements proved against `(beneficiary, amount)` leaves.
    #[must_use]
    pub fn merkle_root(mut self, root: Hash32) -> Self {
        self.source = Some(AllocationSource::Merkle(EligibilityVerifier::new(root)));
        self
    }

    /// Entitlements proved against `(beneficiary, amount, domain)` leaves.
    #[must_use]
    pub fn domain_bound_merkle_root(mut self, root: Hash32) -> Self {
        self.source = Some(AllocationSource::Merkle(EligibilityVerifier::domain_bound(root)));
        self
    }

    /// Entitlements read from a finished sale. The distribution total is
    /// the sale's converted total.
    #[must_use]
    pub fn sale(mut self, sale: SaleAllocation) -> Self {
        self.source = Some(AllocationSource::Sale(sale));
        self
    }

    #[must_use]
    pub fn oracle(mut self, oracle: Arc<dyn PriceFeed>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    #[must_use]
    pub fn bridge(mut self, bridge: Arc<dyn BridgeAdapter>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Account holding the distributor's tokens. Derived from the config
    /// when not set.
    #[must_use]
    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Fair-queue seed. Derived from creation entropy when not set.
    #[must_use]
    pub fn seed(mut self, seed: Address) -> Self {
        self.seed = Some(seed);
        self
    }

    /// # Errors
    /// Any configuration, schedule, or seed problem. A distributor that
    /// would misbehave at claim time is never built.
    pub fn build(self) -> Result<Distributor> {
        let config = self.config;
        config.validate()?;
        let source = self.source.ok_or_else(|| {
            FairdropError::Configuration("an allocation source is required".into())
        })?;
        let total = match &source {
            AllocationSource::Merkle(_) => config.total,
            AllocationSource::Sale(sale) => sale.total()?,
        };
        if let Some(bridge) = &self.bridge {
            if bridge.domain() != config.domain {
                return Err(FairdropError::Configuration(format!(
                    "bridge sends from {} but distributor runs on {}",
                    bridge.domain(),
                    config.domain
                )));
            }
        }

        let scheduler = VestingScheduler::new(&config.schedule, self.oracle)?;
        let created_at = self.clock.now();
        let address = self.address.unwrap_or_else(|| derive_address(&config));
        let seed = self.seed.unwrap_or_else(|| {
            let mut entropy = Vec::with_capacity(28);
            entropy.extend_from_slice(address.as_bytes());
            entropy.extend_from_slice(&created_at.to_be_bytes());
            FairQueue::derive_seed(&entropy)
        });
        let queue = FairQueue::new(seed, config.max_delay, created_at)?;

        tracing::info!(
            address = %address,
            token = %config.token,
            domain = %config.domain,
            total,
            schedule = %scheduler.kind(),
            max_delay = config.max_delay,
            "distributor created"
        );

        Ok(Distributor {
            address,
            source,
            scheduler,
            ledger: DistributionLedger::new(total),
            queue,
            votes: VotingPowerTracker::new(config.vote_factor),
            treasury: TokenTreasury::new(),
            bridge: self.bridge,
            inbound: AppliedTransfers::new(),
            clock: self.clock,
            events: Vec::new(),
            config,
        })
    }
}

fn derive_address(config: &DistributorConfig) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(b"fairdrop:distributor:v1:");
    hasher.update(config.token.as_bytes());
    hasher.update(config.domain.to_be_bytes());
    hasher.update(config.uri.as_bytes());
    let hash = hasher.finalize();
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address(bytes)
}

// ---------------------------------------------------------------------------
// Distributor
// ---------------------------------------------------------------------------

/// A single-token, single-root distribution on one domain.
///
/// Every `&mut self` method is one serialized transaction: it either
/// commits completely or returns an error with no state changed.
pub struct Distributor {
    config: DistributorConfig,
    address: Address,
    source: AllocationSource,
    scheduler: VestingScheduler,
    ledger: DistributionLedger,
    queue: FairQueue,
    votes: VotingPowerTracker,
    treasury: TokenTreasury,
    bridge: Option<Arc<dyn BridgeAdapter>>,
    inbound: AppliedTransfers,
    clock: Arc<dyn Clock>,
    events: Vec<DistributorEvent>,
}

impl Distributor {
    // =================================================================
    // Claims
    // =================================================================

    /// Verify `beneficiary`'s entitlement and record it.
    ///
    /// The evidence is always checked. If the record already exists the
    /// call is then a no-op: total, claimed and voting power stay as they
    /// were, whatever amount the evidence carries.
    pub fn initialize_distribution_record(
        &mut self,
        beneficiary: Address,
        evidence: &Evidence,
    ) -> Result<()> {
        let total = self.source.resolve(&beneficiary, evidence, self.domain())?;
        if self.ledger.initialize(beneficiary, total)? {
            self.record_initialized(beneficiary, total);
        }
        Ok(())
    }

    /// Claim everything currently claimable for `beneficiary` and pay it
    /// to `beneficiary` on this domain. Anyone may relay the call.
    ///
    /// Returns the amount paid.
    pub fn claim(&mut self, beneficiary: Address, evidence: &Evidence) -> Result<u128> {
        let plan = self.prepare_claim(beneficiary, evidence, self.clock.now())?;
        self.commit_claim(
            plan,
            Payout::Local {
                recipient: beneficiary,
            },
        )?;
        Ok(plan.amount)
    }

    /// Merkle-proof claim. Same as [`Distributor::claim`].
    pub fn claim_by_merkle_proof(
        &mut self,
        beneficiary: Address,
        amount: u128,
        proof: Vec<Hash32>,
    ) -> Result<u128> {
        self.claim(beneficiary, &MerkleEvidence::new(amount, proof).into())
    }

    /// Claim on behalf of the signer of `signed`, routing the tokens to
    /// `recipient` on `recipient_domain`.
    ///
    /// The leaf is checked as `(beneficiary, amount, beneficiary_domain)`.
    /// `relayer_fee` is forwarded to the bridge verbatim.
    pub fn claim_by_signature(
        &mut self,
        signed: &SignedClaim,
        proof: Vec<Hash32>,
        relayer_fee: u128,
    ) -> Result<u128> {
        let message = &signed.message;
        let signer = signed.recover_signer().inspect_err(|_| {
            tracing::warn!(beneficiary = %message.beneficiary, "claim signature invalid");
        })?;
        if signer != message.beneficiary {
            tracing::warn!(
                beneficiary = %message.beneficiary,
                signer = %signer,
                "claim signed by someone other than the beneficiary"
            );
            return Err(FairdropError::SignatureMismatch {
                beneficiary: message.beneficiary,
            });
        }

        let evidence = Evidence::Merkle(MerkleEvidence::with_domain(
            message.amount,
            message.beneficiary_domain,
            proof,
        ));
        self.verify_evidence(message.beneficiary, &evidence)?;
        let plan = self.prepare_claim(message.beneficiary, &evidence, self.clock.now())?;
        let payout = self.payout_to(message.recipient, message.recipient_domain, relayer_fee);
        self.commit_claim(plan, payout)?;
        Ok(plan.amount)
    }

    /// Bridge entrypoint: replay a claim request sent from a satellite.
    ///
    /// Only the configured bridge account may call this. The request's leaf
    /// is bound to the origin domain, and the tokens go back there to the
    /// beneficiary. The transfer must be addressed to this distributor. A
    /// redelivered transfer id is reported as a duplicate.
    pub fn x_receive(&mut self, caller: Address, inbound: &InboundTransfer) -> Result<InboundOutcome> {
        let bridge = self.bridge.as_ref().ok_or(FairdropError::BridgeNotConfigured)?;
        if caller != bridge.address() {
            tracing::warn!(caller = %caller, "inbound transfer not from bridge");
            return Err(FairdropError::Unauthorized {
                caller,
                action: "x_receive",
            });
        }
        if inbound.recipient != self.address {
            tracing::warn!(
                transfer_id = %inbound.transfer_id,
                recipient = %inbound.recipient,
                "inbound transfer addressed elsewhere"
            );
            return Err(FairdropError::InvalidPayload {
                reason: format!("transfer addressed to {}", inbound.recipient),
            });
        }
        if self.inbound.is_applied(&inbound.transfer_id) {
            tracing::warn!(transfer_id = %inbound.transfer_id, "duplicate inbound transfer");
            return Ok(InboundOutcome::Duplicate);
        }

        let request = ClaimRequestPayload::decode(&inbound.payload)?;
        let evidence = Evidence::Merkle(MerkleEvidence::with_domain(
            request.amount,
            inbound.origin_domain,
            request.proof,
        ));
        self.verify_evidence(request.beneficiary, &evidence)?;
        let plan = self.prepare_claim(request.beneficiary, &evidence, self.clock.now())?;
        let payout = self.payout_to(request.beneficiary, inbound.origin_domain, 0);
        let forwarded = self.commit_claim(plan, payout)?;
        self.inbound.mark_applied(inbound.transfer_id)?;

        tracing::info!(
            transfer_id = %inbound.transfer_id,
            origin = %inbound.origin_domain,
            beneficiary = %request.beneficiary,
            amount = plan.amount,
            "inbound claim settled"
        );
        Ok(InboundOutcome::Settled {
            amount: plan.amount,
            forwarded,
        })
    }

    /// Check `evidence` against the allocation source even when the record
    /// is already initialized. Bridged claims pick their payout domain from
    /// the evidence, so the leaf must back it on every call.
    fn verify_evidence(&self, beneficiary: Address, evidence: &Evidence) -> Result<()> {
        self.source
            .resolve(&beneficiary, evidence, self.domain())
            .inspect_err(|_| {
                tracing::warn!(beneficiary = %beneficiary, "claim evidence rejected");
            })?;
        Ok(())
    }

    fn payout_to(&self, recipient: Address, domain: Domain, relayer_fee: u128) -> Payout {
        if domain == self.domain() {
            Payout::Local { recipient }
        } else {
            Payout::Bridge {
                recipient,
                destination: domain,
                relayer_fee,
            }
        }
    }

    fn prepare_claim(&self, beneficiary: Address, evidence: &Evidence, now: u64) -> Result<ClaimPlan> {
        let initialize = if self.ledger.is_initialized(&beneficiary) {
            None
        } else {
            Some(self.source.resolve(&beneficiary, evidence, self.domain())?)
        };
        self.queue.check_ready(&beneficiary, now)?;

        let record = match initialize {
            Some(total) => DistributionRecord::initialized(beneficiary, total),
            None => self.ledger.record(&beneficiary),
        };
        let fraction = self.scheduler.vested_fraction(now)?;
        let amount = claimable_amount(record.total, record.claimed, fraction)?;
        if amount == 0 {
            return Err(FairdropError::NoMoreTokensClaimable { beneficiary });
        }
        let available = self.treasury.balance(&self.config.token, &self.address);
        if available < amount {
            return Err(FairdropError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        Ok(ClaimPlan {
            beneficiary,
            initialize,
            amount,
        })
    }

    fn commit_claim(&mut self, plan: ClaimPlan, payout: Payout) -> Result<Option<TransferId>> {
        let token = self.config.token;
        let forwarded = match payout {
            Payout::Local { recipient } => {
                self.treasury
                    .transfer(token, self.address, recipient, plan.amount)?;
                None
            }
            Payout::Bridge {
                recipient,
                destination,
                relayer_fee,
            } => {
                let bridge = self.bridge.as_ref().ok_or(FairdropError::BridgeNotConfigured)?;
                let transfer_id = bridge.send_transfer(
                    self.address,
                    OutboundTransfer {
                        destination,
                        recipient,
                        asset: token,
                        amount: plan.amount,
                        relayer_fee,
                        payload: Vec::new(),
                    },
                )?;
                self.treasury
                    .transfer(token, self.address, bridge.address(), plan.amount)?;
                Some(transfer_id)
            }
        };

        if let Some(total) = plan.initialize {
            self.ledger.initialize(plan.beneficiary, total)?;
            self.record_initialized(plan.beneficiary, total);
        }
        self.ledger.apply_claim(&plan.beneficiary, plan.amount)?;

        match (payout, forwarded) {
            (
                Payout::Bridge {
                    recipient,
                    destination,
                    ..
                },
                Some(transfer_id),
            ) => {
                tracing::info!(
                    beneficiary = %plan.beneficiary,
                    recipient = %recipient,
                    recipient_domain = %destination,
                    amount = plan.amount,
                    transfer_id = %transfer_id,
                    "crosschain claim"
                );
                self.events.push(DistributorEvent::CrosschainClaimed {
                    beneficiary: plan.beneficiary,
                    recipient,
                    recipient_domain: destination,
                    amount: plan.amount,
                    transfer_id,
                });
            }
            (Payout::Local { recipient }, _) | (Payout::Bridge { recipient, .. }, None) => {
                tracing::info!(
                    beneficiary = %plan.beneficiary,
                    recipient = %recipient,
                    amount = plan.amount,
                    "claim"
                );
                self.events.push(DistributorEvent::Claimed {
                    beneficiary: plan.beneficiary,
                    amount: plan.amount,
                });
            }
        }
        Ok(forwarded)
    }

    fn record_initialized(&mut self, beneficiary: Address, total: u128) {
        tracing::info!(beneficiary = %beneficiary, total, "distribution record initialized");
        self.events
            .push(DistributorEvent::RecordInitialized { beneficiary, total });
    }

    // =================================================================
    // Reads
    // =================================================================

    /// The stored record. For an uninitialized beneficiary of a sale-backed
    /// distributor, the total inferred from the sale with `initialized = false`.
    #[must_use]
    pub fn get_distribution_record(&self, beneficiary: &Address) -> DistributionRecord {
        let record = self.ledger.record(beneficiary);
        if record.initialized {
            return record;
        }
        match self.source.inferred_total(beneficiary) {
            Ok(Some(total)) => DistributionRecord { total, ..record },
            _ => record,
        }
    }

    /// Amount a claim would pay right now, ignoring the fair-queue gate.
    ///
    /// For an uninitialized beneficiary the evidence is verified and its
    /// total used. Nothing is written.
    pub fn get_claimable_amount(&self, beneficiary: &Address, evidence: &Evidence) -> Result<u128> {
        let record = if self.ledger.is_initialized(beneficiary) {
            self.ledger.record(beneficiary)
        } else {
            let total = self.source.resolve(beneficiary, evidence, self.domain())?;
            DistributionRecord::initialized(*beneficiary, total)
        };
        let fraction = self.scheduler.vested_fraction(self.clock.now())?;
        claimable_amount(record.total, record.claimed, fraction)
    }

    /// Seconds after creation before `addr` may claim.
    #[must_use]
    pub fn get_fair_delay_time(&self, addr: &Address) -> u64 {
        self.queue.delay(addr)
    }

    /// Vested fraction right now, in basis points.
    pub fn vested_fraction(&self) -> Result<u16> {
        self.scheduler.vested_fraction(self.clock.now())
    }

    pub fn get_votes(&self, account: &Address) -> Result<u128> {
        self.votes.get_votes(account, &self.ledger)
    }

    #[must_use]
    pub fn delegates(&self, account: &Address) -> Address {
        self.votes.delegates(account)
    }

    // =================================================================
    // Voting
    // =================================================================

    /// Point `caller`'s voting weight at `to`.
    pub fn delegate(&mut self, caller: Address, to: Address) {
        let from = self.votes.delegate(caller, to);
        if from != to {
            tracing::info!(delegator = %caller, from = %from, to = %to, "delegate changed");
            self.events.push(DistributorEvent::DelegateChanged {
                delegator: caller,
                from,
                to,
            });
        }
    }

    // =================================================================
    // Administration
    // =================================================================

    fn require_admin(&self, caller: Address, action: &'static str) -> Result<()> {
        if caller != self.config.admin {
            tracing::warn!(caller = %caller, action, "unauthorized admin call");
            return Err(FairdropError::Unauthorized { caller, action });
        }
        Ok(())
    }

    /// Move `beneficiary`'s total by a signed `delta`. Claimed is untouched.
    pub fn adjust(&mut self, caller: Address, beneficiary: Address, delta: i128) -> Result<()> {
        self.require_admin(caller, "adjust")?;
        let record = self.ledger.adjust(&beneficiary, delta)?;
        tracing::info!(beneficiary = %beneficiary, delta, total = record.total, "record adjusted");
        self.events
            .push(DistributorEvent::Adjusted { beneficiary, delta });
        Ok(())
    }

    /// Replace the tranche list wholesale.
    pub fn set_tranches(&mut self, caller: Address, tranches: Vec<Tranche>) -> Result<()> {
        self.require_admin(caller, "set_tranches")?;
        let version = self.scheduler.replace_tranches(tranches)?;
        self.schedule_changed(ScheduleKind::Tranche, version);
        Ok(())
    }

    /// Replace the price tiers wholesale.
    pub fn set_price_tiers(&mut self, caller: Address, tiers: Vec<PriceTier>) -> Result<()> {
        self.require_admin(caller, "set_price_tiers")?;
        let version = self.scheduler.replace_price_tiers(tiers)?;
        self.schedule_changed(ScheduleKind::PriceTier, version);
        Ok(())
    }

    fn schedule_changed(&mut self, kind: ScheduleKind, version: u64) {
        tracing::info!(kind = %kind, version, "schedule replaced");
        self.events
            .push(DistributorEvent::ScheduleChanged { kind, version });
    }

    pub fn set_total(&mut self, caller: Address, total: u128) -> Result<()> {
        self.require_admin(caller, "set_total")?;
        self.ledger.set_total(total)?;
        tracing::info!(total, "distribution total changed");
        self.events.push(DistributorEvent::TotalChanged { total });
        Ok(())
    }

    pub fn set_uri(&mut self, caller: Address, uri: impl Into<String>) -> Result<()> {
        self.require_admin(caller, "set_uri")?;
        let uri = uri.into();
        if uri.trim().is_empty() {
            return Err(FairdropError::Configuration("uri must not be empty".into()));
        }
        tracing::info!(uri = %uri, "uri changed");
        self.config.uri.clone_from(&uri);
        self.events.push(DistributorEvent::UriChanged { uri });
        Ok(())
    }

    /// Change the vote factor. Every outstanding balance is repriced at once.
    pub fn set_vote_factor(&mut self, caller: Address, vote_factor: u128) -> Result<()> {
        self.require_admin(caller, "set_vote_factor")?;
        self.votes.set_vote_factor(vote_factor);
        tracing::info!(vote_factor, "vote factor changed");
        self.events
            .push(DistributorEvent::VoteFactorChanged { vote_factor });
        Ok(())
    }

    // =================================================================
    // Tokens
    // =================================================================

    /// Mint `amount` of the distributed token into the distributor.
    pub fn fund(&mut self, amount: u128) -> Result<()> {
        self.treasury
            .mint(self.config.token, self.address, amount)?;
        tracing::info!(amount, address = %self.address, "distributor funded");
        Ok(())
    }

    /// Balance of the distributed token held by `holder` on this domain.
    #[must_use]
    pub fn token_balance(&self, holder: &Address) -> u128 {
        self.treasury.balance(&self.config.token, holder)
    }

    /// Check token balances still sum to what was minted.
    pub fn verify_supply(&self) -> Result<()> {
        self.treasury.verify_supply(&self.config.token)
    }

    // =================================================================
    // Accessors
    // =================================================================

    /// Drain the event log.
    pub fn take_events(&mut self) -> Vec<DistributorEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn events(&self) -> &[DistributorEvent] {
        &self.events
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn token(&self) -> Address {
        self.config.token
    }

    #[must_use]
    pub fn domain(&self) -> Domain {
        self.config.domain
    }

    #[must_use]
    pub fn admin(&self) -> Address {
        self.config.admin
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.config.uri
    }

    #[must_use]
    pub fn vote_factor(&self) -> u128 {
        self.votes.vote_factor()
    }

    /// Aggregate entitlement.
    #[must_use]
    pub fn total(&self) -> u128 {
        self.ledger.total()
    }

    /// Aggregate claimed.
    #[must_use]
    pub fn claimed(&self) -> u128 {
        self.ledger.claimed()
    }

    #[must_use]
    pub fn schedule_kind(&self) -> ScheduleKind {
        self.scheduler.kind()
    }

    #[must_use]
    pub fn schedule_version(&self) -> u64 {
        self.scheduler.version()
    }

    #[must_use]
    pub fn fair_queue(&self) -> &FairQueue {
        &self.queue
    }
}

impl std::fmt::Debug for Distributor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Distributor")
            .field("address", &self.address)
            .field("config", &self.config)
            .field("scheduler", &self.scheduler)
            .field("total", &self.ledger.total())
            .field("claimed", &self.ledger.claimed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairdrop_ledger::MerkleTree;
    use fairdrop_types::{ManualClock, ScheduleConfig};

    const NOW: u64 = 1_700_000_000;

    fn admin() -> Address {
        Address::from_low_u64(0xad)
    }

    fn alice() -> Address {
        Address::from_low_u64(1)
    }

    fn config(schedule: ScheduleConfig) -> DistributorConfig {
        DistributorConfig {
            token: Address::from_low_u64(0xaa),
            admin: admin(),
            domain: Domain(1),
            total: 3000,
            uri: "ipfs://QmUnit".into(),
            vote_factor: 10_000,
            max_delay: 0,
            schedule,
        }
    }

    fn setup() -> (Distributor, MerkleTree, Arc<ManualClock>) {
        let tree = MerkleTree::from_allocations(
            &[(alice(), 1000), (Address::from_low_u64(2), 2000)],
            None,
        )
        .unwrap();
        let clock = Arc::new(ManualClock::new(NOW));
        let mut d = DistributorBuilder::new(config(ScheduleConfig::Tranche {
            tranches: vec![Tranche::new(NOW - 1, 5000), Tranche::new(NOW + 100, 10_000)],
        }))
        .merkle_root(tree.root())
        .clock(clock.clone())
        .build()
        .unwrap();
        d.fund(3000).unwrap();
        (d, tree, clock)
    }

    fn evidence(tree: &MerkleTree, index: usize, amount: u128) -> Evidence {
        MerkleEvidence::new(amount, tree.proof(index).unwrap()).into()
    }

    #[test]
    fn build_requires_source() {
        let err = DistributorBuilder::new(config(ScheduleConfig::Continuous {
            start: NOW,
            cliff: NOW,
            end: NOW + 10,
        }))
        .build()
        .unwrap_err();
        assert!(matches!(err, FairdropError::Configuration(_)));
    }

    #[test]
    fn build_rejects_zero_total_and_bad_schedule() {
        let mut cfg = config(ScheduleConfig::Tranche {
            tranches: vec![Tranche::new(NOW, 10_000)],
        });
        cfg.total = 0;
        assert!(matches!(
            DistributorBuilder::new(cfg).merkle_root([0u8; 32]).build(),
            Err(FairdropError::TotalIsZero)
        ));

        let cfg = config(ScheduleConfig::Tranche {
            tranches: vec![Tranche::new(NOW, 9000)],
        });
        assert!(matches!(
            DistributorBuilder::new(cfg).merkle_root([0u8; 32]).build(),
            Err(FairdropError::MisconfiguredSchedule { .. })
        ));
    }

    #[test]
    fn claim_pays_vested_share() {
        let (mut d, tree, _) = setup();
        assert_eq!(d.claim(alice(), &evidence(&tree, 0, 1000)).unwrap(), 500);
        assert_eq!(d.token_balance(&alice()), 500);
        assert_eq!(d.claimed(), 500);
        d.verify_supply().unwrap();

        let events = d.take_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].to_string(), "RECORD_INITIALIZED");
        assert_eq!(events[1].to_string(), "CLAIMED");
        assert!(d.take_events().is_empty());
    }

    #[test]
    fn failed_claim_changes_nothing() {
        let (mut d, tree, _) = setup();
        assert!(matches!(
            d.claim(alice(), &evidence(&tree, 0, 1001)),
            Err(FairdropError::InvalidProof { .. })
        ));
        assert!(!d.get_distribution_record(&alice()).initialized);
        assert!(d.events().is_empty());
    }

    #[test]
    fn claim_requires_funds() {
        let tree = MerkleTree::from_allocations(&[(alice(), 1000)], None).unwrap();
        let clock = Arc::new(ManualClock::new(NOW));
        let mut d = DistributorBuilder::new(config(ScheduleConfig::Tranche {
            tranches: vec![Tranche::new(NOW - 1, 10_000)],
        }))
        .merkle_root(tree.root())
        .clock(clock)
        .build()
        .unwrap();
        let err = d.claim(alice(), &evidence(&tree, 0, 1000)).unwrap_err();
        assert!(matches!(err, FairdropError::InsufficientFunds { .. }));
        assert!(!d.get_distribution_record(&alice()).initialized);
    }

    #[test]
    fn admin_calls_require_admin() {
        let (mut d, tree, _) = setup();
        d.initialize_distribution_record(alice(), &evidence(&tree, 0, 1000))
            .unwrap();
        let intruder = Address::from_low_u64(0xbad);
        assert!(matches!(
            d.adjust(intruder, alice(), 10),
            Err(FairdropError::Unauthorized { action: "adjust", .. })
        ));
        assert!(d.set_total(intruder, 5).is_err());
        assert!(d.set_uri(intruder, "ipfs://x").is_err());
        assert!(d.set_vote_factor(intruder, 1).is_err());
        assert!(d.set_tranches(intruder, vec![Tranche::new(NOW, 10_000)]).is_err());

        d.set_uri(admin(), "ipfs://QmNew").unwrap();
        assert_eq!(d.uri(), "ipfs://QmNew");
        assert!(d.set_uri(admin(), "").is_err());
        assert!(matches!(d.set_total(admin(), 0), Err(FairdropError::TotalIsZero)));
        d.set_total(admin(), 4000).unwrap();
        assert_eq!(d.total(), 4000);
    }

    #[test]
    fn schedule_replacement_emits_versioned_event() {
        let (mut d, _, _) = setup();
        d.set_tranches(admin(), vec![Tranche::new(NOW + 10, 10_000)])
            .unwrap();
        assert_eq!(d.schedule_version(), 2);
        assert_eq!(d.vested_fraction().unwrap(), 0);
        assert_eq!(
            d.take_events(),
            vec![DistributorEvent::ScheduleChanged {
                kind: ScheduleKind::Tranche,
                version: 2
            }]
        );
        assert!(matches!(
            d.set_price_tiers(admin(), vec![PriceTier::new(1, 10_000)]),
            Err(FairdropError::ScheduleKindMismatch { .. })
        ));
    }

    #[test]
    fn x_receive_requires_bridge() {
        let (mut d, _, _) = setup();
        let inbound = InboundTransfer {
            transfer_id: TransferId::deterministic(Domain(2), 0),
            amount: 0,
            asset: Address::ZERO,
            origin_sender: Address::ZERO,
            origin_domain: Domain(2),
            recipient: d.address(),
            payload: Vec::new(),
        };
        assert!(matches!(
            d.x_receive(Address::ZERO, &inbound),
            Err(FairdropError::BridgeNotConfigured)
        ));
    }

    #[test]
    fn derived_address_is_stable() {
        let cfg = config(ScheduleConfig::Tranche {
            tranches: vec![Tranche::new(NOW, 10_000)],
        });
        assert_eq!(derive_address(&cfg), derive_address(&cfg.clone()));
        let mut other = cfg.clone();
        other.domain = Domain(2);
        assert_ne!(derive_address(&cfg), derive_address(&other));
    }
}
