//! Mock game contract for testing.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use game_core::{GameConfig, PlayerStatus, ProfileId, TokenAmount};
use tokio::sync::{broadcast, watch};

use crate::traits::{
    ConfirmationWatcher, ContractError, EventSource, GameActions, GameContract, RoundReader,
    TransportError,
};
use crate::types::{Address, ContractEvent, PlayerRecord, RoundId, TransactionStatus, TxHash};

/// Chain id reported by a fresh mock (Base Sepolia).
pub const MOCK_CHAIN_ID: u64 = 84_532;

/// A write call as the mock received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    ApproveAndStart { player: Address, amount: TokenAmount },
    SubmitGuess { player: Address, guess: String },
    ClaimReward { player: Address, round: RoundId },
}

#[derive(Debug, Clone)]
enum Effect {
    Start { round: RoundId, amount: TokenAmount },
    Guess { round: RoundId, guess: String },
    Claim { round: RoundId },
}

#[derive(Debug)]
struct HeldTx {
    tx: TxHash,
    player: Address,
    effect: Effect,
}

#[derive(Debug)]
struct MockState {
    round: RoundId,
    chain_id: u64,
    block: u64,
    tx_counter: u64,
    players: HashMap<(RoundId, Address), PlayerRecord>,
    finalized: HashSet<RoundId>,
    winnings: HashMap<(RoundId, Address), TokenAmount>,
    targets: HashMap<RoundId, ProfileId>,
    statuses: HashMap<TxHash, TransactionStatus>,
    held: Vec<HeldTx>,
    hold_confirmations: bool,
    wallet_unanswered: bool,
    reject_next: Option<String>,
    read_failure: Option<String>,
    calls: Vec<RecordedCall>,
    reads: usize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            round: 1,
            chain_id: MOCK_CHAIN_ID,
            block: 1,
            tx_counter: 0,
            players: HashMap::new(),
            finalized: HashSet::new(),
            winnings: HashMap::new(),
            targets: HashMap::new(),
            statuses: HashMap::new(),
            held: Vec::new(),
            hold_confirmations: false,
            wallet_unanswered: false,
            reject_next: None,
            read_failure: None,
            calls: Vec::new(),
            reads: 0,
        }
    }
}

impl MockState {
    fn next_tx(&mut self) -> TxHash {
        self.tx_counter += 1;
        TxHash::from_bytes(self.tx_counter.to_be_bytes().to_vec())
    }

    fn read(&mut self) -> Result<(), ContractError> {
        self.reads += 1;
        match &self.read_failure {
            Some(reason) => Err(TransportError::NetworkError(reason.clone()).into()),
            None => Ok(()),
        }
    }

    /// Execute a mined transaction the way the contract would.
    fn apply(&mut self, player: Address, effect: Effect) -> Result<ContractEvent, String> {
        self.block += 1;
        let block = self.block;

        match effect {
            Effect::Start { round, amount } => {
                if amount.is_zero() {
                    return Err("deposit must be positive".into());
                }
                let target = self.targets.get(&round).copied().unwrap_or_default();
                let record = self.players.entry((round, player)).or_default();
                if record.status() != PlayerStatus::Empty {
                    return Err("game already started".into());
                }
                record.status_code = PlayerStatus::Active.code();
                record.assigned_target = target;
                record.deposit_amount = amount;
                record.start_time = block;
                Ok(ContractEvent::GameStarted {
                    round,
                    player,
                    assigned_target: target,
                })
            }
            Effect::Guess { round, guess } => {
                let record = self
                    .players
                    .get_mut(&(round, player))
                    .filter(|r| r.status().accepts_guesses())
                    .ok_or_else(|| "no active game".to_string())?;
                record.attempts += 1;
                if ProfileId::from_name(&guess) == record.assigned_target {
                    record.status_code = PlayerStatus::Completed.code();
                    record.final_score = u64::from(GameConfig::MAX_ATTEMPTS) + 1 - record.attempts;
                    record.end_time = block;
                } else if record.attempts >= u64::from(GameConfig::MAX_ATTEMPTS) {
                    record.status_code = PlayerStatus::Failed.code();
                    record.end_time = block;
                }
                Ok(ContractEvent::GuessSubmitted {
                    round,
                    player,
                    attempts: record.attempts,
                })
            }
            Effect::Claim { round } => {
                if !self.finalized.contains(&round) {
                    return Err("round not finalized".into());
                }
                let amount = self
                    .winnings
                    .remove(&(round, player))
                    .filter(|a| !a.is_zero())
                    .ok_or_else(|| "nothing to claim".to_string())?;
                Ok(ContractEvent::RewardClaimed {
                    round,
                    player,
                    amount,
                })
            }
        }
    }

    fn settle(&mut self, held: HeldTx) -> Option<ContractEvent> {
        match self.apply(held.player, held.effect) {
            Ok(event) => {
                let block = self.block;
                self.statuses
                    .insert(held.tx, TransactionStatus::Confirmed { block });
                Some(event)
            }
            Err(reason) => {
                self.statuses
                    .insert(held.tx, TransactionStatus::Failed { reason });
                None
            }
        }
    }
}

/// Mock game contract for testing without network.
///
/// Simulates the round contract in-memory. Transactions confirm immediately
/// unless confirmations are held, in which case they stay pending until
/// released.
#[derive(Clone)]
pub struct MockGameContract {
    state: Arc<Mutex<MockState>>,
    events: broadcast::Sender<ContractEvent>,
    confirmations: Arc<watch::Sender<u64>>,
    /// `true` while player record reads are held
    record_gate: Arc<watch::Sender<bool>>,
}

impl MockGameContract {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        let (confirmations, _) = watch::channel(0);
        let (record_gate, _) = watch::channel(false);
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            events,
            confirmations: Arc::new(confirmations),
            record_gate: Arc::new(record_gate),
        }
    }

    // ------------------------------------------------------------------------
    // Scenario setup
    // ------------------------------------------------------------------------

    pub fn set_round(&self, round: RoundId) {
        self.state.lock().unwrap().round = round;
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        self.state.lock().unwrap().chain_id = chain_id;
    }

    /// Target assigned to players who start `round`.
    pub fn set_target(&self, round: RoundId, target: ProfileId) {
        self.state.lock().unwrap().targets.insert(round, target);
    }

    pub fn set_player_record(&self, round: RoundId, player: Address, record: PlayerRecord) {
        self.state
            .lock()
            .unwrap()
            .players
            .insert((round, player), record);
    }

    /// Finalize `round`, credit `payouts` and broadcast `GameFinalized`.
    pub fn finalize(&self, round: RoundId, payouts: &[(Address, TokenAmount)]) {
        let prize_pool = {
            let mut state = self.state.lock().unwrap();
            state.finalized.insert(round);
            let mut pool = 0u128;
            for (player, amount) in payouts {
                state.winnings.insert((round, *player), *amount);
                pool += amount.units();
            }
            TokenAmount(pool)
        };
        self.emit(ContractEvent::GameFinalized {
            round,
            prize_pool,
            finalizer: Address::ZERO,
        });
    }

    /// Keep new transactions pending until released.
    pub fn hold_confirmations(&self, hold: bool) {
        self.state.lock().unwrap().hold_confirmations = hold;
    }

    /// The "wallet" records new write calls but never answers them.
    pub fn leave_wallet_unanswered(&self, unanswered: bool) {
        self.state.lock().unwrap().wallet_unanswered = unanswered;
    }

    /// Park `player_record` reads until released with `false`.
    pub fn hold_record_reads(&self, hold: bool) {
        self.record_gate.send_replace(hold);
    }

    /// The next write call is declined by the "wallet".
    pub fn reject_next(&self, reason: impl Into<String>) {
        self.state.lock().unwrap().reject_next = Some(reason.into());
    }

    /// Make every read fail with a network error (`None` restores reads).
    pub fn fail_reads(&self, reason: Option<&str>) {
        self.state.lock().unwrap().read_failure = reason.map(str::to_string);
    }

    /// Broadcast an arbitrary event to subscribers.
    pub fn emit(&self, event: ContractEvent) {
        let _ = self.events.send(event);
    }

    // ------------------------------------------------------------------------
    // Confirmation control
    // ------------------------------------------------------------------------

    /// Mine the oldest held transaction.
    pub fn release_next(&self) -> Option<TxHash> {
        let (tx, event) = {
            let mut state = self.state.lock().unwrap();
            if state.held.is_empty() {
                return None;
            }
            let held = state.held.remove(0);
            let tx = held.tx.clone();
            (tx, state.settle(held))
        };
        self.after_settle(event);
        Some(tx)
    }

    /// Mine every held transaction in submission order.
    pub fn release_all(&self) {
        while self.release_next().is_some() {}
    }

    /// Drop a held transaction as failed without executing it.
    pub fn fail_held(&self, tx: &TxHash, reason: impl Into<String>) {
        {
            let mut state = self.state.lock().unwrap();
            state.held.retain(|h| &h.tx != tx);
            state.statuses.insert(
                tx.clone(),
                TransactionStatus::Failed {
                    reason: reason.into(),
                },
            );
        }
        self.confirmations.send_modify(|n| *n += 1);
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn read_count(&self) -> usize {
        self.state.lock().unwrap().reads
    }

    pub fn record(&self, round: RoundId, player: Address) -> PlayerRecord {
        self.state
            .lock()
            .unwrap()
            .players
            .get(&(round, player))
            .cloned()
            .unwrap_or_default()
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().unwrap().held.len()
    }

    /// Hashes of held transactions in submission order.
    pub fn held(&self) -> Vec<TxHash> {
        self.state
            .lock()
            .unwrap()
            .held
            .iter()
            .map(|h| h.tx.clone())
            .collect()
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    async fn submit(
        &self,
        call: RecordedCall,
        player: Address,
        effect: Effect,
    ) -> Result<TxHash, ContractError> {
        let unanswered = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(call);
            state.wallet_unanswered
        };
        if unanswered {
            std::future::pending::<()>().await;
        }

        let (tx, event) = {
            let mut state = self.state.lock().unwrap();
            if let Some(reason) = state.reject_next.take() {
                return Err(ContractError::Rejected(reason));
            }

            let tx = state.next_tx();
            let held = HeldTx {
                tx: tx.clone(),
                player,
                effect,
            };
            if state.hold_confirmations {
                state.statuses.insert(tx.clone(), TransactionStatus::Pending);
                state.held.push(held);
                return Ok(tx);
            }
            let event = state.settle(held);
            (tx, event)
        };
        self.after_settle(event);
        Ok(tx)
    }

    fn after_settle(&self, event: Option<ContractEvent>) {
        self.confirmations.send_modify(|n| *n += 1);
        if let Some(event) = event {
            self.emit(event);
        }
    }
}

impl Default for MockGameContract {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoundReader for MockGameContract {
    async fn current_round(&self) -> Result<RoundId, ContractError> {
        let mut state = self.state.lock().unwrap();
        state.read()?;
        Ok(state.round)
    }

    async fn player_record(
        &self,
        round: RoundId,
        player: Address,
    ) -> Result<PlayerRecord, ContractError> {
        let mut gate = self.record_gate.subscribe();
        loop {
            let held = *gate.borrow_and_update();
            if !held || gate.changed().await.is_err() {
                break;
            }
        }

        let mut state = self.state.lock().unwrap();
        state.read()?;
        Ok(state
            .players
            .get(&(round, player))
            .cloned()
            .unwrap_or_default())
    }

    async fn is_finalized(&self, round: RoundId) -> Result<bool, ContractError> {
        let mut state = self.state.lock().unwrap();
        state.read()?;
        Ok(state.finalized.contains(&round))
    }

    async fn winnings(&self, round: RoundId, player: Address) -> Result<TokenAmount, ContractError> {
        let mut state = self.state.lock().unwrap();
        state.read()?;
        Ok(state
            .winnings
            .get(&(round, player))
            .copied()
            .unwrap_or_default())
    }

    async fn chain_id(&self) -> Result<u64, ContractError> {
        let mut state = self.state.lock().unwrap();
        state.read()?;
        Ok(state.chain_id)
    }
}

#[async_trait]
impl GameActions for MockGameContract {
    async fn approve_and_start(
        &self,
        player: Address,
        amount: TokenAmount,
    ) -> Result<TxHash, ContractError> {
        let round = self.state.lock().unwrap().round;
        self.submit(
            RecordedCall::ApproveAndStart { player, amount },
            player,
            Effect::Start { round, amount },
        )
        .await
    }

    async fn submit_guess(&self, player: Address, guess: &str) -> Result<TxHash, ContractError> {
        let round = self.state.lock().unwrap().round;
        self.submit(
            RecordedCall::SubmitGuess {
                player,
                guess: guess.to_string(),
            },
            player,
            Effect::Guess {
                round,
                guess: guess.to_string(),
            },
        )
        .await
    }

    async fn claim_reward(&self, player: Address, round: RoundId) -> Result<TxHash, ContractError> {
        self.submit(
            RecordedCall::ClaimReward { player, round },
            player,
            Effect::Claim { round },
        )
        .await
    }
}

#[async_trait]
impl ConfirmationWatcher for MockGameContract {
    async fn transaction_status(&self, tx: &TxHash) -> Result<TransactionStatus, ContractError> {
        let state = self.state.lock().unwrap();
        state
            .statuses
            .get(tx)
            .cloned()
            .ok_or_else(|| ContractError::Decode(format!("unknown transaction {}", tx)))
    }

    async fn wait_for_confirmation(&self, tx: &TxHash) -> Result<TransactionStatus, ContractError> {
        let mut changes = self.confirmations.subscribe();
        loop {
            let status = self.transaction_status(tx).await?;
            if !status.is_pending() {
                return Ok(status);
            }
            if changes.changed().await.is_err() {
                return Ok(status);
            }
        }
    }
}

impl EventSource for MockGameContract {
    fn subscribe_events(&self) -> broadcast::Receiver<ContractEvent> {
        self.events.subscribe()
    }
}

impl GameContract for MockGameContract {
    fn name(&self) -> &str {
        "Mock"
    }

    fn network(&self) -> &str {
        "mock-network"
    }
}
