//! Game session controller.
//!
//! One controller drives the session of one connected player: it validates
//! commands, submits them through a [`GameContract`], layers pending deltas
//! over the last authoritative read, and publishes the merged
//! [`SessionView`] through a `watch` channel.
//!
//! The mutable session sits behind a `std::sync::Mutex` that is never held
//! across an `.await`. Fetches are sequenced with a generation counter and
//! every session re-creation bumps an epoch, so late completions from an
//! earlier account or fetch never overwrite newer state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use client_blockchain_core::{
    Address, ContractError, ContractEvent, GameContract, PlayerRecord, RoundId,
    TransactionStatus, TxHash,
};
use game_content::Catalog;
use game_core::{GameConfig, PlayerStatus, Profile, TokenAmount, generate_hints};

use crate::api::{CommandOutcome, Result, ResumeReport, SessionError, ValidationError};
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, Notice, Topic, TransactionEvent, TxAction, TxStage};
use crate::state::{
    BlockingCondition, GuessLog, GuessPhase, GuessRecord, Merged, OptimisticLayer, PendingKind,
    PendingOp, SessionView, Snapshot, Ticket,
};
use crate::workers::EventListener;

/// How [`SessionController::handle_event`] dealt with a contract event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRoute {
    /// Another player, or an older round
    Ignored,
    /// Full refetch for this player
    Reconciled,
    /// Finalization flag and winnings only
    FinalizationRefreshed,
    /// Newer round announced; refetched to pick it up
    RoundChecked,
}

impl From<BlockingCondition> for SessionError {
    fn from(condition: BlockingCondition) -> Self {
        match condition {
            BlockingCondition::WrongNetwork { expected, actual } => {
                SessionError::WrongNetwork { expected, actual }
            }
            BlockingCondition::WalletDisconnected => SessionError::WalletDisconnected,
        }
    }
}

// ============================================================================
// Session state
// ============================================================================

#[derive(Debug, Clone)]
struct StalledTx {
    tx: TxHash,
    ticket: Ticket,
    action: TxAction,
}

struct Inner {
    epoch: u64,
    account: Option<Address>,
    snapshot: Snapshot,
    optimistic: OptimisticLayer,
    guesses: GuessLog,
    next_ticket: Ticket,

    starting: bool,
    claiming: bool,
    /// Guesses sent to the wallet but not yet accepted
    submitting_guesses: u32,
    loading: u32,

    error: Option<String>,
    stalled: Vec<StalledTx>,
    blocking: Option<BlockingCondition>,

    next_generation: u64,
    /// Newest full fetch applied
    applied_generation: u64,
    /// Newest fetch whose finalization flag and winnings were applied
    applied_finalization: u64,
}

impl Inner {
    fn new(epoch: u64, account: Option<Address>, blocking: Option<BlockingCondition>) -> Self {
        Self {
            epoch,
            account,
            snapshot: Snapshot::default(),
            optimistic: OptimisticLayer::new(),
            guesses: GuessLog::new(),
            next_ticket: 0,
            starting: false,
            claiming: false,
            submitting_guesses: 0,
            loading: 0,
            error: None,
            stalled: Vec::new(),
            blocking,
            next_generation: 0,
            applied_generation: 0,
            applied_finalization: 0,
        }
    }

    fn next_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn merged(&self) -> Merged {
        self.optimistic.merge(&self.snapshot)
    }

    /// Wallet connected and nothing blocking.
    fn ready_account(&self) -> Result<Address> {
        if let Some(condition) = self.blocking {
            return Err(condition.into());
        }
        self.account.ok_or(SessionError::WalletDisconnected)
    }

    /// Start a command: clears the last error and raises the loading flag.
    fn begin(&mut self) {
        self.loading += 1;
        self.error = None;
    }
}

struct Shared {
    contract: Arc<dyn GameContract>,
    catalog: Arc<Catalog>,
    config: RuntimeConfig,
    expected_chain_id: u64,
    inner: Mutex<Inner>,
    view: watch::Sender<SessionView>,
    bus: EventBus,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn target_profile(&self, inner: &Inner) -> Option<&Profile> {
        inner
            .snapshot
            .record
            .assigned_target()
            .and_then(|id| self.catalog.get(&id))
    }

    /// Align the guess log with merged state and publish the view if it
    /// differs from the last one.
    fn publish(&self, inner: &mut Inner) {
        let merged = inner.merged();
        let target = self.target_profile(inner);
        inner.guesses.align(merged.attempts, target);

        let view = SessionView {
            account: inner.account,
            game_id: inner.snapshot.round,
            player_status: merged.status,
            attempts: merged.attempts,
            assigned_target: inner.snapshot.record.assigned_target(),
            is_finalized: inner.snapshot.is_finalized,
            winnings: merged.winnings,
            guesses: inner.guesses.records(),
            is_loading: inner.loading > 0,
            error: inner.error.clone(),
            stalled: inner.stalled.iter().map(|s| s.tx.clone()).collect(),
            blocking: inner.blocking,
        };

        self.view.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }

    fn notify(&self, notice: Notice) {
        self.bus.notify(notice);
    }

    fn tx_event(&self, action: TxAction, tx: &TxHash, stage: TxStage) {
        self.bus.publish(Event::Transaction(TransactionEvent {
            action,
            tx: tx.clone(),
            stage,
        }));
    }

    fn decimals(&self) -> u8 {
        self.config.game_config.token_decimals
    }
}

// ============================================================================
// Command guard
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Slot {
    Start,
    Claim,
    Guess,
}

impl Slot {
    fn release(self, inner: &mut Inner) {
        match self {
            Slot::Start => inner.starting = false,
            Slot::Claim => inner.claiming = false,
            Slot::Guess => inner.submitting_guesses = inner.submitting_guesses.saturating_sub(1),
        }
    }
}

/// Releases a command's busy slot and loading flag on every exit path.
struct CommandGuard<'a> {
    shared: &'a Shared,
    epoch: u64,
    slot: Option<Slot>,
}

impl<'a> CommandGuard<'a> {
    fn new(shared: &'a Shared, epoch: u64, slot: Slot) -> Self {
        Self {
            shared,
            epoch,
            slot: Some(slot),
        }
    }

    fn release_slot(&mut self, inner: &mut Inner) {
        if let Some(slot) = self.slot.take()
            && inner.epoch == self.epoch
        {
            slot.release(inner);
        }
    }
}

impl Drop for CommandGuard<'_> {
    fn drop(&mut self) {
        let mut guard = self.shared.lock();
        let inner = &mut *guard;
        if inner.epoch != self.epoch {
            return;
        }
        if let Some(slot) = self.slot.take() {
            slot.release(inner);
        }
        inner.loading = inner.loading.saturating_sub(1);
        self.shared.publish(inner);
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Cloneable handle to one player's game session.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
}

impl SessionController {
    /// Create a controller with no wallet connected.
    ///
    /// `expected_chain_id` is the network the contract lives on; commands are
    /// refused while [`Self::check_network`] reports another chain.
    pub fn new(
        contract: Arc<dyn GameContract>,
        catalog: Arc<Catalog>,
        config: RuntimeConfig,
        expected_chain_id: u64,
    ) -> Self {
        let inner = Inner::new(0, None, Some(BlockingCondition::WalletDisconnected));
        let (view, _) = watch::channel(SessionView {
            blocking: inner.blocking,
            ..SessionView::default()
        });
        let bus = EventBus::with_capacity(config.notice_capacity);

        Self {
            shared: Arc::new(Shared {
                contract,
                catalog,
                config,
                expected_chain_id,
                inner: Mutex::new(inner),
                view,
                bus,
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------------

    /// Current merged view.
    pub fn view(&self) -> SessionView {
        self.shared.view.borrow().clone()
    }

    /// Receiver notified on every change of the merged view.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.shared.view.subscribe()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe(Topic::Notice)
    }

    pub fn subscribe_transactions(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe(Topic::Transaction)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.shared.bus
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.shared.catalog
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.shared.config
    }

    pub fn expected_chain_id(&self) -> u64 {
        self.shared.expected_chain_id
    }

    /// Subscribe to the contract's event stream.
    pub fn contract_events(&self) -> broadcast::Receiver<ContractEvent> {
        self.shared.contract.subscribe_events()
    }

    /// Route contract events from `events` into this session on a tokio task.
    pub fn spawn_event_listener(&self, events: broadcast::Receiver<ContractEvent>) -> JoinHandle<()> {
        EventListener::new(self.clone(), events).spawn()
    }

    // ------------------------------------------------------------------------
    // Wallet and network
    // ------------------------------------------------------------------------

    /// Replace the connected account. The session is re-created from scratch
    /// and, when an account is given, reconciled against the contract.
    pub async fn set_account(&self, account: Option<Address>) -> Result<()> {
        {
            let mut guard = self.shared.lock();
            let wrong_network = guard
                .blocking
                .filter(|condition| matches!(condition, BlockingCondition::WrongNetwork { .. }));
            let blocking = wrong_network
                .or_else(|| account.is_none().then_some(BlockingCondition::WalletDisconnected));
            let epoch = guard.epoch + 1;
            *guard = Inner::new(epoch, account, blocking);
            self.shared.publish(&mut guard);
        }

        match account {
            Some(account) => {
                info!(%account, "account connected");
                self.reconcile().await
            }
            None => {
                info!("wallet disconnected");
                self.shared
                    .notify(Notice::warning("Wallet disconnected. Connect to play."));
                Ok(())
            }
        }
    }

    /// Compare the provider's chain with the expected one and set or clear
    /// the wrong-network block.
    pub async fn check_network(&self) -> Result<()> {
        let actual = match self.shared.contract.chain_id().await {
            Ok(chain_id) => chain_id,
            Err(error) => {
                let error = SessionError::from(error);
                warn!(%error, "chain id lookup failed");
                return Err(error);
            }
        };
        let expected = self.shared.expected_chain_id;

        let changed = {
            let mut guard = self.shared.lock();
            let inner = &mut *guard;
            let before = inner.blocking;
            if actual != expected {
                inner.blocking = Some(BlockingCondition::WrongNetwork { expected, actual });
            } else if matches!(inner.blocking, Some(BlockingCondition::WrongNetwork { .. })) {
                inner.blocking = inner
                    .account
                    .is_none()
                    .then_some(BlockingCondition::WalletDisconnected);
            }
            self.shared.publish(inner);
            before != inner.blocking
        };

        if actual != expected {
            if changed {
                warn!(expected, actual, "wallet is on the wrong network");
                self.shared.notify(Notice::error(format!(
                    "Wrong network: switch to chain {expected} (currently {actual})"
                )));
            }
            return Err(SessionError::WrongNetwork { expected, actual });
        }

        if changed {
            info!(chain_id = actual, "network restored");
            self.shared.notify(Notice::success("Connected to the right network"));
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Approve `amount_text` of the stake token and start the current round.
    ///
    /// Every local check runs before any network call. When `first_guess` is
    /// given and the start confirms into an active game, the guess follows.
    pub async fn start_game(
        &self,
        amount_text: &str,
        first_guess: Option<&str>,
    ) -> Result<CommandOutcome> {
        let prepared = {
            let mut guard = self.shared.lock();
            let inner = &mut *guard;
            match self.check_start(inner, amount_text) {
                Ok((account, amount)) => {
                    inner.starting = true;
                    inner.begin();
                    self.shared.publish(inner);
                    Ok((account, amount, inner.epoch))
                }
                Err(error) => Err((error, inner.epoch)),
            }
        };
        let (account, amount, epoch) = match prepared {
            Ok(ready) => ready,
            Err((error, epoch)) => return Err(self.fail(TxAction::Start, epoch, None, error)),
        };
        let in_flight = CommandGuard::new(&self.shared, epoch, Slot::Start);

        info!(%account, amount = %amount, "starting game");
        self.shared.notify(Notice::progress(format!(
            "Approving {} {} and starting the game...",
            amount.format_units(self.shared.decimals()),
            GameConfig::TOKEN_SYMBOL
        )));

        let submitted = timeout(
            self.shared.config.confirmation_timeout,
            self.shared.contract.approve_and_start(account, amount),
        )
        .await;
        let tx = match submitted {
            Ok(Ok(tx)) => tx,
            Ok(Err(error)) => return Err(self.fail(TxAction::Start, epoch, None, error.into())),
            Err(_) => {
                let error = ContractError::TimedOut("the wallet to submit the start".to_string());
                return Err(self.fail(TxAction::Start, epoch, None, error.into()));
            }
        };

        let ticket = {
            let mut guard = self.shared.lock();
            let inner = &mut *guard;
            (inner.epoch == epoch).then(|| {
                let ticket = inner.next_ticket();
                inner.optimistic.push(PendingOp {
                    ticket,
                    tx: tx.clone(),
                    kind: PendingKind::Start,
                });
                inner.guesses.clear();
                self.shared.publish(inner);
                ticket
            })
        };
        let Some(ticket) = ticket else {
            return Ok(self.detached(TxAction::Start, tx));
        };
        self.shared.tx_event(TxAction::Start, &tx, TxStage::Submitted);

        let outcome = self.confirm(TxAction::Start, epoch, ticket, tx).await?;
        drop(in_flight);

        if let Some(name) = first_guess.map(str::trim).filter(|name| !name.is_empty()) {
            if outcome.is_confirmed() && self.view().player_status == PlayerStatus::Active {
                if let Err(error) = self.submit_guess(name).await {
                    warn!(%error, "first guess after start failed");
                }
            } else {
                info!(guess = name, "first guess held back: game is not active yet");
                self.shared.notify(Notice::warning(format!(
                    "Your guess \"{name}\" was not sent. Submit it again once the game is active."
                )));
            }
        }

        Ok(outcome)
    }

    /// Submit a guess by profile name.
    ///
    /// Returns [`CommandOutcome::Ignored`] without touching the network or
    /// the session unless the game is active with attempts left.
    pub async fn submit_guess(&self, name: &str) -> Result<CommandOutcome> {
        let name = name.trim();
        let prepared = {
            let mut guard = self.shared.lock();
            let inner = &mut *guard;
            match Self::check_guess(inner, name) {
                Ok(Some(account)) => {
                    inner.submitting_guesses += 1;
                    inner.begin();
                    self.shared.publish(inner);
                    Ok(Some((account, inner.epoch)))
                }
                Ok(None) => Ok(None),
                Err(error) => Err((error, inner.epoch)),
            }
        };
        let (account, epoch) = match prepared {
            Ok(Some(ready)) => ready,
            Ok(None) => {
                debug!(guess = name, "guess ignored: game is not accepting guesses");
                self.shared
                    .notify(Notice::info("No guesses can be submitted right now"));
                return Ok(CommandOutcome::Ignored);
            }
            Err((error, epoch)) => return Err(self.fail(TxAction::Guess, epoch, None, error)),
        };
        let mut in_flight = CommandGuard::new(&self.shared, epoch, Slot::Guess);

        let guess = self.shared.catalog.resolve_guess(name);
        info!(guess = %guess.name, known = !guess.is_raw_guess(), "submitting guess");
        self.shared
            .notify(Notice::progress(format!("Submitting guess: {}...", guess.name)));

        let tx = match self.shared.contract.submit_guess(account, &guess.name).await {
            Ok(tx) => tx,
            Err(error) => return Err(self.fail(TxAction::Guess, epoch, None, error.into())),
        };

        let ticket = {
            let mut guard = self.shared.lock();
            let inner = &mut *guard;
            if inner.epoch == epoch {
                in_flight.release_slot(inner);
                let ticket = inner.next_ticket();
                let attempt = (inner.merged().attempts + 1).min(GameConfig::MAX_ATTEMPTS);
                let hints = self
                    .shared
                    .target_profile(inner)
                    .map(|target| generate_hints(&guess, target));

                inner.optimistic.push(PendingOp {
                    ticket,
                    tx: tx.clone(),
                    kind: PendingKind::Guess { attempt },
                });
                let record = GuessRecord {
                    attempt,
                    guess,
                    hints,
                    phase: GuessPhase::Pending,
                };
                if !inner.guesses.push(ticket, record) {
                    warn!(attempt, "guess log full; record dropped");
                }
                self.shared.publish(inner);
                Some(ticket)
            } else {
                None
            }
        };
        let Some(ticket) = ticket else {
            return Ok(self.detached(TxAction::Guess, tx));
        };
        self.shared.tx_event(TxAction::Guess, &tx, TxStage::Submitted);

        self.confirm(TxAction::Guess, epoch, ticket, tx).await
    }

    /// Claim the connected player's winnings for the current round.
    ///
    /// Requires the round to be finalized. Zero winnings are not blocked
    /// locally; the contract decides.
    pub async fn claim_reward(&self) -> Result<CommandOutcome> {
        let prepared = {
            let mut guard = self.shared.lock();
            let inner = &mut *guard;
            match Self::check_claim(inner) {
                Ok((account, round)) => {
                    inner.claiming = true;
                    inner.begin();
                    self.shared.publish(inner);
                    Ok((account, round, inner.epoch))
                }
                Err(error) => Err((error, inner.epoch)),
            }
        };
        let (account, round, epoch) = match prepared {
            Ok(ready) => ready,
            Err((error, epoch)) => return Err(self.fail(TxAction::Claim, epoch, None, error)),
        };
        let _in_flight = CommandGuard::new(&self.shared, epoch, Slot::Claim);

        info!(%account, round, "claiming reward");
        self.shared.notify(Notice::progress("Claiming reward..."));

        let tx = match self.shared.contract.claim_reward(account, round).await {
            Ok(tx) => tx,
            Err(error) => return Err(self.fail(TxAction::Claim, epoch, None, error.into())),
        };

        let ticket = {
            let mut guard = self.shared.lock();
            let inner = &mut *guard;
            (inner.epoch == epoch).then(|| {
                let ticket = inner.next_ticket();
                inner.optimistic.push(PendingOp {
                    ticket,
                    tx: tx.clone(),
                    kind: PendingKind::Claim,
                });
                self.shared.publish(inner);
                ticket
            })
        };
        let Some(ticket) = ticket else {
            return Ok(self.detached(TxAction::Claim, tx));
        };
        self.shared.tx_event(TxAction::Claim, &tx, TxStage::Submitted);

        self.confirm(TxAction::Claim, epoch, ticket, tx).await
    }

    /// Query every stalled transaction once and settle the ones that left
    /// the pending state.
    pub async fn resume_pending(&self) -> ResumeReport {
        let (stalled, epoch) = {
            let inner = self.shared.lock();
            (inner.stalled.clone(), inner.epoch)
        };

        let mut report = ResumeReport::default();
        for entry in stalled {
            match self.shared.contract.transaction_status(&entry.tx).await {
                Ok(TransactionStatus::Confirmed { block }) => {
                    debug!(tx = %entry.tx, block, "stalled transaction confirmed");
                    self.settle(entry.action, epoch, entry.ticket, &entry.tx).await;
                    report.confirmed.push(entry.tx);
                }
                Ok(TransactionStatus::Failed { reason }) => {
                    self.shared.tx_event(
                        entry.action,
                        &entry.tx,
                        TxStage::Failed {
                            reason: reason.clone(),
                        },
                    );
                    self.fail(
                        entry.action,
                        epoch,
                        Some(entry.ticket),
                        ContractError::Reverted(reason).into(),
                    );
                    report.failed.push(entry.tx);
                }
                Ok(TransactionStatus::Pending) => report.pending.push(entry.tx),
                Err(error) => {
                    warn!(tx = %entry.tx, %error, "status check for stalled transaction failed");
                    report.pending.push(entry.tx);
                }
            }
        }

        report
    }

    // ------------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------------

    /// Refetch canonical state and fold it into the session.
    ///
    /// A round change resets the session. Deltas the new snapshot reflects
    /// are absorbed; an unchanged upstream publishes nothing.
    pub async fn reconcile(&self) -> Result<()> {
        let (generation, epoch, account) = {
            let mut inner = self.shared.lock();
            (inner.next_generation(), inner.epoch, inner.account)
        };

        let fetched = self.fetch(account).await;

        let mut guard = self.shared.lock();
        let inner = &mut *guard;
        if inner.epoch != epoch || generation <= inner.applied_generation {
            debug!(generation, "discarding stale fetch");
            return Ok(());
        }

        let mut snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(error) => {
                let error = SessionError::from(error);
                inner.error = Some(error.to_string());
                self.shared.publish(inner);
                drop(guard);
                warn!(%error, "session refresh failed");
                self.shared
                    .notify(Notice::error(format!("Could not refresh game state: {error}")));
                return Err(error);
            }
        };

        inner.applied_generation = generation;
        let new_round = inner.snapshot.round.is_some() && inner.snapshot.round != snapshot.round;
        if new_round {
            info!(from = ?inner.snapshot.round, to = ?snapshot.round, "new round; resetting session");
            inner.optimistic.clear();
            inner.guesses.clear();
            inner.stalled.clear();
            inner.error = None;
        }

        // A finalization refresh issued after this fetch already holds newer values.
        if !new_round && generation < inner.applied_finalization {
            debug!(generation, "keeping newer finalization state");
            snapshot.is_finalized = inner.snapshot.is_finalized;
            snapshot.winnings = inner.snapshot.winnings;
        } else {
            inner.applied_finalization = generation;
        }
        inner.snapshot = snapshot;
        for ticket in inner.optimistic.absorb(&inner.snapshot) {
            inner.guesses.confirm(ticket);
            inner.stalled.retain(|s| s.ticket != ticket);
        }
        self.shared.publish(inner);
        let round = inner.snapshot.round;
        drop(guard);

        if new_round && let Some(round) = round {
            self.shared
                .notify(Notice::info(format!("Round #{round} has started")));
        }
        Ok(())
    }

    /// Refetch only the finalization flag and winnings of the current round.
    pub async fn refresh_finalization(&self) -> Result<()> {
        let (generation, epoch, account, round) = {
            let mut inner = self.shared.lock();
            (
                inner.next_generation(),
                inner.epoch,
                inner.account,
                inner.snapshot.round,
            )
        };
        let Some(round) = round else {
            return self.reconcile().await;
        };

        let fetched = tokio::try_join!(
            self.shared.contract.is_finalized(round),
            self.fetch_winnings(round, account),
        );

        let (is_finalized, winnings) = match fetched {
            Ok(values) => values,
            Err(error) => {
                let error = SessionError::from(error);
                warn!(round, %error, "finalization refresh failed");
                return Err(error);
            }
        };

        let newly_finalized = {
            let mut guard = self.shared.lock();
            let inner = &mut *guard;
            if inner.epoch != epoch
                || generation <= inner.applied_finalization
                || inner.snapshot.round != Some(round)
            {
                debug!(generation, "discarding stale finalization refresh");
                return Ok(());
            }
            inner.applied_finalization = generation;
            let newly_finalized = is_finalized && !inner.snapshot.is_finalized;
            inner.snapshot.is_finalized = is_finalized;
            inner.snapshot.winnings = winnings;
            inner.optimistic.absorb(&inner.snapshot);
            self.shared.publish(inner);
            newly_finalized
        };

        if newly_finalized {
            info!(round, winnings = %winnings, "round finalized");
            let text = if winnings.is_zero() {
                format!("Round #{round} has been finalized")
            } else {
                format!(
                    "Round #{round} has been finalized. You won {} {}!",
                    winnings.format_units(self.shared.decimals()),
                    GameConfig::TOKEN_SYMBOL
                )
            };
            self.shared.notify(Notice::success(text));
        }
        Ok(())
    }

    /// Route a contract event into the session.
    pub async fn handle_event(&self, event: &ContractEvent) -> EventRoute {
        let (account, current) = {
            let inner = self.shared.lock();
            (inner.account, inner.snapshot.round)
        };

        let round = event.round();
        let route = match current {
            Some(current) if round == current => match event.player() {
                None => EventRoute::FinalizationRefreshed,
                Some(player) if Some(player) == account => EventRoute::Reconciled,
                Some(_) => EventRoute::Ignored,
            },
            Some(current) if round < current => EventRoute::Ignored,
            _ => EventRoute::RoundChecked,
        };
        debug!(event = event.name(), round, ?route, "routing contract event");

        let refreshed = match route {
            EventRoute::Ignored => Ok(()),
            EventRoute::Reconciled | EventRoute::RoundChecked => self.reconcile().await,
            EventRoute::FinalizationRefreshed => self.refresh_finalization().await,
        };
        if let Err(error) = refreshed {
            warn!(event = event.name(), %error, "event-triggered refresh failed");
        }

        route
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn check_start(&self, inner: &Inner, amount_text: &str) -> Result<(Address, TokenAmount)> {
        let account = inner.ready_account()?;
        if inner.snapshot.round.is_none() {
            return Err(ValidationError::RoundNotLoaded.into());
        }
        if inner.merged().status != PlayerStatus::Empty {
            return Err(ValidationError::GameAlreadyStarted.into());
        }
        if inner.starting {
            return Err(SessionError::CommandInFlight("start"));
        }
        let amount = TokenAmount::parse_stake(amount_text, self.shared.decimals())
            .map_err(ValidationError::from)?;
        Ok((account, amount))
    }

    /// `Ok(None)` when the game does not take guesses right now. That check
    /// comes first so an inactive session is never touched.
    fn check_guess(inner: &Inner, name: &str) -> Result<Option<Address>> {
        let merged = inner.merged();
        if !merged.status.accepts_guesses()
            || merged.attempts + inner.submitting_guesses >= GameConfig::MAX_ATTEMPTS
        {
            return Ok(None);
        }
        let account = inner.ready_account()?;
        if name.is_empty() {
            return Err(ValidationError::MissingSelection.into());
        }
        Ok(Some(account))
    }

    fn check_claim(inner: &Inner) -> Result<(Address, RoundId)> {
        let account = inner.ready_account()?;
        let round = inner.snapshot.round.ok_or(ValidationError::RoundNotLoaded)?;
        if !inner.snapshot.is_finalized {
            return Err(ValidationError::NotFinalized.into());
        }
        if inner.claiming {
            return Err(SessionError::CommandInFlight("claim"));
        }
        Ok((account, round))
    }

    async fn fetch(&self, account: Option<Address>) -> std::result::Result<Snapshot, ContractError> {
        let contract = &self.shared.contract;
        let round = contract.current_round().await?;
        let (is_finalized, record, winnings) = tokio::try_join!(
            contract.is_finalized(round),
            self.fetch_record(round, account),
            self.fetch_winnings(round, account),
        )?;

        debug!(
            round,
            status = %record.status(),
            attempts = record.attempts,
            is_finalized,
            "fetched session state"
        );
        Ok(Snapshot {
            round: Some(round),
            record,
            is_finalized,
            winnings,
        })
    }

    async fn fetch_record(
        &self,
        round: RoundId,
        account: Option<Address>,
    ) -> std::result::Result<PlayerRecord, ContractError> {
        match account {
            Some(player) => self.shared.contract.player_record(round, player).await,
            None => Ok(PlayerRecord::default()),
        }
    }

    async fn fetch_winnings(
        &self,
        round: RoundId,
        account: Option<Address>,
    ) -> std::result::Result<TokenAmount, ContractError> {
        match account {
            Some(player) => self.shared.contract.winnings(round, player).await,
            None => Ok(TokenAmount::ZERO),
        }
    }

    /// Bounded confirmation wait for an accepted transaction.
    async fn confirm(
        &self,
        action: TxAction,
        epoch: u64,
        ticket: Ticket,
        tx: TxHash,
    ) -> Result<CommandOutcome> {
        let waited = timeout(
            self.shared.config.confirmation_timeout,
            self.shared.contract.wait_for_confirmation(&tx),
        )
        .await;

        match waited {
            Ok(Ok(TransactionStatus::Confirmed { block })) => {
                debug!(action = action.label(), %tx, block, "transaction confirmed");
                self.settle(action, epoch, ticket, &tx).await;
                Ok(CommandOutcome::Confirmed(tx))
            }
            Ok(Ok(TransactionStatus::Failed { reason })) => {
                self.shared.tx_event(
                    action,
                    &tx,
                    TxStage::Failed {
                        reason: reason.clone(),
                    },
                );
                Err(self.fail(action, epoch, Some(ticket), ContractError::Reverted(reason).into()))
            }
            Ok(Err(error)) => {
                self.shared.tx_event(
                    action,
                    &tx,
                    TxStage::Failed {
                        reason: error.to_string(),
                    },
                );
                Err(self.fail(action, epoch, Some(ticket), error.into()))
            }
            Ok(Ok(TransactionStatus::Pending)) | Err(_) => Ok(self.stall(action, epoch, ticket, tx)),
        }
    }

    /// Finish a confirmed transaction: mark it, reconcile, report.
    async fn settle(&self, action: TxAction, epoch: u64, ticket: Ticket, tx: &TxHash) {
        {
            let mut guard = self.shared.lock();
            let inner = &mut *guard;
            if inner.epoch == epoch {
                inner.guesses.confirm(ticket);
                inner.stalled.retain(|s| s.ticket != ticket);
                self.shared.publish(inner);
            }
        }
        self.shared.tx_event(action, tx, TxStage::Confirmed);

        let reconciled = self.reconcile().await.is_ok();

        let view = {
            let mut guard = self.shared.lock();
            let inner = &mut *guard;
            if inner.epoch == epoch && reconciled && action == TxAction::Claim {
                inner.optimistic.retire(ticket);
                self.shared.publish(inner);
            }
            drop(guard);
            self.view()
        };

        info!(action = action.label(), %tx, "transaction settled");
        let text = match action {
            TxAction::Start => "Game started. Good luck!".to_string(),
            TxAction::Guess => match view.player_status {
                PlayerStatus::Completed => "Correct! You found today's Cypher.".to_string(),
                PlayerStatus::Failed => "Out of attempts for this round.".to_string(),
                _ => format!(
                    "Guess confirmed. {} attempts left.",
                    view.remaining_attempts()
                ),
            },
            TxAction::Claim => "Reward claimed.".to_string(),
        };
        self.shared.notify(Notice::success(text));
    }

    /// Leave a timed-out transaction pending and mark it stalled.
    fn stall(&self, action: TxAction, epoch: u64, ticket: Ticket, tx: TxHash) -> CommandOutcome {
        warn!(
            action = action.label(),
            %tx,
            timeout = ?self.shared.config.confirmation_timeout,
            "confirmation wait timed out"
        );
        {
            let mut guard = self.shared.lock();
            let inner = &mut *guard;
            if inner.epoch == epoch && !inner.stalled.iter().any(|s| s.ticket == ticket) {
                inner.stalled.push(StalledTx {
                    tx: tx.clone(),
                    ticket,
                    action,
                });
                self.shared.publish(inner);
            }
        }
        self.shared.tx_event(action, &tx, TxStage::Stalled);
        self.shared.notify(Notice::warning(format!(
            "Transaction {tx} is still pending. It will be picked up on the next refresh."
        )));
        CommandOutcome::StillPending(tx)
    }

    /// Fail a command: roll back its delta (if any), record the error and
    /// publish an error notice.
    fn fail(
        &self,
        action: TxAction,
        epoch: u64,
        ticket: Option<Ticket>,
        error: SessionError,
    ) -> SessionError {
        {
            let mut guard = self.shared.lock();
            let inner = &mut *guard;
            if inner.epoch == epoch {
                if let Some(ticket) = ticket {
                    inner.optimistic.remove(ticket);
                    inner.guesses.remove(ticket);
                    inner.stalled.retain(|s| s.ticket != ticket);
                }
                inner.error = Some(error.to_string());
                self.shared.publish(inner);
            }
        }

        if error.is_local() {
            warn!(action = action.label(), %error, "command refused");
        } else {
            warn!(action = action.label(), %error, rolled_back = ticket.is_some(), "command failed");
        }
        self.shared
            .notify(Notice::error(format!("Could not {}: {error}", action.label())));
        error
    }

    /// The session was replaced while the wallet had the request.
    fn detached(&self, action: TxAction, tx: TxHash) -> CommandOutcome {
        warn!(action = action.label(), %tx, "session changed during submission; not tracking");
        self.shared.tx_event(action, &tx, TxStage::Submitted);
        CommandOutcome::StillPending(tx)
    }
}
