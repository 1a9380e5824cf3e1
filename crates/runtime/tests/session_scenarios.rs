use std::sync::Arc;
use std::time::Duration;

use client_blockchain_core::{
    Address, ContractError, ContractEvent, GameActions, GameContract, MOCK_CHAIN_ID,
    MockGameContract, PlayerRecord, RecordedCall,
};
use game_content::Catalog;
use game_core::{GameConfig, PlayerStatus, ProfileId, TokenAmount};
use runtime::{
    BlockingCondition, CommandOutcome, Event, EventRoute, GuessPhase, NoticeLevel, RuntimeConfig,
    SessionController, SessionError, ValidationError,
};

fn player() -> Address {
    Address([0xAB; 20])
}

fn other_player() -> Address {
    Address([0xCD; 20])
}

async fn session_with(config: RuntimeConfig) -> (MockGameContract, SessionController) {
    let contract = MockGameContract::new();
    contract.set_target(1, ProfileId::from_name("Jesse Pollak"));

    let shared: Arc<dyn GameContract> = Arc::new(contract.clone());
    let catalog = Arc::new(Catalog::embedded().expect("embedded catalog should load"));
    let controller = SessionController::new(shared, catalog, config, MOCK_CHAIN_ID);
    controller
        .set_account(Some(player()))
        .await
        .expect("initial reconcile should succeed");

    (contract, controller)
}

async fn session() -> (MockGameContract, SessionController) {
    session_with(RuntimeConfig::default()).await
}

/// End-to-end round: stake, guess, win, finalize, claim.
#[tokio::test]
async fn test_complete_round_scenario() {
    let (contract, controller) = session().await;

    // ================================================================
    // PHASE 1: Start with a first guess
    // ================================================================
    let outcome = controller
        .start_game("10", Some("Vitalik Buterin"))
        .await
        .expect("start should succeed");
    assert!(outcome.is_confirmed());

    let calls = contract.calls();
    assert_eq!(
        calls[0],
        RecordedCall::ApproveAndStart {
            player: player(),
            amount: TokenAmount(10_000_000),
        }
    );
    assert_eq!(
        calls[1],
        RecordedCall::SubmitGuess {
            player: player(),
            guess: "Vitalik Buterin".into(),
        }
    );

    let view = controller.view();
    assert_eq!(view.game_id, Some(1));
    assert_eq!(view.player_status, PlayerStatus::Active);
    assert_eq!(view.attempts, 1);
    assert_eq!(view.guesses.len(), 1);
    assert_eq!(view.guesses[0].phase, GuessPhase::Confirmed);
    assert!(view.guesses[0].hints.is_some());
    assert!(!view.guesses[0].is_solved());
    assert_eq!(view.assigned_target, Some(ProfileId::from_name("Jesse Pollak")));
    assert!(!view.is_loading);

    // ================================================================
    // PHASE 2: Solve it; later guesses are no-ops
    // ================================================================
    let outcome = controller
        .submit_guess("jesse pollak")
        .await
        .expect("guess should succeed");
    assert!(outcome.is_confirmed());

    let view = controller.view();
    assert_eq!(view.player_status, PlayerStatus::Completed);
    assert_eq!(view.attempts, 2);
    assert!(view.guesses[1].is_solved());
    assert!(!view.can_guess());

    let before = contract.calls().len();
    let outcome = controller.submit_guess("Brian Armstrong").await.unwrap();
    assert_eq!(outcome, CommandOutcome::Ignored);
    assert_eq!(contract.calls().len(), before);

    // ================================================================
    // PHASE 3: Finalization and claim
    // ================================================================
    contract.finalize(1, &[(player(), TokenAmount(25_000_000))]);
    let route = controller
        .handle_event(&ContractEvent::GameFinalized {
            round: 1,
            prize_pool: TokenAmount(25_000_000),
            finalizer: Address::ZERO,
        })
        .await;
    assert_eq!(route, EventRoute::FinalizationRefreshed);

    let view = controller.view();
    assert!(view.is_finalized);
    assert_eq!(view.winnings, TokenAmount(25_000_000));

    let outcome = controller.claim_reward().await.expect("claim should succeed");
    assert!(outcome.is_confirmed());
    assert_eq!(controller.view().winnings, TokenAmount::ZERO);
    assert!(matches!(
        contract.calls().last(),
        Some(RecordedCall::ClaimReward { round: 1, .. })
    ));
}

#[tokio::test]
async fn invalid_amounts_never_reach_the_contract() {
    let (contract, controller) = session().await;
    let mut notices = controller.subscribe_notices();

    for text in ["0", "-5", "abc", ""] {
        let error = controller.start_game(text, None).await.unwrap_err();
        assert!(
            matches!(
                error,
                SessionError::Validation(ValidationError::InvalidAmount(_))
            ),
            "{text:?} should be rejected, got {error:?}"
        );
    }

    assert!(contract.calls().is_empty());
    let view = controller.view();
    assert_eq!(view.player_status, PlayerStatus::Empty);
    assert!(view.error.is_some());
    assert!(!view.is_loading);

    match notices.recv().await.unwrap() {
        Event::Notice(notice) => assert_eq!(notice.level, NoticeLevel::Error),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn guess_is_a_noop_without_an_active_game() {
    let (contract, controller) = session().await;
    let mut updates = controller.subscribe();
    updates.borrow_and_update();
    let before = controller.view();

    let outcome = controller.submit_guess("Vitalik Buterin").await.unwrap();

    assert_eq!(outcome, CommandOutcome::Ignored);
    assert!(contract.calls().is_empty());
    assert_eq!(controller.view(), before);
    assert!(!updates.has_changed().unwrap());

    // A blank name is not an error while there is nothing to guess on
    let outcome = controller.submit_guess("   ").await.unwrap();
    assert_eq!(outcome, CommandOutcome::Ignored);
    assert_eq!(controller.view(), before);
    assert_eq!(controller.view().error, None);
    assert!(!updates.has_changed().unwrap());

    // Neither is a missing wallet
    controller.set_account(None).await.unwrap();
    updates.borrow_and_update();
    let disconnected = controller.view();

    let outcome = controller.submit_guess("Vitalik Buterin").await.unwrap();
    assert_eq!(outcome, CommandOutcome::Ignored);
    assert_eq!(controller.view(), disconnected);
    assert_eq!(controller.view().error, None);
    assert!(!updates.has_changed().unwrap());
    assert!(contract.calls().is_empty());
}

#[tokio::test]
async fn blank_guess_is_rejected() {
    let (contract, controller) = session().await;
    controller.start_game("1", None).await.unwrap();

    let error = controller.submit_guess("   ").await.unwrap_err();
    assert_eq!(
        error,
        SessionError::Validation(ValidationError::MissingSelection)
    );
    assert_eq!(contract.calls().len(), 1);
}

#[tokio::test]
async fn reconcile_with_unchanged_upstream_is_silent() {
    let (_contract, controller) = session().await;
    controller.start_game("1", Some("Vitalik Buterin")).await.unwrap();

    let mut updates = controller.subscribe();
    updates.borrow_and_update();
    let before = controller.view();

    controller.reconcile().await.unwrap();
    controller.reconcile().await.unwrap();

    assert!(!updates.has_changed().unwrap());
    assert_eq!(controller.view(), before);
}

#[tokio::test]
async fn attempts_stop_at_the_maximum() {
    let (contract, controller) = session().await;
    controller.start_game("1", None).await.unwrap();

    let misses = [
        "Vitalik Buterin",
        "Brian Armstrong",
        "Anatoly Yakovenko",
        "Balaji Srinivasan",
        "Nobody One",
        "Nobody Two",
        "Nobody Three",
        "Nobody Four",
    ];
    for name in misses {
        controller.submit_guess(name).await.unwrap();
        let view = controller.view();
        assert!(view.attempts <= GameConfig::MAX_ATTEMPTS);
        assert_eq!(view.guesses.len() as u32, view.attempts);
    }

    let view = controller.view();
    assert_eq!(view.player_status, PlayerStatus::Failed);
    assert_eq!(view.attempts, GameConfig::MAX_ATTEMPTS);

    let calls = contract.calls().len();
    assert_eq!(
        controller.submit_guess("Jesse Pollak").await.unwrap(),
        CommandOutcome::Ignored
    );
    assert_eq!(contract.calls().len(), calls);
}

#[tokio::test]
async fn reverted_guess_is_rolled_back() {
    let (contract, controller) = session().await;
    controller.start_game("1", None).await.unwrap();

    // The contract no longer considers the game active.
    contract.set_player_record(
        1,
        player(),
        PlayerRecord {
            status_code: PlayerStatus::Failed.code(),
            ..PlayerRecord::default()
        },
    );

    let error = controller.submit_guess("Vitalik Buterin").await.unwrap_err();
    assert!(matches!(
        error,
        SessionError::Contract(ContractError::Reverted(_))
    ));

    let view = controller.view();
    assert_eq!(view.attempts, 0);
    assert!(view.guesses.is_empty());
    assert!(view.error.is_some());
    assert!(!view.is_loading);
}

#[tokio::test]
async fn wallet_rejection_leaves_state_untouched() {
    let (contract, controller) = session().await;
    contract.reject_next("user denied");

    let error = controller.start_game("5", None).await.unwrap_err();
    assert!(matches!(error, SessionError::Wallet(_)));

    let view = controller.view();
    assert_eq!(view.player_status, PlayerStatus::Empty);
    assert!(!view.is_loading);

    // The busy flag was released with the failure.
    controller.start_game("5", None).await.unwrap();
    assert_eq!(controller.view().player_status, PlayerStatus::Active);
}

#[tokio::test]
async fn late_failure_rolls_back_the_optimistic_guess() {
    let (contract, controller) = session().await;
    controller.start_game("1", None).await.unwrap();
    contract.hold_confirmations(true);

    let mut updates = controller.subscribe();
    let task = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit_guess("Vitalik Buterin").await })
    };

    updates
        .wait_for(|view| view.attempts == 1 && view.guesses.len() == 1)
        .await
        .unwrap();
    assert_eq!(controller.view().guesses[0].phase, GuessPhase::Pending);

    let held = contract.held();
    assert_eq!(held.len(), 1);
    contract.fail_held(&held[0], "out of gas");

    let result = task.await.unwrap();
    assert!(matches!(
        result,
        Err(SessionError::Contract(ContractError::Reverted(_)))
    ));

    let view = controller.view();
    assert_eq!(view.attempts, 0);
    assert!(view.guesses.is_empty());
    assert!(!view.is_loading);
}

#[tokio::test]
async fn concurrent_guesses_keep_submission_order() {
    let (contract, controller) = session().await;
    controller.start_game("1", None).await.unwrap();
    contract.hold_confirmations(true);

    let mut updates = controller.subscribe();
    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit_guess("Vitalik Buterin").await })
    };
    updates.wait_for(|view| view.attempts == 1).await.unwrap();

    let second = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit_guess("Brian Armstrong").await })
    };
    updates.wait_for(|view| view.attempts == 2).await.unwrap();

    let view = controller.view();
    let order: Vec<(u32, &str)> = view
        .guesses
        .iter()
        .map(|g| (g.attempt, g.guess.name.as_str()))
        .collect();
    assert_eq!(order, vec![(1, "Vitalik Buterin"), (2, "Brian Armstrong")]);

    contract.release_all();
    assert!(first.await.unwrap().unwrap().is_confirmed());
    assert!(second.await.unwrap().unwrap().is_confirmed());

    let view = controller.view();
    assert_eq!(view.attempts, 2);
    assert!(view.guesses.iter().all(|g| g.phase == GuessPhase::Confirmed));
    assert_eq!(contract.record(1, player()).attempts, 2);
}

#[tokio::test]
async fn other_players_events_are_ignored() {
    let (contract, controller) = session().await;
    controller.start_game("1", None).await.unwrap();

    let reads = contract.read_count();
    let before = controller.view();

    let route = controller
        .handle_event(&ContractEvent::GuessSubmitted {
            round: 1,
            player: other_player(),
            attempts: 3,
        })
        .await;
    assert_eq!(route, EventRoute::Ignored);

    let route = controller
        .handle_event(&ContractEvent::GameStarted {
            round: 0,
            player: player(),
            assigned_target: ProfileId::default(),
        })
        .await;
    assert_eq!(route, EventRoute::Ignored);

    assert_eq!(contract.read_count(), reads);
    assert_eq!(controller.view(), before);
}

#[tokio::test]
async fn newer_round_resets_the_session() {
    let (contract, controller) = session().await;
    controller.start_game("1", Some("Vitalik Buterin")).await.unwrap();
    assert_eq!(controller.view().guesses.len(), 1);

    contract.set_round(2);
    let route = controller
        .handle_event(&ContractEvent::GameStarted {
            round: 2,
            player: other_player(),
            assigned_target: ProfileId::default(),
        })
        .await;
    assert_eq!(route, EventRoute::RoundChecked);

    let view = controller.view();
    assert_eq!(view.game_id, Some(2));
    assert_eq!(view.player_status, PlayerStatus::Empty);
    assert_eq!(view.attempts, 0);
    assert!(view.guesses.is_empty());
}

#[tokio::test(start_paused = true)]
async fn confirmation_timeout_surfaces_still_pending() {
    let config = RuntimeConfig::default().with_confirmation_timeout(Duration::from_secs(5));
    let (contract, controller) = session_with(config).await;
    contract.hold_confirmations(true);

    let outcome = controller.start_game("1", None).await.unwrap();
    let CommandOutcome::StillPending(tx) = outcome else {
        panic!("expected a pending outcome, got {outcome:?}");
    };

    let view = controller.view();
    assert!(!view.is_loading);
    assert_eq!(view.stalled, vec![tx.clone()]);
    assert_eq!(view.player_status, PlayerStatus::Active);

    // Busy flag is released; the optimistic start still blocks a second one.
    let error = controller.start_game("1", None).await.unwrap_err();
    assert_eq!(
        error,
        SessionError::Validation(ValidationError::GameAlreadyStarted)
    );

    contract.release_all();
    let report = controller.resume_pending().await;
    assert_eq!(report.confirmed, vec![tx]);
    assert!(report.failed.is_empty());

    let view = controller.view();
    assert!(view.stalled.is_empty());
    assert_eq!(view.player_status, PlayerStatus::Active);
    assert_eq!(contract.record(1, player()).status(), PlayerStatus::Active);
}

#[tokio::test(start_paused = true)]
async fn unanswered_start_times_out_and_frees_the_session() {
    let config = RuntimeConfig::default().with_confirmation_timeout(Duration::from_secs(5));
    let (contract, controller) = session_with(config).await;
    contract.leave_wallet_unanswered(true);

    // ================================================================
    // PHASE 1: The wallet never hands back a transaction
    // ================================================================
    let error = controller.start_game("1", None).await.unwrap_err();
    assert!(
        matches!(error, SessionError::Contract(ContractError::TimedOut(_))),
        "unexpected error {error:?}"
    );

    let view = controller.view();
    assert!(!view.is_loading);
    assert!(view.error.is_some());
    assert_eq!(view.player_status, PlayerStatus::Empty);
    assert!(view.stalled.is_empty());

    // ================================================================
    // PHASE 2: The busy slot is free again
    // ================================================================
    contract.leave_wallet_unanswered(false);
    let outcome = controller.start_game("1", None).await.unwrap();
    assert!(outcome.is_confirmed());
    assert_eq!(contract.calls().len(), 2);
    assert_eq!(controller.view().player_status, PlayerStatus::Active);
}

#[tokio::test(start_paused = true)]
async fn pending_start_reports_the_unsent_first_guess() {
    let config = RuntimeConfig::default().with_confirmation_timeout(Duration::from_secs(5));
    let (contract, controller) = session_with(config).await;
    contract.hold_confirmations(true);
    let mut notices = controller.subscribe_notices();

    let outcome = controller
        .start_game("1", Some("Vitalik Buterin"))
        .await
        .unwrap();
    assert!(matches!(outcome, CommandOutcome::StillPending(_)));
    assert!(
        !contract
            .calls()
            .iter()
            .any(|c| matches!(c, RecordedCall::SubmitGuess { .. }))
    );
    assert!(controller.view().guesses.is_empty());

    let mut warnings = Vec::new();
    while let Ok(Event::Notice(notice)) = notices.try_recv() {
        if notice.level == NoticeLevel::Warning {
            warnings.push(notice.text);
        }
    }
    assert!(
        warnings
            .iter()
            .any(|text| text.contains("\"Vitalik Buterin\" was not sent")),
        "warnings: {warnings:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn second_start_while_the_wallet_is_busy_is_refused() {
    let config = RuntimeConfig::default().with_confirmation_timeout(Duration::from_secs(5));
    let (contract, controller) = session_with(config).await;
    contract.leave_wallet_unanswered(true);

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.start_game("1", None).await })
    };
    while contract.calls().is_empty() {
        tokio::task::yield_now().await;
    }

    let error = controller.start_game("1", None).await.unwrap_err();
    assert_eq!(error, SessionError::CommandInFlight("start"));
    assert_eq!(contract.calls().len(), 1);

    assert!(first.await.unwrap().is_err());
    assert!(!controller.view().is_loading);
    assert_eq!(contract.calls().len(), 1);
}

#[tokio::test]
async fn duplicate_claim_while_confirming_is_refused() {
    let (contract, controller) = session().await;
    controller.start_game("1", Some("Jesse Pollak")).await.unwrap();
    contract.finalize(1, &[(player(), TokenAmount(5_000_000))]);
    controller.refresh_finalization().await.unwrap();
    contract.hold_confirmations(true);

    // ================================================================
    // PHASE 1: First claim waits for its confirmation
    // ================================================================
    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.claim_reward().await })
    };
    while contract.pending_count() == 0 {
        tokio::task::yield_now().await;
    }
    let calls = contract.calls().len();

    // ================================================================
    // PHASE 2: A second claim never reaches the wallet
    // ================================================================
    let error = controller.claim_reward().await.unwrap_err();
    assert_eq!(error, SessionError::CommandInFlight("claim"));
    assert_eq!(contract.calls().len(), calls);
    assert_eq!(contract.pending_count(), 1);

    // ================================================================
    // PHASE 3: The first claim still settles
    // ================================================================
    contract.release_all();
    let outcome = first.await.unwrap().unwrap();
    assert!(outcome.is_confirmed());
    assert_eq!(contract.calls().len(), calls);
    assert_eq!(controller.view().winnings, TokenAmount::ZERO);
}

#[tokio::test]
async fn finalization_refresh_keeps_an_older_full_fetch() {
    let (contract, controller) = session().await;
    controller.start_game("1", None).await.unwrap();

    // ================================================================
    // PHASE 1: A full fetch stalls on the player record
    // ================================================================
    let mut record = contract.record(1, player());
    record.attempts = 2;
    contract.set_player_record(1, player(), record);
    contract.hold_record_reads(true);

    let full = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.reconcile().await })
    };
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
    assert!(!full.is_finished());

    // ================================================================
    // PHASE 2: Finalization is refreshed in the meantime
    // ================================================================
    contract.finalize(1, &[(player(), TokenAmount(5_000_000))]);
    controller.refresh_finalization().await.unwrap();
    let view = controller.view();
    assert!(view.is_finalized);
    assert_eq!(view.attempts, 0);

    // ================================================================
    // PHASE 3: The older full fetch still lands without undoing it
    // ================================================================
    contract.hold_record_reads(false);
    full.await.unwrap().unwrap();

    let view = controller.view();
    assert_eq!(view.attempts, 2);
    assert!(view.is_finalized);
    assert_eq!(view.winnings, TokenAmount(5_000_000));
}

#[tokio::test]
async fn claim_requires_finalization() {
    let (contract, controller) = session().await;
    controller.start_game("1", Some("Jesse Pollak")).await.unwrap();

    let error = controller.claim_reward().await.unwrap_err();
    assert_eq!(error, SessionError::Validation(ValidationError::NotFinalized));
    assert!(
        !contract
            .calls()
            .iter()
            .any(|c| matches!(c, RecordedCall::ClaimReward { .. }))
    );
}

#[tokio::test]
async fn wrong_network_blocks_every_command() {
    let (contract, controller) = session().await;
    contract.set_chain_id(1);

    let error = controller.check_network().await.unwrap_err();
    assert_eq!(
        error,
        SessionError::WrongNetwork {
            expected: MOCK_CHAIN_ID,
            actual: 1,
        }
    );
    assert_eq!(
        controller.view().blocking,
        Some(BlockingCondition::WrongNetwork {
            expected: MOCK_CHAIN_ID,
            actual: 1,
        })
    );

    assert!(matches!(
        controller.start_game("10", None).await,
        Err(SessionError::WrongNetwork { .. })
    ));
    assert_eq!(
        controller.submit_guess("Jesse Pollak").await,
        Ok(CommandOutcome::Ignored)
    );
    assert!(contract.calls().is_empty());

    contract.set_chain_id(MOCK_CHAIN_ID);
    controller.check_network().await.unwrap();
    assert_eq!(controller.view().blocking, None);
}

#[tokio::test]
async fn disconnected_wallet_blocks_commands() {
    let (contract, controller) = session().await;
    controller.set_account(None).await.unwrap();

    let view = controller.view();
    assert_eq!(view.blocking, Some(BlockingCondition::WalletDisconnected));
    assert_eq!(view.account, None);

    let error = controller.start_game("10", None).await.unwrap_err();
    assert_eq!(error, SessionError::WalletDisconnected);
    assert!(contract.calls().is_empty());
}

#[tokio::test]
async fn listener_reconciles_on_own_events() {
    let (contract, controller) = session().await;
    let listener = controller.spawn_event_listener(controller.contract_events());
    let mut updates = controller.subscribe();

    // Started from another tab: only the event tells this session.
    contract
        .approve_and_start(player(), TokenAmount(1_000_000))
        .await
        .unwrap();

    tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|view| view.player_status == PlayerStatus::Active),
    )
    .await
    .expect("listener should reconcile")
    .unwrap();

    listener.abort();
}
