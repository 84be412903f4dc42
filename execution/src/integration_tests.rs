use crash_types::{AccountId, Amount, CrashTier, EngineError, InvalidBet, InvalidCashout, Multiplier, Phase};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::mocks::{advance_until, crash_at, fixed_engine, FixedCrashSource};
use crate::{CrashDraw, CrashEngine, EngineConfig, EngineEvent, Ledger};

fn run_round<S: crate::CrashSource>(engine: &mut CrashEngine<S>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while engine.phase() != Phase::Crashed {
        let deadline = engine.next_deadline().expect("a timer is always live");
        events.extend(engine.advance(deadline));
    }
    events
}

#[test]
fn test_auto_cashout_pays_threshold() {
    let mut engine = fixed_engine([300]);
    engine
        .place_bet(Amount::from_whole(100), Some(Multiplier::from_hundredths(200)))
        .unwrap();
    assert_eq!(engine.balance(), Amount::from_whole(900));

    let events = run_round(&mut engine);

    assert_eq!(engine.balance(), Amount::from_whole(1_100));
    assert_eq!(engine.win_amount(), Amount::from_whole(200));
    assert!(engine.cashed_out());
    let cashouts: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::CashedOut { multiplier, win_amount, auto, .. } => {
                Some((*multiplier, *win_amount, *auto))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        cashouts,
        vec![(Multiplier::from_hundredths(200), Amount::from_whole(200), true)]
    );
    let result = engine.history().next().copied().unwrap();
    assert!(result.won);
    assert_eq!(result.multiplier_at_end, Multiplier::from_hundredths(300));
}

#[test]
fn test_crash_below_one_loses_stake() {
    let mut engine = fixed_engine([90]);
    engine.place_bet(Amount::from_whole(50), None).unwrap();

    let events = run_round(&mut engine);

    assert_eq!(engine.balance(), Amount::from_whole(950));
    assert!(!engine.cashed_out());
    assert_eq!(engine.win_amount(), Amount::ZERO);
    let result = engine.history().next().copied().unwrap();
    assert!(!result.won);
    assert_eq!(result.multiplier_at_end, Multiplier::from_hundredths(90));
    assert!(events.contains(&EngineEvent::Crashed {
        round_id: 1,
        crash_point: Multiplier::from_hundredths(90),
        won: false,
    }));
}

#[test]
fn test_bet_above_balance_rejected() {
    let mut engine = fixed_engine([200]);
    assert_eq!(
        engine.place_bet(Amount::from_whole(2_000), None),
        Err(InvalidBet::InsufficientBalance {
            amount: Amount::from_whole(2_000),
            available: Amount::from_whole(1_000),
        })
    );
    assert_eq!(engine.balance(), Amount::from_whole(1_000));
    assert!(engine.bet().is_none());

    // The whole balance is fine.
    engine.place_bet(Amount::from_whole(1_000), None).unwrap();
    assert_eq!(engine.balance(), Amount::ZERO);
}

#[test]
fn test_cash_out_while_betting_rejected() {
    let mut engine = fixed_engine([200]);
    engine.place_bet(Amount::from_whole(10), None).unwrap();
    assert_eq!(
        engine.cash_out(),
        Err(EngineError::Cashout(InvalidCashout::NotRunning { phase: Phase::Betting }))
    );
    assert_eq!(engine.balance(), Amount::from_whole(990));
    assert!(!engine.cashed_out());
}

#[test]
fn test_cash_out_after_crash_rejected() {
    let mut engine = fixed_engine([150]);
    engine.place_bet(Amount::from_whole(10), None).unwrap();
    run_round(&mut engine);
    assert_eq!(
        engine.cash_out(),
        Err(EngineError::Cashout(InvalidCashout::NotRunning { phase: Phase::Crashed }))
    );
    assert_eq!(engine.balance(), Amount::from_whole(990));
}

#[test]
fn test_auto_cashout_at_crash_point_pays() {
    let mut engine = fixed_engine([200]);
    engine
        .place_bet(Amount::from_whole(100), Some(Multiplier::from_hundredths(200)))
        .unwrap();
    let events = run_round(&mut engine);
    assert!(events.contains(&EngineEvent::CashedOut {
        round_id: 1,
        multiplier: Multiplier::from_hundredths(200),
        win_amount: Amount::from_whole(200),
        auto: true,
    }));
    assert_eq!(engine.balance(), Amount::from_whole(1_100));
    let result = engine.history().next().copied().unwrap();
    assert!(result.won);
    assert_eq!(result.multiplier_at_end, Multiplier::from_hundredths(200));
}

#[test]
fn test_auto_cashout_above_crash_point_never_fires() {
    let mut engine = fixed_engine([300]);
    engine
        .place_bet(Amount::from_whole(100), Some(Multiplier::from_hundredths(301)))
        .unwrap();
    let events = run_round(&mut engine);
    assert!(!events.iter().any(|e| matches!(e, EngineEvent::CashedOut { .. })));
    assert_eq!(engine.balance(), Amount::from_whole(900));
    assert!(!engine.history().next().unwrap().won);
}

#[test]
fn test_manual_cash_out_beats_auto() {
    let mut engine = fixed_engine([800]);
    engine
        .place_bet(Amount::from_whole(100), Some(Multiplier::from_hundredths(500)))
        .unwrap();
    advance_until(&mut engine, 30, |e| e.multiplier() >= Multiplier::from_hundredths(150));
    let win = engine.cash_out().unwrap();
    let events = run_round(&mut engine);
    assert!(!events.iter().any(|e| matches!(e, EngineEvent::CashedOut { .. })));
    assert_eq!(engine.balance(), Amount::from_whole(900).checked_add(win).unwrap());
}

#[test]
fn test_rounds_cycle_without_bets() {
    let mut engine = fixed_engine([120, 250]);
    for round in 1..=4u64 {
        assert_eq!(engine.round_id(), round);
        run_round(&mut engine);
        let deadline = engine.next_deadline().unwrap();
        engine.advance(deadline);
    }
    let history: Vec<_> = engine.history().map(|r| r.multiplier_at_end.hundredths()).collect();
    assert_eq!(history, vec![250, 120, 250, 120]);
    assert!(engine.history().all(|r| !r.won));
    assert_eq!(engine.balance(), Amount::from_whole(1_000));
}

#[test]
fn test_bet_with_deposited_real_account() {
    let mut engine = fixed_engine([400]);
    let real = AccountId::real();
    engine.switch_account(&real).unwrap();
    assert_eq!(
        engine.place_bet(Amount::from_whole(1), None),
        Err(InvalidBet::InsufficientBalance {
            amount: Amount::from_whole(1),
            available: Amount::ZERO,
        })
    );

    engine.deposit(&real, Amount::from_whole(40)).unwrap();
    engine
        .place_bet(Amount::from_whole(40), Some(Multiplier::from_hundredths(250)))
        .unwrap();
    run_round(&mut engine);
    assert_eq!(engine.balance(), Amount::from_whole(100));
    assert_eq!(engine.withdraw(&real, Amount::from_whole(100)), Ok(Amount::ZERO));
    assert_eq!(
        engine.ledger().balance_of(&AccountId::demo()),
        Ok(Amount::from_whole(1_000))
    );
}

#[test]
fn test_jackpot_round_flagged_until_reset() {
    let draw = CrashDraw {
        crash_point: Multiplier::from_hundredths(750),
        growth_rate_milli: 800,
        tier: CrashTier::Jackpot,
    };
    let source = FixedCrashSource::from_draws([draw, crash_at(200)]);
    let mut engine =
        CrashEngine::new(EngineConfig::default(), Ledger::default(), source, 0).unwrap();

    let events = run_round(&mut engine);
    assert!(events.contains(&EngineEvent::RoundStarted { round_id: 1, jackpot: true }));
    assert!(engine.snapshot().jackpot);

    let deadline = engine.next_deadline().unwrap();
    engine.advance(deadline);
    assert!(!engine.snapshot().jackpot);
}

#[test]
fn test_snapshot_json_shape() {
    let mut engine = fixed_engine([200]);
    engine
        .place_bet(Amount::from_whole(25), Some(Multiplier::from_hundredths(180)))
        .unwrap();
    let value = serde_json::to_value(engine.snapshot()).unwrap();
    assert_eq!(value["roundId"], 1);
    assert_eq!(value["phase"], "betting");
    assert_eq!(value["multiplier"], 50);
    assert_eq!(value["countdown"], 3);
    assert_eq!(value["bet"]["amount"], 2_500);
    assert_eq!(value["bet"]["autoCashout"], 180);
    assert_eq!(value["balance"], 97_500);
    assert!(value.get("crashPoint").is_none());

    run_round(&mut engine);
    let value = serde_json::to_value(engine.snapshot()).unwrap();
    assert_eq!(value["phase"], "crashed");
    assert_eq!(value["crashPoint"], 200);
    assert_eq!(value["cashedOut"], true);
    assert_eq!(value["winAmount"], 4_500);
    assert_eq!(value["history"][0]["won"], true);
}

#[test]
fn test_event_json_is_tagged() {
    let event = EngineEvent::CountdownTick { round_id: 4, remaining: 2 };
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["type"], "countdown_tick");
    assert_eq!(value["remaining"], 2);
}

#[test]
fn test_seeded_engines_agree() {
    let run = |seed: u64| {
        let mut engine = CrashEngine::with_rng(
            EngineConfig::default(),
            Ledger::default(),
            ChaCha20Rng::seed_from_u64(seed),
            0,
        )
        .unwrap();
        let mut events = Vec::new();
        for _ in 0..20 {
            let _ = engine.place_bet(Amount::from_whole(5), Some(Multiplier::from_hundredths(130)));
            events.extend(run_round(&mut engine));
            let deadline = engine.next_deadline().unwrap();
            events.extend(engine.advance(deadline));
        }
        (events, engine.balance())
    };
    let (first, first_balance) = run(42);
    let (second, second_balance) = run(42);
    assert_eq!(first, second);
    assert_eq!(first_balance, second_balance);

    let (other, _) = run(43);
    assert_ne!(first, other);
}

proptest! {
    #[test]
    fn prop_balance_conserved(
        crash in 50u32..2_000,
        stake in 1u64..=1_000,
        auto in proptest::option::of(51u32..3_000),
        cash_after_ticks in proptest::option::of(0usize..200),
    ) {
        let mut engine = fixed_engine([crash]);
        let stake = Amount::from_whole(stake);
        let auto = auto.map(Multiplier::from_hundredths);
        engine.place_bet(stake, auto).unwrap();
        advance_until(&mut engine, 30, |e| e.phase() == Phase::Running);

        let mut credited = Amount::ZERO;
        let mut ticks = 0;
        let mut last = engine.multiplier();
        while engine.phase() == Phase::Running {
            if cash_after_ticks == Some(ticks) {
                if let Ok(win) = engine.cash_out() {
                    credited = credited.checked_add(win).unwrap();
                }
            }
            let deadline = engine.next_deadline().unwrap();
            for event in engine.advance(deadline) {
                match event {
                    EngineEvent::CashedOut { win_amount, auto: true, .. } => {
                        credited = credited.checked_add(win_amount).unwrap();
                    }
                    EngineEvent::MultiplierUpdated { multiplier, .. } => {
                        prop_assert!(multiplier >= last);
                        prop_assert!(multiplier <= Multiplier::from_hundredths(crash));
                        last = multiplier;
                    }
                    _ => {}
                }
            }
            ticks += 1;
        }

        let expected = Amount::from_whole(1_000)
            .checked_sub(stake)
            .and_then(|b| b.checked_add(credited))
            .unwrap();
        prop_assert_eq!(engine.balance(), expected);
        prop_assert_eq!(engine.win_amount(), credited);
        prop_assert_eq!(engine.cashed_out(), !credited.is_zero());
        prop_assert_eq!(engine.history().next().unwrap().won, engine.cashed_out());
        if let Some(threshold) = auto {
            if engine.cashed_out() && cash_after_ticks.is_none() {
                prop_assert_eq!(engine.win_amount(), stake.times(threshold).unwrap());
            }
        }
    }
}
