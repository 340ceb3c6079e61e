use std::collections::HashSet;

use blackjack::count::{recommended_bet, running_count, true_count};
use blackjack::strategy::recommend;
use blackjack::{
    Action, BetAdvice, BlackjackError, Card, Hand, HandOutcome, Rank, RoundEngine, RoundPhase,
    Shoe, Suit, TableRules,
};

use Rank::*;

fn cards(ranks: &[Rank]) -> Vec<Card> {
    ranks.iter().map(|r| Card::new(*r, Suit::Clubs)).collect()
}

fn stacked(ranks: &[Rank]) -> RoundEngine {
    RoundEngine::stacked(TableRules::default(), cards(ranks))
}

fn advise(dealer_up: Rank, player: &[Rank]) -> Action {
    let hand = Hand::from_cards(cards(player));
    recommend(dealer_up, &hand.ranks(), hand.values())
}

#[test]
fn test_single_deck_deals_every_card_once() {
    let mut shoe = Shoe::with_seed(1, 7);
    shoe.shuffle();

    let mut seen = HashSet::new();
    for _ in 0..52 {
        let card = shoe.deal().unwrap();
        assert!(seen.insert((card.rank, card.suit)), "{card} dealt twice");
    }
    assert_eq!(seen.len(), 52);
    assert_eq!(shoe.deal(), Err(BlackjackError::EmptyShoe));
}

#[test]
fn test_score_tracks_effective_values_over_random_draws() {
    for seed in 0..200 {
        let mut shoe = Shoe::with_seed(2, seed);
        shoe.shuffle();
        let mut hand = Hand::new();

        for _ in 0..8 {
            hand.draw(&mut shoe).unwrap();
            let values = hand.values();
            assert_eq!(values.iter().map(|v| *v as u32).sum::<u32>(), hand.score() as u32);

            // Greedy demotion: an ace stays at 11 only while the total allows it.
            let high_aces = values.iter().filter(|v| **v == 11).count();
            assert!(high_aces <= 1);
            if high_aces == 1 {
                assert!(hand.score() <= 21);
            }

            let recomputed = Hand::from_cards(hand.cards().to_vec());
            assert_eq!(recomputed.score(), hand.score());
            assert_eq!(recomputed.values(), hand.values());
        }
    }
}

#[test]
fn test_advisor_scenarios() {
    assert_eq!(advise(Six, &[Ace, Nine]), Action::Stand);
    assert_eq!(advise(Ten, &[Eight, Eight]), Action::Split);
    assert_eq!(advise(Four, &[Five, Six]), Action::DoubleDown);
}

#[test]
fn test_count_scenario() {
    let visible = cards(&[Two, Two, Ten, Ace]);
    let running = running_count(&visible);
    let tc = true_count(0, running, 1).unwrap();

    assert_eq!(running, 0);
    assert_eq!(tc, 0);
    assert_eq!(recommended_bet(tc, 100), -100);
}

#[test]
fn test_blackjack_round_settles_to_1150() {
    let mut engine = stacked(&[Nine, Nine, Ace, Queen]);
    engine.place_bet(100).unwrap();

    assert_eq!(engine.phase(), RoundPhase::Settled);
    assert_eq!(engine.results()[0].outcome, HandOutcome::Blackjack);
    assert_eq!(engine.funds(), 1150);
}

#[test]
fn test_bust_round_settles_to_900() {
    let mut engine = stacked(&[Nine, Nine, Ten, Five, Nine]);
    engine.place_bet(100).unwrap();
    engine.apply(Action::Hit).unwrap();

    assert_eq!(engine.results()[0].outcome, HandOutcome::Bust);
    assert_eq!(engine.funds(), 900);
}

#[test]
fn test_session_across_rounds() {
    let mut engine = stacked(&[
        // Round 1: dealer 10+7, player 10+9 stands and wins.
        Ten, Seven, Ten, Nine,
        // Round 2: dealer 9+9, player 6+5 doubles into a ten.
        Nine, Nine, Six, Five, Ten,
        // Round 3: dealer 10+8, player 10+8 pushes.
        Ten, Eight, King, Eight,
    ]);

    engine.place_bet(100).unwrap();
    engine.apply(Action::Stand).unwrap();
    assert_eq!(engine.funds(), 1100);
    engine.next_round().unwrap();

    engine.place_bet(100).unwrap();
    assert_eq!(engine.recommendation(), Some(Action::DoubleDown));
    engine.apply(Action::DoubleDown).unwrap();
    assert_eq!(engine.results()[0].stake, 200);
    assert_eq!(engine.funds(), 1300);
    engine.next_round().unwrap();

    engine.place_bet(100).unwrap();
    engine.apply(Action::Stand).unwrap();
    assert_eq!(engine.results()[0].outcome, HandOutcome::Push);
    assert_eq!(engine.funds(), 1300);

    let stats = engine.stats();
    assert_eq!((stats.rounds, stats.wins, stats.pushes), (3, 2, 1));

    engine.next_round().unwrap();
    assert_eq!(engine.quit(), 0);
    assert_eq!(engine.phase(), RoundPhase::Closed);
    assert!(matches!(
        engine.place_bet(100),
        Err(BlackjackError::WrongPhase { .. })
    ));
}

#[test]
fn test_advised_play_keeps_the_books_straight() {
    let rules = TableRules::default();
    let mut engine = RoundEngine::with_seed(rules, 42);

    for _ in 0..300 {
        if engine.funds() < rules.min_bet {
            break;
        }
        let advice = engine.bet_advice();
        match advice {
            BetAdvice::Minimum(amount) => assert_eq!(amount, rules.min_bet),
            BetAdvice::Raise(amount) => assert!(amount >= rules.betting_unit),
        }

        let before = engine.funds();
        let bet = advice.amount().clamp(rules.min_bet, before);
        engine.place_bet(bet).unwrap();
        while let Some(action) = engine.recommendation() {
            assert!(engine.legal_actions().contains(action));
            engine.apply(action).unwrap();
        }

        assert_eq!(engine.phase(), RoundPhase::Settled);
        let net: i64 = engine.results().iter().map(|r| r.net()).sum();
        assert_eq!(engine.funds() as i64, before as i64 + net);
        engine.next_round().unwrap();
    }
}

#[test]
fn test_same_seed_same_session() {
    let play = |seed| {
        let mut engine = RoundEngine::with_seed(TableRules::default(), seed);
        let mut trail = Vec::new();
        for _ in 0..40 {
            if engine.funds() < 50 {
                break;
            }
            engine.place_bet(50).unwrap();
            while let Some(action) = engine.recommendation() {
                engine.apply(action).unwrap();
            }
            trail.push((engine.funds(), engine.true_count()));
            engine.next_round().unwrap();
        }
        trail
    };

    assert_eq!(play(9), play(9));
}
