use std::fmt;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::count::{self, BetAdvice};
use crate::error::BlackjackError;
use crate::strategy::{self, Action, LegalActions};
use crate::{Card, Hand, HandOutcome, PayoutRatio, Shoe, TableRules};

/// Where the round currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    AwaitingBet,
    Dealing,
    PlayerTurn,
    DealerTurn,
    Settled,
    Closed, // Player quit
}

/// Progress of a single player hand through its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandStatus {
    /// Split hand holding one card, waiting for its turn
    Waiting,
    Playing,
    Stood,
    Doubled,
    TwentyOne,
    Bust,
}

impl HandStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, HandStatus::Waiting | HandStatus::Playing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerHand {
    pub hand: Hand,
    /// Amount riding on this hand, already taken from funds
    pub stake: u64,
    pub status: HandStatus,
    pub from_split: bool,
}

impl PlayerHand {
    fn new(stake: u64) -> Self {
        Self {
            hand: Hand::new(),
            stake,
            status: HandStatus::Playing,
            from_split: false,
        }
    }

    fn from_split(card: Card, stake: u64) -> Self {
        Self {
            hand: Hand::from_cards(vec![card]),
            stake,
            status: HandStatus::Waiting,
            from_split: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandResult {
    pub outcome: HandOutcome,
    pub stake: u64,
    /// Returned to funds at settlement, stake included
    pub credited: u64,
}

impl HandResult {
    /// Net change in funds caused by this hand.
    pub fn net(&self) -> i64 {
        self.credited as i64 - self.stake as i64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub rounds: u32,
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,
    pub blackjacks: u32,
    pub busts: u32,
}

impl SessionStats {
    fn record(&mut self, outcome: HandOutcome) {
        match outcome {
            HandOutcome::Win => self.wins += 1,
            HandOutcome::Loss => self.losses += 1,
            HandOutcome::Push => self.pushes += 1,
            HandOutcome::Blackjack => self.blackjacks += 1,
            HandOutcome::Bust => self.busts += 1,
        }
    }
}

/// Recoverable events the display should surface to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    EmptyShoe,
    FreshShoe { decks: u8 },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::EmptyShoe => write!(f, "There are no more cards to draw!"),
            Notice::FreshShoe { decks } => write!(f, "Fresh {decks}-deck shoe, count reset"),
        }
    }
}

/// Dealer hand as the player is allowed to see it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealerView {
    /// `None` marks the face-down hole card
    pub cards: Vec<Option<Card>>,
    pub score: u8,
    pub hole_hidden: bool,
}

/// Resolves one player hand against the finished dealer hand.
///
/// Returns the outcome and the amount credited back to funds.
pub fn settle_hand(player: &Hand, stake: u64, dealer: &Hand, payout: PayoutRatio) -> (HandOutcome, u64) {
    if player.is_blackjack() {
        (HandOutcome::Blackjack, stake + payout.calculate_payout(stake))
    } else if player.is_bust() {
        (HandOutcome::Bust, 0)
    } else if dealer.is_bust() || player.score() > dealer.score() {
        (HandOutcome::Win, stake * 2)
    } else if player.score() == dealer.score() {
        (HandOutcome::Push, stake)
    } else {
        (HandOutcome::Loss, 0)
    }
}

/// Drives one player and the dealer through successive betting rounds.
///
/// The engine owns the shoe and every hand. Display and input layers read
/// its state through accessors and feed it bets and [`Action`]s.
#[derive(Debug, Clone)]
pub struct RoundEngine {
    rules: TableRules,
    shoe: Shoe,
    seed: Option<u64>,
    shoes_built: u64,
    /// Stacked shoes are dealt as given: no shuffling, no replacement
    stacked: bool,
    funds: u64,
    base_bet: u64,
    dealer: Hand,
    hands: Vec<PlayerHand>,
    active: usize,
    split_taken: bool,
    phase: RoundPhase,
    count: i32,
    results: Vec<HandResult>,
    stats: SessionStats,
    notices: Vec<Notice>,
}

impl RoundEngine {
    pub fn new(rules: TableRules) -> Self {
        Self::build(rules, Shoe::new(rules.num_decks), None, false)
    }

    /// Every shoe this engine builds is shuffled reproducibly from `seed`.
    pub fn with_seed(rules: TableRules, seed: u64) -> Self {
        Self::build(rules, Shoe::with_seed(rules.num_decks, seed), Some(seed), false)
    }

    /// Deals `cards` front to back across rounds, never shuffling.
    pub fn stacked(rules: TableRules, cards: Vec<Card>) -> Self {
        Self::build(rules, Shoe::from_cards(cards), None, true)
    }

    fn build(rules: TableRules, shoe: Shoe, seed: Option<u64>, stacked: bool) -> Self {
        info!(
            "Table open: {} decks, funds {}, betting unit {}",
            rules.num_decks, rules.starting_funds, rules.betting_unit
        );
        Self {
            rules,
            shoe,
            seed,
            shoes_built: 1,
            stacked,
            funds: rules.starting_funds,
            base_bet: 0,
            dealer: Hand::new(),
            hands: Vec::new(),
            active: 0,
            split_taken: false,
            phase: RoundPhase::AwaitingBet,
            count: 0,
            results: Vec::new(),
            stats: SessionStats::default(),
            notices: Vec::new(),
        }
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn funds(&self) -> u64 {
        self.funds
    }

    /// Total riding on the table this round.
    pub fn current_bet(&self) -> u64 {
        self.hands.iter().map(|h| h.stake).sum()
    }

    pub fn true_count(&self) -> i32 {
        self.count
    }

    pub fn cards_remaining(&self) -> usize {
        self.shoe.len()
    }

    pub fn player_hands(&self) -> &[PlayerHand] {
        &self.hands
    }

    pub fn active_hand_index(&self) -> Option<usize> {
        (self.phase == RoundPhase::PlayerTurn).then_some(self.active)
    }

    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer
    }

    pub fn results(&self) -> &[HandResult] {
        &self.results
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn bet_advice(&self) -> BetAdvice {
        count::bet_advice(self.count, &self.rules)
    }

    fn hole_hidden(&self) -> bool {
        matches!(self.phase, RoundPhase::Dealing | RoundPhase::PlayerTurn)
    }

    /// The dealer's hand with the first card face down while the player acts.
    pub fn dealer_view(&self) -> DealerView {
        let hidden = self.hole_hidden() && !self.dealer.is_empty();
        let cards = self
            .dealer
            .cards()
            .iter()
            .enumerate()
            .map(|(idx, card)| if hidden && idx == 0 { None } else { Some(*card) })
            .collect();
        let score = if hidden {
            self.dealer.score() - self.dealer.values()[0]
        } else {
            self.dealer.score()
        };
        DealerView {
            cards,
            score,
            hole_hidden: hidden,
        }
    }

    /// The dealer's face-up card (the second one dealt).
    pub fn dealer_up_card(&self) -> Option<Card> {
        let cards = self.dealer.cards();
        cards.get(1).or(cards.first()).copied()
    }

    pub fn legal_actions(&self) -> LegalActions {
        if self.phase != RoundPhase::PlayerTurn {
            return LegalActions::NONE;
        }
        let hand = &self.hands[self.active].hand;
        let can_cover = self.funds >= self.base_bet;
        LegalActions {
            hit: true,
            stand: true,
            double_down: hand.len() == 2 && hand.score() <= 11 && can_cover,
            split: hand.is_pair() && !self.split_taken && can_cover,
        }
    }

    /// Basic-strategy advice for the active hand, limited to legal actions.
    pub fn recommendation(&self) -> Option<Action> {
        if self.phase != RoundPhase::PlayerTurn {
            return None;
        }
        let up = self.dealer_up_card()?;
        let hand = &self.hands[self.active].hand;
        if hand.is_empty() {
            return None;
        }
        Some(strategy::recommend_legal(
            up.rank,
            &hand.ranks(),
            hand.values(),
            &self.legal_actions(),
        ))
    }

    fn expect_phase(&self, expected: RoundPhase) -> Result<(), BlackjackError> {
        if self.phase != expected {
            return Err(BlackjackError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    /// Takes the bet from funds and deals the round.
    pub fn place_bet(&mut self, amount: u64) -> Result<(), BlackjackError> {
        self.expect_phase(RoundPhase::AwaitingBet)?;
        if amount == 0 || amount > self.funds {
            return Err(BlackjackError::InvalidBet {
                bet: amount,
                funds: self.funds,
            });
        }
        self.funds -= amount;
        self.base_bet = amount;
        info!("Bet {amount} placed, funds now {}", self.funds);
        self.deal(amount);
        Ok(())
    }

    fn deal(&mut self, amount: u64) {
        self.phase = RoundPhase::Dealing;
        self.results.clear();
        self.split_taken = false;
        self.active = 0;

        if !self.stacked {
            if self.shoe.len() < self.rules.reshuffle_below {
                self.replace_shoe();
            }
            self.shoe.shuffle();
        }

        self.dealer.clear();
        self.hands = vec![PlayerHand::new(amount)];
        self.draw_dealer();
        self.draw_dealer();
        self.draw_player(0);
        self.draw_player(0);

        debug!(
            "Dealt: dealer up {:?}, player {}",
            self.dealer_up_card().map(|c| c.to_display()),
            self.hands[0].hand.score()
        );
        self.phase = RoundPhase::PlayerTurn;
        self.advance();
    }

    fn replace_shoe(&mut self) {
        self.shoe = match self.seed {
            Some(seed) => Shoe::with_seed(self.rules.num_decks, seed.wrapping_add(self.shoes_built)),
            None => Shoe::new(self.rules.num_decks),
        };
        self.shoes_built += 1;
        self.count = 0;
        info!("Shoe exhausted, fresh {}-deck shoe built", self.rules.num_decks);
        self.notices.push(Notice::FreshShoe {
            decks: self.rules.num_decks,
        });
    }

    fn draw_dealer(&mut self) -> bool {
        match self.dealer.draw(&mut self.shoe) {
            Ok(card) => {
                debug!("Dealer draws {card}");
                true
            }
            Err(e) => {
                warn!("Dealer draw skipped: {e}");
                self.notices.push(Notice::EmptyShoe);
                false
            }
        }
    }

    fn draw_player(&mut self, index: usize) -> bool {
        match self.hands[index].hand.draw(&mut self.shoe) {
            Ok(card) => {
                debug!("Hand {} draws {card}", index + 1);
                true
            }
            Err(e) => {
                warn!("Player draw skipped: {e}");
                self.notices.push(Notice::EmptyShoe);
                false
            }
        }
    }

    /// Applies the player's choice to the active hand.
    pub fn apply(&mut self, action: Action) -> Result<(), BlackjackError> {
        self.expect_phase(RoundPhase::PlayerTurn)?;
        if !self.legal_actions().contains(action) {
            return Err(BlackjackError::InvalidAction(action));
        }
        debug!("Hand {}: {action}", self.active + 1);

        let index = self.active;
        match action {
            Action::Hit => {
                self.draw_player(index);
            }
            Action::Stand => {
                self.hands[index].status = HandStatus::Stood;
            }
            Action::DoubleDown => {
                self.funds -= self.base_bet;
                self.hands[index].stake += self.base_bet;
                self.draw_player(index);
                let hand = &mut self.hands[index];
                hand.status = if hand.hand.is_bust() {
                    HandStatus::Bust
                } else {
                    HandStatus::Doubled
                };
            }
            Action::Split => self.split(),
        }

        self.advance();
        Ok(())
    }

    fn split(&mut self) {
        let stake = self.base_bet;
        self.funds -= stake;
        self.split_taken = true;
        let cards = self.hands[self.active].hand.take_cards();
        self.hands = cards
            .into_iter()
            .map(|card| PlayerHand::from_split(card, stake))
            .collect();
        self.active = 0;
        info!("Pair split, funds now {}", self.funds);
    }

    /// Moves through finished hands until one needs a decision, or plays the
    /// dealer and settles once none is left.
    fn advance(&mut self) {
        loop {
            let index = self.active;
            if self.hands[index].status == HandStatus::Waiting {
                self.draw_player(index);
                self.hands[index].status = HandStatus::Playing;
            }

            let current = &mut self.hands[index];
            if current.status == HandStatus::Playing {
                if current.hand.is_bust() {
                    current.status = HandStatus::Bust;
                } else if current.hand.score() == 21 {
                    current.status = HandStatus::TwentyOne;
                }
            }
            if current.status == HandStatus::Playing {
                return;
            }

            if index + 1 < self.hands.len() {
                self.active += 1;
            } else {
                self.finish_round();
                return;
            }
        }
    }

    fn dealer_should_hit(&self) -> bool {
        let value = self.dealer.score();
        if value < 17 {
            true
        } else {
            value == 17 && self.rules.dealer_hits_soft_17 && self.dealer.is_soft()
        }
    }

    fn finish_round(&mut self) {
        let dealer_needed = self
            .hands
            .iter()
            .any(|h| !h.hand.is_bust() && !h.hand.is_blackjack());

        if dealer_needed {
            self.phase = RoundPhase::DealerTurn;
            while self.dealer_should_hit() {
                if !self.draw_dealer() {
                    break;
                }
            }
            debug!("Dealer finishes on {}", self.dealer.score());
        }

        self.settle();
    }

    fn settle(&mut self) {
        let payout = self.rules.blackjack_payout;
        for player in &self.hands {
            let (outcome, credited) = settle_hand(&player.hand, player.stake, &self.dealer, payout);
            self.funds += credited;
            self.stats.record(outcome);
            self.results.push(HandResult {
                outcome,
                stake: player.stake,
                credited,
            });
            info!(
                "Hand {} vs dealer {}: {outcome:?}, credited {credited}",
                player.hand.score(),
                self.dealer.score()
            );
        }
        self.stats.rounds += 1;

        let player_hands: Vec<&Hand> = self.hands.iter().map(|h| &h.hand).collect();
        let running = count::table_running_count(&self.dealer, &player_hands);
        let decks = self.shoe.decks_remaining();
        debug_assert!(decks >= 1);
        match count::true_count(self.count, running, decks) {
            Ok(tc) => self.count = tc,
            Err(e) => error!("Count not updated: {e}"),
        }
        info!("Round settled: funds {}, true count {}", self.funds, self.count);
        self.phase = RoundPhase::Settled;
    }

    /// Clears the table after settlement and waits for the next bet.
    pub fn next_round(&mut self) -> Result<(), BlackjackError> {
        self.expect_phase(RoundPhase::Settled)?;
        self.dealer.clear();
        self.hands.clear();
        self.results.clear();
        self.active = 0;
        self.base_bet = 0;
        self.phase = RoundPhase::AwaitingBet;
        Ok(())
    }

    /// Leaves the table. Anything still riding is forfeited; returns that amount.
    pub fn quit(&mut self) -> u64 {
        let forfeited = if self.phase == RoundPhase::PlayerTurn {
            self.current_bet()
        } else {
            0
        };
        if forfeited > 0 {
            info!("Quit mid-hand, {forfeited} forfeited");
        }
        self.dealer.clear();
        self.hands.clear();
        self.phase = RoundPhase::Closed;
        info!("Table closed with funds {}", self.funds);
        forfeited
    }
}
