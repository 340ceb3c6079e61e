use std::sync::{Arc, Mutex};

use blackjack::{Action, BetAdvice, HandOutcome, RoundEngine, RoundPhase};
use crossterm::event::KeyCode;
use log::info;

/// Lines kept in the log pane.
const MAX_LOGS: usize = 50;
const MAX_BET_DIGITS: usize = 12;

pub struct App {
    pub engine: RoundEngine,
    pub bet_input: String,
    pub status: String,
    pub logs: Vec<String>,
    log_buffer: Arc<Mutex<Vec<String>>>, // Shared buffer for captured log:: messages
    pub log_visible: bool,
    pub rules_visible: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(engine: RoundEngine, log_buffer: Arc<Mutex<Vec<String>>>) -> App {
        let mut app = App {
            engine,
            bet_input: String::new(),
            status: String::new(),
            logs: vec![
                "Welcome to Blackjack!".to_string(),
                "Type a bet and press [Enter]; an empty bet takes the suggestion".to_string(),
                "[R] rules  [L] log  [Q] quit".to_string(),
            ],
            log_buffer,
            log_visible: true,
            rules_visible: false,
            should_quit: false,
        };
        app.refresh_status();
        app
    }

    pub fn sync_logs(&mut self) {
        let messages: Vec<String> = if let Ok(mut buffer) = self.log_buffer.lock() {
            buffer.drain(..).collect()
        } else {
            Vec::new()
        };

        for msg in messages {
            self.add_log(msg);
        }
    }

    pub fn add_log(&mut self, message: String) {
        self.logs.push(message);
        if self.logs.len() > MAX_LOGS {
            self.logs.remove(0);
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.quit(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.rules_visible = !self.rules_visible,
            KeyCode::Char('l') | KeyCode::Char('L') => self.log_visible = !self.log_visible,
            KeyCode::Esc => self.rules_visible = false,
            _ => match self.engine.phase() {
                RoundPhase::AwaitingBet => self.handle_bet_key(code),
                RoundPhase::PlayerTurn => {
                    if let Some(action) = action_for_key(code) {
                        self.play(action);
                    }
                }
                RoundPhase::Settled => {
                    if matches!(code, KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Enter) {
                        self.continue_round();
                    }
                }
                _ => {}
            },
        }
    }

    fn handle_bet_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c @ '0'..='9') => {
                if self.bet_input.len() < MAX_BET_DIGITS {
                    self.bet_input.push(c);
                }
            }
            KeyCode::Backspace => {
                self.bet_input.pop();
            }
            KeyCode::Enter => self.submit_bet(),
            _ => {}
        }
        self.refresh_status();
    }

    /// Bet for the typed amount, or the advisor's suggestion when nothing was typed.
    pub fn submit_bet(&mut self) {
        let amount = if self.bet_input.is_empty() {
            self.engine.bet_advice().amount().min(self.engine.funds())
        } else {
            match self.bet_input.parse::<u64>() {
                Ok(amount) => amount,
                Err(_) => {
                    self.add_log("Please enter a valid numerical amount!".to_string());
                    self.bet_input.clear();
                    return;
                }
            }
        };
        self.bet_input.clear();

        match self.engine.place_bet(amount) {
            Ok(()) => self.after_step(),
            Err(e) => self.add_log(format!("Bet rejected: {e}")),
        }
    }

    pub fn play(&mut self, action: Action) {
        if !self.engine.legal_actions().contains(action) {
            self.add_log(format!("Cannot {action} now"));
            return;
        }
        let advised = self.engine.recommendation();
        if let Err(e) = self.engine.apply(action) {
            self.add_log(format!("Error: {e}"));
            return;
        }
        if let Some(advised) = advised.filter(|a| *a != action) {
            info!("You chose {action}, basic strategy said {advised}");
        }
        self.after_step();
    }

    pub fn continue_round(&mut self) {
        if let Err(e) = self.engine.next_round() {
            self.add_log(format!("Error: {e}"));
        }
        self.refresh_status();
    }

    pub fn quit(&mut self) {
        let forfeited = self.engine.quit();
        if forfeited > 0 {
            self.add_log(format!("Left mid-hand, {forfeited} forfeited"));
        }
        self.add_log("Thanks for playing the game!".to_string());
        self.should_quit = true;
    }

    fn after_step(&mut self) {
        for notice in self.engine.take_notices() {
            self.add_log(notice.to_string());
        }
        if self.engine.phase() == RoundPhase::Settled {
            let results: Vec<String> = self
                .engine
                .results()
                .iter()
                .enumerate()
                .map(|(i, r)| format!("Hand {}: {} ({:+})", i + 1, outcome_message(r.outcome), r.net()))
                .collect();
            for line in results {
                self.add_log(line);
            }
        }
        self.refresh_status();
    }

    pub fn refresh_status(&mut self) {
        let engine = &self.engine;
        self.status = match engine.phase() {
            RoundPhase::AwaitingBet => {
                if engine.funds() == 0 {
                    "Out of funds. Press [Q] to leave the table".to_string()
                } else {
                    let advice = match engine.bet_advice() {
                        BetAdvice::Raise(amount) => format!("bet {amount}"),
                        BetAdvice::Minimum(amount) => format!("bet the minimum: {amount}"),
                    };
                    format!(
                        "Funds {} | True count {} | You should {advice} | Bet > {}",
                        engine.funds(),
                        engine.true_count(),
                        self.bet_input
                    )
                }
            }
            RoundPhase::PlayerTurn => {
                let hands = engine.player_hands();
                let active = engine.active_hand_index().unwrap_or(0);
                let score = hands.get(active).map(|h| h.hand.score()).unwrap_or(0);
                let hand_label = if hands.len() > 1 {
                    format!("Hand {}/{}", active + 1, hands.len())
                } else {
                    "Your hand".to_string()
                };
                match engine.recommendation() {
                    Some(action) => format!(
                        "{hand_label}: {score} | Bet {} | Strategy: You should {action}!",
                        engine.current_bet()
                    ),
                    None => format!("{hand_label}: {score}"),
                }
            }
            RoundPhase::Settled => {
                let net: i64 = engine.results().iter().map(|r| r.net()).sum();
                format!(
                    "Round over ({net:+}). Funds {} | [N] next round  [Q] quit",
                    engine.funds()
                )
            }
            RoundPhase::Dealing | RoundPhase::DealerTurn => "Dealing...".to_string(),
            RoundPhase::Closed => "Table closed".to_string(),
        };
    }
}

/// Keyboard binding for each player action; arrows mirror the letters.
pub fn action_for_key(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Up => Some(Action::Hit),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Some(Action::Stand),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Some(Action::DoubleDown),
        KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Left => Some(Action::Split),
        _ => None,
    }
}

pub fn outcome_message(outcome: HandOutcome) -> &'static str {
    match outcome {
        HandOutcome::Blackjack => "Blackjack! You've won!",
        HandOutcome::Win => "You've won!",
        HandOutcome::Push => "It's a draw!",
        HandOutcome::Loss => "Dealer wins!",
        HandOutcome::Bust => "Bust! You've lost!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackjack::{Card, Rank, Suit, TableRules};

    fn app(ranks: &[Rank]) -> App {
        let cards = ranks.iter().map(|r| Card::new(*r, Suit::Hearts)).collect();
        let engine = RoundEngine::stacked(TableRules::default(), cards);
        App::new(engine, Arc::new(Mutex::new(Vec::new())))
    }

    fn type_bet(app: &mut App, bet: &str) {
        for c in bet.chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(action_for_key(KeyCode::Char('h')), Some(Action::Hit));
        assert_eq!(action_for_key(KeyCode::Down), Some(Action::Stand));
        assert_eq!(action_for_key(KeyCode::Right), Some(Action::DoubleDown));
        assert_eq!(action_for_key(KeyCode::Char('x')), Some(Action::Split));
        assert_eq!(action_for_key(KeyCode::Char('z')), None);
    }

    #[test]
    fn test_typed_bet_deals_the_round() {
        let mut app = app(&[Rank::Ten, Rank::Seven, Rank::Ten, Rank::Nine]);
        type_bet(&mut app, "100");

        assert_eq!(app.engine.phase(), RoundPhase::PlayerTurn);
        assert_eq!(app.engine.funds(), 900);
        assert!(app.bet_input.is_empty());
        assert!(app.status.contains("Stand"));

        app.handle_key(KeyCode::Down);
        assert_eq!(app.engine.phase(), RoundPhase::Settled);
        assert_eq!(app.engine.funds(), 1100);
        assert!(app.logs.iter().any(|l| l.starts_with("Hand 1: You've won!")));

        app.handle_key(KeyCode::Char('n'));
        assert_eq!(app.engine.phase(), RoundPhase::AwaitingBet);
    }

    #[test]
    fn test_empty_bet_takes_the_suggestion() {
        let mut app = app(&[Rank::Ten, Rank::Seven, Rank::Ten, Rank::Nine]);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.engine.current_bet(), 50);
    }

    #[test]
    fn test_backspace_edits_the_bet() {
        let mut app = app(&[Rank::Ten, Rank::Seven, Rank::Ten, Rank::Nine]);
        app.handle_key(KeyCode::Char('5'));
        app.handle_key(KeyCode::Char('0'));
        app.handle_key(KeyCode::Char('0'));
        app.handle_key(KeyCode::Backspace);
        assert_eq!(app.bet_input, "50");
        assert!(app.status.ends_with("Bet > 50"));
    }

    #[test]
    fn test_oversized_bet_is_rejected() {
        let mut app = app(&[Rank::Ten, Rank::Seven, Rank::Ten, Rank::Nine]);
        type_bet(&mut app, "5000");

        assert_eq!(app.engine.phase(), RoundPhase::AwaitingBet);
        assert_eq!(app.engine.funds(), 1000);
        assert!(app.logs.last().unwrap().starts_with("Bet rejected"));
    }

    #[test]
    fn test_illegal_action_is_ignored() {
        let mut app = app(&[Rank::Ten, Rank::Seven, Rank::Ten, Rank::Nine]);
        type_bet(&mut app, "100");
        app.handle_key(KeyCode::Left);

        assert_eq!(app.engine.phase(), RoundPhase::PlayerTurn);
        assert_eq!(app.logs.last().unwrap(), "Cannot Split now");
    }

    #[test]
    fn test_quit_mid_hand_forfeits() {
        let mut app = app(&[Rank::Ten, Rank::Seven, Rank::Ten, Rank::Six]);
        type_bet(&mut app, "200");
        app.handle_key(KeyCode::Char('q'));

        assert!(app.should_quit);
        assert_eq!(app.engine.funds(), 800);
        assert!(app.logs.iter().any(|l| l == "Left mid-hand, 200 forfeited"));
    }

    #[test]
    fn test_toggles() {
        let mut app = app(&[]);
        app.handle_key(KeyCode::Char('r'));
        assert!(app.rules_visible);
        app.handle_key(KeyCode::Esc);
        assert!(!app.rules_visible);
        app.handle_key(KeyCode::Char('l'));
        assert!(!app.log_visible);
    }
}
