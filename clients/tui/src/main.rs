use blackjack::{PayoutRatio, RoundEngine, TableRules};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{error::Error, io, time::Duration};

mod app;
use app::App;

mod tui_logger;
use tui_logger::TuiLogger;

mod ui;

#[derive(Parser)]
#[command(name = "blackjack-tui", about = "Single-player blackjack with strategy and count hints")]
struct Args {
    /// Number of decks in the shoe
    #[arg(long, env = "BLACKJACK_DECKS", default_value = "5")]
    num_decks: u8,

    /// Starting bankroll
    #[arg(long, env = "BLACKJACK_FUNDS", default_value = "1000")]
    funds: u64,

    /// Betting unit the count advisor scales by
    #[arg(long, env = "BLACKJACK_UNIT", default_value = "100")]
    unit: u64,

    /// Bet suggested when the count is not in the player's favour
    #[arg(long, env = "BLACKJACK_MIN_BET", default_value = "50")]
    min_bet: u64,

    /// Dealer hits soft 17
    #[arg(long, env = "BLACKJACK_H17", default_value_t = false, action = clap::ArgAction::Set)]
    dealer_hits_soft_17: bool,

    /// Blackjack payout as N:D
    #[arg(long, env = "BLACKJACK_PAYOUT", default_value = "3:2")]
    payout: String,

    /// Seed for reproducible shoes
    #[arg(long, env = "BLACKJACK_SEED")]
    seed: Option<u64>,

    /// Show every draw in the log pane
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    fn table_rules(&self) -> Result<TableRules, Box<dyn Error>> {
        let rules = TableRules {
            num_decks: self.num_decks,
            starting_funds: self.funds,
            betting_unit: self.unit,
            min_bet: self.min_bet,
            blackjack_payout: PayoutRatio::parse(&self.payout)?,
            dealer_hits_soft_17: self.dealer_hits_soft_17,
            ..TableRules::default()
        };
        rules.validate()?;
        Ok(rules)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let rules = args.table_rules()?;

    let level = if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    let (logger, log_buffer) = TuiLogger::new(level);
    log::set_boxed_logger(Box::new(logger)).map(|()| log::set_max_level(level.to_level_filter()))?;

    let engine = match args.seed {
        Some(seed) => RoundEngine::with_seed(rules, seed),
        None => RoundEngine::new(rules),
    };

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(engine, log_buffer);
    let res = run_app(&mut terminal, app);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    match res {
        Ok(funds) => println!("Thanks for playing! You leave the table with {funds}."),
        Err(err) => println!("{err:?}"),
    }

    Ok(())
}

/// Runs until the player quits; returns the funds they walk away with.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<u64, Box<dyn Error>>
where
    B::Error: 'static,
{
    loop {
        app.sync_logs();
        terminal.draw(|f| ui::ui(f, &app))?;

        if app.should_quit {
            return Ok(app.engine.funds());
        }

        // Poll with a timeout so log records still reach the pane between keys
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }
    }
}
