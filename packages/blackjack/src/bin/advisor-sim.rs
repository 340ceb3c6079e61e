use blackjack::{PayoutRatio, RoundEngine, RoundPhase, TableRules};
use clap::Parser;
use log::{debug, info, warn};

#[derive(Parser)]
#[command(
    name = "advisor-sim",
    about = "Play rounds headless, betting and playing exactly as the advisors suggest"
)]
struct Args {
    /// Rounds to play before stopping
    #[arg(long, env = "SIM_ROUNDS", default_value = "1000")]
    rounds: u32,

    /// Number of decks in the shoe
    #[arg(long, env = "BLACKJACK_DECKS", default_value = "5")]
    num_decks: u8,

    /// Starting bankroll
    #[arg(long, env = "BLACKJACK_FUNDS", default_value = "1000")]
    funds: u64,

    /// Betting unit the count advisor scales by
    #[arg(long, env = "BLACKJACK_UNIT", default_value = "100")]
    unit: u64,

    /// Bet used when the count is not in the player's favour
    #[arg(long, env = "BLACKJACK_MIN_BET", default_value = "50")]
    min_bet: u64,

    /// Dealer hits soft 17
    #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
    dealer_hits_soft_17: bool,

    /// Blackjack payout as N:D
    #[arg(long, default_value = "3:2")]
    payout: String,

    /// Seed for reproducible shoes
    #[arg(long, env = "SIM_SEED")]
    seed: Option<u64>,
}

/// Hard cap on decisions per round.
const MAX_ACTIONS_PER_ROUND: usize = 32;

fn main() {
    env_logger::init();
    let args = Args::parse();

    let blackjack_payout = PayoutRatio::parse(&args.payout).unwrap_or_else(|e| {
        eprintln!("Invalid payout ratio '{}': {e}", args.payout);
        std::process::exit(1);
    });

    let rules = TableRules {
        num_decks: args.num_decks,
        starting_funds: args.funds,
        betting_unit: args.unit,
        min_bet: args.min_bet,
        blackjack_payout,
        dealer_hits_soft_17: args.dealer_hits_soft_17,
        ..TableRules::default()
    };
    if let Err(e) = rules.validate() {
        eprintln!("Invalid table rules: {e}");
        std::process::exit(1);
    }

    eprintln!("Configuration:");
    eprintln!("  Decks:          {}", rules.num_decks);
    eprintln!("  Funds:          {}", rules.starting_funds);
    eprintln!("  Betting unit:   {}", rules.betting_unit);
    eprintln!("  Minimum bet:    {}", rules.min_bet);
    eprintln!(
        "  Dealer soft 17: {}",
        if rules.dealer_hits_soft_17 {
            "hits"
        } else {
            "stands"
        }
    );
    eprintln!(
        "  BJ payout:      {}:{}",
        rules.blackjack_payout.numerator, rules.blackjack_payout.denominator
    );

    let mut engine = match args.seed {
        Some(seed) => RoundEngine::with_seed(rules, seed),
        None => RoundEngine::new(rules),
    };

    let mut played = 0;
    let mut peak = engine.funds();
    while played < args.rounds {
        if engine.funds() < rules.min_bet {
            info!("Bankroll {} is below the minimum bet", engine.funds());
            break;
        }
        let bet = engine.bet_advice().amount().clamp(rules.min_bet, engine.funds());
        if let Err(e) = engine.place_bet(bet) {
            warn!("Bet of {bet} refused: {e}");
            break;
        }

        let mut actions = 0;
        while engine.phase() == RoundPhase::PlayerTurn && actions < MAX_ACTIONS_PER_ROUND {
            let Some(action) = engine.recommendation() else {
                break;
            };
            if let Err(e) = engine.apply(action) {
                warn!("Advisor move rejected: {e}");
                break;
            }
            actions += 1;
        }
        if engine.phase() != RoundPhase::Settled {
            warn!("Round {} did not settle, stopping", played + 1);
            engine.quit();
            break;
        }

        for notice in engine.take_notices() {
            info!("{notice}");
        }
        let net: i64 = engine.results().iter().map(|r| r.net()).sum();
        debug!(
            "Round {}: bet {bet}, net {net:+}, funds {}, true count {}",
            played + 1,
            engine.funds(),
            engine.true_count()
        );

        peak = peak.max(engine.funds());
        played += 1;
        if engine.next_round().is_err() {
            break;
        }
    }

    let stats = *engine.stats();
    let hands = stats.wins + stats.losses + stats.pushes + stats.blackjacks + stats.busts;
    let net = engine.funds() as i64 - rules.starting_funds as i64;

    println!("Rounds played:  {played}");
    println!("Hands settled:  {hands}");
    println!("  Wins:         {}", stats.wins + stats.blackjacks);
    println!("  Blackjacks:   {}", stats.blackjacks);
    println!("  Pushes:       {}", stats.pushes);
    println!("  Losses:       {}", stats.losses);
    println!("  Busts:        {}", stats.busts);
    println!("Final funds:    {}", engine.funds());
    println!("Peak funds:     {peak}");
    println!("Net result:     {net:+}");
    if hands > 0 {
        let lost = stats.losses + stats.busts;
        println!("Loss rate:      {:.2}%", lost as f64 * 100.0 / hands as f64);
    }
    if engine.funds() < rules.min_bet {
        println!("Result: Bankroll exhausted");
    }
}
