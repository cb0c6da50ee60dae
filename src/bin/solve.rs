//! Train a game and write its average-strategy table as JSON.
//!
//! Usage:
//!   cargo run --release --bin solve -- [OPTIONS]
//!
//! Options:
//!   --game <NAME>         kuhn (default), holdem or rps
//!   --iterations <N>      Training iterations (default: 10000)
//!   --threads <N>         Number of threads (default: auto, 1 = deterministic)
//!   --seed <N>            Random seed (optional)
//!   --config <FILE>       Hold'em table configuration JSON (optional)
//!   --small               Use the small hold'em table
//!   --cfr-plus            Floor regrets at zero (CFR+)
//!   --linear              Linear strategy averaging
//!   --time-budget <SECS>  Stop after this many seconds
//!   --output <FILE>       Output file (default: stdout)
//!   --play <N>            After hold'em training, play N hands against a
//!                         default-style bot
//!
//! Set `RUST_LOG=debug` for periodic convergence reports.

use std::env;
use std::fs;
use std::process;

use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use holdem_cfr::cfr::{CFRConfig, CFRSolver, Game, StrategyTable};
use holdem_cfr::games::holdem::{
    BotStyle, HeadsUpHoldem, HeadsUpMatch, HoldemConfig, TrainedPolicy,
};
use holdem_cfr::games::kuhn::KuhnPoker;
use holdem_cfr::games::rps::{exploitability, RpsTrainer};

struct Args {
    game: String,
    iterations: u64,
    cfr: CFRConfig,
    holdem_config: Option<String>,
    small: bool,
    output: Option<String>,
    play: u64,
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Some(args) => args,
        None => return,
    };
    if let Err(e) = args.cfr.validate() {
        error!("invalid solver configuration: {}", e);
        process::exit(2);
    }

    let table = match args.game.as_str() {
        "kuhn" => {
            let solver = train(KuhnPoker::new(), &args);
            let value: f64 = KuhnPoker::deals()
                .iter()
                .map(|deal| solver.expected_value(deal, 0))
                .sum::<f64>()
                / 6.0;
            info!("player 0 game value {:.4} (equilibrium -0.0556)", value);
            solver.strategy_table()
        }
        "holdem" => {
            let config = match holdem_config(&args) {
                Ok(config) => config,
                Err(e) => {
                    error!("invalid hold'em configuration: {}", e);
                    process::exit(2);
                }
            };
            let solver = train(HeadsUpHoldem::new(config.clone()), &args);
            let table = solver.strategy_table();
            if args.play > 0 {
                play_match(&config, table.clone(), args.play, args.cfr.seed);
            }
            table
        }
        "rps" => {
            let mut trainer = RpsTrainer::new(args.cfr.seed);
            trainer.train(args.iterations);
            info!(
                "player 0 exploitability {:.4}",
                exploitability(&trainer.average_strategy(0))
            );
            trainer.strategy_table()
        }
        other => {
            error!("unknown game: {}", other);
            print_help();
            process::exit(2);
        }
    };

    write_table(&table, args.output.as_deref());
}

fn train<G: Game>(game: G, args: &Args) -> CFRSolver<G> {
    let mut solver = CFRSolver::new(game, args.cfr.clone());

    let pb = ProgressBar::new(args.iterations);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let stats = solver.train_with_callback(args.iterations, args.cfr.report_interval, |stats| {
        pb.set_position(stats.iterations);
        pb.set_message(format!(
            "{} info sets, {:.0} it/s",
            stats.info_sets, stats.iterations_per_second
        ));
    });
    pb.finish_and_clear();

    info!(
        "{} iterations, {} info sets, {:.2}s{}",
        stats.iterations,
        stats.info_sets,
        stats.elapsed_seconds,
        if stats.cancelled { " (time budget reached)" } else { "" }
    );
    if let Some(indicator) = stats.last_indicator() {
        info!("final convergence indicator {:.4}", indicator);
    }
    solver
}

fn holdem_config(args: &Args) -> Result<HoldemConfig, holdem_cfr::cfr::ConfigError> {
    if let Some(path) = &args.holdem_config {
        return HoldemConfig::from_file(path);
    }
    let config = if args.small {
        HoldemConfig::small()
    } else {
        HoldemConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Seat 0 plays the trained table, seat 1 plays a fixed style.
fn play_match(config: &HoldemConfig, table: StrategyTable, hands: u64, seed: Option<u64>) {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let bots = [
        TrainedPolicy::new(table, config.big_blind),
        TrainedPolicy::new(StrategyTable::new(), config.big_blind).with_style(BotStyle::Optimal),
    ];
    let mut game = HeadsUpMatch::new(config.clone());

    while !game.is_over() && game.hands_played() < hands {
        let mut hand = match game.next_hand(&mut rng) {
            Ok(hand) => hand,
            Err(e) => {
                error!("cannot deal: {}", e);
                return;
            }
        };
        while let Some(seat) = hand.to_act() {
            let action = bots[seat]
                .choose(&hand, &mut rng)
                .and_then(|action| hand.apply(action));
            if let Err(e) = action {
                error!("seat {} could not act: {}", seat, e);
                return;
            }
        }
        match hand.finish() {
            Ok(result) => game.record(&result),
            Err(e) => {
                error!("cannot settle hand: {}", e);
                return;
            }
        }
    }

    let [trained, style] = game.stacks();
    println!(
        "After {} hands: trained bot {} chips, default bot {} chips",
        game.hands_played(),
        trained,
        style
    );
}

fn write_table(table: &StrategyTable, output: Option<&str>) {
    let json = match table.to_json() {
        Ok(json) => json,
        Err(e) => {
            error!("cannot serialize strategy table: {}", e);
            process::exit(1);
        }
    };
    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, json) {
                error!("cannot write {}: {}", path, e);
                process::exit(1);
            }
            info!("wrote {} information sets to {}", table.len(), path);
        }
        None => println!("{}", json),
    }
}

fn parse_args() -> Option<Args> {
    let argv: Vec<String> = env::args().collect();
    let mut args = Args {
        game: "kuhn".to_string(),
        iterations: 10_000,
        cfr: CFRConfig::default(),
        holdem_config: None,
        small: false,
        output: None,
        play: 0,
    };

    let mut i = 1;
    while i < argv.len() {
        let value = argv.get(i + 1);
        match argv[i].as_str() {
            "--game" | "-g" => {
                args.game = value.cloned().unwrap_or_default();
                i += 1;
            }
            "--iterations" | "-i" => {
                args.iterations = value.and_then(|v| v.parse().ok()).unwrap_or(args.iterations);
                i += 1;
            }
            "--threads" | "-t" => {
                if let Some(threads) = value.and_then(|v| v.parse().ok()) {
                    args.cfr = args.cfr.with_threads(threads);
                }
                i += 1;
            }
            "--seed" | "-s" => {
                if let Some(seed) = value.and_then(|v| v.parse().ok()) {
                    args.cfr = args.cfr.with_seed(seed);
                }
                i += 1;
            }
            "--time-budget" => {
                if let Some(secs) = value.and_then(|v| v.parse().ok()) {
                    args.cfr = args.cfr.with_time_budget(secs);
                }
                i += 1;
            }
            "--config" | "-c" => {
                args.holdem_config = value.cloned();
                i += 1;
            }
            "--output" | "-o" => {
                args.output = value.cloned();
                i += 1;
            }
            "--play" => {
                args.play = value.and_then(|v| v.parse().ok()).unwrap_or(0);
                i += 1;
            }
            "--small" => args.small = true,
            "--cfr-plus" => args.cfr = args.cfr.with_cfr_plus(true),
            "--linear" => args.cfr = args.cfr.with_linear_cfr(true),
            "--help" | "-h" => {
                print_help();
                return None;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_help();
                return None;
            }
        }
        i += 1;
    }
    Some(args)
}

fn print_help() {
    println!("Usage: solve [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --game <NAME>         kuhn (default), holdem or rps");
    println!("  --iterations <N>      Training iterations (default: 10000)");
    println!("  --threads <N>         Number of threads (default: auto)");
    println!("  --seed <N>            Random seed");
    println!("  --config <FILE>       Hold'em table configuration JSON");
    println!("  --small               Use the small hold'em table");
    println!("  --cfr-plus            Floor regrets at zero (CFR+)");
    println!("  --linear              Linear strategy averaging");
    println!("  --time-budget <SECS>  Stop after this many seconds");
    println!("  --output <FILE>       Output file (default: stdout)");
    println!("  --play <N>            Play N hands with the trained hold'em table");
    println!("  --help                Show this message");
}
