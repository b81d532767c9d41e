//! MTGA Weights - command line front end
//!
//! Scores a pasted deck list against the configured weight tables.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use mtga_weights::{logging, DeckScore, FormatVariant, WeightsCalculator, WeightsConfig};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

#[derive(Parser)]
#[command(name = "mtgaw")]
#[command(about = "MTGA Weights - deck weight calculator", long_about = None)]
struct Cli {
    /// Config file (default: $MTGA_WEIGHTS_CONFIG or config/weights.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log output (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a deck list
    Score {
        /// Deck list file (reads stdin when omitted or "-")
        #[arg(value_name = "DECK_FILE")]
        deck: Option<PathBuf>,

        /// Format variant (historic/hb, standard/sb)
        #[arg(long, short, default_value = "historic")]
        format: FormatVariant,

        /// Print the score as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every known card name
    Names,

    /// Load every configured table and report its size
    Check,
}

fn load_config(path: Option<&Path>) -> Result<WeightsConfig> {
    match path {
        Some(path) => {
            let mut config = WeightsConfig::from_file(path)
                .with_context(|| format!("reading config from {}", path.display()))?;
            config.apply_env_overrides();
            Ok(config)
        }
        None => WeightsConfig::load().context("loading config"),
    }
}

async fn read_deck(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading deck from {}", path.display())),
        _ => {
            let mut deck = String::new();
            tokio::io::stdin()
                .read_to_string(&mut deck)
                .await
                .context("reading deck from stdin")?;
            Ok(deck)
        }
    }
}

fn print_score(score: &DeckScore) {
    let name_width = score
        .cards
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    println!("{:>3}  {:<name_width$}  {:>6}  {:>6}", "Qty", "Card", "Each", "Total");
    for card in &score.cards {
        let marker = if card.is_commander { " (commander)" } else { "" };
        println!(
            "{:>3}  {:<name_width$}  {:>6}  {:>6}{marker}",
            card.quantity, card.name, card.unit_weight, card.total_weight
        );
    }
    println!("\nTotal weight: {}", score.total_weight);
}

async fn run_score(
    calculator: &WeightsCalculator,
    deck: Option<PathBuf>,
    format: FormatVariant,
    json: bool,
) -> Result<()> {
    let raw = read_deck(deck.as_deref()).await?;
    let score = calculator.parse_and_score(&raw, format).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&score)?);
    } else {
        print_score(&score);
    }
    Ok(())
}

async fn run_names(calculator: &WeightsCalculator) -> Result<()> {
    for name in calculator.list_known_card_names().await? {
        println!("{name}");
    }
    Ok(())
}

async fn run_check(calculator: &WeightsCalculator) -> Result<()> {
    let start = std::time::Instant::now();
    let loaded = calculator.cache().load_all().await?;
    for (table_id, records) in &loaded {
        println!("{table_id}: {records} cards");
    }
    eprintln!("  (Loading time: {:.2}ms)", start.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let calculator = WeightsCalculator::from_config(&config)?;

    match cli.command {
        Commands::Score { deck, format, json } => run_score(&calculator, deck, format, json).await?,
        Commands::Names => run_names(&calculator).await?,
        Commands::Check => run_check(&calculator).await?,
    }

    Ok(())
}
