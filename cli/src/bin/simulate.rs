use battle_cli::init_tracing;
use battle_engine::api::{simulate_many, BattleConfig};
use battle_engine::EnemyTier;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "simulate")]
#[command(about = "Monte Carlo sim: many autopiloted battles against one enemy")]
struct Args {
    /// Optional battle config (JSON or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// Player level for a fresh character
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Enemy tier: weak | strong | boss
    #[arg(long, default_value = "weak")]
    tier: String,

    /// Enemy roster id (overrides --tier)
    #[arg(long)]
    enemy: Option<String>,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Safety cap on rounds per trial
    #[arg(long, default_value_t = 100)]
    max_rounds: u32,
}

fn to_tier(s: &str) -> anyhow::Result<EnemyTier> {
    match s.to_lowercase().as_str() {
        "weak" => Ok(EnemyTier::Weak),
        "strong" => Ok(EnemyTier::Strong),
        "boss" => Ok(EnemyTier::Boss),
        other => anyhow::bail!("unknown tier '{}'", other),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => BattleConfig::load(path)?,
        None => BattleConfig::default(),
    };
    cfg.player_level = args.level;
    cfg.enemy_tier = Some(to_tier(&args.tier)?);
    if args.enemy.is_some() {
        cfg.enemy = args.enemy.clone();
    }
    cfg.seed = Some(args.seed);
    cfg.max_rounds = args.max_rounds;
    // trials never write save files
    cfg.save_dir = None;

    let stats = simulate_many(&cfg, args.trials)?;
    let samples = stats.samples.max(1) as f64;

    println!("simulate results");
    println!("----------------");
    println!("trials:             {}", stats.samples);
    println!("player level:       {}", cfg.player_level);
    println!(
        "enemy:              {}",
        cfg.enemy.as_deref().unwrap_or(args.tier.as_str())
    );
    println!();
    println!("win rate:           {:.1}%", stats.player_wins as f64 / samples * 100.0);
    println!("loss rate:          {:.1}%", stats.enemy_wins as f64 / samples * 100.0);
    println!("unfinished:         {}", stats.unfinished);
    println!("avg rounds:         {:.2}", stats.avg_rounds);
    println!("avg xp:             {:.2}", stats.avg_xp);

    Ok(())
}
