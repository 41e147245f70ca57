use clap::{Parser, Subcommand, ValueEnum};
use battle_cli::init_tracing;
use battle_engine::api::{load_player, run_battle, BattleConfig, Content, Outcome, Setup};
use battle_engine::store::{JsonFileStore, PlayerStore};
use battle_engine::{experience_to_next_level, EnemyTier, ItemEffect, Player};
use std::path::PathBuf;

#[derive(Copy, Clone, ValueEnum)]
enum Tier {
    Weak,
    Strong,
    Boss,
}

#[derive(Subcommand)]
enum Cmd {
    /// Create a character and print it as JSON
    NewPlayer {
        /// Save-slot id
        #[arg(long, default_value = "player")]
        id: String,
        /// Display name
        #[arg(long, default_value = "Hero")]
        name: String,
        /// Starting level (grown through normal level-ups)
        #[arg(long, default_value_t = 1)]
        level: u32,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
        /// Also save into this directory as <id>.json
        #[arg(long)]
        save_dir: Option<PathBuf>,
    },
    /// List the ability catalog
    Abilities {
        /// Only abilities unlocked at or below this level
        #[arg(long)]
        up_to: Option<u32>,
    },
    /// List the item catalog
    Items,
    /// List the built-in enemy roster
    Roster,
    /// Print the experience curve
    XpTable {
        /// Number of levels to show
        #[arg(long, default_value_t = 10)]
        levels: u32,
    },
    /// Fight one battle: scripted actions first, then the autopilot
    Fight {
        /// Battle config (JSON or YAML); flags below override it
        #[arg(long)]
        config: Option<PathBuf>,
        /// Saved player JSON
        #[arg(long)]
        player: Option<PathBuf>,
        /// Level for a fresh player when --player is absent
        #[arg(long)]
        level: Option<u32>,
        /// Enemy roster id
        #[arg(long)]
        enemy: Option<String>,
        /// Enemy tier when no roster id is given
        #[arg(long, value_enum)]
        tier: Option<Tier>,
        /// RNG seed for determinism
        #[arg(long)]
        seed: Option<u64>,
        /// Comma-separated script: attack, guard, special, ability:<name>, item:<name>
        #[arg(long, value_delimiter = ',')]
        actions: Vec<String>,
        /// Safety cap on rounds
        #[arg(long)]
        max_rounds: Option<u32>,
        /// Save the player here after every accepted action
        #[arg(long)]
        save_dir: Option<PathBuf>,
        /// Print the summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Use an item outside battle and write the player back
    UseItem {
        /// Saved player JSON
        #[arg(long)]
        player: PathBuf,
        /// Item name
        #[arg(long)]
        item: String,
    },
}

#[derive(Parser)]
#[command(name = "battle-cli")]
#[command(about = "Turn-based battle harness")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

fn to_tier(t: Tier) -> EnemyTier {
    match t {
        Tier::Weak => EnemyTier::Weak,
        Tier::Strong => EnemyTier::Strong,
        Tier::Boss => EnemyTier::Boss,
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let content = Content::builtin()?;
    match cli.cmd {
        Cmd::NewPlayer {
            id,
            name,
            level,
            compact,
            save_dir,
        } => {
            let player = Player::at_level(id, name, level, &content.abilities, &content.items);
            if let Some(dir) = save_dir {
                JsonFileStore::open(dir)?.save(&player)?;
            }
            if compact {
                println!("{}", serde_json::to_string(&player)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&player)?);
            }
        }
        Cmd::Abilities { up_to } => {
            for a in content.abilities.iter() {
                if up_to.is_some_and(|lvl| a.unlock_level > lvl) {
                    continue;
                }
                println!(
                    "L{:<3} {:<22} cost={:<3} dmg={}-{} [{:?}]",
                    a.unlock_level, a.name, a.cost, a.min_damage, a.max_damage, a.category
                );
            }
        }
        Cmd::Items => {
            for item in content.items.iter() {
                let effect = match item.effect {
                    ItemEffect::Heal { amount } => format!("heal {}", amount),
                    ItemEffect::RestoreEnergy { amount } => format!("restore {} chakra", amount),
                    ItemEffect::Buff { target, amount } => format!("+{} {:?}", amount, target),
                };
                println!(
                    "{:<24} {:<20} battle={} field={}",
                    item.name, effect, item.usable_in_battle, item.usable_outside_battle
                );
            }
        }
        Cmd::Roster => {
            for t in content.roster.iter() {
                println!(
                    "{:<16} {:<16} {:?} hp={} power={} resilience={}",
                    t.id, t.name, t.tier, t.stats.max_health, t.stats.power, t.stats.resilience
                );
            }
        }
        Cmd::XpTable { levels } => {
            for level in 1..=levels {
                println!("{:>3} {:>6}", level, experience_to_next_level(level));
            }
        }
        Cmd::Fight {
            config,
            player,
            level,
            enemy,
            tier,
            seed,
            actions,
            max_rounds,
            save_dir,
            json,
        } => {
            let mut cfg = match &config {
                Some(path) => BattleConfig::load(path)?,
                None => BattleConfig::default(),
            };
            if let Some(level) = level {
                cfg.player_level = level;
            }
            if enemy.is_some() {
                cfg.enemy = enemy;
            }
            if let Some(t) = tier {
                cfg.enemy_tier = Some(to_tier(t));
            }
            if seed.is_some() {
                cfg.seed = seed;
            }
            if !actions.is_empty() {
                cfg.script = actions;
            }
            if let Some(max) = max_rounds {
                cfg.max_rounds = max;
            }

            let loaded = match &player {
                Some(path) => Some(load_player(path, &content.abilities)?),
                None => None,
            };
            if let Some(p) = &loaded {
                cfg.player_path = None;
                cfg.player_level = p.level();
            }
            let mut setup = Setup::from_config(&cfg)?;
            if let Some(p) = loaded {
                setup = setup.with_player(p);
            }

            let mut store = match save_dir {
                Some(dir) => Some(JsonFileStore::open(dir)?),
                None => None,
            };
            let (summary, _) = run_battle(
                setup,
                &cfg,
                store.as_mut().map(|s| s as &mut dyn PlayerStore),
            )?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                for line in &summary.log {
                    println!("{}", line);
                }
                for line in &summary.refused {
                    println!("refused: {}", line);
                }
                let verdict = match summary.outcome {
                    Outcome::PlayerWon => "victory",
                    Outcome::EnemyWon => "defeat",
                    Outcome::Unfinished => "unfinished",
                };
                println!(
                    "[END] {} rounds={} player_hp={} enemy_hp={} xp={} level {}→{}",
                    verdict,
                    summary.rounds,
                    summary.player_hp_end,
                    summary.enemy_hp_end,
                    summary.xp_gained,
                    summary.level_before,
                    summary.level_after
                );
            }
        }
        Cmd::UseItem { player, item } => {
            let mut p = load_player(&player, &content.abilities)?;
            match p.use_item_outside_battle(&item) {
                Ok(message) => {
                    std::fs::write(&player, serde_json::to_string_pretty(&p)?)?;
                    println!("{}", message);
                }
                Err(reason) => anyhow::bail!("{}", reason),
            }
        }
    }
    Ok(())
}
