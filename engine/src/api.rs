use std::{fs, path::Path, str::FromStr};

use anyhow::{Context, Result, anyhow, bail};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::abilities::AbilityCatalog;
use crate::autopilot::Autopilot;
use crate::character::{Combatant, Enemy, EnemyTier, Player};
use crate::combat::{BattleEngine, PlayerAction};
use crate::content::EnemyRoster;
use crate::items::ItemCatalog;
use crate::store::{JsonFileStore, PlayerStore};
use crate::Dice;

const DEFAULT_MAX_ROUNDS: u32 = 100;
const DEFAULT_PLAYER_ID: &str = "player";

fn default_player_name() -> String {
    "Hero".to_string()
}

fn default_level() -> u32 {
    1
}

fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BattleConfig {
    /// Saved player JSON; a fresh character is built when absent.
    #[serde(default)]
    pub player_path: Option<String>,
    #[serde(default = "default_player_name")]
    pub player_name: String,
    #[serde(default = "default_level")]
    pub player_level: u32,
    /// Roster id; takes precedence over `enemy_tier`.
    #[serde(default)]
    pub enemy: Option<String>,
    #[serde(default)]
    pub enemy_tier: Option<EnemyTier>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Actions played before the autopilot takes over, e.g. `attack`, `ability:Fireball Jutsu`.
    #[serde(default)]
    pub script: Vec<String>,
    #[serde(default)]
    pub abilities_path: Option<String>,
    #[serde(default)]
    pub items_path: Option<String>,
    #[serde(default)]
    pub roster_path: Option<String>,
    /// Directory for a [`JsonFileStore`]; the player is saved after every accepted action.
    #[serde(default)]
    pub save_dir: Option<String>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            player_path: None,
            player_name: default_player_name(),
            player_level: default_level(),
            enemy: None,
            enemy_tier: None,
            seed: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
            script: Vec::new(),
            abilities_path: None,
            items_path: None,
            roster_path: None,
            save_dir: None,
        }
    }
}

impl BattleConfig {
    /// Reads JSON, or YAML when the file ends in `.yaml`/`.yml`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = read_text(path)?;
        Self::parse(&text, is_yaml(path))
            .with_context(|| format!("failed to parse battle config: {}", path.display()))
    }

    pub fn parse(text: &str, yaml: bool) -> Result<Self> {
        Ok(if yaml { serde_yaml::from_str(text)? } else { serde_json::from_str(text)? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    PlayerWon,
    EnemyWon,
    Unfinished,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BattleSummary {
    pub outcome: Outcome,
    pub winner: Option<String>,
    pub rounds: u32,
    pub player_hp_end: i32,
    pub enemy_hp_end: i32,
    pub xp_gained: u32,
    pub level_before: u32,
    pub level_after: u32,
    pub refused: Vec<String>,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationStats {
    pub samples: u32,
    pub player_wins: u32,
    pub enemy_wins: u32,
    pub unfinished: u32,
    pub avg_rounds: f64,
    pub avg_xp: f64,
}

/// Catalogs and roster for one run.
#[derive(Debug, Clone)]
pub struct Content {
    pub abilities: AbilityCatalog,
    pub items: ItemCatalog,
    pub roster: EnemyRoster,
}

impl Content {
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            abilities: AbilityCatalog::builtin(),
            items: ItemCatalog::builtin(),
            roster: EnemyRoster::builtin().context("built-in enemy roster is invalid")?,
        })
    }

    pub fn from_config(cfg: &BattleConfig) -> Result<Self> {
        let mut content = Self::builtin()?;
        if let Some(path) = &cfg.abilities_path {
            content.abilities = AbilityCatalog::from_yaml(&read_text(path)?)
                .with_context(|| format!("failed to load abilities: {}", path))?;
        }
        if let Some(path) = &cfg.items_path {
            content.items = ItemCatalog::from_yaml(&read_text(path)?)
                .with_context(|| format!("failed to load items: {}", path))?;
        }
        if let Some(path) = &cfg.roster_path {
            content.roster = EnemyRoster::from_yaml(&read_text(path)?)
                .with_context(|| format!("failed to load enemy roster: {}", path))?;
        }
        Ok(content)
    }
}

/// One line of a battle script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedAction {
    Attack,
    Guard,
    Special,
    Ability(String),
    Item(String),
}

impl FromStr for ScriptedAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((kind, arg)) = s.split_once(':') {
            let arg = arg.trim().to_string();
            return match kind.trim().to_lowercase().as_str() {
                "ability" => Ok(ScriptedAction::Ability(arg)),
                "item" => Ok(ScriptedAction::Item(arg)),
                other => bail!("unknown scripted action '{}'", other),
            };
        }
        match s.to_lowercase().as_str() {
            "attack" => Ok(ScriptedAction::Attack),
            "guard" => Ok(ScriptedAction::Guard),
            "special" => Ok(ScriptedAction::Special),
            other => bail!("unknown scripted action '{}'", other),
        }
    }
}

impl ScriptedAction {
    pub fn to_action(&self, catalog: &AbilityCatalog) -> Result<PlayerAction> {
        Ok(match self {
            ScriptedAction::Attack => PlayerAction::Attack,
            ScriptedAction::Guard => PlayerAction::Guard,
            ScriptedAction::Special => PlayerAction::GenericAbility,
            ScriptedAction::Ability(name) => {
                let ability = catalog
                    .get(name)
                    .ok_or_else(|| anyhow!("ability '{}' not found", name))?;
                PlayerAction::ability(ability.clone())
            }
            ScriptedAction::Item(name) => PlayerAction::item(name.clone()),
        })
    }
}

/// Everything a battle needs, resolved from a config.
#[derive(Debug, Clone)]
pub struct Setup {
    pub content: Content,
    pub player: Player,
    pub enemy: Enemy,
    pub script: Vec<PlayerAction>,
}

impl Setup {
    pub fn from_config(cfg: &BattleConfig) -> Result<Self> {
        let content = Content::from_config(cfg)?;
        let player = match &cfg.player_path {
            Some(path) => load_player(path, &content.abilities)?,
            None => Player::at_level(
                DEFAULT_PLAYER_ID,
                cfg.player_name.clone(),
                cfg.player_level,
                &content.abilities,
                &content.items,
            ),
        };
        let enemy = pick_enemy(cfg, &content.roster, player.level())?;
        let script = cfg
            .script
            .iter()
            .map(|line| line.parse::<ScriptedAction>()?.to_action(&content.abilities))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { content, player, enemy, script })
    }

    pub fn with_player(mut self, player: Player) -> Self {
        self.player = player;
        self
    }
}

/// Loads a saved player and grants any abilities its level entitles it to.
pub fn load_player(path: impl AsRef<Path>, catalog: &AbilityCatalog) -> Result<Player> {
    let path = path.as_ref();
    let text = read_text(path)?;
    let mut player: Player = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse player JSON: {}", path.display()))?;
    player.backfill_abilities(catalog);
    Ok(player)
}

fn pick_enemy(cfg: &BattleConfig, roster: &EnemyRoster, level: u32) -> Result<Enemy> {
    if let Some(id) = &cfg.enemy {
        let template = roster.get(id).ok_or_else(|| anyhow!("enemy '{}' not found", id))?;
        return Ok(template.spawn(level));
    }
    let tier = cfg.enemy_tier.unwrap_or(EnemyTier::Weak);
    Ok(match roster.first_of_tier(tier) {
        Some(template) => template.spawn(level),
        None => Enemy::from_tier(format!("{:?} Enemy", tier), tier),
    })
}

/// Plays the script, then lets the autopilot finish. Stops after `max_rounds`.
pub fn run_battle(
    setup: Setup,
    cfg: &BattleConfig,
    mut store: Option<&mut dyn PlayerStore>,
) -> Result<(BattleSummary, Player)> {
    let dice = cfg.seed.map(Dice::from_seed).unwrap_or_else(Dice::from_entropy);
    let Setup { content, mut player, mut enemy, script } = setup;
    // a saved player may have ended its last battle on 0 hp
    player.reset();
    enemy.reset();
    let level_before = player.level();
    let mut engine = BattleEngine::with_dice(player, enemy, dice).with_catalog(content.abilities);
    let autopilot = Autopilot::default();
    let mut script = script.into_iter();
    let mut refused = Vec::new();

    while !engine.is_battle_over() && engine.current_round() <= cfg.max_rounds {
        let (action, scripted) = match script.next() {
            Some(action) => (action, true),
            None => (autopilot.choose(engine.player()), false),
        };
        let mut record = engine.submit_player_action(action);
        if !record.success {
            debug!(message = %record.message, scripted, "action refused");
            refused.push(format!("[R{}] {}", record.round, record.message));
            if scripted {
                continue;
            }
            record = engine.submit_player_action(PlayerAction::Attack);
            if !record.success {
                bail!("battle stalled: {}", record.message);
            }
        }
        if let Some(store) = store.as_mut() {
            store.save(engine.player()).context("failed to save player")?;
        }
    }

    let outcome = match engine.winner_name() {
        Some(name) if name == engine.player().name => Outcome::PlayerWon,
        Some(_) => Outcome::EnemyWon,
        None => Outcome::Unfinished,
    };
    let rounds = match outcome {
        Outcome::PlayerWon => engine.current_round(),
        _ => engine.current_round() - 1,
    };
    let summary = BattleSummary {
        outcome,
        winner: engine.winner_name().map(str::to_string),
        rounds,
        player_hp_end: engine.player().health().current(),
        enemy_hp_end: engine.enemy().health().current(),
        xp_gained: engine.reward().map_or(0, |r| r.amount),
        level_before,
        level_after: engine.player().level(),
        refused,
        log: engine.log().render(),
    };
    Ok((summary, engine.into_player()))
}

pub fn simulate_battle(cfg: &BattleConfig) -> Result<BattleSummary> {
    let setup = Setup::from_config(cfg)?;
    let mut file_store = match &cfg.save_dir {
        Some(dir) => Some(
            JsonFileStore::open(dir).with_context(|| format!("failed to open save dir: {}", dir))?,
        ),
        None => None,
    };
    let store = file_store.as_mut().map(|s| s as &mut dyn PlayerStore);
    let (summary, _) = run_battle(setup, cfg, store)?;
    Ok(summary)
}

/// Runs `samples` independent battles; trial `i` uses seed `seed + i` when a seed is set.
pub fn simulate_many(cfg: &BattleConfig, samples: u32) -> Result<SimulationStats> {
    let base = Setup::from_config(cfg)?;
    let mut stats = SimulationStats { samples, ..Default::default() };
    let mut total_rounds = 0u64;
    let mut total_xp = 0u64;

    for i in 0..samples {
        let trial_cfg = BattleConfig {
            seed: cfg.seed.map(|s| s.wrapping_add(i as u64)),
            ..cfg.clone()
        };
        let (summary, _) = run_battle(base.clone(), &trial_cfg, None)?;
        match summary.outcome {
            Outcome::PlayerWon => stats.player_wins += 1,
            Outcome::EnemyWon => stats.enemy_wins += 1,
            Outcome::Unfinished => stats.unfinished += 1,
        }
        total_rounds += summary.rounds as u64;
        total_xp += summary.xp_gained as u64;
    }

    if samples > 0 {
        stats.avg_rounds = total_rounds as f64 / samples as f64;
        stats.avg_xp = total_xp as f64 / samples as f64;
    }
    Ok(stats)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

/// Reads a text file, honouring a UTF-8/UTF-16 BOM if one is present.
fn read_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    match Encoding::for_bom(&bytes) {
        Some((enc, bom_len)) => Ok(enc.decode_without_bom_handling(&bytes[bom_len..]).0.into_owned()),
        None => String::from_utf8(bytes)
            .with_context(|| format!("{} is not valid UTF-8", path.display())),
    }
}
