use battle_engine::api::{
    BattleConfig, Outcome, ScriptedAction, Setup, load_player, run_battle, simulate_battle,
    simulate_many,
};
use battle_engine::{
    AbilityCatalog, Autopilot, Combatant, EnemyTier, ItemCatalog, MemoryStore, Player,
    PlayerAction, PlayerStore,
};

fn config(level: u32, tier: EnemyTier, seed: u64) -> BattleConfig {
    BattleConfig {
        player_level: level,
        enemy_tier: Some(tier),
        seed: Some(seed),
        ..BattleConfig::default()
    }
}

#[test]
fn veteran_beats_a_weak_enemy() {
    let summary = simulate_battle(&config(20, EnemyTier::Weak, 7)).unwrap();
    assert_eq!(summary.outcome, Outcome::PlayerWon);
    assert_eq!(summary.winner.as_deref(), Some("Hero"));
    assert_eq!(summary.enemy_hp_end, 0);
    assert!((25..=35).contains(&summary.xp_gained));
    assert_eq!(summary.level_before, 20);
    assert!(summary.rounds >= 1);
    assert!(summary.log.last().unwrap().contains("defeated Rogue Genin"));

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["outcome"], "player_won");
}

#[test]
fn same_seed_same_battle() {
    let cfg = config(3, EnemyTier::Strong, 42);
    let a = simulate_battle(&cfg).unwrap();
    let b = simulate_battle(&cfg).unwrap();
    assert_eq!(a.log, b.log);
    assert_eq!(a.outcome, b.outcome);
}

#[test]
fn round_cap_leaves_battle_unfinished() {
    let cfg = BattleConfig { max_rounds: 1, ..config(1, EnemyTier::Boss, 1) };
    let summary = simulate_battle(&cfg).unwrap();
    assert_eq!(summary.outcome, Outcome::Unfinished);
    assert_eq!(summary.rounds, 1);
    assert!(summary.winner.is_none());
    assert_eq!(summary.xp_gained, 0);
}

#[test]
fn refused_script_lines_are_reported_and_skipped() {
    let cfg = BattleConfig {
        script: vec!["ability:Lightning Blade".into(), "guard".into()],
        ..config(1, EnemyTier::Weak, 9)
    };
    let summary = simulate_battle(&cfg).unwrap();
    assert_eq!(summary.refused.len(), 1);
    assert!(summary.refused[0].contains("You haven't learned Lightning Blade"));
    assert!(summary.log[0].contains("braces"));
}

#[test]
fn unknown_script_entries_fail_setup() {
    let cfg = BattleConfig { script: vec!["ability:Rasengan".into()], ..BattleConfig::default() };
    assert!(Setup::from_config(&cfg).is_err());
    let cfg = BattleConfig { script: vec!["dance".into()], ..BattleConfig::default() };
    assert!(Setup::from_config(&cfg).is_err());
}

#[test]
fn scripted_action_parsing() {
    assert_eq!("Attack".parse::<ScriptedAction>().unwrap(), ScriptedAction::Attack);
    assert_eq!("special".parse::<ScriptedAction>().unwrap(), ScriptedAction::Special);
    assert_eq!(
        "ability: Fireball Jutsu".parse::<ScriptedAction>().unwrap(),
        ScriptedAction::Ability("Fireball Jutsu".into())
    );
    assert_eq!(
        "item:Chakra Pill".parse::<ScriptedAction>().unwrap(),
        ScriptedAction::Item("Chakra Pill".into())
    );
    assert!("spell:Fire".parse::<ScriptedAction>().is_err());

    let catalog = AbilityCatalog::builtin();
    assert_eq!(
        ScriptedAction::Special.to_action(&catalog).unwrap(),
        PlayerAction::GenericAbility
    );
}

#[test]
fn config_parses_yaml_and_json() {
    let yaml = "player_level: 3\nenemy: mist_chunin\nseed: 1\nscript: [attack, guard]\n";
    let cfg = BattleConfig::parse(yaml, true).unwrap();
    assert_eq!(cfg.player_level, 3);
    assert_eq!(cfg.enemy.as_deref(), Some("mist_chunin"));
    assert_eq!(cfg.script.len(), 2);
    assert_eq!(cfg.max_rounds, 100);
    assert_eq!(cfg.player_name, "Hero");

    let cfg = BattleConfig::parse(r#"{"enemy_tier": "boss"}"#, false).unwrap();
    assert_eq!(cfg.enemy_tier, Some(EnemyTier::Boss));
    assert_eq!(cfg.player_level, 1);
}

#[test]
fn roster_enemy_scales_with_player() {
    let cfg = BattleConfig {
        player_level: 4,
        enemy: Some("mist_chunin".into()),
        ..BattleConfig::default()
    };
    let setup = Setup::from_config(&cfg).unwrap();
    assert_eq!(setup.enemy.name, "Mist Chunin");
    assert_eq!(setup.enemy.health().max(), 120 + 3 * 12);
    assert_eq!(setup.player.level(), 4);

    let missing = BattleConfig { enemy: Some("nobody".into()), ..BattleConfig::default() };
    assert!(Setup::from_config(&missing).is_err());
}

#[test]
fn accepted_actions_are_saved() {
    let cfg = config(20, EnemyTier::Weak, 3);
    let setup = Setup::from_config(&cfg).unwrap();
    let mut store = MemoryStore::default();
    let (summary, player) = run_battle(setup, &cfg, Some(&mut store as &mut dyn PlayerStore)).unwrap();
    assert_eq!(summary.outcome, Outcome::PlayerWon);
    assert_eq!(store.load("player").unwrap(), player);
}

#[test]
fn saved_player_starts_the_next_battle_refilled() {
    let catalog = AbilityCatalog::builtin();
    let mut store = MemoryStore::default();
    let mut beaten = Player::at_level("hero", "Hero", 20, &catalog, &ItemCatalog::builtin());
    beaten.health_mut().set(0);
    beaten.energy_mut().set(0);
    store.save(&beaten).unwrap();

    let cfg = config(20, EnemyTier::Weak, 7);
    let setup = Setup::from_config(&cfg).unwrap().with_player(store.load("hero").unwrap());
    let (summary, player) = run_battle(setup, &cfg, Some(&mut store as &mut dyn PlayerStore)).unwrap();

    assert_eq!(summary.outcome, Outcome::PlayerWon);
    assert!(summary.rounds >= 1);
    assert!(summary.log[0].starts_with("[R1] Hero"));
    assert!(summary.log.iter().all(|line| !line.contains("has been defeated")));
    assert!(player.is_alive());
    assert_eq!(store.load("hero").unwrap(), player);
}

#[test]
fn files_with_a_byte_order_mark_load() {
    let dir = tempfile::tempdir().unwrap();

    let cfg_path = dir.path().join("battle.json");
    std::fs::write(&cfg_path, "\u{feff}{\"player_level\": 3, \"enemy_tier\": \"strong\"}").unwrap();
    let cfg = BattleConfig::load(&cfg_path).unwrap();
    assert_eq!(cfg.player_level, 3);
    assert_eq!(cfg.enemy_tier, Some(EnemyTier::Strong));

    let yaml_path = dir.path().join("battle.yml");
    std::fs::write(&yaml_path, "\u{feff}player_level: 4\n").unwrap();
    assert_eq!(BattleConfig::load(&yaml_path).unwrap().player_level, 4);

    // UTF-16LE save referenced from a config
    let saved = Player::at_level("kiba", "Kiba", 5, &AbilityCatalog::builtin(), &ItemCatalog::builtin());
    let json = serde_json::to_string(&saved).unwrap();
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(json.encode_utf16().flat_map(u16::to_le_bytes));
    let player_path = dir.path().join("kiba.json");
    std::fs::write(&player_path, bytes).unwrap();

    let cfg = BattleConfig {
        player_path: Some(player_path.to_string_lossy().into_owned()),
        ..BattleConfig::default()
    };
    let setup = Setup::from_config(&cfg).unwrap();
    assert_eq!(setup.player, saved);
    assert_eq!(load_player(&player_path, &AbilityCatalog::builtin()).unwrap(), saved);
}

#[test]
fn simulate_writes_save_dir() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = BattleConfig {
        save_dir: Some(dir.path().to_string_lossy().into_owned()),
        ..config(20, EnemyTier::Weak, 5)
    };
    simulate_battle(&cfg).unwrap();
    assert!(dir.path().join("player.json").exists());
}

#[test]
fn many_trials_add_up() {
    let stats = simulate_many(&config(20, EnemyTier::Weak, 1), 20).unwrap();
    assert_eq!(stats.samples, 20);
    assert_eq!(stats.player_wins, 20);
    assert_eq!(stats.player_wins + stats.enemy_wins + stats.unfinished, 20);
    assert!(stats.avg_xp >= 25.0 && stats.avg_xp <= 35.0);
    assert!(stats.avg_rounds >= 1.0);
}

#[test]
fn autopilot_priorities() {
    let catalog = AbilityCatalog::builtin();
    let items = ItemCatalog::builtin();
    let pilot = Autopilot::default();

    let mut p = Player::new("p1", "Hero", &catalog, &items);
    assert_eq!(pilot.choose(&p), PlayerAction::ability(catalog.get("Fireball Jutsu").cloned().unwrap()));

    p.health_mut().set(30);
    assert_eq!(pilot.choose(&p), PlayerAction::item("Healing Potion"));

    p.health_mut().set(100);
    p.energy_mut().set(5);
    assert_eq!(pilot.choose(&p), PlayerAction::item("Chakra Pill"));

    p.inventory_mut().remove_item("Chakra Pill", 2);
    assert_eq!(pilot.choose(&p), PlayerAction::Attack);

    let veteran = Player::at_level("p2", "Hero", 10, &catalog, &items);
    match pilot.choose(&veteran) {
        PlayerAction::NamedAbility(Some(a)) => assert_eq!(a.name, "Spiraling Sphere"),
        other => panic!("unexpected {other:?}"),
    }
}
