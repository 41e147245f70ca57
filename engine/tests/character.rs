use battle_engine::{
    AbilityCatalog, BuffTarget, Combatant, Dice, Enemy, EnemyStats, EnemyTier, ItemCatalog, Player,
    Pool,
};
use proptest::prelude::*;

fn hero() -> Player {
    Player::new("p1", "Hero", &AbilityCatalog::builtin(), &ItemCatalog::builtin())
}

#[test]
fn new_player_starts_full_with_kit() {
    let p = hero();
    assert_eq!(p.level(), 1);
    assert_eq!(p.health().current(), 100);
    assert_eq!(p.energy().current(), 50);
    assert_eq!(p.power(), 10);
    assert_eq!(p.resilience(), 5);
    assert!(p.knows("Fireball Jutsu"));
    assert_eq!(p.unlocked_abilities().len(), 1);
    assert_eq!(p.inventory().quantity("Healing Potion"), 3);
    assert_eq!(p.inventory().quantity("Chakra Pill"), 2);
}

#[test]
fn attack_damage_spans_half_to_full_power() {
    let p = hero();
    let mut low = Dice::from_scripted(vec![0]);
    let mut high = Dice::from_scripted(vec![99]);
    assert_eq!(p.calculate_attack_damage(&mut low), 5);
    assert_eq!(p.calculate_attack_damage(&mut high), 10);
}

#[test]
fn power_buff_feeds_attack_damage() {
    let mut p = hero();
    p.add_buff(BuffTarget::Power, 4);
    let mut dice = Dice::from_scripted(vec![0]);
    // effective power 14 -> base 7
    assert_eq!(p.calculate_attack_damage(&mut dice), 7);
}

#[test]
fn take_damage_subtracts_half_resilience() {
    let mut enemy = Enemy::from_tier("Bandit", EnemyTier::Weak);
    assert_eq!(enemy.take_damage(9), 8);
    assert_eq!(enemy.health().current(), 52);
}

#[test]
fn fully_absorbed_hit_deals_zero() {
    let mut p = hero();
    p.add_buff(BuffTarget::Resilience, 5);
    // reduction (5 + 5) / 2 = 5
    assert_eq!(p.take_damage(4), 0);
    assert_eq!(p.health().current(), 100);
}

#[test]
fn consume_energy_is_all_or_nothing() {
    let mut p = hero();
    p.energy_mut().set(10);
    assert!(!p.consume_energy(20));
    assert_eq!(p.energy().current(), 10);
    assert!(p.consume_energy(10));
    assert_eq!(p.energy().current(), 0);
}

#[test]
fn heal_and_restore_clamp_to_max() {
    let mut p = hero();
    p.health_mut().set(90);
    assert_eq!(p.heal(30), 10);
    assert_eq!(p.health().current(), 100);
    p.energy_mut().set(45);
    assert_eq!(p.restore_energy(25), 5);
    assert_eq!(p.energy().current(), 50);
}

#[test]
fn reset_refills_and_clears_flags() {
    let mut p = hero();
    p.take_damage(40);
    p.consume_energy(30);
    p.set_guarding(true);
    p.add_buff(BuffTarget::Power, 5);
    p.add_buff(BuffTarget::Resilience, 5);
    p.reset();
    assert!(p.health().is_full());
    assert!(p.energy().is_full());
    assert!(!p.is_guarding());
    assert_eq!(p.power_buff(), 0);
    assert_eq!(p.resilience_buff(), 0);
}

#[test]
fn enemy_has_tier_base_stats() {
    let boss = Enemy::from_tier("Rogue Jonin", EnemyTier::Boss);
    assert_eq!(boss.id, "rogue_jonin");
    assert_eq!(boss.health().max(), 250);
    assert_eq!(boss.power(), 20);
    assert_eq!(boss.resilience(), 10);
    assert_eq!(boss.power_buff(), 0);
}

#[test]
fn pool_rejects_out_of_bounds_records() {
    let ok: Pool = serde_json::from_str(r#"{"current":3,"max":5}"#).unwrap();
    assert_eq!(ok.current(), 3);
    assert!(serde_json::from_str::<Pool>(r#"{"current":6,"max":5}"#).is_err());
    assert!(serde_json::from_str::<Pool>(r#"{"current":-1,"max":5}"#).is_err());
}

#[derive(Debug, Clone)]
enum Op {
    Damage(i32),
    Heal(i32),
    Spend(i32),
    Restore(i32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..200i32).prop_map(Op::Damage),
        (0..200i32).prop_map(Op::Heal),
        (0..80i32).prop_map(Op::Spend),
        (0..80i32).prop_map(Op::Restore),
    ]
}

proptest! {
    #[test]
    fn resources_stay_in_bounds(ops in proptest::collection::vec(op(), 0..60)) {
        let mut p = hero();
        let mut e = Enemy::new("dummy", "Dummy", EnemyTier::Strong, EnemyStats { max_health: 80, power: 5, resilience: 3 });
        for op in ops {
            match op {
                Op::Damage(d) => { p.take_damage(d); e.take_damage(d); }
                Op::Heal(h) => { p.heal(h); e.heal(h); }
                Op::Spend(s) => { p.consume_energy(s); }
                Op::Restore(r) => { p.restore_energy(r); }
            }
            prop_assert!(p.health().current() >= 0 && p.health().current() <= p.health().max());
            prop_assert!(p.energy().current() >= 0 && p.energy().current() <= p.energy().max());
            prop_assert!(e.health().current() >= 0 && e.health().current() <= e.health().max());
            prop_assert_eq!(p.is_alive(), p.health().current() > 0);
        }
    }

    #[test]
    fn take_damage_never_heals(start in 0..=100i32, amount in 0..500i32) {
        let mut p = hero();
        p.health_mut().set(start);
        let dealt = p.take_damage(amount);
        prop_assert!(dealt >= 0 && dealt <= amount);
        prop_assert!(p.health().current() <= start);
        prop_assert!(p.health().current() >= 0);
    }
}
