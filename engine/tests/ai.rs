use battle_engine::{Combatant, Dice, Enemy, EnemyMove, EnemyTier};

fn decide(enemy: &Enemy, roll: i32) -> EnemyMove {
    let mut dice = Dice::from_scripted(vec![roll]);
    enemy.tier.policy().choose(enemy, &mut dice)
}

#[test]
fn weak_enemies_guard_one_time_in_five() {
    let e = Enemy::from_tier("Bandit", EnemyTier::Weak);
    assert_eq!(decide(&e, 1), EnemyMove::Guard);
    assert_eq!(decide(&e, 20), EnemyMove::Guard);
    assert_eq!(decide(&e, 21), EnemyMove::Attack);
    assert_eq!(decide(&e, 100), EnemyMove::Attack);
}

#[test]
fn strong_enemies_turtle_when_hurt() {
    let mut e = Enemy::from_tier("Chunin", EnemyTier::Strong);
    assert_eq!(decide(&e, 40), EnemyMove::Guard);
    assert_eq!(decide(&e, 41), EnemyMove::Attack);

    // 47 / 120 is just under 40%
    e.health_mut().set(47);
    assert_eq!(decide(&e, 60), EnemyMove::Guard);
    assert_eq!(decide(&e, 61), EnemyMove::Attack);

    // exactly 40% is not desperate yet
    e.health_mut().set(48);
    assert_eq!(decide(&e, 41), EnemyMove::Attack);
}

#[test]
fn boss_mixes_specials_guards_and_attacks() {
    let mut e = Enemy::from_tier("Jonin", EnemyTier::Boss);
    assert_eq!(decide(&e, 10), EnemyMove::SpecialAttack);
    assert_eq!(decide(&e, 11), EnemyMove::Guard);
    assert_eq!(decide(&e, 30), EnemyMove::Guard);
    assert_eq!(decide(&e, 31), EnemyMove::Attack);

    // 74 / 250 is below 30%
    e.health_mut().set(74);
    assert_eq!(decide(&e, 20), EnemyMove::SpecialAttack);
    assert_eq!(decide(&e, 21), EnemyMove::Guard);
    assert_eq!(decide(&e, 40), EnemyMove::Guard);
    assert_eq!(decide(&e, 41), EnemyMove::Attack);
}

#[test]
fn seeded_weak_policy_guard_rate_is_plausible() {
    let e = Enemy::from_tier("Bandit", EnemyTier::Weak);
    let mut dice = Dice::from_seed(99);
    let guards = (0..10_000)
        .filter(|_| e.tier.policy().choose(&e, &mut dice) == EnemyMove::Guard)
        .count();
    assert!((1_500..2_500).contains(&guards), "guards: {guards}");
}
