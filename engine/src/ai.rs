use serde::{Deserialize, Serialize};

use crate::Dice;
use crate::character::{Combatant, Enemy, EnemyTier};

/// What an enemy does on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyMove {
    Attack,
    Guard,
    SpecialAttack,
}

/// Chooses an enemy's move from its own state and a dice roll.
pub trait EnemyPolicy {
    fn choose(&self, enemy: &Enemy, dice: &mut Dice) -> EnemyMove;
}

/// 20% guard, otherwise attack.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeakPolicy;

/// Guards more often once badly hurt.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrongPolicy;

/// Occasional special attacks, more of them below 30% health.
#[derive(Debug, Clone, Copy, Default)]
pub struct BossPolicy;

pub const WEAK_GUARD_CHANCE: u32 = 20;
pub const STRONG_GUARD_CHANCE: u32 = 40;
pub const STRONG_DESPERATE_GUARD_CHANCE: u32 = 60;
pub const STRONG_DESPERATE_BELOW: f64 = 0.4;
pub const BOSS_SPECIAL_CHANCE: u32 = 10;
pub const BOSS_ENRAGED_SPECIAL_CHANCE: u32 = 20;
pub const BOSS_ENRAGED_BELOW: f64 = 0.3;
pub const BOSS_GUARD_CHANCE: u32 = 20;

impl EnemyPolicy for WeakPolicy {
    fn choose(&self, _enemy: &Enemy, dice: &mut Dice) -> EnemyMove {
        if dice.percent(WEAK_GUARD_CHANCE) { EnemyMove::Guard } else { EnemyMove::Attack }
    }
}

impl EnemyPolicy for StrongPolicy {
    fn choose(&self, enemy: &Enemy, dice: &mut Dice) -> EnemyMove {
        let chance = if enemy.health().fraction() < STRONG_DESPERATE_BELOW {
            STRONG_DESPERATE_GUARD_CHANCE
        } else {
            STRONG_GUARD_CHANCE
        };
        if dice.percent(chance) { EnemyMove::Guard } else { EnemyMove::Attack }
    }
}

impl EnemyPolicy for BossPolicy {
    fn choose(&self, enemy: &Enemy, dice: &mut Dice) -> EnemyMove {
        let special = if enemy.health().fraction() < BOSS_ENRAGED_BELOW {
            BOSS_ENRAGED_SPECIAL_CHANCE
        } else {
            BOSS_SPECIAL_CHANCE
        };
        // one d100: [1, special] special, then a flat 20-point guard band
        let roll = dice.range(1, 100) as u32;
        if roll <= special {
            EnemyMove::SpecialAttack
        } else if roll <= special + BOSS_GUARD_CHANCE {
            EnemyMove::Guard
        } else {
            EnemyMove::Attack
        }
    }
}

impl EnemyTier {
    pub fn policy(self) -> &'static dyn EnemyPolicy {
        match self {
            EnemyTier::Weak => &WeakPolicy,
            EnemyTier::Strong => &StrongPolicy,
            EnemyTier::Boss => &BossPolicy,
        }
    }
}
