use tracing::info;

use crate::Dice;
use crate::abilities::{Ability, AbilityCatalog};
use crate::character::{Combatant, EnemyTier, Player};

pub const HEALTH_PER_LEVEL: i32 = 20;
pub const ENERGY_PER_LEVEL: i32 = 10;
pub const POWER_PER_LEVEL: i32 = 2;
pub const RESILIENCE_PER_LEVEL: i32 = 1;

/// XP needed to leave `level`: 100 at level 1, 250 at level 2, 400 at level 3, ...
pub fn experience_to_next_level(level: u32) -> u32 {
    let level = level.max(1);
    level * 100 + (level - 1) * 50
}

/// XP for beating an enemy of `tier`. One roll `r` in `0..=10` scales per tier.
pub fn xp_reward_for(tier: EnemyTier, dice: &mut Dice) -> u32 {
    let r = dice.range(0, 10) as u32;
    match tier {
        EnemyTier::Weak => 25 + r,
        EnemyTier::Strong => 50 + 2 * r,
        EnemyTier::Boss => 100 + 5 * r,
    }
}

/// What one experience award did to a player.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExperienceGain {
    pub amount: u32,
    pub levels_gained: u32,
    pub new_level: u32,
    pub unlocked: Vec<Ability>,
}

impl ExperienceGain {
    pub fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

impl Player {
    /// Creates a character and levels it up to `level` through the normal growth path.
    pub fn at_level(
        id: impl Into<String>,
        name: impl Into<String>,
        level: u32,
        abilities: &AbilityCatalog,
        items: &crate::items::ItemCatalog,
    ) -> Self {
        let mut player = Player::new(id, name, abilities, items);
        while player.level < level {
            player.level_up(abilities);
        }
        player
    }

    /// Adds XP and applies as many level-ups as it pays for.
    pub fn gain_experience(&mut self, amount: u32, catalog: &AbilityCatalog) -> ExperienceGain {
        let mut gain = ExperienceGain { amount, ..Default::default() };
        self.experience = self.experience.saturating_add(amount);
        while self.experience >= self.experience_to_next_level {
            self.experience -= self.experience_to_next_level;
            gain.levels_gained += 1;
            if let Some(ability) = self.level_up(catalog) {
                gain.unlocked.push(ability);
            }
        }
        gain.new_level = self.level;
        gain
    }

    /// One level of growth. Returns the ability learned at the new level, unless already known.
    pub fn level_up(&mut self, catalog: &AbilityCatalog) -> Option<Ability> {
        self.level += 1;
        self.health_mut().grow(HEALTH_PER_LEVEL);
        self.energy_mut().grow(ENERGY_PER_LEVEL);
        self.power += POWER_PER_LEVEL;
        self.resilience += RESILIENCE_PER_LEVEL;
        self.health_mut().refill();
        self.energy_mut().refill();
        self.experience_to_next_level = experience_to_next_level(self.level);
        info!(player = %self.name, level = self.level, "level up");

        let ability = catalog.unlocked_at(self.level)?.clone();
        if self.learn(ability.clone()) {
            info!(player = %self.name, ability = %ability.name, "ability unlocked");
            Some(ability)
        } else {
            None
        }
    }
}
