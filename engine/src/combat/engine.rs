use tracing::{debug, info, warn};

use crate::Dice;
use crate::abilities::AbilityCatalog;
use crate::ai::EnemyMove;
use crate::character::{Combatant, Enemy, Player};
use crate::combat::actions::{
    GENERIC_ABILITY_COST, GENERIC_ABILITY_MAX_DAMAGE, GENERIC_ABILITY_MIN_DAMAGE, PlayerAction,
    Rejection,
};
use crate::combat::log::{ActionKind, ActionRecord, BattleLog};
use crate::items::ResourceSnapshot;
use crate::progression::{ExperienceGain, xp_reward_for};

const GUARD_FACTOR: f64 = 0.5;
const SPECIAL_FACTOR: f64 = 1.5;
const SPECIAL_GUARD_FACTOR: f64 = 0.75;

fn scale(damage: i32, factor: f64) -> i32 {
    (damage as f64 * factor).round() as i32
}

/// One battle between a player and an enemy.
///
/// The engine owns both combatants for the battle's lifetime; take the player back with
/// [`BattleEngine::into_player`] to persist it afterwards. Every call to
/// [`BattleEngine::submit_player_action`] resolves the player's action and, unless that ended the
/// battle, the enemy's reply before returning, so callers only ever observe the player's turn or
/// the end of the battle.
#[derive(Debug, Clone)]
pub struct BattleEngine {
    player: Player,
    enemy: Enemy,
    catalog: AbilityCatalog,
    dice: Dice,
    log: BattleLog,
    is_player_turn: bool,
    is_battle_over: bool,
    winner: Option<String>,
    round: u32,
    reward: Option<ExperienceGain>,
}

impl BattleEngine {
    pub fn new(player: Player, enemy: Enemy) -> Self {
        Self::with_dice(player, enemy, Dice::from_entropy())
    }

    /// Combatants keep the resources they arrive with. One that is already down ends the battle
    /// before anyone acts.
    pub fn with_dice(player: Player, enemy: Enemy, dice: Dice) -> Self {
        info!(player = %player.name, enemy = %enemy.name, tier = ?enemy.tier, "battle started");
        let mut engine = Self {
            player,
            enemy,
            catalog: AbilityCatalog::builtin(),
            dice,
            log: BattleLog::default(),
            is_player_turn: true,
            is_battle_over: false,
            winner: None,
            round: 1,
            reward: None,
        };
        engine.check_battle_end();
        engine
    }

    /// Level-up unlocks during this battle come from `catalog`.
    pub fn with_catalog(mut self, catalog: AbilityCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn is_player_turn(&self) -> bool {
        self.is_player_turn
    }

    pub fn is_battle_over(&self) -> bool {
        self.is_battle_over
    }

    pub fn winner_name(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn current_round(&self) -> u32 {
        self.round
    }

    /// The experience award, once the player has won.
    pub fn reward(&self) -> Option<&ExperienceGain> {
        self.reward.as_ref()
    }

    pub fn into_player(self) -> Player {
        self.player
    }

    /// Resolves the player's action and the enemy's automatic reply.
    ///
    /// Returns the player's record. A refused action comes back with `success == false` and
    /// leaves every piece of battle state untouched, including the log.
    pub fn submit_player_action(&mut self, action: PlayerAction) -> ActionRecord {
        let kind = action.kind();
        if self.is_battle_over {
            return self.refuse(kind, Rejection::BattleOver);
        }
        if !self.is_player_turn {
            return self.refuse(kind, Rejection::NotPlayerTurn);
        }

        // guard covers exactly one incoming enemy turn
        let was_guarding = self.player.is_guarding();
        self.player.set_guarding(false);
        let record = match self.resolve_player_action(action) {
            Ok(record) => record,
            Err(reason) => {
                self.player.set_guarding(was_guarding);
                return self.refuse(kind, reason);
            }
        };
        debug!(round = self.round, kind = ?record.kind, damage = record.damage, "player action");

        self.log.push(record.clone());
        self.is_player_turn = false;
        self.check_battle_end();
        if !self.is_battle_over {
            self.resolve_enemy_turn();
        }
        record
    }

    /// Refills both combatants and starts again from round 1.
    pub fn reset_battle(&mut self) {
        self.player.reset();
        self.enemy.reset();
        self.log.clear();
        self.is_player_turn = true;
        self.is_battle_over = false;
        self.winner = None;
        self.round = 1;
        self.reward = None;
        debug!("battle reset");
    }

    fn refuse(&self, kind: ActionKind, reason: Rejection) -> ActionRecord {
        warn!(round = self.round, ?kind, %reason, "player action refused");
        ActionRecord::rejected(kind, &self.player.name, &self.enemy.name, self.round, reason)
    }

    fn resolve_player_action(&mut self, action: PlayerAction) -> Result<ActionRecord, Rejection> {
        let player = self.player.name.clone();
        let enemy = self.enemy.name.clone();
        let round = self.round;

        match action {
            PlayerAction::Attack => {
                let raw = self.player.calculate_attack_damage(&mut self.dice);
                let dealt = self.strike_enemy(raw);
                let message = format!("{} attacks {} for {} damage", player, enemy, dealt);
                Ok(ActionRecord::new(ActionKind::Attack, player, enemy, round, message)
                    .with_damage(dealt))
            }
            PlayerAction::Guard => {
                self.player.set_guarding(true);
                let message = format!("{} braces for the next attack", player);
                Ok(ActionRecord::new(ActionKind::Guard, &player, player.as_str(), round, message))
            }
            PlayerAction::GenericAbility => {
                let available = self.player.energy().current();
                if !self.player.consume_energy(GENERIC_ABILITY_COST) {
                    return Err(Rejection::InsufficientEnergy {
                        needed: GENERIC_ABILITY_COST,
                        available,
                    });
                }
                let raw = self.dice.range(GENERIC_ABILITY_MIN_DAMAGE, GENERIC_ABILITY_MAX_DAMAGE);
                let dealt = self.strike_enemy(raw);
                let message = format!("{} unleashes a chakra strike on {} for {} damage", player, enemy, dealt);
                Ok(ActionRecord::new(ActionKind::Ability, player, enemy, round, message)
                    .with_damage(dealt))
            }
            PlayerAction::NamedAbility(None) => Err(Rejection::NoAbilitySpecified),
            PlayerAction::NamedAbility(Some(requested)) => {
                // stats come from the learned copy, not the caller's
                let ability = self
                    .player
                    .unlocked_abilities()
                    .get(&requested.name)
                    .cloned()
                    .ok_or_else(|| Rejection::AbilityNotLearned(requested.name.clone()))?;
                let available = self.player.energy().current();
                if !self.player.consume_energy(ability.cost) {
                    return Err(Rejection::InsufficientEnergyFor {
                        ability: ability.name,
                        needed: ability.cost,
                        available,
                    });
                }
                let raw = ability.calculate_damage(&mut self.dice);
                let dealt = self.strike_enemy(raw);
                let message =
                    format!("{} uses {} on {} for {} damage", player, ability.name, enemy, dealt);
                Ok(ActionRecord::new(ActionKind::NamedAbility, player, enemy, round, message)
                    .with_damage(dealt)
                    .with_ability(ability))
            }
            PlayerAction::UseItem(None) => Err(Rejection::NoItemSpecified),
            PlayerAction::UseItem(Some(name)) => {
                let entry = self
                    .player
                    .inventory()
                    .get(&name)
                    .ok_or_else(|| Rejection::ItemNotHeld(name.clone()))?;
                if !entry.item.usable_in_battle {
                    return Err(Rejection::ItemNotUsableInBattle(name));
                }
                let before = ResourceSnapshot::of(&self.player);
                if !self.player.apply_item(&name) {
                    return Err(Rejection::ItemNotHeld(name));
                }
                let after = ResourceSnapshot::of(&self.player);
                let message = match before.describe_change(&after) {
                    Some(change) => format!("{} uses {}: {}", player, name, change),
                    None => format!("{} uses {}, but nothing happens", player, name),
                };
                Ok(ActionRecord::new(ActionKind::UseItem, &player, player.as_str(), round, message)
                    .with_item(name))
            }
        }
    }

    /// A guarding enemy halves the blow before resilience applies.
    fn strike_enemy(&mut self, raw: i32) -> i32 {
        let raw = if self.enemy.is_guarding() { scale(raw, GUARD_FACTOR) } else { raw };
        self.enemy.take_damage(raw)
    }

    fn resolve_enemy_turn(&mut self) {
        self.enemy.set_guarding(false);
        let player = self.player.name.clone();
        let enemy = self.enemy.name.clone();
        let round = self.round;
        let guarding = self.player.is_guarding();

        let choice = self.enemy.tier.policy().choose(&self.enemy, &mut self.dice);
        debug!(round, enemy = %enemy, ?choice, "enemy decision");

        let record = match choice {
            EnemyMove::Guard => {
                self.enemy.set_guarding(true);
                let message = format!("{} takes a defensive stance", enemy);
                ActionRecord::new(ActionKind::Guard, &enemy, enemy.as_str(), round, message)
            }
            EnemyMove::Attack => {
                let mut raw = self.enemy.calculate_attack_damage(&mut self.dice);
                if guarding {
                    raw = scale(raw, GUARD_FACTOR);
                }
                let dealt = self.player.take_damage(raw);
                let message = if guarding {
                    format!("{} attacks {}, who blocks, for {} damage", enemy, player, dealt)
                } else {
                    format!("{} attacks {} for {} damage", enemy, player, dealt)
                };
                ActionRecord::new(ActionKind::Attack, enemy, player, round, message)
                    .with_damage(dealt)
            }
            EnemyMove::SpecialAttack => {
                let normal = self.enemy.calculate_attack_damage(&mut self.dice);
                let mut raw = scale(normal, SPECIAL_FACTOR);
                if guarding {
                    raw = scale(raw, SPECIAL_GUARD_FACTOR);
                }
                let dealt = self.player.take_damage(raw);
                let message =
                    format!("{} unleashes a devastating technique on {} for {} damage", enemy, player, dealt);
                ActionRecord::new(ActionKind::SpecialAttack, enemy, player, round, message)
                    .with_damage(dealt)
            }
        };

        self.log.push(record);
        self.is_player_turn = true;
        self.round += 1;
        self.check_battle_end();
    }

    fn check_battle_end(&mut self) {
        if self.is_battle_over {
            return;
        }
        let player = self.player.name.clone();
        let enemy = self.enemy.name.clone();

        if !self.player.is_alive() {
            let message = format!("{} has been defeated by {}", player, enemy);
            self.finish(enemy.clone());
            self.log.push(ActionRecord::new(ActionKind::Defeat, enemy, player, self.round, message));
        } else if !self.enemy.is_alive() {
            let xp = xp_reward_for(self.enemy.tier, &mut self.dice);
            let gain = self.player.gain_experience(xp, &self.catalog);
            let mut message = format!("{} defeated {}! Gained {} XP.", player, enemy, xp);
            if gain.leveled_up() {
                message.push_str(&format!(" Reached level {}!", gain.new_level));
            }
            for ability in &gain.unlocked {
                message.push_str(&format!(" Learned {}!", ability.name));
            }
            self.reward = Some(gain);
            self.finish(player.clone());
            self.log.push(ActionRecord::new(ActionKind::Victory, player, enemy, self.round, message));
        }
    }

    fn finish(&mut self, winner: String) {
        info!(winner = %winner, round = self.round, "battle over");
        self.is_battle_over = true;
        self.winner = Some(winner);
        self.player.set_guarding(false);
        self.player.clear_buffs();
        self.enemy.set_guarding(false);
    }
}
