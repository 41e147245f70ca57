use crate::character::{Combatant, Player};
use crate::combat::PlayerAction;
use crate::items::ItemEffect;

/// A simple player-side policy for simulations and unattended battles.
#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    /// Drink a healing item below this health fraction.
    pub heal_below: f64,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self { heal_below: 0.4 }
    }
}

impl Autopilot {
    pub fn choose(&self, player: &Player) -> PlayerAction {
        if player.health().fraction() < self.heal_below {
            if let Some(name) = held_item(player, |e| matches!(e, ItemEffect::Heal { .. })) {
                return PlayerAction::item(name);
            }
        }

        let energy = player.energy().current();
        let strongest_affordable = player
            .unlocked_abilities()
            .iter()
            .filter(|a| a.can_afford(energy))
            .max_by_key(|a| a.min_damage + a.max_damage);
        if let Some(ability) = strongest_affordable {
            return PlayerAction::ability(ability.clone());
        }

        let cheapest = player.unlocked_abilities().iter().map(|a| a.cost).min();
        if cheapest.is_some_and(|cost| energy < cost) {
            if let Some(name) = held_item(player, |e| matches!(e, ItemEffect::RestoreEnergy { .. })) {
                return PlayerAction::item(name);
            }
        }

        PlayerAction::Attack
    }
}

fn held_item(player: &Player, wanted: impl Fn(&ItemEffect) -> bool) -> Option<String> {
    player
        .inventory()
        .iter()
        .find(|e| e.quantity > 0 && e.item.usable_in_battle && wanted(&e.item.effect))
        .map(|e| e.item.name.clone())
}
