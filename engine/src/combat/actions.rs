use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::abilities::Ability;
use crate::combat::log::ActionKind;

/// Energy spent by the generic special attack.
pub const GENERIC_ABILITY_COST: i32 = 10;
pub const GENERIC_ABILITY_MIN_DAMAGE: i32 = 15;
pub const GENERIC_ABILITY_MAX_DAMAGE: i32 = 25;

/// A player's choice for one turn.
///
/// `NamedAbility` and `UseItem` carry an `Option` because callers build them from UI selections
/// that may be empty; the engine rejects the empty case.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerAction {
    Attack,
    Guard,
    GenericAbility,
    NamedAbility(Option<Ability>),
    UseItem(Option<String>),
}

impl PlayerAction {
    pub fn ability(ability: Ability) -> Self {
        PlayerAction::NamedAbility(Some(ability))
    }

    pub fn item(name: impl Into<String>) -> Self {
        PlayerAction::UseItem(Some(name.into()))
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            PlayerAction::Attack => ActionKind::Attack,
            PlayerAction::Guard => ActionKind::Guard,
            PlayerAction::GenericAbility => ActionKind::Ability,
            PlayerAction::NamedAbility(_) => ActionKind::NamedAbility,
            PlayerAction::UseItem(_) => ActionKind::UseItem,
        }
    }
}

/// Why a player action was refused. Refusals never change battle state.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum Rejection {
    #[error("The battle is already over")]
    BattleOver,
    #[error("It's not your turn")]
    NotPlayerTurn,
    #[error("No ability specified")]
    NoAbilitySpecified,
    #[error("You haven't learned {0}")]
    AbilityNotLearned(String),
    #[error("Not enough chakra (need {needed}, have {available})")]
    InsufficientEnergy { needed: i32, available: i32 },
    #[error("Not enough chakra to use {ability} (need {needed}, have {available})")]
    InsufficientEnergyFor {
        ability: String,
        needed: i32,
        available: i32,
    },
    #[error("No item specified")]
    NoItemSpecified,
    #[error("You don't have any {0}")]
    ItemNotHeld(String),
    #[error("{0} can't be used during battle")]
    ItemNotUsableInBattle(String),
    #[error("{0} can only be used during battle")]
    ItemNotUsableOutsideBattle(String),
}
