use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::abilities::Ability;
use crate::combat::actions::Rejection;

/// Oldest entries are evicted beyond this.
pub const MAX_LOG_ENTRIES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Attack,
    Guard,
    Ability,
    NamedAbility,
    UseItem,
    SpecialAttack,
    Victory,
    Defeat,
}

/// One resolved (or refused) action. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub kind: ActionKind,
    pub actor: String,
    pub target: String,
    pub damage: i32,
    pub success: bool,
    pub message: String,
    pub round: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<Ability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<Rejection>,
}

impl ActionRecord {
    pub fn new(
        kind: ActionKind,
        actor: impl Into<String>,
        target: impl Into<String>,
        round: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            actor: actor.into(),
            target: target.into(),
            damage: 0,
            success: true,
            message: message.into(),
            round,
            ability: None,
            item: None,
            rejection: None,
        }
    }

    pub fn rejected(
        kind: ActionKind,
        actor: impl Into<String>,
        target: impl Into<String>,
        round: u32,
        reason: Rejection,
    ) -> Self {
        let mut record = Self::new(kind, actor, target, round, reason.to_string());
        record.success = false;
        record.rejection = Some(reason);
        record
    }

    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.ability = Some(ability);
        self
    }

    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }
}

impl fmt::Display for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[R{}] {}", self.round, self.message)
    }
}

/// Bounded FIFO of the most recent records, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleLog {
    entries: VecDeque<ActionRecord>,
}

impl BattleLog {
    pub fn push(&mut self, record: ActionRecord) {
        while self.entries.len() >= MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn latest(&self) -> Option<&ActionRecord> {
        self.entries.back()
    }

    pub fn oldest_first(&self) -> impl DoubleEndedIterator<Item = &ActionRecord> {
        self.entries.iter()
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &ActionRecord> {
        self.entries.iter().rev()
    }

    /// Display lines, oldest first.
    pub fn render(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}
