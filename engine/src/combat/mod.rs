pub mod actions;
pub mod engine;
pub mod log;

pub use actions::{PlayerAction, Rejection};
pub use engine::BattleEngine;
pub use log::{ActionKind, ActionRecord, BattleLog, MAX_LOG_ENTRIES};
