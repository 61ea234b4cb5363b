//! 对决核心逻辑（卡表、判定规则、会话状态）。

pub mod cards;
pub mod rules;
pub mod session;

pub use cards::{AuthoredCard, Card, CardId, CardKind, CardTable, TableError};
pub use rules::{resolve, DuelError, Outcome, Score};
pub use session::{
    CardDraw, DuelReport, DuelState, FixedDraw, GameSession, RandomDraw, SessionSnapshot,
};
