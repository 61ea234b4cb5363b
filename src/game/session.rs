use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::cards::{Card, CardId, CardTable};
use super::rules::{self, DuelError, Outcome, Score};

/// 电脑出牌的随机来源，可注入以便测试。
pub trait CardDraw {
    /// 返回 `0..card_count` 内的下标。
    fn draw(&mut self, card_count: usize) -> usize;
}

/// 均匀随机抽牌。
pub struct RandomDraw {
    rng: SmallRng,
}

impl RandomDraw {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDraw {
    fn default() -> Self {
        Self::new()
    }
}

impl CardDraw for RandomDraw {
    fn draw(&mut self, card_count: usize) -> usize {
        if card_count == 0 {
            return 0;
        }
        self.rng.gen_range(0..card_count)
    }
}

/// 总是返回同一个下标。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDraw(pub usize);

impl CardDraw for FixedDraw {
    fn draw(&mut self, _card_count: usize) -> usize {
        self.0
    }
}

/// 当前对决。两张牌在对决期间同时存在，回合之间同时为空。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DuelState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_card: Option<CardId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computer_card: Option<CardId>,
}

impl DuelState {
    pub fn is_active(&self) -> bool {
        self.player_card.is_some() && self.computer_card.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DuelReport {
    pub player_card: Card,
    pub computer_card: Card,
    pub outcome: Outcome,
    pub score: Score,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub score: Score,
    pub duel: DuelState,
    pub selection_enabled: bool,
}

/// 一次页面会话：卡表、比分与当前对决。
#[derive(Debug, Clone)]
pub struct GameSession {
    table: CardTable,
    score: Score,
    duel: DuelState,
    selection_enabled: bool,
}

impl GameSession {
    pub fn new(table: CardTable) -> Self {
        Self {
            table,
            score: Score::default(),
            duel: DuelState::default(),
            selection_enabled: true,
        }
    }

    pub fn table(&self) -> &CardTable {
        &self.table
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn duel(&self) -> &DuelState {
        &self.duel
    }

    pub fn selection_enabled(&self) -> bool {
        self.selection_enabled
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            score: self.score,
            duel: self.duel.clone(),
            selection_enabled: self.selection_enabled,
        }
    }

    /// 纯判定，不修改会话状态。
    pub fn resolve(&self, player_id: CardId, computer_id: CardId) -> Result<Outcome, DuelError> {
        rules::resolve(&self.table, player_id, computer_id)
    }

    /// 玩家选牌：抽取电脑的牌、判定、记分，并锁定选择直到 `reset`。
    pub fn select_card(
        &mut self,
        player_id: CardId,
        draw: &mut dyn CardDraw,
    ) -> Result<DuelReport, DuelError> {
        if !self.selection_enabled {
            return Err(DuelError::DuelInProgress);
        }

        let card_count = self.table.len();
        let player_card = self
            .table
            .get(player_id)
            .cloned()
            .ok_or(DuelError::InvalidSelection {
                card_id: player_id,
                card_count,
            })?;

        let index = draw.draw(card_count);
        let computer_card = self
            .table
            .get(index as CardId)
            .filter(|_| index < card_count)
            .cloned()
            .ok_or(DuelError::InvalidDraw { index, card_count })?;

        let outcome = self.resolve(player_card.id, computer_card.id)?;
        self.score.record(outcome);
        self.duel = DuelState {
            player_card: Some(player_card.id),
            computer_card: Some(computer_card.id),
        };
        self.selection_enabled = false;

        tracing::debug!(
            player = player_card.id,
            computer = computer_card.id,
            ?outcome,
            player_wins = self.score.player_wins,
            computer_wins = self.score.computer_wins,
            "duel resolved"
        );

        Ok(DuelReport {
            player_card,
            computer_card,
            outcome,
            score: self.score,
        })
    }

    pub fn reset(&mut self) {
        self.duel = DuelState::default();
        self.selection_enabled = true;
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(CardTable::default())
    }
}
