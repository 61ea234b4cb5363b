use serde::{Deserialize, Serialize};
use std::fmt;

use super::cards::{CardId, CardTable};

/// 单局对决的结果。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Outcome {
    Draw,
    PlayerWin,
    ComputerWin,
}

impl Outcome {
    pub fn is_decisive(self) -> bool {
        !matches!(self, Outcome::Draw)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum DuelError {
    InvalidSelection { card_id: CardId, card_count: usize },
    InvalidDraw { index: usize, card_count: usize },
    DuelInProgress,
}

impl fmt::Display for DuelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuelError::InvalidSelection {
                card_id,
                card_count,
            } => write!(
                f,
                "card {card_id} is not a valid selection (table has {card_count} cards)"
            ),
            DuelError::InvalidDraw { index, card_count } => write!(
                f,
                "random draw {index} is outside the card table ({card_count} cards)"
            ),
            DuelError::DuelInProgress => write!(f, "a duel is already in progress"),
        }
    }
}

impl std::error::Error for DuelError {}

/// 累计比分，只在页面生命周期内有效。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Score {
    pub player_wins: u32,
    pub computer_wins: u32,
}

impl Score {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::PlayerWin => self.player_wins = self.player_wins.saturating_add(1),
            Outcome::ComputerWin => self.computer_wins = self.computer_wins.saturating_add(1),
            Outcome::Draw => {}
        }
    }

    pub fn text(&self) -> String {
        format!("Win: {} | Lose: {}", self.player_wins, self.computer_wins)
    }
}

fn ensure_card(table: &CardTable, card_id: CardId) -> Result<(), DuelError> {
    if table.get(card_id).is_none() {
        return Err(DuelError::InvalidSelection {
            card_id,
            card_count: table.len(),
        });
    }
    Ok(())
}

/// 判定对决结果：相同为平局，电脑的牌在玩家的 `win_of` 中则玩家胜，否则电脑胜。
pub fn resolve(
    table: &CardTable,
    player_id: CardId,
    computer_id: CardId,
) -> Result<Outcome, DuelError> {
    ensure_card(table, player_id)?;
    ensure_card(table, computer_id)?;

    if player_id == computer_id {
        return Ok(Outcome::Draw);
    }
    if table.beats(player_id, computer_id) {
        Ok(Outcome::PlayerWin)
    } else {
        Ok(Outcome::ComputerWin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustive_outcome_grid() {
        let table = CardTable::standard();
        let expected = [
            [Outcome::Draw, Outcome::PlayerWin, Outcome::ComputerWin],
            [Outcome::ComputerWin, Outcome::Draw, Outcome::PlayerWin],
            [Outcome::PlayerWin, Outcome::ComputerWin, Outcome::Draw],
        ];

        for player in 0..3u32 {
            for computer in 0..3u32 {
                let outcome = resolve(table, player, computer).expect("ids are valid");
                assert_eq!(
                    outcome, expected[player as usize][computer as usize],
                    "player {player} vs computer {computer}"
                );

                let player_card = table.get(player).expect("card exists");
                if player == computer {
                    assert_eq!(outcome, Outcome::Draw);
                } else if player_card.win_of.contains(&computer) {
                    assert_eq!(outcome, Outcome::PlayerWin);
                } else {
                    assert_eq!(outcome, Outcome::ComputerWin);
                }
            }
        }
    }

    #[test]
    fn invalid_ids_are_rejected() {
        let table = CardTable::standard();
        assert_eq!(
            resolve(table, 3, 0),
            Err(DuelError::InvalidSelection {
                card_id: 3,
                card_count: 3
            })
        );
        assert!(matches!(
            resolve(table, 0, 99),
            Err(DuelError::InvalidSelection { card_id: 99, .. })
        ));
    }

    #[test]
    fn score_ignores_draws() {
        let mut score = Score::default();
        score.record(Outcome::Draw);
        assert_eq!(score, Score::default());

        score.record(Outcome::PlayerWin);
        score.record(Outcome::ComputerWin);
        score.record(Outcome::ComputerWin);
        assert_eq!(score.player_wins, 1);
        assert_eq!(score.computer_wins, 2);
        assert_eq!(score.text(), "Win: 1 | Lose: 2");
    }

    #[test]
    fn duel_error_serializes_with_tag() {
        let json = serde_json::to_string(&DuelError::DuelInProgress).expect("serializable");
        assert_eq!(json, r#"{"type":"DuelInProgress"}"#);
    }
}
