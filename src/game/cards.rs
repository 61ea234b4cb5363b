use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 卡牌标识，同时也是卡牌在卡表中的下标。
pub type CardId = u32;

static STANDARD_TABLE: Lazy<CardTable> = Lazy::new(CardTable::build_standard);

/// 卡牌的类别标签（石头剪刀布）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardKind {
    Paper,
    Rock,
    Scissors,
}

/// 手工编写的卡牌数据，只需要给出 `win_of`。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthoredCard {
    pub id: CardId,
    pub name: String,
    pub kind: CardKind,
    pub image: String,
    #[serde(default)]
    pub win_of: Vec<CardId>,
}

impl AuthoredCard {
    pub fn new(
        id: CardId,
        name: impl Into<String>,
        kind: CardKind,
        image: impl Into<String>,
        win_of: Vec<CardId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            image: image.into(),
            win_of,
        }
    }
}

/// 对局中使用的卡牌。`lose_of` 总是由其他卡牌的 `win_of` 推导。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub kind: CardKind,
    pub image: String,
    pub win_of: Vec<CardId>,
    pub lose_of: Vec<CardId>,
}

impl Card {
    pub fn beats(&self, other: CardId) -> bool {
        self.win_of.contains(&other)
    }

    pub fn loses_to(&self, other: CardId) -> bool {
        self.lose_of.contains(&other)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum TableError {
    Empty,
    IdMismatch { index: usize, card_id: CardId },
    SelfWin { card_id: CardId },
    UnknownOpponent { card_id: CardId, opponent: CardId },
    Undecided { first: CardId, second: CardId },
    Ambiguous { first: CardId, second: CardId },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Empty => write!(f, "card table is empty"),
            TableError::IdMismatch { index, card_id } => {
                write!(f, "card at index {index} has id {card_id}")
            }
            TableError::SelfWin { card_id } => write!(f, "card {card_id} beats itself"),
            TableError::UnknownOpponent { card_id, opponent } => {
                write!(f, "card {card_id} refers to unknown card {opponent}")
            }
            TableError::Undecided { first, second } => {
                write!(f, "neither card {first} nor card {second} wins the pairing")
            }
            TableError::Ambiguous { first, second } => {
                write!(f, "cards {first} and {second} both claim the pairing")
            }
        }
    }
}

impl std::error::Error for TableError {}

/// 固定卡表。下标即 `CardId`。
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CardTable {
    cards: Vec<Card>,
}

impl CardTable {
    /// 由手写的 `win_of` 关系构建卡表，并校验两两之间恰好有一方获胜。
    pub fn new(authored: Vec<AuthoredCard>) -> Result<Self, TableError> {
        if authored.is_empty() {
            return Err(TableError::Empty);
        }

        let count = authored.len() as CardId;
        for (index, card) in authored.iter().enumerate() {
            if card.id != index as CardId {
                return Err(TableError::IdMismatch {
                    index,
                    card_id: card.id,
                });
            }
            if card.win_of.contains(&card.id) {
                return Err(TableError::SelfWin { card_id: card.id });
            }
            if let Some(&opponent) = card.win_of.iter().find(|&&id| id >= count) {
                return Err(TableError::UnknownOpponent {
                    card_id: card.id,
                    opponent,
                });
            }
        }

        let wins: Vec<HashSet<CardId>> = authored
            .iter()
            .map(|card| card.win_of.iter().copied().collect())
            .collect();
        for first in 0..authored.len() {
            for second in (first + 1)..authored.len() {
                let forward = wins[first].contains(&(second as CardId));
                let backward = wins[second].contains(&(first as CardId));
                let (first, second) = (first as CardId, second as CardId);
                match (forward, backward) {
                    (true, true) => return Err(TableError::Ambiguous { first, second }),
                    (false, false) => return Err(TableError::Undecided { first, second }),
                    _ => {}
                }
            }
        }

        Ok(Self::derive(authored))
    }

    pub fn standard() -> &'static CardTable {
        &STANDARD_TABLE
    }

    fn build_standard() -> Self {
        Self::derive(vec![
            AuthoredCard::new(
                0,
                "Blue Eyes White Dragon",
                CardKind::Paper,
                "./src/assets/icons/dragon.png",
                vec![1],
            ),
            AuthoredCard::new(
                1,
                "Dark Magician",
                CardKind::Rock,
                "./src/assets/icons/magician.png",
                vec![2],
            ),
            AuthoredCard::new(
                2,
                "Exodia",
                CardKind::Scissors,
                "./src/assets/icons/exodia.png",
                vec![0],
            ),
        ])
    }

    fn derive(authored: Vec<AuthoredCard>) -> Self {
        let mut lose_of: Vec<Vec<CardId>> = vec![Vec::new(); authored.len()];
        for card in &authored {
            for &beaten in &card.win_of {
                if let Some(losses) = lose_of.get_mut(beaten as usize) {
                    losses.push(card.id);
                }
            }
        }

        let cards = authored
            .into_iter()
            .zip(lose_of)
            .map(|(card, mut lose_of)| {
                lose_of.sort_unstable();
                Card {
                    id: card.id,
                    name: card.name,
                    kind: card.kind,
                    image: card.image,
                    win_of: card.win_of,
                    lose_of,
                }
            })
            .collect();

        Self { cards }
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn beats(&self, attacker: CardId, defender: CardId) -> bool {
        self.get(attacker)
            .map(|card| card.beats(defender))
            .unwrap_or(false)
    }
}

impl Default for CardTable {
    fn default() -> Self {
        Self::standard().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authored_standard() -> Vec<AuthoredCard> {
        CardTable::standard()
            .iter()
            .map(|card| {
                AuthoredCard::new(
                    card.id,
                    card.name.clone(),
                    card.kind,
                    card.image.clone(),
                    card.win_of.clone(),
                )
            })
            .collect()
    }

    #[test]
    fn standard_table_passes_validation() {
        let rebuilt = CardTable::new(authored_standard()).expect("standard table should be valid");
        assert_eq!(&rebuilt, CardTable::standard());
    }

    #[test]
    fn lose_of_is_inverse_of_win_of() {
        let table = CardTable::standard();
        for card in table.iter() {
            for other in table.iter() {
                assert_eq!(
                    card.loses_to(other.id),
                    other.beats(card.id),
                    "{} vs {}",
                    card.name,
                    other.name
                );
            }
        }
        assert_eq!(table.get(0).map(|c| c.lose_of.clone()), Some(vec![2]));
        assert_eq!(table.get(1).map(|c| c.lose_of.clone()), Some(vec![0]));
        assert_eq!(table.get(2).map(|c| c.lose_of.clone()), Some(vec![1]));
    }

    #[test]
    fn every_distinct_pair_has_exactly_one_winner() {
        let table = CardTable::standard();
        for a in table.iter() {
            assert!(!a.beats(a.id));
            for b in table.iter().filter(|b| b.id != a.id) {
                assert!(table.beats(a.id, b.id) ^ table.beats(b.id, a.id));
            }
        }
    }

    #[test]
    fn each_card_points_at_its_own_artwork() {
        let table = CardTable::standard();
        let images: Vec<&str> = table.iter().map(|card| card.image.as_str()).collect();
        assert!(images[0].ends_with("dragon.png"));
        assert!(images[1].ends_with("magician.png"));
        assert!(images[2].ends_with("exodia.png"));
    }

    #[test]
    fn rejects_self_win_and_missing_pairings() {
        let mut cards = authored_standard();
        cards[1].win_of.push(1);
        assert_eq!(
            CardTable::new(cards),
            Err(TableError::SelfWin { card_id: 1 })
        );

        let mut cards = authored_standard();
        cards[2].win_of.clear();
        assert_eq!(
            CardTable::new(cards),
            Err(TableError::Undecided {
                first: 0,
                second: 2
            })
        );

        let mut cards = authored_standard();
        cards[1].win_of.push(0);
        assert_eq!(
            CardTable::new(cards),
            Err(TableError::Ambiguous {
                first: 0,
                second: 1
            })
        );
    }

    #[test]
    fn rejects_unknown_ids() {
        let mut cards = authored_standard();
        cards[0].win_of.push(7);
        assert_eq!(
            CardTable::new(cards),
            Err(TableError::UnknownOpponent {
                card_id: 0,
                opponent: 7
            })
        );

        let mut cards = authored_standard();
        cards.swap(0, 1);
        assert!(matches!(
            CardTable::new(cards),
            Err(TableError::IdMismatch { index: 0, .. })
        ));

        assert_eq!(CardTable::new(Vec::new()), Err(TableError::Empty));
    }

    #[test]
    fn out_of_range_lookup_is_none() {
        let table = CardTable::standard();
        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
        assert!(table.get(3).is_none());
        assert!(!table.beats(5, 0));
    }
}
