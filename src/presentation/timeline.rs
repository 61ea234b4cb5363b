use serde::{Deserialize, Serialize};

use crate::config::DuelConfig;
use crate::game::{CardId, DuelReport, Outcome, Score};

/// 牌面展示位置。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Player,
    Computer,
}

/// 结果区域的样式。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResultStyle {
    Prompt,
    Win,
    Lose,
    Draw,
}

impl ResultStyle {
    pub fn css_class(self) -> &'static str {
        match self {
            ResultStyle::Prompt => "",
            ResultStyle::Win => "win",
            ResultStyle::Lose => "lose",
            ResultStyle::Draw => "draw",
        }
    }
}

impl From<Outcome> for ResultStyle {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Draw => ResultStyle::Draw,
            Outcome::PlayerWin => ResultStyle::Win,
            Outcome::ComputerWin => ResultStyle::Lose,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SoundClip {
    Win,
    Lose,
    Background,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum TimelineStep {
    LockSelection { selected: CardId },
    UnlockSelection,
    BeginFlip { slot: Slot },
    ClearFlip { slot: Slot },
    ShowCard { slot: Slot, image: String, label: String },
    BeginBattle,
    EndBattle,
    PlaySound { clip: SoundClip },
    ShowResult { text: String, style: ResultStyle },
    UpdateScore { text: String },
    SetNextDuelVisible { visible: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimedStep {
    pub at_ms: u32,
    pub step: TimelineStep,
}

/// 有序的 (时间点, 动作) 列表。时间点相对于时间轴起点，相同时间点按插入顺序执行。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timeline {
    steps: Vec<TimedStep>,
}

pub fn result_text(report: &DuelReport) -> String {
    let player = &report.player_card.name;
    let computer = &report.computer_card.name;
    match report.outcome {
        Outcome::Draw => format!("It's a draw! Both players chose {player}"),
        Outcome::PlayerWin => format!("You win! {player} defeats {computer}"),
        Outcome::ComputerWin => format!("You lose! {computer} defeats {player}"),
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at_ms: u32, step: TimelineStep) {
        let index = self.steps.partition_point(|entry| entry.at_ms <= at_ms);
        self.steps.insert(index, TimedStep { at_ms, step });
    }

    pub fn with(mut self, at_ms: u32, step: TimelineStep) -> Self {
        self.push(at_ms, step);
        self
    }

    pub fn steps(&self) -> &[TimedStep] {
        &self.steps
    }

    pub fn duration_ms(&self) -> u32 {
        self.steps.last().map(|entry| entry.at_ms).unwrap_or(0)
    }

    pub fn into_steps(self) -> Vec<TimedStep> {
        self.steps
    }

    /// 一次对决的完整展示：锁定、依次翻开两张牌、战斗动画、结算。
    pub fn for_duel(report: &DuelReport, config: &DuelConfig) -> Self {
        let timing = &config.timing;
        let player_swap = timing.player_reveal_ms.saturating_add(timing.flip_swap_ms);
        let computer_swap = timing.computer_reveal_ms.saturating_add(timing.flip_swap_ms);
        let result_at = timing.result_at_ms();

        let mut timeline = Self::new()
            .with(
                0,
                TimelineStep::LockSelection {
                    selected: report.player_card.id,
                },
            )
            .with(
                timing.player_reveal_ms,
                TimelineStep::BeginFlip { slot: Slot::Player },
            )
            .with(
                player_swap,
                TimelineStep::ShowCard {
                    slot: Slot::Player,
                    image: report.player_card.image.clone(),
                    label: report.player_card.name.clone(),
                },
            )
            .with(
                timing.computer_reveal_ms,
                TimelineStep::BeginFlip {
                    slot: Slot::Computer,
                },
            )
            .with(
                computer_swap,
                TimelineStep::ShowCard {
                    slot: Slot::Computer,
                    image: report.computer_card.image.clone(),
                    label: report.computer_card.name.clone(),
                },
            )
            .with(timing.battle_start_ms, TimelineStep::BeginBattle);

        match report.outcome {
            Outcome::PlayerWin => timeline.push(
                result_at,
                TimelineStep::PlaySound {
                    clip: SoundClip::Win,
                },
            ),
            Outcome::ComputerWin => timeline.push(
                result_at,
                TimelineStep::PlaySound {
                    clip: SoundClip::Lose,
                },
            ),
            Outcome::Draw => {}
        }

        timeline
            .with(
                result_at,
                TimelineStep::ShowResult {
                    text: result_text(report),
                    style: report.outcome.into(),
                },
            )
            .with(
                result_at,
                TimelineStep::UpdateScore {
                    text: report.score.text(),
                },
            )
            .with(
                result_at,
                TimelineStep::SetNextDuelVisible { visible: true },
            )
            .with(result_at, TimelineStep::EndBattle)
    }

    /// 重置为下一局，所有步骤立即执行。
    ///
    /// 比分在选牌时已记入，被取消的时间轴来不及显示它，这里重新写一次。
    pub fn for_reset(config: &DuelConfig, score: Score) -> Self {
        let back = &config.assets.card_back;
        let texts = &config.texts;
        Self::new()
            .with(
                0,
                TimelineStep::ShowCard {
                    slot: Slot::Player,
                    image: back.clone(),
                    label: texts.player_label.clone(),
                },
            )
            .with(0, TimelineStep::ClearFlip { slot: Slot::Player })
            .with(
                0,
                TimelineStep::ShowCard {
                    slot: Slot::Computer,
                    image: back.clone(),
                    label: texts.computer_label.clone(),
                },
            )
            .with(
                0,
                TimelineStep::ClearFlip {
                    slot: Slot::Computer,
                },
            )
            .with(
                0,
                TimelineStep::ShowResult {
                    text: texts.prompt.clone(),
                    style: ResultStyle::Prompt,
                },
            )
            .with(
                0,
                TimelineStep::UpdateScore {
                    text: score.text(),
                },
            )
            .with(0, TimelineStep::SetNextDuelVisible { visible: false })
            .with(0, TimelineStep::UnlockSelection)
    }
}
