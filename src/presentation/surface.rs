use crate::game::CardId;

use super::timeline::{ResultStyle, Slot, SoundClip, TimelineStep};

/// 展示层。核心只写入，不读取。
pub trait PresentationSurface {
    fn set_card(&mut self, slot: Slot, image: &str, label: &str);
    fn set_flipping(&mut self, slot: Slot, flipping: bool);
    fn set_battle(&mut self, active: bool);
    fn set_result(&mut self, text: &str, style: ResultStyle);
    fn set_score(&mut self, text: &str);
    fn set_next_duel_visible(&mut self, visible: bool);
    /// `selected` 为高亮的卡牌；解锁时为 `None`。
    fn set_selection(&mut self, enabled: bool, selected: Option<CardId>);
}

/// 音效播放，失败由实现方吞掉。
pub trait AudioPlayer {
    fn play(&mut self, clip: SoundClip);
}

pub fn apply_step(
    step: &TimelineStep,
    surface: &mut dyn PresentationSurface,
    audio: &mut dyn AudioPlayer,
) {
    match step {
        TimelineStep::LockSelection { selected } => surface.set_selection(false, Some(*selected)),
        TimelineStep::UnlockSelection => surface.set_selection(true, None),
        TimelineStep::BeginFlip { slot } => surface.set_flipping(*slot, true),
        TimelineStep::ClearFlip { slot } => surface.set_flipping(*slot, false),
        TimelineStep::ShowCard { slot, image, label } => surface.set_card(*slot, image, label),
        TimelineStep::BeginBattle => surface.set_battle(true),
        TimelineStep::EndBattle => surface.set_battle(false),
        TimelineStep::PlaySound { clip } => audio.play(*clip),
        TimelineStep::ShowResult { text, style } => surface.set_result(text, *style),
        TimelineStep::UpdateScore { text } => surface.set_score(text),
        TimelineStep::SetNextDuelVisible { visible } => surface.set_next_duel_visible(*visible),
    }
}

/// 在内存中记录展示状态，供测试与无界面环境使用。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSurface {
    pub player_card: Option<(String, String)>,
    pub computer_card: Option<(String, String)>,
    pub flipping: Vec<Slot>,
    pub battle: bool,
    pub result: Option<(String, ResultStyle)>,
    pub score: Option<String>,
    pub next_duel_visible: bool,
    pub selection_enabled: bool,
    pub selected: Option<CardId>,
    pub sounds: Vec<SoundClip>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            selection_enabled: true,
            ..Self::default()
        }
    }

    pub fn card(&self, slot: Slot) -> Option<&(String, String)> {
        match slot {
            Slot::Player => self.player_card.as_ref(),
            Slot::Computer => self.computer_card.as_ref(),
        }
    }
}

impl PresentationSurface for RecordingSurface {
    fn set_card(&mut self, slot: Slot, image: &str, label: &str) {
        let face = Some((image.to_string(), label.to_string()));
        match slot {
            Slot::Player => self.player_card = face,
            Slot::Computer => self.computer_card = face,
        }
    }

    fn set_flipping(&mut self, slot: Slot, flipping: bool) {
        self.flipping.retain(|existing| *existing != slot);
        if flipping {
            self.flipping.push(slot);
        }
    }

    fn set_battle(&mut self, active: bool) {
        self.battle = active;
    }

    fn set_result(&mut self, text: &str, style: ResultStyle) {
        self.result = Some((text.to_string(), style));
    }

    fn set_score(&mut self, text: &str) {
        self.score = Some(text.to_string());
    }

    fn set_next_duel_visible(&mut self, visible: bool) {
        self.next_duel_visible = visible;
    }

    fn set_selection(&mut self, enabled: bool, selected: Option<CardId>) {
        self.selection_enabled = enabled;
        self.selected = selected;
    }
}

impl AudioPlayer for Vec<SoundClip> {
    fn play(&mut self, clip: SoundClip) {
        self.push(clip);
    }
}

impl AudioPlayer for RecordingSurface {
    fn play(&mut self, clip: SoundClip) {
        self.sounds.push(clip);
    }
}
