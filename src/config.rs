//! 对决的展示配置：时间轴、资源路径与文案。默认值即浏览器版本使用的常量。

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    pub player_reveal_ms: u32,
    pub computer_reveal_ms: u32,
    pub battle_start_ms: u32,
    pub result_delay_ms: u32,
    /// 翻牌动画开始后多久替换图片。
    pub flip_swap_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            player_reveal_ms: 500,
            computer_reveal_ms: 1000,
            battle_start_ms: 1500,
            result_delay_ms: 1000,
            flip_swap_ms: 300,
        }
    }
}

impl TimingConfig {
    pub fn result_at_ms(&self) -> u32 {
        self.battle_start_ms.saturating_add(self.result_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub card_back: String,
    pub win_sound: String,
    pub lose_sound: String,
    pub bgm_volume: f64,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            card_back: "./src/assets/icons/card-back.png".into(),
            win_sound: "./src/assets/audios/win.wav".into(),
            lose_sound: "./src/assets/audios/lose.wav".into(),
            bgm_volume: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TextConfig {
    pub prompt: String,
    pub player_label: String,
    pub computer_label: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            prompt: "Choose your card to duel!".into(),
            player_label: "Player Card".into(),
            computer_label: "Computer Card".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DuelConfig {
    pub timing: TimingConfig,
    pub assets: AssetConfig,
    pub texts: TextConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ConfigError {
    Parse { message: String },
    RevealOrder { player_ms: u32, computer_ms: u32 },
    BattleBeforeReveal { battle_ms: u32, computer_ms: u32 },
    FlipTooSlow { flip_swap_ms: u32, gap_ms: u32 },
    VolumeOutOfRange { value: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { message } => write!(f, "invalid duel config: {message}"),
            ConfigError::RevealOrder {
                player_ms,
                computer_ms,
            } => write!(
                f,
                "player reveal ({player_ms}ms) must come before computer reveal ({computer_ms}ms)"
            ),
            ConfigError::BattleBeforeReveal {
                battle_ms,
                computer_ms,
            } => write!(
                f,
                "battle start ({battle_ms}ms) must not precede computer reveal ({computer_ms}ms)"
            ),
            ConfigError::FlipTooSlow {
                flip_swap_ms,
                gap_ms,
            } => write!(
                f,
                "flip swap ({flip_swap_ms}ms) must be shorter than the reveal gap ({gap_ms}ms)"
            ),
            ConfigError::VolumeOutOfRange { value } => {
                write!(f, "background volume {value} is outside 0..=1")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl DuelConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: DuelConfig = serde_json::from_str(json).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 空输入或 `None` 时使用默认配置。
    pub fn from_optional_json(json: Option<&str>) -> Result<Self, ConfigError> {
        match json.map(str::trim) {
            Some(json) if !json.is_empty() => Self::from_json(json),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let timing = &self.timing;
        if timing.player_reveal_ms >= timing.computer_reveal_ms {
            return Err(ConfigError::RevealOrder {
                player_ms: timing.player_reveal_ms,
                computer_ms: timing.computer_reveal_ms,
            });
        }
        if timing.battle_start_ms < timing.computer_reveal_ms {
            return Err(ConfigError::BattleBeforeReveal {
                battle_ms: timing.battle_start_ms,
                computer_ms: timing.computer_reveal_ms,
            });
        }
        let gap_ms = timing.computer_reveal_ms - timing.player_reveal_ms;
        if timing.flip_swap_ms >= gap_ms {
            return Err(ConfigError::FlipTooSlow {
                flip_swap_ms: timing.flip_swap_ms,
                gap_ms,
            });
        }
        let volume = self.assets.bgm_volume;
        if !(0.0..=1.0).contains(&volume) {
            return Err(ConfigError::VolumeOutOfRange { value: volume });
        }
        Ok(())
    }
}
