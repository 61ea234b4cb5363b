pub mod config;
pub mod game;
pub mod presentation;
pub mod utils;
pub mod web;

use serde::Serialize;
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

pub use config::{AssetConfig, ConfigError, DuelConfig, TextConfig, TimingConfig};
pub use game::{
    resolve, AuthoredCard, Card, CardDraw, CardId, CardKind, CardTable, DuelError, DuelReport,
    DuelState, FixedDraw, GameSession, Outcome, RandomDraw, Score, SessionSnapshot, TableError,
};
pub use presentation::{
    apply_step, play_timeline, AudioPlayer, Generation, PresentationSurface, RecordingSurface,
    ResultStyle, Scheduler, Slot, SoundClip, TimedStep, Timeline, TimelineStep, VirtualClock,
};
pub use web::DuelApp;

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
    utils::init_logging();
}

fn to_js_error(error: DuelError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[derive(Serialize)]
struct DuelResponse<'a> {
    report: &'a DuelReport,
    timeline: &'a Timeline,
}

/// 无界面的对决引擎：前端自行根据返回的时间轴驱动动画。
#[wasm_bindgen]
pub struct DuelEngine {
    session: GameSession,
    draw: RandomDraw,
    config: DuelConfig,
}

#[wasm_bindgen]
impl DuelEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>, seed: Option<u64>) -> Result<DuelEngine, JsValue> {
        let config =
            DuelConfig::from_optional_json(config_json.as_deref()).map_err(serde_to_js_error)?;
        let draw = seed.map(RandomDraw::with_seed).unwrap_or_default();
        Ok(DuelEngine {
            session: GameSession::default(),
            draw,
            config,
        })
    }

    pub fn select_card(&mut self, card_id: CardId) -> Result<String, JsValue> {
        let report = match self.session.select_card(card_id, &mut self.draw) {
            Ok(report) => report,
            Err(error) => {
                tracing::warn!(%error, card_id, "ignored card selection");
                return Err(to_js_error(error));
            }
        };
        let timeline = Timeline::for_duel(&report, &self.config);
        serde_json::to_string(&DuelResponse {
            report: &report,
            timeline: &timeline,
        })
        .map_err(serde_to_js_error)
    }

    pub fn reset(&mut self) -> Result<String, JsValue> {
        self.session.reset();
        let timeline = Timeline::for_reset(&self.config, self.session.score());
        serde_json::to_string(&timeline).map_err(serde_to_js_error)
    }

    pub fn score_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.score()).map_err(serde_to_js_error)
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.snapshot()).map_err(serde_to_js_error)
    }

    pub fn cards_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.table()).map_err(serde_to_js_error)
    }

    pub fn selection_enabled(&self) -> bool {
        self.session.selection_enabled()
    }
}

/// 判定两张牌的对决结果，不影响任何比分。
#[wasm_bindgen(js_name = "resolveDuel")]
pub fn resolve_duel(player_id: CardId, computer_id: CardId) -> Result<JsValue, JsValue> {
    let outcome = resolve(CardTable::standard(), player_id, computer_id).map_err(to_js_error)?;
    to_value(&outcome).map_err(JsValue::from)
}

/// 返回标准卡表（含推导出的 `lose_of`）。
#[wasm_bindgen(js_name = "cardTable")]
pub fn card_table() -> Result<JsValue, JsValue> {
    to_value(CardTable::standard()).map_err(JsValue::from)
}
