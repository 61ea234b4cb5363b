use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget};

use crate::config::DuelConfig;
use crate::game::{CardId, CardTable, GameSession, RandomDraw};
use crate::presentation::{apply_step, play_timeline, Generation, Timeline, TimelineStep};

use super::audio::WebAudio;
use super::dom::DomSurface;
use super::scheduler::TimeoutScheduler;

struct AppInner {
    config: DuelConfig,
    session: RefCell<GameSession>,
    draw: RefCell<RandomDraw>,
    surface: RefCell<DomSurface>,
    audio: RefCell<WebAudio>,
    generation: Generation,
    scheduler: TimeoutScheduler,
}

impl AppInner {
    fn apply(&self, step: &TimelineStep) {
        let mut surface = self.surface.borrow_mut();
        let mut audio = self.audio.borrow_mut();
        apply_step(step, &mut *surface, &mut *audio);
    }

    fn applier(self: &Rc<Self>) -> Rc<dyn Fn(&TimelineStep)> {
        let inner = Rc::clone(self);
        Rc::new(move |step: &TimelineStep| inner.apply(step))
    }

    fn on_select(self: &Rc<Self>, data_id: Option<String>) {
        let Some(card_id) = data_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<CardId>().ok())
        else {
            tracing::warn!(?data_id, "ignored card click without a valid data-id");
            return;
        };

        let result = {
            let mut draw = self.draw.borrow_mut();
            self.session.borrow_mut().select_card(card_id, &mut *draw)
        };
        match result {
            Ok(report) => {
                let timeline = Timeline::for_duel(&report, &self.config);
                play_timeline(&self.scheduler, timeline, &self.generation, self.applier());
            }
            Err(err) => tracing::warn!(%err, card_id, "ignored card selection"),
        }
    }

    fn on_reset(&self) {
        self.generation.advance();
        let score = {
            let mut session = self.session.borrow_mut();
            session.reset();
            session.score()
        };
        for entry in Timeline::for_reset(&self.config, score).steps() {
            self.apply(&entry.step);
        }
    }
}

/// 挂载到页面上的对决：负责监听点击、驱动时间轴与音效。
#[wasm_bindgen]
pub struct DuelApp {
    inner: Rc<AppInner>,
    listeners: Vec<(EventTarget, Closure<dyn FnMut(Event)>)>,
}

#[wasm_bindgen]
impl DuelApp {
    /// 查找页面元素并注册监听器。`seed` 仅用于可复现的演示。
    pub fn mount(config_json: Option<String>, seed: Option<u64>) -> Result<DuelApp, JsValue> {
        let config = DuelConfig::from_optional_json(config_json.as_deref())
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("no document available"))?;

        let surface = DomSurface::locate(&document)?;
        let audio = WebAudio::new(&document, &config.assets);
        let draw = seed.map(RandomDraw::with_seed).unwrap_or_default();

        let inner = Rc::new(AppInner {
            session: RefCell::new(GameSession::new(CardTable::default())),
            draw: RefCell::new(draw),
            surface: RefCell::new(surface),
            audio: RefCell::new(audio),
            generation: Generation::new(),
            scheduler: TimeoutScheduler,
            config,
        });

        let mut app = DuelApp {
            inner,
            listeners: Vec::new(),
        };
        app.wire_listeners()?;

        let score = app.inner.session.borrow().score();
        app.inner.apply(&TimelineStep::UpdateScore { text: score.text() });
        app.inner.audio.borrow().start_background(&document);

        let cards = app.inner.surface.borrow().card_elements().len();
        tracing::info!(cards, "duel mounted");
        Ok(app)
    }

    pub fn reset(&self) {
        self.inner.on_reset();
    }

    pub fn score_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.session.borrow().score())
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }
}

impl DuelApp {
    fn wire_listeners(&mut self) -> Result<(), JsValue> {
        let cards: Vec<_> = self.inner.surface.borrow().card_elements().to_vec();
        for card in cards {
            let inner = Rc::clone(&self.inner);
            let element = card.clone();
            let closure = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                inner.on_select(element.get_attribute("data-id"));
            });
            self.listen(card.into(), closure)?;
        }

        let button = self.inner.surface.borrow().next_duel_button().clone();
        let inner = Rc::clone(&self.inner);
        let closure = Closure::<dyn FnMut(Event)>::new(move |_event: Event| inner.on_reset());
        self.listen(button.into(), closure)
    }

    fn listen(
        &mut self,
        target: EventTarget,
        closure: Closure<dyn FnMut(Event)>,
    ) -> Result<(), JsValue> {
        target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        self.listeners.push((target, closure));
        Ok(())
    }
}

impl Drop for DuelApp {
    fn drop(&mut self) {
        self.inner.generation.advance();
        for (target, closure) in self.listeners.drain(..) {
            let _ = target
                .remove_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        }
    }
}
