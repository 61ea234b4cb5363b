use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlImageElement};

use crate::game::CardId;
use crate::presentation::{PresentationSurface, ResultStyle, Slot};

const FLIP_CLASS: &str = "card-flip";
const BATTLE_CLASS: &str = "battle-animation";
const SELECTED_CLASS: &str = "selected";

fn element_by_id(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))
}

fn log_dom_error(result: Result<(), JsValue>, action: &str) {
    if let Err(err) = result {
        tracing::warn!(?err, action, "dom update failed");
    }
}

/// 页面上的对决区域。
pub struct DomSurface {
    document: Document,
    cards: Vec<HtmlElement>,
    player_slot: Element,
    computer_slot: Element,
    result: Element,
    score: Element,
    next_duel: HtmlElement,
}

impl DomSurface {
    pub fn locate(document: &Document) -> Result<Self, JsValue> {
        let nodes = document.query_selector_all(".card")?;
        let cards = (0..nodes.length())
            .filter_map(|index| nodes.get(index))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect();

        Ok(Self {
            document: document.clone(),
            cards,
            player_slot: element_by_id(document, "player-card")?,
            computer_slot: element_by_id(document, "computer-card")?,
            result: element_by_id(document, "result-text")?,
            score: element_by_id(document, "score-points")?,
            next_duel: element_by_id(document, "next-duel")?.dyn_into::<HtmlElement>()?,
        })
    }

    pub fn card_elements(&self) -> &[HtmlElement] {
        &self.cards
    }

    pub fn next_duel_button(&self) -> &HtmlElement {
        &self.next_duel
    }

    fn slot(&self, slot: Slot) -> &Element {
        match slot {
            Slot::Player => &self.player_slot,
            Slot::Computer => &self.computer_slot,
        }
    }

    fn slot_image(&self, slot: Slot) -> Option<HtmlImageElement> {
        self.slot(slot)
            .query_selector("img")
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlImageElement>().ok())
    }

    fn style_card(card: &HtmlElement, enabled: bool) {
        let style = card.style();
        let (pointer_events, opacity) = if enabled {
            ("auto", "0.8")
        } else {
            ("none", "0.6")
        };
        log_dom_error(
            style.set_property("pointer-events", pointer_events),
            "pointer-events",
        );
        log_dom_error(style.set_property("opacity", opacity), "opacity");
    }
}

impl PresentationSurface for DomSurface {
    fn set_card(&mut self, slot: Slot, image: &str, label: &str) {
        match self.slot_image(slot) {
            Some(img) => {
                img.set_src(image);
                img.set_alt(label);
            }
            None => tracing::warn!(?slot, "card slot has no <img>"),
        }
    }

    fn set_flipping(&mut self, slot: Slot, flipping: bool) {
        if let Some(img) = self.slot_image(slot) {
            let classes = img.class_list();
            let result = if flipping {
                classes.add_1(FLIP_CLASS)
            } else {
                classes.remove_1(FLIP_CLASS)
            };
            log_dom_error(result, FLIP_CLASS);
        }
    }

    fn set_battle(&mut self, active: bool) {
        for slot in [&self.player_slot, &self.computer_slot] {
            let classes = slot.class_list();
            let result = if active {
                classes.add_1(BATTLE_CLASS)
            } else {
                classes.remove_1(BATTLE_CLASS)
            };
            log_dom_error(result, BATTLE_CLASS);
        }
    }

    fn set_result(&mut self, text: &str, style: ResultStyle) {
        self.result.set_inner_html("");
        match self.document.create_element("p") {
            Ok(paragraph) => {
                paragraph.set_text_content(Some(text));
                if let Err(err) = self.result.append_child(&paragraph) {
                    tracing::warn!(?err, "failed to attach result text");
                }
            }
            Err(err) => tracing::warn!(?err, "failed to create result paragraph"),
        }

        let class_name = match style {
            ResultStyle::Prompt => "result-container framed".to_string(),
            other => format!("result-container framed {}", other.css_class()),
        };
        self.result.set_class_name(&class_name);
    }

    fn set_score(&mut self, text: &str) {
        self.score.set_text_content(Some(text));
    }

    fn set_next_duel_visible(&mut self, visible: bool) {
        let display = if visible { "inline-block" } else { "none" };
        log_dom_error(
            self.next_duel.style().set_property("display", display),
            "display",
        );
    }

    fn set_selection(&mut self, enabled: bool, selected: Option<CardId>) {
        let selected_id = selected.map(|id| format!("card-{id}"));
        for card in &self.cards {
            Self::style_card(card, enabled);
            let classes = card.class_list();
            let result = if selected_id.as_deref() == Some(card.id().as_str()) {
                classes.add_1(SELECTED_CLASS)
            } else {
                classes.remove_1(SELECTED_CLASS)
            };
            log_dom_error(result, SELECTED_CLASS);
        }
    }
}
