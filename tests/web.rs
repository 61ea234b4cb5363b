#![cfg(target_arch = "wasm32")]

use card_duel::{card_table, resolve_duel, DuelEngine, Outcome};
use serde_json::Value;
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn engine_runs_a_full_round() {
    let mut engine = DuelEngine::new(None, Some(11)).expect("engine should build");
    assert!(engine.selection_enabled());

    let json = engine.select_card(0).expect("card 0 is valid");
    let response: Value = serde_json::from_str(&json).expect("response is json");
    assert_eq!(response["report"]["player_card"]["name"], "Blue Eyes White Dragon");
    let steps = response["timeline"]["steps"]
        .as_array()
        .expect("timeline has steps");
    assert_eq!(steps[0]["step"]["type"], "LockSelection");
    assert_eq!(steps.last().map(|entry| entry["at_ms"].clone()), Some(Value::from(2500)));
    assert!(!engine.selection_enabled());

    assert!(engine.select_card(1).is_err(), "second click during a duel is rejected");

    let reset: Value = serde_json::from_str(&engine.reset().expect("reset")).expect("json");
    assert!(reset["steps"].as_array().map(|steps| !steps.is_empty()).unwrap_or(false));
    assert!(engine.selection_enabled());

    let state: Value = serde_json::from_str(&engine.state_json().expect("state")).expect("json");
    assert!(state["duel"].get("player_card").is_none());
}

#[wasm_bindgen_test]
fn engine_rejects_unknown_cards() {
    let mut engine = DuelEngine::new(None, Some(3)).expect("engine should build");
    assert!(engine.select_card(9).is_err());
    assert!(engine.selection_enabled());
    assert_eq!(engine.score_json().expect("score"), r#"{"player_wins":0,"computer_wins":0}"#);
}

#[wasm_bindgen_test]
fn engine_rejects_bad_config() {
    let config = r#"{"assets":{"bgm_volume":4.0}}"#.to_string();
    assert!(DuelEngine::new(Some(config), None).is_err());
}

#[wasm_bindgen_test]
fn resolve_duel_matches_table() {
    let outcome: Outcome =
        serde_wasm_bindgen::from_value(resolve_duel(0, 1).expect("valid ids")).expect("outcome");
    assert_eq!(outcome, Outcome::PlayerWin);

    let outcome: Outcome =
        serde_wasm_bindgen::from_value(resolve_duel(0, 2).expect("valid ids")).expect("outcome");
    assert_eq!(outcome, Outcome::ComputerWin);

    assert!(resolve_duel(0, 3).is_err());
    assert!(card_table().is_ok());
}
