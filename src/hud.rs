use crate::game::{GameState, RoundState};

/// The DOM-facing part of a frame: scoreboard text and overlay visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudView {
    pub score: String,
    pub high_score: String,
    pub show_start: bool,
    pub show_game_over: bool,
    pub final_score: String,
}

impl HudView {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            score: state.score.to_string(),
            high_score: state.high_score.to_string(),
            show_start: state.round == RoundState::NotStarted,
            show_game_over: state.round == RoundState::Ended,
            final_score: state.score.to_string(),
        }
    }
}

pub fn update_ui(document: &web_sys::Document, state: &GameState) {
    let view = HudView::from_state(state);

    set_text(document, "score", &view.score);
    set_text(document, "high-score", &view.high_score);
    set_text(document, "final-score", &view.final_score);
    set_visible(document, "start-overlay", view.show_start);
    set_visible(document, "game-over", view.show_game_over);
}

fn set_text(document: &web_sys::Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

fn set_visible(document: &web_sys::Document, id: &str, visible: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        let class_list = el.class_list();
        let result = if visible {
            class_list.remove_1("hidden")
        } else {
            class_list.add_1("hidden")
        };
        if result.is_err() {
            log::warn!("Could not toggle #{}", id);
        }
    }
}
