use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use three_d::Key;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::game::{Action, Direction, RoundState};

/// Minimum swipe length in CSS pixels.
pub const SWIPE_THRESHOLD_PX: f64 = 20.0;

/// What a key, button or gesture asks for, before it is resolved against
/// the current round state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    /// Start button / Space / Enter: starts a fresh round or plays again.
    Primary,
    Reset,
    /// The page went to the background.
    Suspend,
    Resume,
}

impl Command {
    /// The game action this command maps to, if any. `Suspend` and `Resume`
    /// only affect the tick clock and never reach the game state.
    pub fn to_action(self, round: RoundState) -> Option<Action> {
        match self {
            Command::Turn(dir) => Some(Action::Turn(dir)),
            Command::Primary => match round {
                RoundState::NotStarted => Some(Action::Start),
                RoundState::Ended => Some(Action::Reset),
                RoundState::Running => None,
            },
            Command::Reset => Some(Action::Reset),
            Command::Suspend | Command::Resume => None,
        }
    }
}

/// Keys that are not part of the controls map to `None`.
pub fn command_for_key(key: Key) -> Option<Command> {
    match key {
        Key::ArrowUp | Key::W => Some(Command::Turn(Direction::Up)),
        Key::ArrowDown | Key::S => Some(Command::Turn(Direction::Down)),
        Key::ArrowLeft | Key::A => Some(Command::Turn(Direction::Left)),
        Key::ArrowRight | Key::D => Some(Command::Turn(Direction::Right)),
        Key::Space | Key::Enter => Some(Command::Primary),
        Key::R => Some(Command::Reset),
        _ => None,
    }
}

/// Dominant axis wins; gestures shorter than the threshold are ignored.
pub fn swipe_direction(dx: f64, dy: f64) -> Option<Direction> {
    if dx.abs() > dy.abs() {
        if dx > SWIPE_THRESHOLD_PX {
            Some(Direction::Right)
        } else if dx < -SWIPE_THRESHOLD_PX {
            Some(Direction::Left)
        } else {
            None
        }
    } else if dy > SWIPE_THRESHOLD_PX {
        Some(Direction::Down)
    } else if dy < -SWIPE_THRESHOLD_PX {
        Some(Direction::Up)
    } else {
        None
    }
}

/// Parses the `data-dir` attribute of the on-screen arrow buttons.
pub fn direction_from_name(name: &str) -> Option<Direction> {
    match name.trim().to_ascii_lowercase().as_str() {
        "up" => Some(Direction::Up),
        "down" => Some(Direction::Down),
        "left" => Some(Direction::Left),
        "right" => Some(Direction::Right),
        _ => None,
    }
}

/// Single-threaded mailbox between DOM listeners and the frame loop.
#[derive(Clone, Default)]
pub struct CommandQueue {
    inner: Rc<RefCell<VecDeque<Command>>>,
}

impl CommandQueue {
    pub fn push(&self, command: Command) {
        self.inner.borrow_mut().push_back(command);
    }

    /// Takes everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<Command> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

/// Swipe detection on the game canvas.
pub fn attach_touch_controls(
    canvas: &web_sys::HtmlCanvasElement,
    queue: &CommandQueue,
) -> Result<(), JsValue> {
    let touch_start: Rc<Cell<Option<(f64, f64)>>> = Rc::new(Cell::new(None));

    let start = touch_start.clone();
    let on_start = Closure::<dyn FnMut(web_sys::TouchEvent)>::new(move |event: web_sys::TouchEvent| {
        if let Some(touch) = event.touches().get(0) {
            start.set(Some((touch.client_x() as f64, touch.client_y() as f64)));
        }
    });
    canvas.add_event_listener_with_callback("touchstart", on_start.as_ref().unchecked_ref())?;
    on_start.forget();

    let queue = queue.clone();
    let on_end = Closure::<dyn FnMut(web_sys::TouchEvent)>::new(move |event: web_sys::TouchEvent| {
        let Some((x0, y0)) = touch_start.take() else {
            return;
        };
        if let Some(touch) = event.changed_touches().get(0) {
            let dx = touch.client_x() as f64 - x0;
            let dy = touch.client_y() as f64 - y0;
            if let Some(dir) = swipe_direction(dx, dy) {
                event.prevent_default();
                queue.push(Command::Turn(dir));
            }
        }
    });
    canvas.add_event_listener_with_callback("touchend", on_end.as_ref().unchecked_ref())?;
    on_end.forget();

    Ok(())
}

/// Arrow buttons (`[data-dir]`), `#start-button` and `#play-again-button`.
pub fn attach_buttons(document: &web_sys::Document, queue: &CommandQueue) -> Result<(), JsValue> {
    let arrows = document.query_selector_all("[data-dir]")?;
    for i in 0..arrows.length() {
        let Some(node) = arrows.get(i) else {
            continue;
        };
        let Ok(element) = node.dyn_into::<web_sys::Element>() else {
            continue;
        };
        let Some(dir) = element
            .get_attribute("data-dir")
            .and_then(|name| direction_from_name(&name))
        else {
            log::warn!("Ignoring arrow button with unknown data-dir");
            continue;
        };
        on_click(&element, queue, Command::Turn(dir))?;
    }

    if let Some(button) = document.get_element_by_id("start-button") {
        on_click(&button, queue, Command::Primary)?;
    }
    if let Some(button) = document.get_element_by_id("play-again-button") {
        on_click(&button, queue, Command::Reset)?;
    }
    Ok(())
}

/// Suspends ticking while the page is hidden.
pub fn attach_visibility(document: &web_sys::Document, queue: &CommandQueue) -> Result<(), JsValue> {
    let doc = document.clone();
    let queue = queue.clone();
    let on_change = Closure::<dyn FnMut()>::new(move || {
        queue.push(if doc.hidden() {
            Command::Suspend
        } else {
            Command::Resume
        });
    });
    document.add_event_listener_with_callback("visibilitychange", on_change.as_ref().unchecked_ref())?;
    on_change.forget();
    Ok(())
}

fn on_click(element: &web_sys::Element, queue: &CommandQueue, command: Command) -> Result<(), JsValue> {
    let queue = queue.clone();
    let handler = Closure::<dyn FnMut()>::new(move || queue.push(command));
    element.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())?;
    handler.forget();
    Ok(())
}
