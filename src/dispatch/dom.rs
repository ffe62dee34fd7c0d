//! The one window `keydown` listener feeding a session's dispatcher.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{KeyboardEvent, Window};

use super::{Handled, InputDispatcher};
use crate::editor::KeyInput;

/// Window keydown listener, removed from the window when dropped.
pub struct WindowKeyListener {
    window: Window,
    closure: Closure<dyn FnMut(KeyboardEvent)>,
}

impl WindowKeyListener {
    /// Attach to the global window. Returns `None` outside a browser.
    pub fn attach(dispatcher: &InputDispatcher<KeyInput>) -> Option<Self> {
        let window = web_sys::window()?;
        let dispatcher = dispatcher.clone();
        let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            let input = key_input(&event);
            if dispatcher.dispatch(&input) == Handled::Consumed {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);

        if let Err(e) =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
        {
            log::warn!("could not attach keydown listener: {e:?}");
            return None;
        }
        Some(Self { window, closure })
    }
}

impl Drop for WindowKeyListener {
    fn drop(&mut self) {
        self.window
            .remove_event_listener_with_callback("keydown", self.closure.as_ref().unchecked_ref())
            .ok();
    }
}

fn key_input(event: &KeyboardEvent) -> KeyInput {
    KeyInput {
        key: event.key(),
        ctrl: event.ctrl_key(),
        meta: event.meta_key(),
        shift: event.shift_key(),
        alt: event.alt_key(),
        input_focused: text_input_focused(),
    }
}

fn text_input_focused() -> bool {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.active_element())
        .is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA"))
}
