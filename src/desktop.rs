//! A simulated target window.
//!
//! Platform accessibility walkers are external collaborators; this in-process
//! editor stands in for one so `deskpilot run` and the integration tests can
//! exercise the whole loop without a real desktop.

use std::sync::Mutex;

use async_trait::async_trait;
use deskpilot_core_types::{Rect, UIElement};
use deskpilot_perceiver_structural::{AccessibilityProvider, PerceiverError, WindowHandle};

pub const DEMO_WINDOW_TITLE: &str = "DeskPilot Demo Editor";

const BODY_ID: &str = "1";
const SAVE_ID: &str = "2";

struct EditorState {
    title: String,
    body: String,
    saved: bool,
}

/// One window, one text body, one save button. Typing edits the body;
/// clicking save marks the title clean.
pub struct SimulatedDesktop {
    state: Mutex<EditorState>,
}

impl SimulatedDesktop {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EditorState {
                title: DEMO_WINDOW_TITLE.to_string(),
                body: String::new(),
                saved: true,
            }),
        }
    }

    pub fn body(&self) -> String {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).body.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SimulatedDesktop {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccessibilityProvider for SimulatedDesktop {
    async fn find_window(&self, name: &str) -> Result<WindowHandle, PerceiverError> {
        let state = self.lock();
        if state.title.contains(name) {
            Ok(WindowHandle(1))
        } else {
            Err(PerceiverError::WindowNotFound(name.to_string()))
        }
    }

    async fn scan(&self, _window: &WindowHandle) -> Result<Vec<UIElement>, PerceiverError> {
        let state = self.lock();
        Ok(vec![
            UIElement {
                id: BODY_ID.to_string(),
                name: "Body".to_string(),
                kind: "Edit".to_string(),
                value: state.body.clone(),
                is_enabled: true,
                bounds: Rect::new(8, 32, 624, 400),
            },
            UIElement {
                id: SAVE_ID.to_string(),
                name: "Save".to_string(),
                kind: "Button".to_string(),
                value: String::new(),
                is_enabled: !state.saved,
                bounds: Rect::new(8, 440, 80, 28),
            },
        ])
    }

    async fn window_title(&self, _window: &WindowHandle) -> Result<String, PerceiverError> {
        let state = self.lock();
        if state.saved {
            Ok(state.title.clone())
        } else {
            Ok(format!("{} *", state.title))
        }
    }

    async fn click(&self, _window: &WindowHandle, element_id: &str) -> Result<(), PerceiverError> {
        match element_id {
            SAVE_ID => {
                self.lock().saved = true;
                Ok(())
            }
            BODY_ID => Ok(()),
            other => Err(PerceiverError::ElementNotFound(other.to_string())),
        }
    }

    async fn enter(
        &self,
        _window: &WindowHandle,
        element_id: &str,
        text: &str,
    ) -> Result<(), PerceiverError> {
        if element_id != BODY_ID {
            return Err(PerceiverError::ElementNotFound(element_id.to_string()));
        }
        let mut state = self.lock();
        state.body = text.to_string();
        state.saved = false;
        Ok(())
    }

    async fn select(
        &self,
        _window: &WindowHandle,
        element_id: &str,
        _item: &str,
    ) -> Result<(), PerceiverError> {
        Err(PerceiverError::ElementNotFound(element_id.to_string()))
    }

    async fn move_mouse(&self, _x: i32, _y: i32) -> Result<(), PerceiverError> {
        Ok(())
    }

    async fn press_key(&self, _window: &WindowHandle, chord: &str) -> Result<(), PerceiverError> {
        if chord.eq_ignore_ascii_case("ctrl+s") {
            self.lock().saved = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn typing_dirties_the_title_and_saving_cleans_it() {
        let desktop = SimulatedDesktop::new();
        let window = desktop.find_window("Demo Editor").await.unwrap();
        desktop.enter(&window, BODY_ID, "hello").await.unwrap();
        assert!(desktop.window_title(&window).await.unwrap().ends_with('*'));
        desktop.click(&window, SAVE_ID).await.unwrap();
        assert_eq!(
            desktop.window_title(&window).await.unwrap(),
            DEMO_WINDOW_TITLE
        );
        assert_eq!(desktop.body(), "hello");
    }
}
