//! Boundary to the platform accessibility layer.

use async_trait::async_trait;
use deskpilot_core_types::{UIElement, UIState};

use crate::errors::PerceiverError;

/// Opaque reference to a top-level window owned by the provider.
///
/// Handles go stale when the window closes; callers re-acquire by name
/// rather than holding onto a dead handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowHandle(pub u64);

/// Platform accessibility walker.
///
/// Implementations wrap UIA/AT-SPI style trees. A failure on one element
/// must not abort the scan of its siblings; the provider skips the element
/// and keeps walking.
#[async_trait]
pub trait AccessibilityProvider: Send + Sync {
    /// Locate a top-level window whose title contains `name`.
    async fn find_window(&self, name: &str) -> Result<WindowHandle, PerceiverError>;

    /// Walk the window's subtree and report every reachable control.
    /// Returned ids are valid only until the next scan.
    async fn scan(&self, window: &WindowHandle) -> Result<Vec<UIElement>, PerceiverError>;

    /// Current title of the window, used for liveness and diffing.
    async fn window_title(&self, window: &WindowHandle) -> Result<String, PerceiverError>;

    async fn click(&self, window: &WindowHandle, element_id: &str) -> Result<(), PerceiverError>;

    /// Focus the element and enter text.
    async fn enter(
        &self,
        window: &WindowHandle,
        element_id: &str,
        text: &str,
    ) -> Result<(), PerceiverError>;

    /// Select a named item in a list or combo control.
    async fn select(
        &self,
        window: &WindowHandle,
        element_id: &str,
        item: &str,
    ) -> Result<(), PerceiverError>;

    async fn move_mouse(&self, x: i32, y: i32) -> Result<(), PerceiverError>;

    /// Send a key chord (e.g. "ctrl+s") to the focused control.
    async fn press_key(&self, window: &WindowHandle, chord: &str) -> Result<(), PerceiverError>;
}

/// Single construction point for snapshots; screenshots are attached later
/// by the session loop.
pub fn state_from_scan(title: String, process: String, elements: Vec<UIElement>) -> UIState {
    UIState {
        window_title: title,
        process_name: process,
        elements,
        screenshot: None,
        debug_screenshot: None,
    }
}
