//! Snapshotting the accessibility tree into `UIState` values.

use std::sync::Arc;

use deskpilot_core_types::UIState;
use tracing::debug;

use crate::errors::PerceiverError;
use crate::ports::{state_from_scan, AccessibilityProvider, WindowHandle};

/// Produces fresh, immutable snapshots of one window.
pub struct StateScanner {
    provider: Arc<dyn AccessibilityProvider>,
    process_name: String,
}

impl StateScanner {
    pub fn new(provider: Arc<dyn AccessibilityProvider>, process_name: impl Into<String>) -> Self {
        Self {
            provider,
            process_name: process_name.into(),
        }
    }

    /// Re-acquire the target window by name after a handle went stale.
    pub async fn find_window(&self, name: &str) -> Result<WindowHandle, PerceiverError> {
        self.provider.find_window(name).await
    }

    /// One full scan. Insignificant elements (no name, no value, or empty
    /// bounds) are dropped unless they are interactive controls.
    pub async fn snapshot(&self, window: &WindowHandle) -> Result<UIState, PerceiverError> {
        let title = self.provider.window_title(window).await?;
        let raw = self.provider.scan(window).await?;
        let total = raw.len();
        let elements: Vec<_> = raw
            .into_iter()
            .filter(|el| el.is_significant() || el.is_interactive())
            .collect();
        debug!(
            window = %title,
            kept = elements.len(),
            scanned = total,
            "ui snapshot"
        );
        Ok(state_from_scan(title, self.process_name.clone(), elements))
    }
}

/// Concatenated values of text-bearing elements. Two snapshots with the same
/// signature are treated as having the same visible text content.
pub fn content_signature(state: &UIState) -> String {
    state
        .elements
        .iter()
        .filter(|el| el.is_text_bearing())
        .map(|el| el.value.as_str())
        .collect::<Vec<_>>()
        .join("|")
}
