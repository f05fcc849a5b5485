//! Coarse classification of what changed between two snapshots.

use deskpilot_core_types::UIState;
use serde::{Deserialize, Serialize};

use crate::scanner::content_signature;

/// Outcome classes in priority order: a title change masks a content change,
/// a content change masks a count change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateChange {
    TitleChanged,
    ContentChanged,
    ElementCountChanged,
    NoChange,
}

impl StateChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TitleChanged => "TitleChanged",
            Self::ContentChanged => "ContentChanged",
            Self::ElementCountChanged => "ElementCountChanged",
            Self::NoChange => "NoChange",
        }
    }
}

impl std::fmt::Display for StateChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn diff_states(before: &UIState, after: &UIState) -> StateChange {
    if before.window_title != after.window_title {
        return StateChange::TitleChanged;
    }
    if content_signature(before) != content_signature(after) {
        return StateChange::ContentChanged;
    }
    if before.elements.len() != after.elements.len() {
        return StateChange::ElementCountChanged;
    }
    StateChange::NoChange
}

#[cfg(test)]
mod tests {
    use deskpilot_core_types::{Rect, UIElement};

    use super::*;
    use crate::ports::state_from_scan;

    fn text_element(id: &str, value: &str) -> UIElement {
        UIElement {
            id: id.into(),
            name: String::new(),
            kind: "Text".into(),
            value: value.into(),
            is_enabled: true,
            bounds: Rect::new(0, 0, 50, 20),
        }
    }

    fn state(title: &str, elements: Vec<UIElement>) -> UIState {
        state_from_scan(title.into(), "app".into(), elements)
    }

    #[test]
    fn identical_states_report_no_change() {
        let a = state("Editor", vec![text_element("1", "hello")]);
        let b = a.clone();
        assert_eq!(diff_states(&a, &b), StateChange::NoChange);
    }

    #[test]
    fn title_wins_over_content() {
        let a = state("Editor", vec![text_element("1", "hello")]);
        let b = state("Editor *", vec![text_element("1", "bye")]);
        assert_eq!(diff_states(&a, &b), StateChange::TitleChanged);
    }

    #[test]
    fn content_wins_over_count() {
        let a = state("Editor", vec![text_element("1", "hello")]);
        let b = state(
            "Editor",
            vec![text_element("1", "hello world"), text_element("2", "x")],
        );
        assert_eq!(diff_states(&a, &b), StateChange::ContentChanged);
    }

    #[test]
    fn count_change_with_same_text() {
        let mut button = text_element("2", "");
        button.kind = "Button".into();
        button.name = "OK".into();
        let a = state("Editor", vec![text_element("1", "hello")]);
        let b = state("Editor", vec![text_element("1", "hello"), button]);
        assert_eq!(diff_states(&a, &b), StateChange::ElementCountChanged);
    }
}
