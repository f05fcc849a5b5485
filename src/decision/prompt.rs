//! Prompt assembly for the decision model.

use deskpilot_core_types::UIState;

/// Hard cap on element lines in the prompt. Dense windows get truncated,
/// not the request rejected.
pub const MAX_ELEMENT_LINES: usize = 100;

/// One line per element the model could plausibly target. Elements with
/// neither name nor value are noise unless they are interactive controls.
pub fn element_summary(state: &UIState) -> String {
    let mut lines = Vec::new();
    let mut omitted = 0usize;
    for el in &state.elements {
        if !el.is_significant() && !el.is_interactive() {
            continue;
        }
        if lines.len() >= MAX_ELEMENT_LINES {
            omitted += 1;
            continue;
        }
        let mut line = format!("[{}] {} '{}'", el.id, el.kind, el.name);
        if !el.value.is_empty() {
            line.push_str(&format!(" value='{}'", el.value));
        }
        if !el.is_enabled {
            line.push_str(" (disabled)");
        }
        if el.bounds.is_positive() {
            let (cx, cy) = el.bounds.center();
            line.push_str(&format!(" center=({cx},{cy})"));
        }
        lines.push(line);
    }
    if omitted > 0 {
        lines.push(format!("... {omitted} more elements omitted"));
    }
    if lines.is_empty() {
        "(no visible elements)".to_string()
    } else {
        lines.join("\n")
    }
}

pub fn build_prompt(task: &str, memory: &str, history: &[String], state: &UIState) -> String {
    let numbered = if history.is_empty() {
        "(none)".to_string()
    } else {
        history
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{}. {entry}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "You are a desktop automation operator controlling the window \
\"{title}\" of process \"{process}\".\n\
\n\
Goal: {task}\n\
\n\
System memory (latest out-of-band result): {memory}\n\
\n\
Steps so far:\n{numbered}\n\
\n\
Visible UI elements:\n{summary}\n\
\n\
Decide the single next atomic action. Respond with exactly one JSON object \
and nothing else, with the fields: action, element_id, text, reasoning, \
message, delay_ms, task_completed.\n\
Actions: click, type, key, select, mouse_move, wait, download, \
inspect_screen, ask_user, read_clipboard, write_clipboard, os_list, \
os_read, os_write, os_delete, os_exists, os_mkdir, os_run, os_kill, \
switch_window, net_search, create_playbook.\n\
Set task_completed to true with a short message once the goal is met. Use \
inspect_screen with text set to a JPEG quality from 1 to 100 (60 is \
usually enough) when the element list is not enough to act. Use net_search with text set to the query to \
look something up. Use create_playbook with message set to a name and \
text set to the steps to save a reusable procedure.",
        title = state.window_title,
        process = state.process_name,
        summary = element_summary(state),
    )
}

#[cfg(test)]
mod tests {
    use deskpilot_core_types::{Rect, UIElement};

    use super::*;

    fn element(id: usize, kind: &str, name: &str) -> UIElement {
        UIElement {
            id: id.to_string(),
            name: name.into(),
            kind: kind.into(),
            value: String::new(),
            is_enabled: true,
            bounds: Rect::new(10, 10, 100, 20),
        }
    }

    #[test]
    fn summary_caps_at_a_hundred_lines() {
        let state = UIState {
            window_title: "W".into(),
            process_name: "p".into(),
            elements: (0..150).map(|i| element(i, "Button", "b")).collect(),
            screenshot: None,
            debug_screenshot: None,
        };
        let summary = element_summary(&state);
        assert_eq!(summary.lines().count(), MAX_ELEMENT_LINES + 1);
        assert!(summary.ends_with("50 more elements omitted"));
    }

    #[test]
    fn nameless_static_elements_are_dropped() {
        let mut pane = element(1, "Pane", "");
        pane.bounds = Rect::default();
        let state = UIState {
            window_title: "W".into(),
            process_name: "p".into(),
            elements: vec![pane, element(2, "Button", "")],
            screenshot: None,
            debug_screenshot: None,
        };
        let summary = element_summary(&state);
        assert_eq!(summary.lines().count(), 1);
        assert!(summary.starts_with("[2] Button"));
    }

    #[test]
    fn prompt_carries_memory_and_history() {
        let state = UIState::default();
        let history = vec!["OS_RESULT: ok".to_string()];
        let prompt = build_prompt("do it", "OS_RESULT: ok", &history, &state);
        assert!(prompt.contains("Goal: do it"));
        assert!(prompt.contains("System memory (latest out-of-band result): OS_RESULT: ok"));
        assert!(prompt.contains("1. OS_RESULT: ok"));
    }
}
