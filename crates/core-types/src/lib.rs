//! Shared primitives for the DeskPilot kernel crates.
//!
//! Everything that crosses the client/server wire lives here: UI snapshots,
//! commands, the decide request/response pair and the history tag
//! conventions. Wire field names are PascalCase for compatibility with
//! existing agents.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod history;

pub use history::{latest_memory, tags};

/// Element bounds in screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounds are usable for coordinate targeting only when both sides are positive.
    pub fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// One control as reported by the accessibility provider.
///
/// `id` resolves back to a live control for the lifetime of a single step
/// only; ids are not stable across scans.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UIElement {
    pub id: String,
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub value: String,
    pub is_enabled: bool,
    pub bounds: Rect,
}

impl UIElement {
    /// Elements with no label and no value carry no signal for the model
    /// unless they are interactive controls.
    pub fn is_significant(&self) -> bool {
        (!self.name.trim().is_empty() || !self.value.trim().is_empty())
            && self.bounds.is_positive()
    }

    /// Interactive control kinds (Button/Edit/Item-like) are kept in the
    /// prompt summary even when unnamed.
    pub fn is_interactive(&self) -> bool {
        let kind = self.kind.to_ascii_lowercase();
        kind.contains("button") || kind.contains("edit") || kind.contains("item")
    }

    /// Element kinds whose value participates in the text-content signature.
    pub fn is_text_bearing(&self) -> bool {
        let kind = self.kind.to_ascii_lowercase();
        kind.contains("text") || kind.contains("edit") || kind.contains("document")
    }
}

/// Immutable snapshot of one window, created fresh on every scan.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UIState {
    pub window_title: String,
    pub process_name: String,
    #[serde(default)]
    pub elements: Vec<UIElement>,
    /// Model-facing screenshot (base64 JPEG), present only when the previous
    /// decision requested visual inspection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    /// Low-fidelity record captured on every step regardless of model need.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_screenshot: Option<String>,
}

/// Closed action vocabulary with an explicit fallback for anything the
/// decision model invents. Parsed case-insensitively at the protocol edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Click,
    Type,
    Key,
    Select,
    MouseMove,
    Wait,
    Download,
    InspectScreen,
    AskUser,
    ReadClipboard,
    WriteClipboard,
    OsList,
    OsDelete,
    OsRead,
    OsRun,
    OsKill,
    OsMkdir,
    OsWrite,
    OsExists,
    SwitchWindow,
    NetSearch,
    CreatePlaybook,
    /// Completion sentinel: servers answer task completion with an empty action.
    None,
    Unknown(String),
}

impl ActionKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => Self::None,
            "click" => Self::Click,
            "type" => Self::Type,
            "key" => Self::Key,
            "select" => Self::Select,
            "mouse_move" => Self::MouseMove,
            "wait" => Self::Wait,
            "download" => Self::Download,
            "inspect_screen" => Self::InspectScreen,
            "ask_user" => Self::AskUser,
            "read_clipboard" => Self::ReadClipboard,
            "write_clipboard" => Self::WriteClipboard,
            "os_list" => Self::OsList,
            "os_delete" => Self::OsDelete,
            "os_read" => Self::OsRead,
            "os_run" => Self::OsRun,
            "os_kill" => Self::OsKill,
            "os_mkdir" => Self::OsMkdir,
            "os_write" => Self::OsWrite,
            "os_exists" => Self::OsExists,
            "switch_window" => Self::SwitchWindow,
            "net_search" => Self::NetSearch,
            "create_playbook" => Self::CreatePlaybook,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::Type => "type",
            Self::Key => "key",
            Self::Select => "select",
            Self::MouseMove => "mouse_move",
            Self::Wait => "wait",
            Self::Download => "download",
            Self::InspectScreen => "inspect_screen",
            Self::AskUser => "ask_user",
            Self::ReadClipboard => "read_clipboard",
            Self::WriteClipboard => "write_clipboard",
            Self::OsList => "os_list",
            Self::OsDelete => "os_delete",
            Self::OsRead => "os_read",
            Self::OsRun => "os_run",
            Self::OsKill => "os_kill",
            Self::OsMkdir => "os_mkdir",
            Self::OsWrite => "os_write",
            Self::OsExists => "os_exists",
            Self::SwitchWindow => "switch_window",
            Self::NetSearch => "net_search",
            Self::CreatePlaybook => "create_playbook",
            Self::None => "",
            Self::Unknown(raw) => raw.as_str(),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ActionKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActionKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

fn default_delay_ms() -> u64 {
    100
}

/// Next atomic UI action, produced once by the decision server and consumed
/// exactly once by the executor.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Command {
    pub action: ActionKind,
    #[serde(default)]
    pub element_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_file_name: Option<String>,
}

impl Command {
    pub fn new(action: ActionKind) -> Self {
        Self {
            action,
            element_id: String::new(),
            text: String::new(),
            x: 0,
            y: 0,
            delay_ms: default_delay_ms(),
            message: String::new(),
            url: None,
            local_file_name: None,
        }
    }

    /// Ledger rendering: action, target and payload on one line.
    pub fn summary(&self) -> String {
        format!("{} {} {}", self.action, self.element_id, self.text)
            .trim_end()
            .to_string()
    }
}

/// Body of `POST /decide`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DecideRequest {
    #[serde(default = "unknown_client")]
    pub client_id: String,
    pub state: UIState,
    pub task: String,
    #[serde(default)]
    pub history: Vec<String>,
}

fn unknown_client() -> String {
    "unknown".to_string()
}

/// Server answer for one decide round trip.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DecideResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Command>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub task_completed: bool,
    #[serde(default)]
    pub reasoning: String,
    /// The server may reassign identity; clients adopt this id when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_client_id: Option<String>,
}

impl DecideResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            ..Self::default()
        }
    }

    pub fn completed(message: impl Into<String>) -> Self {
        let mut command = Command::new(ActionKind::None);
        command.message = message.into();
        Self {
            command: Some(command),
            success: true,
            task_completed: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_kind_round_trip() {
        for raw in ["click", "type", "net_search", "inspect_screen"] {
            assert_eq!(ActionKind::parse(raw).as_str(), raw);
        }
        assert_eq!(ActionKind::parse("CLICK"), ActionKind::Click);
        assert_eq!(
            ActionKind::parse("teleport"),
            ActionKind::Unknown("teleport".to_string())
        );
        assert_eq!(ActionKind::parse(""), ActionKind::None);
    }

    #[test]
    fn command_defaults_on_sparse_json() {
        let cmd: Command = serde_json::from_str(r#"{"Action":"type","ElementId":"1"}"#).unwrap();
        assert_eq!(cmd.action, ActionKind::Type);
        assert_eq!(cmd.delay_ms, 100);
        assert!(cmd.text.is_empty());
    }

    #[test]
    fn request_wire_names_are_pascal_case() {
        let req = DecideRequest {
            client_id: "c1".into(),
            state: UIState::default(),
            task: "type hello".into(),
            history: vec![],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("ClientId").is_some());
        assert!(json.get("State").is_some());
        assert!(json["State"].get("WindowTitle").is_some());
    }

    #[test]
    fn element_significance() {
        let mut el = UIElement {
            id: "7".into(),
            name: String::new(),
            kind: "Text".into(),
            value: String::new(),
            is_enabled: true,
            bounds: Rect::new(0, 0, 10, 10),
        };
        assert!(!el.is_significant());
        el.value = "hello".into();
        assert!(el.is_significant());
        el.bounds = Rect::default();
        assert!(!el.is_significant());
    }
}
