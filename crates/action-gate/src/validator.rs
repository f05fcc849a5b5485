//! High-risk classification and the confirmation flow.

use deskpilot_core_types::Command;
use tracing::{info, warn};

use crate::prompt::ConfirmationPrompt;
use crate::types::GateDecision;

/// Actions that destroy data, run programs or push content outside the
/// controlled window. Fixed set; matched case-insensitively.
const HIGH_RISK: [&str; 7] = [
    "os_delete",
    "os_kill",
    "os_run",
    "os_write",
    "reg_write",
    "write_clipboard",
    "download",
];

pub fn is_high_risk(action: &str) -> bool {
    let action = action.trim().to_ascii_lowercase();
    HIGH_RISK.contains(&action.as_str())
}

/// Gate in front of the executor. Permissive mode waves everything through
/// and exists for unattended runs the operator has explicitly opted into.
pub struct SafetyGate<P> {
    prompt: P,
    permissive: bool,
}

impl<P: ConfirmationPrompt> SafetyGate<P> {
    pub fn new(prompt: P, permissive: bool) -> Self {
        Self { prompt, permissive }
    }

    pub fn check(&self, command: &Command) -> GateDecision {
        if !is_high_risk(command.action.as_str()) {
            return GateDecision::Approved;
        }
        if self.permissive {
            warn!(action = %command.action, "permissive mode, skipping confirmation");
            return GateDecision::Approved;
        }
        let question = format!(
            "About to run high-risk action '{}' on '{}' with '{}'. Continue?",
            command.action, command.element_id, command.text
        );
        let approved = match self.prompt.ask(&question) {
            Some(answer) => {
                let answer = answer.trim().to_ascii_lowercase();
                answer == "y" || answer == "yes"
            }
            // EOF counts as a denial.
            None => false,
        };
        if approved {
            info!(action = %command.action, "operator approved");
            GateDecision::Approved
        } else {
            info!(action = %command.action, "operator denied");
            GateDecision::Denied
        }
    }
}

#[cfg(test)]
mod tests {
    use deskpilot_core_types::{ActionKind, Command};

    use super::*;

    struct ScriptedPrompt(Option<&'static str>);

    impl ConfirmationPrompt for ScriptedPrompt {
        fn ask(&self, _question: &str) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    fn command(action: ActionKind) -> Command {
        Command::new(action)
    }

    #[test]
    fn risk_set_is_case_insensitive() {
        assert!(is_high_risk("OS_DELETE"));
        assert!(is_high_risk("download"));
        assert!(!is_high_risk("click"));
        assert!(!is_high_risk("read_clipboard"));
    }

    #[test]
    fn only_y_or_yes_approves() {
        for (answer, approved) in [
            ("y", true),
            ("Y", true),
            ("yes", true),
            (" YES \n", true),
            ("n", false),
            ("", false),
            ("yeah", false),
        ] {
            let gate = SafetyGate::new(ScriptedPrompt(Some(answer)), false);
            let decision = gate.check(&command(ActionKind::OsDelete));
            assert_eq!(decision.is_approved(), approved, "answer {answer:?}");
        }
    }

    #[test]
    fn eof_denies() {
        let gate = SafetyGate::new(ScriptedPrompt(None), false);
        assert_eq!(gate.check(&command(ActionKind::OsRun)), GateDecision::Denied);
    }

    #[test]
    fn low_risk_never_prompts() {
        let gate = SafetyGate::new(ScriptedPrompt(Some("n")), false);
        assert!(gate.check(&command(ActionKind::Click)).is_approved());
    }

    #[test]
    fn permissive_mode_approves_high_risk() {
        let gate = SafetyGate::new(ScriptedPrompt(Some("n")), true);
        assert!(gate.check(&command(ActionKind::OsDelete)).is_approved());
    }
}
