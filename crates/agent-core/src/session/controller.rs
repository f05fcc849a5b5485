//! The session loop: scan, decide, gate, execute, diff, record.

use std::sync::Arc;

use deskpilot_action_gate::{ConfirmationPrompt, SafetyGate};
use deskpilot_core_types::history::tags;
use deskpilot_core_types::{ActionKind, Command, UIState};
use deskpilot_perceiver_structural::{diff_states, StateScanner, WindowHandle};
use deskpilot_perceiver_visual::{
    debug_frame, to_base64, FrameSource, VisionPipeline, DEFAULT_OVERVIEW_QUALITY,
};
use tracing::{error, info, warn};

use crate::client::DecisionProvider;
use crate::errors::AgentError;
use crate::session::config::SessionConfig;
use crate::session::executor::{ExecOutcome, Executor};
use crate::session::ledger::HistoryLedger;
use crate::session::types::{SessionOutcome, SessionStatus};

type Prompt = Arc<dyn ConfirmationPrompt>;

/// Owns the window handle and drives one task to a terminal state.
/// One session per process; nothing else mutates the target window.
pub struct SessionController<D: DecisionProvider> {
    config: SessionConfig,
    scanner: StateScanner,
    executor: Executor,
    decider: D,
    gate: SafetyGate<Prompt>,
    prompt: Prompt,
    frames: Option<Arc<dyn FrameSource>>,
    vision: VisionPipeline,
    ledger: HistoryLedger,
}

impl<D: DecisionProvider> SessionController<D> {
    pub fn new(
        config: SessionConfig,
        scanner: StateScanner,
        executor: Executor,
        decider: D,
        prompt: Prompt,
        frames: Option<Arc<dyn FrameSource>>,
    ) -> Self {
        let gate = SafetyGate::new(prompt.clone(), config.permissive);
        Self {
            config,
            scanner,
            executor,
            decider,
            gate,
            prompt,
            frames,
            vision: VisionPipeline::new(),
            ledger: HistoryLedger::new(),
        }
    }

    /// Run the loop until a terminal state. Returns `Err` only for setup
    /// failures; in-loop failures map to an `Aborted` outcome.
    pub async fn run(&mut self, task: &str) -> SessionOutcome {
        let mut window = match self.scanner.find_window(&self.config.window_name).await {
            Ok(w) => w,
            Err(err) => {
                error!(%err, window = %self.config.window_name, "target window not found");
                return self.outcome(SessionStatus::Aborted, 0, Some(err.to_string()));
            }
        };
        info!(task, window = %self.config.window_name, "session started");

        // Quality requested by the last inspect_screen; 0 means text-only.
        let mut pending_quality: u32 = 0;

        for step in 1..=self.config.max_steps {
            let state = match self.scan_with_reacquire(&mut window).await {
                Ok(state) => state,
                Err(err) => {
                    error!(step, %err, "window lost");
                    return self.outcome(SessionStatus::Aborted, step, Some(err.to_string()));
                }
            };
            let state = self.attach_screenshots(state, &mut pending_quality).await;
            let pre = state.clone();

            let decision = match self
                .decider
                .decide(task, state, self.ledger.to_vec())
                .await
            {
                Ok(d) => d,
                Err(err) => {
                    error!(step, %err, "decision request failed");
                    return self.outcome(SessionStatus::Aborted, step, Some(err.to_string()));
                }
            };
            if let Some(id) = decision.canonical_client_id.clone() {
                self.decider.adopt_identity(id);
            }
            if !decision.success {
                error!(step, error = %decision.error, "server could not decide");
                return self.outcome(SessionStatus::Aborted, step, Some(decision.error));
            }
            if decision.task_completed {
                info!(step, reasoning = %decision.reasoning, "task completed");
                return self.outcome(SessionStatus::Completed, step, None);
            }
            let Some(command) = decision.command else {
                let msg = "successful decision carried no command".to_string();
                return self.outcome(SessionStatus::Aborted, step, Some(msg));
            };
            info!(step, action = %command.action, reasoning = %decision.reasoning, "decided");

            match &command.action {
                ActionKind::InspectScreen => {
                    pending_quality = command
                        .text
                        .trim()
                        .parse()
                        .unwrap_or(u32::from(DEFAULT_OVERVIEW_QUALITY));
                    self.ledger.push(format!(
                        "{} screenshot requested at quality {pending_quality}",
                        tags::SYSTEM
                    ));
                }
                ActionKind::AskUser => {
                    let answer = self
                        .prompt
                        .ask(&command.message)
                        .unwrap_or_default()
                        .trim()
                        .to_string();
                    self.ledger.push(format!("{} {answer}", tags::USER_SAID));
                }
                _ => {
                    if let Err(err) = self
                        .gate_and_execute(&mut window, &command, &pre)
                        .await
                    {
                        error!(step, %err, "step failed fatally");
                        return self.outcome(SessionStatus::Aborted, step, Some(err.to_string()));
                    }
                }
            }
        }

        warn!(max_steps = self.config.max_steps, "step budget exhausted");
        self.outcome(SessionStatus::MaxStepsReached, self.config.max_steps, None)
    }

    /// One re-acquire by name when the handle went stale; a second failure
    /// bubbles up and aborts the session.
    async fn scan_with_reacquire(
        &self,
        window: &mut WindowHandle,
    ) -> Result<UIState, AgentError> {
        match self.scanner.snapshot(window).await {
            Ok(state) => Ok(state),
            Err(err) => {
                warn!(%err, "scan failed, re-acquiring window");
                *window = self.scanner.find_window(&self.config.window_name).await?;
                Ok(self.scanner.snapshot(window).await?)
            }
        }
    }

    /// Debug frame on every step; model-facing overview only while a
    /// screenshot request is pending, encoded at the requested JPEG quality,
    /// after which the flag resets.
    async fn attach_screenshots(&mut self, mut state: UIState, pending: &mut u32) -> UIState {
        let Some(frames) = &self.frames else {
            *pending = 0;
            return state;
        };
        match frames.capture().await {
            Ok(frame) => {
                match debug_frame(&frame) {
                    Ok(bytes) => state.debug_screenshot = Some(to_base64(&bytes)),
                    Err(err) => warn!(%err, "debug frame encode failed"),
                }
                if *pending > 0 {
                    let quality = (*pending).min(100) as u8;
                    match self.vision.overview(&frame, quality) {
                        Ok(bytes) => state.screenshot = Some(to_base64(&bytes)),
                        Err(err) => warn!(%err, "overview encode failed"),
                    }
                }
            }
            Err(err) => warn!(%err, "screen capture failed"),
        }
        *pending = 0;
        state
    }

    async fn gate_and_execute(
        &mut self,
        window: &mut WindowHandle,
        command: &Command,
        pre: &UIState,
    ) -> Result<(), AgentError> {
        if !self.gate.check(command).is_approved() {
            self.ledger.push(format!(
                "{} operator denied '{}'",
                tags::FAILED,
                command.summary()
            ));
            return Ok(());
        }
        match self.executor.execute(window, command).await {
            Ok(ExecOutcome::Ui) => {
                tokio::time::sleep(self.config.settle_delay).await;
                let post = self.scanner.snapshot(window).await?;
                let change = diff_states(pre, &post);
                self.ledger
                    .push(format!("{} =>{}", command.summary(), change));
            }
            Ok(ExecOutcome::Note(entry)) => {
                tokio::time::sleep(self.config.settle_delay).await;
                self.ledger.push(entry);
            }
            Ok(ExecOutcome::Window(handle)) => {
                *window = handle;
                self.ledger
                    .push(format!("{} => switched window", command.summary()));
            }
            // Failed commands are recorded, not fatal.
            Err(AgentError::Execution(msg)) => {
                self.ledger
                    .push(format!("{} {}: {msg}", tags::FAILED, command.summary()));
            }
            Err(AgentError::Perception(err)) => {
                self.ledger
                    .push(format!("{} {}: {err}", tags::FAILED, command.summary()));
            }
            Err(other) => return Err(other),
        }
        Ok(())
    }

    fn outcome(&self, status: SessionStatus, steps: u32, error: Option<String>) -> SessionOutcome {
        SessionOutcome {
            status,
            steps,
            history: self.ledger.to_vec(),
            error,
        }
    }
}
