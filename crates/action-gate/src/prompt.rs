//! Operator confirmation boundary.

use std::io::{self, BufRead, Write};

/// Asks the operator for one yes/no answer. The call blocks; the loop must
/// not act while the question is open.
pub trait ConfirmationPrompt: Send + Sync {
    /// Returns the raw answer line, or `None` on EOF.
    fn ask(&self, question: &str) -> Option<String>;
}

impl<T: ConfirmationPrompt + ?Sized> ConfirmationPrompt for std::sync::Arc<T> {
    fn ask(&self, question: &str) -> Option<String> {
        (**self).ask(question)
    }
}

/// Single-line stdin prompt used by the interactive client.
pub struct StdinPrompt;

impl ConfirmationPrompt for StdinPrompt {
    fn ask(&self, question: &str) -> Option<String> {
        // Errors writing the question still allow an answer to be read.
        let _ = write!(io::stdout(), "{question} [y/N] ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        }
    }
}
