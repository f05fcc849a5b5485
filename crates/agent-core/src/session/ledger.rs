//! Append-only record of everything the session did.

/// Ordering is causal; entries are never reordered or pruned within a
/// session.
#[derive(Clone, Debug, Default)]
pub struct HistoryLedger {
    entries: Vec<String>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_causal_order() {
        let mut ledger = HistoryLedger::new();
        ledger.push("click 3 =>TitleChanged");
        ledger.push("type 5 hello =>ContentChanged");
        assert_eq!(
            ledger.to_vec(),
            vec![
                "click 3 =>TitleChanged".to_string(),
                "type 5 hello =>ContentChanged".to_string(),
            ]
        );
    }
}
