//! Operator interaction: yes/no questions asked during a run.

use async_trait::async_trait;

/// Asks the operator to confirm an action.
///
/// The terminal implementation reads stdin; tests script the answers.
#[async_trait]
pub trait Prompter: Send {
    /// Ask a yes/no question. Anything other than an explicit yes is a no.
    async fn confirm(&mut self, question: &str) -> bool;
}

/// Whether a typed answer counts as "yes".
pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "si" | "sí"
    )
}

/// A prompter that answers every question the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

#[async_trait]
impl Prompter for FixedAnswer {
    async fn confirm(&mut self, _question: &str) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_answers() {
        for answer in ["y", "YES", " s ", "si", "Sí"] {
            assert!(is_affirmative(answer), "{answer:?} should be yes");
        }
    }

    #[test]
    fn everything_else_is_no() {
        for answer in ["", "n", "no", "yep", "maybe"] {
            assert!(!is_affirmative(answer), "{answer:?} should be no");
        }
    }

    #[tokio::test]
    async fn fixed_answer_prompter() {
        let mut p = FixedAnswer(true);
        assert!(p.confirm("Save file 'a.go'?").await);
        let mut p = FixedAnswer(false);
        assert!(!p.confirm("Save file 'a.go'?").await);
    }
}
