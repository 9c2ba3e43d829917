//! Yes/no confirmation prompt

use std::io::{BufRead, Write};

use futures::future::BoxFuture;
use tokio::sync::oneshot;
use tracing::warn;

/// Asks the user a yes/no question
pub trait Confirm: Send + Sync {
    fn confirm(&self, question: String) -> BoxFuture<'static, bool>;
}

/// Interpret a typed answer; anything but an explicit yes is a no
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Prompts on stdin/stdout.
///
/// The read happens on a plain thread so that a pending prompt never holds up
/// process exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Confirm for TerminalPrompt {
    fn confirm(&self, question: String) -> BoxFuture<'static, bool> {
        let (tx, rx) = oneshot::channel();

        std::thread::spawn(move || {
            let mut stdout = std::io::stdout().lock();
            let _ = write!(stdout, "\n{} ", question);
            let _ = stdout.flush();
            drop(stdout);

            let mut answer = String::new();
            let confirmed = match std::io::stdin().lock().read_line(&mut answer) {
                Ok(0) => false,
                Ok(_) => is_affirmative(&answer),
                Err(e) => {
                    warn!("Failed to read confirmation: {}", e);
                    false
                }
            };
            let _ = tx.send(confirmed);
        });

        Box::pin(async move { rx.await.unwrap_or(false) })
    }
}

/// Always gives the same answer
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&self, _question: String) -> BoxFuture<'static, bool> {
        let answer = self.0;
        Box::pin(async move { answer })
    }
}
