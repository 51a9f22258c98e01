use std::io::Write as _;

use async_trait::async_trait;
use client_core::Dialogs;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::warn;

/// Confirmation on stdin, alerts on stderr.
pub struct TerminalDialogs {
    pub assume_yes: bool,
}

#[async_trait]
impl Dialogs for TerminalDialogs {
    async fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{message} [y/N] ");
        if let Err(error) = std::io::stdout().flush() {
            warn!(%error, "failed to flush prompt");
        }

        let mut line = String::new();
        match BufReader::new(io::stdin()).read_line(&mut line).await {
            Ok(_) => is_affirmative(&line),
            Err(error) => {
                warn!(%error, "failed to read confirmation");
                false
            }
        }
    }

    async fn alert(&self, message: &str) {
        eprintln!("! {message}");
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
