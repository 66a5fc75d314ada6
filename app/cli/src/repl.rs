//! Interactive chat REPL.

use anyhow::Result;
use llm::Engine;
use runtime::{Runtime, SessionState};
use rustyline::error::ReadlineError;

/// Phrases that end the conversation.
pub const EXIT_PHRASES: [&str; 3] = ["exit", "quit", "bye"];

/// Whether a line asks to end the conversation.
pub fn is_exit_phrase(line: &str) -> bool {
    let line = line.trim();
    EXIT_PHRASES.iter().any(|p| p.eq_ignore_ascii_case(line))
}

/// Interactive chat REPL over one runtime session.
pub struct ChatRepl<E: Engine> {
    runtime: Runtime<E>,
    name: String,
    editor: rustyline::DefaultEditor,
}

impl<E: Engine> ChatRepl<E> {
    /// Create a new REPL speaking as `name`.
    pub fn new(runtime: Runtime<E>, name: &str) -> Result<Self> {
        Ok(Self {
            runtime,
            name: name.to_owned(),
            editor: rustyline::DefaultEditor::new()?,
        })
    }

    /// Run the interactive REPL loop until an exit phrase or end of input.
    pub async fn run(&mut self) -> Result<()> {
        println!("{}: Hello! How can I help you today?", self.name);

        loop {
            match self.editor.readline("You: ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if is_exit_phrase(line) {
                        break;
                    }
                    let _ = self.editor.add_history_entry(line);

                    let outcome = self.runtime.turn(line).await;
                    if outcome.state != SessionState::Completed {
                        tracing::debug!("turn ended {:?}", outcome.state);
                    }
                    println!("{}: {}", self.name, outcome.text);
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        println!("{}: Goodbye!", self.name);
        Ok(())
    }
}
