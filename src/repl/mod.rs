//! The interactive loop: read a line, parse it, execute it, render it.

mod command;
mod dispatch;

pub use command::Command;
pub use dispatch::{ClassSample, Dispatcher, Outcome, SweepAccess, SweepEntry};

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::error;

use crate::render;

/// Run the interactive loop until end-of-input.
///
/// Every command is processed to completion before the next line is
/// read. A failing command is reported and the loop continues. Ctrl-C
/// while a command is in flight aborts that command only; Ctrl-C at the
/// prompt discards the line. Requests carry no timeout beyond transport
/// defaults, so a hung request stalls the loop until interrupted.
pub async fn run(mut dispatcher: Dispatcher) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;

    loop {
        let prompt = render::prompt(
            dispatcher.session().identity().unwrap_or("?"),
            dispatcher.session().base_url(),
        );
        match editor.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(&line);
                }
                let command = Command::parse(&line);
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        println!("{}", "[aborted]".yellow());
                    }
                    result = dispatcher.execute(command) => match result {
                        Ok(outcome) => render::print_outcome(&outcome),
                        Err(err) => {
                            error!(%err, "command failed");
                            println!("{}", format!("[error: {err}]").red());
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}
