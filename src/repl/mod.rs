//! REPL Module
//!
//! Reads commands line by line and dispatches them against a `Session`.

mod commands;
mod input;

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

use crate::fetch::Fetcher;

pub use commands::{Command, CommandInfo, Flow, Session, COMMANDS};
pub use input::clean_input;

/// Printed before every line of input.
pub const PROMPT: &str = "Pokedex > ";

/// Runs the read-eval-print loop until `exit` or end of input.
///
/// Command failures are printed and the loop carries on; only failures to
/// read input or write output end it early.
pub async fn run<F, R, W>(session: &mut Session<F>, input: R, out: &mut W) -> std::io::Result<()>
where
    F: Fetcher,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        let words = clean_input(&line);
        if words.is_empty() {
            continue;
        }

        match session.execute(&words, out).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) => {
                warn!(error = %e, command = %words[0], "command failed");
                writeln!(out, "{e}")?;
            }
        }
    }

    Ok(())
}
