// Interactive terminal chat. Every line is an independent single-shot query; nothing is remembered
// between turns.

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::constants::{GENERIC_FAILURE_MESSAGE, PAGE_TITLE, PROMPT_SHORTCUTS};
use crate::gateway::AiGateway;

/// Resolve a line typed by the user: a bare number picks the matching prompt shortcut.
pub fn resolve_input(line: &str) -> &str {
    let trimmed = line.trim();
    match trimmed.parse::<usize>() {
        Ok(n) if (1..=PROMPT_SHORTCUTS.len()).contains(&n) => PROMPT_SHORTCUTS[n - 1],
        _ => trimmed,
    }
}

pub async fn run_chat<R, W>(gateway: &AiGateway, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    info!("Starting interactive chat session...");
    writeln!(output, "{}", PAGE_TITLE)?;
    for (index, prompt) in PROMPT_SHORTCUTS.iter().enumerate() {
        writeln!(output, "  {}. {}", index + 1, prompt)?;
    }
    writeln!(output, "Type a question, a shortcut number, or 'exit' to quit.")?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let query = resolve_input(&line);
        if query.is_empty() {
            writeln!(output, "Please enter a query.")?;
            continue;
        }
        if matches!(query, "exit" | "quit") {
            break;
        }

        debug!(%query, "Submitting chat query");
        match gateway.get_ai_response(query).await {
            Ok(reply) => writeln!(output, "\n{}\n", reply)?,
            // The gateway has already logged the detail.
            Err(_) => writeln!(output, "{}", GENERIC_FAILURE_MESSAGE)?,
        }
        output.flush()?;
    }

    info!("Chat session finished.");
    Ok(())
}
