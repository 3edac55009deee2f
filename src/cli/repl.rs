//! Interactive terminal session over a [`SessionRouter`].

use crate::agents::SessionRouter;
use crate::cli::output::Output;
use crate::ingest;
use crate::types::{Result, SessionMode};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Exit,
    Reset,
    Upload(PathBuf),
    Ask(String),
    Empty,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => ReplCommand::Empty,
            "exit" | "quit" => ReplCommand::Exit,
            "reset" => ReplCommand::Reset,
            _ => match line.strip_prefix("upload ") {
                Some(path) if !path.trim().is_empty() => {
                    ReplCommand::Upload(PathBuf::from(path.trim()))
                }
                _ => ReplCommand::Ask(line.to_string()),
            },
        }
    }
}

/// Read commands from stdin until `exit` or end of input.
///
/// Errors from a single command are printed and the loop continues.
pub async fn run(router: &SessionRouter, output: &Output) -> Result<()> {
    output.banner();
    output.hint("upload <path> loads a document, reset returns to general chat, exit quits");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let mode = match router.mode() {
            SessionMode::General => "general",
            SessionMode::Document => "document",
        };
        output.prompt(mode);

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Exit => break,
            ReplCommand::Reset => {
                if router.clear_document() {
                    output.success("Back to general chat");
                } else {
                    output.info("Already in general chat");
                }
            }
            ReplCommand::Upload(path) => {
                if let Some(current) = router.active_document() {
                    output.warning(&format!("'{}' will be replaced if this upload succeeds", current.source));
                }
                match upload_file(router, &path).await {
                    Ok(message) => output.success(&message),
                    Err(e) => output.error(&e.to_string()),
                }
            }
            ReplCommand::Ask(question) => match router.route(&question).await {
                Ok(answer) => output.answer(&answer),
                Err(e) => output.error(&e.to_string()),
            },
        }
    }

    output.info("Goodbye");
    Ok(())
}

async fn upload_file(router: &SessionRouter, path: &Path) -> Result<String> {
    let text = ingest::extract_text(path).await?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let info = router.upload(&source, &text).await?;
    Ok(format!(
        "Indexed '{}' ({} chunks)",
        info.source, info.chunk_count
    ))
}
