use std::io::Write;

use anyhow::{anyhow, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::application::{Conversation, TurnOutcome};
use crate::domain::DomainError;

use super::super::Container;

const PROMPT: &str = "> ";

enum ReplCommand<'l> {
    Exit,
    Reset,
    History,
    Message(&'l str),
}

impl<'l> ReplCommand<'l> {
    fn parse(line: &'l str) -> Self {
        match line.trim() {
            "/exit" | "/quit" => Self::Exit,
            "/reset" => Self::Reset,
            "/history" => Self::History,
            _ => Self::Message(line),
        }
    }
}

pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Interactive session on standard input and output.
    pub async fn chat(&self) -> Result<String> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();
        self.run(stdin, &mut stdout).await
    }

    /// Runs the chat loop over `input` until EOF or `/exit`. Each line is one
    /// turn; the next line is read only after the reply has finished.
    pub async fn run<R, W>(&self, input: R, out: &mut W) -> Result<String>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut conversation = self.container.conversation();
        let mut lines = input.lines();

        writeln!(
            out,
            "Chatting with {}. Commands: /reset, /history, /exit",
            self.container.model()
        )?;

        loop {
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                break;
            };

            match ReplCommand::parse(&line) {
                ReplCommand::Exit => break,
                ReplCommand::Reset => {
                    conversation.reset_session();
                    writeln!(out, "Session reset. Earlier messages are no longer remembered.")?;
                }
                ReplCommand::History => write_history(&conversation, out)?,
                ReplCommand::Message(text) => {
                    stream_turn(&mut conversation, text, out).await?;
                }
            }
        }

        Ok(format!(
            "Chat ended after {} message(s).",
            conversation.messages().len()
        ))
    }

    pub async fn ask(&self, message: String) -> Result<String> {
        let mut stdout = std::io::stdout();
        self.ask_to(&message, &mut stdout).await
    }

    /// One chat turn on a fresh session, streamed to `out`.
    pub async fn ask_to<W: Write>(&self, message: &str, out: &mut W) -> Result<String> {
        if message.trim().is_empty() {
            return Err(DomainError::invalid_input("Message cannot be empty.").into());
        }

        let mut conversation = self.container.conversation();
        match stream_turn(&mut conversation, message, out).await? {
            TurnOutcome::Failed => Err(anyhow!(conversation
                .last_error()
                .unwrap_or("Chat turn failed")
                .to_string())),
            _ => Ok(String::new()),
        }
    }
}

/// Prints fragments as they arrive. A failed turn prints the error entry the
/// conversation appended.
async fn stream_turn<W: Write>(
    conversation: &mut Conversation,
    text: &str,
    out: &mut W,
) -> Result<TurnOutcome> {
    let mut write_error = None;
    let outcome = conversation
        .send(text, |_, fragment| {
            if write_error.is_some() {
                return;
            }
            if let Err(e) = write!(out, "{}", fragment).and_then(|_| out.flush()) {
                write_error = Some(e);
            }
        })
        .await;

    if let Some(e) = write_error {
        return Err(e.into());
    }

    match outcome {
        TurnOutcome::Ignored => {}
        TurnOutcome::Completed => writeln!(out)?,
        TurnOutcome::Failed => {
            if let Some(entry) = conversation.last_message() {
                writeln!(out)?;
                writeln!(out, "{}", entry.text())?;
            }
        }
    }

    Ok(outcome)
}

fn write_history<W: Write>(conversation: &Conversation, out: &mut W) -> Result<()> {
    if conversation.messages().is_empty() {
        writeln!(out, "No messages yet.")?;
        return Ok(());
    }

    for message in conversation.messages() {
        let speaker = if message.is_from_user() { "You" } else { "AI" };
        writeln!(out, "[{}] {}", speaker, message.text())?;
    }
    Ok(())
}
