use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use chatwire_core::TransportMode;

/// Shown as a system line whenever a send fails.
pub const SEND_FAILED: &str = "Sorry, something went wrong while contacting the assistant.";

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const USER_PROMPT: Color = Color::Green;
    const ASSISTANT_TEXT: Color = Color::Cyan;
    const SYSTEM: Color = Color::Yellow;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

/// Manages terminal I/O for the interactive REPL.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the startup banner.
    pub fn print_banner(&self, mode: TransportMode, session_id: &str) -> Result<()> {
        let mut stdout = io::stdout();
        let mode_label = match mode {
            TransportMode::ChatTrigger => "chat trigger",
            TransportMode::Webhook => "webhook",
        };
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("chatwire"),
            ResetColor,
            Print(" - Chat\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("Mode: {} | Session: {}\n", mode_label, session_id)),
            Print("Type 'exit' or 'quit' to end.\n"),
            Print("---\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Read a line of user input with prompt.
    /// Returns None if the user wants to exit (or stdin is closed).
    pub fn read_input(&self) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::USER_PROMPT),
            Print("you> "),
            ResetColor,
        )?;
        stdout.flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(parse_input(&input))
    }

    /// Print an assistant reply.
    pub fn print_reply(&self, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ASSISTANT_TEXT),
            Print("bot> "),
            Print(text),
            Print("\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print a system message line.
    pub fn print_system(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::SYSTEM),
            Print(format!("[system] {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an error message.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an info message.
    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Show a typing indicator until the returned handle is stopped or dropped.
    pub fn start_spinner(&self, message: &str) -> Result<SpinnerHandle> {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let message = message.to_string();

        let handle = std::thread::spawn(move || {
            let frames = ['.', 'o', 'O', 'o'];
            let mut i = 0;
            while running_clone.load(Ordering::SeqCst) {
                let mut stdout = io::stdout();
                execute!(
                    stdout,
                    SetForegroundColor(Colors::DIM),
                    Print(format!("\r{} {}", message, frames[i % frames.len()])),
                    ResetColor,
                )
                .ok();
                stdout.flush().ok();
                i += 1;
                std::thread::sleep(std::time::Duration::from_millis(120));
            }
            // Clear the indicator line
            let mut stdout = io::stdout();
            execute!(stdout, Print(format!("\r{}\r", " ".repeat(message.len() + 2)))).ok();
            stdout.flush().ok();
        });

        Ok(SpinnerHandle {
            running,
            thread: Some(handle),
        })
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim a raw input line. Exit commands map to None.
fn parse_input(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    match trimmed {
        "exit" | "quit" | "/exit" | "/quit" => None,
        _ => Some(trimmed.to_string()),
    }
}

/// Handle to a running spinner. Stopping waits for the indicator to clear.
pub struct SpinnerHandle {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SpinnerHandle {
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            thread.join().ok();
        }
    }
}

impl Drop for SpinnerHandle {
    fn drop(&mut self) {
        self.halt();
    }
}
