//! Terminal host

use crate::host::{Credentials, HostState, PresentationHost};
use std::io::{self, BufRead, Write};
use tracing::warn;

const ASSISTANT_PREFIX: &str = "Scheduler: ";

/// Line-based host over any reader and writer
pub struct ConsoleHost<R, W> {
    input: R,
    output: W,
    state: HostState,
}

impl ConsoleHost<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleHost<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            state: HostState::default(),
        }
    }

    /// Print `prompt` and read one trimmed line; `None` at end of input
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn write_line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.output, "{}", text) {
            warn!(error = %e, "Failed to write to console");
        }
    }

    fn ask(&mut self, prompt: &str) -> Option<String> {
        match self.read_line(prompt) {
            Ok(Some(answer)) if !answer.is_empty() => Some(answer),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read from console");
                None
            }
        }
    }
}

impl<R: BufRead, W: Write> PresentationHost for ConsoleHost<R, W> {
    fn display_message(&mut self, text: &str, is_user: bool) {
        // the terminal already shows what the user typed
        if !is_user {
            self.write_line(&format!("{}{}", ASSISTANT_PREFIX, text));
        }
    }

    fn state(&self) -> &HostState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HostState {
        &mut self.state
    }

    fn prompt_authentication(&mut self) -> Option<Credentials> {
        let client_id = self.ask("Client ID: ")?;
        let client_secret = self.ask("Client secret: ")?;
        Some(Credentials::new(client_id, client_secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_only_replies_are_printed() {
        let mut host = ConsoleHost::new(Cursor::new(Vec::new()), Vec::new());
        host.display_message("add roofing", true);
        host.display_message("Deleted task 'Railing'.", false);
        let output = String::from_utf8(host.into_output()).unwrap();
        assert_eq!(output, "Scheduler: Deleted task 'Railing'.\n");
    }

    #[test]
    fn test_prompt_authentication_reads_two_lines() {
        let input = Cursor::new(b"client-1\n  s3cret \n".to_vec());
        let mut host = ConsoleHost::new(input, Vec::new());
        assert_eq!(
            host.prompt_authentication(),
            Some(Credentials::new("client-1", "s3cret"))
        );
    }

    #[test]
    fn test_prompt_authentication_declined() {
        let mut host = ConsoleHost::new(Cursor::new(b"\n".to_vec()), Vec::new());
        assert_eq!(host.prompt_authentication(), None);
        let mut host = ConsoleHost::new(Cursor::new(Vec::new()), Vec::new());
        assert_eq!(host.read_line("> ").unwrap(), None);
    }
}
