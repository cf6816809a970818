//! Terminal-backed selection console

use std::io::{self, BufRead, IsTerminal, StdinLock, Write};
use triage_lib::Console;

/// Reads answers from stdin and writes menus to stdout
pub struct TerminalConsole {
    input: StdinLock<'static>,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            input: io::stdin().lock(),
        }
    }

    /// Piped stdin is treated as unattended input: invalid answers fail
    /// instead of being re-prompted.
    pub fn is_interactive() -> bool {
        io::stdin().is_terminal()
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn write_line(&mut self, line: &str) {
        println!("{}", line);
    }
}
