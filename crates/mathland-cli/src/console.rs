//! Line-oriented terminal input and output.

use std::fmt::Display;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// Reads player input line by line and prints game text.
///
/// With `to_stderr` set, all game text goes to stderr so stdout carries
/// nothing but the JSON report.
pub struct Console<R> {
    lines: Lines<R>,
    to_stderr: bool,
}

impl Console<BufReader<Stdin>> {
    /// A console on the process's standard input.
    pub fn stdin(to_stderr: bool) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), to_stderr)
    }
}

impl<R: AsyncBufRead + Unpin> Console<R> {
    /// A console reading from `reader`.
    pub fn new(reader: R, to_stderr: bool) -> Self {
        Self {
            lines: reader.lines(),
            to_stderr,
        }
    }

    /// Prints one block of text followed by a newline.
    pub fn say(&self, text: impl Display) {
        if self.to_stderr {
            eprintln!("{text}");
        } else {
            println!("{text}");
        }
    }

    /// Prints a prompt without a newline.
    pub fn prompt(&self, text: &str) {
        if self.to_stderr {
            eprint!("{text}");
            let _ = std::io::stderr().flush();
        } else {
            print!("{text}");
            let _ = std::io::stdout().flush();
        }
    }

    /// Next input line, `None` at end of input. Cancel safe.
    pub async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        self.lines.next_line().await
    }

    /// Prompts and waits for one line.
    pub async fn ask(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        self.prompt(prompt);
        self.next_line().await
    }
}
