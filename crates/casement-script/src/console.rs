//! Line-oriented console over a [`ScriptEngine`].
//!
//! Input lines accumulate in a statement buffer until the engine accepts it.
//! The console is `Idle` while the buffer is empty and `Pending` while it holds
//! a statement the engine reported as unfinished.

use casement_core::{ConsoleConfig, LineJoin, QuitSignal};
use log::{debug, info};
use std::io::{self, BufRead, Write};

use crate::context::ScriptEngine;
use crate::error::ScriptError;

/// What happened to the buffer after one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Buffer ran; it is now empty.
    Executed,
    /// Buffer is an unfinished statement; kept for the next line.
    Incomplete,
    /// Buffer failed and was discarded. Carries the text shown to the user.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    EndOfInput,
}

pub struct Console<E: ScriptEngine> {
    engine: E,
    cfg: ConsoleConfig,
    quit: QuitSignal,
    buffer: Vec<u8>,
}

impl<E: ScriptEngine> Console<E> {
    pub fn new(engine: E, cfg: ConsoleConfig, quit: QuitSignal) -> Self {
        Self {
            engine,
            cfg,
            quit,
            buffer: Vec::new(),
        }
    }

    #[inline]
    pub fn prompt(&self) -> &str {
        if self.buffer.is_empty() {
            &self.cfg.prompt_idle
        } else {
            &self.cfg.prompt_continue
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    #[inline]
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    #[inline]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[inline]
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    #[inline]
    pub fn quit_requested(&self) -> bool {
        self.quit.is_set()
    }

    /// Append one line to the buffer and try to run the whole buffer.
    ///
    /// The line's bytes are kept as given; nothing is re-encoded.
    pub fn feed_line(&mut self, line: impl AsRef<[u8]>) -> LineOutcome {
        if !self.buffer.is_empty() && self.cfg.line_join == LineJoin::Newline {
            self.buffer.push(b'\n');
        }
        self.buffer.extend_from_slice(line.as_ref());

        match self.engine.execute(&self.buffer) {
            Ok(()) => {
                debug!(target: "console", "console.executed len={}", self.buffer.len());
                self.buffer.clear();
                LineOutcome::Executed
            }
            Err(err) if self.is_incomplete(&err) => {
                debug!(target: "console", "console.incomplete len={}", self.buffer.len());
                LineOutcome::Incomplete
            }
            Err(err) => {
                debug!(target: "console", "console.failed: {}", err);
                self.buffer.clear();
                LineOutcome::Failed(err.to_string())
            }
        }
    }

    fn is_incomplete(&self, err: &ScriptError) -> bool {
        match err {
            ScriptError::Syntax {
                incomplete: true, ..
            } => true,
            ScriptError::Syntax { message, .. } => self
                .cfg
                .incomplete_markers
                .iter()
                .any(|m| !m.is_empty() && message.ends_with(m.as_str())),
            ScriptError::Runtime(_) => false,
        }
    }

    /// Drive the console until quit or end of input.
    ///
    /// The quit signal is checked before each prompt and after each line.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> io::Result<ExitReason> {
        if !self.cfg.banner.is_empty() {
            writeln!(out, "{}", self.cfg.banner)?;
        }

        let mut raw = Vec::new();
        loop {
            if self.quit.is_set() {
                break;
            }

            write!(out, "{}", self.prompt())?;
            out.flush()?;

            raw.clear();
            if input.read_until(b'\n', &mut raw)? == 0 {
                info!(target: "console", "console.eof pending={}", self.is_pending());
                return Ok(ExitReason::EndOfInput);
            }

            if let LineOutcome::Failed(msg) = self.feed_line(trim_line_end(&raw)) {
                writeln!(out, "{}{}", self.cfg.error_prefix, msg)?;
            }

            if self.quit.is_set() {
                break;
            }
        }

        info!(target: "console", "console.quit");
        Ok(ExitReason::Quit)
    }
}

fn trim_line_end(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., b'\n' | b'\r'] = line {
        line = rest;
    }
    line
}
