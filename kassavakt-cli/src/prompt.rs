//! Interactive request prompt.
//!
//! Reads whitespace separated tokens, so answers may be split over several
//! lines. Nothing is evaluated here; the caller receives the parsed request.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use kassavakt_core::{ResourceVector, SystemState, Units};

#[derive(Debug, PartialEq, Eq)]
pub enum PromptAnswer {
    /// User did not answer yes, or input ended.
    Declined,
    InvalidProcess,
    InvalidRequest,
    Request {
        process: usize,
        request: ResourceVector,
    },
}

pub struct Prompt<R, W> {
    input: R,
    output: W,
    pending: VecDeque<String>,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            pending: VecDeque::new(),
        }
    }

    /// Asks whether to test a request and, if so, reads it.
    pub fn ask(&mut self, state: &SystemState) -> io::Result<PromptAnswer> {
        write!(
            self.output,
            "\nDo you want to test a resource request? (y/n): "
        )?;
        self.output.flush()?;
        match self.next_token()? {
            Some(answer) if answer.starts_with(['y', 'Y']) => {}
            _ => return Ok(PromptAnswer::Declined),
        }

        let processes = state.processes();
        write!(
            self.output,
            "Enter process id (0..{}): ",
            processes.saturating_sub(1)
        )?;
        self.output.flush()?;
        let process = match self.next_token()?.and_then(|t| t.parse::<usize>().ok()) {
            Some(process) if process < processes => process,
            _ => return Ok(PromptAnswer::InvalidProcess),
        };

        let width = state.resource_types();
        writeln!(self.output, "Enter request vector of size {width}:")?;
        self.output.flush()?;
        let mut request = Vec::with_capacity(width);
        for _ in 0..width {
            match self.next_token()?.and_then(|t| t.parse::<Units>().ok()) {
                Some(units) => request.push(units),
                None => return Ok(PromptAnswer::InvalidRequest),
            }
        }

        Ok(PromptAnswer::Request {
            process,
            request: request.into(),
        })
    }

    fn next_token(&mut self) -> io::Result<Option<String>> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
        Ok(self.pending.pop_front())
    }
}
