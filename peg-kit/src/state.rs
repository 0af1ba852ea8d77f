use crate::error::{Error, Result};
use crate::value::Span;

/// What a labeled failure does when it reaches a choice, optional,
/// repetition or predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelPolicy {
    /// Unwind past every enclosing alternative; the label is final.
    #[default]
    Commit,
    /// Treat labeled failures like ordinary ones.
    Backtrack,
}

/// An entered rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceSpan {
    pub name: &'static str,
    pub start: usize,
}

/// Input, cursor and bookkeeping of one parse.
#[derive(Debug, Clone)]
pub struct State {
    input: Vec<char>,
    cursor: usize,
    failure: usize,
    trace: Vec<TraceSpan>,
    label_policy: LabelPolicy,
}

impl State {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            cursor: 0,
            failure: 0,
            trace: Vec::new(),
            label_policy: LabelPolicy::default(),
        }
    }

    pub fn location(&self) -> usize {
        self.cursor
    }

    pub fn set_location(&mut self, location: usize) {
        self.cursor = location.min(self.input.len());
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub fn is_eof(&self) -> bool {
        self.cursor >= self.input.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.input.get(self.cursor).copied()
    }

    /// Input between two offsets.
    pub fn slice(&self, span: Span) -> String {
        let end = span.end.min(self.input.len());
        let start = span.start.min(end);
        self.input[start..end].iter().collect()
    }

    /// Position of the most recent failure.
    pub fn failure_location(&self) -> usize {
        self.failure
    }

    /// Records `err` as the most recent failure. Every failure the runtime
    /// produces passes through here.
    pub fn fail(&mut self, err: Error) -> Error {
        self.failure = err.position();
        err
    }

    pub fn label_policy(&self) -> LabelPolicy {
        self.label_policy
    }

    pub fn set_label_policy(&mut self, policy: LabelPolicy) {
        self.label_policy = policy;
    }

    /// Whether `err` must propagate instead of being recovered from.
    pub fn commits(&self, err: &Error) -> bool {
        err.is_labeled() && self.label_policy == LabelPolicy::Commit
    }

    pub fn push_trace(&mut self, name: &'static str) {
        self.trace.push(TraceSpan {
            name,
            start: self.cursor,
        });
    }

    pub fn pop_trace(&mut self) -> Option<TraceSpan> {
        self.trace.pop()
    }

    pub fn trace(&self) -> &[TraceSpan] {
        &self.trace
    }

    /// Innermost rule being parsed.
    pub fn current_rule(&self) -> Option<&'static str> {
        self.trace.last().map(|span| span.name)
    }

    /// Consumes one character.
    pub fn any(&mut self) -> Result<char> {
        match self.peek() {
            Some(c) => {
                self.cursor += 1;
                Ok(c)
            }
            None => Err(self.fail(Error::EndOfInput {
                expected: "any character".to_string(),
                span: Span::at(self.cursor),
            })),
        }
    }

    /// Consumes `literal` if the input continues with it; otherwise fails at
    /// the first differing character without moving.
    pub fn expect_literal(&mut self, literal: &str) -> Result<()> {
        let start = self.cursor;
        for (offset, expected) in literal.chars().enumerate() {
            let pos = start + offset;
            match self.input.get(pos) {
                Some(&found) if found == expected => {}
                Some(&found) => {
                    return Err(self.fail(Error::Mismatch {
                        expected: quote(literal),
                        found,
                        span: Span::at(pos),
                    }))
                }
                None => {
                    return Err(self.fail(Error::EndOfInput {
                        expected: quote(literal),
                        span: Span::at(pos),
                    }))
                }
            }
        }
        self.cursor = start + literal.chars().count();
        Ok(())
    }

    /// Consumes one character within `lo..=hi`.
    pub fn expect_range(&mut self, lo: char, hi: char) -> Result<char> {
        let expected = || format!("[{lo}-{hi}]");
        match self.peek() {
            Some(c) if (lo..=hi).contains(&c) => {
                self.cursor += 1;
                Ok(c)
            }
            Some(found) => Err(self.fail(Error::Mismatch {
                expected: expected(),
                found,
                span: Span::at(self.cursor),
            })),
            None => Err(self.fail(Error::EndOfInput {
                expected: expected(),
                span: Span::at(self.cursor),
            })),
        }
    }
}

fn quote(literal: &str) -> String {
    format!("'{}'", literal.escape_default())
}
