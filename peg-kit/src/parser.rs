use crate::combinators;
use crate::error::{Error, Result};
use crate::state::State;
use crate::value::{Span, Value};

/// Implemented by every generated parser. Only the state accessors are
/// required; everything else is provided on top of them.
pub trait Parser: Sized {
    fn state(&self) -> &State;
    fn state_mut(&mut self) -> &mut State;

    fn location(&self) -> usize {
        self.state().location()
    }

    fn set_location(&mut self, location: usize) {
        self.state_mut().set_location(location)
    }

    fn failure_location(&self) -> usize {
        self.state().failure_location()
    }

    fn any(&mut self) -> Result<Option<Value>> {
        let start = self.location();
        let c = self.state_mut().any()?;
        Ok(Some(Value::string(c, Span::new(start, self.location()))))
    }

    fn literal(&mut self, literal: &str) -> Result<Option<Value>> {
        let start = self.location();
        self.state_mut().expect_literal(literal)?;
        Ok(Some(Value::string(literal, Span::new(start, self.location()))))
    }

    fn range(&mut self, lo: char, hi: char) -> Result<Option<Value>> {
        let start = self.location();
        let c = self.state_mut().expect_range(lo, hi)?;
        Ok(Some(Value::string(c, Span::new(start, self.location()))))
    }

    /// Built-in `Spacing`: any run of spaces, tabs and line breaks.
    fn spacing(&mut self) -> Result<Option<Value>> {
        let start = self.location();
        while let Some(' ' | '\t' | '\r' | '\n') = self.state().peek() {
            self.state_mut().any()?;
        }
        let span = Span::new(start, self.location());
        if span.is_empty() {
            return Ok(None);
        }
        Ok(Some(Value::string(self.state().slice(span), span)))
    }

    /// Built-in `EOF`: succeeds only when no input is left.
    fn eof(&mut self) -> Result<Option<Value>> {
        combinators::not(self, |p| p.any())?;
        Ok(None)
    }

    /// Labeled failure covering `start` up to the most recent failure point,
    /// attributed to the innermost traced rule.
    fn throw(&mut self, label: &str, start: usize) -> Error {
        let end = self.failure_location().max(start);
        let rule = self.state().current_rule().map(str::to_string);
        self.state_mut().fail(Error::Labeled {
            label: label.to_string(),
            rule,
            span: Span::new(start, end),
        })
    }

    /// Runs `f` inside a trace span named `name`.
    fn traced<T>(&mut self, name: &'static str, f: impl FnOnce(&mut Self) -> T) -> T {
        log::trace!("enter {} at {}", name, self.location());
        self.state_mut().push_trace(name);
        let out = f(self);
        self.state_mut().pop_trace();
        log::trace!("leave {} at {}", name, self.location());
        out
    }
}
