use crate::error::{Error, Result};
use crate::parser::Parser;
use crate::value::Span;

/// Ordered choice: the first alternative that succeeds wins.
///
/// Each alternative starts from the same position. When all fail, the
/// position is restored and the failure that got farthest is returned (the
/// later one on ties). A labeled failure under [`LabelPolicy::Commit`] ends
/// the choice immediately.
///
/// [`LabelPolicy::Commit`]: crate::LabelPolicy::Commit
pub fn choice<P: Parser, T>(p: &mut P, alternatives: &[&dyn Fn(&mut P) -> Result<T>]) -> Result<T> {
    let start = p.location();
    let mut farthest: Option<Error> = None;
    for alternative in alternatives {
        match alternative(p) {
            Ok(value) => return Ok(value),
            Err(err) if p.state().commits(&err) => return Err(err),
            Err(err) => {
                p.set_location(start);
                farthest = match farthest {
                    Some(prev) if prev.position() > err.position() => Some(prev),
                    _ => Some(err),
                };
            }
        }
    }
    let err = farthest.unwrap_or_else(|| Error::Predicate {
        message: "no alternatives".to_string(),
        span: Span::at(start),
    });
    Err(p.state_mut().fail(err))
}

/// Positive lookahead: succeeds when `f` does, never consumes input.
pub fn and<P: Parser, T>(p: &mut P, f: impl FnOnce(&mut P) -> Result<T>) -> Result<()> {
    let start = p.location();
    let out = f(p);
    p.set_location(start);
    match out {
        Ok(_) => Ok(()),
        Err(err) => Err(p.state_mut().fail(err)),
    }
}

/// Negative lookahead: succeeds when `f` fails, never consumes input.
pub fn not<P: Parser, T>(p: &mut P, f: impl FnOnce(&mut P) -> Result<T>) -> Result<()> {
    let start = p.location();
    let out = f(p);
    p.set_location(start);
    match out {
        Ok(_) => Err(p.state_mut().fail(Error::Predicate {
            message: "unexpected match".to_string(),
            span: Span::at(start),
        })),
        Err(err) if p.state().commits(&err) => Err(err),
        Err(_) => Ok(()),
    }
}

/// Matches `f` or nothing.
pub fn optional<P: Parser, T>(p: &mut P, f: impl FnOnce(&mut P) -> Result<T>) -> Result<Option<T>> {
    let start = p.location();
    match f(p) {
        Ok(value) => Ok(Some(value)),
        Err(err) if p.state().commits(&err) => Err(err),
        Err(_) => {
            p.set_location(start);
            Ok(None)
        }
    }
}

/// Greedy repetition. Stops at the first failure, leaving the position where
/// that attempt started, or after an iteration that consumed nothing.
pub fn zero_or_more<P: Parser, T>(p: &mut P, f: impl Fn(&mut P) -> Result<T>) -> Result<Vec<T>> {
    let mut items = Vec::new();
    loop {
        let start = p.location();
        match f(p) {
            Ok(item) => {
                items.push(item);
                if p.location() == start {
                    break;
                }
            }
            Err(err) if p.state().commits(&err) => return Err(err),
            Err(_) => {
                p.set_location(start);
                break;
            }
        }
    }
    Ok(items)
}

/// Like [`zero_or_more`], but the first match is required.
pub fn one_or_more<P: Parser, T>(p: &mut P, f: impl Fn(&mut P) -> Result<T>) -> Result<Vec<T>> {
    let start = p.location();
    let first = f(p)?;
    if p.location() == start {
        return Ok(vec![first]);
    }
    let mut items = vec![first];
    items.extend(zero_or_more(p, f)?);
    Ok(items)
}
