use std::fmt;

/// Character range `start..end` into the parser input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `pos`.
    pub fn at(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// What a successful match produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String { text: String, span: Span },
    Sequence { items: Vec<Value>, span: Span },
}

impl Value {
    pub fn string(text: impl Into<String>, span: Span) -> Self {
        Value::String {
            text: text.into(),
            span,
        }
    }

    pub fn sequence(items: Vec<Value>, span: Span) -> Self {
        Value::Sequence { items, span }
    }

    pub fn span(&self) -> Span {
        match self {
            Value::String { span, .. } | Value::Sequence { span, .. } => *span,
        }
    }

    /// Matched text, concatenated over nested sequences.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Value::String { text, .. } => out.push_str(text),
            Value::Sequence { items, .. } => items.iter().for_each(|item| item.collect_text(out)),
        }
    }

    /// Children of a sequence; empty for strings.
    pub fn items(&self) -> &[Value] {
        match self {
            Value::Sequence { items, .. } => items,
            Value::String { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_flattens_sequences() {
        let value = Value::sequence(
            vec![
                Value::string("a", Span::new(0, 1)),
                Value::sequence(vec![Value::string("bc", Span::new(1, 3))], Span::new(1, 3)),
            ],
            Span::new(0, 3),
        );
        assert_eq!(value.text(), "abc");
        assert_eq!(value.items().len(), 2);
        assert_eq!(value.span(), Span::new(0, 3));
    }
}
