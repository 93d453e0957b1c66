//! The diagnostic channel.
//!
//! Every checker routine returns `Result<T, Diagnostic>`. A `Diagnostic` is
//! a single, already-formatted user error; emitting one aborts the whole
//! check, propagated with `?` up to `check_program`. Compiler bugs (tag
//! exhaustiveness violations, broken invariants) use `assert!`/`unreachable!`
//! instead and are never wrapped here — they unwind the process, as they
//! must.

use tyla_ast::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub span: Span,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.span.line, self.span.column)
    }
}

#[derive(Debug, Clone, thiserror::Error, miette::Diagnostic)]
pub enum Diagnostic {
    #[error("{location}: scope error: {message}")]
    #[diagnostic(code(tyla::scope_error))]
    Scope { location: Location, message: String },

    #[error("{location}: type error: {message}")]
    #[diagnostic(code(tyla::type_error))]
    Type { location: Location, message: String },
}

impl Diagnostic {
    pub fn scope_error(file: &str, span: Span, message: impl Into<String>) -> Self {
        Diagnostic::Scope {
            location: Location { file: file.to_string(), span },
            message: message.into(),
        }
    }

    pub fn type_error(file: &str, span: Span, message: impl Into<String>) -> Self {
        Diagnostic::Type {
            location: Location { file: file.to_string(), span },
            message: message.into(),
        }
    }

    /// The `<category>` word from the message template: `"scope error"` or
    /// `"type error"`.
    pub fn category(&self) -> &'static str {
        match self {
            Diagnostic::Scope { .. } => "scope error",
            Diagnostic::Type { .. } => "type error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_follows_the_template() {
        let d = Diagnostic::scope_error("main.tl", Span::new(3, 7), "variable 'z' is not declared");
        assert_eq!(d.to_string(), "main.tl:3:7: scope error: variable 'z' is not declared");
    }

    #[test]
    fn category_distinguishes_scope_from_type() {
        let scope = Diagnostic::scope_error("f", Span::default(), "x");
        let ty = Diagnostic::type_error("f", Span::default(), "x");
        assert_eq!(scope.category(), "scope error");
        assert_eq!(ty.category(), "type error");
    }
}
