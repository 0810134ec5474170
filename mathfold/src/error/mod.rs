//! Error types and reporting

use crate::ast::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conditions that abort a constant fold
///
/// These are never caught inside the pass; evaluation failures are
/// [`crate::eval::EvalError`] and stay local to the walker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FoldError {
    #[error("Unimplemented node type in constant folding: {kind}")]
    Unsupported { kind: &'static str },

    #[error("Cannot convert {kind} number to a node")]
    Unrepresentable { kind: &'static str },

    #[error("expression nesting exceeds the maximum depth of {limit}")]
    DepthExceeded { limit: usize },
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error("Lexer error at {span:?}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Parser error at {span:?}: {message}")]
    Parser { message: String, span: Span },

    #[error(transparent)]
    Fold(#[from] FoldError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl Error {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer { span, .. } | Self::Parser { span, .. } => Some(*span),
            Self::Fold(_) | Self::Config { .. } | Self::Io { .. } => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Lexer { message, .. }
            | Self::Parser { message, .. }
            | Self::Config { message }
            | Self::Io { message } => message.clone(),
            Self::Fold(err) => err.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io_error(err.to_string())
    }
}

/// Report error with ariadne
pub fn report_error(filename: &str, source: &str, error: &Error) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let kind = match error {
        Error::Lexer { .. } => "Lexer",
        Error::Parser { .. } => "Parser",
        Error::Fold(_) => "Fold",
        Error::Config { .. } => "Config",
        Error::Io { .. } => "IO",
    };

    let report = if let Some(span) = error.span() {
        Report::build(ReportKind::Error, (filename, span.start..span.end))
            .with_message(format!("{kind} error"))
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(error.message())
                    .with_color(Color::Red),
            )
            .finish()
    } else {
        Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{kind} error: {}", error.message()))
            .finish()
    };

    if let Err(err) = report.eprint((filename, Source::from(source))) {
        eprintln!("{kind} error: {} ({err})", error.message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_error_messages_name_the_kind() {
        let err = FoldError::Unsupported { kind: "conditional" };
        assert!(err.to_string().contains("conditional"));
        let err = FoldError::Unrepresentable { kind: "Complex" };
        assert_eq!(err.to_string(), "Cannot convert Complex number to a node");
    }

    #[test]
    fn test_error_span() {
        let err = Error::parser("unexpected token", Span::new(3, 4));
        assert_eq!(err.span(), Some(Span::new(3, 4)));
        let err: Error = FoldError::DepthExceeded { limit: 8 }.into();
        assert_eq!(err.span(), None);
        assert!(err.message().contains('8'));
    }
}
