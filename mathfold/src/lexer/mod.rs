//! Lexer implementation using logos

mod token;

pub use token::Token;

use crate::ast::Span;
use crate::error::{Error, Result};
use logos::Logos;

/// Tokenize an expression
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(_) => {
                return Err(Error::lexer(
                    format!("unexpected character: {:?}", lexer.slice()),
                    span,
                ));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("  \t\n ").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_operators() {
        assert_eq!(
            kinds("+ - * / % ^"),
            vec![Token::Plus, Token::Minus, Token::Star, Token::Slash, Token::Percent, Token::Caret]
        );
    }

    #[test]
    fn test_tokenize_implicit_multiplication() {
        assert_eq!(
            kinds("2x"),
            vec![Token::Number("2".into()), Token::Ident("x".into())]
        );
    }

    #[test]
    fn test_tokenize_negative_number_as_minus_then_number() {
        assert_eq!(kinds("-42"), vec![Token::Minus, Token::Number("42".into())]);
    }

    #[test]
    fn test_tokenize_spans() {
        let tokens = tokenize("cos(x)").unwrap();
        assert_eq!(tokens[0].1, Span::new(0, 3));
        assert_eq!(tokens[1].1, Span::new(3, 4));
        assert_eq!(tokens[3].1, Span::new(5, 6));
    }

    #[test]
    fn test_tokenize_unexpected_character_error() {
        let err = tokenize("1 $ 2").unwrap_err();
        assert!(err.message().contains("unexpected character"));
        assert_eq!(err.span(), Some(Span::new(2, 3)));
    }
}
