//! Recursive-descent expression parser
//!
//! Precedence, loosest first: `;` blocks, `=` assignment, `? :` conditional,
//! `or`, `and`, comparisons, `:` ranges, `+ -`, `* / %` and implicit
//! multiplication, unary `- + not`, `^` (right associative), then calls,
//! indexing and member access.

use crate::ast::{
    binary_operator_function, unary_operator_function, ConstValue, Node, OperatorNode, Span,
};
use crate::config::{MathConfig, NumberType};
use crate::error::{Error, Result};
use crate::lexer::{tokenize, Token};
use bigdecimal::BigDecimal;
use std::collections::BTreeMap;
use std::str::FromStr;

#[cfg(test)]
mod tests;

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 2 * 1024 * 1024;

/// Tokenize and parse an expression
pub fn parse_expression(source: &str, config: &MathConfig) -> Result<Node> {
    let tokens = tokenize(source)?;
    parse(source, tokens, config)
}

/// Parse tokens into an expression tree
pub fn parse(source: &str, tokens: Vec<(Token, Span)>, config: &MathConfig) -> Result<Node> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: source.len(),
        config,
        no_range: false,
    };
    parser.parse_block()
}

struct Parser<'c> {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    end: usize,
    config: &'c MathConfig,
    /// Set while parsing the true branch of a conditional, where `:` ends the branch
    no_range: bool,
}

impl Parser<'_> {
    // ========================================================================
    // Token cursor
    // ========================================================================

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some((_, span)) => *span,
            None => Span::new(self.end, self.end),
        }
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{token}`")))
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        match self.peek() {
            Some(token) => Error::parser(
                format!("unexpected token `{token}`, expected {expected}"),
                self.span(),
            ),
            None => Error::parser(
                format!("unexpected end of input, expected {expected}"),
                self.span(),
            ),
        }
    }

    /// Run `f` inside brackets, where ranges are allowed again
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved = std::mem::replace(&mut self.no_range, false);
        let result = f(self);
        self.no_range = saved;
        result
    }

    /// Comma-separated list up to (and including) `close`
    fn parse_list(&mut self, close: &Token) -> Result<Vec<Node>> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_assignment()?);
            if self.eat(close) {
                return Ok(items);
            }
            self.expect(&Token::Comma)?;
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_block(&mut self) -> Result<Node> {
        let mut statements = Vec::new();
        let mut separated = false;
        while self.peek().is_some() {
            statements.push(self.parse_assignment()?);
            if !self.eat(&Token::Semi) {
                break;
            }
            separated = true;
        }
        if self.peek().is_some() {
            return Err(self.unexpected("end of input"));
        }
        match statements.len() {
            0 => Err(Error::parser("empty expression", self.span())),
            1 if !separated => Ok(statements.remove(0)),
            _ => Ok(Node::Block(statements)),
        }
    }

    fn parse_assignment(&mut self) -> Result<Node> {
        let start = self.span();
        let target = self.parse_conditional()?;
        if !self.eat(&Token::Eq) {
            return Ok(target);
        }
        let value = self.parse_assignment()?;
        match target {
            Node::Symbol(_) | Node::Accessor { .. } => Ok(Node::Assignment {
                target: Box::new(target),
                value: Box::new(value),
            }),
            Node::Call { name, args } => {
                let params = args
                    .into_iter()
                    .map(|arg| match arg {
                        Node::Symbol(param) => Ok(param),
                        _ => Err(Error::parser("function parameters must be names", start)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Node::FunctionAssignment {
                    name,
                    params,
                    body: Box::new(value),
                })
            }
            _ => Err(Error::parser("invalid assignment target", start)),
        }
    }

    fn parse_conditional(&mut self) -> Result<Node> {
        let condition = self.parse_or()?;
        if !self.eat(&Token::Question) {
            return Ok(condition);
        }
        let saved = std::mem::replace(&mut self.no_range, true);
        let true_expr = self.parse_assignment();
        self.no_range = saved;
        let true_expr = true_expr?;
        self.expect(&Token::Colon)?;
        let false_expr = self.parse_assignment()?;
        Ok(Node::Conditional {
            condition: Box::new(condition),
            true_expr: Box::new(true_expr),
            false_expr: Box::new(false_expr),
        })
    }

    // ========================================================================
    // Binary operators
    // ========================================================================

    fn binary(op: &str, lhs: Node, rhs: Node) -> Node {
        let fn_name = binary_operator_function(op).unwrap_or(op);
        Node::binary(op, fn_name, lhs, rhs)
    }

    fn parse_or(&mut self) -> Result<Node> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            lhs = Self::binary("or", lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Node> {
        let mut lhs = self.parse_comparison()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_comparison()?;
            lhs = Self::binary("and", lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> Result<Node> {
        let mut lhs = self.parse_range()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => "==",
                Some(Token::NotEq) => "!=",
                Some(Token::Lt) => "<",
                Some(Token::Gt) => ">",
                Some(Token::LtEq) => "<=",
                Some(Token::GtEq) => ">=",
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_range()?;
            lhs = Self::binary(op, lhs, rhs);
        }
    }

    fn parse_range(&mut self) -> Result<Node> {
        let start = self.parse_additive()?;
        if self.no_range || !self.eat(&Token::Colon) {
            return Ok(start);
        }
        let second = self.parse_additive()?;
        let (step, end) = if self.eat(&Token::Colon) {
            (Some(Box::new(second)), self.parse_additive()?)
        } else {
            (None, second)
        };
        Ok(Node::Range {
            start: Box::new(start),
            end: Box::new(end),
            step,
        })
    }

    fn parse_additive(&mut self) -> Result<Node> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => "+",
                Some(Token::Minus) => "-",
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_multiplicative()?;
            lhs = Self::binary(op, lhs, rhs);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Node> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => "*",
                Some(Token::Slash) => "/",
                Some(Token::Percent) => "%",
                Some(Token::Number(_) | Token::Ident(_) | Token::LParen) => {
                    let rhs = self.parse_unary()?;
                    lhs = Node::Operator(OperatorNode {
                        op: "*".to_string(),
                        fn_name: "multiply".to_string(),
                        args: vec![lhs, rhs],
                        implicit: true,
                    });
                    continue;
                }
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Self::binary(op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> Result<Node> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.parse_unary_inner())
    }

    fn parse_unary_inner(&mut self) -> Result<Node> {
        let op = match self.peek() {
            Some(Token::Minus) => "-",
            Some(Token::Plus) => "+",
            Some(Token::Not) => "not",
            _ => return self.parse_pow(),
        };
        self.pos += 1;
        let operand = self.parse_unary()?;
        let fn_name = unary_operator_function(op).unwrap_or(op);
        Ok(Node::operator(op, fn_name, vec![operand]))
    }

    fn parse_pow(&mut self) -> Result<Node> {
        let base = self.parse_postfix()?;
        if !self.eat(&Token::Caret) {
            return Ok(base);
        }
        let exponent = self.parse_unary()?;
        Ok(Self::binary("^", base, exponent))
    }

    // ========================================================================
    // Postfix and primary expressions
    // ========================================================================

    fn parse_postfix(&mut self) -> Result<Node> {
        let mut node = self.parse_primary()?;
        loop {
            if self.check(&Token::LParen) {
                // `(a)(b)` is left to implicit multiplication
                let Node::Symbol(name) = &node else {
                    return Ok(node);
                };
                let name = name.clone();
                self.pos += 1;
                let args = self.nested(|p| p.parse_list(&Token::RParen))?;
                node = Node::call(name, args);
            } else if self.eat(&Token::LBracket) {
                let dims = self.nested(|p| p.parse_list(&Token::RBracket))?;
                node = Node::accessor(node, Node::Index(dims));
            } else if self.eat(&Token::Dot) {
                match self.advance() {
                    Some((Token::Ident(key), _)) => {
                        node = Node::accessor(node, Node::Index(vec![Node::string(key)]));
                    }
                    Some((token, span)) => {
                        return Err(Error::parser(
                            format!("unexpected token `{token}`, expected a property name"),
                            span,
                        ));
                    }
                    None => return Err(self.unexpected("a property name")),
                }
            } else {
                return Ok(node);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Node> {
        let Some((token, span)) = self.advance() else {
            return Err(self.unexpected("an expression"));
        };
        match token {
            Token::Number(text) => self.number(&text, span),
            Token::StringLit(s) => Ok(Node::string(s)),
            Token::True => Ok(Node::Constant(ConstValue::Bool(true))),
            Token::False => Ok(Node::Constant(ConstValue::Bool(false))),
            Token::Null => Ok(Node::Constant(ConstValue::Null)),
            Token::Undefined => Ok(Node::undefined()),
            Token::Ident(name) => Ok(Node::symbol(name)),
            Token::LParen => {
                let inner = self.nested(|p| p.parse_assignment())?;
                self.expect(&Token::RParen)?;
                Ok(Node::parenthesis(inner))
            }
            Token::LBracket => self.nested(|p| p.parse_array()),
            Token::LBrace => self.nested(|p| p.parse_object()),
            other => Err(Error::parser(
                format!("unexpected token `{other}`, expected an expression"),
                span,
            )),
        }
    }

    fn number(&self, text: &str, span: Span) -> Result<Node> {
        let invalid = || Error::parser(format!("invalid number: {text}"), span);
        match self.config.number {
            NumberType::BigNumber => BigDecimal::from_str(text)
                .map(Node::decimal)
                .map_err(|_| invalid()),
            NumberType::Number | NumberType::Fraction => {
                text.parse::<f64>().map(Node::number).map_err(|_| invalid())
            }
        }
    }

    /// Array body after `[`; rows separated by `;` make a matrix
    fn parse_array(&mut self) -> Result<Node> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut is_matrix = false;
        if self.eat(&Token::RBracket) {
            return Ok(Node::Array(rows));
        }
        loop {
            row.push(self.parse_assignment()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            if self.eat(&Token::Semi) {
                rows.push(Node::Array(std::mem::take(&mut row)));
                is_matrix = true;
                continue;
            }
            self.expect(&Token::RBracket)?;
            break;
        }
        if !is_matrix {
            return Ok(Node::Array(row));
        }
        rows.push(Node::Array(row));
        Ok(Node::Array(rows))
    }

    /// Object body after `{`
    fn parse_object(&mut self) -> Result<Node> {
        let mut props = BTreeMap::new();
        if self.eat(&Token::RBrace) {
            return Ok(Node::Object(props));
        }
        loop {
            let key = match self.advance() {
                Some((Token::Ident(key) | Token::StringLit(key) | Token::Number(key), _)) => key,
                Some((token, span)) => {
                    return Err(Error::parser(
                        format!("unexpected token `{token}`, expected a property name"),
                        span,
                    ));
                }
                None => return Err(self.unexpected("a property name")),
            };
            self.expect(&Token::Colon)?;
            let value = self.parse_assignment()?;
            props.insert(key, value);
            if self.eat(&Token::RBrace) {
                return Ok(Node::Object(props));
            }
            self.expect(&Token::Comma)?;
        }
    }
}
