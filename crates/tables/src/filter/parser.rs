//! Lexer and recursive-descent parser for rewritten filters.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr       := or
//! or         := and (("or" | "||") and)*
//! and        := comparison (("and" | "&&") comparison)*
//! comparison := unary (("==" | "=" | "!=" | "<>" | "<" | "<=" | ">" | ">=") unary)?
//! unary      := ("not" | "!") unary | primary
//! primary    := identifier | literal | "(" expr ")"
//! literal    := string | integer ["L"] | decimal | "true" | "false" | "null"
//! ```
//!
//! Keywords are case-insensitive. Strings are double-quoted; a doubled quote
//! inside a string stands for one apostrophe, since it came from OData's `''`
//! escape before rewriting.
//!
//! `and`/`or` chains parse into a single n-ary node, so a long chain of
//! clauses costs no extra stack. Nesting of `not` and parentheses is capped
//! at [`MAX_DEPTH`] levels.

use std::{iter::Peekable, str::CharIndices};

use super::{
    FilterError,
    ast::{CompareOp, Expr, Literal},
};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    True,
    False,
    Null,
    And,
    Or,
    Not,
    Cmp(CompareOp),
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("identifier '{name}'"),
            Self::Str(value) => format!("string {value:?}"),
            Self::Int(value) => format!("number {value}"),
            Self::Float(value) => format!("number {value}"),
            Self::True => "'true'".to_owned(),
            Self::False => "'false'".to_owned(),
            Self::Null => "'null'".to_owned(),
            Self::And => "'and'".to_owned(),
            Self::Or => "'or'".to_owned(),
            Self::Not => "'not'".to_owned(),
            Self::Cmp(op) => format!("'{op}'"),
            Self::LParen => "'('".to_owned(),
            Self::RParen => "')'".to_owned(),
        }
    }
}

struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, chars: input.char_indices().peekable() }
    }

    fn tokenize(mut self) -> Result<Vec<(usize, Token)>, FilterError> {
        let mut tokens = Vec::new();
        while let Some(&(offset, ch)) = self.chars.peek() {
            if ch.is_whitespace() {
                self.chars.next();
                continue;
            }
            let token = match ch {
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                '"' => self.string(offset)?,
                '=' => {
                    self.chars.next();
                    self.eat('=');
                    Token::Cmp(CompareOp::Eq)
                },
                '!' => {
                    self.chars.next();
                    if self.eat('=') { Token::Cmp(CompareOp::Ne) } else { Token::Not }
                },
                '<' => {
                    self.chars.next();
                    if self.eat('=') {
                        Token::Cmp(CompareOp::Le)
                    } else if self.eat('>') {
                        Token::Cmp(CompareOp::Ne)
                    } else {
                        Token::Cmp(CompareOp::Lt)
                    }
                },
                '>' => {
                    self.chars.next();
                    if self.eat('=') { Token::Cmp(CompareOp::Ge) } else { Token::Cmp(CompareOp::Gt) }
                },
                '&' => self.doubled('&', Token::And, offset)?,
                '|' => self.doubled('|', Token::Or, offset)?,
                '-' | '0'..='9' => self.number(offset)?,
                c if c.is_alphabetic() || c == '_' => self.word(offset),
                found => return Err(FilterError::UnexpectedCharacter { found, offset }),
            };
            tokens.push((offset, token));
        }
        Ok(tokens)
    }

    fn single(&mut self, token: Token) -> Token {
        self.chars.next();
        token
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.chars.peek().is_some_and(|&(_, ch)| ch == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn doubled(&mut self, ch: char, token: Token, offset: usize) -> Result<Token, FilterError> {
        self.chars.next();
        if self.eat(ch) { Ok(token) } else { Err(FilterError::UnexpectedCharacter { found: ch, offset }) }
    }

    fn string(&mut self, start: usize) -> Result<Token, FilterError> {
        self.chars.next();
        let mut value = String::new();
        while let Some((_, ch)) = self.chars.next() {
            if ch == '"' {
                if self.eat('"') {
                    value.push('\'');
                    continue;
                }
                return Ok(Token::Str(value));
            }
            value.push(ch);
        }
        Err(FilterError::UnterminatedString { offset: start })
    }

    fn number(&mut self, start: usize) -> Result<Token, FilterError> {
        let mut end = start;
        let mut is_float = false;
        if let Some((offset, '-')) = self.chars.peek().copied() {
            self.chars.next();
            end = offset + 1;
            if !self.chars.peek().is_some_and(|&(_, ch)| ch.is_ascii_digit()) {
                return Err(FilterError::UnexpectedCharacter { found: '-', offset });
            }
        }
        while let Some(&(offset, ch)) = self.chars.peek() {
            match ch {
                '0'..='9' => {},
                '.' | 'e' | 'E' => is_float = true,
                '+' | '-' if is_float && self.input[..offset].ends_with(['e', 'E']) => {},
                _ => break,
            }
            self.chars.next();
            end = offset + ch.len_utf8();
        }
        let text = &self.input[start..end];
        // OData writes 64-bit integers with an `L` suffix.
        let long_suffix = !is_float && self.eat_suffix();
        let invalid = || FilterError::InvalidNumber {
            text: if long_suffix { format!("{text}L") } else { text.to_owned() },
        };
        if is_float {
            text.parse::<f64>().map(Token::Float).map_err(|_| invalid())
        } else {
            text.parse::<i64>().map(Token::Int).map_err(|_| invalid())
        }
    }

    fn eat_suffix(&mut self) -> bool {
        let is_suffix = matches!(self.chars.peek(), Some(&(_, 'L' | 'l')));
        if !is_suffix {
            return false;
        }
        // `12Lx` is not a suffixed literal; leave it for the next token to reject.
        let mut ahead = self.chars.clone();
        ahead.next();
        if ahead.peek().is_some_and(|&(_, ch)| ch.is_alphanumeric() || ch == '_') {
            return false;
        }
        self.chars.next();
        true
    }

    fn word(&mut self, start: usize) -> Token {
        let mut end = start;
        while let Some(&(offset, ch)) = self.chars.peek() {
            if !(ch.is_alphanumeric() || ch == '_') {
                break;
            }
            self.chars.next();
            end = offset + ch.len_utf8();
        }
        let word = &self.input[start..end];
        match word.to_ascii_lowercase().as_str() {
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "true" => Token::True,
            "false" => Token::False,
            "null" => Token::Null,
            _ => Token::Ident(word.to_owned()),
        }
    }
}

/// Deepest nesting of `not` and parentheses a filter may use.
pub const MAX_DEPTH: usize = 128;

struct Parser {
    tokens: Vec<(usize, Token)>,
    position: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(_, token)| token)
    }

    fn advance(&mut self) -> Option<(usize, Token)> {
        let next = self.tokens.get(self.position).cloned();
        if next.is_some() {
            self.position += 1;
        }
        next
    }

    fn unexpected(&self, expected: &'static str) -> FilterError {
        match self.tokens.get(self.position) {
            Some((offset, token)) => {
                FilterError::UnexpectedToken { found: token.describe(), offset: *offset, expected }
            },
            None => FilterError::UnexpectedEnd,
        }
    }

    fn or(&mut self) -> Result<Expr, FilterError> {
        let first = self.and()?;
        if self.peek() != Some(&Token::Or) {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.peek() == Some(&Token::Or) {
            self.advance();
            operands.push(self.and()?);
        }
        Ok(Expr::Or(operands))
    }

    fn and(&mut self) -> Result<Expr, FilterError> {
        let first = self.comparison()?;
        if self.peek() != Some(&Token::And) {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.peek() == Some(&Token::And) {
            self.advance();
            operands.push(self.comparison()?);
        }
        Ok(Expr::And(operands))
    }

    fn comparison(&mut self) -> Result<Expr, FilterError> {
        let left = self.unary()?;
        if let Some(Token::Cmp(op)) = self.peek() {
            let op = *op;
            self.advance();
            let right = self.unary()?;
            return Ok(Expr::compare(op, left, right));
        }
        Ok(left)
    }

    /// Enters one level of `not` or `(`.
    fn descend(&mut self) -> Result<(), FilterError> {
        if self.depth >= MAX_DEPTH {
            return Err(FilterError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        Ok(())
    }

    fn unary(&mut self) -> Result<Expr, FilterError> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            self.descend()?;
            let inner = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, FilterError> {
        let expr = match self.peek() {
            Some(Token::Ident(name)) => Expr::Field(name.clone()),
            Some(Token::Str(value)) => Expr::Literal(Literal::String(value.clone())),
            Some(Token::Int(value)) => Expr::Literal(Literal::Integer(*value)),
            Some(Token::Float(value)) => Expr::Literal(Literal::Float(*value)),
            Some(Token::True) => Expr::Literal(Literal::Bool(true)),
            Some(Token::False) => Expr::Literal(Literal::Bool(false)),
            Some(Token::Null) => Expr::Literal(Literal::Null),
            Some(Token::LParen) => {
                self.advance();
                self.descend()?;
                let inner = self.or()?;
                self.depth -= 1;
                if self.peek() != Some(&Token::RParen) {
                    return Err(self.unexpected("')'"));
                }
                self.advance();
                return Ok(inner);
            },
            _ => return Err(self.unexpected("a field, literal or '('")),
        };
        self.advance();
        Ok(expr)
    }
}

/// Parses a rewritten filter into an expression tree.
///
/// # Errors
///
/// Returns a [`FilterError`] describing the first lexical or syntactic
/// problem found.
pub fn parse(input: &str) -> Result<Expr, FilterError> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser { tokens, position: 0, depth: 0 };
    let expr = parser.or()?;
    if parser.position < parser.tokens.len() {
        return Err(parser.unexpected("end of filter"));
    }
    Ok(expr)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn field(name: &str) -> Expr {
        Expr::field(name)
    }

    fn string(value: &str) -> Expr {
        Expr::Literal(Literal::String(value.to_owned()))
    }

    fn int(value: i64) -> Expr {
        Expr::Literal(Literal::Integer(value))
    }

    #[test]
    fn test_parse_equality() {
        let expr = parse("PartitionKey == \"US\"").unwrap();
        assert_eq!(expr, Expr::compare(CompareOp::Eq, field("PartitionKey"), string("US")));
    }

    #[test]
    fn test_parse_operators_without_spaces() {
        assert_eq!(parse("a!=\"x\"").unwrap(), Expr::compare(CompareOp::Ne, field("a"), string("x")));
        assert_eq!(parse("a>=3").unwrap(), Expr::compare(CompareOp::Ge, field("a"), int(3)));
        assert_eq!(parse("a<=3").unwrap(), Expr::compare(CompareOp::Le, field("a"), int(3)));
        assert_eq!(parse("a<>3").unwrap(), Expr::compare(CompareOp::Ne, field("a"), int(3)));
        assert_eq!(parse("a=3").unwrap(), Expr::compare(CompareOp::Eq, field("a"), int(3)));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse("a == 1 or b == 2 and c == 3").unwrap();
        let Expr::Or(operands) = expr else { panic!("expected or at the root") };
        assert_eq!(operands.len(), 2);
        assert_eq!(operands[0], Expr::compare(CompareOp::Eq, field("a"), int(1)));
        assert!(matches!(&operands[1], Expr::And(inner) if inner.len() == 2));
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = parse("(a == 1 or b == 2) and c == 3").unwrap();
        let Expr::And(operands) = expr else { panic!("expected and at the root") };
        assert!(matches!(&operands[0], Expr::Or(_)));
    }

    #[test]
    fn test_chains_are_flat() {
        let expr = parse("a == 1 or a == 2 or a == 3 or a == 4").unwrap();
        let Expr::Or(operands) = expr else { panic!("expected or at the root") };
        assert_eq!(operands.len(), 4);
        assert!(operands.iter().all(|operand| matches!(operand, Expr::Compare { .. })));
    }

    #[test]
    fn test_nesting_at_limit_is_accepted() {
        let filter = format!("{}a == 1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert!(parse(&filter).is_ok());
        assert!(parse(&format!("{}a", "not ".repeat(MAX_DEPTH))).is_ok());
    }

    #[test]
    fn test_nesting_past_limit_is_too_deep() {
        let depth = MAX_DEPTH + 1;
        let filter = format!("{}a == 1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse(&filter).unwrap_err(), FilterError::TooDeep { limit: MAX_DEPTH });
        assert_eq!(
            parse(&format!("{}a", "not ".repeat(depth))).unwrap_err(),
            FilterError::TooDeep { limit: MAX_DEPTH }
        );
    }

    #[test]
    fn test_sibling_groups_do_not_accumulate_depth() {
        let group = format!("{}a == 1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        let filter = format!("{group} or {group} and not {}", "b");
        assert!(parse(&filter).is_ok());
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let upper = parse("A == 1 AND NOT B == 2 Or C == TRUE").unwrap();
        let lower = parse("A == 1 and not B == 2 or C == true").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_symbolic_boolean_operators() {
        assert_eq!(parse("a && b || !c").unwrap(), parse("a and b or not c").unwrap());
    }

    #[test]
    fn test_numeric_literals() {
        assert_eq!(parse("a == -7").unwrap(), Expr::compare(CompareOp::Eq, field("a"), int(-7)));
        assert_eq!(parse("a == 42L").unwrap(), Expr::compare(CompareOp::Eq, field("a"), int(42)));
        assert_eq!(
            parse("a == 2.5").unwrap(),
            Expr::compare(CompareOp::Eq, field("a"), Expr::Literal(Literal::Float(2.5)))
        );
        assert_eq!(
            parse("a == 1e3").unwrap(),
            Expr::compare(CompareOp::Eq, field("a"), Expr::Literal(Literal::Float(1000.0)))
        );
    }

    #[test]
    fn test_doubled_quote_is_an_apostrophe() {
        assert_eq!(
            parse("a == \"O\"\"Brien\"").unwrap(),
            Expr::compare(CompareOp::Eq, field("a"), string("O'Brien"))
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(parse("a == \"abc").unwrap_err(), FilterError::UnterminatedString { offset: 5 });
    }

    #[test]
    fn test_unexpected_character() {
        assert_eq!(
            parse("a == #").unwrap_err(),
            FilterError::UnexpectedCharacter { found: '#', offset: 5 }
        );
        assert!(matches!(parse("a & b"), Err(FilterError::UnexpectedCharacter { found: '&', .. })));
    }

    #[test]
    fn test_trailing_tokens_are_rejected() {
        let err = parse("a == 1 b").unwrap_err();
        assert!(matches!(err, FilterError::UnexpectedToken { expected: "end of filter", .. }));
    }

    #[test]
    fn test_missing_close_paren() {
        assert_eq!(parse("(a == 1").unwrap_err(), FilterError::UnexpectedEnd);
    }

    #[test]
    fn test_empty_input_is_unexpected_end() {
        assert_eq!(parse("   ").unwrap_err(), FilterError::UnexpectedEnd);
    }

    #[test]
    fn test_integer_overflow_is_invalid_number() {
        let err = parse("a == 99999999999999999999").unwrap_err();
        assert!(matches!(err, FilterError::InvalidNumber { .. }));
    }
}
