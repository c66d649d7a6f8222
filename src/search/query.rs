//! Free-text query parser / 查询解析
//!
//! # Grammar
//!
//! ```text
//! query    := clause*
//! clause   := (AND | OR)? modifier? primary
//! modifier := '+' | '-' | '!' | NOT
//! primary  := TERM (':' value)? | QUOTED | '(' query ')'
//! value    := TERM | QUOTED | '(' query ')'
//! ```
//!
//! Operators are upper case (`AND`, `OR`, `NOT`) or `&&`, `||`. Adjacent
//! clauses without an operator are optional (OR). Terms may carry `*` and `?`
//! wildcards. Only the `content` field is searchable.

use thiserror::Error;

use super::schema::CONTENT_FIELD;
use super::tokenizer::{normalize_pattern, normalize_phrase, tokenize_query};

/// Parsed query / 查询语法树
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Any of the analyzed tokens / 任一词项
    Term(Vec<String>),
    /// Folded phrase text, words adjacent in order / 短语
    Phrase(String),
    /// Term pattern with `*` / `?` / 通配符
    Wildcard(String),
    Bool {
        must: Vec<Query>,
        should: Vec<Query>,
        must_not: Vec<Query>,
    },
    /// Matches no document (unknown field, term without tokens) / 不匹配任何文档
    MatchNone,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} (at position {position})")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Term(String),
    Quoted(String),
    And,
    Or,
    Not,
    Plus,
    Minus,
    LeftParen,
    RightParen,
    Colon,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Occur {
    Must,
    Should,
    MustNot,
}

struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position: self.position,
        }
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn next_token(&mut self) -> Result<(Token, usize), ParseError> {
        while self.peek_char(0).is_some_and(char::is_whitespace) {
            self.position += 1;
        }
        let start = self.position;

        let Some(ch) = self.peek_char(0) else {
            return Ok((Token::Eof, start));
        };

        let token = match ch {
            '(' => {
                self.position += 1;
                Token::LeftParen
            }
            ')' => {
                self.position += 1;
                Token::RightParen
            }
            ':' => {
                self.position += 1;
                Token::Colon
            }
            '+' => {
                self.position += 1;
                Token::Plus
            }
            '-' => {
                self.position += 1;
                Token::Minus
            }
            '!' => {
                self.position += 1;
                Token::Not
            }
            '&' if self.peek_char(1) == Some('&') => {
                self.position += 2;
                Token::And
            }
            '|' if self.peek_char(1) == Some('|') => {
                self.position += 2;
                Token::Or
            }
            '"' => {
                self.position += 1;
                self.read_quoted()?
            }
            _ => self.read_term()?,
        };

        Ok((token, start))
    }

    fn read_quoted(&mut self) -> Result<Token, ParseError> {
        let mut text = String::new();
        while let Some(ch) = self.peek_char(0) {
            self.position += 1;
            match ch {
                '"' => return Ok(Token::Quoted(text)),
                '\\' => match self.peek_char(0) {
                    Some(escaped) => {
                        text.push(escaped);
                        self.position += 1;
                    }
                    None => break,
                },
                _ => text.push(ch),
            }
        }
        Err(self.error("unterminated quoted phrase"))
    }

    fn read_term(&mut self) -> Result<Token, ParseError> {
        let mut term = String::new();
        while let Some(ch) = self.peek_char(0) {
            if ch.is_whitespace() || matches!(ch, '(' | ')' | '"' | ':') {
                break;
            }
            self.position += 1;
            if ch == '\\' {
                let escaped = self
                    .peek_char(0)
                    .ok_or_else(|| self.error("dangling escape character"))?;
                term.push(escaped);
                self.position += 1;
            } else {
                term.push(ch);
            }
        }

        Ok(match term.as_str() {
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            _ => Token::Term(term),
        })
    }
}

/// Parse a keyword line into a query / 解析查询
pub fn parse(input: &str) -> Result<Query, ParseError> {
    let mut parser = Parser::new(input)?;
    let query = parser.parse_clauses(false)?;
    Ok(query)
}

struct Parser {
    lexer: Lexer,
    current: Token,
    current_pos: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let (current, current_pos) = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            current_pos,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        let (token, pos) = self.lexer.next_token()?;
        self.current = token;
        self.current_pos = pos;
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position: self.current_pos,
        }
    }

    fn parse_clauses(&mut self, in_group: bool) -> Result<Query, ParseError> {
        let mut clauses: Vec<(Occur, Query)> = Vec::new();

        loop {
            match self.current {
                Token::Eof if in_group => return Err(self.error("missing closing parenthesis")),
                Token::Eof => break,
                Token::RightParen if in_group => break,
                Token::RightParen => return Err(self.error("unbalanced closing parenthesis")),
                _ => {}
            }

            let conjunction = match self.current {
                Token::And | Token::Or => {
                    if clauses.is_empty() {
                        return Err(self.error("operator without left operand"));
                    }
                    let conj = self.current.clone();
                    self.advance()?;
                    Some(conj)
                }
                _ => None,
            };

            let modifier = match self.current {
                Token::Plus => Some(Occur::Must),
                Token::Minus | Token::Not => Some(Occur::MustNot),
                _ => None,
            };
            if modifier.is_some() {
                self.advance()?;
            }

            let query = self.parse_primary()?;

            // AND makes the previous optional clause required
            if conjunction == Some(Token::And) {
                if let Some(last) = clauses.last_mut() {
                    if last.0 == Occur::Should {
                        last.0 = Occur::Must;
                    }
                }
            }

            let occur = match (modifier, &conjunction) {
                (Some(occur), _) => occur,
                (None, Some(Token::And)) => Occur::Must,
                _ => Occur::Should,
            };
            clauses.push((occur, query));
        }

        if in_group && clauses.is_empty() {
            return Err(self.error("empty group"));
        }

        Ok(build_bool(clauses))
    }

    fn parse_primary(&mut self) -> Result<Query, ParseError> {
        match self.current.clone() {
            Token::Term(term) => {
                self.advance()?;
                if self.current == Token::Colon {
                    self.advance()?;
                    let value = self.parse_field_value()?;
                    if term.eq_ignore_ascii_case(CONTENT_FIELD) {
                        Ok(value)
                    } else {
                        Ok(Query::MatchNone)
                    }
                } else {
                    Ok(term_query(&term))
                }
            }
            Token::Quoted(text) => {
                self.advance()?;
                Ok(phrase_query(&text))
            }
            Token::LeftParen => {
                self.advance()?;
                let inner = self.parse_clauses(true)?;
                if self.current != Token::RightParen {
                    return Err(self.error("missing closing parenthesis"));
                }
                self.advance()?;
                Ok(inner)
            }
            Token::Eof => Err(self.error("expected a term at end of query")),
            other => Err(self.error(format!("expected a term, found {:?}", other))),
        }
    }

    fn parse_field_value(&mut self) -> Result<Query, ParseError> {
        match self.current {
            Token::Term(_) | Token::Quoted(_) | Token::LeftParen => self.parse_primary(),
            _ => Err(self.error("field without value")),
        }
    }
}

fn term_query(term: &str) -> Query {
    if term.contains(['*', '?']) {
        return Query::Wildcard(normalize_pattern(term));
    }
    let tokens = tokenize_query(term);
    if tokens.is_empty() {
        Query::MatchNone
    } else {
        Query::Term(tokens)
    }
}

fn phrase_query(text: &str) -> Query {
    let phrase = normalize_phrase(text);
    if phrase.is_empty() {
        Query::MatchNone
    } else {
        Query::Phrase(phrase)
    }
}

fn build_bool(clauses: Vec<(Occur, Query)>) -> Query {
    if clauses.len() == 1 && clauses[0].0 != Occur::MustNot {
        if let Some((_, query)) = clauses.into_iter().next() {
            return query;
        }
        return Query::MatchNone;
    }

    let mut must = Vec::new();
    let mut should = Vec::new();
    let mut must_not = Vec::new();
    for (occur, query) in clauses {
        match occur {
            Occur::Must => must.push(query),
            Occur::Should => should.push(query),
            Occur::MustNot => must_not.push(query),
        }
    }
    Query::Bool {
        must,
        should,
        must_not,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(t: &str) -> Query {
        Query::Term(vec![t.to_string()])
    }

    #[test]
    fn test_single_term() {
        assert_eq!(parse("Alpha").unwrap(), term("alpha"));
    }

    #[test]
    fn test_adjacent_terms_are_optional() {
        assert_eq!(
            parse("alpha beta").unwrap(),
            Query::Bool {
                must: vec![],
                should: vec![term("alpha"), term("beta")],
                must_not: vec![],
            }
        );
    }

    #[test]
    fn test_and_makes_both_required() {
        assert_eq!(
            parse("alpha AND beta").unwrap(),
            Query::Bool {
                must: vec![term("alpha"), term("beta")],
                should: vec![],
                must_not: vec![],
            }
        );
        assert_eq!(parse("alpha && beta").unwrap(), parse("alpha AND beta").unwrap());
    }

    #[test]
    fn test_lowercase_operators_are_terms() {
        assert_eq!(
            parse("rock and roll").unwrap(),
            Query::Bool {
                must: vec![],
                should: vec![term("rock"), term("and"), term("roll")],
                must_not: vec![],
            }
        );
    }

    #[test]
    fn test_negation_and_required() {
        assert_eq!(
            parse("+alpha -beta NOT gamma").unwrap(),
            Query::Bool {
                must: vec![term("alpha")],
                should: vec![],
                must_not: vec![term("beta"), term("gamma")],
            }
        );
        assert_eq!(
            parse("-beta").unwrap(),
            Query::Bool {
                must: vec![],
                should: vec![],
                must_not: vec![term("beta")],
            }
        );
    }

    #[test]
    fn test_phrase_group_and_field() {
        assert_eq!(
            parse("\"Machine Learning\"").unwrap(),
            Query::Phrase("machine learning".to_string())
        );
        assert_eq!(parse("\"!!\"").unwrap(), Query::MatchNone);
        assert_eq!(parse("(alpha)").unwrap(), term("alpha"));
        assert_eq!(parse("content:alpha").unwrap(), term("alpha"));
        assert_eq!(parse("author:alpha").unwrap(), Query::MatchNone);
    }

    #[test]
    fn test_wildcards_and_empty_terms() {
        assert_eq!(parse("Alph*").unwrap(), Query::Wildcard("alph*".to_string()));
        assert_eq!(parse("b?ta").unwrap(), Query::Wildcard("b?ta".to_string()));
        assert_eq!(parse("...").unwrap(), Query::MatchNone);
        assert_eq!(parse("\\(alpha\\)").unwrap(), term("alpha"));
    }

    #[test]
    fn test_malformed_queries() {
        for input in [
            "\"unterminated",
            "(alpha",
            "alpha)",
            "AND alpha",
            "alpha AND",
            "alpha OR",
            "NOT",
            "alpha -",
            "()",
            "content:",
            ":alpha",
            "alpha\\",
        ] {
            assert!(parse(input).is_err(), "expected parse error for {:?}", input);
        }
    }

    #[test]
    fn test_error_position() {
        let err = parse("alpha )").unwrap_err();
        assert_eq!(err.position, 6);
    }
}
