//! Filter expressions over feeds and articles.
//!
//! A small boolean language used by query feeds and the feed list filter:
//!
//! ```text
//! unread_count > 0 and (tags # "news" or title =~ "rust")
//! ```
//!
//! Operators: `=`, `!=`, `=~` / `!~` (regex), `<`, `>`, `<=`, `>=`
//! (numeric), `#` / `!#` (membership in a space separated list).

use crate::error::MatcherError;
use regex::Regex;

/// Anything a filter can be evaluated against.
pub trait Matchable {
    /// Value of the named attribute, `None` if this object has no such attribute
    fn attribute(&self, name: &str) -> Option<String>;
}

#[derive(Debug, Clone)]
enum Comparison {
    Equals,
    NotEquals,
    Matches(Regex),
    NotMatches(Regex),
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    Contains,
    NotContains,
}

#[derive(Debug, Clone)]
enum Node {
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Condition {
        attribute: String,
        comparison: Comparison,
        value: String,
    },
}

/// A parsed filter expression
#[derive(Debug, Clone)]
pub struct Filter {
    source: String,
    root: Node,
}

impl Filter {
    /// Parse an expression
    pub fn parse(expr: &str) -> Result<Self, MatcherError> {
        let tokens = tokenize(expr)?;
        let mut parser = Parser { tokens, pos: 0 };
        let root = parser.expression()?;
        if let Some(token) = parser.peek() {
            return Err(MatcherError::UnexpectedToken(token.text()));
        }
        Ok(Self {
            source: expr.to_string(),
            root,
        })
    }

    /// The expression this filter was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against one object
    pub fn matches(&self, item: &dyn Matchable) -> Result<bool, MatcherError> {
        eval(&self.root, item)
    }
}

fn eval(node: &Node, item: &dyn Matchable) -> Result<bool, MatcherError> {
    match node {
        Node::And(lhs, rhs) => Ok(eval(lhs, item)? && eval(rhs, item)?),
        Node::Or(lhs, rhs) => Ok(eval(lhs, item)? || eval(rhs, item)?),
        Node::Condition {
            attribute,
            comparison,
            value,
        } => {
            let actual = item
                .attribute(attribute)
                .ok_or_else(|| MatcherError::AttributeUnavailable(attribute.clone()))?;
            compare(&actual, comparison, value)
        }
    }
}

fn compare(actual: &str, comparison: &Comparison, expected: &str) -> Result<bool, MatcherError> {
    let numbers = || -> Result<(i64, i64), MatcherError> {
        let a = actual
            .trim()
            .parse::<i64>()
            .map_err(|_| MatcherError::NotANumber(actual.to_string()))?;
        let b = expected
            .trim()
            .parse::<i64>()
            .map_err(|_| MatcherError::NotANumber(expected.to_string()))?;
        Ok((a, b))
    };

    Ok(match comparison {
        Comparison::Equals => actual == expected,
        Comparison::NotEquals => actual != expected,
        Comparison::Matches(re) => re.is_match(actual),
        Comparison::NotMatches(re) => !re.is_match(actual),
        Comparison::Less => {
            let (a, b) = numbers()?;
            a < b
        }
        Comparison::Greater => {
            let (a, b) = numbers()?;
            a > b
        }
        Comparison::LessOrEqual => {
            let (a, b) = numbers()?;
            a <= b
        }
        Comparison::GreaterOrEqual => {
            let (a, b) = numbers()?;
            a >= b
        }
        Comparison::Contains => actual.split_whitespace().any(|t| t == expected),
        Comparison::NotContains => !actual.split_whitespace().any(|t| t == expected),
    })
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Literal(String),
    Op(String),
    Open,
    Close,
}

impl Token {
    fn text(&self) -> String {
        match self {
            Token::Ident(s) | Token::Literal(s) | Token::Op(s) => s.clone(),
            Token::Open => "(".to_string(),
            Token::Close => ")".to_string(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, MatcherError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '"' => {
                chars.next();
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => match chars.next() {
                            Some(escaped) => literal.push(escaped),
                            None => return Err(MatcherError::UnterminatedString),
                        },
                        Some('"') => break,
                        Some(other) => literal.push(other),
                        None => return Err(MatcherError::UnterminatedString),
                    }
                }
                tokens.push(Token::Literal(literal));
            }
            '=' | '!' | '<' | '>' | '~' | '#' => {
                let mut op = String::new();
                while let Some(&o) = chars.peek() {
                    if matches!(o, '=' | '!' | '<' | '>' | '~' | '#') {
                        op.push(o);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Op(op));
            }
            c if c.is_alphanumeric() || c == '_' || c == '-' => {
                let mut word = String::new();
                while let Some(&w) = chars.peek() {
                    if w.is_alphanumeric() || w == '_' || w == '-' {
                        word.push(w);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(word));
            }
            other => return Err(MatcherError::UnexpectedToken(other.to_string())),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, MatcherError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(MatcherError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn keyword(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(w)) if w.eq_ignore_ascii_case(word)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expression(&mut self) -> Result<Node, MatcherError> {
        let mut node = self.conjunction()?;
        while self.keyword("or") {
            let rhs = self.conjunction()?;
            node = Node::Or(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn conjunction(&mut self) -> Result<Node, MatcherError> {
        let mut node = self.primary()?;
        while self.keyword("and") {
            let rhs = self.primary()?;
            node = Node::And(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn primary(&mut self) -> Result<Node, MatcherError> {
        match self.next()? {
            Token::Open => {
                let node = self.expression()?;
                match self.next()? {
                    Token::Close => Ok(node),
                    other => Err(MatcherError::UnexpectedToken(other.text())),
                }
            }
            Token::Ident(attribute) => {
                let op = match self.next()? {
                    Token::Op(op) => op,
                    other => return Err(MatcherError::UnexpectedToken(other.text())),
                };
                let value = match self.next()? {
                    Token::Literal(v) | Token::Ident(v) => v,
                    other => return Err(MatcherError::UnexpectedToken(other.text())),
                };
                let comparison = comparison(&op, &value)?;
                Ok(Node::Condition {
                    attribute,
                    comparison,
                    value,
                })
            }
            other => Err(MatcherError::UnexpectedToken(other.text())),
        }
    }
}

fn comparison(op: &str, value: &str) -> Result<Comparison, MatcherError> {
    let regex = || {
        Regex::new(&format!("(?i){}", value)).map_err(|e| MatcherError::InvalidRegex {
            pattern: value.to_string(),
            reason: e.to_string(),
        })
    };
    Ok(match op {
        "=" | "==" => Comparison::Equals,
        "!=" => Comparison::NotEquals,
        "=~" => Comparison::Matches(regex()?),
        "!~" => Comparison::NotMatches(regex()?),
        "<" => Comparison::Less,
        ">" => Comparison::Greater,
        "<=" => Comparison::LessOrEqual,
        ">=" => Comparison::GreaterOrEqual,
        "#" => Comparison::Contains,
        "!#" => Comparison::NotContains,
        other => return Err(MatcherError::UnknownOperator(other.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Attrs(HashMap<&'static str, &'static str>);

    impl Matchable for Attrs {
        fn attribute(&self, name: &str) -> Option<String> {
            self.0.get(name).map(|v| (*v).to_string())
        }
    }

    fn feed() -> Attrs {
        Attrs(HashMap::from([
            ("title", "This Week in Rust"),
            ("unread_count", "3"),
            ("tags", "rust news"),
        ]))
    }

    #[test]
    fn test_equality() {
        let f = Filter::parse("title = \"This Week in Rust\"").unwrap();
        assert!(f.matches(&feed()).unwrap());
        let f = Filter::parse("title != \"This Week in Rust\"").unwrap();
        assert!(!f.matches(&feed()).unwrap());
    }

    #[test]
    fn test_regex_is_case_insensitive() {
        let f = Filter::parse("title =~ \"week in\"").unwrap();
        assert!(f.matches(&feed()).unwrap());
    }

    #[test]
    fn test_numeric_and_membership() {
        let f = Filter::parse("unread_count > 0 and tags # news").unwrap();
        assert!(f.matches(&feed()).unwrap());
        let f = Filter::parse("unread_count >= 4 or tags !# rust").unwrap();
        assert!(!f.matches(&feed()).unwrap());
    }

    #[test]
    fn test_parentheses() {
        let f = Filter::parse("(tags # go or tags # rust) and unread_count < 10").unwrap();
        assert!(f.matches(&feed()).unwrap());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Filter::parse("title = \"open").unwrap_err(),
            MatcherError::UnterminatedString
        );
        assert_eq!(
            Filter::parse("title =").unwrap_err(),
            MatcherError::UnexpectedEnd
        );
        assert_eq!(
            Filter::parse("title ~~ x").unwrap_err(),
            MatcherError::UnknownOperator("~~".to_string())
        );
        assert!(matches!(
            Filter::parse("title =~ \"(\""),
            Err(MatcherError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_evaluation_errors() {
        let f = Filter::parse("author = bob").unwrap();
        assert_eq!(
            f.matches(&feed()).unwrap_err(),
            MatcherError::AttributeUnavailable("author".to_string())
        );
        let f = Filter::parse("title > 3").unwrap();
        assert!(matches!(f.matches(&feed()), Err(MatcherError::NotANumber(_))));
    }
}
