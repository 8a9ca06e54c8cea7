use std::str::FromStr;

use pluck_common::warning::warn_once;

use super::{Operator, SelectorChain, SelectorGroup, SelectorStep, TagFilter};
use crate::error::ParseError;

/// Parse a selector string into its comma-separated chains.
///
/// - Tokens are separated by whitespace or `/`; `,` starts a new chain.
/// - Tag names and attribute keys are lowercased.
/// - A token whose tag is exactly `tbody` is dropped, since parsers insert
///   `tbody` into tables whether or not the markup had one.
/// - Empty tokens and empty chains are discarded.
/// - A token must end at a separator. One that runs into anything else
///   (`div>p`) is dropped with a warning and reading resumes at the
///   offending character, so `div>p` reads as `p`.
///
/// # Errors
/// Returns [`ParseError::Empty`] if no step survives, [`ParseError::BareWildcard`]
/// for `*` without an attribute test, [`ParseError::Malformed`] for an
/// unreadable `[...]` part and [`ParseError::InvalidPattern`] for a `*=`
/// pattern that does not compile.
pub fn parse_selector_group(selector: &str) -> Result<SelectorGroup, ParseError> {
    let mut parser = Parser::new(selector);
    let mut chains = Vec::new();
    let mut steps = Vec::new();

    loop {
        while let Some(c) = parser.peek() {
            if c == ',' {
                if !steps.is_empty() {
                    chains.push(SelectorChain::new(std::mem::take(&mut steps))?);
                }
            } else if !is_separator(c) {
                break;
            }
            parser.advance();
        }
        if parser.at_end() {
            break;
        }

        let start = parser.pos;
        let token = parser.parse_step()?;
        if parser.peek().is_some_and(|c| !is_separator(c)) {
            parser.drop_token(start);
            continue;
        }
        match token {
            Token::Step(step) => steps.push(step),
            Token::BareWildcard => {
                return Err(ParseError::BareWildcard {
                    selector: selector.to_string(),
                });
            }
            Token::Nothing => {}
        }
    }
    if !steps.is_empty() {
        chains.push(SelectorChain::new(steps)?);
    }

    if chains.is_empty() {
        return Err(ParseError::Empty {
            selector: selector.to_string(),
        });
    }
    let group = SelectorGroup::new(chains)?;
    tracing::debug!("Parsed selector {selector:?} as {group}");
    Ok(group)
}

const fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '/' || c == ','
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_tag_char(c: char) -> bool {
    is_word_char(c) || matches!(c, '-' | ':' | '*')
}

fn is_name_char(c: char) -> bool {
    is_word_char(c) || c == '-'
}

fn is_key_char(c: char) -> bool {
    is_word_char(c) || matches!(c, '-' | ':')
}

/// What one token of the selector produced.
enum Token {
    Step(SelectorStep),
    /// `*` with no attribute test; an error once the token is known to be kept.
    BareWildcard,
    /// A dropped `tbody`, or nothing readable.
    Nothing,
}

/// The `[...]` part of a token.
struct AttributeTest {
    key: String,
    negated: bool,
    operator: Operator,
    value: Option<String>,
}

struct Parser<'a> {
    selector: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(selector: &'a str) -> Self {
        Self {
            selector,
            chars: selector.trim().chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&accept) {
            self.advance();
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn malformed(&self, reason: &str) -> ParseError {
        ParseError::Malformed {
            selector: self.selector.to_string(),
            offset: self.pos,
            reason: reason.to_string(),
        }
    }

    /// Drop the token that began at `start`: it runs into a character that
    /// can neither continue it nor separate it from the next one. Reading
    /// resumes at that character, or just past it when the token was empty.
    fn drop_token(&mut self, start: usize) {
        if self.pos == start {
            self.advance();
        }
        let dropped: String = self.chars[start..self.pos].iter().collect();
        warn_once(
            "selector",
            &format!("ignoring {dropped:?} in selector {:?}", self.selector),
        );
    }

    /// Read one token.
    fn parse_step(&mut self) -> Result<Token, ParseError> {
        let raw_tag = self.take_while(is_tag_char);

        let shorthand = match self.peek() {
            Some('#') if self.peek_at(1).is_some_and(is_name_char) => {
                self.advance();
                Some(("id", self.take_while(is_name_char)))
            }
            Some('.') if self.peek_at(1).is_some_and(is_name_char) => {
                self.advance();
                Some(("class", self.take_while(is_name_char)))
            }
            _ => None,
        };

        let attribute = if self.peek() == Some('[') {
            Some(self.parse_attribute()?)
        } else {
            None
        };

        if raw_tag == "tbody" {
            return Ok(Token::Nothing);
        }

        let tag = match raw_tag.to_lowercase().as_str() {
            "" => TagFilter::Any,
            "*" => TagFilter::Wildcard,
            name => TagFilter::Name(name.to_string()),
        };

        let step = match (shorthand, attribute) {
            (None, None) => match tag {
                TagFilter::Any => return Ok(Token::Nothing),
                TagFilter::Wildcard => return Ok(Token::BareWildcard),
                TagFilter::Name(name) => SelectorStep::for_tag(&name),
            },
            (Some((key, value)), None) => {
                SelectorStep::with_attribute(tag, key, false, Some(value), Operator::Equals)?
            }
            (shorthand, Some(test)) => {
                if let Some((key, value)) = shorthand {
                    let shorthand_text = if key == "id" {
                        format!("#{value}")
                    } else {
                        format!(".{value}")
                    };
                    warn_once(
                        "selector",
                        &format!(
                            "{shorthand_text} is replaced by the [{}] test in selector {:?}",
                            test.key, self.selector
                        ),
                    );
                }
                SelectorStep::with_attribute(
                    tag,
                    &test.key,
                    test.negated,
                    test.value,
                    test.operator,
                )?
            }
        };
        Ok(Token::Step(step))
    }

    /// Read `[ [@] [!] key [ op value ] ]`, starting at the `[`.
    fn parse_attribute(&mut self) -> Result<AttributeTest, ParseError> {
        self.advance();
        if self.peek() == Some('@') {
            self.advance();
        }
        let negated = self.peek() == Some('!');
        if negated {
            self.advance();
        }

        let key = self.take_while(is_key_char).to_lowercase();
        if key.is_empty() {
            return Err(self.malformed("expected an attribute name after '['"));
        }

        let operator = match (self.peek(), self.peek_at(1)) {
            (Some(']'), _) => {
                self.advance();
                return Ok(AttributeTest {
                    key,
                    negated,
                    operator: Operator::Equals,
                    value: None,
                });
            }
            (Some('='), _) => {
                self.advance();
                Operator::Equals
            }
            (Some(first @ ('!' | '^' | '$' | '*')), Some('=')) => {
                let spelled: String = [first, '='].iter().collect();
                self.pos += 2;
                Operator::from_str(&spelled).map_err(|_| self.malformed("unknown operator"))?
            }
            _ => return Err(self.malformed("expected ']' or one of = != ^= $= *=")),
        };

        // The value runs to the first ']' that ends the token.
        let close = (self.pos..self.chars.len())
            .find(|&i| {
                self.chars[i] == ']'
                    && self
                        .chars
                        .get(i + 1)
                        .is_none_or(|&next| is_separator(next))
            })
            .ok_or_else(|| self.malformed("unclosed '['"))?;

        let mut raw = &self.chars[self.pos..close];
        if let [first, rest @ ..] = raw
            && matches!(*first, '"' | '\'')
        {
            raw = rest;
        }
        if let [rest @ .., last] = raw
            && matches!(*last, '"' | '\'')
        {
            raw = rest;
        }
        let value: String = raw.iter().collect();
        self.pos = close + 1;

        Ok(AttributeTest {
            key,
            negated,
            operator,
            value: (!value.is_empty()).then_some(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators() {
        assert!(is_separator(' '));
        assert!(is_separator('\t'));
        assert!(is_separator('/'));
        assert!(is_separator(','));
        assert!(!is_separator('>'));
    }

    #[test]
    fn test_character_classes() {
        assert!(is_tag_char('*'));
        assert!(is_tag_char(':'));
        assert!(!is_name_char(':'));
        assert!(is_key_char(':'));
        assert!(!is_key_char('*'));
        assert!(is_name_char('测'));
    }
}
