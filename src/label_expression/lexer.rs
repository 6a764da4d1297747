//! Tokenizer for label expressions.

use super::LabelExpressionErrorReason;
use std::fmt;

/// Maximum accepted expression length in characters.
pub(super) const MAX_EXPRESSION_LENGTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Token {
    And,
    Or,
    Not,
    Equals,
    NotEquals,
    OpenParen,
    CloseParen,
    Identifier(String),
}

impl fmt::Display for Token {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => formatter.write_str("&"),
            Self::Or => formatter.write_str("|"),
            Self::Not => formatter.write_str("!"),
            Self::Equals => formatter.write_str("="),
            Self::NotEquals => formatter.write_str("!="),
            Self::OpenParen => formatter.write_str("("),
            Self::CloseParen => formatter.write_str(")"),
            Self::Identifier(value) => formatter.write_str(value),
        }
    }
}

const fn is_identifier_start(character: char) -> bool {
    character.is_ascii_alphanumeric() || matches!(character, '_' | '-' | '.')
}

const fn is_identifier_part(character: char) -> bool {
    is_identifier_start(character) || character == '/'
}

/// Splits an expression into tokens.
///
/// Length and character-set checks happen here so the parser only ever sees
/// well-formed tokens.
pub(super) fn tokenize(expression: &str) -> Result<Vec<Token>, LabelExpressionErrorReason> {
    if expression.chars().count() > MAX_EXPRESSION_LENGTH {
        return Err(LabelExpressionErrorReason::TooLong {
            max: MAX_EXPRESSION_LENGTH,
        });
    }

    let mut tokens = Vec::new();
    let mut characters = expression.chars().peekable();

    while let Some(character) = characters.next() {
        let token = match character {
            c if c.is_whitespace() => continue,
            '&' => Token::And,
            '|' => Token::Or,
            '!' => {
                if characters.next_if_eq(&'=').is_some() {
                    Token::NotEquals
                } else {
                    Token::Not
                }
            }
            '=' => Token::Equals,
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            c if is_identifier_start(c) => {
                let mut identifier = String::from(c);
                while let Some(next) = characters.next_if(|next| is_identifier_part(*next)) {
                    identifier.push(next);
                }
                Token::Identifier(identifier)
            }
            other => return Err(LabelExpressionErrorReason::InvalidCharacter(other)),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ident(value: &str) -> Token {
        Token::Identifier(value.to_owned())
    }

    #[test]
    fn tokenizes_comparison_with_path_like_value() {
        let tokens = tokenize("app.kubernetes.io/name=router-v1").expect("valid expression");

        assert_eq!(
            tokens,
            vec![ident("app.kubernetes.io/name"), Token::Equals, ident("router-v1")]
        );
    }

    #[test]
    fn distinguishes_not_from_not_equals() {
        let tokens = tokenize("!a!=b").expect("valid expression");

        assert_eq!(
            tokens,
            vec![Token::Not, ident("a"), Token::NotEquals, ident("b")]
        );
    }

    #[rstest]
    #[case("env=prod;", ';')]
    #[case("env=\"prod\"", '"')]
    #[case("/env=prod", '/')]
    fn rejects_characters_outside_whitelist(#[case] input: &str, #[case] offending: char) {
        let result = tokenize(input);

        assert_eq!(
            result,
            Err(LabelExpressionErrorReason::InvalidCharacter(offending))
        );
    }

    #[test]
    fn rejects_overlong_expressions() {
        let input = "a".repeat(MAX_EXPRESSION_LENGTH + 1);

        assert_eq!(
            tokenize(&input),
            Err(LabelExpressionErrorReason::TooLong {
                max: MAX_EXPRESSION_LENGTH
            })
        );
    }
}
