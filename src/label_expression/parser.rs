//! Recursive-descent parser producing [`LabelNode`] trees.

use super::{LabelExpressionErrorReason, LabelNode, lexer::Token};

/// Parses a token sequence into a single expression tree.
///
/// The caller guarantees `tokens` is non-empty.
pub(super) fn parse_tokens(tokens: &[Token]) -> Result<LabelNode, LabelExpressionErrorReason> {
    let mut parser = Parser {
        tokens,
        position: 0,
    };
    let node = parser.parse_or()?;

    match parser.peek() {
        None => Ok(node),
        Some(token) => Err(LabelExpressionErrorReason::TrailingToken(token.to_string())),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance_if(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            return true;
        }
        false
    }

    fn expect_identifier(
        &mut self,
        expected: &'static str,
    ) -> Result<String, LabelExpressionErrorReason> {
        match self.peek() {
            Some(Token::Identifier(value)) => {
                let identifier = value.clone();
                self.position += 1;
                Ok(identifier)
            }
            Some(other) => Err(LabelExpressionErrorReason::UnexpectedToken {
                expected,
                found: other.to_string(),
            }),
            None => Err(LabelExpressionErrorReason::UnexpectedEnd { expected }),
        }
    }

    fn parse_or(&mut self) -> Result<LabelNode, LabelExpressionErrorReason> {
        let mut left = self.parse_and()?;
        while self.advance_if(&Token::Or) {
            let right = self.parse_and()?;
            left = LabelNode::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<LabelNode, LabelExpressionErrorReason> {
        let mut left = self.parse_not()?;
        while self.advance_if(&Token::And) {
            let right = self.parse_not()?;
            left = LabelNode::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<LabelNode, LabelExpressionErrorReason> {
        if self.advance_if(&Token::Not) {
            return Ok(self.parse_not()?.negate());
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<LabelNode, LabelExpressionErrorReason> {
        if self.advance_if(&Token::OpenParen) {
            let inner = self.parse_or()?;
            return match self.peek() {
                Some(Token::CloseParen) => {
                    self.position += 1;
                    Ok(inner)
                }
                Some(other) => Err(LabelExpressionErrorReason::UnexpectedToken {
                    expected: "expected ')' after expression",
                    found: other.to_string(),
                }),
                None => Err(LabelExpressionErrorReason::UnexpectedEnd {
                    expected: "expected ')' after expression",
                }),
            };
        }

        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<LabelNode, LabelExpressionErrorReason> {
        let key = self.expect_identifier("expected label key")?;

        if self.advance_if(&Token::Equals) {
            let value = self.expect_identifier("expected label value after '='")?;
            return Ok(LabelNode::Equals { key, value });
        }

        if self.advance_if(&Token::NotEquals) {
            let value = self.expect_identifier("expected label value after '!='")?;
            return Ok(LabelNode::NotEquals { key, value });
        }

        match self.peek() {
            Some(other) => Err(LabelExpressionErrorReason::UnexpectedToken {
                expected: "expected '=' or '!=' after label key",
                found: other.to_string(),
            }),
            None => Err(LabelExpressionErrorReason::UnexpectedEnd {
                expected: "expected '=' or '!=' after label key",
            }),
        }
    }
}
