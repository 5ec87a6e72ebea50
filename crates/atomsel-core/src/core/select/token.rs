//! Lexer for the selection language.

use super::ast::CmpOp;
use super::error::SelectionError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An unquoted word: keyword, field name, operator word or value.
    Word(String),
    /// A quoted value. Never interpreted as a keyword.
    Quoted(String),
    Op(CmpOp),
    Colon,
    LParen,
    RParen,
    Eof,
}

/// A token with its byte span `[start, end)` in the input string.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// Source text of the token, used in error reports.
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.start..self.end).unwrap_or("")
    }

    pub fn is_word(&self, word: &str) -> bool {
        matches!(&self.kind, TokenKind::Word(w) if w == word)
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '=' | '!' | '<' | '>' | ':')
}

/// Splits selection text into tokens. The final token is always [`TokenKind::Eof`].
pub fn tokenize(input: &str) -> Result<Vec<Token>, SelectionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let kind = match c {
            '(' => {
                chars.next();
                TokenKind::LParen
            }
            ')' => {
                chars.next();
                TokenKind::RParen
            }
            ':' => {
                chars.next();
                TokenKind::Colon
            }
            '=' | '!' | '<' | '>' => {
                chars.next();
                let followed_by_eq = chars.next_if(|&(_, next)| next == '=').is_some();
                match (c, followed_by_eq) {
                    ('=', _) => TokenKind::Op(CmpOp::Eq),
                    ('!', true) => TokenKind::Op(CmpOp::Ne),
                    ('<', false) => TokenKind::Op(CmpOp::Lt),
                    ('<', true) => TokenKind::Op(CmpOp::Le),
                    ('>', false) => TokenKind::Op(CmpOp::Gt),
                    ('>', true) => TokenKind::Op(CmpOp::Ge),
                    _ => {
                        return Err(SelectionError::syntax(
                            "expected '!=' operator",
                            start,
                            "!",
                        ));
                    }
                }
            }
            '"' | '\'' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if next == c {
                        closed = true;
                        break;
                    }
                    value.push(next);
                }
                if !closed {
                    return Err(SelectionError::syntax(
                        "unterminated quoted value",
                        start,
                        &input[start..],
                    ));
                }
                TokenKind::Quoted(value)
            }
            _ => {
                let mut word = String::new();
                while let Some((_, next)) = chars.next_if(|&(_, next)| !is_delimiter(next)) {
                    word.push(next);
                }
                TokenKind::Word(word)
            }
        };

        let end = chars.peek().map_or(input.len(), |&(i, _)| i);
        tokens.push(Token { kind, start, end });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        start: input.len(),
        end: input.len(),
    });
    Ok(tokens)
}
