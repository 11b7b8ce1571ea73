use crate::diagnostics::{Position, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Struct,
    Let,
    New,
    Fn,
    Return,
    If,
    Else,
    While,
    Print,
    Null,
    Optional,
    Mandatory,
    BoolLit(bool),
    NumberLit(f64),
    StringLit(String),
    Ident(String),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Assign,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    AndAnd,
    OrOr,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub code: &'static str,
    pub message: String,
    pub span: Span,
}

pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).lex()
}

struct Lexer {
    chars: Vec<char>,
    index: usize,
    line: u32,
    col: u32,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            index: 0,
            line: 1,
            col: 1,
        }
    }

    fn lex(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(ch) = self.peek() {
            if is_whitespace(ch) {
                self.advance();
                continue;
            }

            let start = self.position();
            let token = match ch {
                '(' => {
                    self.advance();
                    TokenKind::LParen
                }
                ')' => {
                    self.advance();
                    TokenKind::RParen
                }
                '{' => {
                    self.advance();
                    TokenKind::LBrace
                }
                '}' => {
                    self.advance();
                    TokenKind::RBrace
                }
                '[' => {
                    self.advance();
                    TokenKind::LBracket
                }
                ']' => {
                    self.advance();
                    TokenKind::RBracket
                }
                ',' => {
                    self.advance();
                    TokenKind::Comma
                }
                ':' => {
                    self.advance();
                    TokenKind::Colon
                }
                ';' => {
                    self.advance();
                    TokenKind::Semicolon
                }
                '.' => {
                    self.advance();
                    TokenKind::Dot
                }
                '+' => {
                    self.advance();
                    TokenKind::Plus
                }
                '-' => {
                    self.advance();
                    TokenKind::Minus
                }
                '*' => {
                    self.advance();
                    TokenKind::Star
                }
                '=' => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::EqEq
                    } else {
                        TokenKind::Assign
                    }
                }
                '!' => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::NotEq
                    } else {
                        TokenKind::Bang
                    }
                }
                '<' => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::LtEq
                    } else {
                        TokenKind::Lt
                    }
                }
                '>' => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::GtEq
                    } else {
                        TokenKind::Gt
                    }
                }
                '&' => {
                    self.advance();
                    if self.peek() == Some('&') {
                        self.advance();
                        TokenKind::AndAnd
                    } else {
                        return Err(self.error("E0100", "Unexpected character '&'.", start));
                    }
                }
                '|' => {
                    self.advance();
                    if self.peek() == Some('|') {
                        self.advance();
                        TokenKind::OrOr
                    } else {
                        return Err(self.error("E0100", "Unexpected character '|'.", start));
                    }
                }
                '/' => {
                    self.advance();
                    if self.peek() == Some('/') {
                        self.skip_line_comment();
                        continue;
                    }
                    TokenKind::Slash
                }
                '"' => {
                    let (value, span) = self.lex_string(start)?;
                    tokens.push(Token {
                        kind: TokenKind::StringLit(value),
                        span,
                    });
                    continue;
                }
                ch if is_letter(ch) => self.lex_identifier(),
                ch if is_digit(ch) => {
                    let (value, span) = self.lex_number(start)?;
                    tokens.push(Token {
                        kind: TokenKind::NumberLit(value),
                        span,
                    });
                    continue;
                }
                _ => {
                    self.advance();
                    let message = format!("Unexpected character '{ch}'.");
                    return Err(self.error("E0100", &message, start));
                }
            };

            let span = Span::new(start, self.position());
            tokens.push(Token { kind: token, span });
        }

        let eof_span = Span::new(self.position(), self.position());
        tokens.push(Token {
            kind: TokenKind::Eof,
            span: eof_span,
        });
        Ok(tokens)
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn lex_identifier(&mut self) -> TokenKind {
        let mut buf = String::new();
        while let Some(ch) = self.peek() {
            if is_ident_continue(ch) {
                buf.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match buf.as_str() {
            "struct" => TokenKind::Struct,
            "let" => TokenKind::Let,
            "new" => TokenKind::New,
            "fn" => TokenKind::Fn,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "print" => TokenKind::Print,
            "null" => TokenKind::Null,
            "optional" => TokenKind::Optional,
            "mandatory" => TokenKind::Mandatory,
            "true" => TokenKind::BoolLit(true),
            "false" => TokenKind::BoolLit(false),
            _ => TokenKind::Ident(buf),
        }
    }

    fn lex_number(&mut self, start: Position) -> Result<(f64, Span), LexError> {
        let mut buf = String::new();
        while let Some(ch) = self.peek() {
            if is_digit(ch) {
                buf.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // A '.' continues the literal only when a digit follows, so that
        // `1.field` stays a member access on the literal 1.
        if self.peek() == Some('.') && self.peek_ahead(1).is_some_and(is_digit) {
            buf.push('.');
            self.advance();
            while let Some(ch) = self.peek() {
                if is_digit(ch) {
                    buf.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        let end = self.position();
        let span = Span::new(start, end);
        match buf.parse::<f64>() {
            Ok(value) => Ok((value, span)),
            Err(_) => Err(LexError {
                code: "E0101",
                message: "Malformed number literal.".to_string(),
                span,
            }),
        }
    }

    fn lex_string(&mut self, start: Position) -> Result<(String, Span), LexError> {
        let mut buf = String::new();
        self.advance();
        while let Some(ch) = self.peek() {
            match ch {
                '"' => {
                    self.advance();
                    let span = Span::new(start, self.position());
                    return Ok((buf, span));
                }
                '\\' => {
                    self.advance();
                    let escaped = match self.peek() {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('n') => '\n',
                        Some(other) => {
                            self.advance();
                            let message = format!("Invalid escape '\\{other}'.");
                            return Err(self.error("E0104", &message, start));
                        }
                        None => {
                            return Err(self.error("E0103", "Unterminated string literal.", start));
                        }
                    };
                    self.advance();
                    buf.push(escaped);
                }
                '\n' => {
                    return Err(self.error("E0103", "Unterminated string literal.", start));
                }
                _ => {
                    buf.push(ch);
                    self.advance();
                }
            }
        }

        Err(self.error("E0103", "Unterminated string literal.", start))
    }

    fn error(&self, code: &'static str, message: &str, start: Position) -> LexError {
        LexError {
            code,
            message: message.to_string(),
            span: Span::new(start, self.position()),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.index += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.col)
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn is_ident_continue(ch: char) -> bool {
    is_letter(ch) || is_digit(ch) || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_struct_declaration() {
        let source = "struct N { mandatory id, optional next, }";
        let tokens = lex(source).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Struct);
        assert_eq!(tokens[1].kind, TokenKind::Ident("N".to_string()));
        assert_eq!(tokens[2].kind, TokenKind::LBrace);
        assert_eq!(tokens[3].kind, TokenKind::Mandatory);
        assert_eq!(tokens[4].kind, TokenKind::Ident("id".to_string()));
        assert_eq!(tokens[5].kind, TokenKind::Comma);
        assert_eq!(tokens[6].kind, TokenKind::Optional);
    }

    #[test]
    fn lex_number_with_fraction() {
        let tokens = lex("let x = 3.25").unwrap();
        assert!(tokens
            .iter()
            .any(|token| matches!(token.kind, TokenKind::NumberLit(value) if value == 3.25)));
    }

    #[test]
    fn lex_number_then_dot_is_member_access() {
        let tokens = lex("xs.length").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(tokens[2].kind, TokenKind::Ident("length".to_string()));
    }

    #[test]
    fn lex_line_comment_is_skipped() {
        let tokens = lex("let x = 1 // trailing note\nlet y = 2").unwrap();
        assert!(!tokens
            .iter()
            .any(|token| matches!(token.kind, TokenKind::Ident(ref name) if name == "trailing")));
    }

    #[test]
    fn lex_string_literal_with_escape() {
        let tokens = lex("print \"hi\\n\"").unwrap();
        assert!(tokens.iter().any(|token| {
            matches!(token.kind, TokenKind::StringLit(ref value) if value == "hi\n")
        }));
    }

    #[test]
    fn lex_rejects_unknown_character() {
        let err = lex("@").unwrap_err();
        assert_eq!(err.code, "E0100");
    }

    #[test]
    fn lex_rejects_unterminated_string() {
        let err = lex("print \"abc").unwrap_err();
        assert_eq!(err.code, "E0103");
    }

    #[test]
    fn lex_tracks_line_and_column() {
        let tokens = lex("let a = 1\nlet b = 2").unwrap();
        let second_let = &tokens[4];
        assert_eq!(second_let.kind, TokenKind::Let);
        assert_eq!(second_let.span.start, Position::new(2, 1));
    }
}
