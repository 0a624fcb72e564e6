//! Source text -> token stream, with 1-based line/column tracking.
//!
//! Hand-written character-cursor lexer: no parser-combinator dependency.
//! Pure function of the input buffer; does not touch the filesystem.

use std::fmt;

use crate::error::LexError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // literals
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),

    // keywords
    Let,
    Func,
    Return,
    If,
    Else,
    End,
    While,
    For,
    In,
    Switch,
    Case,
    Default,
    Try,
    Catch,
    Break,
    Continue,
    Print,
    Use,
    As,
    True,
    False,
    And,
    Or,
    Not,
    TypeInt,
    TypeFloat,
    TypeString,
    TypeBool,

    // operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    Assign,

    // punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Colon,
    Semicolon,
    Question,

    Eof,
    Error(String),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    fn new(kind: TokenKind, lexeme: String, line: usize, column: usize) -> Self {
        Self {
            kind,
            lexeme,
            line,
            column,
        }
    }
}

fn keyword(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "let" => TokenKind::Let,
        "func" => TokenKind::Func,
        "return" => TokenKind::Return,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "end" => TokenKind::End,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "try" => TokenKind::Try,
        "catch" => TokenKind::Catch,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "print" => TokenKind::Print,
        "use" => TokenKind::Use,
        "as" => TokenKind::As,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "int" => TokenKind::TypeInt,
        "float" => TokenKind::TypeFloat,
        "string" => TokenKind::TypeString,
        "bool" => TokenKind::TypeBool,
        _ => return None,
    })
}

/// Character-cursor lexer. Tracks byte position, current line, and column.
pub struct Lexer<'source> {
    source: &'source str,
    chars: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('#') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_number(&mut self, start_line: usize, start_col: usize) -> Token {
        let mut lexeme = String::new();
        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.advance();
            } else if c == '.' && !is_float && matches!(self.peek_next(), Some(d) if d.is_ascii_digit()) {
                is_float = true;
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if is_float {
            match lexeme.parse::<f64>() {
                Ok(v) => Token::new(TokenKind::Float(v), lexeme, start_line, start_col),
                Err(_) => Token::new(
                    TokenKind::Error(format!("malformed float literal '{lexeme}'")),
                    lexeme,
                    start_line,
                    start_col,
                ),
            }
        } else {
            match lexeme.parse::<i64>() {
                Ok(v) => Token::new(TokenKind::Int(v), lexeme, start_line, start_col),
                Err(_) => Token::new(
                    TokenKind::Error(format!("malformed integer literal '{lexeme}'")),
                    lexeme,
                    start_line,
                    start_col,
                ),
            }
        }
    }

    fn lex_ident(&mut self, start_line: usize, start_col: usize) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = keyword(&lexeme).unwrap_or_else(|| TokenKind::Ident(lexeme.clone()));
        Token::new(kind, lexeme, start_line, start_col)
    }

    fn lex_string(&mut self, start_line: usize, start_col: usize) -> Token {
        let mut lexeme = String::from("\"");
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    return Token::new(
                        TokenKind::Error("unterminated string literal".to_string()),
                        lexeme,
                        start_line,
                        start_col,
                    );
                }
                Some('"') => {
                    lexeme.push('"');
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.peek() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some(other) => other,
                        None => {
                            return Token::new(
                                TokenKind::Error("unterminated string literal".to_string()),
                                lexeme,
                                start_line,
                                start_col,
                            );
                        }
                    };
                    lexeme.push('\\');
                    lexeme.push(escaped);
                    value.push(escaped);
                    self.advance();
                }
                Some(c) => {
                    lexeme.push(c);
                    value.push(c);
                    self.advance();
                }
            }
        }
        Token::new(TokenKind::Str(value), lexeme, start_line, start_col)
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let (line, col) = (self.line, self.column);
        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, String::new(), line, col);
        };

        if c.is_ascii_digit() {
            return self.lex_number(line, col);
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return self.lex_ident(line, col);
        }
        if c == '"' {
            return self.lex_string(line, col);
        }

        self.advance();
        macro_rules! two_char {
            ($second:expr, $two:expr, $one:expr) => {{
                if self.peek() == Some($second) {
                    self.advance();
                    Token::new($two, format!("{c}{}", $second), line, col)
                } else {
                    Token::new($one, c.to_string(), line, col)
                }
            }};
        }

        match c {
            '+' => Token::new(TokenKind::Plus, c.to_string(), line, col),
            '-' => Token::new(TokenKind::Minus, c.to_string(), line, col),
            '*' => Token::new(TokenKind::Star, c.to_string(), line, col),
            '/' => Token::new(TokenKind::Slash, c.to_string(), line, col),
            '%' => Token::new(TokenKind::Percent, c.to_string(), line, col),
            '=' => two_char!('=', TokenKind::EqEq, TokenKind::Assign),
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::NotEq, "!=".to_string(), line, col)
                } else {
                    Token::new(
                        TokenKind::Error(format!("unexpected character '{c}'")),
                        c.to_string(),
                        line,
                        col,
                    )
                }
            }
            '<' => two_char!('=', TokenKind::Le, TokenKind::Lt),
            '>' => two_char!('=', TokenKind::Ge, TokenKind::Gt),
            '(' => Token::new(TokenKind::LParen, c.to_string(), line, col),
            ')' => Token::new(TokenKind::RParen, c.to_string(), line, col),
            '{' => Token::new(TokenKind::LBrace, c.to_string(), line, col),
            '}' => Token::new(TokenKind::RBrace, c.to_string(), line, col),
            '[' => Token::new(TokenKind::LBracket, c.to_string(), line, col),
            ']' => Token::new(TokenKind::RBracket, c.to_string(), line, col),
            ',' => Token::new(TokenKind::Comma, c.to_string(), line, col),
            '.' => Token::new(TokenKind::Dot, c.to_string(), line, col),
            ':' => Token::new(TokenKind::Colon, c.to_string(), line, col),
            ';' => Token::new(TokenKind::Semicolon, c.to_string(), line, col),
            '?' => Token::new(TokenKind::Question, c.to_string(), line, col),
            other => Token::new(
                TokenKind::Error(format!("unexpected character '{other}'")),
                other.to_string(),
                line,
                col,
            ),
        }
    }

    /// Tokenize the whole buffer, always ending with a single `Eof` token.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// The full source text this lexer was built over, for error reporting.
    pub fn source(&self) -> &'source str {
        self.source
    }
}

/// Scan an already-tokenized stream for the first `Error` token and surface
/// it as a structured [`LexError`]; the caller decides whether to abort
/// before handing the stream to the parser (an unrecognized character has no
/// sensible parse-time recovery).
pub fn first_error(tokens: &[Token]) -> Option<LexError> {
    tokens.iter().find_map(|t| match &t.kind {
        TokenKind::Error(message) => Some(LexError::Invalid {
            message: message.clone(),
            line: t.line,
        }),
        _ => None,
    })
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let tok = self.next_token();
        if tok.kind == TokenKind::Eof {
            None
        } else {
            Some(tok)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_integer_and_float() {
        assert_eq!(kinds("42"), vec![TokenKind::Int(42), TokenKind::Eof]);
        assert_eq!(kinds("3.5"), vec![TokenKind::Float(3.5), TokenKind::Eof]);
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        assert_eq!(
            kinds("let x"),
            vec![
                TokenKind::Let,
                TokenKind::Ident("x".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lexes_question_mark() {
        assert_eq!(kinds("?"), vec![TokenKind::Question, TokenKind::Eof]);
    }

    #[test]
    fn lexes_break_and_continue() {
        assert_eq!(
            kinds("break continue"),
            vec![TokenKind::Break, TokenKind::Continue, TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_string_with_escapes() {
        let toks = kinds(r#""hi\n""#);
        assert_eq!(toks, vec![TokenKind::Str("hi\n".to_string()), TokenKind::Eof]);
    }

    #[test]
    fn lexes_operators() {
        assert_eq!(
            kinds("<= >= == != = < >"),
            vec![
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Assign,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn skips_comments_and_whitespace() {
        assert_eq!(
            kinds("# comment\n  let x # trailing\n"),
            vec![
                TokenKind::Let,
                TokenKind::Ident("x".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn tracks_line_and_column() {
        let toks = Lexer::new("let\nx").tokenize();
        assert_eq!(toks[0].line, 1);
        assert_eq!(toks[1].line, 2);
        assert_eq!(toks[1].column, 1);
    }

    #[test]
    fn unrecognized_character_becomes_error_token() {
        let toks = Lexer::new("@").tokenize();
        assert!(matches!(toks[0].kind, TokenKind::Error(_)));
    }

    #[test]
    fn first_error_surfaces_line_of_unrecognized_character() {
        let toks = Lexer::new("let x = 1;\n@").tokenize();
        let err = first_error(&toks).expect("should find a lex error");
        assert!(matches!(err, LexError::Invalid { line: 2, .. }));
    }

    #[test]
    fn first_error_is_none_for_clean_source() {
        let toks = Lexer::new("let x = 1;").tokenize();
        assert!(first_error(&toks).is_none());
    }
}
