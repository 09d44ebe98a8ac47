use logos::Logos;
use std::fmt;

/// Span represents a range in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Token with its span information
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Apex tokens.
///
/// Only reserved words get their own kind. Words that are keywords in one
/// context and names in another (`get`, `set`, `on`, `before`, DML verbs and
/// every SOQL/SOSL keyword) lex as identifiers and are matched by the parser.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
pub enum TokenKind {
    // Modifiers
    #[token("public", ignore(ascii_case))]
    Public,
    #[token("private", ignore(ascii_case))]
    Private,
    #[token("protected", ignore(ascii_case))]
    Protected,
    #[token("global", ignore(ascii_case))]
    Global,
    #[token("abstract", ignore(ascii_case))]
    Abstract,
    #[token("virtual", ignore(ascii_case))]
    Virtual,
    #[token("override", ignore(ascii_case))]
    Override,
    #[token("static", ignore(ascii_case))]
    Static,
    #[token("final", ignore(ascii_case))]
    Final,
    #[token("transient", ignore(ascii_case))]
    Transient,
    #[token("testmethod", ignore(ascii_case))]
    TestMethod,
    #[token("webservice", ignore(ascii_case))]
    WebService,
    #[token("with sharing", ignore(ascii_case))]
    WithSharing,
    #[token("without sharing", ignore(ascii_case))]
    WithoutSharing,
    #[token("inherited sharing", ignore(ascii_case))]
    InheritedSharing,

    // Type declarations
    #[token("class", ignore(ascii_case))]
    Class,
    #[token("interface", ignore(ascii_case))]
    Interface,
    #[token("enum", ignore(ascii_case))]
    Enum,
    #[token("trigger", ignore(ascii_case))]
    Trigger,
    #[token("extends", ignore(ascii_case))]
    Extends,
    #[token("implements", ignore(ascii_case))]
    Implements,
    #[token("void", ignore(ascii_case))]
    Void,

    // Control flow
    #[token("if", ignore(ascii_case))]
    If,
    #[token("else", ignore(ascii_case))]
    Else,
    #[token("for", ignore(ascii_case))]
    For,
    #[token("while", ignore(ascii_case))]
    While,
    #[token("do", ignore(ascii_case))]
    Do,
    #[token("switch", ignore(ascii_case))]
    Switch,
    #[token("when", ignore(ascii_case))]
    When,
    #[token("break", ignore(ascii_case))]
    Break,
    #[token("continue", ignore(ascii_case))]
    Continue,
    #[token("return", ignore(ascii_case))]
    Return,
    #[token("throw", ignore(ascii_case))]
    Throw,
    #[token("try", ignore(ascii_case))]
    Try,
    #[token("catch", ignore(ascii_case))]
    Catch,
    #[token("finally", ignore(ascii_case))]
    Finally,

    // Expressions
    #[token("new", ignore(ascii_case))]
    New,
    #[token("instanceof", ignore(ascii_case))]
    Instanceof,
    #[token("null", ignore(ascii_case))]
    Null,
    #[token("true", ignore(ascii_case))]
    True,
    #[token("false", ignore(ascii_case))]
    False,

    // Arithmetic
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // Comparison
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<>")]
    LtGt,
    #[token("===")]
    EqEqEq,
    #[token("!==")]
    NotEqEq,
    #[token("<")]
    Lt,
    // `>>` and `>>>` are never lexed as one token so that nested generics
    // (`List<List<String>>`) close cleanly; the parser joins adjacent `>`.
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,

    // Logical
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,

    // Bitwise
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("<<")]
    LtLt,

    // Assignment
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("<<=")]
    LtLtEq,

    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("?")]
    Question,
    #[token("=>")]
    Arrow,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,

    // Literals
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    IntegerLiteral(i64),

    #[regex(r"[0-9]+[lL]", parse_long)]
    LongLiteral(i64),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    DoubleLiteral(f64),

    #[regex(r"'([^'\\]|\\.)*'", parse_string)]
    StringLiteral(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice()[1..].to_string())]
    Annotation(String),

    /// Text the lexer could not match; the parser reports it
    Invalid(String),

    Eof,
}

fn parse_long(lex: &mut logos::Lexer<TokenKind>) -> Option<i64> {
    let slice = lex.slice();
    slice[..slice.len() - 1].parse::<i64>().ok()
}

fn parse_string(lex: &mut logos::Lexer<TokenKind>) -> Option<String> {
    let slice = lex.slice();
    Some(unescape(&slice[1..slice.len() - 1]))
}

/// Reverse of the escaping the generator applies to string literals
pub fn unescape(inner: &str) -> String {
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('\'') => result.push('\''),
            Some('"') => result.push('"'),
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32);
                match decoded {
                    Some(decoded) => {
                        result.push(decoded);
                        chars.nth(3);
                    }
                    None => result.push_str("\\u"),
                }
            }
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

impl TokenKind {
    /// True for an identifier spelled `word` (ASCII case-insensitive)
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, TokenKind::Identifier(id) if id.eq_ignore_ascii_case(word))
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(s) => write!(f, "identifier `{}`", s),
            TokenKind::Annotation(s) => write!(f, "@{}", s),
            TokenKind::IntegerLiteral(n) => write!(f, "{}", n),
            TokenKind::LongLiteral(n) => write!(f, "{}L", n),
            TokenKind::DoubleLiteral(n) => write!(f, "{}", n),
            TokenKind::StringLiteral(s) => write!(f, "'{}'", s),
            TokenKind::Invalid(s) => write!(f, "invalid input `{}`", s),
            TokenKind::Eof => write!(f, "end of input"),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// Lexer for Apex source code
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            finished: false,
        }
    }

    pub fn next_token(&mut self) -> Token {
        match self.inner.next() {
            Some(Ok(kind)) => {
                let span = self.inner.span();
                Token::new(kind, Span::new(span.start, span.end))
            }
            Some(Err(())) => {
                let span = self.inner.span();
                Token::new(
                    TokenKind::Invalid(self.inner.slice().to_string()),
                    Span::new(span.start, span.end),
                )
            }
            None => {
                let end = self.inner.source().len();
                Token::new(TokenKind::Eof, Span::new(end, end))
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields every token including a single trailing `Eof`
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

/// Tokenize an entire source string into a vector of tokens ending in `Eof`
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            kinds("PUBLIC Class foo"),
            vec![
                TokenKind::Public,
                TokenKind::Class,
                TokenKind::Identifier("foo".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_soql_words_are_identifiers() {
        let tokens = kinds("SELECT Id FROM Account");
        assert!(tokens[0].is_word("select"));
        assert!(tokens[2].is_word("from"));
    }

    #[test]
    fn test_closing_generics_are_separate() {
        let tokens = kinds("List<List<String>>");
        assert_eq!(tokens[5], TokenKind::Gt);
        assert_eq!(tokens[6], TokenKind::Gt);
    }

    #[test]
    fn test_long_suffix_is_its_own_literal() {
        assert_eq!(kinds("100L")[0], TokenKind::LongLiteral(100));
        assert_eq!(kinds("7l")[0], TokenKind::LongLiteral(7));
    }

    #[test]
    fn test_exponent_without_fraction_is_a_double() {
        assert_eq!(kinds("1e10")[0], TokenKind::DoubleLiteral(1e10));
        assert_eq!(kinds("2E-3")[0], TokenKind::DoubleLiteral(2e-3));
    }

    #[test]
    fn test_unescape_control_and_unicode() {
        assert_eq!(unescape(r"a\fb"), "a\u{c}b");
        assert_eq!(unescape(r"\b"), "\u{8}");
        assert_eq!(unescape(r"\u00e9t\u00E9"), "été");
        assert_eq!(unescape(r"\u12"), "\\u12");
    }

    #[test]
    fn test_invalid_input_is_reported() {
        assert_eq!(kinds("#")[0], TokenKind::Invalid("#".into()));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"it\'s\n"), "it's\n");
    }
}
