use apexgen::{tokenize, TokenKind};
use pretty_assertions::assert_eq;

/// Token kinds of `source` without the trailing `Eof`
fn kinds(source: &str) -> Vec<TokenKind> {
    let mut kinds: Vec<TokenKind> = tokenize(source).into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds.pop(), Some(TokenKind::Eof), "stream must end with Eof");
    kinds
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

// ==================== Reserved Word Tests ====================

#[test]
fn test_modifier_keywords() {
    assert_eq!(
        kinds("public private protected global abstract virtual override static final transient"),
        vec![
            TokenKind::Public,
            TokenKind::Private,
            TokenKind::Protected,
            TokenKind::Global,
            TokenKind::Abstract,
            TokenKind::Virtual,
            TokenKind::Override,
            TokenKind::Static,
            TokenKind::Final,
            TokenKind::Transient,
        ]
    );
    assert_eq!(
        kinds("testMethod WEBSERVICE"),
        vec![TokenKind::TestMethod, TokenKind::WebService]
    );
}

#[test]
fn test_sharing_phrases_are_one_token() {
    assert_eq!(
        kinds("with sharing Without Sharing INHERITED SHARING"),
        vec![
            TokenKind::WithSharing,
            TokenKind::WithoutSharing,
            TokenKind::InheritedSharing,
        ]
    );
    assert_eq!(kinds("with"), vec![ident("with")]);
    assert_eq!(kinds("sharing"), vec![ident("sharing")]);
}

#[test]
fn test_declaration_and_statement_keywords() {
    let source = "class interface enum trigger extends implements void if else for while do \
                  switch when break continue return throw try catch finally new instanceof";
    let expected = vec![
        TokenKind::Class,
        TokenKind::Interface,
        TokenKind::Enum,
        TokenKind::Trigger,
        TokenKind::Extends,
        TokenKind::Implements,
        TokenKind::Void,
        TokenKind::If,
        TokenKind::Else,
        TokenKind::For,
        TokenKind::While,
        TokenKind::Do,
        TokenKind::Switch,
        TokenKind::When,
        TokenKind::Break,
        TokenKind::Continue,
        TokenKind::Return,
        TokenKind::Throw,
        TokenKind::Try,
        TokenKind::Catch,
        TokenKind::Finally,
        TokenKind::New,
        TokenKind::Instanceof,
    ];
    assert_eq!(kinds(source), expected);
    assert_eq!(kinds(&source.to_uppercase()), expected);
}

#[test]
fn test_literal_keywords_ignore_case() {
    assert_eq!(
        kinds("NULL True fAlSe"),
        vec![TokenKind::Null, TokenKind::True, TokenKind::False]
    );
}

#[test]
fn test_contextual_words_are_identifiers() {
    let words = [
        "insert", "update", "upsert", "delete", "undelete", "merge", "get", "set", "on", "before",
        "after", "this", "super", "SELECT", "FROM", "WHERE", "NOT", "IN", "FIND", "RETURNING",
        "List", "Map", "String",
    ];
    let expected: Vec<_> = words.iter().map(|w| ident(w)).collect();
    assert_eq!(kinds(&words.join(" ")), expected);
}

#[test]
fn test_keyword_prefixes_stay_identifiers() {
    assert_eq!(
        kinds("classes newest iffy returned publicApi"),
        vec![
            ident("classes"),
            ident("newest"),
            ident("iffy"),
            ident("returned"),
            ident("publicApi"),
        ]
    );
}

#[test]
fn test_is_word_ignores_case() {
    let select = &kinds("Select")[0];
    assert!(select.is_word("SELECT"));
    assert!(select.is_word("select"));
    assert!(!select.is_word("from"));
    assert!(!TokenKind::Class.is_word("class"));
}

// ==================== Operator Tests ====================

#[test]
fn test_longest_operator_wins() {
    assert_eq!(
        kinds("=== !== == != <> <= >= <<= << ++ -- += -= => && ||"),
        vec![
            TokenKind::EqEqEq,
            TokenKind::NotEqEq,
            TokenKind::EqEq,
            TokenKind::NotEq,
            TokenKind::LtGt,
            TokenKind::LtEq,
            TokenKind::GtEq,
            TokenKind::LtLtEq,
            TokenKind::LtLt,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
            TokenKind::PlusEq,
            TokenKind::MinusEq,
            TokenKind::Arrow,
            TokenKind::AndAnd,
            TokenKind::OrOr,
        ]
    );
}

#[test]
fn test_single_character_operators() {
    assert_eq!(
        kinds("+-*/%<>!&|^~=?"),
        vec![
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::LtGt,
            TokenKind::Bang,
            TokenKind::Amp,
            TokenKind::Pipe,
            TokenKind::Caret,
            TokenKind::Tilde,
            TokenKind::Eq,
            TokenKind::Question,
        ]
    );
}

#[test]
fn test_compound_assignment_operators() {
    assert_eq!(
        kinds("*= /= %= &= |= ^="),
        vec![
            TokenKind::StarEq,
            TokenKind::SlashEq,
            TokenKind::PercentEq,
            TokenKind::AmpEq,
            TokenKind::PipeEq,
            TokenKind::CaretEq,
        ]
    );
}

#[test]
fn test_greater_than_never_joins() {
    assert_eq!(
        kinds("a >> b >>>= c"),
        vec![
            ident("a"),
            TokenKind::Gt,
            TokenKind::Gt,
            ident("b"),
            TokenKind::Gt,
            TokenKind::Gt,
            TokenKind::GtEq,
            ident("c"),
        ]
    );
    let tokens = tokenize("x >> y");
    assert_eq!(tokens[1].span.end, tokens[2].span.start);
    let spaced = tokenize("x > > y");
    assert!(spaced[1].span.end < spaced[2].span.start);
}

#[test]
fn test_greedy_plus_split() {
    assert_eq!(
        kinds("a+++b"),
        vec![ident("a"), TokenKind::PlusPlus, TokenKind::Plus, ident("b")]
    );
    assert_eq!(
        kinds("- -x"),
        vec![TokenKind::Minus, TokenKind::Minus, ident("x")]
    );
}

#[test]
fn test_delimiters() {
    assert_eq!(
        kinds("(){}[];,.:"),
        vec![
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Semicolon,
            TokenKind::Comma,
            TokenKind::Dot,
            TokenKind::Colon,
        ]
    );
}

// ==================== Literal Tests ====================

#[test]
fn test_numeric_literal_kinds() {
    assert_eq!(
        kinds("7 7L 7l 7.25 7e2 7.5E-1"),
        vec![
            TokenKind::IntegerLiteral(7),
            TokenKind::LongLiteral(7),
            TokenKind::LongLiteral(7),
            TokenKind::DoubleLiteral(7.25),
            TokenKind::DoubleLiteral(700.0),
            TokenKind::DoubleLiteral(0.75),
        ]
    );
}

#[test]
fn test_long_beyond_integer_range() {
    assert_eq!(kinds("3000000000L"), vec![TokenKind::LongLiteral(3_000_000_000)]);
}

#[test]
fn test_dot_needs_digits_on_both_sides() {
    assert_eq!(
        kinds("list.size"),
        vec![ident("list"), TokenKind::Dot, ident("size")]
    );
    assert_eq!(
        kinds("rows[0].Name"),
        vec![
            ident("rows"),
            TokenKind::LBracket,
            TokenKind::IntegerLiteral(0),
            TokenKind::RBracket,
            TokenKind::Dot,
            ident("Name"),
        ]
    );
}

#[test]
fn test_string_literal_values_are_unescaped() {
    assert_eq!(
        kinds(r"'' 'plain' 'line\nbreak' 'it\'s' 'back\\slash' 'form\ffeed' 'café'"),
        vec![
            TokenKind::StringLiteral(String::new()),
            TokenKind::StringLiteral("plain".to_string()),
            TokenKind::StringLiteral("line\nbreak".to_string()),
            TokenKind::StringLiteral("it's".to_string()),
            TokenKind::StringLiteral("back\\slash".to_string()),
            TokenKind::StringLiteral("form\u{c}feed".to_string()),
            TokenKind::StringLiteral("café".to_string()),
        ]
    );
}

#[test]
fn test_keywords_inside_strings_are_text() {
    assert_eq!(
        kinds("'public class'"),
        vec![TokenKind::StringLiteral("public class".to_string())]
    );
}

// ==================== Identifier and Annotation Tests ====================

#[test]
fn test_identifier_shapes() {
    assert_eq!(
        kinds("_x a1 Custom_Field__c __r"),
        vec![ident("_x"), ident("a1"), ident("Custom_Field__c"), ident("__r")]
    );
}

#[test]
fn test_annotations_drop_the_at_sign() {
    assert_eq!(
        kinds("@IsTest(SeeAllData=true) @future"),
        vec![
            TokenKind::Annotation("IsTest".to_string()),
            TokenKind::LParen,
            ident("SeeAllData"),
            TokenKind::Eq,
            TokenKind::True,
            TokenKind::RParen,
            TokenKind::Annotation("future".to_string()),
        ]
    );
}

// ==================== Trivia Tests ====================

#[test]
fn test_comments_and_whitespace_are_skipped() {
    let source = "a // trailing\n\tb /* block\n comment */ c /* a /* b */ d\r\n";
    assert_eq!(kinds(source), vec![ident("a"), ident("b"), ident("c"), ident("d")]);
}

#[test]
fn test_blank_inputs_yield_only_eof() {
    for source in ["", "   \t\r\n", "// only a comment", "/* x */"] {
        assert!(kinds(source).is_empty(), "{source:?}");
    }
}

#[test]
fn test_spans_are_byte_offsets() {
    let tokens = tokenize("class  Foo");
    assert_eq!((tokens[0].span.start, tokens[0].span.end), (0, 5));
    assert_eq!((tokens[1].span.start, tokens[1].span.end), (7, 10));
    assert_eq!(tokens[2].kind, TokenKind::Eof);
}

// ==================== Error Tests ====================

#[test]
fn test_unmatched_input_becomes_invalid_token() {
    assert_eq!(
        kinds("a # b"),
        vec![ident("a"), TokenKind::Invalid("#".to_string()), ident("b")]
    );
}

#[test]
fn test_unterminated_string_is_invalid() {
    let kinds = kinds("x = 'open");
    assert!(
        kinds.iter().any(|k| matches!(k, TokenKind::Invalid(_))),
        "{kinds:?}"
    );
}
