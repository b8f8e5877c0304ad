// Runs the end-to-end scenarios S1-S6 from the design's Testable Properties section against
// the public generator and lexer API.

use autolex::{Error, GeneratorBuilder, Lexer, Pattern, Source, Token};

fn word() -> Pattern {
    Pattern::Plus(Box::new(Pattern::CharClass(vec![(b'a', b'z')])))
}

fn ws() -> Pattern {
    Pattern::Plus(Box::new(Pattern::Char(b' ')))
}

fn tokens(output: &autolex::GeneratorOutput, name: &str, text: &[u8]) -> Vec<Token> {
    let source = Source::new(name, text.to_vec());
    Lexer::new(&source, output).map(|t| t.unwrap()).collect()
}

fn tok(kind: &str, pos: usize, end: usize) -> Token {
    Token {
        kind: kind.to_string(),
        span: autolex::Span::new(pos, end),
    }
}

#[test]
fn s1_word_and_whitespace() {
    let _ = env_logger::builder().is_test(true).try_init();

    let output = GeneratorBuilder::new()
        .mode("main", vec![("word".to_string(), word()), ("ws".to_string(), ws())])
        .build()
        .unwrap();

    let got = tokens(&output, "s1", b"hi you");
    assert_eq!(got, vec![tok("word", 0, 2), tok("ws", 2, 3), tok("word", 3, 6)]);
}

#[test]
fn s2_invalid_byte_with_no_whitespace_rule() {
    let _ = env_logger::builder().is_test(true).try_init();

    let num = Pattern::Plus(Box::new(Pattern::CharClass(vec![(b'0', b'9')])));
    let id = Pattern::Seq(vec![
        Pattern::CharClass(vec![(b'a', b'z')]),
        Pattern::Star(Box::new(Pattern::CharClass(vec![(b'a', b'z'), (b'0', b'9')]))),
    ]);

    let output = GeneratorBuilder::new()
        .mode("main", vec![("num".to_string(), num), ("id".to_string(), id)])
        .build()
        .unwrap();

    let got = tokens(&output, "s2", b"a1 2b");
    assert_eq!(
        got,
        vec![
            tok("id", 0, 2),
            tok("invalid", 2, 3),
            tok("num", 3, 4),
            tok("id", 4, 5),
        ]
    );
}

#[test]
fn s3_mode_push_and_pop() {
    let _ = env_logger::builder().is_test(true).try_init();

    let output = GeneratorBuilder::new()
        .mode("main", vec![("open".to_string(), Pattern::literal(b"("))])
        .mode(
            "paren",
            vec![("close".to_string(), Pattern::literal(b")")), ("word".to_string(), word())],
        )
        .mode_transition("main", "open", "paren", "close")
        .build()
        .unwrap();

    let got = tokens(&output, "s3", b"(ab)c");
    assert_eq!(
        got,
        vec![
            tok("open", 0, 1),
            tok("word", 1, 3),
            tok("close", 3, 4),
            tok("invalid", 4, 5),
        ]
    );
}

#[test]
fn s4_literal_bias_then_longest_match() {
    let _ = env_logger::builder().is_test(true).try_init();

    let output = GeneratorBuilder::new()
        .mode(
            "main",
            vec![
                ("kw".to_string(), Pattern::literal(b"if")),
                ("id".to_string(), word()),
                ("ws".to_string(), ws()),
            ],
        )
        .build()
        .unwrap();

    let got = tokens(&output, "s4", b"if ifx");
    assert_eq!(got, vec![tok("kw", 0, 2), tok("ws", 2, 3), tok("id", 3, 6)]);
}

#[test]
fn s5_literal_ambiguity_is_a_fatal_error() {
    let result = GeneratorBuilder::new()
        .mode(
            "main",
            vec![("a".to_string(), Pattern::literal(b"ab")), ("b".to_string(), Pattern::literal(b"ab"))],
        )
        .build();
    assert!(matches!(result, Err(Error::LiteralCollision(_, _))));
}

#[test]
fn s6_trivial_match_is_rejected() {
    let result = GeneratorBuilder::new()
        .mode(
            "main",
            vec![("r".to_string(), Pattern::Star(Box::new(Pattern::literal(b"a"))))],
        )
        .build();
    assert!(matches!(result, Err(Error::TrivialMatch(_))));
}

#[test]
fn incomplete_token_when_input_ends_mid_pattern() {
    // `close` requires two bytes (`))`); feeding only one leaves the run on a non-match node
    // when the text is exhausted, which must surface as `incomplete`, not `invalid`.
    let _ = env_logger::builder().is_test(true).try_init();

    let output = GeneratorBuilder::new()
        .mode("main", vec![("close".to_string(), Pattern::literal(b"))"))])
        .build()
        .unwrap();

    let got = tokens(&output, "incomplete", b")");
    assert_eq!(got, vec![tok("incomplete", 0, 1)]);
}
