#![no_main]

use csstokenizer::*;

const DEBUG: bool = false;

fn tokenize_and_serialize(input: &str, skip_comments: bool) -> String {
    let mut tokenizer = Tokenizer::with_options(input, TokenizerOptions { skip_comments });
    let mut serialization = String::new();
    let mut previous_position = 0;
    let mut count = 0;
    loop {
        let kind = tokenizer.next_token().unwrap();
        let token = tokenizer.token();
        if DEBUG {
            println!("{:?}", token);
        }

        tokenizer.push_back();
        assert_eq!(tokenizer.next_token().unwrap(), kind);
        assert_eq!(tokenizer.token(), token);

        assert!(token.position >= previous_position);
        previous_position = token.position;
        if kind.is_comment() {
            assert!(!skip_comments);
        }
        if kind == TokenKind::Eof {
            break
        }
        // Every token but Eof consumes at least one character.
        count += 1;
        assert!(count <= input.chars().count());

        token.to_css(&mut serialization).unwrap();
        reserialize(&token);
    }
    serialization
}

fn almost_equals(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= 1e-6 * a.abs().max(b.abs())
}

/// Tokens whose serialization reads back on its own as the same token.
fn reserialize(token: &Token) {
    match token.kind {
        TokenKind::Ident | TokenKind::AtKeyword | TokenKind::Hash | TokenKind::QuotedString |
        TokenKind::Number | TokenKind::Percentage | TokenKind::Dimension => {}
        _ => return,
    }
    if let Some(value) = token.numeric_value {
        if !value.as_f64().is_finite() {
            return
        }
    }
    let serialization = token.to_css_string();
    let mut tokenizer = Tokenizer::new(&serialization);
    assert_eq!(tokenizer.next_token().unwrap(), token.kind, "{:?}", serialization);
    let reparsed = tokenizer.token();
    assert_eq!(tokenizer.next_token().unwrap(), TokenKind::Eof, "{:?}", serialization);
    if DEBUG {
        println!("{:?} -> {:?}", token, reparsed);
    }
    match (token.numeric_value, reparsed.numeric_value) {
        (Some(a), Some(b)) => {
            assert!(almost_equals(a.as_f64(), b.as_f64()), "{:?}", serialization);
            assert_eq!(token.unit, reparsed.unit);
        }
        (None, None) => assert_eq!(token.value, reparsed.value),
        _ => panic!("{:?}", serialization),
    }
}

fn fuzz(data: &str, skip_comments: bool) {
    let serialization = tokenize_and_serialize(data, skip_comments);
    // Adjacent tokens are written without separators, so `a` followed by `b`
    // reads back as `ab`. Only check that the joined text still tokenizes.
    tokenize_and_serialize(&serialization, skip_comments);
}

libfuzzer_sys::fuzz_target!(|data: &str| {
    fuzz(data, true);
    fuzz(data, false);
});
