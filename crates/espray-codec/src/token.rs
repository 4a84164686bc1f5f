//! Maximal-munch tokenizers, one per encoding.
//!
//! Each digit tokenizer consumes the longest prefix that still denotes a
//! single byte value, so concatenated unpadded digits never produce a token
//! above 255. Characters outside the alphabet separate tokens and are
//! otherwise dropped.

use crate::Encoding;

/// Split `text` into tokens, each denoting one byte (or, for base64, the
/// whole payload).
pub fn split(text: &str, encoding: Encoding) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    match encoding {
        Encoding::Binary => split_digits(&chars, encoding, munch_binary),
        Encoding::Octal => split_digits(&chars, encoding, munch_octal),
        Encoding::Decimal => split_digits(&chars, encoding, munch_decimal),
        Encoding::Hexa => split_digits(&chars, encoding, munch_hexa),
        Encoding::Text => split_text(&chars),
        Encoding::Base64 => {
            let payload: String = chars.iter().filter(|c| encoding.accepts(**c)).collect();
            if payload.is_empty() {
                Vec::new()
            } else {
                vec![payload]
            }
        }
    }
}

fn split_digits(chars: &[char], encoding: Encoding, munch: fn(&[char]) -> usize) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        if !encoding.accepts(chars[pos]) {
            pos += 1;
            continue;
        }
        let run = chars[pos..]
            .iter()
            .take_while(|c| encoding.accepts(**c))
            .count();
        let len = munch(&chars[pos..pos + run]).clamp(1, run);
        tokens.push(chars[pos..pos + len].iter().collect());
        pos += len;
    }

    tokens
}

/// `[01]{1,8}`
fn munch_binary(run: &[char]) -> usize {
    run.len().min(8)
}

/// `[0-3]?[0-7]{1,2}`
fn munch_octal(run: &[char]) -> usize {
    match run[0] {
        '0'..='3' => run.len().min(3),
        _ => run.len().min(2),
    }
}

/// `25[0-5]|2[0-4][0-9]|[01]?[0-9]{1,2}`
fn munch_decimal(run: &[char]) -> usize {
    match run {
        ['2', '5', '0'..='5', ..] => 3,
        ['2', '0'..='4', _, ..] => 3,
        ['0' | '1', ..] => run.len().min(3),
        _ => run.len().min(2),
    }
}

/// `[0-9a-fA-F]{1,2}`
fn munch_hexa(run: &[char]) -> usize {
    run.len().min(2)
}

/// `\\x[0-9a-fA-F]{2}|\\[nr0\\]|.`
fn split_text(chars: &[char]) -> Vec<String> {
    let mut tokens = Vec::with_capacity(chars.len());
    let mut pos = 0;

    while pos < chars.len() {
        let len = match &chars[pos..] {
            ['\\', 'x', h, l, ..] if h.is_ascii_hexdigit() && l.is_ascii_hexdigit() => 4,
            ['\\', 'n' | 'r' | '0' | '\\', ..] => 2,
            _ => 1,
        };
        tokens.push(chars[pos..pos + len].iter().collect());
        pos += len;
    }

    tokens
}
