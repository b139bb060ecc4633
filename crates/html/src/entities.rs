//! Minimal, explicitly limited HTML entity handling.
//!
//! Decoded named entities: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`,
//! `&nbsp;`. Numeric entities (`&#123;`, `&#x1F4A9;`) decode only when
//! well-formed and semicolon-terminated, and only to valid scalar values.
//! Everything else passes through unchanged.
//!
//! This is intentionally not HTML5-spec-complete. Keep the behavior narrow
//! and stable.

const NAMED: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&apos;", '\''),
    ("&nbsp;", '\u{A0}'),
];

// 0x10FFFF / 1114111
const MAX_HEX_DIGITS: usize = 6;
const MAX_DEC_DIGITS: usize = 7;

pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    'outer: while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        for (name, ch) in NAMED {
            if rest.starts_with(name) {
                out.push(*ch);
                rest = &rest[name.len()..];
                continue 'outer;
            }
        }

        if let Some((ch, consumed)) = decode_numeric(rest) {
            out.push(ch);
            rest = &rest[consumed..];
            continue;
        }

        out.push('&');
        rest = &rest[1..];
    }

    out.push_str(rest);
    out
}

/// Parse `&#...;` / `&#x...;` at the start of `s`. Returns the decoded
/// scalar and the byte length consumed, or None to pass the text through.
fn decode_numeric(s: &str) -> Option<(char, usize)> {
    let body = s.strip_prefix("&#")?;
    let bytes = body.as_bytes();

    let (is_hex, digits_at) = match bytes.first().copied() {
        Some(b'x') | Some(b'X') => (true, 1),
        _ => (false, 0),
    };
    let max_digits = if is_hex { MAX_HEX_DIGITS } else { MAX_DEC_DIGITS };
    let base: u32 = if is_hex { 16 } else { 10 };

    let mut value: u32 = 0;
    let mut digits = 0usize;
    let mut i = digits_at;
    loop {
        match bytes.get(i).copied() {
            Some(b';') if digits > 0 => break,
            Some(b) => {
                let d = (b as char).to_digit(base)?;
                // Bounded digit run, so adversarial input cannot overflow.
                if digits == max_digits {
                    return None;
                }
                value = value * base + d;
                digits += 1;
                i += 1;
            }
            None => return None,
        }
    }

    let ch = char::from_u32(value)?;
    Some((ch, 2 + i + 1))
}

/// Escape text-node content for serialization.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a double-quoted attribute value for serialization.
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
