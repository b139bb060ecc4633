//! Simplified HTML tokenizer with a constrained, practical tag-name
//! character set (ASCII `[A-Za-z0-9:_-]`, same class for attribute names).
//!
//! Not a full HTML5 state machine; the inputs this workspace rewrites are
//! assumed well-formed (see the pipeline's documented limitations), so the
//! tokenizer favors a small linear scan over spec-complete error recovery.
//!
//! The one piece that must be exact is rawtext handling: `<script>` and
//! `<style>` bodies are scanned verbatim until a case-insensitive close
//! tag, so inline code containing `<`, `>` or near-miss close tags
//! (`</scriptx>`) survives untouched.
use crate::entities::decode_entities;
use crate::types::Token;
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

const SCRIPT_CLOSE_TAG: &[u8] = b"</script";
const STYLE_CLOSE_TAG: &[u8] = b"</style";

fn matches_at_ignore_case(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Find `close_tag` (e.g. `</script`) followed by optional ASCII whitespace
/// and `>`. Returns (start of the close tag, end past `>`).
fn find_rawtext_close_tag(haystack: &str, close_tag: &[u8]) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let len = bytes.len();
    let n = close_tag.len();
    let mut i = 0;
    while i + n <= len {
        let rel = memchr(b'<', &bytes[i..])?;
        i += rel;
        if i + n > len {
            return None;
        }
        if bytes[i + 1] == b'/' && matches_at_ignore_case(bytes, i, close_tag) {
            let mut k = i + n;
            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    // Byte-wise scan; every slice endpoint lands on an ASCII structural
    // byte, so slicing stays on UTF-8 boundaries.
    while i < bytes.len() {
        if bytes[i] != b'<' {
            let start = i;
            match memchr(b'<', &bytes[i..]) {
                Some(rel) => i += rel,
                None => i = bytes.len(),
            }
            let decoded = decode_entities(&input[start..i]);
            if !decoded.is_empty() {
                out.push(Token::Text(decoded));
            }
            continue;
        }

        if input[i..].starts_with(COMMENT_START) {
            let body_start = i + COMMENT_START.len();
            match input[body_start..].find(COMMENT_END) {
                Some(end) => {
                    out.push(Token::Comment(input[body_start..body_start + end].to_string()));
                    i = body_start + end + COMMENT_END.len();
                }
                None => {
                    // Unterminated comment swallows the rest of the input.
                    out.push(Token::Comment(input[body_start..].to_string()));
                    i = bytes.len();
                }
            }
            continue;
        }

        if matches_at_ignore_case(bytes, i, b"<!doctype") {
            let rest = &input[i + 2..];
            match rest.find('>') {
                Some(end) => {
                    out.push(Token::Doctype(rest[..end].trim().to_string()));
                    i += 2 + end + 1;
                    continue;
                }
                None => break,
            }
        }

        // End tag.
        if i + 2 <= bytes.len() && bytes[i + 1] == b'/' {
            let start = i + 2;
            let mut j = start;
            while j < bytes.len() && is_name_byte(bytes[j]) {
                j += 1;
            }
            let name = input[start..j].to_ascii_lowercase();
            while j < bytes.len() && bytes[j] != b'>' {
                j += 1;
            }
            if j < bytes.len() {
                j += 1;
            }
            out.push(Token::EndTag(name));
            i = j;
            continue;
        }

        // Start tag.
        let name_start = i + 1;
        let mut j = name_start;
        while j < bytes.len() && is_name_byte(bytes[j]) {
            j += 1;
        }
        if j == name_start {
            // A lone '<' that opens nothing; treat it as text.
            out.push(Token::Text("<".to_string()));
            i += 1;
            continue;
        }
        let name = input[name_start..j].to_ascii_lowercase();

        let (attributes, self_closing, after_tag) = scan_attributes(input, j);
        let self_closing = self_closing || is_void_element(&name);
        i = after_tag;

        out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });

        if (name == "script" || name == "style") && !self_closing {
            let close_tag = if name == "script" {
                SCRIPT_CLOSE_TAG
            } else {
                STYLE_CLOSE_TAG
            };
            match find_rawtext_close_tag(&input[i..], close_tag) {
                Some((rel_start, rel_end)) => {
                    let raw = &input[i..i + rel_start];
                    if !raw.is_empty() {
                        out.push(Token::Text(raw.to_string()));
                    }
                    out.push(Token::EndTag(name));
                    i += rel_end;
                }
                None => {
                    // Missing close tag: remainder is rawtext, close implicitly.
                    let raw = &input[i..];
                    if !raw.is_empty() {
                        out.push(Token::Text(raw.to_string()));
                    }
                    out.push(Token::EndTag(name));
                    break;
                }
            }
        }
    }

    log::trace!(target: "html.tokenizer", "tokenized {} bytes into {} tokens", input.len(), out.len());
    out
}

/// Scan attributes from `k` up to and past the closing `>`.
/// Returns (attributes, saw `/>`, index past the tag).
fn scan_attributes(input: &str, mut k: usize) -> (Vec<(String, Option<String>)>, bool, usize) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut attributes = Vec::new();
    let mut self_closing = false;

    loop {
        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        if k >= len {
            break;
        }
        if bytes[k] == b'>' {
            k += 1;
            break;
        }
        if bytes[k] == b'/' {
            if k + 1 < len && bytes[k + 1] == b'>' {
                self_closing = true;
                k += 2;
                break;
            }
            k += 1;
            continue;
        }

        let name_start = k;
        while k < len && is_name_byte(bytes[k]) {
            k += 1;
        }
        if name_start == k {
            // Junk byte inside the tag; skip it.
            k += 1;
            continue;
        }
        let attr_name = input[name_start..k].to_ascii_lowercase();

        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }

        let value = if k < len && bytes[k] == b'=' {
            k += 1;
            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                let quote = bytes[k];
                k += 1;
                let vstart = k;
                while k < len && bytes[k] != quote {
                    k += 1;
                }
                let raw = &input[vstart..k];
                if k < len {
                    k += 1;
                }
                Some(decode_entities(raw))
            } else {
                let vstart = k;
                while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                        break;
                    }
                    k += 1;
                }
                Some(input[vstart..k].to_string())
            }
        } else {
            None
        };

        attributes.push((attr_name, value));
    }

    (attributes, self_closing, k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rawtext_script_body_is_verbatim() {
        let tokens = tokenize("<script>if (a < b) write(\"<div>\");</script>");
        assert!(matches!(
            &tokens[..],
            [
                Token::StartTag { name, .. },
                Token::Text(body),
                Token::EndTag(end)
            ] if name == "script"
                && body == "if (a < b) write(\"<div>\");"
                && end == "script"
        ));
    }

    #[test]
    fn rawtext_close_tag_is_case_insensitive_with_whitespace() {
        let tokens = tokenize("<script>let x=1;</ScRiPt >");
        assert!(matches!(
            &tokens[..],
            [
                Token::StartTag { .. },
                Token::Text(body),
                Token::EndTag(_)
            ] if body == "let x=1;"
        ));
    }

    #[test]
    fn rawtext_near_match_does_not_close() {
        let tokens = tokenize("<script>ok</scriptx>no</script>");
        assert!(matches!(
            &tokens[..],
            [
                Token::StartTag { .. },
                Token::Text(body),
                Token::EndTag(_)
            ] if body == "ok</scriptx>no"
        ));
    }

    #[test]
    fn rawtext_without_close_tag_takes_rest_of_input() {
        let tokens = tokenize("<script>x<y>\nz");
        assert!(matches!(
            &tokens[..],
            [
                Token::StartTag { .. },
                Token::Text(body),
                Token::EndTag(_)
            ] if body == "x<y>\nz"
        ));
    }

    #[test]
    fn attributes_parse_quoted_unquoted_and_bare() {
        let tokens = tokenize("<div id=\"a\" class='b c' hidden data-x=1>");
        let Token::StartTag { attributes, .. } = &tokens[0] else {
            panic!("expected start tag, got {tokens:?}");
        };
        assert_eq!(
            attributes,
            &[
                ("id".to_string(), Some("a".to_string())),
                ("class".to_string(), Some("b c".to_string())),
                ("hidden".to_string(), None),
                ("data-x".to_string(), Some("1".to_string())),
            ]
        );
    }

    #[test]
    fn void_elements_self_close() {
        let tokens = tokenize("<br><img src=x>");
        assert!(matches!(
            &tokens[..],
            [
                Token::StartTag { self_closing: true, .. },
                Token::StartTag { self_closing: true, .. }
            ]
        ));
    }

    #[test]
    fn doctype_is_case_insensitive() {
        let tokens = tokenize("<!DoCtYpE html>");
        assert!(matches!(&tokens[..], [Token::Doctype(s)] if s == "DoCtYpE html"));
    }

    #[test]
    fn comments_and_unterminated_comments() {
        let tokens = tokenize("<!--a--><p><!--trail");
        assert!(matches!(
            &tokens[..],
            [
                Token::Comment(a),
                Token::StartTag { .. },
                Token::Comment(b)
            ] if a == "a" && b == "trail"
        ));
    }

    #[test]
    fn text_entities_are_decoded() {
        let tokens = tokenize("a &amp; b");
        assert!(matches!(&tokens[..], [Token::Text(t)] if t == "a & b"));
    }

    #[test]
    fn utf8_text_survives() {
        let tokens = tokenize("¡Hola <b>café</b> 😊");
        assert!(tokens.iter().any(|t| matches!(t, Token::Text(s) if s == "¡Hola ")));
        assert!(tokens.iter().any(|t| matches!(t, Token::Text(s) if s == "café")));
        assert!(tokens.iter().any(|t| matches!(t, Token::Text(s) if s == " 😊")));
    }

    #[test]
    fn lone_angle_bracket_is_text() {
        let tokens = tokenize("a < b");
        assert!(matches!(
            &tokens[..],
            [Token::Text(a), Token::Text(lt), Token::Text(b)]
                if a == "a " && lt == "<" && b == " b"
        ));
    }
}
