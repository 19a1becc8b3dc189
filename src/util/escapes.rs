//! Backslash-escape decoding for `--template` strings typed on a shell line.

/// Decodes `\n`, `\t`, `\\`, octal, `\xHH`, `\uXXXX` and `\UXXXXXXXX` escapes.
///
/// Unknown escapes and malformed numeric escapes are kept verbatim, so a
/// Windows path like `C:\Temp` survives.
pub(crate) fn decode_backslash_escapes(text: &str) -> String {
    let mut decoded = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        let Some(&(at, escape)) = chars.peek() else {
            decoded.push('\\');
            break;
        };
        let simple = match escape {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            'a' => Some('\u{07}'),
            'b' => Some('\u{08}'),
            'f' => Some('\u{0c}'),
            'v' => Some('\u{0b}'),
            _ => None,
        };
        if let Some(replacement) = simple {
            chars.next();
            decoded.push(replacement);
            continue;
        }

        let rest = &text[at..];
        let numeric = match escape {
            'x' => hex_escape(&rest[1..], 2),
            'u' => hex_escape(&rest[1..], 4),
            'U' => hex_escape(&rest[1..], 8),
            '0'..='7' => octal_escape(rest),
            _ => None,
        };
        match numeric {
            Some((replacement, consumed)) => {
                decoded.push(replacement);
                let consumed = if matches!(escape, 'x' | 'u' | 'U') {
                    consumed + 1
                } else {
                    consumed
                };
                for _ in 0..consumed {
                    chars.next();
                }
            }
            None => decoded.push('\\'),
        }
    }

    decoded
}

fn hex_escape(digits: &str, width: usize) -> Option<(char, usize)> {
    let digits = digits.get(..width)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let code = u32::from_str_radix(digits, 16).ok()?;
    Some((char::from_u32(code)?, width))
}

fn octal_escape(digits: &str) -> Option<(char, usize)> {
    let width = digits
        .chars()
        .take(3)
        .take_while(|c| ('0'..='7').contains(c))
        .count();
    let code = u32::from_str_radix(&digits[..width], 8).ok()?;
    Some((char::from_u32(code)?, width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_common_escapes() {
        assert_eq!(
            decode_backslash_escapes(r"%(key)s\t%(value)s\n"),
            "%(key)s\t%(value)s\n"
        );
        assert_eq!(decode_backslash_escapes(r#"say \"hi\" \\ done"#), "say \"hi\" \\ done");
    }

    #[test]
    fn decodes_numeric_escapes() {
        assert_eq!(decode_backslash_escapes(r"\x41\u00e9\U0001F4DA\101\0"), "A\u{e9}\u{1f4da}A\0");
    }

    #[test]
    fn keeps_unknown_and_malformed_escapes() {
        assert_eq!(decode_backslash_escapes(r"C:\Temp\qux"), r"C:\Temp\qux");
        assert_eq!(decode_backslash_escapes(r"\xZZ"), r"\xZZ");
        assert_eq!(decode_backslash_escapes(r"\u12"), r"\u12");
        assert_eq!(decode_backslash_escapes("trailing\\"), "trailing\\");
    }
}
