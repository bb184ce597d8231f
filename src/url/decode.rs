//! Strict URI decoding
//!
//! Percent-escapes are decoded the way a browser's `decodeURI` does it:
//! a malformed escape or a byte run that is not UTF-8 is an error, and
//! escapes of reserved characters survive decoding untouched so that an
//! encoded `/` never turns into a path separator.

use thiserror::Error;

/// Characters whose escapes are left encoded
const RESERVED: &[u8] = b";/?:@&=+$,#";

/// Errors produced while decoding a URI
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Malformed URI escape at byte {offset}: {input}")]
    MalformedEscape { input: String, offset: usize },

    #[error("URI escapes do not form valid UTF-8: {input}")]
    InvalidUtf8 { input: String },
}

/// Decodes every non-reserved percent-escape in `input`
///
/// # Example
///
/// ```
/// use channel_harvest::url::decode_uri;
///
/// assert_eq!(decode_uri("/c/caf%C3%A9").unwrap(), "/c/café");
/// assert_eq!(decode_uri("/a%2Fb").unwrap(), "/a%2Fb");
/// assert!(decode_uri("/bad%ZZ").is_err());
/// ```
pub fn decode_uri(input: &str) -> Result<String, DecodeError> {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }

        out.push_str(&input[literal_start..i]);

        // Gather a run of consecutive escapes up to the next reserved one
        let run_start = i;
        while i < bytes.len() && bytes[i] == b'%' {
            let byte = escaped_byte(bytes, i).ok_or_else(|| DecodeError::MalformedEscape {
                input: input.to_string(),
                offset: i,
            })?;
            if RESERVED.contains(&byte) {
                break;
            }
            i += 3;
        }

        if i > run_start {
            let decoded = urlencoding::decode(&input[run_start..i]).map_err(|_| {
                DecodeError::InvalidUtf8 {
                    input: input.to_string(),
                }
            })?;
            out.push_str(&decoded);
        }

        // Reserved escape, already validated above
        if i < bytes.len() && bytes[i] == b'%' {
            out.push_str(&input[i..i + 3]);
            i += 3;
        }

        literal_start = i;
    }

    out.push_str(&input[literal_start..]);
    Ok(out)
}

/// Reads the byte encoded by the escape starting at `at`
fn escaped_byte(bytes: &[u8], at: usize) -> Option<u8> {
    let hi = hex_value(*bytes.get(at + 1)?)?;
    let lo = hex_value(*bytes.get(at + 2)?)?;
    Some((hi << 4) | lo)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
