//! Comment-delimited markup transform, shared by the HTML and SVG tags.
//!
//! The volume is wrapped in a comment block inserted right after the closing
//! bracket of the host's leading tag. Parsers skip the comment; the volume
//! bytes inside it keep their original offsets.

use super::FormatError;
use crate::crypto::SALT_LEN;

const COMMENT_START: &[u8] = b"<!--";
const COMMENT_END: &[u8] = b"//-->";

pub fn embed(volume: &[u8], host: &[u8]) -> Result<Vec<u8>, FormatError> {
    super::check_volume(volume)?;
    let close = host
        .iter()
        .position(|&b| b == b'>')
        .ok_or(FormatError::AnchorNotFound {
            anchor: "closing '>' of a leading tag",
        })?;

    // Re-keying rewrites bytes [64, 512) with header ciphertext, so the
    // host prefix and the comment opener only survive inside the 64 byte
    // salt region. A deeper bracket cannot produce a working polyglot.
    let skip = close + 1 + COMMENT_START.len();
    if skip > SALT_LEN {
        return Err(FormatError::InsertionPastSalt { offset: close });
    }

    let payload = &volume[skip..];
    let mut out =
        Vec::with_capacity(host.len() + COMMENT_START.len() + payload.len() + COMMENT_END.len());
    out.extend_from_slice(&host[..=close]);
    out.extend_from_slice(COMMENT_START);
    out.extend_from_slice(payload);
    out.extend_from_slice(COMMENT_END);
    out.extend_from_slice(&host[close + 1..]);
    Ok(out)
}
