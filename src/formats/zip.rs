//! ZIP host transform.
//!
//! The whole volume is prepended ahead of the archive; the volume's own
//! salt stays in place, so re-keying leaves the leading 512 bytes
//! unchanged. Archive readers locate members through the end-of-central-
//! directory record, whose central-directory offset is shifted by the
//! prepended length.

use byteorder::{ByteOrder, LittleEndian};

use super::FormatError;

/// End-of-central-directory record signature.
const EOCD_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];
/// Offset of the central-directory start field inside the EOCD record.
const CENTRAL_OFFSET_POS: usize = 16;
/// EOCD record length up to and including the comment-length field.
const EOCD_LEN: usize = 22;

pub fn embed(volume: &[u8], host: &[u8]) -> Result<Vec<u8>, FormatError> {
    super::check_volume(volume)?;

    // The EOCD record sits in the archive tail, possibly followed by a
    // comment, so scan the host backwards for the last occurrence. Scanning
    // only the host also keeps random volume bytes out of the search.
    let eocd = host
        .windows(EOCD_SIGNATURE.len())
        .rposition(|w| w == EOCD_SIGNATURE)
        .ok_or(FormatError::AnchorNotFound {
            anchor: "end-of-central-directory record",
        })?;
    if eocd + EOCD_LEN > host.len() {
        return Err(FormatError::AnchorNotFound {
            anchor: "complete end-of-central-directory record",
        });
    }

    let mut out = Vec::with_capacity(volume.len() + host.len());
    out.extend_from_slice(volume);
    out.extend_from_slice(host);

    let field = volume.len() + eocd + CENTRAL_OFFSET_POS;
    let offset = LittleEndian::read_u32(&out[field..field + 4]);
    LittleEndian::write_u32(
        &mut out[field..field + 4],
        offset.wrapping_add(volume.len() as u32),
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::testutil;

    /// One stored member, its central directory entry, and the EOCD record.
    fn host() -> Vec<u8> {
        let mut h = Vec::new();
        h.extend_from_slice(b"PK\x03\x04local-header-stub");
        let central_start = h.len();
        h.extend_from_slice(b"PK\x01\x02central-entry-stub");
        let eocd_start = h.len();
        h.extend_from_slice(&EOCD_SIGNATURE);
        h.extend_from_slice(&[0u8; 8]); // disk numbers, entry counts
        let mut scratch = [0u8; 4];
        LittleEndian::write_u32(&mut scratch, (eocd_start - central_start) as u32);
        h.extend_from_slice(&scratch); // central directory size
        LittleEndian::write_u32(&mut scratch, central_start as u32);
        h.extend_from_slice(&scratch); // central directory offset
        h.extend_from_slice(&[0u8; 2]); // comment length
        h
    }

    #[test]
    fn central_directory_offset_is_shifted() {
        let volume = testutil::volume(777);
        let host = host();
        let out = embed(&volume, &host).unwrap();

        // Prefix is the untouched volume, salt included.
        assert_eq!(&out[..volume.len()], &volume[..]);

        let eocd = out
            .windows(4)
            .rposition(|w| w == EOCD_SIGNATURE)
            .unwrap();
        let field = eocd + CENTRAL_OFFSET_POS;
        let shifted = LittleEndian::read_u32(&out[field..field + 4]) as usize;
        // The shifted offset resolves to the central directory signature.
        assert_eq!(&out[shifted..shifted + 4], b"PK\x01\x02");

        // Everything but the offset field is a straight copy of the host.
        let host_field = field - volume.len();
        assert_eq!(&out[volume.len()..field], &host[..host_field]);
        assert_eq!(&out[field + 4..], &host[host_field + 4..]);
    }

    #[test]
    fn host_without_eocd_is_rejected() {
        let err = embed(&testutil::volume(512), b"PK\x03\x04 not an archive tail").unwrap_err();
        assert!(matches!(err, FormatError::AnchorNotFound { .. }));
    }

    #[test]
    fn truncated_eocd_is_rejected() {
        let mut host = host();
        host.truncate(host.len() - 4);
        let err = embed(&testutil::volume(512), &host).unwrap_err();
        assert!(matches!(err, FormatError::AnchorNotFound { .. }));
    }
}
