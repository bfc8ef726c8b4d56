//! PNG host transform.
//!
//! The volume travels inside a private ancillary chunk inserted directly
//! after IHDR. The chunk header occupies bytes 33..41 of the output, so the
//! payload starts at offset 41 and every payload byte keeps its volume
//! offset; decoders skip the unknown chunk, and the CRC keeps strict
//! validators happy.

use byteorder::{BigEndian, ByteOrder};

use super::FormatError;

/// Standard 8 byte PNG signature.
const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
/// End of the IHDR chunk: signature + length + type + 13 data bytes + CRC.
const INSERT_POS: usize = 33;
/// Volume bytes skipped so the payload lands at its own offsets.
const VOLUME_SKIP: usize = INSERT_POS + 8;
/// Chunk type: ancillary, private, safe to copy.
const CHUNK_TYPE: [u8; 4] = *b"voLt";

pub fn embed(volume: &[u8], host: &[u8]) -> Result<Vec<u8>, FormatError> {
    super::check_volume(volume)?;
    if host.len() < INSERT_POS {
        return Err(FormatError::HostTooShort {
            len: host.len(),
            needed: INSERT_POS,
        });
    }
    if host[..8] != SIGNATURE {
        return Err(FormatError::BadSignature {
            expected: "the PNG signature",
        });
    }
    if &host[12..16] != b"IHDR" {
        return Err(FormatError::AnchorNotFound {
            anchor: "IHDR chunk at the start of the stream",
        });
    }

    let payload = &volume[VOLUME_SKIP..];

    let mut chunk_header = [0u8; 8];
    BigEndian::write_u32(&mut chunk_header[..4], payload.len() as u32);
    chunk_header[4..].copy_from_slice(&CHUNK_TYPE);

    // Chunk CRC covers the type and the payload, not the length field.
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&CHUNK_TYPE);
    hasher.update(payload);
    let mut crc = [0u8; 4];
    BigEndian::write_u32(&mut crc, hasher.finalize());

    let mut out = Vec::with_capacity(host.len() + payload.len() + 12);
    out.extend_from_slice(&host[..INSERT_POS]);
    out.extend_from_slice(&chunk_header);
    out.extend_from_slice(payload);
    out.extend_from_slice(&crc);
    out.extend_from_slice(&host[INSERT_POS..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::testutil;

    /// Signature, IHDR with a valid CRC, IEND.
    fn host() -> Vec<u8> {
        let mut h = Vec::new();
        h.extend_from_slice(&SIGNATURE);
        let mut ihdr = [0u8; 17];
        ihdr[..4].copy_from_slice(b"IHDR");
        BigEndian::write_u32(&mut ihdr[4..8], 1); // width
        BigEndian::write_u32(&mut ihdr[8..12], 1); // height
        ihdr[12] = 8; // bit depth
        let mut len = [0u8; 4];
        BigEndian::write_u32(&mut len, 13);
        h.extend_from_slice(&len);
        h.extend_from_slice(&ihdr);
        let mut crc = [0u8; 4];
        BigEndian::write_u32(&mut crc, crc32fast::hash(&ihdr));
        h.extend_from_slice(&crc);
        h.extend_from_slice(&[0, 0, 0, 0]);
        h.extend_from_slice(b"IEND");
        h.extend_from_slice(&[0xae, 0x42, 0x60, 0x82]);
        h
    }

    #[test]
    fn chunk_is_inserted_after_ihdr() {
        let volume = testutil::volume(800);
        let host = host();
        let out = embed(&volume, &host).unwrap();

        assert_eq!(&out[..INSERT_POS], &host[..INSERT_POS]);
        let payload_len = BigEndian::read_u32(&out[INSERT_POS..INSERT_POS + 4]) as usize;
        assert_eq!(payload_len, volume.len() - VOLUME_SKIP);
        assert_eq!(&out[INSERT_POS + 4..VOLUME_SKIP], &CHUNK_TYPE);
        // Payload bytes keep their volume offsets.
        assert_eq!(&out[VOLUME_SKIP..volume.len()], &volume[VOLUME_SKIP..]);

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&CHUNK_TYPE);
        hasher.update(&volume[VOLUME_SKIP..]);
        let crc = BigEndian::read_u32(&out[volume.len()..volume.len() + 4]);
        assert_eq!(crc, hasher.finalize());

        assert_eq!(&out[volume.len() + 4..], &host[INSERT_POS..]);
    }

    #[test]
    fn non_png_host_is_rejected() {
        let err = embed(&testutil::volume(512), &[0u8; 64]).unwrap_err();
        assert!(matches!(err, FormatError::BadSignature { .. }));
    }

    #[test]
    fn missing_ihdr_is_rejected() {
        let mut host = host();
        host[12..16].copy_from_slice(b"IDAT");
        let err = embed(&testutil::volume(512), &host).unwrap_err();
        assert!(matches!(err, FormatError::AnchorNotFound { .. }));
    }

    #[test]
    fn truncated_host_is_rejected() {
        let err = embed(&testutil::volume(512), &SIGNATURE).unwrap_err();
        assert_eq!(
            err,
            FormatError::HostTooShort {
                len: 8,
                needed: INSERT_POS
            }
        );
    }
}
