//! Bitmap host transform.
//!
//! The volume is prepended ahead of the whole host file. The BMP header is
//! then patched so its pixel-array pointer skips the inserted volume, and
//! the patched header (zero-padded to 64 bytes) becomes the salt region.

use byteorder::{ByteOrder, LittleEndian};

use super::FormatError;
use crate::crypto::SALT_LEN;

/// BITMAPFILEHEADER plus the classic BITMAPINFOHEADER.
const HEADER_LEN: usize = 54;
/// Position of bfOffBits, the file offset of the pixel array.
const PIXEL_OFFSET_POS: usize = 10;

pub fn embed(volume: &[u8], host: &[u8]) -> Result<Vec<u8>, FormatError> {
    super::check_volume(volume)?;
    if host.len() < HEADER_LEN {
        return Err(FormatError::HostTooShort {
            len: host.len(),
            needed: HEADER_LEN,
        });
    }
    if &host[..2] != b"BM" {
        return Err(FormatError::BadSignature { expected: "BM" });
    }

    let mut header = [0u8; HEADER_LEN];
    header.copy_from_slice(&host[..HEADER_LEN]);
    LittleEndian::write_u32(
        &mut header[PIXEL_OFFSET_POS..PIXEL_OFFSET_POS + 4],
        volume.len() as u32,
    );

    let mut out = Vec::with_capacity(volume.len() + host.len());
    out.extend_from_slice(&header);
    out.resize(SALT_LEN, 0);
    out.extend_from_slice(&volume[SALT_LEN..]);
    out.extend_from_slice(host);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::testutil;

    fn host() -> Vec<u8> {
        let mut h = vec![0u8; HEADER_LEN];
        h[..2].copy_from_slice(b"BM");
        LittleEndian::write_u32(&mut h[PIXEL_OFFSET_POS..PIXEL_OFFSET_POS + 4], 54);
        for (i, b) in h[14..].iter_mut().enumerate() {
            *b = (i + 1) as u8;
        }
        h.extend_from_slice(&[0xee; 32]); // pixel data
        h
    }

    #[test]
    fn pixel_pointer_skips_the_volume() {
        let volume = testutil::volume(600);
        let host = host();
        let out = embed(&volume, &host).unwrap();

        assert_eq!(out.len(), volume.len() + host.len());
        // Header prefix survives, only bfOffBits changes.
        assert_eq!(&out[..PIXEL_OFFSET_POS], &host[..PIXEL_OFFSET_POS]);
        assert_eq!(
            LittleEndian::read_u32(&out[PIXEL_OFFSET_POS..PIXEL_OFFSET_POS + 4]),
            volume.len() as u32
        );
        assert_eq!(&out[14..HEADER_LEN], &host[14..HEADER_LEN]);
        // Padding up to the end of the salt region.
        assert!(out[HEADER_LEN..SALT_LEN].iter().all(|&b| b == 0));
        // Volume and host follow, byte for byte.
        assert_eq!(&out[SALT_LEN..volume.len()], &volume[SALT_LEN..]);
        assert_eq!(&out[volume.len()..], &host[..]);
    }

    #[test]
    fn short_host_is_rejected() {
        let err = embed(&testutil::volume(512), &[0u8; 20]).unwrap_err();
        assert_eq!(
            err,
            FormatError::HostTooShort {
                len: 20,
                needed: HEADER_LEN
            }
        );
    }

    #[test]
    fn non_bitmap_host_is_rejected() {
        let mut host = host();
        host[0] = b'X';
        let err = embed(&testutil::volume(512), &host).unwrap_err();
        assert_eq!(err, FormatError::BadSignature { expected: "BM" });
    }
}
