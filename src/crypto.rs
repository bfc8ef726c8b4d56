//! Volume header codec.
//!
//! A volume container starts with a 64 byte salt followed by a 448 byte
//! AES-256-XTS encrypted header; everything from byte 512 onward is the
//! encrypted body, which this crate never touches. The header keys are
//! derived from (salt, password) with PBKDF2-HMAC-SHA512, and the whole
//! 448 byte header is processed as a single XTS data unit under a fixed
//! all-zero tweak. Both the iteration count and the zero tweak are part of
//! the on-disk format and must stay as they are for existing volume readers
//! to accept the output.

use aes::Aes256;
use cipher::generic_array::GenericArray;
use cipher::KeyInit;
use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha512;
use std::fmt;
use xts_mode::Xts128;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of the salt at the start of a volume container.
pub const SALT_LEN: usize = 64;
/// Length of the salt plus the encrypted header.
pub const VOLUME_HEADER_LEN: usize = 512;
/// Length of the encrypted header region itself.
pub const HEADER_LEN: usize = VOLUME_HEADER_LEN - SALT_LEN;
/// Plaintext marker expected at the start of a correctly decrypted header.
pub const HEADER_MAGIC: &[u8; 4] = b"TRUE";
/// PBKDF2 round count fixed by the volume format.
pub const PBKDF2_ITERATIONS: u32 = 1000;

// The header is a single data unit, so the tweak never advances.
const HEADER_TWEAK: [u8; 16] = [0u8; 16];

/// Failure to authenticate a volume header.
///
/// A wrong password and a buffer that was never a volume of this format
/// produce the same garbage plaintext; the two cases are reported
/// identically on purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    AuthenticationFailed,
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HeaderError::AuthenticationFailed => {
                write!(f, "wrong password or not a recognized volume")
            }
        }
    }
}

impl std::error::Error for HeaderError {}

/// The two 32 byte XTS key halves derived from (salt, password).
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct HeaderKeys {
    key1: [u8; 32],
    key2: [u8; 32],
}

/// Decrypted 448 byte header, magic marker included.
///
/// The header carries the body's master-key material, so it is treated as an
/// indivisible blob: re-keying copies it byte for byte between encryption
/// contexts and it is wiped when dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Debug)]
pub struct DecryptedHeader([u8; HEADER_LEN]);

impl DecryptedHeader {
    pub fn new(bytes: [u8; HEADER_LEN]) -> Self {
        DecryptedHeader(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HEADER_LEN] {
        &self.0
    }
}

/// Derives the XTS key pair for a header from its salt and the password.
///
/// PBKDF2-HMAC-SHA512 with 1000 rounds and a 64 byte output, split into the
/// two 32 byte AES-256 keys. Deterministic; any salt/password pair yields a
/// key pair.
pub fn derive_header_keys(salt: &[u8; SALT_LEN], password: &str) -> HeaderKeys {
    let mut derived = [0u8; 64];
    // HMAC accepts keys of any length, so this cannot fail.
    pbkdf2::<Hmac<Sha512>>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut derived).ok();

    let mut key1 = [0u8; 32];
    let mut key2 = [0u8; 32];
    key1.copy_from_slice(&derived[..32]);
    key2.copy_from_slice(&derived[32..]);
    derived.zeroize();

    HeaderKeys { key1, key2 }
}

fn header_cipher(keys: &HeaderKeys) -> Xts128<Aes256> {
    let cipher_1 = Aes256::new(GenericArray::from_slice(&keys.key1));
    let cipher_2 = Aes256::new(GenericArray::from_slice(&keys.key2));
    Xts128::new(cipher_1, cipher_2)
}

/// Decrypts a 448 byte header with keys derived from the given salt.
///
/// Returns [`HeaderError::AuthenticationFailed`] when the magic marker is
/// missing from the plaintext.
pub fn decrypt_header(
    salt: &[u8; SALT_LEN],
    encrypted: &[u8; HEADER_LEN],
    password: &str,
) -> Result<DecryptedHeader, HeaderError> {
    let keys = derive_header_keys(salt, password);
    let mut plain = *encrypted;
    header_cipher(&keys).decrypt_area(&mut plain, HEADER_LEN, 0, |_| HEADER_TWEAK);

    if &plain[..4] != HEADER_MAGIC {
        plain.zeroize();
        return Err(HeaderError::AuthenticationFailed);
    }
    Ok(DecryptedHeader(plain))
}

/// Encrypts a 448 byte header under keys derived from the given salt.
pub fn encrypt_header(
    salt: &[u8; SALT_LEN],
    header: &DecryptedHeader,
    password: &str,
) -> [u8; HEADER_LEN] {
    let keys = derive_header_keys(salt, password);
    let mut out = header.0;
    header_cipher(&keys).encrypt_area(&mut out, HEADER_LEN, 0, |_| HEADER_TWEAK);
    out
}
