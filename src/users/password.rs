//! Password digest kept compatible with existing Users rows: a
//! single unsalted SHA-256, base64 encoded. Not a hardened password hash.

use base64ct::{Base64, Encoding};
use sha2::{Digest, Sha256};

pub fn digest_password(plain: &str) -> String {
    Base64::encode_string(&Sha256::digest(plain.as_bytes()))
}

pub fn verify_password(plain: &str, digest: &str) -> bool {
    digest_password(plain) == digest
}
