use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a plaintext password for storage. Hashes are write-only: no API
/// response ever selects them back out.
pub fn hash_password(password: &str) -> String {
    hash(password, DEFAULT_COST).expect("Failed to hash password")
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    verify(password, hash).unwrap_or(false)
}
