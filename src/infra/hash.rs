use std::hash::Hasher;

use twox_hash::XxHash64;

pub fn hash64(text: &str) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(text.as_bytes());
    hasher.finish()
}

/// Hash of several fields; each part is length-prefixed so `("ab", "c")` and
/// `("a", "bc")` differ.
pub fn hash_parts(parts: &[&str]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    for part in parts {
        hasher.write_usize(part.len());
        hasher.write(part.as_bytes());
    }
    hasher.finish()
}
