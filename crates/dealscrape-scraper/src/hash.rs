use sha2::{Digest, Sha256};

/// Stable identifier for a deal: lowercase hex SHA-256 of `parts` joined by
/// `,`. `None` when there is nothing to hash.
#[must_use]
pub fn deal_hash<S: AsRef<str>>(parts: &[S]) -> Option<String> {
    if parts.is_empty() {
        return None;
    }
    let joined = parts.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
    Some(format!("{:x}", Sha256::digest(joined.as_bytes())))
}
