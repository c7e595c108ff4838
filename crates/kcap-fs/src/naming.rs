use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Filename-safe timestamp appended to backups.
pub const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.6fZ";

/// CRC-32 (IEEE) of the key, little-endian.
pub fn fingerprint(key: &[u8]) -> [u8; 4] { crc32fast::hash(key).to_le_bytes() }

/// `inspect-data.<fingerprint>.enc`
pub fn encrypted_file_name(key: &[u8]) -> String {
    format!("inspect-data.{}.enc", hex::encode(fingerprint(key)))
}

/// Fingerprint followed by the full key, hex encoded. Shown to the operator once.
pub fn identifier(key: &[u8]) -> String {
    let mut id = hex::encode(fingerprint(key));
    id.push_str(&hex::encode(key));
    id
}

/// Replace everything outside `[A-Za-z0-9._-]` with `_`.
pub fn conservative_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect()
}

/// `inspect-<parts joined by '_'>.enc`, sanitized.
pub fn fallback_file_name<S: AsRef<str>>(parts: &[S]) -> String {
    let joined = parts.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("_");
    format!("inspect-{}.enc", conservative_file_name(&joined))
}

pub fn backup_path(path: &Path, at: DateTime<Utc>) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(at.format(BACKUP_TIME_FORMAT).to_string());
    PathBuf::from(name)
}
