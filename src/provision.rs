//! Token provisioning through a fixed slot in the binary.
//!
//! The compiled binary carries a 500-byte slot starting with a known marker.
//! A provisioning step patches a per-customer token into the slot without
//! changing the file size; at startup the running executable reads its own
//! tail to recover it. Unpatched binaries get a dev token and no bearer
//! header is sent for it.

use std::path::Path;

use anyhow::{bail, Context, Result};

// The marker is stored split in two so the only contiguous copy of it in a
// built binary is the slot itself; `find_slot` reassembles it at runtime.
const MARKER_HEAD: &[u8] = b"DESKPILOT_TOKEN";
const MARKER_TAIL: &[u8] = b"_SLOT_";
const MARKER_LEN: usize = MARKER_HEAD.len() + MARKER_TAIL.len();
const SLOT_LEN: usize = 500;
const PAYLOAD_LEN: usize = SLOT_LEN - MARKER_LEN;

/// What an unpatched build authenticates as.
pub const DEV_TOKEN: &str = "DEV_TOKEN_UNPATCHED";

const fn build_slot() -> [u8; SLOT_LEN] {
    let mut slot = [0u8; SLOT_LEN];
    let mut i = 0;
    while i < MARKER_HEAD.len() {
        slot[i] = MARKER_HEAD[i];
        i += 1;
    }
    let mut j = 0;
    while j < MARKER_TAIL.len() {
        slot[MARKER_HEAD.len() + j] = MARKER_TAIL[j];
        j += 1;
    }
    slot
}

// Keeps the slot present in release builds even though nothing references it.
#[used]
static TOKEN_SLOT: [u8; SLOT_LEN] = build_slot();

fn slot_marker() -> Vec<u8> {
    [MARKER_HEAD, MARKER_TAIL].concat()
}

/// A real slot payload is all zeros (fresh) or a space-padded ASCII token
/// (patched). Anything else is unrelated data that happens to follow a
/// marker-shaped byte run.
fn payload_plausible(payload: &[u8]) -> bool {
    payload.len() >= PAYLOAD_LEN
        && payload[..PAYLOAD_LEN]
            .iter()
            .all(|&b| b == 0 || b == b' ' || b.is_ascii_graphic())
}

fn find_slot(bytes: &[u8]) -> Option<usize> {
    let marker = slot_marker();
    if bytes.len() < marker.len() {
        return None;
    }
    // The slot sits near the binary tail; scan backwards.
    (0..=bytes.len() - marker.len()).rev().find(|&i| {
        bytes[i..].starts_with(&marker) && payload_plausible(&bytes[i + marker.len()..])
    })
}

/// Token embedded in `bytes`, if the slot exists and was patched.
pub fn extract_token(bytes: &[u8]) -> Option<String> {
    let start = find_slot(bytes)? + MARKER_LEN;
    let payload = &bytes[start..start + PAYLOAD_LEN];
    let token: String = payload
        .iter()
        .take_while(|&&b| b != 0 && b != b' ')
        .map(|&b| b as char)
        .collect();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Token of the running executable; falls back to [`DEV_TOKEN`] when the
/// binary cannot be read or was never patched.
pub fn embedded_token() -> String {
    let own = match std::env::current_exe().and_then(std::fs::read) {
        Ok(bytes) => bytes,
        Err(_) => return DEV_TOKEN.to_string(),
    };
    extract_token(&own).unwrap_or_else(|| DEV_TOKEN.to_string())
}

/// Write `token` into the slot of the binary at `path`, space-padded.
/// File size never changes.
pub fn patch_binary(path: &Path, token: &str) -> Result<()> {
    if !token.is_ascii() {
        bail!("token must be ASCII");
    }
    if token.len() > PAYLOAD_LEN {
        bail!(
            "token too long: {} bytes, slot holds {PAYLOAD_LEN}",
            token.len()
        );
    }
    let mut bytes =
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let start = match find_slot(&bytes) {
        Some(offset) => offset + MARKER_LEN,
        None => bail!("no token slot in {}", path.display()),
    };
    for (i, dst) in bytes[start..start + PAYLOAD_LEN].iter_mut().enumerate() {
        *dst = *token.as_bytes().get(i).unwrap_or(&b' ');
    }
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_binary() -> Vec<u8> {
        let mut bytes = vec![0xAB; 4096];
        bytes.extend_from_slice(&build_slot());
        bytes.extend_from_slice(&[0xCD; 128]);
        bytes
    }

    #[test]
    fn unpatched_slot_yields_no_token() {
        assert_eq!(extract_token(&fake_binary()), None);
    }

    #[test]
    fn patch_round_trip_preserves_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.bin");
        let original = fake_binary();
        std::fs::write(&path, &original).unwrap();

        patch_binary(&path, "tok_live_12345").unwrap();

        let patched = std::fs::read(&path).unwrap();
        assert_eq!(patched.len(), original.len());
        assert_eq!(extract_token(&patched).as_deref(), Some("tok_live_12345"));
    }

    #[test]
    fn oversized_token_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.bin");
        std::fs::write(&path, fake_binary()).unwrap();
        let long = "x".repeat(SLOT_LEN);
        assert!(patch_binary(&path, &long).is_err());
    }

    #[test]
    fn stray_marker_bytes_do_not_shadow_the_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.bin");
        // A second copy of the marker bytes deeper in the file, followed by
        // data no real slot payload could hold.
        let mut original = fake_binary();
        original.extend_from_slice(&slot_marker());
        original.extend_from_slice(&[0xCD; 64]);
        std::fs::write(&path, &original).unwrap();

        patch_binary(&path, "tok_live_99").unwrap();

        let patched = std::fs::read(&path).unwrap();
        assert_eq!(patched.len(), original.len());
        assert_eq!(extract_token(&patched).as_deref(), Some("tok_live_99"));
        // The bytes after the stray marker are untouched.
        assert_eq!(&patched[patched.len() - 64..], &[0xCD; 64][..]);
    }

    #[test]
    fn missing_slot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.bin");
        std::fs::write(&path, vec![0u8; 1024]).unwrap();
        assert!(patch_binary(&path, "tok").is_err());
    }
}
