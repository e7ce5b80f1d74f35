//! Test fixture utilities: load recorded SSE streams and JSON bodies

use bytes::Bytes;

/// Read a file under `tests/fixtures/`.
pub fn fixture(relative: &str) -> String {
    let path = format!("{}/tests/fixtures/{relative}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {path}: {e}"))
}

/// Load an `.sse` fixture and split it into wire chunks.
///
/// Every event is split in two at an arbitrary byte so the decoder has to
/// reassemble events across chunk boundaries.
pub fn load_sse_fixture_as_chunks(relative: &str) -> Vec<Bytes> {
    let normalized = fixture(relative).replace("\r\n", "\n");
    let mut out = Vec::new();
    for event in normalized.split("\n\n") {
        let event = event.trim_end_matches('\n');
        if event.is_empty() {
            continue;
        }
        let owned = format!("{event}\n\n").into_bytes();
        let cut = owned.len() / 2;
        out.push(Bytes::copy_from_slice(&owned[..cut]));
        out.push(Bytes::copy_from_slice(&owned[cut..]));
    }
    out
}
