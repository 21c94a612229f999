//! Cassette loading.

use std::path::Path;

use super::format::Cassette;
use super::replayer::CassetteReplayer;

/// Load a cassette file and create a replayer.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_cassette(path: &Path) -> Result<CassetteReplayer, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
    let cassette: Cassette = serde_yaml::from_str(&content)
        .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
    let replayer = CassetteReplayer::new(&cassette);
    tracing::debug!(name = %cassette.name, interactions = replayer.remaining(), "cassette loaded");
    Ok(replayer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_handwritten_cassette() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ready.cassette.yaml");
        std::fs::write(
            &path,
            r#"
name: ready
recorded_at: "2026-10-01T00:00:00Z"
commit: test
interactions:
  - seq: 0
    port: generation_service
    method: generate
    output:
      Ok:
        image_url: https://x/y.png
    latency_ms: 250
"#,
        )
        .unwrap();

        let mut replayer = load_cassette(&path).unwrap();
        let i = replayer.next_interaction("generation_service", "generate").unwrap();
        assert_eq!(i.seq, 0);
        assert_eq!(i.latency_ms, Some(250));
        assert!(i.input.is_null());
    }

    #[test]
    fn load_nonexistent_fails() {
        assert!(load_cassette(Path::new("/nonexistent/cassette.yaml")).is_err());
    }

    #[test]
    fn load_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.cassette.yaml");
        std::fs::write(&path, "interactions: {{{").unwrap();
        let err = load_cassette(&path).unwrap_err();
        assert!(err.contains("Failed to parse cassette file"));
    }
}
