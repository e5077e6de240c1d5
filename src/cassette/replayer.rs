//! Replays recorded interactions from a cassette.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use super::format::{Cassette, Interaction};

/// Serves recorded interactions sequentially per `(port, method)` pair.
pub struct CassetteReplayer {
    queues: HashMap<(String, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Build a replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: Cassette) -> Self {
        let mut queues: HashMap<(String, String), VecDeque<Interaction>> = HashMap::new();
        for interaction in cassette.interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction);
        }
        Self { queues }
    }

    /// Take the next recorded interaction for the given port and method.
    ///
    /// # Panics
    ///
    /// Panics if the cassette has no (more) interactions for the pair; an
    /// exhausted cassette in a replay run is a test-setup bug, not a runtime
    /// condition to recover from.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Interaction {
        let key = (port.to_string(), method.to_string());
        let Some(queue) = self.queues.get_mut(&key) else {
            let available: Vec<String> =
                self.queues.keys().map(|(p, m)| format!("{p}::{m}")).collect();
            panic!(
                "Cassette has no interactions for {port}::{method}. \
                 Recorded pairs: [{}]",
                available.join(", ")
            );
        };
        queue.pop_front().unwrap_or_else(|| {
            panic!("Cassette exhausted: every interaction for {port}::{method} has been served")
        })
    }
}

/// Load a cassette file and build a replayer for it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_cassette(path: &Path) -> Result<CassetteReplayer, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
    let cassette: Cassette = serde_yaml::from_str(&content)
        .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
    Ok(CassetteReplayer::new(cassette))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn interaction(seq: u64, text: &str) -> Interaction {
        Interaction {
            seq,
            port: "page_generator".into(),
            method: "generate".into(),
            input: json!({ "text": text }),
            output: json!({"Ok": {"data": "", "mime_type": "image/png"}}),
        }
    }

    fn cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions,
        }
    }

    #[test]
    fn serves_interactions_in_recorded_order() {
        let mut replayer =
            CassetteReplayer::new(cassette(vec![interaction(0, "first"), interaction(1, "second")]));

        assert_eq!(replayer.next_interaction("page_generator", "generate").seq, 0);
        assert_eq!(replayer.next_interaction("page_generator", "generate").seq, 1);
    }

    #[test]
    #[should_panic(expected = "Cassette exhausted")]
    fn exhausted_queue_panics() {
        let mut replayer = CassetteReplayer::new(cassette(vec![interaction(0, "only")]));
        let _ = replayer.next_interaction("page_generator", "generate");
        let _ = replayer.next_interaction("page_generator", "generate");
    }

    #[test]
    #[should_panic(expected = "no interactions for")]
    fn unknown_pair_panics() {
        let mut replayer = CassetteReplayer::new(cassette(vec![]));
        let _ = replayer.next_interaction("font_loader", "load");
    }

    #[test]
    fn load_round_trips_through_disk() {
        let dir = std::env::temp_dir().join("bookpress_replayer_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("replay.cassette.yaml");
        let yaml = serde_yaml::to_string(&cassette(vec![interaction(0, "hi")])).unwrap();
        std::fs::write(&path, yaml).unwrap();

        let mut replayer = load_cassette(&path).unwrap();
        let first = replayer.next_interaction("page_generator", "generate");
        assert_eq!(first.input["text"], "hi");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(load_cassette(Path::new("/nonexistent/replay.cassette.yaml")).is_err());
    }
}
