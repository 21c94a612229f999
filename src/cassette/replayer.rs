//! Replays recorded interactions from a cassette.

use std::collections::{HashMap, VecDeque};

use super::format::{Cassette, Interaction};

/// Serves recorded interactions in order, one queue per `port::method`.
#[derive(Debug)]
pub struct CassetteReplayer {
    queues: HashMap<String, VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Create a replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<String, VecDeque<Interaction>> = HashMap::new();
        let mut ordered = cassette.interactions.clone();
        ordered.sort_by_key(|i| i.seq);
        for interaction in ordered {
            queues
                .entry(key(&interaction.port, &interaction.method))
                .or_default()
                .push_back(interaction);
        }
        Self { queues }
    }

    /// Take the next interaction for `port` and `method`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette has no (more) interactions for the pair.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Result<Interaction, String> {
        let wanted = key(port, method);
        let Some(queue) = self.queues.get_mut(&wanted) else {
            let mut available: Vec<&str> = self.queues.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(format!(
                "Cassette exhausted: no interactions recorded for {wanted}. Available: [{}]",
                available.join(", ")
            ));
        };
        queue.pop_front().ok_or_else(|| {
            format!("Cassette exhausted: all interactions for {wanted} have been consumed")
        })
    }

    /// Interactions not yet served, across all pairs.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }
}

fn key(port: &str, method: &str) -> String {
    format!("{port}::{method}")
}
