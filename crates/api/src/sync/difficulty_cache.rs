//! Per-batch difficulty memoization.

use std::collections::HashMap;

use leettrack_domain::Difficulty;

use crate::leetcode::LeetCodeApi;

/// Maps title slugs to difficulties for the duration of one reconciliation
/// batch. Constructed fresh per batch; never shared across users or ticks.
pub struct DifficultyCache<'a> {
    client: &'a dyn LeetCodeApi,
    entries: HashMap<String, Difficulty>,
}

impl<'a> DifficultyCache<'a> {
    pub fn new(client: &'a dyn LeetCodeApi) -> Self {
        Self {
            client,
            entries: HashMap::new(),
        }
    }

    /// Returns the difficulty for a slug, fetching it on miss.
    ///
    /// A failed lookup is absorbed: the default difficulty is cached and
    /// returned so one bad metadata fetch cannot sink the whole batch. The
    /// mislabel lasts only until the row is next refreshed manually.
    pub async fn get(&mut self, slug: &str) -> Difficulty {
        if let Some(difficulty) = self.entries.get(slug) {
            return *difficulty;
        }

        let difficulty = match self.client.problem_difficulty(slug).await {
            Ok(difficulty) => difficulty,
            Err(error) => {
                tracing::warn!(slug, error = %error, "Could not fetch problem difficulty");
                Difficulty::default()
            }
        };

        self.entries.insert(slug.to_string(), difficulty);
        difficulty
    }
}
