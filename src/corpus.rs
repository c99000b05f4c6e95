use rand::seq::SliceRandom;

/// The candidate target phrases for a round. Injected rather than compiled-in
/// so the engine can be exercised with a known corpus in tests.
#[derive(Debug, Clone)]
pub struct Corpus {
    phrases: Vec<String>,
}

impl Corpus {
    /// Builds a corpus from the given phrases, falling back to the built-in
    /// sample set when the list is empty.
    pub fn new(phrases: Vec<String>) -> Self {
        if phrases.is_empty() {
            Self::default()
        } else {
            Self { phrases }
        }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Picks a phrase uniformly at random.
    pub fn pick_random(&self) -> &str {
        self.phrases
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl Default for Corpus {
    fn default() -> Self {
        let phrases = [
            "The quick brown fox jumps over the lazy dog",
            "Practice makes progress, keep typing and stay focused",
            "Rust and ratatui make interactive terminal apps fun to build",
            "Typing fast is a superpower for gamers and coders alike",
            "Speed, accuracy, and rhythm are keys to master typing",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self { phrases }
    }
}
