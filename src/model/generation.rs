//! Generation tokens for in-flight fetches

/// Hands out tokens that are never reused for the lifetime of a dashboard
///
/// Nodes take a fresh token when they are created and whenever they are
/// reset, so a completion carrying an older token can never match a node
/// that was dropped and re-listed under the same id.
#[derive(Debug, Clone, Default)]
pub struct Generations {
    last: u64,
}

impl Generations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_token(&mut self) -> u64 {
        self.last += 1;
        self.last
    }
}
