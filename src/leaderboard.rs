//! Leaderboard panel
//!
//! Holds the ranked entries from the last fetch while the panel is open.

use crate::net::LeaderboardEntry;

/// Maximum number of rows shown
pub const MAX_ROWS: usize = 10;

/// Name shown when the server knows neither a name nor an id
pub const ANONYMOUS: &str = "Anonymous";

/// One display row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub rank: u32,
    pub name: String,
    pub score: i64,
}

#[derive(Debug, Clone, Default)]
pub struct LeaderboardPanel {
    open: bool,
    entries: Vec<LeaderboardEntry>,
}

impl LeaderboardPanel {
    /// Create a closed, empty panel
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open with fresh entries, ranked ascending and trimmed to `MAX_ROWS`
    pub fn open_with(&mut self, mut entries: Vec<LeaderboardEntry>) {
        entries.sort_by_key(|e| e.rank);
        entries.truncate(MAX_ROWS);
        self.entries = entries;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank a score would take among the loaded entries (1-indexed)
    pub fn potential_rank(&self, score: i64) -> Option<usize> {
        if score <= 0 {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        match rank {
            Some(i) => Some(i + 1),
            None if self.entries.len() < MAX_ROWS => Some(self.entries.len() + 1),
            None => None,
        }
    }

    pub fn rows(&self) -> Vec<LeaderboardRow> {
        self.entries
            .iter()
            .map(|e| LeaderboardRow {
                rank: e.rank,
                name: display_name(e).to_string(),
                score: e.score,
            })
            .collect()
    }
}

/// User name, else user id, else "Anonymous"
pub fn display_name(entry: &LeaderboardEntry) -> &str {
    entry
        .user_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| entry.user_id.as_deref().filter(|id| !id.trim().is_empty()))
        .unwrap_or(ANONYMOUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rank: u32, name: Option<&str>, id: Option<&str>, score: i64) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            user_id: id.map(String::from),
            user_name: name.map(String::from),
            score,
        }
    }

    #[test]
    fn test_name_fallbacks() {
        assert_eq!(display_name(&entry(1, Some("Ada"), Some("u1"), 10)), "Ada");
        assert_eq!(display_name(&entry(1, None, Some("u1"), 10)), "u1");
        assert_eq!(display_name(&entry(1, Some(" "), None, 10)), ANONYMOUS);
        assert_eq!(display_name(&entry(1, None, None, 10)), ANONYMOUS);
    }

    #[test]
    fn test_open_sorts_and_trims() {
        let mut panel = LeaderboardPanel::new();
        assert!(!panel.is_open());
        let entries = (1..=12)
            .rev()
            .map(|r| entry(r, None, None, 1000 - r as i64 * 10))
            .collect();
        panel.open_with(entries);
        assert!(panel.is_open());
        let rows = panel.rows();
        assert_eq!(rows.len(), MAX_ROWS);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].score, 990);
        panel.close();
        assert!(!panel.is_open());
    }

    #[test]
    fn test_potential_rank() {
        let mut panel = LeaderboardPanel::new();
        assert_eq!(panel.potential_rank(50), Some(1));
        assert_eq!(panel.potential_rank(0), None);
        panel.open_with(vec![entry(1, None, None, 300), entry(2, None, None, 200)]);
        assert_eq!(panel.potential_rank(250), Some(2));
        assert_eq!(panel.potential_rank(100), Some(3));
        assert!(!panel.is_empty());
    }
}
