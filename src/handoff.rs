use serde::{Deserialize, Serialize};

/// Points at the next playable bank on a track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRef {
    pub id: String,
    pub path: String,
}

/// The explicit baton passed from one finished session to the next:
/// running coin and xp totals plus where to go next. Sessions receive
/// it, add their earnings, and hand it on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Handoff {
    pub coins_per_level: u32,
    pub total_coins: u32,
    pub total_xp: u32,
    pub next_game: Option<GameRef>,
}

impl Default for Handoff {
    fn default() -> Self {
        Self {
            coins_per_level: 5,
            total_coins: 5,
            total_xp: 10,
            next_game: None,
        }
    }
}

impl Handoff {
    pub fn apply(&mut self, coins: u32, xp: u32) {
        self.total_coins += coins;
        self.total_xp += xp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_the_first_session_contract() {
        let handoff = Handoff::default();
        assert_eq!(handoff.coins_per_level, 5);
        assert_eq!(handoff.total_coins, 5);
        assert_eq!(handoff.total_xp, 10);
        assert!(handoff.next_game.is_none());
    }

    #[test]
    fn apply_accumulates_earnings() {
        let mut handoff = Handoff::default();
        handoff.apply(4, 10);
        handoff.apply(3, 10);
        assert_eq!(handoff.total_coins, 12);
        assert_eq!(handoff.total_xp, 30);
    }

    #[test]
    fn serializes_with_the_next_game() {
        let handoff = Handoff {
            next_game: Some(GameRef {
                id: "finance-kids-saving".into(),
                path: "finance/kids/finance-kids-saving".into(),
            }),
            ..Handoff::default()
        };
        let json = serde_json::to_string(&handoff).unwrap();
        let back: Handoff = serde_json::from_str(&json).unwrap();
        assert_eq!(back, handoff);
    }
}
