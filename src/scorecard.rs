//! Round scorecard
//!
//! Strokes per hole against par, plus the shot chips earned on the way.

use serde::{Deserialize, Serialize};

use crate::course::Par;

/// Holes in a full round
pub const MAX_HOLES: usize = 18;

/// Name for a hole's score relative to par
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreName {
    HoleInOne,
    Albatross,
    Eagle,
    Birdie,
    Par,
    Bogey,
    DoubleBogey,
    /// Three or more over
    Over(i32),
}

impl ScoreName {
    pub fn classify(strokes: u32, par: u8) -> Self {
        if strokes == 1 {
            return ScoreName::HoleInOne;
        }
        match strokes as i32 - par as i32 {
            i32::MIN..=-3 => ScoreName::Albatross,
            -2 => ScoreName::Eagle,
            -1 => ScoreName::Birdie,
            0 => ScoreName::Par,
            1 => ScoreName::Bogey,
            2 => ScoreName::DoubleBogey,
            over => ScoreName::Over(over),
        }
    }

    pub fn label(&self) -> String {
        match self {
            ScoreName::HoleInOne => "Hole in one".to_string(),
            ScoreName::Albatross => "Albatross".to_string(),
            ScoreName::Eagle => "Eagle".to_string(),
            ScoreName::Birdie => "Birdie".to_string(),
            ScoreName::Par => "Par".to_string(),
            ScoreName::Bogey => "Bogey".to_string(),
            ScoreName::DoubleBogey => "Double bogey".to_string(),
            ScoreName::Over(n) => format!("+{}", n),
        }
    }
}

/// One finished hole
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoleScore {
    /// Generation seed, for replaying the hole
    pub seed: u64,
    pub par: Par,
    /// Penalties included
    pub strokes: u32,
    /// Sum of final shot scores
    pub chips: i64,
}

impl HoleScore {
    pub fn to_par(&self) -> i32 {
        self.strokes as i32 - self.par.strokes() as i32
    }

    pub fn name(&self) -> ScoreName {
        ScoreName::classify(self.strokes, self.par.strokes())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scorecard {
    pub holes: Vec<HoleScore>,
}

impl Scorecard {
    pub fn new() -> Self {
        Self { holes: Vec::new() }
    }

    /// Record a finished hole. Returns its 1-based number, or None once the
    /// round is full.
    pub fn record(&mut self, score: HoleScore) -> Option<usize> {
        if self.is_complete() {
            return None;
        }
        self.holes.push(score);
        log::info!(
            "Hole {}: {} strokes on a par {} ({})",
            self.holes.len(),
            score.strokes,
            score.par.strokes(),
            score.name().label()
        );
        Some(self.holes.len())
    }

    pub fn is_empty(&self) -> bool {
        self.holes.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.holes.len() >= MAX_HOLES
    }

    pub fn total_strokes(&self) -> u32 {
        self.holes.iter().map(|h| h.strokes).sum()
    }

    pub fn total_par(&self) -> u32 {
        self.holes.iter().map(|h| h.par.strokes() as u32).sum()
    }

    pub fn total_chips(&self) -> i64 {
        self.holes.iter().map(|h| h.chips).sum()
    }

    /// Running score relative to par
    pub fn to_par(&self) -> i32 {
        self.holes.iter().map(|h| h.to_par()).sum()
    }

    /// Best hole so far by score to par, earliest on ties
    pub fn best_hole(&self) -> Option<(usize, &HoleScore)> {
        self.holes
            .iter()
            .enumerate()
            .min_by_key(|(_, h)| h.to_par())
            .map(|(i, h)| (i + 1, h))
    }

    /// "E", "+3" or "-2"
    pub fn format_to_par(&self) -> String {
        match self.to_par() {
            0 => "E".to_string(),
            n if n > 0 => format!("+{}", n),
            n => n.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hole(par: Par, strokes: u32) -> HoleScore {
        HoleScore {
            seed: 0,
            par,
            strokes,
            chips: 10,
        }
    }

    #[test]
    fn test_score_names() {
        assert_eq!(ScoreName::classify(1, 3), ScoreName::HoleInOne);
        assert_eq!(ScoreName::classify(2, 5), ScoreName::Albatross);
        assert_eq!(ScoreName::classify(3, 5), ScoreName::Eagle);
        assert_eq!(ScoreName::classify(3, 4), ScoreName::Birdie);
        assert_eq!(ScoreName::classify(4, 4), ScoreName::Par);
        assert_eq!(ScoreName::classify(5, 4), ScoreName::Bogey);
        assert_eq!(ScoreName::classify(6, 4), ScoreName::DoubleBogey);
        assert_eq!(ScoreName::classify(8, 4), ScoreName::Over(4));
        assert_eq!(ScoreName::Over(4).label(), "+4");
    }

    #[test]
    fn test_totals() {
        let mut card = Scorecard::new();
        assert!(card.is_empty());
        assert_eq!(card.format_to_par(), "E");

        assert_eq!(card.record(hole(Par::Four, 5)), Some(1));
        assert_eq!(card.record(hole(Par::Three, 2)), Some(2));
        assert_eq!(card.record(hole(Par::Five, 5)), Some(3));

        assert_eq!(card.total_strokes(), 12);
        assert_eq!(card.total_par(), 12);
        assert_eq!(card.total_chips(), 30);
        assert_eq!(card.format_to_par(), "E");
        assert_eq!(card.best_hole().map(|(n, _)| n), Some(2));

        card.record(hole(Par::Four, 7));
        assert_eq!(card.format_to_par(), "+3");
    }

    #[test]
    fn test_round_is_capped() {
        let mut card = Scorecard::new();
        for _ in 0..MAX_HOLES {
            assert!(card.record(hole(Par::Four, 4)).is_some());
        }
        assert!(card.is_complete());
        assert_eq!(card.record(hole(Par::Four, 4)), None);
        assert_eq!(card.holes.len(), MAX_HOLES);
    }
}
