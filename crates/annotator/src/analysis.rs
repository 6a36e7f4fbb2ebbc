//! Score conversion and naming.
//! Pure functions only, no engine or store access.

use serde::{Deserialize, Serialize};

/// Logistic slope mapping centipawns to an expected score
const CP_EXPECTATION_SLOPE: f64 = 0.003_682_08;

/// Display names accumulate whole moves until at least this many characters
const DISPLAY_NAME_MIN_LEN: usize = 10;

/// Expected score in [0.0, 1.0] from White's perspective.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Evaluation(f64);

impl Evaluation {
    /// Clamp into [0.0, 1.0]; NaN becomes an even position.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.5);
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Same evaluation seen from the other side.
    pub fn flipped(self) -> Self {
        Self(1.0 - self.0)
    }
}

/// Raw score from one engine search, relative to the side to move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineScore {
    /// Centipawn score
    pub cp: Option<i32>,
    /// Mate in N (positive = side to move mates, 0 or negative = gets mated)
    pub mate: Option<i32>,
    /// Win/draw/loss, per mille as reported by Stockfish
    pub wdl: Option<(u32, u32, u32)>,
}

impl EngineScore {
    pub fn is_empty(&self) -> bool {
        self.cp.is_none() && self.mate.is_none() && self.wdl.is_none()
    }

    /// Expected score for the side to move. Prefers the engine's own WDL
    /// estimate, then mate scores, then the centipawn logistic.
    pub fn expectation(&self) -> Option<f64> {
        if let Some((w, d, l)) = self.wdl {
            let total = (w + d + l) as f64;
            if total > 0.0 {
                return Some((w as f64 + d as f64 / 2.0) / total);
            }
        }
        if let Some(mate) = self.mate {
            return Some(if mate > 0 { 1.0 } else { 0.0 });
        }
        self.cp.map(cp_to_expectation)
    }
}

/// Convert a centipawn score into an expected score for the same side.
pub fn cp_to_expectation(cp: i32) -> f64 {
    1.0 / (1.0 + (-CP_EXPECTATION_SLOPE * cp as f64).exp())
}

/// White-perspective evaluation of a side-to-move engine score.
pub fn white_evaluation(score: &EngineScore, white_to_move: bool) -> Option<Evaluation> {
    let own = Evaluation::new(score.expectation()?);
    Some(if white_to_move { own } else { own.flipped() })
}

/// Concatenate whole moves until the name reaches the minimum length.
/// The last move taken is never cut, so the name may overshoot.
pub fn display_name<S: AsRef<str>>(sans: &[S]) -> String {
    let mut name = String::new();
    for san in sans {
        if name.chars().count() >= DISPLAY_NAME_MIN_LEN {
            break;
        }
        name.push_str(san.as_ref());
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_is_clamped() {
        assert_eq!(Evaluation::new(1.7).value(), 1.0);
        assert_eq!(Evaluation::new(-0.2).value(), 0.0);
        assert_eq!(Evaluation::new(f64::NAN).value(), 0.5);
        assert_eq!(Evaluation::new(0.25).flipped().value(), 0.75);
    }

    #[test]
    fn test_wdl_expectation() {
        let score = EngineScore {
            cp: Some(35),
            mate: None,
            wdl: Some((400, 500, 100)),
        };
        assert!((score.expectation().unwrap() - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_mate_expectation() {
        let winning = EngineScore { mate: Some(3), ..Default::default() };
        let losing = EngineScore { mate: Some(-2), ..Default::default() };
        let mated = EngineScore { mate: Some(0), ..Default::default() };
        assert_eq!(winning.expectation(), Some(1.0));
        assert_eq!(losing.expectation(), Some(0.0));
        assert_eq!(mated.expectation(), Some(0.0));
    }

    #[test]
    fn test_cp_expectation() {
        assert!((cp_to_expectation(0) - 0.5).abs() < 1e-9);
        assert!(cp_to_expectation(300) > 0.7);
        assert!(cp_to_expectation(-300) < 0.3);
        assert!((cp_to_expectation(150) + cp_to_expectation(-150) - 1.0).abs() < 1e-9);
        assert!(cp_to_expectation(i32::MAX) <= 1.0);
        assert!(cp_to_expectation(i32::MIN) >= 0.0);
    }

    #[test]
    fn test_empty_score_has_no_expectation() {
        let score = EngineScore::default();
        assert!(score.is_empty());
        assert_eq!(score.expectation(), None);
        assert_eq!(white_evaluation(&score, true), None);
    }

    #[test]
    fn test_white_perspective() {
        let score = EngineScore { cp: Some(200), ..Default::default() };
        let as_white = white_evaluation(&score, true).unwrap().value();
        let as_black = white_evaluation(&score, false).unwrap().value();
        assert!(as_white > 0.5);
        assert!((as_white + as_black - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(&["e4", "e5", "Nf3"]), "e4e5Nf3");
        assert_eq!(display_name(&["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"]), "e4e5Nf3Nc6");
        // overshoots rather than cutting a move
        assert_eq!(display_name(&["d4", "Nf6", "c4", "e6", "Nc3"]), "d4Nf6c4e6Nc3");
        assert_eq!(display_name::<&str>(&[]), "");
    }
}
