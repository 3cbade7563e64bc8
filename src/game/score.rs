//! Player scores and the winning screen model

use super::ball::BallColor;

/// The three-digit score shown next to each platform
///
/// Leading zeros are hidden, zero shows a single `0`, and only the lowest
/// three digits of larger scores are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreDisplay {
    pub digits: [Option<u8>; 3],
}

impl ScoreDisplay {
    #[must_use]
    pub fn from_score(score: u32) -> Self {
        let mut digits = [None; 3];
        if score == 0 {
            digits[2] = Some(0);
            return Self { digits };
        }

        let mut rest = score;
        for slot in digits.iter_mut().rev() {
            if rest == 0 {
                break;
            }
            *slot = Some((rest % 10) as u8);
            rest /= 10;
        }
        Self { digits }
    }

    /// Digits as text, hidden slots as spaces
    #[must_use]
    pub fn text(&self) -> String {
        self.digits
            .iter()
            .map(|d| d.map_or(' ', |d| char::from(b'0' + d)))
            .collect()
    }
}

/// One row on the winning screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreEntry {
    pub score: u32,
    pub color: BallColor,
}

/// Final scores, highest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreModel {
    entries: Vec<ScoreEntry>,
}

impl ScoreModel {
    /// Replace the rows, sorting them by descending score
    pub fn set_scores(&mut self, scores: impl IntoIterator<Item = ScoreEntry>) {
        self.entries.clear();
        self.entries.extend(scores);
        // Stable, so ties keep platform order
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
    }

    #[must_use]
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_hides_leading_zeros() {
        assert_eq!(ScoreDisplay::from_score(0).text(), "  0");
        assert_eq!(ScoreDisplay::from_score(7).text(), "  7");
        assert_eq!(ScoreDisplay::from_score(40).text(), " 40");
        assert_eq!(ScoreDisplay::from_score(105).text(), "105");
        assert_eq!(
            ScoreDisplay::from_score(105).digits,
            [Some(1), Some(0), Some(5)]
        );
    }

    #[test]
    fn test_display_keeps_low_digits() {
        assert_eq!(ScoreDisplay::from_score(1234).text(), "234");
        assert_eq!(ScoreDisplay::from_score(1000).text(), "000");
    }

    #[test]
    fn test_model_sorts_descending() {
        let mut model = ScoreModel::default();
        model.set_scores([
            ScoreEntry { score: 3, color: BallColor::Yellow },
            ScoreEntry { score: 9, color: BallColor::Red },
            ScoreEntry { score: 3, color: BallColor::Blue },
            ScoreEntry { score: 5, color: BallColor::Green },
        ]);

        let scores: Vec<_> = model.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![9, 5, 3, 3]);
        assert_eq!(model.entries()[2].color, BallColor::Yellow);

        model.set_scores([ScoreEntry { score: 1, color: BallColor::Red }]);
        assert_eq!(model.len(), 1);
    }
}
