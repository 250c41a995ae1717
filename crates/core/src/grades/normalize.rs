//! Score normalization and grade point bands.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

/// Label table used when no custom table is supplied.
pub static DEFAULT_SCORE_TABLE: LazyLock<ScoreTable> = LazyLock::new(ScoreTable::default);

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("static pattern is valid"));

/// Grade point bands as (minimum score, grade point), highest first.
const GRADE_POINT_BANDS: [(i64, i64); 8] = [
    (95, 40),
    (90, 37),
    (85, 33),
    (80, 30),
    (75, 27),
    (70, 23),
    (65, 20),
    (60, 10),
];

/// Maps letter and pass/fail labels to numeric scores.
#[derive(Debug, Clone)]
pub struct ScoreTable {
    labels: HashMap<String, Decimal>,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self::empty()
            .with_label("优秀", Decimal::from(95))
            .with_label("良好", Decimal::from(85))
            .with_label("中等", Decimal::from(75))
            .with_label("及格", Decimal::from(65))
            .with_label("不及格", Decimal::from(50))
            .with_label("通过", Decimal::from(80))
            .with_label("未通过", Decimal::from(50))
    }
}

impl ScoreTable {
    /// Creates a table with no labels; only numeric scores are recognized.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            labels: HashMap::new(),
        }
    }

    /// Adds or replaces a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>, score: Decimal) -> Self {
        self.labels.insert(label.into(), score);
        self
    }

    /// Converts a raw score to a number. Never fails.
    ///
    /// Tries the label table first, then the first number in the string, and
    /// returns zero when neither matches.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> Decimal {
        let raw = raw.trim();
        if let Some(score) = self.labels.get(raw) {
            return *score;
        }

        FIRST_NUMBER
            .find(raw)
            .and_then(|m| Decimal::from_str(m.as_str()).ok())
            .unwrap_or(Decimal::ZERO)
    }
}

/// Normalizes a raw score with the default label table.
#[must_use]
pub fn normalize_score(raw: &str) -> Decimal {
    DEFAULT_SCORE_TABLE.normalize(raw)
}

/// Maps a numeric score to a grade point on the 4.0 scale.
#[must_use]
pub fn score_to_grade_point(score: Decimal) -> Decimal {
    GRADE_POINT_BANDS
        .iter()
        .find(|(min, _)| score >= Decimal::from(*min))
        .map_or(Decimal::ZERO, |(_, tenths)| Decimal::new(*tenths, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("优秀", dec!(95))]
    #[case("良好", dec!(85))]
    #[case("中等", dec!(75))]
    #[case("及格", dec!(65))]
    #[case("不及格", dec!(50))]
    #[case("通过", dec!(80))]
    #[case("未通过", dec!(50))]
    #[case(" 良好 ", dec!(85))]
    #[case("88", dec!(88))]
    #[case("92.5", dec!(92.5))]
    #[case("缓考(76)", dec!(76))]
    #[case("", dec!(0))]
    #[case("缺考", dec!(0))]
    fn test_normalize_score(#[case] raw: &str, #[case] expected: Decimal) {
        assert_eq!(normalize_score(raw), expected);
    }

    #[rstest]
    #[case(dec!(100), dec!(4.0))]
    #[case(dec!(95), dec!(4.0))]
    #[case(dec!(94.9), dec!(3.7))]
    #[case(dec!(90), dec!(3.7))]
    #[case(dec!(88), dec!(3.3))]
    #[case(dec!(80), dec!(3.0))]
    #[case(dec!(75), dec!(2.7))]
    #[case(dec!(70), dec!(2.3))]
    #[case(dec!(65), dec!(2.0))]
    #[case(dec!(60), dec!(1.0))]
    #[case(dec!(59.9), dec!(0))]
    #[case(dec!(0), dec!(0))]
    fn test_score_to_grade_point(#[case] score: Decimal, #[case] expected: Decimal) {
        assert_eq!(score_to_grade_point(score), expected);
    }

    #[test]
    fn test_custom_table() {
        let table = ScoreTable::empty().with_label("A", dec!(93));
        assert_eq!(table.normalize("A"), dec!(93));
        assert_eq!(table.normalize("优秀"), dec!(0));
    }

    #[test]
    fn test_bands_are_monotonic() {
        let mut previous = Decimal::ZERO;
        for score in 0..=100 {
            let gp = score_to_grade_point(Decimal::from(score));
            assert!(gp >= previous, "grade point dropped at score {score}");
            previous = gp;
        }
    }
}
