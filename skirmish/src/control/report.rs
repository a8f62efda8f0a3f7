use std::fmt;

use serde::{Deserialize, Serialize};

const GAMES_HEADER: &str = "Games Played      Average Cumulative Reward";
const GAMES_RULE: &str = "-------------     -------------------------";
const GAMES_COLUMN: usize = 18;
/// Learning episodes played between two evaluation windows.
pub const GAMES_PER_POINT: usize = 10;

/// Mean evaluation reward after each evaluation window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LearningCurve {
    points: Vec<f64>,
}

impl LearningCurve {
    pub fn push(&mut self, mean: f64) {
        self.points.push(mean);
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl fmt::Display for LearningCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{GAMES_HEADER}")?;
        writeln!(f, "{GAMES_RULE}")?;
        for (i, mean) in self.points.iter().enumerate() {
            writeln!(f, "{:<GAMES_COLUMN$}{:.2}", GAMES_PER_POINT * i, mean)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_are_aligned_under_the_header() {
        let mut curve = LearningCurve::default();
        curve.push(-312.456);
        curve.push(17.5);
        curve.push(120.0);

        let table = curve.to_string();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], GAMES_HEADER);
        assert_eq!(lines[2], GAMES_RULE);
        assert_eq!(lines[3], "0                 -312.46");
        assert_eq!(lines[4], "10                17.50");
        assert_eq!(lines[5], "20                120.00");
    }
}
