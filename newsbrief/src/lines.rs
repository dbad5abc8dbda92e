//! Coerce free-form model output into exactly three lines.

use serde::Serialize;
use std::fmt;

/// Filler used when the model output has fewer than three facts
pub const NO_ADDITIONAL_INFO: &str = "No additional information";

/// Characters stripped from the start of every line (bullets, dashes, indentation)
const LINE_DECORATION: &[char] = &[' ', '\t', '-', '•', '*', '·', '–', '—'];

/// Exactly three non-empty summary lines, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryResult {
    lines: [String; 3],
}

impl SummaryResult {
    /// Callers must supply non-blank lines; construction stays inside the crate.
    pub(crate) fn from_lines(lines: [String; 3]) -> Self {
        debug_assert!(lines.iter().all(|l| !l.trim().is_empty()));
        Self { lines }
    }

    /// First three non-blank entries of `lines`, topped up with `filler`
    pub(crate) fn padded(lines: impl IntoIterator<Item = String>, filler: &str) -> Self {
        let mut lines = lines.into_iter().filter(|l| !l.trim().is_empty());
        let mut next = || lines.next().unwrap_or_else(|| filler.to_string());
        Self::from_lines([next(), next(), next()])
    }

    pub fn lines(&self) -> &[String; 3] {
        &self.lines
    }

    pub fn into_lines(self) -> [String; 3] {
        self.lines
    }
}

impl fmt::Display for SummaryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}\n{}", self.lines[0], self.lines[1], self.lines[2])
    }
}

/// Total function: any input yields three non-empty lines.
///
/// With three or more usable lines the first three are kept as-is. Otherwise
/// the remaining text is re-split on sentence ends and padded with
/// [`NO_ADDITIONAL_INFO`].
pub fn normalize_to_three_lines(raw: &str) -> SummaryResult {
    let lines: Vec<&str> = raw
        .lines()
        .map(|line| line.trim_start_matches(LINE_DECORATION).trim_end())
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() >= 3 {
        return SummaryResult::from_lines([
            lines[0].to_string(),
            lines[1].to_string(),
            lines[2].to_string(),
        ]);
    }

    let joined = lines.join(" ").replace('?', ".");
    let parts = joined
        .split('.')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string);

    SummaryResult::padded(parts, NO_ADDITIONAL_INFO)
}
