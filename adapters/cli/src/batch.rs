//! Reader for the line-oriented batch format.
//!
//! Non-blank lines alternate between a starting triple (`x y H`) and the
//! instruction text for that rover. Lines are trimmed and upper-cased before
//! parsing.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use rover_fleet_core::RoverState;
use rover_fleet_system_fleet::DeployEntry;
use thiserror::Error;

/// File-level problems that make a batch unusable as a whole.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum BatchError {
    /// The last start line has no instruction line to pair with.
    #[error("line {line}: start position has no matching instruction line")]
    UnpairedLine {
        /// One-based line number of the dangling start line.
        line: usize,
    },
}

/// Reads and parses the batch stored at `path`.
pub(crate) fn read_batch(path: &Path) -> Result<Vec<DeployEntry>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read batch file at {}", path.display()))?;
    parse_batch(&contents)
        .with_context(|| format!("failed to parse batch file at {}", path.display()))
}

/// Pairs start lines with instruction lines.
///
/// A malformed start line does not fail the batch; it becomes an entry whose
/// start carries the parse error so the rover is reported as rejected.
pub(crate) fn parse_batch(contents: &str) -> Result<Vec<DeployEntry>, BatchError> {
    let lines: Vec<(usize, String)> = contents
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let cleaned = line.trim().to_uppercase();
            (!cleaned.is_empty()).then_some((index + 1, cleaned))
        })
        .collect();

    if lines.len() % 2 != 0 {
        let line = lines.last().map_or(0, |(number, _)| *number);
        return Err(BatchError::UnpairedLine { line });
    }

    Ok(lines
        .chunks_exact(2)
        .map(|pair| DeployEntry {
            start: pair[0].1.parse::<RoverState>(),
            instructions: pair[1].1.clone(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_fleet_core::{Direction, FleetError, Position};

    #[test]
    fn pairs_lines_and_skips_blanks() {
        let entries = parse_batch("0 0 n\nmmrm\n\n   \n5 3 S\r\nRMMRMLLMMMM\n").expect("valid batch");

        assert_eq!(
            entries,
            vec![
                DeployEntry::new(
                    RoverState::new(Position::new(0, 0), Direction::North),
                    "MMRM"
                ),
                DeployEntry::new(
                    RoverState::new(Position::new(5, 3), Direction::South),
                    "RMMRMLLMMMM"
                ),
            ]
        );
    }

    #[test]
    fn malformed_start_becomes_a_rejected_entry() {
        let entries = parse_batch("1 two N\nMM\n").expect("pairing is intact");

        assert_eq!(
            entries[0].start,
            Err(FleetError::MalformedStart {
                line: "1 TWO N".to_owned()
            })
        );
        assert_eq!(entries[0].instructions, "MM");
    }

    #[test]
    fn dangling_start_line_fails_the_batch() {
        assert_eq!(
            parse_batch("0 0 N\nMM\n\n3 3 E\n"),
            Err(BatchError::UnpairedLine { line: 4 })
        );
    }

    #[test]
    fn empty_batch_has_no_entries() {
        assert_eq!(parse_batch("\n\n"), Ok(Vec::new()));
    }
}
