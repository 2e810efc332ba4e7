//! Formatting of per-rover reports for the output stream.

use anyhow::{Context, Result};
use clap::ValueEnum;
use rover_fleet_core::{RoverReport, RoverState};

/// Layout used when writing results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// One line per rover.
    #[default]
    Text,
    /// A JSON array of tagged report objects.
    Json,
}

/// Renders `reports` in input order using `format`.
pub(crate) fn render(reports: &[RoverReport], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(reports)),
        OutputFormat::Json => {
            let mut rendered =
                serde_json::to_string_pretty(reports).context("failed to serialise reports")?;
            rendered.push('\n');
            Ok(rendered)
        }
    }
}

fn render_text(reports: &[RoverReport]) -> String {
    let mut rendered = String::new();
    for report in reports {
        let line = match report {
            RoverReport::Succeeded { state, .. } => format_state(state),
            RoverReport::Halted { state, .. } => format!("HALTED {}", format_state(state)),
            RoverReport::Rejected { reason, .. } => format!("REJECTED: {reason}"),
        };
        rendered.push_str(&line);
        rendered.push('\n');
    }
    rendered
}

fn format_state(state: &RoverState) -> String {
    format!(
        "{} {} {}",
        state.position.x(),
        state.position.y(),
        state.heading
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_fleet_core::{Direction, FleetError, HaltCause, Position, RoverId};

    fn sample_reports() -> Vec<RoverReport> {
        vec![
            RoverReport::Succeeded {
                rover: RoverId::new(0),
                state: RoverState::new(Position::new(1, 3), Direction::South),
            },
            RoverReport::Halted {
                rover: RoverId::new(1),
                state: RoverState::new(Position::new(-2, 0), Direction::West),
                cause: HaltCause::UnsafeTerrain(Position::new(-3, 0)),
            },
            RoverReport::Rejected {
                rover: None,
                reason: FleetError::DuplicateStartPosition {
                    position: Position::new(0, 0),
                },
            },
        ]
    }

    #[test]
    fn text_output_has_one_line_per_rover() {
        let rendered = render(&sample_reports(), OutputFormat::Text).expect("text renders");

        assert_eq!(
            rendered,
            "1 3 S\nHALTED -2 0 W\nREJECTED: another rover already occupies (0, 0)\n"
        );
    }

    #[test]
    fn json_output_tags_each_outcome() {
        let rendered = render(&sample_reports(), OutputFormat::Json).expect("json renders");
        let parsed: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");

        let outcomes: Vec<&str> = parsed
            .as_array()
            .expect("array of reports")
            .iter()
            .filter_map(|report| report["outcome"].as_str())
            .collect();
        assert_eq!(outcomes, vec!["succeeded", "halted", "rejected"]);
    }

    #[test]
    fn empty_batch_renders_nothing() {
        assert_eq!(render(&[], OutputFormat::Text).expect("text renders"), "");
    }
}
