#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fleet coordination system that registers rovers and applies move batches.
//!
//! The coordinator owns the simulation context and the terrain oracle for one
//! run. It translates caller requests into world commands, then distils the
//! resulting events into one [`RoverReport`] per request.

use rover_fleet_core::{
    Command, Event, FleetError, KnownBounds, Program, RoverId, RoverReport, RoverState,
    TerrainOracle,
};
use rover_fleet_world::{self as world, query, World};
use tracing::{debug, info};

/// Starting state and instruction text for one rover of a deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployEntry {
    /// Parsed starting state, or the reason it could not be parsed.
    pub start: Result<RoverState, FleetError>,
    /// Raw instruction text, decoded when the rover is driven.
    pub instructions: String,
}

impl DeployEntry {
    /// Creates an entry from an already parsed starting state.
    #[must_use]
    pub fn new(start: RoverState, instructions: impl Into<String>) -> Self {
        Self {
            start: Ok(start),
            instructions: instructions.into(),
        }
    }
}

/// Orchestrates registration and movement for a fleet of rovers.
#[derive(Debug)]
pub struct FleetCoordinator<O> {
    world: World,
    oracle: O,
}

impl<O> FleetCoordinator<O>
where
    O: TerrainOracle,
{
    /// Creates a coordinator over an empty plateau probed through `oracle`.
    #[must_use]
    pub fn new(oracle: O) -> Self {
        Self {
            world: World::new(),
            oracle,
        }
    }

    /// Registers every starting state in order.
    ///
    /// A state whose cell is already taken is rejected with
    /// [`FleetError::DuplicateStartPosition`]; the remaining states are still
    /// registered.
    pub fn register_fleet<I>(&mut self, states: I) -> Vec<Result<RoverId, FleetError>>
    where
        I: IntoIterator<Item = RoverState>,
    {
        states
            .into_iter()
            .map(|state| self.register(state))
            .collect()
    }

    /// Drives registered rovers through their instructions, strictly in order.
    ///
    /// Each entry observes the occupancy and boundary left by earlier entries.
    /// Failures are reported per entry and never abort the batch.
    pub fn apply_batch<I, S>(&mut self, moves: I) -> Vec<RoverReport>
    where
        I: IntoIterator<Item = (RoverId, S)>,
        S: AsRef<str>,
    {
        let reports: Vec<RoverReport> = moves
            .into_iter()
            .map(|(rover, instructions)| self.drive(rover, instructions.as_ref()))
            .collect();
        log_summary("batch applied", &reports);
        reports
    }

    /// Registers a whole fleet and then drives each rover in input order.
    ///
    /// Every starting cell is reserved before any rover moves. The result
    /// holds one report per entry, in input order; entries refused at
    /// registration are reported as rejected and never driven.
    pub fn deploy<I>(&mut self, entries: I) -> Vec<RoverReport>
    where
        I: IntoIterator<Item = DeployEntry>,
    {
        let entries: Vec<DeployEntry> = entries.into_iter().collect();
        let registrations: Vec<Result<RoverId, FleetError>> = entries
            .iter()
            .map(|entry| entry.start.clone().and_then(|state| self.register(state)))
            .collect();

        let reports: Vec<RoverReport> = entries
            .iter()
            .zip(registrations)
            .map(|(entry, registration)| match registration {
                Ok(rover) => self.drive(rover, &entry.instructions),
                Err(reason) => RoverReport::Rejected {
                    rover: None,
                    reason,
                },
            })
            .collect();
        log_summary("fleet deployed", &reports);
        reports
    }

    /// Simulation context owned by the coordinator.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Last committed state of `rover`, if it was registered.
    #[must_use]
    pub fn state_of(&self, rover: RoverId) -> Option<RoverState> {
        query::rover_state(&self.world, rover)
    }

    /// Known-safe rectangle discovered so far.
    #[must_use]
    pub fn bounds(&self) -> Option<KnownBounds> {
        query::bounds(&self.world)
    }

    fn register(&mut self, state: RoverState) -> Result<RoverId, FleetError> {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::RegisterRover { state },
            &self.oracle,
            &mut events,
        );

        for event in events {
            match event {
                Event::RoverRegistered { rover, .. } => return Ok(rover),
                Event::RegistrationRejected { reason, .. } => return Err(reason),
                _ => {}
            }
        }

        // The world answers every registration with one of the two events above.
        Err(FleetError::DuplicateStartPosition {
            position: state.position,
        })
    }

    fn drive(&mut self, rover: RoverId, instructions: &str) -> RoverReport {
        if query::rover_state(&self.world, rover).is_none() {
            debug!(rover = rover.get(), "skipping unknown rover");
            return RoverReport::Rejected {
                rover: Some(rover),
                reason: FleetError::UnknownRover { rover },
            };
        }

        let program = match instructions.parse::<Program>() {
            Ok(program) => program,
            Err(reason) => {
                debug!(rover = rover.get(), %reason, "skipping malformed program");
                return RoverReport::Rejected {
                    rover: Some(rover),
                    reason,
                };
            }
        };

        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::DriveRover { rover, program },
            &self.oracle,
            &mut events,
        );
        report_from_events(rover, events)
    }
}

fn report_from_events(rover: RoverId, events: Vec<Event>) -> RoverReport {
    for event in events.into_iter().rev() {
        match event {
            Event::SequenceCompleted { rover, state } => {
                return RoverReport::Succeeded { rover, state };
            }
            Event::RoverHalted {
                rover,
                state,
                cause,
            } => {
                return RoverReport::Halted {
                    rover,
                    state,
                    cause,
                };
            }
            Event::DriveRejected { rover, reason } => {
                return RoverReport::Rejected {
                    rover: Some(rover),
                    reason,
                };
            }
            _ => {}
        }
    }

    RoverReport::Rejected {
        rover: Some(rover),
        reason: FleetError::UnknownRover { rover },
    }
}

fn log_summary(message: &str, reports: &[RoverReport]) {
    let mut succeeded = 0usize;
    let mut halted = 0usize;
    let mut rejected = 0usize;
    for report in reports {
        match report {
            RoverReport::Succeeded { .. } => succeeded += 1,
            RoverReport::Halted { .. } => halted += 1,
            RoverReport::Rejected { .. } => rejected += 1,
        }
    }

    info!(
        entries = reports.len(),
        succeeded, halted, rejected, "{message}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_fleet_core::{Direction, HaltCause, Position};

    #[test]
    fn report_prefers_the_terminal_event() {
        let rover = RoverId::new(4);
        let state = RoverState::new(Position::new(1, 1), Direction::West);
        let events = vec![
            Event::RoverTurned {
                rover,
                heading: Direction::West,
            },
            Event::RoverHalted {
                rover,
                state,
                cause: HaltCause::Occupied(Position::new(0, 1)),
            },
        ];

        assert_eq!(
            report_from_events(rover, events),
            RoverReport::Halted {
                rover,
                state,
                cause: HaltCause::Occupied(Position::new(0, 1)),
            }
        );
    }

    #[test]
    fn coordinator_starts_with_an_empty_plateau() {
        let coordinator = FleetCoordinator::new(|_: Position| true);
        assert_eq!(coordinator.bounds(), None);
        assert_eq!(coordinator.state_of(RoverId::new(0)), None);
        assert_eq!(query::rover_count(coordinator.world()), 0);
    }
}
