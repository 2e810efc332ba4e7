//! Per-rover motion state machine.
//!
//! The engine walks a single rover through its program one instruction at a
//! time. Turns always succeed. A move first checks occupancy, then consults the
//! terrain oracle when the cell ahead lies outside the known-safe rectangle,
//! or on every step for oracles with interior hazards. The first blocked move halts the rover at its last safe state
//! and the remaining instructions are discarded.

use rover_fleet_core::{
    Event, HaltCause, Instruction, MoveOutcome, Program, RoverId, RoverState, TerrainOracle,
};
use tracing::{debug, trace};

use crate::{boundary::BoundaryModel, occupancy::OccupancyTracker};

/// Steps rovers through their programs against shared plateau knowledge.
///
/// The engine borrows the boundary mutably because a successful probe widens
/// it for every rover. Occupancy is borrowed immutably: the caller releases
/// the rover's own cell before driving and reserves the resulting cell after.
#[derive(Debug)]
pub struct MotionEngine<'a, O: ?Sized> {
    boundary: &'a mut BoundaryModel,
    occupancy: &'a OccupancyTracker,
    oracle: &'a O,
}

impl<'a, O> MotionEngine<'a, O>
where
    O: TerrainOracle + ?Sized,
{
    /// Creates an engine over the provided plateau knowledge.
    pub fn new(
        boundary: &'a mut BoundaryModel,
        occupancy: &'a OccupancyTracker,
        oracle: &'a O,
    ) -> Self {
        Self {
            boundary,
            occupancy,
            oracle,
        }
    }

    /// Runs `program` for `rover` starting from `start`.
    ///
    /// Every transition is appended to `out_events`, ending with exactly one
    /// [`Event::RoverHalted`] or [`Event::SequenceCompleted`].
    pub fn run(
        &mut self,
        rover: RoverId,
        start: RoverState,
        program: &Program,
        out_events: &mut Vec<Event>,
    ) -> MoveOutcome {
        let mut state = start;

        for instruction in program.iter() {
            match instruction {
                Instruction::Left => {
                    state.heading = state.heading.left();
                    out_events.push(Event::RoverTurned {
                        rover,
                        heading: state.heading,
                    });
                }
                Instruction::Right => {
                    state.heading = state.heading.right();
                    out_events.push(Event::RoverTurned {
                        rover,
                        heading: state.heading,
                    });
                }
                Instruction::Move => {
                    if let Err(cause) = self.advance(rover, &mut state, out_events) {
                        debug!(
                            rover = rover.get(),
                            x = state.position.x(),
                            y = state.position.y(),
                            heading = %state.heading,
                            %cause,
                            "rover halted"
                        );
                        out_events.push(Event::RoverHalted {
                            rover,
                            state,
                            cause,
                        });
                        return MoveOutcome::Halted { state, cause };
                    }
                }
            }
        }

        out_events.push(Event::SequenceCompleted { rover, state });
        MoveOutcome::Succeeded(state)
    }

    fn advance(
        &mut self,
        rover: RoverId,
        state: &mut RoverState,
        out_events: &mut Vec<Event>,
    ) -> Result<(), HaltCause> {
        let from = state.position;
        let candidate = from.neighbor(state.heading).ok_or(HaltCause::LatticeEdge)?;

        if self.occupancy.is_occupied(candidate) {
            return Err(HaltCause::Occupied(candidate));
        }

        let known = self.boundary.is_within_known(candidate);
        if !known || self.oracle.has_interior_hazards() {
            if !self.oracle.is_traversable(candidate) {
                return Err(HaltCause::UnsafeTerrain(candidate));
            }

            if !known && self.boundary.observe(candidate) {
                if let Some(bounds) = self.boundary.bounds() {
                    trace!(x = candidate.x(), y = candidate.y(), "boundary expanded");
                    out_events.push(Event::BoundaryExpanded {
                        cell: candidate,
                        bounds,
                    });
                }
            }
        }

        state.position = candidate;
        out_events.push(Event::RoverAdvanced {
            rover,
            from,
            to: candidate,
        });
        Ok(())
    }
}
