#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation context for the rover fleet.
//!
//! A [`World`] owns the known-safe boundary, the occupancy tracker and the
//! registry of rovers for one simulation run. Independent worlds share no
//! state. All mutation flows through [`apply`]; [`query`] exposes read-only
//! views.

pub mod boundary;
pub mod motion;
pub mod occupancy;

use rover_fleet_core::{Command, Event, FleetError, Program, RoverId, RoverState, TerrainOracle};
use tracing::{debug, error, info};

use crate::{boundary::BoundaryModel, motion::MotionEngine, occupancy::OccupancyTracker};

/// Represents the authoritative state of one simulation run.
#[derive(Clone, Debug, Default)]
pub struct World {
    boundary: BoundaryModel,
    occupancy: OccupancyTracker,
    rovers: Vec<Rover>,
}

impl World {
    /// Creates an empty world: no rovers and no known terrain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn rover_mut(&mut self, rover: RoverId) -> Option<&mut Rover> {
        let index = usize::try_from(rover.get()).ok()?;
        self.rovers.get_mut(index)
    }

    fn register(&mut self, state: RoverState, out_events: &mut Vec<Event>) {
        let Some(rover) = next_rover_id(self.rovers.len()) else {
            info!("registration rejected: rover identifiers exhausted");
            out_events.push(Event::RegistrationRejected {
                state,
                reason: FleetError::RoverIdsExhausted,
            });
            return;
        };

        if self.occupancy.reserve(state.position).is_err() {
            info!(
                x = state.position.x(),
                y = state.position.y(),
                "registration rejected: start cell already occupied"
            );
            out_events.push(Event::RegistrationRejected {
                state,
                reason: FleetError::DuplicateStartPosition {
                    position: state.position,
                },
            });
            return;
        }

        self.rovers.push(Rover { id: rover, state });

        if self.boundary.observe(state.position) {
            if let Some(bounds) = self.boundary.bounds() {
                out_events.push(Event::BoundaryExpanded {
                    cell: state.position,
                    bounds,
                });
            }
        }

        debug!(rover = rover.get(), "rover registered");
        out_events.push(Event::RoverRegistered { rover, state });
    }

    fn drive<O>(
        &mut self,
        rover: RoverId,
        program: &Program,
        oracle: &O,
        out_events: &mut Vec<Event>,
    ) where
        O: TerrainOracle + ?Sized,
    {
        let Some(start) = self.rover_mut(rover).map(|entry| entry.state) else {
            info!(rover = rover.get(), "drive rejected: unknown rover");
            out_events.push(Event::DriveRejected {
                rover,
                reason: FleetError::UnknownRover { rover },
            });
            return;
        };

        self.occupancy.release(start.position);
        let outcome = MotionEngine::new(&mut self.boundary, &self.occupancy, oracle).run(
            rover,
            start,
            program,
            out_events,
        );
        let end = outcome.state();

        if let Err(reason) = self.occupancy.reserve(end.position) {
            error!(rover = rover.get(), %reason, "rover ended on a reserved cell");
        }
        if let Some(entry) = self.rover_mut(rover) {
            entry.state = end;
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// `oracle` is consulted only while driving a rover toward a cell outside the
/// known-safe rectangle, unless it reports interior hazards. One command runs
/// to completion before the next one starts, so a rover's whole program
/// executes without interleaving.
pub fn apply<O>(world: &mut World, command: Command, oracle: &O, out_events: &mut Vec<Event>)
where
    O: TerrainOracle + ?Sized,
{
    match command {
        Command::RegisterRover { state } => world.register(state, out_events),
        Command::DriveRover { rover, program } => world.drive(rover, &program, oracle, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use rover_fleet_core::{KnownBounds, Position, RoverId, RoverState};

    use super::World;

    /// Current known-safe rectangle, or `None` before any rover registered.
    #[must_use]
    pub fn bounds(world: &World) -> Option<KnownBounds> {
        world.boundary.bounds()
    }

    /// Reports whether `cell` lies inside the known-safe rectangle.
    #[must_use]
    pub fn is_within_known(world: &World, cell: Position) -> bool {
        world.boundary.is_within_known(cell)
    }

    /// Reports whether a rover currently occupies `cell`.
    #[must_use]
    pub fn is_occupied(world: &World, cell: Position) -> bool {
        world.occupancy.is_occupied(cell)
    }

    /// Cells currently reserved by rovers, in ascending order.
    #[must_use]
    pub fn occupied_cells(world: &World) -> Vec<Position> {
        world.occupancy.iter().collect()
    }

    /// Current state of `rover`, or `None` if it was never registered.
    #[must_use]
    pub fn rover_state(world: &World, rover: RoverId) -> Option<RoverState> {
        let index = usize::try_from(rover.get()).ok()?;
        world.rovers.get(index).map(|entry| entry.state)
    }

    /// Number of registered rovers.
    #[must_use]
    pub fn rover_count(world: &World) -> usize {
        world.rovers.len()
    }

    /// Captures a read-only view of every registered rover.
    #[must_use]
    pub fn rover_view(world: &World) -> RoverView {
        RoverView {
            snapshots: world
                .rovers
                .iter()
                .map(|entry| RoverSnapshot {
                    id: entry.id,
                    state: entry.state,
                })
                .collect(),
        }
    }

    /// Read-only snapshot describing all rovers on the plateau.
    #[derive(Clone, Debug, Default)]
    pub struct RoverView {
        snapshots: Vec<RoverSnapshot>,
    }

    impl RoverView {
        /// Iterator over the captured snapshots in registration order.
        pub fn iter(&self) -> impl Iterator<Item = &RoverSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<RoverSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single rover used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct RoverSnapshot {
        /// Identifier allocated at registration.
        pub id: RoverId,
        /// Last committed position and heading.
        pub state: RoverState,
    }
}

/// Identifier for the rover registered after `registered` others.
fn next_rover_id(registered: usize) -> Option<RoverId> {
    u32::try_from(registered).ok().map(RoverId::new)
}

#[derive(Clone, Debug)]
struct Rover {
    id: RoverId,
    state: RoverState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_fleet_core::{Direction, HaltCause, Position};

    fn open_terrain(_: Position) -> bool {
        true
    }

    fn register(world: &mut World, x: i32, y: i32, heading: Direction) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::RegisterRover {
                state: RoverState::new(Position::new(x, y), heading),
            },
            &open_terrain,
            &mut events,
        );
        events
    }

    #[test]
    fn registration_allocates_sequential_ids() {
        let mut world = World::new();

        let first = register(&mut world, 0, 0, Direction::North);
        let second = register(&mut world, 3, 1, Direction::West);

        assert!(first.contains(&Event::RoverRegistered {
            rover: RoverId::new(0),
            state: RoverState::new(Position::new(0, 0), Direction::North),
        }));
        assert!(second.contains(&Event::RoverRegistered {
            rover: RoverId::new(1),
            state: RoverState::new(Position::new(3, 1), Direction::West),
        }));
        assert_eq!(query::rover_count(&world), 2);
    }

    #[test]
    fn registration_seeds_the_boundary() {
        let mut world = World::new();
        assert_eq!(query::bounds(&world), None);

        let events = register(&mut world, -2, 5, Direction::East);

        assert!(query::is_within_known(&world, Position::new(-2, 5)));
        assert!(matches!(
            events.first(),
            Some(Event::BoundaryExpanded { .. })
        ));
    }

    #[test]
    fn duplicate_start_is_rejected_without_side_effects() {
        let mut world = World::new();
        let _ = register(&mut world, 0, 0, Direction::North);

        let events = register(&mut world, 0, 0, Direction::East);

        assert_eq!(
            events,
            vec![Event::RegistrationRejected {
                state: RoverState::new(Position::new(0, 0), Direction::East),
                reason: FleetError::DuplicateStartPosition {
                    position: Position::new(0, 0),
                },
            }]
        );
        assert_eq!(query::rover_count(&world), 1);
        assert_eq!(query::occupied_cells(&world), vec![Position::new(0, 0)]);
    }

    #[test]
    fn rover_ids_stop_at_the_u32_limit() {
        assert_eq!(next_rover_id(0), Some(RoverId::new(0)));
        assert_eq!(
            next_rover_id(u32::MAX as usize),
            Some(RoverId::new(u32::MAX))
        );
        if let Some(beyond) = (u32::MAX as usize).checked_add(1) {
            assert_eq!(next_rover_id(beyond), None);
        }
    }

    #[test]
    fn driving_an_unknown_rover_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::DriveRover {
                rover: RoverId::new(9),
                program: "M".parse().expect("valid program"),
            },
            &open_terrain,
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::DriveRejected {
                rover: RoverId::new(9),
                reason: FleetError::UnknownRover {
                    rover: RoverId::new(9),
                },
            }]
        );
    }

    #[test]
    fn halted_rover_keeps_its_last_safe_cell() {
        let mut world = World::new();
        let _ = register(&mut world, 0, 0, Direction::North);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::DriveRover {
                rover: RoverId::new(0),
                program: "MMM".parse().expect("valid program"),
            },
            &|cell: Position| cell.y() < 2,
            &mut events,
        );

        let expected = RoverState::new(Position::new(0, 1), Direction::North);
        assert_eq!(
            events.last(),
            Some(&Event::RoverHalted {
                rover: RoverId::new(0),
                state: expected,
                cause: HaltCause::UnsafeTerrain(Position::new(0, 2)),
            })
        );
        assert_eq!(query::rover_state(&world, RoverId::new(0)), Some(expected));
        assert_eq!(query::occupied_cells(&world), vec![Position::new(0, 1)]);
    }
}
