#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the rover fleet simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the fleet coordinator. Callers submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! every transition it performed. The terrain the rovers explore is consulted
//! only through the [`TerrainOracle`] seam.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Places a new rover on the plateau at the provided state.
    RegisterRover {
        /// Position and heading the rover starts with.
        state: RoverState,
    },
    /// Runs a parsed instruction program on a registered rover.
    DriveRover {
        /// Identifier of the rover to drive.
        rover: RoverId,
        /// Instructions evaluated left to right.
        program: Program,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a rover was placed on the plateau.
    RoverRegistered {
        /// Identifier allocated to the rover by the world.
        rover: RoverId,
        /// State the rover starts with.
        state: RoverState,
    },
    /// Reports that a registration request was refused.
    RegistrationRejected {
        /// State supplied with the refused registration.
        state: RoverState,
        /// Specific reason the registration failed.
        reason: FleetError,
    },
    /// Confirms that a rover rotated in place.
    RoverTurned {
        /// Identifier of the rover that turned.
        rover: RoverId,
        /// Heading after the rotation.
        heading: Direction,
    },
    /// Confirms that a rover moved between two adjacent cells.
    RoverAdvanced {
        /// Identifier of the rover that advanced.
        rover: RoverId,
        /// Cell the rover occupied before moving.
        from: Position,
        /// Cell the rover occupies after the move.
        to: Position,
    },
    /// Announces that the known-safe rectangle grew to include a new cell.
    BoundaryExpanded {
        /// Cell whose observation widened the rectangle.
        cell: Position,
        /// Rectangle after the expansion.
        bounds: KnownBounds,
    },
    /// Reports that a rover stopped before finishing its program.
    RoverHalted {
        /// Identifier of the rover that halted.
        rover: RoverId,
        /// Last safe state of the rover.
        state: RoverState,
        /// Obstruction that stopped the rover.
        cause: HaltCause,
    },
    /// Confirms that a rover executed every instruction of its program.
    SequenceCompleted {
        /// Identifier of the rover that finished.
        rover: RoverId,
        /// Final state of the rover.
        state: RoverState,
    },
    /// Reports that a drive request was refused before any instruction ran.
    DriveRejected {
        /// Identifier supplied with the refused request.
        rover: RoverId,
        /// Specific reason the request failed.
        reason: FleetError,
    },
}

/// Cardinal headings available to rovers, in clockwise order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Facing toward increasing `y`.
    North,
    /// Facing toward increasing `x`.
    East,
    /// Facing toward decreasing `y`.
    South,
    /// Facing toward decreasing `x`.
    West,
}

impl Direction {
    /// Every heading in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Position of the heading in the clockwise cycle, within `0..4`.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Resolves a heading from its position in the clockwise cycle.
    pub fn from_index(index: u8) -> Result<Self, FleetError> {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .ok_or_else(|| FleetError::InvalidDirection {
                symbol: index.to_string(),
            })
    }

    /// Rotates the heading by `delta` quarter turns clockwise.
    ///
    /// Negative deltas rotate counter-clockwise. The result always wraps back
    /// into the four cardinal headings.
    #[must_use]
    pub fn rotate(self, delta: i32) -> Self {
        let turned = (i32::from(self.index()) + delta.rem_euclid(4)) % 4;
        match turned {
            0 => Self::North,
            1 => Self::East,
            2 => Self::South,
            _ => Self::West,
        }
    }

    /// Heading after a single counter-clockwise quarter turn.
    #[must_use]
    pub fn left(self) -> Self {
        self.rotate(-1)
    }

    /// Heading after a single clockwise quarter turn.
    #[must_use]
    pub fn right(self) -> Self {
        self.rotate(1)
    }

    /// Offset of a single step along the heading.
    ///
    /// North is increasing `y`: N=(0,1), E=(1,0), S=(0,-1), W=(-1,0).
    #[must_use]
    pub const fn unit_vector(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }

    /// Single-letter symbol used by the batch text format.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::North => 'N',
            Self::East => 'E',
            Self::South => 'S',
            Self::West => 'W',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Direction {
    type Err = FleetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "N" => Ok(Self::North),
            "E" => Ok(Self::East),
            "S" => Ok(Self::South),
            "W" => Ok(Self::West),
            other => Err(FleetError::InvalidDirection {
                symbol: other.to_owned(),
            }),
        }
    }
}

/// Unique identifier assigned to a rover at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoverId(u32);

impl RoverId {
    /// Creates a new rover identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RoverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of a single plateau cell on the unbounded integer lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new lattice position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate, growing eastward.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate, growing northward.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Cell one step away along `heading`.
    ///
    /// Returns `None` when the step would leave the `i32` coordinate range.
    #[must_use]
    pub fn neighbor(self, heading: Direction) -> Option<Self> {
        let (dx, dy) = heading.unit_vector();
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Position and heading of a single rover.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoverState {
    /// Cell the rover occupies.
    pub position: Position,
    /// Direction the rover faces.
    pub heading: Direction,
}

impl RoverState {
    /// Creates a rover state from its parts.
    #[must_use]
    pub const fn new(position: Position, heading: Direction) -> Self {
        Self { position, heading }
    }
}

impl FromStr for RoverState {
    type Err = FleetError;

    /// Parses the `x y H` triple used by batch files.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || FleetError::MalformedStart {
            line: line.to_owned(),
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [x, y, heading] = fields.as_slice() else {
            return Err(malformed());
        };

        let x = x.parse::<i32>().map_err(|_| malformed())?;
        let y = y.parse::<i32>().map_err(|_| malformed())?;
        let heading = heading.parse::<Direction>()?;
        Ok(Self::new(Position::new(x, y), heading))
    }
}

/// Single step of a rover program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Rotate a quarter turn counter-clockwise.
    Left,
    /// Rotate a quarter turn clockwise.
    Right,
    /// Advance one cell along the current heading.
    Move,
}

impl Instruction {
    /// Decodes a single instruction symbol found at `index` in a program.
    pub fn from_symbol(symbol: char, index: usize) -> Result<Self, FleetError> {
        match symbol {
            'L' => Ok(Self::Left),
            'R' => Ok(Self::Right),
            'M' => Ok(Self::Move),
            symbol => Err(FleetError::MalformedInstruction { symbol, index }),
        }
    }

    /// Symbol used by the batch text format.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Left => 'L',
            Self::Right => 'R',
            Self::Move => 'M',
        }
    }
}

/// Ordered instruction sequence evaluated left to right.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Creates a program from already decoded instructions.
    #[must_use]
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Iterator over the instructions in execution order.
    pub fn iter(&self) -> impl Iterator<Item = Instruction> + '_ {
        self.instructions.iter().copied()
    }

    /// Number of instructions in the program.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Reports whether the program contains no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl FromStr for Program {
    type Err = FleetError;

    /// Decodes every symbol up front so a bad symbol rejects the whole program.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        text.chars()
            .enumerate()
            .map(|(index, symbol)| Instruction::from_symbol(symbol, index))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            write!(f, "{}", instruction.symbol())?;
        }
        Ok(())
    }
}

/// Inclusive axis-aligned rectangle of cells confirmed traversable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KnownBounds {
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
}

impl KnownBounds {
    /// Rectangle covering exactly one cell.
    #[must_use]
    pub const fn from_cell(cell: Position) -> Self {
        Self {
            min_x: cell.x(),
            max_x: cell.x(),
            min_y: cell.y(),
            max_y: cell.y(),
        }
    }

    /// Smallest rectangle covering both `self` and `cell`.
    #[must_use]
    pub fn including(self, cell: Position) -> Self {
        Self {
            min_x: self.min_x.min(cell.x()),
            max_x: self.max_x.max(cell.x()),
            min_y: self.min_y.min(cell.y()),
            max_y: self.max_y.max(cell.y()),
        }
    }

    /// Reports whether `cell` lies inside the rectangle, edges included.
    #[must_use]
    pub const fn contains(&self, cell: Position) -> bool {
        cell.x() >= self.min_x
            && cell.x() <= self.max_x
            && cell.y() >= self.min_y
            && cell.y() <= self.max_y
    }

    /// Smallest `x` covered by the rectangle.
    #[must_use]
    pub const fn min_x(&self) -> i32 {
        self.min_x
    }

    /// Largest `x` covered by the rectangle.
    #[must_use]
    pub const fn max_x(&self) -> i32 {
        self.max_x
    }

    /// Smallest `y` covered by the rectangle.
    #[must_use]
    pub const fn min_y(&self) -> i32 {
        self.min_y
    }

    /// Largest `y` covered by the rectangle.
    #[must_use]
    pub const fn max_y(&self) -> i32 {
        self.max_y
    }

    /// Number of cells covered by the rectangle.
    ///
    /// A rectangle spanning the whole `i32` lattice holds 2^64 cells, which
    /// does not fit a `u64`.
    #[must_use]
    pub fn area(&self) -> u128 {
        let width = u128::from(self.min_x.abs_diff(self.max_x)) + 1;
        let height = u128::from(self.min_y.abs_diff(self.max_y)) + 1;
        width * height
    }
}

/// Obstruction that stopped a rover mid-program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltCause {
    /// Another rover occupies the cell ahead.
    Occupied(Position),
    /// The terrain oracle reported the cell ahead as unsafe.
    UnsafeTerrain(Position),
    /// The step would leave the representable coordinate range.
    LatticeEdge,
}

impl fmt::Display for HaltCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Occupied(cell) => write!(f, "cell {cell} is occupied"),
            Self::UnsafeTerrain(cell) => write!(f, "terrain at {cell} is unsafe"),
            Self::LatticeEdge => write!(f, "edge of the coordinate range"),
        }
    }
}

/// Terminal result of running a program on a rover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Every instruction executed.
    Succeeded(RoverState),
    /// The rover stopped at its last safe state.
    Halted {
        /// State before the blocked step.
        state: RoverState,
        /// Obstruction that blocked the step.
        cause: HaltCause,
    },
}

impl MoveOutcome {
    /// State the rover ends up in, whichever way the program finished.
    #[must_use]
    pub const fn state(&self) -> RoverState {
        match self {
            Self::Succeeded(state) | Self::Halted { state, .. } => *state,
        }
    }
}

/// Per-rover result handed to output collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoverReport {
    /// The rover executed its full program.
    Succeeded {
        /// Identifier of the rover.
        rover: RoverId,
        /// Final state.
        state: RoverState,
    },
    /// The rover stopped at its last safe state.
    Halted {
        /// Identifier of the rover.
        rover: RoverId,
        /// Last safe state.
        state: RoverState,
        /// Obstruction that stopped the rover.
        cause: HaltCause,
    },
    /// The entry was refused before the rover moved.
    Rejected {
        /// Identifier of the rover, when one was ever allocated.
        rover: Option<RoverId>,
        /// Specific reason the entry was refused.
        reason: FleetError,
    },
}

/// Errors reported for a single registration or batch entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetError {
    /// A program contained a symbol outside `L`, `R` and `M`.
    #[error("malformed instruction `{symbol}` at index {index}")]
    MalformedInstruction {
        /// Offending symbol.
        symbol: char,
        /// Zero-based offset of the symbol in the program text.
        index: usize,
    },
    /// A heading symbol or index did not name one of the four headings.
    #[error("invalid direction `{symbol}`")]
    InvalidDirection {
        /// Offending symbol.
        symbol: String,
    },
    /// A rover attempted to register on a cell another rover occupies.
    #[error("another rover already occupies {position}")]
    DuplicateStartPosition {
        /// Contested starting cell.
        position: Position,
    },
    /// A cell reservation collided with an existing reservation.
    #[error("position {position} is already reserved")]
    PositionOccupied {
        /// Contested cell.
        position: Position,
    },
    /// A batch entry referenced a rover that was never registered.
    #[error("rover {rover} was never registered")]
    UnknownRover {
        /// Identifier supplied with the entry.
        rover: RoverId,
    },
    /// Every rover identifier has already been allocated.
    #[error("no rover identifiers remain")]
    RoverIdsExhausted,
    /// A starting line did not follow the `x y H` layout.
    #[error("malformed start position `{line}`")]
    MalformedStart {
        /// Offending line.
        line: String,
    },
}

/// Capability that answers whether a plateau cell is safe to enter.
///
/// The simulation never inspects the oracle beyond its answer. Any
/// `Fn(Position) -> bool` closure is an oracle.
pub trait TerrainOracle {
    /// Reports whether `cell` is safe to enter.
    fn is_traversable(&self, cell: Position) -> bool;

    /// Reports whether unsafe cells may lie between safe ones.
    ///
    /// The known-safe rectangle only vouches for its interior when the safe
    /// terrain has no holes. An oracle returning `true` is consulted for every
    /// step, including steps inside the rectangle.
    fn has_interior_hazards(&self) -> bool {
        false
    }
}

impl<F> TerrainOracle for F
where
    F: Fn(Position) -> bool,
{
    fn is_traversable(&self, cell: Position) -> bool {
        self(cell)
    }
}
