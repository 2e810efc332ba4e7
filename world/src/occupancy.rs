//! Fleet-wide record of which cells currently hold a rover.

use std::collections::BTreeSet;

use rover_fleet_core::{FleetError, Position};

/// Set of cells reserved by live rovers.
///
/// Each live rover holds exactly one reservation. A rover releases its cell
/// before it moves and reserves the cell it ends on, halted or not.
#[derive(Clone, Debug, Default)]
pub struct OccupancyTracker {
    cells: BTreeSet<Position>,
}

impl OccupancyTracker {
    /// Creates a tracker with no reservations.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: BTreeSet::new(),
        }
    }

    /// Reserves `cell`, failing if another rover already holds it.
    pub fn reserve(&mut self, cell: Position) -> Result<(), FleetError> {
        if self.cells.insert(cell) {
            Ok(())
        } else {
            Err(FleetError::PositionOccupied { position: cell })
        }
    }

    /// Releases `cell`. Releasing a free cell does nothing.
    pub fn release(&mut self, cell: Position) {
        let _ = self.cells.remove(&cell);
    }

    /// Reports whether a rover currently holds `cell`.
    #[must_use]
    pub fn is_occupied(&self, cell: Position) -> bool {
        self.cells.contains(&cell)
    }

    /// Number of reserved cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cell is reserved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterator over the reserved cells in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_reservation_is_refused() {
        let mut occupancy = OccupancyTracker::new();
        let cell = Position::new(1, 1);

        assert_eq!(occupancy.reserve(cell), Ok(()));
        assert_eq!(
            occupancy.reserve(cell),
            Err(FleetError::PositionOccupied { position: cell })
        );
        assert_eq!(occupancy.len(), 1);
    }

    #[test]
    fn release_frees_the_cell() {
        let mut occupancy = OccupancyTracker::new();
        let cell = Position::new(-2, 7);
        occupancy.reserve(cell).expect("free cell");

        occupancy.release(cell);

        assert!(!occupancy.is_occupied(cell));
        assert!(occupancy.is_empty());
        assert_eq!(occupancy.reserve(cell), Ok(()));
    }

    #[test]
    fn releasing_a_free_cell_is_harmless() {
        let mut occupancy = OccupancyTracker::new();
        occupancy.reserve(Position::new(0, 0)).expect("free cell");

        occupancy.release(Position::new(5, 5));

        assert_eq!(occupancy.iter().collect::<Vec<_>>(), vec![Position::new(0, 0)]);
    }
}
