//! Known-safe rectangle that grows as rovers probe new terrain.

use rover_fleet_core::{KnownBounds, Position};

/// Union of every cell confirmed traversable, summarised as a rectangle.
///
/// The rectangle is a lower bound on safe terrain, not a wall: cells outside
/// it are unknown rather than unsafe, and entering one requires a live terrain
/// check. Once a cell is inside, it stays inside for the lifetime of the model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundaryModel {
    bounds: Option<KnownBounds>,
}

impl BoundaryModel {
    /// Creates a model that has not observed any cell yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { bounds: None }
    }

    /// Widens the rectangle to include `cell`.
    ///
    /// Returns `true` when the rectangle changed. Observing a cell already
    /// inside is a no-op.
    pub fn observe(&mut self, cell: Position) -> bool {
        let widened = match self.bounds {
            None => KnownBounds::from_cell(cell),
            Some(bounds) => bounds.including(cell),
        };

        let changed = self.bounds != Some(widened);
        self.bounds = Some(widened);
        changed
    }

    /// Reports whether `cell` lies inside the rectangle confirmed so far.
    #[must_use]
    pub fn is_within_known(&self, cell: Position) -> bool {
        self.bounds.is_some_and(|bounds| bounds.contains(cell))
    }

    /// Current rectangle, or `None` before the first observation.
    #[must_use]
    pub const fn bounds(&self) -> Option<KnownBounds> {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_model_knows_nothing() {
        let boundary = BoundaryModel::new();
        assert!(!boundary.is_within_known(Position::new(0, 0)));
        assert_eq!(boundary.bounds(), None);
    }

    #[test]
    fn observation_covers_the_spanned_rectangle() {
        let mut boundary = BoundaryModel::new();
        assert!(boundary.observe(Position::new(0, 0)));
        assert!(boundary.observe(Position::new(2, -3)));

        assert!(boundary.is_within_known(Position::new(1, -1)));
        assert!(boundary.is_within_known(Position::new(2, 0)));
        assert!(!boundary.is_within_known(Position::new(3, 0)));
        assert!(!boundary.is_within_known(Position::new(0, 1)));
    }

    #[test]
    fn repeated_observation_is_idempotent() {
        let mut boundary = BoundaryModel::new();
        assert!(boundary.observe(Position::new(4, 4)));
        let before = boundary.clone();

        assert!(!boundary.observe(Position::new(4, 4)));
        assert_eq!(boundary, before);
    }

    #[test]
    fn interior_observation_leaves_rectangle_unchanged() {
        let mut boundary = BoundaryModel::new();
        let _ = boundary.observe(Position::new(0, 0));
        let _ = boundary.observe(Position::new(5, 5));

        assert!(!boundary.observe(Position::new(2, 3)));
    }

    proptest! {
        #[test]
        fn area_never_shrinks(cells in prop::collection::vec((-50i32..50, -50i32..50), 1..40)) {
            let mut boundary = BoundaryModel::new();
            let mut previous_area = 0u128;
            let mut observed = Vec::new();

            for (x, y) in cells {
                let cell = Position::new(x, y);
                let _ = boundary.observe(cell);
                observed.push(cell);

                let area = boundary.bounds().map_or(0, |bounds| bounds.area());
                prop_assert!(area >= previous_area);
                previous_area = area;

                for seen in &observed {
                    prop_assert!(boundary.is_within_known(*seen));
                }
            }
        }
    }
}
