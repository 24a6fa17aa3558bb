use crate::state::Position;

/// Line-of-sight oracle over two 3D points.
pub trait SightOracle: Send + Sync {
    fn has_line_of_sight(&self, from: Position, to: Position) -> bool;
}

/// One step returned by the movement collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathStep {
    pub position: Position,
    /// Extra movement points charged on top of the base step (doors).
    pub extra_cost: u32,
}

impl PathStep {
    pub const fn new(position: Position) -> Self {
        Self {
            position,
            extra_cost: 0,
        }
    }

    /// Total movement points to take the step.
    pub fn cost(&self) -> u32 {
        1 + self.extra_cost
    }
}

/// A ledge the mover can voluntarily drop from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropOption {
    pub landing: Position,
    /// Levels fallen.
    pub fall_height: u32,
}

/// Movement and pathing collaborator.
///
/// The engine only asks for the next step and pays the cost; route planning
/// stays on the other side of this trait.
pub trait PathingOracle: Send + Sync {
    /// Next passable step from `from` toward `to` that avoids `occupied`.
    fn next_step(&self, from: Position, to: Position, occupied: &[Position]) -> Option<PathStep>;

    /// Passable neighbouring tiles, used for wandering.
    fn neighbours(&self, from: Position) -> Vec<Position>;

    /// Ledges reachable from `from` that lead down one or more levels.
    fn drop_options(&self, _from: Position) -> Vec<DropOption> {
        Vec::new()
    }
}
