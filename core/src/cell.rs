use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Player-visible state of a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellState {
    #[default]
    Hidden,
    Flagged,
    Revealed,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellKind {
    Mine,
    #[default]
    Safe,
}

/// Neighbour ids of a cell; never more than 8.
pub type Neighbors = SmallVec<[CellId; 8]>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    /// Row-major position, stable across mine placement.
    pub order: usize,
    pub neighbors: Neighbors,
    pub state: CellState,
    pub kind: CellKind,
    /// Number of neighbouring mines.
    pub value: u8,
}

impl Cell {
    pub fn new(id: CellId, size: Coord2) -> Self {
        Self {
            id,
            order: id.order(size.0),
            neighbors: NeighborIter::new(id, size).collect(),
            state: CellState::Hidden,
            kind: CellKind::Safe,
            value: 0,
        }
    }

    pub const fn x(&self) -> Coord {
        self.id.x
    }

    pub const fn y(&self) -> Coord {
        self.id.y
    }

    pub const fn is_mine(&self) -> bool {
        matches!(self.kind, CellKind::Mine)
    }

    pub const fn is_hidden(&self) -> bool {
        matches!(self.state, CellState::Hidden)
    }

    pub const fn is_flagged(&self) -> bool {
        matches!(self.state, CellState::Flagged)
    }

    pub const fn is_revealed(&self) -> bool {
        matches!(self.state, CellState::Revealed)
    }
}
