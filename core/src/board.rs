use core::ops::{Index, IndexMut};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Grid of cells in row-major order.
///
/// The topology (ids, order, neighbours) is fixed at construction; mine
/// placement only changes kinds and values, reveal/flag only change states.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
}

impl Board {
    /// All-hidden, all-safe board with precomputed adjacency.
    pub fn empty(size: Coord2) -> Self {
        let (width, height) = size;
        let cells = Array2::from_shape_fn((height.into(), width.into()), |(y, x)| {
            // both fit in `Coord` because the shape does
            Cell::new(CellId::new(x as Coord, y as Coord), size)
        });
        Self { cells }
    }

    /// Board with mines at exactly `mines` and values computed.
    pub fn from_mines(size: Coord2, mines: &[CellId]) -> Result<Self> {
        let mut board = Self::empty(size);
        for &id in mines {
            board.validate(id)?;
            board[id].kind = CellKind::Mine;
        }
        board.recompute_values();
        Ok(board)
    }

    pub fn size(&self) -> Coord2 {
        let (height, width) = self.cells.dim();
        (width as Coord, height as Coord)
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        let (width, height) = self.size();
        mult(width, height)
    }

    pub fn validate(&self, id: CellId) -> Result<CellId> {
        if id.is_within(self.size()) {
            Ok(id)
        } else {
            Err(GameError::InvalidCell)
        }
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.to_nd_index())
    }

    /// The top-left cell, auto-revealed on daily boards.
    pub fn first_cell(&self) -> CellId {
        CellId::new(0, 0)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells.iter().map(|cell| cell.id)
    }

    /// One row of cells, `y` must be in bounds.
    pub fn row(&self, y: Coord) -> impl Iterator<Item = &Cell> {
        self.cells.row(y.into()).into_iter()
    }

    pub fn neighbors(&self, id: CellId) -> &[CellId] {
        &self[id].neighbors
    }

    pub fn mine_count(&self) -> CellCount {
        self.count_where(Cell::is_mine)
    }

    pub fn count_in_state(&self, state: CellState) -> CellCount {
        self.count_where(|cell| cell.state == state)
    }

    pub fn has_revealed_mine(&self) -> bool {
        self.cells.iter().any(|cell| cell.is_mine() && cell.is_revealed())
    }

    /// Every hidden cell is a mine. Flagged cells are not checked.
    pub fn all_safe_revealed(&self) -> bool {
        self.cells
            .iter()
            .filter(|cell| cell.is_hidden())
            .all(Cell::is_mine)
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    pub(crate) fn recompute_values(&mut self) {
        let values: Array2<u8> = self.cells.map(|cell| {
            cell.neighbors
                .iter()
                .filter(|&&id| self[id].is_mine())
                .count() as u8
        });
        for (cell, &value) in self.cells.iter_mut().zip(values.iter()) {
            cell.value = value;
        }
    }

    fn count_where(&self, predicate: impl Fn(&Cell) -> bool) -> CellCount {
        self.cells.iter().filter(|&cell| predicate(cell)).count() as CellCount
    }
}

impl Index<CellId> for Board {
    type Output = Cell;

    fn index(&self, id: CellId) -> &Self::Output {
        &self.cells[id.to_nd_index()]
    }
}

impl IndexMut<CellId> for Board {
    fn index_mut(&mut self, id: CellId) -> &mut Self::Output {
        &mut self.cells[id.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn empty_board_is_row_major() {
        let board = Board::empty((3, 2));
        let ids: Vec<_> = board.cell_ids().collect();

        assert_eq!(
            ids,
            [
                CellId::new(0, 0),
                CellId::new(1, 0),
                CellId::new(2, 0),
                CellId::new(0, 1),
                CellId::new(1, 1),
                CellId::new(2, 1),
            ]
        );
        assert!(board.cells().enumerate().all(|(i, cell)| cell.order == i));
        assert!(board.cells().all(|cell| cell.is_hidden() && !cell.is_mine() && cell.value == 0));
    }

    #[test]
    fn neighbors_are_clipped_at_edges() {
        let board = Board::empty((8, 8));

        assert_eq!(board.neighbors(CellId::new(0, 0)).len(), 3);
        assert_eq!(board.neighbors(CellId::new(3, 0)).len(), 5);
        assert_eq!(board.neighbors(CellId::new(7, 4)).len(), 5);
        assert_eq!(board.neighbors(CellId::new(4, 4)).len(), 8);
        assert_eq!(board.neighbors(CellId::new(7, 7)).len(), 3);
    }

    #[test]
    fn values_count_adjacent_mines() {
        let board = Board::from_mines((3, 3), &[CellId::new(0, 0), CellId::new(2, 2)]).unwrap();

        assert_eq!(board[CellId::new(1, 1)].value, 2);
        assert_eq!(board[CellId::new(2, 0)].value, 0);
        assert_eq!(board[CellId::new(1, 0)].value, 1);
        assert_eq!(board.mine_count(), 2);
    }

    #[test]
    fn out_of_bounds_cells_are_rejected() {
        let board = Board::empty((4, 3));

        assert_eq!(board.validate(CellId::new(3, 2)), Ok(CellId::new(3, 2)));
        assert_eq!(board.validate(CellId::new(4, 0)), Err(GameError::InvalidCell));
        assert!(board.get(CellId::new(0, 3)).is_none());
        assert_eq!(
            Board::from_mines((2, 2), &[CellId::new(2, 2)]),
            Err(GameError::InvalidCell)
        );
    }
}
