use alloc::collections::VecDeque;
use hashbrown::HashSet;

use crate::*;

impl Board {
    /// Toggles `hidden ⇄ flagged`, revealed cells are left alone.
    pub fn toggle_flag(&mut self, id: CellId) -> Result<MarkOutcome> {
        use CellState::*;
        use MarkOutcome::*;

        let id = self.validate(id)?;
        let cell = &mut self[id];

        Ok(match cell.state {
            Hidden => {
                cell.state = Flagged;
                Changed
            }
            Flagged => {
                cell.state = Hidden;
                Changed
            }
            Revealed => NoChange,
        })
    }

    /// Reveals a cell, cascading over zero-valued cells according to
    /// `cascade`. Revealing a flagged cell only removes the flag.
    pub fn reveal(&mut self, id: CellId, cascade: Cascade) -> Result<RevealOutcome> {
        use RevealOutcome::*;

        let id = self.validate(id)?;
        let cell = &self[id];
        let (state, is_mine, value) = (cell.state, cell.is_mine(), cell.value);

        Ok(match state {
            CellState::Revealed => NoChange,
            CellState::Flagged => {
                self[id].state = CellState::Hidden;
                Unflagged
            }
            CellState::Hidden if is_mine => {
                self[id].state = CellState::Revealed;
                log::debug!("Revealed mine at {}", id);
                HitMine
            }
            CellState::Hidden if value > 0 => {
                self[id].state = CellState::Revealed;
                Revealed
            }
            CellState::Hidden => {
                self.flood_fill(id, cascade);
                Revealed
            }
        })
    }

    /// Breadth-first reveal starting at the zero-valued cell `start`.
    fn flood_fill(&mut self, start: CellId, cascade: Cascade) {
        let mut visited: HashSet<CellId> = HashSet::new();
        visited.insert(start);
        let mut to_visit = VecDeque::from([start]);
        let mut opened = 0usize;

        while let Some(visit_id) = to_visit.pop_front() {
            let cell = &mut self[visit_id];
            if cell.is_hidden() {
                cell.state = CellState::Revealed;
                opened += 1;
            }

            let expands = match cascade {
                Cascade::Standard | Cascade::ZeroOnly => cell.value == 0,
                Cascade::Unbounded => true,
            };
            if !expands {
                continue;
            }

            let neighbors = self[visit_id].neighbors.clone();
            for neighbor in neighbors {
                let next = &self[neighbor];
                // flags survive a cascade
                if next.is_mine() || next.is_flagged() || visited.contains(&neighbor) {
                    continue;
                }
                if matches!(cascade, Cascade::ZeroOnly) && next.value > 0 {
                    continue;
                }
                visited.insert(neighbor);
                to_visit.push_back(neighbor);
            }
        }

        log::trace!("Flood fill from {} opened {} cells", start, opened);
    }

    /// Flags every unrevealed mine, used when a game is won.
    pub(crate) fn flag_remaining_mines(&mut self) {
        for cell in self.cells_mut() {
            if cell.is_mine() && cell.is_hidden() {
                cell.state = CellState::Flagged;
            }
        }
    }

    /// Reveals every mine, used when a game is lost.
    pub(crate) fn reveal_all_mines(&mut self) {
        for cell in self.cells_mut() {
            if cell.is_mine() {
                cell.state = CellState::Revealed;
            }
        }
    }
}

/// Snapshot form of [`Board::reveal`], leaving `board` untouched.
pub fn reveal_cell(board: &Board, id: CellId, cascade: Cascade) -> Result<(Board, RevealOutcome)> {
    let mut next = board.clone();
    let outcome = next.reveal(id, cascade)?;
    Ok((next, outcome))
}

/// Snapshot form of [`Board::toggle_flag`], leaving `board` untouched.
pub fn flag_cell(board: &Board, id: CellId) -> Result<(Board, MarkOutcome)> {
    let mut next = board.clone();
    let outcome = next.toggle_flag(id)?;
    Ok((next, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn layout(size: Coord2, mines: &[(Coord, Coord)]) -> Board {
        let mines: Vec<_> = mines.iter().map(|&(x, y)| CellId::new(x, y)).collect();
        Board::from_mines(size, &mines).unwrap()
    }

    fn revealed(board: &Board) -> Vec<CellId> {
        board.cells().filter(|cell| cell.is_revealed()).map(|cell| cell.id).collect()
    }

    #[test]
    fn reveal_hits_mine() {
        let mut board = layout((2, 2), &[(0, 0)]);

        let outcome = board.reveal(CellId::new(0, 0), Cascade::Standard).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert!(board.has_revealed_mine());
        assert_eq!(revealed(&board), [CellId::new(0, 0)]);
    }

    #[test]
    fn numbered_cell_reveals_alone() {
        let mut board = layout((3, 3), &[(2, 2)]);

        board.reveal(CellId::new(1, 1), Cascade::Standard).unwrap();

        assert_eq!(revealed(&board), [CellId::new(1, 1)]);
    }

    #[test]
    fn flood_fill_opens_zero_region_and_boundary() {
        // . . . . .
        // . . . . .
        // . . . 1 1
        // . . . 1 *
        let mut board = layout((5, 4), &[(4, 3)]);

        board.reveal(CellId::new(0, 0), Cascade::Standard).unwrap();

        assert_eq!(board.count_in_state(CellState::Revealed), 19);
        assert!(board[CellId::new(3, 2)].is_revealed());
        assert!(board[CellId::new(4, 3)].is_hidden());
        assert!(board.all_safe_revealed());
    }

    #[test]
    fn flood_fill_stops_at_numbered_wall() {
        // . 1 * 1 .
        // . 1 1 1 .
        // . . . . .
        let mut board = layout((5, 3), &[(2, 0)]);
        let mut walled = layout((5, 3), &[(2, 0), (2, 2)]);

        board.reveal(CellId::new(0, 0), Cascade::Standard).unwrap();
        walled.reveal(CellId::new(0, 0), Cascade::Standard).unwrap();

        assert!(board.all_safe_revealed());
        assert!(walled[CellId::new(1, 1)].is_revealed());
        assert!(walled[CellId::new(3, 0)].is_hidden());
        assert!(walled[CellId::new(4, 1)].is_hidden());
    }

    #[test]
    fn flagged_cells_survive_cascade() {
        let mut board = layout((4, 4), &[(3, 3)]);
        board.toggle_flag(CellId::new(1, 1)).unwrap();

        board.reveal(CellId::new(0, 0), Cascade::Standard).unwrap();

        assert!(board[CellId::new(1, 1)].is_flagged());
        assert!(board[CellId::new(2, 2)].is_revealed());
    }

    #[test]
    fn zero_only_cascade_leaves_numbers_hidden() {
        let mut board = layout((5, 4), &[(4, 3)]);

        board.reveal(CellId::new(0, 0), Cascade::ZeroOnly).unwrap();

        assert!(board[CellId::new(2, 2)].is_revealed());
        assert!(board[CellId::new(3, 2)].is_hidden());
        assert_eq!(board.count_in_state(CellState::Revealed), 16);
    }

    #[test]
    fn unbounded_cascade_crosses_numbered_cells() {
        let mut board = layout((5, 3), &[(2, 0), (2, 2)]);

        board.reveal(CellId::new(0, 0), Cascade::Unbounded).unwrap();

        assert!(board.all_safe_revealed());
    }

    #[test]
    fn reveal_on_flag_unflags() {
        let mut board = layout((3, 3), &[(2, 2)]);
        let id = CellId::new(0, 0);

        assert_eq!(board.toggle_flag(id).unwrap(), MarkOutcome::Changed);
        assert_eq!(board.reveal(id, Cascade::Standard).unwrap(), RevealOutcome::Unflagged);

        assert!(board[id].is_hidden());
        assert!(revealed(&board).is_empty());
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut board = layout((5, 4), &[(4, 3)]);
        board.reveal(CellId::new(0, 0), Cascade::Standard).unwrap();
        let before = board.clone();

        for id in before.cell_ids() {
            if before[id].is_revealed() {
                assert_eq!(board.reveal(id, Cascade::Standard).unwrap(), RevealOutcome::NoChange);
            }
        }
        assert_eq!(board, before);
    }

    #[test]
    fn flag_toggles_and_ignores_revealed() {
        let mut board = layout((3, 3), &[(2, 2)]);
        let id = CellId::new(0, 2);

        board.toggle_flag(id).unwrap();
        assert!(board[id].is_flagged());
        board.toggle_flag(id).unwrap();
        assert!(board[id].is_hidden());

        board.reveal(CellId::new(1, 1), Cascade::Standard).unwrap();
        assert_eq!(board.toggle_flag(CellId::new(1, 1)).unwrap(), MarkOutcome::NoChange);
    }

    #[test]
    fn snapshot_helpers_leave_input_untouched() {
        let board = layout((3, 3), &[(2, 2)]);

        let (next, outcome) = reveal_cell(&board, CellId::new(0, 0), Cascade::Standard).unwrap();
        assert_eq!(outcome, RevealOutcome::Revealed);
        assert!(board.cells().all(Cell::is_hidden));
        assert!(next[CellId::new(0, 0)].is_revealed());

        let (flagged, _) = flag_cell(&board, CellId::new(2, 2)).unwrap();
        assert!(flagged[CellId::new(2, 2)].is_flagged());
        assert!(board[CellId::new(2, 2)].is_hidden());
    }

    #[test]
    fn out_of_bounds_moves_fail() {
        let mut board = layout((3, 3), &[(2, 2)]);
        assert_eq!(board.reveal(CellId::new(3, 0), Cascade::Standard), Err(GameError::InvalidCell));
        assert_eq!(board.toggle_flag(CellId::new(0, 3)), Err(GameError::InvalidCell));
    }
}
