use alloc::vec::Vec;

use super::*;

/// Shuffles every cell with a seeded Fisher–Yates pass and mines the first
/// cells of the shuffled order, skipping the starting cell.
#[derive(Clone, Debug, PartialEq)]
pub struct ShuffleLayoutGenerator {
    seed: i64,
    first_cell: CellId,
}

impl ShuffleLayoutGenerator {
    pub fn new(seed: i64, first_cell: CellId) -> Self {
        Self { seed, first_cell }
    }
}

fn shuffle<T>(items: &mut [T], rng: &mut MersenneTwister) {
    for i in (1..items.len()).rev() {
        let j = (rng.next_f64() * (i + 1) as f64) as usize;
        items.swap(i, j);
    }
}

impl LayoutGenerator for ShuffleLayoutGenerator {
    fn generate(self, config: &BoardConfig, mut board: Board) -> Result<Board> {
        let first_cell = board.validate(self.first_cell)?;
        if board.size() != config.size() {
            return Err(GameError::InvalidConfig);
        }

        let target = config.placeable_mines();
        if target < config.mines {
            log::warn!(
                "Board too small, requested {} mines but only {} fit next to the first cell",
                config.mines,
                target
            );
        }

        let mut order: Vec<CellId> = board.cell_ids().collect();
        let mut rng = MersenneTwister::from_seed(self.seed);
        shuffle(&mut order, &mut rng);

        let mut placed: CellCount = 0;
        for id in order {
            board[id].kind = if id == first_cell || placed == target {
                CellKind::Safe
            } else {
                placed += 1;
                CellKind::Mine
            };
        }
        board.recompute_values();

        log::debug!(
            "Placed {} mines with seed {}, first cell {}",
            placed,
            self.seed,
            first_cell
        );
        Ok(board)
    }
}
