use crate::*;
pub use shuffle::*;

mod shuffle;

/// Assigns mines to an empty board once the first revealed cell is known.
pub trait LayoutGenerator {
    fn generate(self, config: &BoardConfig, board: Board) -> Result<Board>;
}

/// Places `config.mines` mines on `board`, never on `first_cell`, using the
/// seeded shuffle so the same inputs always give the same layout.
pub fn place_mines(config: &BoardConfig, board: Board, first_cell: CellId) -> Result<Board> {
    ShuffleLayoutGenerator::new(config.seed, first_cell).generate(config, board)
}
