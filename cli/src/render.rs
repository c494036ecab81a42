use dailymines_core::{Board, Cell, CellState, GameState, Phase};
use dailymines_protocol::format_duration;
use std::fmt::Write;

const fn glyph(cell: &Cell) -> char {
    match cell.state {
        CellState::Hidden => '#',
        CellState::Flagged => 'F',
        CellState::Revealed if cell.is_mine() => '*',
        CellState::Revealed if cell.value == 0 => '.',
        CellState::Revealed => (b'0' + cell.value) as char,
    }
}

/// Text grid with column and row numbers.
pub fn board(board: &Board) -> String {
    let mut out = String::from("    ");
    for x in 0..board.width() {
        let _ = write!(out, "{:>3}", x);
    }
    out.push('\n');

    for y in 0..board.height() {
        let _ = write!(out, "{:>3} ", y);
        for cell in board.row(y) {
            let _ = write!(out, "{:>3}", glyph(cell));
        }
        out.push('\n');
    }
    out
}

/// One-line summary: mines left, time, and phase.
pub fn status(state: &GameState, now: chrono::DateTime<chrono::Utc>) -> String {
    let phase = match state.phase() {
        Phase::Idle => "idle",
        Phase::InProgress => "playing",
        Phase::Won => "won",
        Phase::Lost => "lost",
    };
    format!(
        "mines left: {}  time: {}  {}",
        state.mines_left(),
        format_duration(state.elapsed_ms(now)),
        phase
    )
}
