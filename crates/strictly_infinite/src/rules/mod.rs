//! Game rules for infinite-mode tic-tac-toe.
//!
//! Pure functions for evaluating a board. Rules are separated from
//! board storage so the state machine and the invariants share them.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, WinningLine, check_winner, check_winner_through};
