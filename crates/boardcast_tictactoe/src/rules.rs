//! Win and draw rules.

mod draw;
mod win;

pub use draw::is_full;
pub use win::{LINES, check_winner};
