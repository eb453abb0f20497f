pub mod relationship_board;
pub mod toast;
