//! Chess record handling shared by the annotator and the server:
//! PGN parsing, mainline replay, playback cursor and the persisted
//! annotation shape.

pub use shakmaty;

pub mod cursor;
pub mod error;
pub mod game_data;
pub mod pgn;
pub mod position;
