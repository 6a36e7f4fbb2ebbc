pub use chess_core;

pub mod analysis;
pub mod analyzer;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod stockfish;
