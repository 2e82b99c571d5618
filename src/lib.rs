//! Bitboard chess position engine: pseudo-legal move generation over
//! fancy magic bitboards, incremental Zobrist hashing, Chess960 castling
//! with Shredder-FEN/X-FEN serialization, and a perft driver.

pub mod game;
pub mod search;
