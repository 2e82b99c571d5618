// src/game/io.rs

use std::fmt;

use colored::*;

use crate::game::board::Position;
use crate::game::defs::{self, CastleRights, CastleSide, Color, FlipType, Piece, PieceType, Square};
use crate::game::zobrist::zobrist;

// ############################
//       FEN PARSING
// ############################

impl Position {
    /// Parses a six-field FEN string into a fresh position.
    /// Returns `Err` if the FEN string is invalid.
    pub fn from_fen(fen: &str) -> Result<Position, String> {
        let mut pos = Position::empty(false);
        pos.load_fen(fen)?;
        Ok(pos)
    }

    /// Like `from_fen`, but the position will serialize its castle field
    /// with file letters (Shredder-FEN) instead of K/Q.
    pub fn from_shredder_fen(fen: &str) -> Result<Position, String> {
        let mut pos = Position::empty(true);
        pos.load_fen(fen)?;
        Ok(pos)
    }

    /// Re-initializes in place from a FEN string. The undo stacks are
    /// cleared; this is the only way to continue past MAX_PLY.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), String> {
        self.piece_bbs = [crate::game::board::BitBoard::EMPTY; Piece::COUNT];
        self.color_bbs = [crate::game::board::BitBoard::EMPTY; 2];
        self.piece_list = [None; 64];
        self.castle = CastleRights::NONE;
        self.ep_square = None;
        self.rule50 = 0;
        self.start_movenum = 0;
        self.hash = 0;
        self.state_hist.clear();
        self.move_hist.clear();
        self.castle_king_sqs = [None; 2];
        self.castle_rook_sqs = [[None; 2]; 2];

        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(format!("FEN must have 6 fields, got {}", fields.len()));
        }
        let [placement, color_field, castle_field, ep_field, rule50_field, movenum_field] =
            [fields[0], fields[1], fields[2], fields[3], fields[4], fields[5]];

        // Ranks come in FEN order (8 first); each rank field is consumed in
        // reverse so squares are placed h to a, counting down from h8. The
        // serializer mirrors this exactly.
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(format!("FEN placement must have 8 ranks, got {}", ranks.len()));
        }
        let mut sq_idx: i32 = 63;
        for rank_field in &ranks {
            for ch in rank_field.chars().rev() {
                if let Some(digit) = ch.to_digit(10) {
                    if digit == 0 || digit > 8 {
                        return Err(format!("bad empty-run digit '{ch}'"));
                    }
                    sq_idx -= digit as i32;
                } else {
                    let pc = Piece::from_char(ch)
                        .ok_or_else(|| format!("unknown piece character '{ch}'"))?;
                    if sq_idx < 0 {
                        return Err("FEN placement overflows the board".to_string());
                    }
                    self.place_piece(Square(sq_idx as u8), pc);
                    sq_idx -= 1;
                }
            }
        }
        if sq_idx != -1 {
            return Err("FEN placement does not cover 64 squares".to_string());
        }

        self.side_to_move = match color_field {
            "w" => Color::White,
            "b" => {
                self.hash ^= zobrist().side_key();
                Color::Black
            }
            _ => return Err(format!("bad side-to-move field '{color_field}'")),
        };

        if castle_field != "-" {
            for ch in castle_field.chars() {
                self.load_castle_char(ch)?;
            }
        }
        self.hash ^= zobrist().castle_key(self.castle);

        self.ep_square = match ep_field {
            "-" => None,
            s => {
                let sq =
                    Square::parse(s).ok_or_else(|| format!("bad en-passant field '{s}'"))?;
                Some(sq)
            }
        };
        if let Some(ep) = self.ep_square {
            self.hash ^= zobrist().ep_key(ep);
        }

        self.rule50 = rule50_field
            .parse()
            .map_err(|_| format!("bad half-move clock '{rule50_field}'"))?;
        self.start_movenum = movenum_field
            .parse()
            .map_err(|_| format!("bad move number '{movenum_field}'"))?;

        Ok(())
    }

    fn load_castle_char(&mut self, ch: char) -> Result<(), String> {
        let color = if ch.is_ascii_uppercase() { Color::White } else { Color::Black };
        let ch = ch.to_ascii_uppercase();
        let back_rank: u8 = if color == Color::White { 0 } else { 7 };
        let rank_bb = crate::game::board::BitBoard::from_rank(back_rank);

        let king_bb = self.pieces(color, PieceType::King);
        if king_bb.count() != 1 {
            return Err("castle rights without exactly one king".to_string());
        }
        let king_sq = king_bb.lsb().expect("king present");

        let rooks_on_rank = self.pieces(color, PieceType::Rook) & rank_bb;

        let (rook_sq, side) = match ch {
            // K/Q name the outermost rook of that wing
            'K' => (rooks_on_rank.msb(), CastleSide::King),
            'Q' => (rooks_on_rank.lsb(), CastleSide::Queen),
            'A'..='H' => {
                let file = ch as u8 - b'A';
                let rook_sq = Square::from_file_rank(file, back_rank);
                let side = if rook_sq < king_sq { CastleSide::Queen } else { CastleSide::King };
                (Some(rook_sq), side)
            }
            _ => return Err(format!("bad castle field character '{ch}'")),
        };
        let rook_sq = rook_sq.ok_or("castle rights without a rook on the back rank")?;

        self.castle_king_sqs[color as usize] = Some(king_sq);
        self.castle_rook_sqs[color as usize][side as usize] = Some(rook_sq);
        self.castle.insert(CastleRights::make(color, side));
        Ok(())
    }

    // ############################
    //       FEN PRINTING
    // ############################

    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        let mut empty_run = 0;
        for sq_idx in 0..64u8 {
            let fen_sq = Square(sq_idx).flip(FlipType::Vertical);

            match self.piece_on(fen_sq) {
                None => empty_run += 1,
                Some(pc) => {
                    if empty_run > 0 {
                        fen.push(char::from(b'0' + empty_run));
                        empty_run = 0;
                    }
                    fen.push(pc.to_char());
                }
            }

            if fen_sq.get_file() == 7 {
                if empty_run > 0 {
                    fen.push(char::from(b'0' + empty_run));
                    empty_run = 0;
                }
                if fen_sq != defs::squarename::H1 {
                    fen.push('/');
                }
            }
        }

        fen.push(' ');
        fen.push(if self.side_to_move == Color::White { 'w' } else { 'b' });
        fen.push(' ');
        fen.push_str(&self.castle_fen_field());
        fen.push(' ');
        match self.ep_square {
            Some(sq) => fen.push_str(&sq.to_string()),
            None => fen.push('-'),
        }
        fen.push(' ');
        fen.push_str(&self.rule50.to_string());
        fen.push(' ');
        fen.push_str(&self.movenum().to_string());

        fen
    }

    /// Current full-move number, adjusted by the plies played since the
    /// FEN was loaded.
    pub fn movenum(&self) -> u32 {
        let start_color = if self.ply() % 2 == 0 {
            self.side_to_move
        } else {
            !self.side_to_move
        };
        let total_ply = full_to_ply(self.start_movenum, start_color) + self.ply() as u32;
        ply_to_full(total_ply)
    }

    pub(crate) fn castle_fen_field(&self) -> String {
        if self.castle.is_empty() {
            return "-".to_string();
        }

        let mut field = String::new();
        for (c, cs) in [
            (Color::White, CastleSide::King),
            (Color::White, CastleSide::Queen),
            (Color::Black, CastleSide::King),
            (Color::Black, CastleSide::Queen),
        ] {
            if self.castle.contains(CastleRights::make(c, cs)) {
                field.push(self.castle_char(c, cs));
            }
        }
        field
    }

    /// K/Q when the recorded rook is still the outermost rook of its wing,
    /// the rook's file letter otherwise (X-FEN). Shredder mode always
    /// writes the file letter.
    fn castle_char(&self, c: Color, cs: CastleSide) -> char {
        let rook_sq = self.castle_rook_sqs[c as usize][cs as usize]
            .expect("castle right implies rook square");

        let ch = if self.use_shredder_fen {
            (b'A' + rook_sq.get_file()) as char
        } else {
            let back_rank: u8 = if c == Color::White { 0 } else { 7 };
            let rank_bb = crate::game::board::BitBoard::from_rank(back_rank);
            let rooks_on_rank = self.pieces(c, PieceType::Rook) & rank_bb;
            let outer_rook = match cs {
                CastleSide::King => rooks_on_rank.msb(),
                CastleSide::Queen => rooks_on_rank.lsb(),
            };
            if outer_rook != Some(rook_sq) {
                (b'A' + rook_sq.get_file()) as char
            } else {
                match cs {
                    CastleSide::King => 'K',
                    CastleSide::Queen => 'Q',
                }
            }
        };

        if c == Color::White {
            ch
        } else {
            ch.to_ascii_lowercase()
        }
    }
}

const fn full_to_ply(movenum: u32, side_to_move: Color) -> u32 {
    match side_to_move {
        Color::White => 2 * movenum.saturating_sub(1),
        Color::Black => 2 * movenum.saturating_sub(1) + 1,
    }
}

const fn ply_to_full(ply: u32) -> u32 {
    ply / 2 + 1
}


// ############################
//         RENDERING
// ############################

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // FEN letters in a plain grid, white pieces bold so the sides read
        // apart even without a checkerboard
        for rank in (0..8u8).rev() {
            write!(f, "{}  ", (rank + 1).to_string().cyan())?;

            for file in 0..8u8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_on(sq) {
                    Some(pc) if pc.color() == Color::White => {
                        write!(f, "{} ", pc.to_char().to_string().yellow().bold())?
                    }
                    Some(pc) => write!(f, "{} ", pc.to_char().to_string().magenta())?,
                    None => write!(f, "{} ", ".".dimmed())?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f)?;
        writeln!(f, "   {}", "a b c d e f g h".cyan())?;

        writeln!(f, "FEN: {}", self.to_fen())?;
        match self.ep_square {
            Some(sq) => writeln!(f, "Enpassant: {sq}")?,
            None => writeln!(f, "Enpassant: -")?,
        }
        writeln!(f, "Castle: {}", self.castle_fen_field())?;
        writeln!(f, "Hash: {:016x}", self.hash())?;
        Ok(())
    }
}
