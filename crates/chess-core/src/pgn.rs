//! PGN parsing: header validation, then the mainline via pgn-reader.
//!
//! Only the first game in the text is read. Variations, comments and NAGs
//! are skipped; the move list ends at the result marker or end of input.
//! Legality of the moves is not checked here, that happens when the
//! moves are replayed by [`crate::position::PositionTracker`].

use std::io::Cursor;
use std::ops::ControlFlow;
use std::sync::LazyLock;

use pgn_reader::{RawTag, Reader, SanPlus, Skip, Visitor};
use regex::Regex;
use shakmaty::{fen::Fen, san::San, CastlingMode, Chess};

use crate::error::ParseError;

/// One or more `[Tag "value"]` pairs making up a whole header line
static HEADER_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:\[\w+\s+"(?:[^"\\]|\\.)*"\]\s*)+$"#).expect("header regex is valid")
});

/// A game record reduced to its headers, start position and mainline SAN.
#[derive(Debug, Clone)]
pub struct ParsedGame {
    headers: Vec<(String, String)>,
    start: Chess,
    moves: Vec<San>,
}

impl ParsedGame {
    /// First value of a header tag, if present and non-empty.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }

    /// Result marker from the `Result` header ("1-0", "0-1", "1/2-1/2", "*").
    pub fn result(&self) -> Option<&str> {
        self.header("Result")
    }

    /// Position before the first mainline move (standard start unless a FEN header is set).
    pub fn start_position(&self) -> &Chess {
        &self.start
    }

    /// Mainline moves in ply order, as written in the record.
    pub fn moves(&self) -> &[San] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Parse the first game in `pgn`.
pub fn parse_pgn(pgn: &str) -> Result<ParsedGame, ParseError> {
    if pgn.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    validate_headers(pgn)?;

    let mut reader = Reader::new(Cursor::new(pgn.as_bytes()));
    let raw = reader
        .read_game(&mut MainlineCollector)
        .map_err(|e| ParseError::Unreadable(e.to_string()))?
        .ok_or(ParseError::Empty)?;

    let start = match raw.headers.iter().find(|(key, _)| key == "FEN") {
        Some((_, fen)) => start_from_fen(fen)?,
        None => Chess::default(),
    };

    if raw.moves.is_empty() {
        return Err(ParseError::NoMoves);
    }

    Ok(ParsedGame {
        headers: raw.headers,
        start,
        moves: raw.moves,
    })
}

/// Every line of the leading header section must consist of `[Tag "value"]`
/// pairs; several pairs may share a line.
fn validate_headers(pgn: &str) -> Result<(), ParseError> {
    for line in pgn.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !line.starts_with('[') {
            break;
        }
        if !HEADER_LINE_RE.is_match(line) {
            return Err(ParseError::MalformedHeader(line.to_string()));
        }
    }
    Ok(())
}

fn start_from_fen(fen: &str) -> Result<Chess, ParseError> {
    let fen: Fen = fen
        .parse()
        .map_err(|e| ParseError::InvalidFen(format!("{fen}: {e}")))?;
    fen.into_position::<Chess>(CastlingMode::Standard)
        .map_err(|e| ParseError::InvalidFen(e.to_string()))
}

struct RawGame {
    headers: Vec<(String, String)>,
    moves: Vec<San>,
}

/// Visitor that keeps every tag and the mainline SAN tokens.
struct MainlineCollector;

impl Visitor for MainlineCollector {
    type Tags = Vec<(String, String)>;
    type Movetext = RawGame;
    type Output = RawGame;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(Vec::new())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        tags.push((
            String::from_utf8_lossy(name).into_owned(),
            value.decode_utf8_lossy().into_owned(),
        ));
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(RawGame {
            headers: tags,
            moves: Vec::new(),
        })
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        movetext.moves.push(san_plus.san);
        ControlFlow::Continue(())
    }

    fn begin_variation(
        &mut self,
        _movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        // Mainline only
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        movetext
    }
}
