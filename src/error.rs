use crate::geometry::Edge;

/// Errors produced while decoding puzzle data or replaying recorded moves.
///
/// Move generation and the solver never fail; only external input can.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid symbol '{0}': expected one of 0-9, A-Z")]
    InvalidSymbol(char),

    #[error("invalid move step '{0}': expected exactly 8 symbols from 0-9, A-Z")]
    InvalidMoveStep(String),

    #[error("coordinate {0} cannot be written as a single base-36 symbol")]
    CoordinateOutOfRange(i32),

    #[error("invalid state record '{0}': expected x1,y1,x2,y2,active")]
    InvalidStateKey(String),

    #[error("no stick at {0}")]
    NoStickAt(Edge),

    #[error("illegal move from {from} to {to}")]
    IllegalMove { from: Edge, to: Edge },

    #[error("invalid level definition: {0}")]
    InvalidLevel(String),
}

pub type Result<T> = std::result::Result<T, Error>;
