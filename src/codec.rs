//! Text formats used by the plank puzzle.
//!
//! - The canonical state key: one `x1,y1,x2,y2,active` record per stick, sorted, newline separated.
//! - The compact level definition: a positions string and a nodes string over the base-36
//!   alphabet `0-9A-Z`, one symbol per number.
//! - The move step: exactly 8 base-36 symbols, the old edge followed by the new edge.
use std::collections::BTreeMap;
use std::str::FromStr;

use tracing::debug;

use crate::engine::{Board, Configuration, Stick};
use crate::error::{Error, Result};
use crate::geometry::{Edge, Point};

/// The symbols of the base-36 alphabet, in value order.
pub const SYMBOLS: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Positions string of the bundled 8x6 level.
pub const SAMPLE_POSITIONS: &str = "8600720030121363653454";
/// Nodes string of the bundled 8x6 level.
pub const SAMPLE_NODES: &str = "3036324541257314632353256";

/// Decodes one alphabet symbol to its value (0 to 35).
///
/// # Examples
/// ```
/// use plank_solver::codec::to_num;
/// assert_eq!(to_num('7').unwrap(), 7);
/// assert_eq!(to_num('Z').unwrap(), 35);
/// assert!(to_num('z').is_err());
/// ```
pub fn to_num(symbol: char) -> Result<i32> {
    SYMBOLS
        .find(symbol)
        .map(|v| v as i32)
        .ok_or(Error::InvalidSymbol(symbol))
}

/// Encodes a value from 0 to 35 as one alphabet symbol.
pub fn to_char(value: i32) -> Result<char> {
    usize::try_from(value)
        .ok()
        .and_then(|v| SYMBOLS.chars().nth(v))
        .ok_or(Error::CoordinateOutOfRange(value))
}

fn to_nums(s: &str) -> Result<Vec<i32>> {
    s.chars().map(to_num).collect()
}

fn level_edge(a: Point, b: Point) -> Result<Edge> {
    if a == b {
        return Err(Error::InvalidLevel(format!("edge from {} to itself", a)));
    }
    Ok(Edge::new(a, b))
}

/// Encodes the board's current stick placement as its canonical state key.
pub fn encode_state(board: &Board) -> String {
    board.configuration().to_string()
}

/// Decodes a canonical state key.
///
/// The active flags are taken as written; they are not derived again from connectivity.
/// An empty key is the configuration without sticks.
pub fn decode_state(key: &str) -> Result<Configuration> {
    key.parse()
}

fn parse_stick(record: &str) -> Result<Stick> {
    let invalid = || Error::InvalidStateKey(record.to_string());
    let fields: Vec<&str> = record.trim().split(',').collect();
    if fields.len() != 5 {
        return Err(invalid());
    }
    let mut coords = [0i32; 4];
    for (slot, field) in coords.iter_mut().zip(&fields) {
        *slot = field.trim().parse().map_err(|_| invalid())?;
    }
    let active = match fields[4].trim() {
        "0" => false,
        "1" => true,
        _ => return Err(invalid()),
    };
    let (a, b) = (Point::new(coords[0], coords[1]), Point::new(coords[2], coords[3]));
    if a == b {
        return Err(invalid());
    }
    Ok(Stick::new(Edge::new(a, b), active))
}

impl FromStr for Configuration {
    type Err = Error;

    fn from_str(key: &str) -> Result<Self> {
        let sticks = key
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(parse_stick)
            .collect::<Result<Vec<_>>>()?;
        Ok(Configuration::new(sticks))
    }
}

/// The contents of a level's positions string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelPositions {
    pub width: i32,
    pub height: i32,
    pub start: Point,
    pub end: Point,
    pub sticks: Vec<Edge>,
}

/// Decodes a positions string: `width, height, startX, startY, endX, endY`, then four
/// symbols per stick. A trailing group of fewer than four symbols is ignored.
pub fn parse_positions(s: &str) -> Result<LevelPositions> {
    let values = to_nums(s)?;
    if values.len() < 6 {
        return Err(Error::InvalidLevel(format!(
            "positions string '{}' is shorter than 6 symbols",
            s
        )));
    }
    let sticks = values[6..]
        .chunks_exact(4)
        .map(|c| level_edge(Point::new(c[0], c[1]), Point::new(c[2], c[3])))
        .collect::<Result<Vec<_>>>()?;
    Ok(LevelPositions {
        width: values[0],
        height: values[1],
        start: Point::new(values[2], values[3]),
        end: Point::new(values[4], values[5]),
        sticks,
    })
}

/// The fixed graph decoded from a nodes string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelGraph {
    pub nodes: Vec<Point>,
    pub edges: Vec<Edge>,
}

/// Decodes a nodes string into the board graph.
///
/// The string is read one row at a time, starting at `y = 0`: a count symbol `n`, then the
/// `n` columns holding a node in that row. Neighbouring nodes of a row are joined by a
/// horizontal edge. Afterwards, the nodes of each column are joined top to bottom by
/// vertical edges, skipping rows where the column has no node.
///
/// Edges are listed row by row for the horizontal ones, then column by column.
pub fn parse_nodes(s: &str) -> Result<LevelGraph> {
    let values = to_nums(s)?;
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut columns: BTreeMap<i32, Vec<Point>> = BTreeMap::new();

    let mut i = 0;
    let mut y = 0;
    while i + 1 < values.len() {
        let n = values[i] as usize;
        let row: Vec<Point> = values[i + 1..]
            .iter()
            .take(n)
            .map(|&x| Point::new(x, y))
            .collect();
        for (j, &node) in row.iter().enumerate() {
            nodes.push(node);
            columns.entry(node.x).or_default().push(node);
            if j > 0 {
                edges.push(level_edge(row[j - 1], node)?);
            }
        }
        i += n + 1;
        y += 1;
    }

    for column in columns.values() {
        for pair in column.windows(2) {
            edges.push(level_edge(pair[0], pair[1])?);
        }
    }

    Ok(LevelGraph { nodes, edges })
}

/// Builds a board from a level's positions and nodes strings.
///
/// # Examples
/// ```
/// use plank_solver::codec::decode_level;
/// let board = decode_level("3100200010", "3012").unwrap();
/// assert_eq!(board.nodes().len(), 3);
/// assert_eq!(board.state_string(), "0,0,1,0,1");
/// assert!(!board.is_target_ok());
/// ```
pub fn decode_level(positions: &str, nodes: &str) -> Result<Board> {
    let LevelPositions {
        width,
        height,
        start,
        end,
        sticks,
    } = parse_positions(positions)?;
    let LevelGraph { nodes, edges } = parse_nodes(nodes)?;
    debug!(
        width,
        height,
        nodes = nodes.len(),
        edges = edges.len(),
        sticks = sticks.len(),
        "decoded level"
    );
    Ok(Board::new(width, height, nodes, edges, start, end, sticks))
}

/// Builds a board from level text: the positions string on the first non-empty line and
/// the nodes string on the second. Surrounding whitespace is ignored.
pub fn decode_level_text(text: &str) -> Result<Board> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    match lines.as_slice() {
        [positions, nodes] => decode_level(positions, nodes),
        _ => Err(Error::InvalidLevel(format!(
            "expected 2 non-empty lines (positions, nodes), found {}",
            lines.len()
        ))),
    }
}

/// One stick relocation, used to log and replay moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MoveStep {
    pub old_position: Edge,
    pub new_position: Edge,
}

impl MoveStep {
    pub fn new(old_position: Edge, new_position: Edge) -> Self {
        MoveStep {
            old_position,
            new_position,
        }
    }

    /// Writes the step as 8 symbols: `x1 y1 x2 y2` of the old edge, then of the new edge.
    ///
    /// # Errors
    /// `Error::CoordinateOutOfRange` if a coordinate is outside `0..=35`.
    pub fn encode(&self) -> Result<String> {
        [self.old_position, self.new_position]
            .iter()
            .flat_map(|e| [e.p1().x, e.p1().y, e.p2().x, e.p2().y])
            .map(to_char)
            .collect()
    }

    /// Parses exactly 8 symbols. Letters may be upper or lower case.
    ///
    /// # Examples
    /// ```
    /// use plank_solver::codec::MoveStep;
    /// use plank_solver::geometry::Edge;
    /// let step = MoveStep::decode("0010a010").unwrap();
    /// assert_eq!(step.old_position, Edge::from_coords(0, 0, 1, 0));
    /// assert_eq!(step.new_position, Edge::from_coords(10, 0, 1, 0));
    /// assert!(MoveStep::decode("001010").is_err());
    /// ```
    pub fn decode(s: &str) -> Result<MoveStep> {
        let invalid = || Error::InvalidMoveStep(s.to_string());
        let values: Vec<i32> = s
            .chars()
            .map(|c| to_num(c.to_ascii_uppercase()).map_err(|_| invalid()))
            .collect::<Result<_>>()?;
        if values.len() != 8 {
            return Err(invalid());
        }
        let edge = |c: &[i32]| {
            let (a, b) = (Point::new(c[0], c[1]), Point::new(c[2], c[3]));
            if a == b {
                Err(invalid())
            } else {
                Ok(Edge::new(a, b))
            }
        };
        Ok(MoveStep::new(edge(&values[..4])?, edge(&values[4..])?))
    }
}

impl FromStr for MoveStep {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MoveStep::decode(s)
    }
}

/// Splits a move log into its 8-symbol steps and decodes each one.
pub fn decode_move_log(log: &str) -> Result<Vec<MoveStep>> {
    let chars: Vec<char> = log.trim().chars().collect();
    if chars.len() % 8 != 0 {
        return Err(Error::InvalidMoveStep(log.to_string()));
    }
    chars
        .chunks(8)
        .map(|chunk| MoveStep::decode(&chunk.iter().collect::<String>()))
        .collect()
}
