//! Integer grid geometry for the plank puzzle.
//!
//! - `Point`: a node coordinate on the grid.
//! - `Edge`: an unordered pair of points, stored with its endpoints in canonical order.
//! - `is_crossing`: the perpendicular-overlap predicate that forbids two planks
//!   from lying across each other.
use std::fmt;

/// A point on the puzzle grid.
///
/// Points order by `x` first, then `y`, which is the order used to canonicalize edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to another grid point.
    pub fn distance_to(&self, other: Point) -> f64 {
        distance_to(
            (self.x as f64, self.y as f64),
            (other.x as f64, other.y as f64),
        )
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Euclidean distance between two points in screen space.
///
/// Only hit-testing needs this; the puzzle rules themselves work on exact grid coordinates.
pub fn distance_to(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// An undirected edge between two distinct grid points.
///
/// `Edge::new` stores the endpoints sorted by `(x, y)`, so `p1` is always the
/// "near" endpoint and two edges built from the same points in either order
/// compare equal, hash equal and print identically.
///
/// # Examples
/// ```
/// use plank_solver::geometry::{Edge, Point};
/// let a = Edge::new(Point::new(3, 0), Point::new(0, 0));
/// let b = Edge::new(Point::new(0, 0), Point::new(3, 0));
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "0,0,3,0");
/// assert_eq!(a.length(), 3);
/// assert!(a.is_horizontal());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    p1: Point,
    p2: Point,
}

impl Edge {
    pub fn new(a: Point, b: Point) -> Self {
        debug_assert!(a != b, "an edge needs two distinct endpoints");
        if a <= b {
            Edge { p1: a, p2: b }
        } else {
            Edge { p1: b, p2: a }
        }
    }

    /// Shorthand for `Edge::new(Point::new(x1, y1), Point::new(x2, y2))`.
    pub fn from_coords(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Edge::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    /// The canonical first endpoint (smallest by `(x, y)`).
    pub fn p1(&self) -> Point {
        self.p1
    }

    pub fn p2(&self) -> Point {
        self.p2
    }

    pub fn is_horizontal(&self) -> bool {
        self.p1.y == self.p2.y
    }

    pub fn is_vertical(&self) -> bool {
        self.p1.x == self.p2.x
    }

    /// Manhattan length. Planks only ever lie on axis-aligned edges, where this is
    /// the number of grid units covered.
    pub fn length(&self) -> i32 {
        (self.p1.x - self.p2.x).abs() + (self.p1.y - self.p2.y).abs()
    }

    pub fn contains_point(&self, p: Point) -> bool {
        self.p1 == p || self.p2 == p
    }

    /// Returns the endpoint opposite to `p`, or `None` if `p` is not an endpoint.
    pub fn other_end(&self, p: Point) -> Option<Point> {
        if p == self.p1 {
            Some(self.p2)
        } else if p == self.p2 {
            Some(self.p1)
        } else {
            None
        }
    }

    /// True iff the edges are distinct and share at least one endpoint.
    pub fn is_connected_with(&self, other: &Edge) -> bool {
        self != other && (other.contains_point(self.p1) || other.contains_point(self.p2))
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.p1, self.p2)
    }
}

fn strictly_between(v: i32, a: i32, b: i32) -> bool {
    (a - v) * (b - v) < 0
}

/// Returns true if a horizontal and a vertical edge pass through each other.
///
/// Edges only cross when one is horizontal and the other vertical, both are longer
/// than one unit, and each passes strictly through the interior of the other.
/// Sharing an endpoint, or touching the other edge with an endpoint, is not a crossing.
/// The predicate is symmetric in its arguments.
///
/// # Examples
/// ```
/// use plank_solver::geometry::{is_crossing, Edge};
/// let h = Edge::from_coords(0, 1, 2, 1);
/// let v = Edge::from_coords(1, 0, 1, 2);
/// assert!(is_crossing(&h, &v));
/// assert!(is_crossing(&v, &h));
/// assert!(!is_crossing(&h, &Edge::from_coords(2, 0, 2, 2)));
/// ```
pub fn is_crossing(e1: &Edge, e2: &Edge) -> bool {
    if e1.length() == 1 || e2.length() == 1 {
        return false;
    }
    let (h, v) = match (e1.is_horizontal(), e2.is_horizontal()) {
        (true, false) if e2.is_vertical() => (e1, e2),
        (false, true) if e1.is_vertical() => (e2, e1),
        _ => return false,
    };
    strictly_between(v.p1.x, h.p1.x, h.p2.x) && strictly_between(h.p1.y, v.p1.y, v.p2.y)
}
