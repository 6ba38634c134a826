//! Maps a screen point to the board element under it.
//!
//! Rendering itself lives outside this crate; `Layout` only records how grid
//! coordinates were scaled so that pointer positions can be mapped back.
use crate::engine::Board;
use crate::geometry::{distance_to, Edge, Point};

/// Scale and offset used to draw a board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    /// Screen distance between neighbouring grid points.
    pub cell_size: f64,
    pub node_radius: f64,
    /// Drawn thickness of a stick.
    pub stick_size: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Layout {
    /// Fits a board into a `width` x `height` screen area.
    ///
    /// Cells are square and as large as both dimensions allow; nodes and sticks are
    /// 15% of a cell, and the grid is shifted by half a cell so edge nodes stay visible.
    pub fn fit(board: &Board, width: f64, height: f64) -> Self {
        let cell_size = (width / board.width() as f64)
            .min(height / board.height() as f64)
            .floor();
        let line_width = 1.0;
        let offset = (cell_size / 2.0).floor() - line_width / 2.0;
        Layout {
            cell_size,
            node_radius: cell_size * 0.15,
            stick_size: cell_size * 0.15,
            offset_x: offset,
            offset_y: offset,
        }
    }

    fn to_screen(&self, p: Point) -> (f64, f64) {
        (p.x as f64 * self.cell_size, p.y as f64 * self.cell_size)
    }

    // The edge's bounding box, thickened by `thickness` across its axis.
    fn covers(&self, edge: &Edge, thickness: f64, (x, y): (f64, f64)) -> bool {
        let (x1, y1) = self.to_screen(edge.p1());
        let (x2, y2) = self.to_screen(edge.p2());
        let (mut min_x, mut max_x) = (x1.min(x2), x1.max(x2));
        let (mut min_y, mut max_y) = (y1.min(y2), y1.max(y2));
        if edge.is_horizontal() {
            min_y -= thickness / 2.0;
            max_y += thickness / 2.0;
        } else {
            min_x -= thickness / 2.0;
            max_x += thickness / 2.0;
        }
        x >= min_x && x <= max_x && y >= min_y && y <= max_y
    }
}

/// What a screen point lands on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Node(Point),
    /// Storage index of the stick.
    Stick(usize),
    /// Every board edge near the point; the caller tries them in order.
    Edges(Vec<Edge>),
}

impl Board {
    /// Finds the element under the screen point `(x, y)`.
    ///
    /// Nodes take priority over sticks, and sticks over free edges. Edges are matched
    /// with twice the stick thickness, so a click between two close edges returns both.
    pub fn target_at(&self, x: f64, y: f64, layout: &Layout) -> Option<Target> {
        let p = (x - layout.offset_x, y - layout.offset_y);

        if let Some(&node) = self
            .nodes()
            .iter()
            .find(|&&node| distance_to(layout.to_screen(node), p) <= layout.node_radius)
        {
            return Some(Target::Node(node));
        }

        if let Some(index) = self
            .sticks()
            .position(|s| layout.covers(&s.edge, layout.stick_size, p))
        {
            return Some(Target::Stick(index));
        }

        let edges: Vec<Edge> = self
            .edges()
            .iter()
            .filter(|e| layout.covers(e, layout.stick_size * 2.0, p))
            .copied()
            .collect();
        if edges.is_empty() {
            None
        } else {
            Some(Target::Edges(edges))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_level;

    fn layout() -> Layout {
        Layout {
            cell_size: 100.0,
            node_radius: 15.0,
            stick_size: 15.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    #[test]
    fn test_layout_fit() {
        let board = decode_level("3100200010", "3012").unwrap();
        let layout = Layout::fit(&board, 320.0, 200.0);
        assert_eq!(layout.cell_size, 106.0);
        assert_eq!(layout.offset_x, 52.5);
        assert!((layout.node_radius - 15.9).abs() < 1e-9);
    }

    #[test]
    fn test_target_priority() {
        let board = decode_level("4100300010", "40123").unwrap();
        let layout = layout();

        assert_eq!(
            board.target_at(105.0, 3.0, &layout),
            Some(Target::Node(Point::new(1, 0)))
        );
        assert_eq!(board.target_at(50.0, 5.0, &layout), Some(Target::Stick(0)));
        assert_eq!(
            board.target_at(250.0, -10.0, &layout),
            Some(Target::Edges(vec![Edge::from_coords(2, 0, 3, 0)]))
        );
        assert_eq!(board.target_at(250.0, 40.0, &layout), None);
    }

    #[test]
    fn test_target_respects_offset() {
        let board = decode_level("4100300010", "40123").unwrap();
        let layout = Layout {
            offset_x: 50.0,
            offset_y: 50.0,
            ..layout()
        };
        assert_eq!(
            board.target_at(350.0, 50.0, &layout),
            Some(Target::Node(Point::new(3, 0)))
        );
        assert_eq!(
            board.target_at(200.0, 50.0, &layout),
            Some(Target::Edges(vec![Edge::from_coords(1, 0, 2, 0)]))
        );
    }
}
