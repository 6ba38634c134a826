//! Core game engine for the plank puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Stick`: a plank position together with its active flag.
//! - `Configuration`: the canonical, order-independent set of sticks used as a search state.
//! - `Board`: the fixed node/edge graph plus the movable sticks. It owns connectivity,
//!   selection, interactive moves and the move-generation function used by the solver.
//! - `Game`: an interactive session on top of a `Board` with a move log and undo.
use std::fmt;

use tracing::trace;

use crate::codec::{self, MoveStep};
use crate::error::{Error, Result};
use crate::geometry::{is_crossing, Edge, Point};

/// A plank placed on an edge of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Stick {
    pub edge: Edge,
    /// True if the stick can be reached from where the player stands.
    pub active: bool,
}

impl Stick {
    pub fn new(edge: Edge, active: bool) -> Self {
        Stick { edge, active }
    }

    pub fn length(&self) -> i32 {
        self.edge.length()
    }
}

impl fmt::Display for Stick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.edge, u8::from(self.active))
    }
}

/// A full stick placement, independent of the order sticks are stored in.
///
/// Sticks are kept sorted by length, then by the text of their canonical edge, so two
/// boards holding the same planks in different array orders produce equal (and equally
/// hashed) configurations. The `Display` form is the canonical state key: one
/// `x1,y1,x2,y2,active` record per line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Configuration {
    sticks: Vec<Stick>,
}

impl Configuration {
    pub fn new(mut sticks: Vec<Stick>) -> Self {
        sticks.sort_by_cached_key(|s| (s.length(), s.edge.to_string(), s.active));
        Configuration { sticks }
    }

    pub fn sticks(&self) -> &[Stick] {
        &self.sticks
    }

    pub fn len(&self) -> usize {
        self.sticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sticks.is_empty()
    }

    /// True if any stick has `p` as an endpoint.
    pub fn touches(&self, p: Point) -> bool {
        self.sticks.iter().any(|s| s.edge.contains_point(p))
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stick) in self.sticks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", stick)?;
        }
        Ok(())
    }
}

// Positions and flags saved before a temporary move.
struct Snapshot {
    sticks: Vec<Edge>,
    active: Vec<bool>,
}

/// The puzzle board: a fixed graph of nodes and legal edges, plus the movable sticks.
///
/// Sticks live in an arena indexed by position in `sticks`, with the transient
/// `active` flags stored in a parallel array and the UI selection kept as an optional
/// index. The graph, `start` and `end` never change after construction.
///
/// The active set is the flood fill over touching sticks from where the player stands.
/// A new board floods from `start`; after a stick is relocated the player stands on it,
/// so the flood is reseeded from the near endpoint of its new position.
#[derive(Clone, Debug)]
pub struct Board {
    width: i32,
    height: i32,
    nodes: Vec<Point>,
    edges: Vec<Edge>,
    start: Point,
    end: Point,
    sticks: Vec<Edge>,
    active: Vec<bool>,
    selected: Option<usize>,
}

impl Board {
    /// Creates a board and computes the initial active set from `start`.
    ///
    /// # Arguments
    /// * `width`, `height`: grid extents, used for rendering.
    /// * `nodes`: every point a stick endpoint may occupy.
    /// * `edges`: the legal stick positions between nodes.
    /// * `start`, `end`: where the player starts and the node that must be reached.
    /// * `sticks`: the initial stick positions. No two may share an edge.
    pub fn new(
        width: i32,
        height: i32,
        nodes: Vec<Point>,
        edges: Vec<Edge>,
        start: Point,
        end: Point,
        sticks: Vec<Edge>,
    ) -> Self {
        let active = vec![false; sticks.len()];
        let mut board = Board {
            width,
            height,
            nodes,
            edges,
            start,
            end,
            sticks,
            active,
            selected: None,
        };
        board.set_active_stick(start);
        board
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn nodes(&self) -> &[Point] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn stick_count(&self) -> usize {
        self.sticks.len()
    }

    /// Returns the stick at `index`, or `None` if out of range.
    pub fn stick(&self, index: usize) -> Option<Stick> {
        let edge = *self.sticks.get(index)?;
        Some(Stick::new(edge, self.active[index]))
    }

    /// Iterates over the sticks in storage order.
    pub fn sticks(&self) -> impl Iterator<Item = Stick> + '_ {
        self.sticks
            .iter()
            .zip(&self.active)
            .map(|(&edge, &active)| Stick::new(edge, active))
    }

    pub fn active_flags(&self) -> &[bool] {
        &self.active
    }

    /// Returns the storage index of the stick lying on `edge`.
    pub fn stick_index_at(&self, edge: &Edge) -> Option<usize> {
        self.sticks.iter().position(|s| s == edge)
    }

    /// Marks as active every inactive stick reachable from `p` through touching sticks.
    ///
    /// Sticks that are already active are neither revisited nor cleared, so running
    /// this twice from the same point changes nothing the second time.
    pub fn set_active_stick(&mut self, p: Point) {
        let mut pending = vec![p];
        while let Some(point) = pending.pop() {
            for (i, stick) in self.sticks.iter().enumerate() {
                if !self.active[i] && stick.contains_point(point) {
                    self.active[i] = true;
                    if let Some(next) = stick.other_end(point) {
                        pending.push(next);
                    }
                }
            }
        }
    }

    /// Clears every active flag and floods again from `p`.
    pub fn refresh_active_from(&mut self, p: Point) {
        self.active.iter_mut().for_each(|a| *a = false);
        self.set_active_stick(p);
    }

    /// True if a stick of the same length already lies on `edge`.
    pub fn has_stick_at_edge(&self, edge: &Edge) -> bool {
        self.sticks
            .iter()
            .any(|s| s.length() == edge.length() && s == edge)
    }

    /// True once any stick touches the end node.
    pub fn is_target_ok(&self) -> bool {
        self.sticks.iter().any(|s| s.contains_point(self.end))
    }

    pub fn selected_stick(&self) -> Option<usize> {
        self.selected
    }

    /// Toggles the selection of the stick at `index`.
    ///
    /// Only active sticks can be selected, and selecting one clears any previous
    /// selection. Selecting the already selected stick deselects it.
    ///
    /// # Returns
    /// `true` if the selection changed, `false` if `index` is out of range or the
    /// stick is inactive.
    pub fn toggle_stick_selected(&mut self, index: usize) -> bool {
        if !self.active.get(index).copied().unwrap_or(false) {
            return false;
        }
        self.selected = if self.selected == Some(index) {
            None
        } else {
            Some(index)
        };
        true
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// True if some active stick shares an endpoint with `edge`.
    fn is_attached(&self, edge: &Edge) -> bool {
        self.sticks
            .iter()
            .zip(&self.active)
            .any(|(s, &active)| active && edge.is_connected_with(s))
    }

    fn can_move_stick_to(&self, index: usize, edge: &Edge) -> bool {
        edge.length() == self.sticks[index].length()
            && !self.has_stick_at_edge(edge)
            && self.is_attached(edge)
    }

    fn relocate(&mut self, index: usize, edge: Edge) {
        self.sticks[index] = edge;
        self.selected = None;
        self.refresh_active_from(edge.p1());
    }

    /// Moves the selected stick onto the first acceptable candidate edge.
    ///
    /// A candidate is acceptable if it has the selected stick's length, is not occupied,
    /// and touches an active stick (the selected stick's current position counts).
    /// Ties are broken by the caller's ordering of `candidates`. On success the
    /// selection is cleared and the active set is recomputed from the new position.
    ///
    /// # Returns
    /// `true` if a stick was moved.
    pub fn try_move_selected_stick_to(&mut self, candidates: &[Edge]) -> bool {
        let Some(index) = self.selected else {
            return false;
        };
        match candidates
            .iter()
            .find(|edge| self.can_move_stick_to(index, edge))
        {
            Some(&edge) => {
                self.relocate(index, edge);
                true
            }
            None => false,
        }
    }

    /// Applies a recorded move, checking it against the same rules as interactive play.
    ///
    /// The stick on `step.old_position` must be active and the new position must be a
    /// board edge it could be moved to.
    pub fn apply_move_step(&mut self, step: &MoveStep) -> Result<()> {
        let index = self
            .stick_index_at(&step.old_position)
            .ok_or(Error::NoStickAt(step.old_position))?;
        let legal = self.active[index]
            && self.edges.contains(&step.new_position)
            && self.can_move_stick_to(index, &step.new_position);
        if !legal {
            return Err(Error::IllegalMove {
                from: step.old_position,
                to: step.new_position,
            });
        }
        self.relocate(index, step.new_position);
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            sticks: self.sticks.clone(),
            active: self.active.clone(),
        }
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        self.sticks.clone_from(&snapshot.sticks);
        self.active.clone_from(&snapshot.active);
    }

    /// Enumerates every configuration reachable with a single stick move.
    ///
    /// For each active stick, every board edge of the same length is a candidate if it
    /// is unoccupied, touches an active stick, and crosses no stick on the board (active
    /// or not). Each candidate is applied temporarily to read off the resulting
    /// configuration, then undone. The returned configurations are deduplicated and keep
    /// their first-discovery order.
    ///
    /// The board is left exactly as it was, so repeated calls return the same result.
    pub fn possible_next_states(&mut self) -> Vec<Configuration> {
        let snapshot = self.snapshot();
        let mut states: Vec<Configuration> = Vec::new();

        for index in 0..self.sticks.len() {
            if !snapshot.active[index] {
                continue;
            }
            let targets: Vec<Edge> = self
                .edges
                .iter()
                .filter(|edge| {
                    self.can_move_stick_to(index, edge)
                        && !self.sticks.iter().any(|s| is_crossing(edge, s))
                })
                .copied()
                .collect();

            for edge in targets {
                self.sticks[index] = edge;
                self.refresh_active_from(edge.p1());
                // Successor lists are short; a linear scan avoids a second copy.
                let state = self.configuration();
                if !states.contains(&state) {
                    states.push(state);
                }
            }
            self.restore(&snapshot);
        }

        trace!(count = states.len(), "generated next states");
        states
    }

    /// Returns the canonical configuration of the current stick placement.
    pub fn configuration(&self) -> Configuration {
        Configuration::new(self.sticks().collect())
    }

    /// Replaces all sticks with those of `config`, including their active flags.
    ///
    /// The flags are trusted as stored; they are not recomputed. Any selection is cleared.
    pub fn load_configuration(&mut self, config: &Configuration) {
        self.sticks = config.sticks().iter().map(|s| s.edge).collect();
        self.active = config.sticks().iter().map(|s| s.active).collect();
        self.selected = None;
    }

    /// The canonical state key of the current placement.
    pub fn state_string(&self) -> String {
        codec::encode_state(self)
    }

    /// Loads a state key produced by [`Board::state_string`].
    pub fn set_state_string(&mut self, key: &str) -> Result<()> {
        let config = codec::decode_state(key)?;
        self.load_configuration(&config);
        Ok(())
    }
}

impl fmt::Display for Board {
    /// Draws the board on a `(2 * width - 1) x (2 * height - 1)` character grid.
    ///
    /// Nodes are `o` (`S` start, `E` end), free edges `.`, horizontal sticks `=`
    /// (active) or `-`, vertical sticks `#` (active) or `|`, and the selected stick `*`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols = (2 * self.width - 1).max(0) as usize;
        let rows = (2 * self.height - 1).max(0) as usize;
        let mut grid = vec![vec![' '; cols]; rows];

        let draw_edge = |grid: &mut Vec<Vec<char>>, edge: &Edge, ch: char| {
            let (a, b) = (edge.p1(), edge.p2());
            let cells: Vec<(i32, i32)> = if edge.is_horizontal() {
                (2 * a.x + 1..2 * b.x).map(|c| (2 * a.y, c)).collect()
            } else {
                (2 * a.y + 1..2 * b.y).map(|r| (r, 2 * a.x)).collect()
            };
            for (r, c) in cells {
                if r >= 0 && c >= 0 && (r as usize) < rows && (c as usize) < cols {
                    grid[r as usize][c as usize] = ch;
                }
            }
        };

        for edge in &self.edges {
            draw_edge(&mut grid, edge, '.');
        }
        for (i, stick) in self.sticks().enumerate() {
            let ch = match (self.selected == Some(i), stick.edge.is_horizontal(), stick.active) {
                (true, _, _) => '*',
                (false, true, true) => '=',
                (false, true, false) => '-',
                (false, false, true) => '#',
                (false, false, false) => '|',
            };
            draw_edge(&mut grid, &stick.edge, ch);
        }
        for node in &self.nodes {
            let (r, c) = (2 * node.y, 2 * node.x);
            if r >= 0 && c >= 0 && (r as usize) < rows && (c as usize) < cols {
                grid[r as usize][c as usize] = if *node == self.start {
                    'S'
                } else if *node == self.end {
                    'E'
                } else {
                    'o'
                };
            }
        }

        for (i, row) in grid.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", row.iter().collect::<String>().trim_end())?;
        }
        Ok(())
    }
}

/// An interactive play session.
///
/// Keeps the starting configuration for `reset`, a history of configurations for
/// `undo_last_move`, and the list of applied moves, which can be written out as a
/// compact move log and replayed later.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    initial: Configuration,
    history: Vec<Configuration>,
    moves: Vec<MoveStep>,
}

impl Game {
    pub fn new(board: Board) -> Self {
        let initial = board.configuration();
        Game {
            board,
            initial,
            history: Vec::new(),
            moves: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Number of moves made since the start (or the last reset).
    pub fn steps(&self) -> usize {
        self.moves.len()
    }

    pub fn moves(&self) -> &[MoveStep] {
        &self.moves
    }

    pub fn is_solved(&self) -> bool {
        self.board.is_target_ok()
    }

    pub fn select(&mut self, index: usize) -> bool {
        self.board.toggle_stick_selected(index)
    }

    /// Moves the selected stick onto the first acceptable candidate.
    ///
    /// # Returns
    /// The applied move, or `None` if nothing is selected or no candidate is legal.
    pub fn move_selected_to(&mut self, candidates: &[Edge]) -> Option<MoveStep> {
        let index = self.board.selected_stick()?;
        let old_position = self.board.sticks[index];
        let before = self.board.configuration();
        if !self.board.try_move_selected_stick_to(candidates) {
            return None;
        }
        let step = MoveStep::new(old_position, self.board.sticks[index]);
        self.history.push(before);
        self.moves.push(step);
        Some(step)
    }

    /// Reverts the last move.
    ///
    /// # Returns
    /// `false` if no move has been made.
    pub fn undo_last_move(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.moves.pop();
                self.board.load_configuration(&previous);
                true
            }
            None => false,
        }
    }

    /// Returns to the starting configuration and forgets all moves.
    pub fn reset(&mut self) {
        self.board.load_configuration(&self.initial);
        self.history.clear();
        self.moves.clear();
    }

    /// The applied moves as one string of 8-symbol steps.
    pub fn move_log(&self) -> Result<String> {
        self.moves.iter().map(MoveStep::encode).collect()
    }

    /// Applies every step of a move log produced by [`Game::move_log`].
    ///
    /// Either all steps apply or none do: on the first illegal step the board and move
    /// list are put back as they were before the call.
    ///
    /// # Returns
    /// The number of steps applied.
    pub fn replay(&mut self, log: &str) -> Result<usize> {
        let steps = codec::decode_move_log(log)?;
        let checkpoint = self.board.configuration();
        let applied_before = self.moves.len();

        for step in &steps {
            let before = self.board.configuration();
            if let Err(err) = self.board.apply_move_step(step) {
                self.board.load_configuration(&checkpoint);
                self.history.truncate(applied_before);
                self.moves.truncate(applied_before);
                return Err(err);
            }
            self.history.push(before);
            self.moves.push(*step);
        }
        Ok(steps.len())
    }
}
