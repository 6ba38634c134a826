//! Breadth-first solver for plank puzzles.
//!
//! States are canonical [`Configuration`]s and transitions are single stick moves as
//! produced by [`Board::possible_next_states`]. The search stops expanding as soon as the
//! first solved state is dequeued, then keeps dequeuing states of that same depth to
//! collect every other shortest solution before picking one according to a
//! [`SelectionPolicy`].
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::codec::MoveStep;
use crate::engine::{Board, Configuration};
use crate::geometry::Edge;

/// Default ceiling on the number of states dequeued before giving up.
pub const DEFAULT_MAX_STATES: usize = 10_000_000;

/// Which of several equally short solutions to report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// The first solution found, in BFS order. Deterministic.
    First,
    /// A uniformly random solution among all shortest ones. With `seed: None` the
    /// generator is seeded from system entropy.
    Random { seed: Option<u64> },
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy::Random { seed: None }
    }
}

/// Solver settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// Number of dequeued states after which an unsolved search stops.
    pub max_states: usize,
    pub selection: SelectionPolicy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_states: DEFAULT_MAX_STATES,
            selection: SelectionPolicy::default(),
        }
    }
}

impl SolverConfig {
    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = max_states;
        self
    }

    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }
}

/// A shortest solution found by [`solve_bfs`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// Configurations from the initial one to the solved one, inclusive.
    pub path: Vec<Configuration>,
    /// Number of moves, `path.len() - 1`.
    pub steps: usize,
    /// Number of states dequeued during the search.
    pub state_count: usize,
    /// Number of distinct solved configurations found at the minimum depth.
    pub solution_count: usize,
    /// Every solved configuration at the minimum depth, in discovery order.
    pub shortest_solutions: Vec<Configuration>,
}

impl Solution {
    pub fn final_state(&self) -> &Configuration {
        &self.path[self.path.len() - 1]
    }

    /// The stick relocation between each pair of consecutive configurations.
    pub fn move_steps(&self) -> Vec<MoveStep> {
        let moves: Vec<MoveStep> = self
            .path
            .windows(2)
            .filter_map(|pair| {
                let before: HashSet<Edge> = pair[0].sticks().iter().map(|s| s.edge).collect();
                let after: HashSet<Edge> = pair[1].sticks().iter().map(|s| s.edge).collect();
                let old = before.difference(&after).next()?;
                let new = after.difference(&before).next()?;
                Some(MoveStep::new(*old, *new))
            })
            .collect();
        debug_assert_eq!(
            moves.len(),
            self.steps,
            "consecutive configurations must differ by exactly one stick"
        );
        moves
    }
}

/// Result of a search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveOutcome {
    Solved(Solution),
    /// No solution was found. `budget_exhausted` tells a search cut short by
    /// `max_states` apart from one that explored every reachable state.
    Unsolved {
        state_count: usize,
        budget_exhausted: bool,
    },
}

impl SolveOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveOutcome::Solved(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Solved(solution) => Some(solution),
            SolveOutcome::Unsolved { .. } => None,
        }
    }

    pub fn state_count(&self) -> usize {
        match self {
            SolveOutcome::Solved(solution) => solution.state_count,
            SolveOutcome::Unsolved { state_count, .. } => *state_count,
        }
    }
}

/// Searches for a shortest sequence of stick moves that makes a stick touch the end node.
///
/// The search runs breadth first from the board's current configuration. Once a
/// solution has been found, the search ends at the first dequeued state deeper than it.
/// Every other dequeued state is counted, then:
/// 1. if it is solved, it is recorded and not expanded;
/// 2. otherwise, if a solution was already found, it is skipped;
/// 3. otherwise, if `config.max_states` states have been dequeued, the search stops;
/// 4. otherwise its unseen successors are queued.
///
/// All states one level shallower have been expanded before the first solution is
/// dequeued, so the solved states met at its depth are exactly the shortest solutions.
/// States of the next depth may already be queued by then; they are never recorded. One
/// of the shortest solutions is chosen by `config.selection` and its path is rebuilt by
/// following parent links.
///
/// The board is loaded with each state during the search and restored to its initial
/// configuration before returning.
///
/// # Arguments
/// * `board`: The puzzle, in the configuration to solve from.
/// * `config`: State ceiling and selection policy.
///
/// # Returns
/// `SolveOutcome::Solved` with the chosen path, or `SolveOutcome::Unsolved` with the
/// number of states explored.
pub fn solve_bfs(board: &mut Board, config: &SolverConfig) -> SolveOutcome {
    let initial = board.configuration();
    if board.is_target_ok() {
        info!("board is already solved");
        return SolveOutcome::Solved(Solution {
            path: vec![initial.clone()],
            steps: 0,
            state_count: 1,
            solution_count: 1,
            shortest_solutions: vec![initial],
        });
    }

    let end = board.end();
    // Parallel arrays indexed by state id; id 0 is the initial configuration.
    // Each configuration is allocated once and shared with the `ids` map.
    let root = Rc::new(initial.clone());
    let mut states = vec![Rc::clone(&root)];
    let mut parents: Vec<Option<usize>> = vec![None];
    let mut depths = vec![0usize];
    let mut ids = HashMap::from([(root, 0usize)]);
    let mut queue = VecDeque::from([0usize]);

    let mut solved: Vec<usize> = Vec::new();
    let mut solution_depth: Option<usize> = None;
    let mut state_count = 0;
    let mut budget_exhausted = false;
    let mut current_depth = 0;

    while let Some(id) = queue.pop_front() {
        // The queue is ordered by depth, so nothing after this can be shortest.
        if solution_depth.is_some_and(|d| depths[id] > d) {
            break;
        }
        state_count += 1;
        if depths[id] != current_depth {
            current_depth = depths[id];
            debug!(
                depth = current_depth,
                visited = states.len(),
                frontier = queue.len() + 1,
                "reached new depth"
            );
        }

        if states[id].touches(end) {
            solution_depth = Some(depths[id]);
            solved.push(id);
            continue;
        }
        if solution_depth.is_some() {
            continue;
        }
        if state_count >= config.max_states {
            budget_exhausted = true;
            break;
        }

        board.load_configuration(&states[id]);
        for next in board.possible_next_states() {
            if let Entry::Vacant(slot) = ids.entry(Rc::new(next)) {
                let next_id = states.len();
                states.push(Rc::clone(slot.key()));
                slot.insert(next_id);
                parents.push(Some(id));
                depths.push(depths[id] + 1);
                queue.push_back(next_id);
            }
        }
    }

    board.load_configuration(&initial);

    if solved.is_empty() {
        info!(state_count, budget_exhausted, "no solution found");
        return SolveOutcome::Unsolved {
            state_count,
            budget_exhausted,
        };
    }

    let chosen = match config.selection {
        SelectionPolicy::First => solved[0],
        SelectionPolicy::Random { seed } => {
            let mut rng = match seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_entropy(),
            };
            solved[rng.gen_range(0..solved.len())]
        }
    };

    let mut path = Vec::new();
    let mut cursor = Some(chosen);
    while let Some(id) = cursor {
        path.push(Configuration::clone(&states[id]));
        cursor = parents[id];
    }
    path.reverse();

    let steps = path.len() - 1;
    info!(
        steps,
        state_count,
        solution_count = solved.len(),
        "solution found"
    );
    SolveOutcome::Solved(Solution {
        path,
        steps,
        state_count,
        solution_count: solved.len(),
        shortest_solutions: solved
            .iter()
            .map(|&id| Configuration::clone(&states[id]))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_level, SAMPLE_NODES, SAMPLE_POSITIONS};

    fn first() -> SolverConfig {
        SolverConfig::default().with_selection(SelectionPolicy::First)
    }

    // Exhaustive BFS over the whole reachable space, never expanding solved states.
    // Maps every reachable configuration to its depth.
    fn reference_depths(board: &Board) -> HashMap<Configuration, usize> {
        let mut scratch = board.clone();
        let initial = scratch.configuration();
        let mut depth_of = HashMap::from([(initial.clone(), 0usize)]);
        let mut queue = VecDeque::from([initial]);
        while let Some(state) = queue.pop_front() {
            if state.touches(board.end()) {
                continue;
            }
            let depth = depth_of[&state];
            scratch.load_configuration(&state);
            for next in scratch.possible_next_states() {
                if !depth_of.contains_key(&next) {
                    depth_of.insert(next.clone(), depth + 1);
                    queue.push_back(next);
                }
            }
        }
        depth_of
    }

    // The minimum solution depth and every solved state at that depth.
    fn reference_shortest(board: &Board) -> Option<(usize, HashSet<Configuration>)> {
        let depth_of = reference_depths(board);
        let min_depth = depth_of
            .iter()
            .filter(|(state, _)| state.touches(board.end()))
            .map(|(_, &depth)| depth)
            .min()?;
        let at_min = depth_of
            .into_iter()
            .filter(|(state, depth)| *depth == min_depth && state.touches(board.end()))
            .map(|(state, _)| state)
            .collect();
        Some((min_depth, at_min))
    }

    fn assert_matches_reference(mut board: Board) {
        let expected = reference_shortest(&board);
        let outcome = solve_bfs(&mut board, &first());
        match (expected, outcome) {
            (Some((depth, solutions)), SolveOutcome::Solved(solution)) => {
                assert_eq!(solution.steps, depth, "Solver path is not the shortest");
                let found: HashSet<Configuration> =
                    solution.shortest_solutions.iter().cloned().collect();
                assert_eq!(found, solutions, "Solver missed or added a shortest solution");
                assert_eq!(solution.solution_count, solutions.len());
            }
            (None, SolveOutcome::Unsolved { budget_exhausted, .. }) => {
                assert!(!budget_exhausted);
            }
            (expected, outcome) => panic!("reference {:?} disagrees with {:?}", expected, outcome),
        }
    }

    #[test]
    fn test_solve_single_step() {
        let mut board = decode_level("3100200010", "3012").unwrap();
        let outcome = solve_bfs(&mut board, &SolverConfig::default());
        let solution = outcome.solution().expect("one move solves this board");
        assert_eq!(solution.steps, 1);
        assert_eq!(solution.path.len(), 2);
        assert_eq!(solution.state_count, 2);
        assert_eq!(solution.solution_count, 1);
        assert_eq!(solution.final_state().to_string(), "1,0,2,0,1");

        let mut replay = board.clone();
        replay.load_configuration(solution.final_state());
        assert!(replay.is_target_ok());
        assert_eq!(board.state_string(), "0,0,1,0,1", "Board must be restored after solving");
    }

    #[test]
    fn test_solve_already_solved() {
        let mut board = decode_level("3100201020", "3012").unwrap();
        let outcome = solve_bfs(&mut board, &SolverConfig::default());
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.steps, 0);
        assert_eq!(solution.state_count, 1);
        assert_eq!(solution.path, vec![board.configuration()]);
        assert!(solution.move_steps().is_empty());
    }

    #[test]
    fn test_solve_collects_all_shortest_solutions() {
        let mut board = decode_level("3200210010", "30123012").unwrap();
        let outcome = solve_bfs(&mut board, &first());
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.steps, 2);
        assert_eq!(solution.solution_count, 2);
        assert_eq!(solution.state_count, 7);
        assert_eq!(solution.final_state().to_string(), "2,0,2,1,1");
        assert_eq!(
            solution.shortest_solutions[1].to_string(),
            "1,1,2,1,1"
        );
        assert_eq!(
            solution.move_steps(),
            vec![
                MoveStep::new(Edge::from_coords(0, 0, 1, 0), Edge::from_coords(1, 0, 2, 0)),
                MoveStep::new(Edge::from_coords(1, 0, 2, 0), Edge::from_coords(2, 0, 2, 1)),
            ]
        );
    }

    #[test]
    fn test_random_selection_is_seeded() {
        let mut board = decode_level("3200210010", "30123012").unwrap();
        let config = SolverConfig::default().with_selection(SelectionPolicy::Random { seed: Some(7) });
        let a = solve_bfs(&mut board, &config);
        let b = solve_bfs(&mut board, &config);
        assert_eq!(a, b, "The same seed must pick the same solution");

        let solution = a.solution().unwrap();
        assert_eq!(solution.steps, 2);
        assert!(solution.shortest_solutions.contains(solution.final_state()));
    }

    #[test]
    fn test_solve_matches_reference_bfs() {
        assert_matches_reference(decode_level("3200210010", "30123012").unwrap());
        assert_matches_reference(decode_level("4100300010", "40123").unwrap());
        assert_matches_reference(decode_level("43301210300121", "21320211").unwrap());
        assert_matches_reference(decode_level(SAMPLE_POSITIONS, SAMPLE_NODES).unwrap());
    }

    #[test]
    fn test_random_selection_never_returns_deeper_solution() {
        // On the sample level, non-solved states at the solution depth are dequeued
        // before the first solved one, so deeper solved states are already queued.
        let mut board = decode_level(SAMPLE_POSITIONS, SAMPLE_NODES).unwrap();
        let depth_of = reference_depths(&board);
        let (min_depth, _) = reference_shortest(&board).expect("The sample level is solvable");

        for seed in 0..16 {
            let config =
                SolverConfig::default().with_selection(SelectionPolicy::Random { seed: Some(seed) });
            let outcome = solve_bfs(&mut board, &config);
            let solution = outcome.solution().unwrap();
            assert_eq!(solution.steps, min_depth, "Seed {} returned a longer path", seed);
            assert_eq!(solution.path.len(), min_depth + 1);
            assert_eq!(solution.move_steps().len(), min_depth);
            for state in &solution.shortest_solutions {
                assert_eq!(
                    depth_of[state], solution.steps,
                    "Recorded solution {} is not at the shortest depth",
                    state
                );
            }
        }
    }

    #[test]
    fn test_solve_blocked_by_crossing() {
        let mut board = decode_level("43301210300121", "21320211").unwrap();
        assert_eq!(
            solve_bfs(&mut board, &SolverConfig::default()),
            SolveOutcome::Unsolved {
                state_count: 1,
                budget_exhausted: false
            }
        );
    }

    #[test]
    fn test_solve_stops_at_state_ceiling() {
        // The end node is off the graph, so no configuration can ever be solved.
        let mut board = decode_level("4100550010", "40123").unwrap();

        let outcome = solve_bfs(&mut board, &SolverConfig::default().with_max_states(2));
        assert_eq!(
            outcome,
            SolveOutcome::Unsolved {
                state_count: 2,
                budget_exhausted: true
            }
        );
        assert_eq!(outcome.state_count(), 2);

        let outcome = solve_bfs(&mut board, &SolverConfig::default());
        assert_eq!(
            outcome,
            SolveOutcome::Unsolved {
                state_count: 3,
                budget_exhausted: false
            }
        );
        assert_eq!(board.state_string(), "0,0,1,0,1");
    }
}
