use anyhow::{Context, Result};
use clap::Parser;
use plank_solver::codec::{self, SAMPLE_NODES, SAMPLE_POSITIONS};
use plank_solver::engine::Board;
use plank_solver::solver::{
    solve_bfs, SelectionPolicy, SolveOutcome, SolverConfig, DEFAULT_MAX_STATES,
};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Positions string: size, start, end, then four symbols per stick
    #[clap(long, default_value = SAMPLE_POSITIONS)]
    positions: String,

    /// Nodes string: per row, a count followed by the node columns
    #[clap(long, default_value = SAMPLE_NODES)]
    nodes: String,

    /// File with the positions string and the nodes string on two lines
    #[clap(long, conflicts_with_all = ["positions", "nodes"])]
    level_file: Option<PathBuf>,

    /// Give up after exploring this many states
    #[clap(long, default_value_t = DEFAULT_MAX_STATES)]
    max_states: usize,

    /// Seed used to pick among equally short solutions
    #[clap(long)]
    seed: Option<u64>,

    /// Report the first shortest solution found instead of a random one
    #[clap(long, conflicts_with = "seed")]
    first: bool,
}

fn load_board(args: &Args) -> Result<Board> {
    match &args.level_file {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read level file {}", path.display()))?;
            codec::decode_level_text(&content)
                .with_context(|| format!("Invalid level file {}", path.display()))
        }
        None => codec::decode_level(&args.positions, &args.nodes).context("Invalid level strings"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("plank_solver=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut board = load_board(&args)?;
    println!("Initial board:\n{}\n", board);

    let selection = if args.first {
        SelectionPolicy::First
    } else {
        SelectionPolicy::Random { seed: args.seed }
    };
    let config = SolverConfig::default()
        .with_max_states(args.max_states)
        .with_selection(selection);

    match solve_bfs(&mut board, &config) {
        SolveOutcome::Solved(solution) => {
            println!(
                "Solved in {} steps ({} states explored, {} shortest solutions)\n",
                solution.steps, solution.state_count, solution.solution_count
            );
            for (i, (step, state)) in solution
                .move_steps()
                .iter()
                .zip(&solution.path[1..])
                .enumerate()
            {
                board.load_configuration(state);
                println!(
                    "Step {}: {} -> {}  [{}]",
                    i + 1,
                    step.old_position,
                    step.new_position,
                    step.encode()?
                );
                println!("{}\n", board);
            }
        }
        SolveOutcome::Unsolved {
            state_count,
            budget_exhausted: true,
        } => {
            println!(
                "No solution within the limit: gave up after {} states.",
                state_count
            );
        }
        SolveOutcome::Unsolved { state_count, .. } => {
            println!(
                "No solution: all {} reachable states explored.",
                state_count
            );
        }
    }
    Ok(())
}
