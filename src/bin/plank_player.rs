use anyhow::{Context, Result};
use clap::Parser;
use plank_solver::codec::{self, SAMPLE_NODES, SAMPLE_POSITIONS};
use plank_solver::engine::{Board, Game};
use plank_solver::geometry::Edge;
use plank_solver::solver::{solve_bfs, SelectionPolicy, SolverConfig};
use std::fs;
use std::io::{self, Write};
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

fn print_sticks(board: &Board) {
    for (i, stick) in board.sticks().enumerate() {
        let marker = if board.selected_stick() == Some(i) { '*' } else { ' ' };
        let state = if stick.active { "active" } else { "out of reach" };
        println!("{} [{}] {} (length {}, {})", marker, i, stick.edge, stick.length(), state);
    }
}

fn parse_numbers(parts: &[&str]) -> Option<Vec<i32>> {
    parts.iter().map(|p| p.parse().ok()).collect()
}

fn hint(game: &Game) {
    let mut scratch = game.board().clone();
    let config = SolverConfig::default().with_selection(SelectionPolicy::First);
    match solve_bfs(&mut scratch, &config).solution() {
        Some(solution) => match solution.move_steps().first() {
            Some(step) => println!(
                "Move {} to {} ({} steps left).",
                step.old_position, step.new_position, solution.steps
            ),
            None => println!("Already solved."),
        },
        None => println!("No solution from here. Try undo ('u') or reset ('r')."),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("plank_solver=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut game = Game::new(load_board(&args)?);
    println!("Welcome to Planks! Reach E from S by moving planks.");

    loop {
        println!("---------------------");
        println!("Steps: {}", game.steps());
        println!("{}\n", game.board());
        print_sticks(game.board());

        if game.is_solved() {
            println!();
            println!("---------------------");
            println!("You win in {} steps!", game.steps());
            println!("Move log: {}", game.move_log()?);
            println!("---------------------");
            break;
        }

        print!("Command (s <stick>, m x1 y1 x2 y2, u, r, l, p <log>, h, q): ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let parts: Vec<&str> = input.split_whitespace().collect();

        match parts.as_slice() {
            ["q"] => {
                println!("Thanks for playing!");
                break;
            }
            ["u"] => {
                if game.undo_last_move() {
                    println!("Move undone.");
                } else {
                    println!("Nothing to undo.");
                }
            }
            ["r"] => {
                game.reset();
                println!("Back to the start.");
            }
            ["l"] => println!("Move log: {}", game.move_log()?),
            ["p", log] => match game.replay(log) {
                Ok(n) => println!("Replayed {} moves.", n),
                Err(err) => println!("Replay failed: {}", err),
            },
            ["h"] => hint(&game),
            ["s", index] => match index.parse::<usize>() {
                Ok(i) if game.select(i) => println!("Selection changed."),
                Ok(i) => println!("Stick {} is not reachable or does not exist.", i),
                Err(_) => println!("Invalid stick index '{}'.", index),
            },
            ["m", coords @ ..] if coords.len() == 4 => {
                let Some(c) = parse_numbers(coords) else {
                    println!("Coordinates must be numbers.");
                    continue;
                };
                if c[0] == c[2] && c[1] == c[3] {
                    println!("An edge needs two different points.");
                    continue;
                }
                let edge = Edge::from_coords(c[0], c[1], c[2], c[3]);
                if !game.board().edges().contains(&edge) {
                    println!("{} is not an edge of this board.", edge);
                } else if game.board().selected_stick().is_none() {
                    println!("Select a stick first with 's <stick>'.");
                } else {
                    match game.move_selected_to(&[edge]) {
                        Some(step) => println!("Moved {} to {}.", step.old_position, step.new_position),
                        None => println!("The selected stick cannot go to {}.", edge),
                    }
                }
            }
            _ => println!("Unknown command. Use s, m, u, r, l, p, h or q."),
        }
    }
    Ok(())
}
