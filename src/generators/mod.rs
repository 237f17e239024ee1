use rand::{SeedableRng, rngs::StdRng};

mod recur_backtrack;

pub use recur_backtrack::recursive_backtrack;

use crate::maze::{COLS, Maze, ROWS};

/// Get a random number generator, optionally seeded for reproducibility.
fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Builds a freshly carved maze of the default dimensions.
pub fn generate() -> Maze {
    generate_maze(ROWS, COLS, None)
}

/// Builds a freshly carved maze of the given dimensions.
/// The same seed always produces the same maze.
pub fn generate_maze(rows: u8, cols: u8, seed: Option<u64>) -> Maze {
    let mut maze = Maze::new(rows, cols);
    recursive_backtrack(&mut maze, seed);
    tracing::debug!(
        "[generator] carved {}x{} maze with {} passages (seed: {:?})",
        rows,
        cols,
        maze.passage_count(),
        seed
    );
    maze
}
