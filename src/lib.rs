pub mod app;
pub mod generators;
pub mod logging;
pub mod maze;
pub mod session;
pub mod solvers;

pub use generators::{generate, generate_maze};
pub use maze::{COLS, Coord, Maze, ROWS};
pub use solvers::{DeltaBatch, Status, solve_bfs, solve_dfs};
