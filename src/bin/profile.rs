use std::{sync::Arc, time::Instant};

use mazewalk::{
    generate, logging,
    solvers::{Solver, solve_maze},
};

/// Generates and solves mazes without rendering, reporting steps and timings.
/// Usage: profile [iterations] [dfs|bfs]
fn main() -> std::io::Result<()> {
    logging::init_stderr();

    let mut args = std::env::args();
    args.next(); // Skip executable name
    let num_iters = args
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1);
    let solvers = match args.next().as_deref() {
        Some("dfs") => vec![Solver::Dfs],
        Some("bfs") => vec![Solver::Bfs],
        _ => Solver::ALL.to_vec(),
    };

    for i in 0..num_iters {
        let start = Instant::now();
        let maze = Arc::new(generate());
        tracing::info!("maze {} generated in {:?}", i, start.elapsed());

        for &solver in &solvers {
            let start = Instant::now();
            let mut run = solve_maze(maze.clone(), solver, maze.start(), maze.goal());
            let steps = run.by_ref().count();
            let path_len = run.path().map_or(0, |path| path.len());
            println!(
                "{}\t{}\tsteps={}\tpath={}\tsolved={}\t{:?}",
                i,
                solver,
                steps,
                path_len,
                run.is_solved(),
                start.elapsed()
            );
        }
    }
    Ok(())
}
