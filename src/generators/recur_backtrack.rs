use rand::Rng;

use crate::{generators::get_rng, maze::Maze};

/// Carves a perfect maze with the randomized depth-first backtracker.
/// Any passages already in the maze are discarded first.
pub fn recursive_backtrack(maze: &mut Maze, seed: Option<u64>) {
    maze.reset();
    if maze.is_empty() {
        return;
    }

    let mut rng = get_rng(seed);

    let mut current = maze.start();
    maze.mark_visited(current);

    // Cells to resume carving from once the current branch is walled in
    let mut stack = Vec::with_capacity(maze.len());

    loop {
        let unvisited = maze
            .neighbors(current)
            .filter(|&c| !maze.is_visited(c))
            .collect::<Vec<_>>();

        if unvisited.is_empty() {
            match stack.pop() {
                Some(cell) => current = cell,
                None => break,
            }
            continue;
        }

        let next = unvisited[rng.random_range(0..unvisited.len())];
        maze.carve(current, next);
        maze.mark_visited(next);
        stack.push(current);
        current = next;
    }
}
