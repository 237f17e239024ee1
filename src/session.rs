use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{SyncSender, TrySendError},
    },
    thread::JoinHandle,
    time::Duration,
};

use thiserror::Error;

use crate::{
    generators::generate_maze,
    maze::{COLS, Maze, ROWS},
    solvers::{DeltaBatch, SolveRun, Solver, solve_maze},
};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub rows: u8,
    pub cols: u8,
    /// Seed for the first maze. Each regeneration uses the next seed.
    pub seed: Option<u64>,
    /// Pause after each solver step so the animation stays visible
    pub step_delay: Duration,
    /// How long the worker waits before retrying when the event channel is full
    pub send_retry_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rows: ROWS,
            cols: COLS,
            seed: None,
            step_delay: Duration::from_micros(500),
            send_retry_interval: Duration::from_millis(1),
        }
    }
}

/// Events streamed from the solver worker to the renderer, tagged with the
/// id of the run that produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Delta {
        run_id: u64,
        batch: DeltaBatch,
    },
    Finished {
        run_id: u64,
        solver: Solver,
        solved: bool,
        steps: usize,
    },
}

impl SessionEvent {
    pub fn run_id(&self) -> u64 {
        match self {
            SessionEvent::Delta { run_id, .. } | SessionEvent::Finished { run_id, .. } => *run_id,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{solver} (run {run_id}) is still solving the maze")]
    SolveInProgress { run_id: u64, solver: Solver },
    #[error("cannot solve an empty {rows}x{cols} maze")]
    EmptyMaze { rows: u8, cols: u8 },
    #[error("solver worker for run {0} panicked")]
    WorkerPanicked(u64),
    #[error("failed to spawn solver worker: {0}")]
    Spawn(#[from] std::io::Error),
}

struct ActiveSolve {
    run_id: u64,
    solver: Solver,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<bool>,
}

/// Owns the current maze and at most one solver worker running against it.
pub struct Session {
    config: SessionConfig,
    maze: Arc<Maze>,
    /// Number of mazes generated so far, used to derive the next seed
    generation: u64,
    events: SyncSender<SessionEvent>,
    active: Option<ActiveSolve>,
    next_run_id: u64,
}

impl Session {
    pub fn new(config: SessionConfig, events: SyncSender<SessionEvent>) -> Self {
        let maze = Arc::new(generate_maze(config.rows, config.cols, config.seed));
        Self {
            config,
            maze,
            generation: 1,
            events,
            active: None,
            next_run_id: 1,
        }
    }

    pub fn maze(&self) -> Arc<Maze> {
        self.maze.clone()
    }

    /// Whether a solver worker is still producing steps.
    pub fn is_solving(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }

    /// Starts solving the current maze on a worker thread and returns the run id.
    /// Fails if another solve is still running or the maze has no cells.
    pub fn start_solve(&mut self, solver: Solver) -> Result<u64, SessionError> {
        if self.maze.is_empty() {
            return Err(SessionError::EmptyMaze {
                rows: self.maze.rows(),
                cols: self.maze.cols(),
            });
        }
        if let Some(active) = self.active.as_ref().filter(|a| !a.handle.is_finished()) {
            return Err(SessionError::SolveInProgress {
                run_id: active.run_id,
                solver: active.solver,
            });
        }
        // Reap the finished worker, if any
        self.cancel_solve()?;

        let run_id = self.next_run_id;
        self.next_run_id += 1;

        let cancel = Arc::new(AtomicBool::new(false));
        let run = solve_maze(self.maze(), solver, self.maze.start(), self.maze.goal())
            .with_cancel(cancel.clone());
        let worker = Worker {
            run_id,
            events: self.events.clone(),
            cancel: cancel.clone(),
            step_delay: self.config.step_delay,
            send_retry_interval: self.config.send_retry_interval,
        };
        let handle = std::thread::Builder::new()
            .name(format!("solver-{}", run_id))
            .spawn(move || worker.run(run))?;

        tracing::info!("[session] started {} as run {}", solver, run_id);
        self.active = Some(ActiveSolve {
            run_id,
            solver,
            cancel,
            handle,
        });
        Ok(run_id)
    }

    /// Cancels any in-flight solve, waits for it, then starts a new one.
    pub fn restart_solve(&mut self, solver: Solver) -> Result<u64, SessionError> {
        self.cancel_solve()?;
        self.start_solve(solver)
    }

    /// Stops the in-flight solve, if any, and waits for its worker to exit.
    pub fn cancel_solve(&mut self) -> Result<(), SessionError> {
        let Some(active) = self.active.take() else {
            return Ok(());
        };
        active.cancel.store(true, Ordering::Relaxed);
        match active.handle.join() {
            Ok(solved) => {
                tracing::debug!(
                    "[session] run {} stopped (solved: {})",
                    active.run_id,
                    solved
                );
                Ok(())
            }
            Err(_) => Err(SessionError::WorkerPanicked(active.run_id)),
        }
    }

    /// Replaces the maze with a freshly carved one, cancelling any in-flight solve first.
    pub fn regenerate(&mut self) -> Result<Arc<Maze>, SessionError> {
        self.cancel_solve()?;
        let seed = self
            .config
            .seed
            .map(|seed| seed.wrapping_add(self.generation));
        self.generation += 1;
        self.maze = Arc::new(generate_maze(self.config.rows, self.config.cols, seed));
        tracing::info!("[session] generated maze #{}", self.generation);
        Ok(self.maze())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.cancel_solve() {
            tracing::warn!("[session] {}", e);
        }
    }
}

/// Drives one solve run, pacing its steps into the event channel.
struct Worker {
    run_id: u64,
    events: SyncSender<SessionEvent>,
    cancel: Arc<AtomicBool>,
    step_delay: Duration,
    send_retry_interval: Duration,
}

impl Worker {
    /// Returns whether the goal was reached.
    fn run(self, mut run: SolveRun) -> bool {
        let solver = run.solver();
        let mut steps = 0;
        // Not a for loop: the run is queried again when delivery stops early
        while let Some(batch) = run.next() {
            steps += 1;
            let event = SessionEvent::Delta {
                run_id: self.run_id,
                batch,
            };
            if !self.deliver(event) {
                tracing::debug!("[solver] run {} stopped after {} steps", self.run_id, steps);
                return run.is_solved();
            }
            std::thread::sleep(self.step_delay);
        }

        let solved = run.is_solved();
        if self.cancel.load(Ordering::Relaxed) {
            tracing::debug!("[solver] run {} cancelled after {} steps", self.run_id, steps);
            return solved;
        }
        tracing::info!(
            "[solver] {} finished run {} in {} steps (solved: {})",
            solver,
            self.run_id,
            steps,
            solved
        );
        self.deliver(SessionEvent::Finished {
            run_id: self.run_id,
            solver,
            solved,
            steps,
        });
        solved
    }

    /// Sends an event, waiting while the channel is full.
    /// Returns false if the run was cancelled or the receiver is gone.
    fn deliver(&self, mut event: SessionEvent) -> bool {
        loop {
            if self.cancel.load(Ordering::Relaxed) {
                return false;
            }
            match self.events.try_send(event) {
                Ok(()) => return true,
                Err(TrySendError::Full(returned)) => {
                    event = returned;
                    std::thread::sleep(self.send_retry_interval);
                }
                Err(TrySendError::Disconnected(_)) => {
                    tracing::debug!("[solver] event receiver dropped, stopping run {}", self.run_id);
                    return false;
                }
            }
        }
    }
}
