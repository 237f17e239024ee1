mod renderer;

use std::{
    io::{Stdout, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError},
    },
    time::Duration,
};

use crossterm::{
    cursor,
    event::{self, KeyCode},
    queue,
    style::Color,
    terminal::{self, ClearType},
};

use crate::{
    app::renderer::Renderer,
    session::{Session, SessionConfig, SessionEvent},
    solvers::Solver,
};

/// Key bindings, shown below the maze.
const CONTROLS: &str = "g: generate   d: DFS   b: BFS   c: cancel   Esc/q: quit";

enum UserInputEvent {
    KeyPress(event::KeyEvent),
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserAction {
    /// Replace the maze with a new one
    Generate,
    /// Solve the current maze, restarting any solve in progress
    Solve(Solver),
    /// Stop the solve in progress
    Cancel,
    /// Repaint everything, e.g. after a terminal resize
    Redraw,
    Quit,
}

impl UserAction {
    fn from_key(code: KeyCode) -> Option<UserAction> {
        match code {
            KeyCode::Char('g') => Some(UserAction::Generate),
            KeyCode::Char('d') => Some(UserAction::Solve(Solver::Dfs)),
            KeyCode::Char('b') => Some(UserAction::Solve(Solver::Bfs)),
            KeyCode::Char('c') => Some(UserAction::Cancel),
            KeyCode::Char('q') | KeyCode::Esc => Some(UserAction::Quit),
            _ => None,
        }
    }
}

pub struct App {
    session_config: SessionConfig,
    /// Maximum number of session events buffered between the solver worker and the render loop
    event_channel_capacity: usize,
    /// Timeout for receiving session events, a.k.a. how often to check for user input
    event_recv_timeout: Duration,
    /// Timeout for polling input events in the input thread, a.k.a.
    /// how often to check for the quit flag
    user_input_event_poll_timeout: Duration,
    /// Maximum number of session events painted before the terminal is flushed
    max_events_per_frame: usize,
}

impl Default for App {
    fn default() -> Self {
        Self {
            session_config: SessionConfig::default(),
            event_channel_capacity: 256,
            event_recv_timeout: Duration::from_millis(20),
            user_input_event_poll_timeout: Duration::from_millis(100),
            max_events_per_frame: 64,
        }
    }
}

impl App {
    pub fn new(session_config: SessionConfig) -> Self {
        Self {
            session_config,
            ..Self::default()
        }
    }

    /// Set a panic hook to restore terminal state on panic
    /// This ensures that the terminal is not left in raw mode or alternate screen on panic
    /// even if the panic occurs in a different thread
    fn set_panic_hook() {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = App::restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    }

    /// Setup terminal in raw mode and enter alternate screen
    /// Also sets a panic hook to restore terminal on panic
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::set_panic_hook();
        queue!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Restore terminal to original state
    /// Leave alternate screen and disable raw mode
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
        stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Main application loop. Returns when the user quits.
    pub fn run(&self) -> std::io::Result<()> {
        let (session_event_tx, session_event_rx) =
            std::sync::mpsc::sync_channel::<SessionEvent>(self.event_channel_capacity);
        let mut session = Session::new(self.session_config.clone(), session_event_tx);

        // Set by the main thread when the app loop exits
        let quit = Arc::new(AtomicBool::new(false));
        let (user_input_event_tx, user_input_event_rx) =
            std::sync::mpsc::channel::<UserInputEvent>();
        let user_input_event_poll_timeout = self.user_input_event_poll_timeout;
        let quit_for_input = quit.clone();
        // Spawn a thread to listen for user input
        let input_thread_handle = std::thread::spawn(move || -> std::io::Result<()> {
            App::listen_to_user_input(
                user_input_event_tx,
                user_input_event_poll_timeout,
                &quit_for_input,
            )
        });

        let mut renderer = Renderer::new();
        let result = self.app_loop(
            &mut session,
            &mut renderer,
            user_input_event_rx,
            session_event_rx,
        );

        quit.store(true, Ordering::Relaxed);
        // Stops the solver worker, if any
        drop(session);

        match input_thread_handle.join() {
            Ok(input_result) => input_result?,
            Err(_) => tracing::warn!("[app] input thread panicked"),
        }
        result
    }

    /// App loop: applies user actions and paints solver steps as they arrive
    fn app_loop(
        &self,
        session: &mut Session,
        renderer: &mut Renderer,
        user_input_event_rx: Receiver<UserInputEvent>,
        session_event_rx: Receiver<SessionEvent>,
    ) -> std::io::Result<()> {
        tracing::info!("[app loop] started");
        // Run whose events are painted; events from any other run are stale
        let mut active_run: Option<u64> = None;

        renderer.draw_maze(session.maze())?;
        renderer.show_status("Press d or b to solve the maze.", Color::Cyan)?;

        loop {
            loop {
                let action = match user_input_event_rx.try_recv() {
                    Ok(UserInputEvent::KeyPress(key_event)) => UserAction::from_key(key_event.code),
                    Ok(UserInputEvent::Resize) => Some(UserAction::Redraw),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        // Input thread has exited
                        tracing::info!("[app loop] input closed, exiting");
                        return Ok(());
                    }
                };
                let Some(action) = action else {
                    continue;
                };
                tracing::debug!("[app loop] user action: {:?}", action);
                if action == UserAction::Quit {
                    tracing::info!("[app loop] exiting");
                    return Ok(());
                }
                App::apply_action(action, session, renderer, &mut active_run)?;
            }

            let first_event = match session_event_rx.recv_timeout(self.event_recv_timeout) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    // The session owns a sender, so this should not happen while it lives
                    tracing::warn!("[app loop] session event channel closed");
                    return Ok(());
                }
            };
            let pending = std::iter::once(first_event).chain(
                std::iter::from_fn(|| session_event_rx.try_recv().ok())
                    .take(self.max_events_per_frame - 1),
            );
            for event in pending {
                App::apply_session_event(event, renderer, &mut active_run)?;
            }
            renderer.flush()?;
        }
    }

    fn apply_action(
        action: UserAction,
        session: &mut Session,
        renderer: &mut Renderer,
        active_run: &mut Option<u64>,
    ) -> std::io::Result<()> {
        match action {
            UserAction::Generate => {
                let maze = session.regenerate().map_err(std::io::Error::other)?;
                *active_run = None;
                renderer.draw_maze(maze)?;
                renderer.show_status("Generated a new maze.", Color::Green)?;
            }
            UserAction::Solve(solver) => {
                let run_id = session
                    .restart_solve(solver)
                    .map_err(std::io::Error::other)?;
                *active_run = Some(run_id);
                // Clear whatever the previous solve painted
                renderer.draw_maze(session.maze())?;
                renderer.show_status(&format!("Solving with {}...", solver), Color::Yellow)?;
            }
            UserAction::Cancel => {
                let was_solving = session.is_solving();
                session.cancel_solve().map_err(std::io::Error::other)?;
                *active_run = None;
                if was_solving {
                    renderer.show_status("Solve cancelled.", Color::Magenta)?;
                }
            }
            UserAction::Redraw => {
                renderer.redraw()?;
            }
            UserAction::Quit => {}
        }
        Ok(())
    }

    /// Keeps only events of the active run. A finished run stops being active.
    fn accept_session_event(
        event: SessionEvent,
        active_run: &mut Option<u64>,
    ) -> Option<SessionEvent> {
        if *active_run != Some(event.run_id()) {
            tracing::trace!("[app loop] dropping stale event from run {}", event.run_id());
            return None;
        }
        if matches!(event, SessionEvent::Finished { .. }) {
            *active_run = None;
        }
        Some(event)
    }

    fn apply_session_event(
        event: SessionEvent,
        renderer: &mut Renderer,
        active_run: &mut Option<u64>,
    ) -> std::io::Result<()> {
        let Some(event) = App::accept_session_event(event, active_run) else {
            return Ok(());
        };
        match event {
            SessionEvent::Delta { batch, .. } => renderer.paint(&batch)?,
            SessionEvent::Finished {
                solver,
                solved,
                steps,
                ..
            } => {
                let (message, color) = if solved {
                    (format!("{}: path found in {} steps.", solver, steps), Color::Green)
                } else {
                    (format!("{}: no path found after {} steps.", solver, steps), Color::Red)
                };
                renderer.show_status(&message, color)?;
            }
        }
        Ok(())
    }

    /// Listen for user input events (key presses and resize)
    /// This function runs in a separate thread, and is the only place where user input is read
    fn listen_to_user_input(
        user_input_event_tx: Sender<UserInputEvent>,
        event_poll_timeout: Duration,
        quit: &AtomicBool,
    ) -> std::io::Result<()> {
        loop {
            if quit.load(Ordering::Relaxed) {
                return Ok(());
            }

            // Poll for events with a timeout
            if !event::poll(event_poll_timeout)? {
                // No event available, continue loop to check the quit flag again
                continue;
            }

            // We only care about key presses and resizes
            let input_event = match event::read()? {
                event::Event::Key(key_event) if key_event.kind == event::KeyEventKind::Press => {
                    UserInputEvent::KeyPress(key_event)
                }
                event::Event::Resize(_, _) => UserInputEvent::Resize,
                _ => continue,
            };

            let should_exit = matches!(
                &input_event,
                UserInputEvent::KeyPress(key_event)
                    if UserAction::from_key(key_event.code) == Some(UserAction::Quit)
            );

            // Send the input event to the main thread
            if user_input_event_tx.send(input_event).is_err() {
                // Receiver has been dropped, exit the thread
                return Ok(());
            }

            if should_exit {
                tracing::debug!("[input loop] quit key pressed, exiting");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(UserAction::from_key(KeyCode::Char('g')), Some(UserAction::Generate));
        assert_eq!(
            UserAction::from_key(KeyCode::Char('d')),
            Some(UserAction::Solve(Solver::Dfs))
        );
        assert_eq!(
            UserAction::from_key(KeyCode::Char('b')),
            Some(UserAction::Solve(Solver::Bfs))
        );
        assert_eq!(UserAction::from_key(KeyCode::Char('c')), Some(UserAction::Cancel));
        assert_eq!(UserAction::from_key(KeyCode::Esc), Some(UserAction::Quit));
        assert_eq!(UserAction::from_key(KeyCode::Char('q')), Some(UserAction::Quit));
        assert_eq!(UserAction::from_key(KeyCode::Enter), None);
    }

    #[test]
    fn test_events_from_other_runs_are_dropped() {
        use crate::solvers::Status;

        let delta = |run_id| SessionEvent::Delta {
            run_id,
            batch: vec![((0, 0), Status::Visiting)],
        };
        let finished = |run_id| SessionEvent::Finished {
            run_id,
            solver: Solver::Dfs,
            solved: true,
            steps: 3,
        };

        // Run 1 was cancelled and replaced by run 2
        let mut active_run = Some(2);
        assert_eq!(App::accept_session_event(delta(1), &mut active_run), None);
        assert_eq!(App::accept_session_event(finished(1), &mut active_run), None);
        assert_eq!(active_run, Some(2));

        assert_eq!(
            App::accept_session_event(delta(2), &mut active_run),
            Some(delta(2))
        );
        assert_eq!(
            App::accept_session_event(finished(2), &mut active_run),
            Some(finished(2))
        );
        assert_eq!(active_run, None);

        // Nothing is painted once the run has finished or been cancelled
        assert_eq!(App::accept_session_event(delta(2), &mut active_run), None);
    }

    #[test]
    fn test_default_config() {
        let app = App::default();
        assert!(app.max_events_per_frame >= 1);
        assert!(app.event_channel_capacity >= 1);
        assert_eq!(app.session_config.rows, crate::maze::ROWS);
    }
}
