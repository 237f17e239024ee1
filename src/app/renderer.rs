use std::{
    io::{Stdout, Write},
    sync::Arc,
};

use crossterm::{
    QueueableCommand, cursor, queue,
    style::{self, Color, StyledContent, Stylize},
    terminal::{self, ClearType},
};

use crate::{
    maze::{Coord, Grid, Maze},
    solvers::Status,
};

/// Draws the maze as a grid of tiles: one tile per cell, one per wall
/// between cells, plus the outer border.
pub struct Renderer {
    /// Standard output handle to write to the terminal
    stdout: Stdout,
    maze: Option<Arc<Maze>>,
    /// Last painted status of every cell, for full redraws
    statuses: Option<Grid<Status>>,
    /// Whether the maze fit in the terminal at the last redraw
    fits: bool,
    /// Message shown below the maze
    status: (String, Color),
}

impl Renderer {
    /// Width of each tile when rendered, in character widths.
    pub const TILE_WIDTH: u16 = 1;
    /// Rows reserved below the maze for status messages.
    pub const NUM_LOG_ROWS: u16 = 2;

    pub fn new() -> Self {
        Self {
            stdout: std::io::stdout(),
            maze: None,
            statuses: None,
            fits: false,
            status: (String::new(), Color::Reset),
        }
    }

    /// Tile grid dimensions (width, height) for a maze.
    fn tile_dims(maze: &Maze) -> (u16, u16) {
        (maze.cols() as u16 * 2 + 1, maze.rows() as u16 * 2 + 1)
    }

    /// Terminal position of a cell's tile.
    fn cell_position(coord: Coord) -> (u16, u16) {
        (
            (coord.1 as u16 * 2 + 1) * Renderer::TILE_WIDTH,
            coord.0 as u16 * 2 + 1,
        )
    }

    /// Replaces the displayed maze and clears every painted status.
    pub fn draw_maze(&mut self, maze: Arc<Maze>) -> std::io::Result<()> {
        self.statuses = Some(Grid::new(maze.rows(), maze.cols(), Status::NotVisited));
        self.maze = Some(maze);
        self.redraw()
    }

    /// Repaints the maze and every status painted so far.
    pub fn redraw(&mut self) -> std::io::Result<()> {
        let Some(maze) = self.maze.clone() else {
            return Ok(());
        };
        queue!(self.stdout, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;

        self.fits = self.check_size(&maze)?;
        if !self.fits {
            self.queue_status()?;
            return self.stdout.flush();
        }

        for (y, row) in open_tiles(&maze).iter().enumerate() {
            self.stdout.queue(cursor::MoveTo(0, y as u16))?;
            for &open in row {
                self.stdout.queue(style::PrintStyledContent(tile_glyph(open)))?;
            }
        }
        if let Some(statuses) = &self.statuses {
            for (coord, &status) in statuses.iter() {
                if status != Status::NotVisited {
                    Renderer::queue_cell(&mut self.stdout, coord, status)?;
                }
            }
        }
        self.queue_status()?;
        self.stdout.flush()
    }

    /// Checks if the terminal can hold the maze and the status rows.
    /// If not, queues a message asking the user to resize.
    fn check_size(&mut self, maze: &Maze) -> std::io::Result<bool> {
        let (width, height) = Renderer::tile_dims(maze);
        let (term_width, term_height) = terminal::size()?;
        let needed = (width * Renderer::TILE_WIDTH, height + Renderer::NUM_LOG_ROWS);
        if term_width >= needed.0 && term_height >= needed.1 {
            return Ok(true);
        }
        let msg = format!(
            "Terminal size is too small ({}x{}) for a {}x{} maze, which needs {}x{}. Please resize the terminal.\r\n",
            term_width,
            term_height,
            maze.rows(),
            maze.cols(),
            needed.0,
            needed.1
        );
        self.stdout
            .queue(style::PrintStyledContent(msg.with(Color::Yellow)))?;
        Ok(false)
    }

    fn queue_cell(stdout: &mut Stdout, coord: Coord, status: Status) -> std::io::Result<()> {
        let (x, y) = Renderer::cell_position(coord);
        queue!(
            stdout,
            cursor::MoveTo(x, y),
            style::PrintStyledContent(status_glyph(status))
        )
    }

    /// Queues a batch of status changes. Nothing reaches the terminal until `flush`.
    pub fn paint(&mut self, batch: &[(Coord, Status)]) -> std::io::Result<()> {
        let Some(statuses) = self.statuses.as_mut() else {
            return Ok(());
        };
        for &(coord, status) in batch {
            statuses[coord] = status;
            if self.fits {
                Renderer::queue_cell(&mut self.stdout, coord, status)?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.stdout.flush()
    }

    /// Shows a message and the key bindings in the rows below the maze.
    pub fn show_status(&mut self, message: &str, color: Color) -> std::io::Result<()> {
        self.status = (message.to_string(), color);
        self.queue_status()?;
        self.stdout.flush()
    }

    fn queue_status(&mut self) -> std::io::Result<()> {
        let row = match (&self.maze, self.fits) {
            (Some(maze), true) => Renderer::tile_dims(maze).1,
            _ => 2,
        };
        let (message, color) = &self.status;
        queue!(
            self.stdout,
            cursor::MoveTo(0, row),
            terminal::Clear(ClearType::CurrentLine),
            style::PrintStyledContent(message.as_str().with(*color)),
            cursor::MoveTo(0, row + 1),
            terminal::Clear(ClearType::CurrentLine),
            style::PrintStyledContent(super::CONTROLS.with(Color::DarkGrey)),
        )
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Which tiles are open: cells, and walls between cells joined by a passage.
/// Indexed `[y][x]` in tile coordinates.
fn open_tiles(maze: &Maze) -> Vec<Vec<bool>> {
    let (width, height) = Renderer::tile_dims(maze);
    let mut tiles = vec![vec![false; width as usize]; height as usize];
    for row in 0..maze.rows() as usize {
        for col in 0..maze.cols() as usize {
            tiles[row * 2 + 1][col * 2 + 1] = true;
        }
    }
    for (from, to) in maze.passages() {
        // The wall tile sits halfway between the two cell tiles
        let y = from.0 as usize + to.0 as usize + 1;
        let x = from.1 as usize + to.1 as usize + 1;
        tiles[y][x] = true;
    }
    tiles
}

fn checked_glyph(glyph: StyledContent<&'static str>) -> StyledContent<&'static str> {
    #[cfg(debug_assertions)]
    {
        use unicode_width::UnicodeWidthStr;
        assert_eq!(
            glyph.content().width(),
            Renderer::TILE_WIDTH as usize,
            "Each tile must occupy exactly TILE_WIDTH character widths."
        );
    }
    glyph
}

fn tile_glyph(open: bool) -> StyledContent<&'static str> {
    checked_glyph(if open {
        " ".with(Color::Reset)
    } else {
        "█".with(Color::White)
    })
}

fn status_glyph(status: Status) -> StyledContent<&'static str> {
    checked_glyph(match status {
        Status::NotVisited => " ".with(Color::Reset),
        Status::Visiting => "█".with(Color::Yellow),
        Status::Backtracked => "█".with(Color::Red),
    })
}
