use crossterm::style::{Color, Stylize};

use std::fmt;

/// Represents a cell in the drawable board, which can be either a path or a
/// wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridCell {
    Path(PathType),
    Wall,
}

impl GridCell {
    pub const EMPTY: GridCell = GridCell::Path(PathType::Empty);
    pub const WALL: GridCell = GridCell::Wall;
    pub const GOAL: GridCell = GridCell::Path(PathType::Goal);
    pub const VISITED: GridCell = GridCell::Path(PathType::Visited);
    pub const BALL: GridCell = GridCell::Path(PathType::Ball);
    /// The width of each cell when rendered, in character widths.
    pub const CELL_WIDTH: u16 = 2;
}

/// Represents different types of path cells on the board.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub enum PathType {
    /// An empty cell, not part of the ball's trail.
    #[default]
    Empty,
    /// A cell the ball has rolled through.
    Visited,
    /// The goal cell of the maze.
    Goal,
    /// The ball itself.
    Ball,
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styled_symbol = match self {
            GridCell::Path(path) => match path {
                PathType::Empty => "  ".with(Color::Reset),
                PathType::Visited => "* ".with(Color::Blue),
                PathType::Goal => "🟥".with(Color::Red),
                PathType::Ball => "🟢".with(Color::Green),
            },
            GridCell::Wall => "⬜".with(Color::White),
        };

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            assert_eq!(
                styled_symbol.content().width(),
                GridCell::CELL_WIDTH as usize,
                "Each cell must occupy exactly two character widths."
            );
        }

        write!(f, "{}", styled_symbol)
    }
}
