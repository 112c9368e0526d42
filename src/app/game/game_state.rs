use crate::{
    app::game::UiEvent,
    carver,
    maze::{Direction, GridTopology, TopologyError, board::Board, cell::GridCell},
};
use std::sync::mpsc::Sender;

pub struct GameState {
    /// The carved maze being played
    topology: GridTopology,
    /// The drawable face of the maze, with ball, goal, and trail painted on
    board: Board,
    /// Tracks where the ball currently is
    current: (u8, u8),
    /// Goal position
    goal: (u8, u8),
    /// Sender to send UI events of the board to the render thread
    ui_event_tx: Sender<UiEvent>,
}

impl GameState {
    /// Set up the initial game state: carve a fresh maze, put the ball in the
    /// top-left cell and the goal in the bottom-right cell.
    ///
    /// In a 1x1 maze the two coincide and the round is over before it starts.
    pub fn initialize(
        rows: u8,
        columns: u8,
        seed: Option<u64>,
        ui_event_tx: Sender<UiEvent>,
    ) -> Result<Self, TopologyError> {
        let topology = carver::generate(rows, columns, seed)?;
        let mut board = Board::from_topology(&topology);

        let start = (0, 0);
        let goal = (rows - 1, columns - 1);
        board.set(Board::cell_coord(goal), GridCell::GOAL);
        board.set(Board::cell_coord(start), GridCell::BALL);

        Ok(GameState {
            topology,
            board,
            current: start,
            goal,
            ui_event_tx,
        })
    }

    /// Get the game state's board reference.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Check if the goal has been reached.
    pub fn goal_reached(&self) -> bool {
        self.current == self.goal
    }

    /// Resend every board slot to the render thread.
    pub fn redraw(&self) {
        for y in 0..self.board.height() {
            for x in 0..self.board.width() {
                self.ui_event_tx
                    .send(UiEvent::GridUpdate {
                        coord: (x, y),
                        new: self.board[(x, y)],
                    })
                    .ok();
            }
        }
    }

    /// Attempt to move the ball in the specified direction.
    /// Marks the previous cell and the gap in between as the ball's trail, or
    /// erases the trail when rolling back onto an already visited cell.
    /// Returns the new position if the move is successful, None otherwise.
    pub fn move_ball(&mut self, direction: Direction) -> Option<(u8, u8)> {
        let new_pos = direction.step(self.current);
        if !self.topology.in_bounds(new_pos) {
            return None;
        }
        // A closed edge is a wall; the ball stays put
        if !self
            .topology
            .is_open_toward(self.current, direction)
            .unwrap_or(false)
        {
            return None;
        }

        let corridor = Board::between_coord(self.current, new_pos);
        if self.board[Board::cell_coord(new_pos)] == GridCell::VISITED {
            tracing::debug!("[game] Moving to already visited cell at {:?}", new_pos);
            // Rolling back over the trail erases it
            self.set_and_notify(Board::cell_coord(self.current), GridCell::EMPTY);
            self.set_and_notify(corridor, GridCell::EMPTY);
        } else {
            tracing::debug!("[game] Moving to new cell at {:?}", new_pos);
            self.set_and_notify(Board::cell_coord(self.current), GridCell::VISITED);
            self.set_and_notify(corridor, GridCell::VISITED);
        }

        // The ball glyph covers the goal glyph on the final move
        self.set_and_notify(Board::cell_coord(new_pos), GridCell::BALL);
        self.current = new_pos;

        Some(self.current)
    }

    fn set_and_notify(&mut self, coord: (u16, u16), cell: GridCell) {
        self.board.set(coord, cell);
        self.ui_event_tx
            .send(UiEvent::GridUpdate { coord, new: cell })
            .ok(); // Error when render thread is closed, ignore
    }
}
