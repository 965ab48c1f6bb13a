//! Textual rendering of a Connect 4 game in the terminal

use anyhow::{anyhow, Result};
use crossterm::{
    cursor::MoveTo,
    style::{style, Attribute, Color, PrintStyledContent, Stylize},
    QueueableCommand,
};

use std::io::{stdout, Write};

use crate::{bitboard::BitBoard, HEIGHT, WIDTH};

/// The stage an interactive game has reached
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GameState {
    Playing,
    PlayerOneWin,
    PlayerTwoWin,
    Draw,
}

/// An interactive Connect 4 game that draws itself to the terminal
///
/// # Notes
/// All game rules live in the wrapped [`BitBoard`]; this type only adds move
/// validation with readable errors, terminal output and end-of-game tracking.
/// Because a `BitBoard` must never contain a completed four-in-a-row, the
/// winning move of a game is detected and reported without being applied
///
/// [`BitBoard`]: ../bitboard/struct.BitBoard.html
pub struct GameBoard {
    board: BitBoard,
    state: GameState,
}

impl GameBoard {
    pub fn new() -> Self {
        Self {
            board: BitBoard::new(),
            state: GameState::Playing,
        }
    }

    /// Accesses the underlying bitboard
    pub fn board(&self) -> &BitBoard {
        &self.board
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Returns whether the first player is the one to move
    pub fn player_one_to_move(&self) -> bool {
        self.board.num_moves() % 2 == 0
    }

    /// Plays a 1-indexed column after validating it, returning the resulting
    /// stage of the game
    pub fn play_checked(&mut self, column_one_indexed: usize) -> Result<GameState> {
        if self.state != GameState::Playing {
            return Err(anyhow!("the game is already over"));
        }
        if column_one_indexed < 1 || column_one_indexed > WIDTH {
            return Err(anyhow!(
                "Invalid move, column {} out of range. Columns must be between 1 and {}",
                column_one_indexed,
                WIDTH
            ));
        }
        let column = column_one_indexed - 1;
        if !self.board.playable(column) {
            return Err(anyhow!("Invalid move, column {} full", column_one_indexed));
        }

        if self.board.check_winning_move(column) {
            // leave the board one move short of the alignment
            self.state = if self.player_one_to_move() {
                GameState::PlayerOneWin
            } else {
                GameState::PlayerTwoWin
            };
        } else {
            self.board.play(self.board.move_bitmap(column));
            if self.board.num_moves() == WIDTH * HEIGHT {
                self.state = GameState::Draw;
            }
        }
        Ok(self.state)
    }

    /// Draws the board to stdout with one colored tile per cell
    pub fn display(&self) -> Result<()> {
        // the current player owns `player_mask`, so on even plies it holds
        // player one's tiles
        let player_one_mask = if self.player_one_to_move() {
            self.board.player_mask()
        } else {
            self.board.player_mask() ^ self.board.board_mask()
        };

        let mut stdout = stdout();

        let cols: String = (1..=WIDTH).map(|x| x.to_string()).collect();
        stdout.queue(PrintStyledContent(style(cols + "\n")))?;
        for _ in 0..HEIGHT {
            stdout.queue(PrintStyledContent(style("\n")))?;
        }
        stdout.flush()?;

        let (origin_x, origin_y) = crossterm::cursor::position()?;

        for column in 0..WIDTH {
            for row in 0..HEIGHT {
                let tile = 1u64 << (column * (HEIGHT + 1) + row);
                let color = if self.board.board_mask() & tile == 0 {
                    Color::DarkBlue
                } else if player_one_mask & tile != 0 {
                    Color::Red
                } else {
                    Color::Yellow
                };

                let (pos_x, pos_y) = (origin_x + column as u16, origin_y - row as u16);
                stdout
                    .queue(MoveTo(pos_x, pos_y))?
                    .queue(PrintStyledContent(
                        style("O")
                            .attribute(Attribute::Bold)
                            .on(Color::DarkBlue)
                            .with(color),
                    ))?;
            }
        }
        stdout
            .queue(MoveTo(origin_x + WIDTH as u16, origin_y))?
            .queue(PrintStyledContent(style("\n")))?;
        stdout.flush()?;
        Ok(())
    }
}

impl Default for GameBoard {
    fn default() -> Self {
        Self::new()
    }
}
