//! Play Connect 4 in the terminal against the solver

use anyhow::Result;
use clap::Parser;
use connect4_solver::{
    render::{GameBoard, GameState},
    solver::{score_to_win_distance, Solver},
    transposition_table::DEFAULT_TABLE_MB,
};

use std::io::{stdin, stdout, Write};

#[derive(Parser, Debug)]
#[command(version, about = "Play Connect 4 against the perfect solver", long_about = None)]
struct Args {
    /// Transposition table size in megabytes
    #[arg(long, default_value_t = DEFAULT_TABLE_MB)]
    table_mb: usize,

    /// Let the solver make the first move
    #[arg(long)]
    solver_first: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut game = GameBoard::new();
    let mut solver = Solver::with_table_size(args.table_mb);
    println!("Welcome to Connect 4\n");

    let stdin = stdin();
    loop {
        game.display()?;

        let solver_turn = game.player_one_to_move() == args.solver_first;
        let column_one_indexed = if solver_turn {
            let mut board = *game.board();
            solver.reset();
            let (score, column) = solver.analyze(&mut board, false);
            let distance = score_to_win_distance(&board, score);

            let outlook = match score {
                s if s > 0 => format!("wins within {} tiles", distance),
                s if s < 0 => format!("loses within {} tiles", distance),
                _ => "holds the draw".to_string(),
            };
            println!("Solver plays column {} and {}", column + 1, outlook);
            column + 1
        } else {
            print!("> ");
            stdout().flush()?;
            let mut input_str = String::new();
            stdin.read_line(&mut input_str)?;

            match input_str.trim().parse::<usize>() {
                Err(_) => {
                    println!("Invalid number: {}", input_str.trim());
                    continue;
                }
                Ok(column) => column,
            }
        };

        match game.play_checked(column_one_indexed) {
            Err(err) => {
                println!("{}", err);
                continue;
            }
            Ok(state) => match state {
                GameState::Playing => {}
                GameState::PlayerOneWin => {
                    game.display()?;
                    println!("Player 1 wins!");
                    break;
                }
                GameState::PlayerTwoWin => {
                    game.display()?;
                    println!("Player 2 wins!");
                    break;
                }
                GameState::Draw => {
                    game.display()?;
                    println!("Draw!");
                    break;
                }
            },
        }
    }
    Ok(())
}
