//! Line-oriented benchmark driver for the solver
//!
//! Reads move sequences one per line, solves each position and prints
//! `<move-sequence> <score> <nodes-explored> <microseconds>` per line.
//! Lines that don't parse as a legal non-terminal position produce a
//! diagnostic on the log channel and an empty output line, keeping the
//! output aligned with the input.

use anyhow::Result;
use clap::Parser;
use connect4_solver::{bitboard::BitBoard, solver::Solver, transposition_table::DEFAULT_TABLE_MB};

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(version, about = "Solve Connect 4 positions read line by line", long_about = None)]
struct Args {
    /// Position file with one move sequence per line, stdin when omitted.
    /// Anything after the first whitespace on a line (such as an expected
    /// score) is ignored
    input: Option<PathBuf>,

    /// Transposition table size in megabytes
    #[arg(long, default_value_t = DEFAULT_TABLE_MB)]
    table_mb: usize,

    /// Only determine win/draw/loss instead of the exact score
    #[arg(long)]
    weak: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut solver = Solver::with_table_size(args.table_mb);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut solved = 0usize;
    let mut total_nodes = 0usize;
    let mut total_micros = 0u128;

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        let sequence = match line.split_whitespace().next() {
            Some(token) => token,
            None => {
                log::warn!("line {}: no move sequence", line_number + 1);
                writeln!(out)?;
                continue;
            }
        };
        let mut board = match BitBoard::from_moves(sequence) {
            Ok(board) => board,
            Err(err) => {
                log::warn!("line {}: {}", line_number + 1, err);
                writeln!(out)?;
                continue;
            }
        };

        solver.reset();
        let start = Instant::now();
        let score = if args.weak {
            solver.weak_solve(&mut board)
        } else {
            solver.solve(&mut board)
        };
        let micros = start.elapsed().as_micros();

        writeln!(out, "{} {} {} {}", sequence, score, solver.node_count, micros)?;

        solved += 1;
        total_nodes += solver.node_count;
        total_micros += micros;
    }

    if solved > 0 {
        log::info!(
            "solved {} positions, mean nodes {}, mean time {}us",
            solved,
            total_nodes / solved,
            total_micros / solved as u128
        );
    }
    Ok(())
}
