#[cfg(test)]
pub mod test {
    use anyhow::{anyhow, Result};
    use std::fs::File;
    use std::io::{BufRead, BufReader};
    use std::path::Path;
    use std::time::{Duration, Instant};

    use crate::solver::{score_to_win_distance, MAX_SCORE, MIN_SCORE};
    use crate::{BitBoard, Solver, HEIGHT, WIDTH};

    /// Extends the empty board by `plies` quiet moves: each ply plays the
    /// first column that is legal and does not complete a four-in-a-row.
    /// The result is a legal non-terminal position, possibly shorter than
    /// requested if every remaining move would win.
    fn quiet_sequence(plies: usize) -> String {
        let mut board = BitBoard::new();
        let mut moves = String::new();
        'plies: for _ in 0..plies {
            for column in 0..WIDTH {
                if board.playable(column) && !board.check_winning_move(column) {
                    board.play(board.move_bitmap(column));
                    moves.push(char::from_digit(column as u32 + 1, 10).unwrap());
                    continue 'plies;
                }
            }
            break;
        }
        moves
    }

    fn mirrored(moves: &str) -> String {
        moves
            .chars()
            .map(|c| {
                let column = c.to_digit(10).unwrap();
                char::from_digit(WIDTH as u32 + 1 - column, 10).unwrap()
            })
            .collect()
    }

    #[test]
    pub fn immediate_win_on_the_bottom_row() -> Result<()> {
        let mut board = BitBoard::from_moves("112233")?;
        let mut solver = Solver::new();

        assert_eq!(solver.solve(&mut board), 18);
        assert_eq!(solver.best_move(&mut board), 3);
        Ok(())
    }

    #[test]
    pub fn immediate_win_up_a_column() -> Result<()> {
        let mut board = BitBoard::from_moves("121212")?;
        let mut solver = Solver::new();

        assert_eq!(solver.solve(&mut board), 18);
        // the immediate-win shortcut applies before the window narrowing,
        // so even a weak solve reports the exact score here
        assert_eq!(solver.weak_solve(&mut board), 18);
        assert_eq!(solver.best_move(&mut board), 0);
        Ok(())
    }

    #[test]
    pub fn unanswerable_double_threat_loses() -> Result<()> {
        // the first player threatens both ends of the bottom row trio
        let mut board = BitBoard::from_moves("27374")?;
        let mut solver = Solver::new();

        assert_eq!(solver.solve(&mut board), -18);
        assert_eq!(solver.weak_solve(&mut board), -1);
        Ok(())
    }

    #[test]
    pub fn solving_leaves_the_board_untouched() -> Result<()> {
        let mut board = BitBoard::from_moves(quiet_sequence(30))?;
        let before = board;
        let mut solver = Solver::new();

        solver.solve(&mut board);
        assert_eq!(board, before);
        Ok(())
    }

    #[test]
    pub fn scores_are_stable_across_resets() -> Result<()> {
        let mut board = BitBoard::from_moves(quiet_sequence(28))?;
        let mut solver = Solver::new();

        let first = solver.solve(&mut board);
        solver.reset();
        let second = solver.solve(&mut board);

        assert_eq!(first, second);
        assert_eq!(solver.weak_solve(&mut board), first.signum());
        Ok(())
    }

    #[test]
    pub fn mirrored_positions_score_alike() -> Result<()> {
        let mut solver = Solver::new();

        for plies in [26, 29, 32] {
            let moves = quiet_sequence(plies);
            let mut board = BitBoard::from_moves(&moves)?;
            let mut mirror = BitBoard::from_moves(mirrored(&moves))?;

            let score = solver.solve(&mut board);
            solver.reset();
            assert_eq!(score, solver.solve(&mut mirror));
            solver.reset();
        }
        Ok(())
    }

    #[test]
    pub fn documented_middle_position() -> Result<()> {
        let moves = "44455554221";
        let mut board = BitBoard::from_moves(moves)?;
        let mut solver = Solver::new();

        let score = solver.solve(&mut board);
        assert!((MIN_SCORE..=MAX_SCORE).contains(&score));

        solver.reset();
        assert_eq!(solver.weak_solve(&mut board), score.signum());

        // the mirror image of the position scores the same
        solver.reset();
        let mut mirror = BitBoard::from_moves(mirrored(moves))?;
        assert_eq!(solver.solve(&mut mirror), score);
        Ok(())
    }

    #[test]
    pub fn win_distance_from_scores() -> Result<()> {
        // winning on the spot, one more tile to place
        let board = BitBoard::from_moves("112233")?;
        assert_eq!(score_to_win_distance(&board, 18), 1);

        // a draw plays out the rest of the board
        let empty = BitBoard::new();
        assert_eq!(score_to_win_distance(&empty, 0), WIDTH * HEIGHT);
        Ok(())
    }

    /// Solves every position of a benchmark file, checking the expected
    /// score when the file carries one, and returns (mean nodes, mean time).
    ///
    /// The benchmark corpora are external to the repository; a missing file
    /// skips the run rather than failing it.
    fn run_corpus(path: &str, weak: bool) -> Result<Option<(f64, Duration)>> {
        if !Path::new(path).exists() {
            eprintln!("corpus {} not present, skipping", path);
            return Ok(None);
        }
        let file = BufReader::new(File::open(path)?);

        let mut solver = Solver::new();
        let mut times = vec![];
        let mut nodes = vec![];

        for line in file.lines() {
            let line = line?;
            let mut test_data = line.split_whitespace();
            let moves = test_data
                .next()
                .ok_or(anyhow!("invalid test data: {}", line))?;
            let expected = test_data.next().map(str::parse::<i32>).transpose()?;

            let mut board = BitBoard::from_moves(moves)?;
            solver.reset();

            let start_time = Instant::now();
            let score = if weak {
                solver.weak_solve(&mut board)
            } else {
                solver.solve(&mut board)
            };
            let finish_time = Instant::now();

            if let Some(expected) = expected {
                let expected = if weak { expected.signum() } else { expected };
                assert_eq!(score, expected, "position {}", moves);
            }
            times.push(finish_time - start_time);
            nodes.push(solver.node_count);
        }

        let mean_nodes = nodes.iter().sum::<usize>() as f64 / nodes.len() as f64;
        let mean_time = times.iter().sum::<Duration>() / times.len() as u32;
        println!(
            "{}: mean time: {:.6}ms, mean no. of positions: {}, kpos/s: {}",
            path,
            mean_time.as_secs_f64() * 1000.0,
            mean_nodes,
            nodes
                .iter()
                .zip(times.iter())
                .map(|(p, t)| *p as f64 / t.as_secs_f64())
                .sum::<f64>()
                / (1000.0 * nodes.len() as f64)
        );
        Ok(Some((mean_nodes, mean_time)))
    }

    #[test]
    pub fn end_easy() -> Result<()> {
        if let Some((mean_nodes, _)) = run_corpus("test_data/Test_L3_R1", false)? {
            // fewer than 14 moves remain; the pruning machinery must keep
            // these positions nearly free
            assert!(mean_nodes < 10_000.0, "mean nodes {}", mean_nodes);
        }
        Ok(())
    }

    #[test]
    pub fn middle_easy() -> Result<()> {
        run_corpus("test_data/Test_L2_R1", false)?;
        Ok(())
    }

    #[test]
    pub fn middle_medium() -> Result<()> {
        run_corpus("test_data/Test_L2_R2", false)?;
        Ok(())
    }

    #[test]
    #[ignore = "whole-tree searches, minutes of runtime"]
    pub fn begin_easy() -> Result<()> {
        run_corpus("test_data/Test_L1_R1", false)?;
        Ok(())
    }

    #[test]
    #[ignore = "whole-tree searches, minutes of runtime"]
    pub fn begin_medium() -> Result<()> {
        run_corpus("test_data/Test_L1_R2", false)?;
        Ok(())
    }

    #[test]
    #[ignore = "whole-tree searches, minutes of runtime"]
    pub fn begin_hard() -> Result<()> {
        run_corpus("test_data/Test_L1_R3", false)?;
        Ok(())
    }

    #[test]
    #[ignore = "searches the full game tree, minutes of runtime"]
    pub fn full_search() -> Result<()> {
        let mut board = BitBoard::new();
        let mut solver = Solver::new();

        let start_time = Instant::now();
        let (score, best) = solver.analyze(&mut board, false);
        let time = start_time.elapsed();

        println!(
            "Full game search\n Time: {:.6}s, No. of positions: {}, kpos/s: {}",
            time.as_secs_f64(),
            solver.node_count,
            solver.node_count as f64 / (1000.0 * time.as_secs_f64())
        );
        println!("Calculated score: {}, Best move: {}", score, best + 1);

        // the first player wins with their very last tile
        assert_eq!(score, 1);
        Ok(())
    }
}
