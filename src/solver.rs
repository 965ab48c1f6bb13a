//! The game tree search that solves Connect 4 positions

use crate::{bitboard::BitBoard, transposition_table::TranspositionTable, HEIGHT, WIDTH};

use std::cmp::Ordering;

/// The minimum possible score of a position
pub const MIN_SCORE: i32 = -((WIDTH * HEIGHT) as i32) / 2 + 3;
/// The maximum possible score of a position
pub const MAX_SCORE: i32 = ((WIDTH * HEIGHT) as i32 + 1) / 2 - 3;

/// Orders the candidate moves of a single node, best-scored first
///
/// Insertion sort wins here: the buffer holds at most [`WIDTH`] entries and
/// callers push in roughly ascending score order
///
/// [`WIDTH`]: ../constant.WIDTH.html
struct MoveSorter {
    size: usize,
    // move bitmap, column and score
    moves: [(u64, usize, i32); WIDTH],
}

impl MoveSorter {
    pub fn new() -> Self {
        Self {
            size: 0,
            moves: [(0, 0, 0); WIDTH],
        }
    }
    pub fn push(&mut self, new_move: u64, column: usize, score: i32) {
        let mut pos = self.size;
        self.size += 1;
        while pos != 0 && self.moves[pos - 1].2 > score {
            self.moves[pos] = self.moves[pos - 1];
            pos -= 1;
        }
        self.moves[pos] = (new_move, column, score);
    }
}

impl Iterator for MoveSorter {
    type Item = (u64, usize);

    fn next(&mut self) -> Option<Self::Item> {
        match self.size {
            0 => None,
            _ => {
                self.size -= 1;
                Some((self.moves[self.size].0, self.moves[self.size].1))
            }
        }
    }
}

/// Returns a slice ordering the columns from the middle outwards, as
/// the middle columns are often better moves
pub const fn move_order() -> [usize; WIDTH] {
    let mut move_order = [0; WIDTH];
    let mut i = 0;
    while i < WIDTH {
        move_order[i] = (WIDTH / 2) + (i % 2) * (i / 2 + 1) - (1 - i % 2) * (i / 2);
        i += 1;
    }
    move_order
}

/// An agent to solve Connect 4 positions
///
/// # Notes
/// This agent uses a classical game tree search with various optimisations to
/// find the mathematically best move(s) in any position, thus 'solving' the game
///
/// The solver owns a [transposition table] that is reused from solve to solve;
/// call [`Solver::reset`] between positions so stale bounds from the previous
/// search cannot leak into the next one. The board being solved is mutated in
/// place through play/undo pairs and handed back untouched
///
/// # Position Scoring
/// A position is scored by how far a forced win is from the end of the game
/// for either player. If the first player wins with their final placed tile
/// (their 21st tile on a 7x6 board) the score is 1, or -1 if the second player
/// wins with their final tile. Earlier wins have scores further from 0, up to
/// 18/-18, where a player wins with their 4th tile. A drawn position has a
/// score of 0
///
/// [transposition table]: ../transposition_table/struct.TranspositionTable.html
/// [`Solver::reset`]: #method.reset
pub struct Solver {
    /// The number of nodes searched by this `Solver` so far (for diagnostics only)
    pub node_count: usize,
    transposition_table: TranspositionTable,
}

impl Solver {
    /// Creates a new `Solver` with a default-sized transposition table
    pub fn new() -> Self {
        Self {
            node_count: 0,
            transposition_table: TranspositionTable::new(),
        }
    }

    /// Creates a new `Solver` whose transposition table uses at most
    /// `megabytes` of entry storage
    pub fn with_table_size(megabytes: usize) -> Self {
        Self::with_transposition_table(TranspositionTable::with_memory(megabytes))
    }

    /// Creates a new `Solver` from an existing transposition table
    pub fn with_transposition_table(transposition_table: TranspositionTable) -> Self {
        Self {
            node_count: 0,
            transposition_table,
        }
    }

    /// Clears the per-solve node counter and retires the transposition table
    /// entries of the previous solve
    pub fn reset(&mut self) {
        self.node_count = 0;
        self.transposition_table.reset();
    }

    /// Calculates the exact score of the position (see [Position Scoring])
    ///
    /// [Position Scoring]: #position-scoring
    pub fn solve(&mut self, board: &mut BitBoard) -> i32 {
        self.analyze(board, false).0
    }

    /// Calculates only the sign of the score: 1 for a win, 0 for a draw,
    /// -1 for a loss
    ///
    /// Considerably faster than [`Solver::solve`] as the narrow window prunes
    /// most of the tree
    ///
    /// [`Solver::solve`]: #method.solve
    pub fn weak_solve(&mut self, board: &mut BitBoard) -> i32 {
        self.analyze(board, true).0
    }

    /// Calculates the column achieving the best score in the position
    pub fn best_move(&mut self, board: &mut BitBoard) -> usize {
        self.analyze(board, false).1
    }

    /// Calculates the score of the position and a column achieving it,
    /// iteratively narrowing the score window with null-window probes
    ///
    /// With `weak` the window starts at `[-1, 1]` and only the sign of the
    /// score is determined
    pub fn analyze(&mut self, board: &mut BitBoard, weak: bool) -> (i32, usize) {
        // a position that wins this move is outside negamax's remit, which
        // assumes the current player cannot win immediately
        if board.can_win_next() {
            let score = ((WIDTH * HEIGHT + 1 - board.num_moves()) / 2) as i32;
            let column = (0..WIDTH)
                .find(|&column| board.playable(column) && board.check_winning_move(column))
                .unwrap_or(WIDTH);
            return (score, column);
        }

        self.node_count = 0;

        let mut min = -(((WIDTH * HEIGHT - board.num_moves()) / 2) as i32);
        let mut max = ((WIDTH * HEIGHT + 1 - board.num_moves()) / 2) as i32;
        if weak {
            min = -1;
            max = 1;
        }

        let mut next_move = WIDTH;
        // iteratively narrow the search window
        while min < max {
            let mut med = min + (max - min) / 2;
            // most positions settle near 0, pull the probe towards the
            // half-bounds to get there in fewer iterations
            if med <= 0 && min / 2 < med {
                med = min / 2
            } else if med >= 0 && max / 2 > med {
                med = max / 2
            }

            // use a null window to determine if the actual score is greater
            // or less than med
            let (r, best_move) = self.top_level_search(board, med, med + 1);
            next_move = best_move;

            // r is not necessarily the exact true score, but its value
            // indicates whether the true score is above or below the probe
            if r <= med {
                // actual score <= med
                max = r
            } else {
                // actual score > med
                min = r;
            }
        }
        // min and max have met on the true score
        (min, next_move)
    }

    /// Searches the root moves of a position, tracking which column produced
    /// the returned score
    ///
    /// Bypasses the transposition table, whose bounds would hide the
    /// distinction between the root's moves
    fn top_level_search(&mut self, board: &mut BitBoard, mut alpha: i32, beta: i32) -> (i32, usize) {
        assert!(alpha < beta);
        assert!(!board.can_win_next());
        self.node_count += 1;

        // look for moves that don't give the opponent a next turn win
        let non_losing_moves = board.non_losing_moves();
        if non_losing_moves == 0 {
            // every move loses, give up with the first legal column
            let first = (0..WIDTH)
                .find(|&column| board.playable(column))
                .unwrap_or(WIDTH);
            return (
                -((WIDTH * HEIGHT - board.num_moves()) as i32) / 2,
                first,
            );
        }

        // with two empty squares left every remaining move is harmless
        if board.num_moves() >= WIDTH * HEIGHT - 2 {
            return (0, BitBoard::column_from_move(non_losing_moves));
        }

        let mut moves = MoveSorter::new();
        // pushing the edge columns first reduces the amount of sorting, as
        // these moves score worse on average
        for i in (0..WIDTH).rev() {
            let column = move_order()[i];
            let candidate = non_losing_moves & BitBoard::column_mask(column);
            if candidate != 0 {
                moves.push(candidate, column, board.move_score(candidate));
            }
        }

        // search the next level of the tree and keep track of the best move
        let mut best_score = MIN_SCORE - 1;
        let mut best_move = WIDTH;
        for (move_bitmap, column) in moves {
            board.play(move_bitmap);
            // the search window is flipped for the other player
            let score = -self.negamax(board, -beta, -alpha);
            board.undo(move_bitmap);

            // if the actual score is better than beta, we can prune the tree
            // because the other player will not pick this branch
            if score >= beta {
                return (score, column);
            }
            if score > alpha {
                alpha = score;
            }
            if score > best_score {
                best_score = score;
                best_move = column;
            }
        }

        (alpha, best_move)
    }

    /// Performs the recursive alpha-beta search
    ///
    /// Returns the exact score of the position if it lies inside
    /// `(alpha, beta)`, otherwise a bound on it: at most `alpha`, or at
    /// least `beta`
    ///
    /// Assumes the current player cannot win this move; the move filtering
    /// guarantees the same for every recursive call
    fn negamax(&mut self, board: &mut BitBoard, mut alpha: i32, mut beta: i32) -> i32 {
        assert!(alpha < beta);
        assert!(!board.can_win_next());
        self.node_count += 1;

        // look for moves that don't give the opponent a next turn win
        let non_losing_moves = board.non_losing_moves();
        if non_losing_moves == 0 {
            // the opponent wins within two plies whatever is played
            return -((WIDTH * HEIGHT - board.num_moves()) as i32) / 2;
        }

        // with two empty squares left every remaining move is harmless
        if board.num_moves() >= WIDTH * HEIGHT - 2 {
            return 0;
        }

        // the quickest possible loss bounds the score from below
        let min = -(((WIDTH * HEIGHT - 2 - board.num_moves()) / 2) as i32);
        if alpha < min {
            alpha = min;
            if alpha >= beta {
                // prune the exploration
                return alpha;
            }
        }

        // the quickest possible win bounds the score from above, unless the
        // transposition table remembers a tighter bound
        let mut max = ((WIDTH * HEIGHT - 1 - board.num_moves()) / 2) as i32;
        let key = board.key();
        let value = self.transposition_table.get(key) as i32;
        if value != 0 {
            max = value + MIN_SCORE - 1;
        }
        if beta > max {
            beta = max;
            if alpha >= beta {
                // prune the exploration
                return beta;
            }
        }

        let mut moves = MoveSorter::new();
        // pushing the edge columns first reduces the amount of sorting, as
        // these moves score worse on average
        for i in (0..WIDTH).rev() {
            let column = move_order()[i];
            let candidate = non_losing_moves & BitBoard::column_mask(column);
            if candidate != 0 {
                moves.push(candidate, column, board.move_score(candidate));
            }
        }

        // search the next level of the tree
        for (move_bitmap, _column) in moves {
            board.play(move_bitmap);
            // the search window is flipped for the other player
            let score = -self.negamax(board, -beta, -alpha);
            board.undo(move_bitmap);

            // if a child node's score is better than beta, we can prune the
            // tree here because a perfect opponent will not pick this branch
            if score >= beta {
                return score;
            }
            if score > alpha {
                alpha = score;
            }
        }

        // save an upper bound of the score, offset by one so that a stored
        // bound is never 0, which marks an empty slot
        self.transposition_table.set(key, (alpha - MIN_SCORE + 1) as u8);
        alpha
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a position score to a win distance in a single player's tiles
pub fn score_to_win_distance(board: &BitBoard, score: i32) -> usize {
    match score.cmp(&0) {
        Ordering::Equal => WIDTH * HEIGHT - board.num_moves(),
        Ordering::Greater => (WIDTH * HEIGHT / 2 + 1 - score as usize) - board.num_moves() / 2,
        Ordering::Less => (WIDTH * HEIGHT / 2 + 1) - (-score as usize) - board.num_moves() / 2,
    }
}
