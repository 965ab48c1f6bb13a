//! A fixed-size, direct-mapped cache of score bounds for searched positions

/// The default size of the transposition table in megabytes
pub const DEFAULT_TABLE_MB: usize = 64;

// a table below this many entries thrashes more than it helps
const MIN_ENTRIES: usize = 1024;

// The stored key keeps only the low 32 bits of the 49-bit board key. Two
// positions indexing the same slot with equal truncated keys are treated as
// equal; the stored value is only ever a bound re-proved by the search
// window, so a false hit cannot corrupt the final score.
#[derive(Copy, Clone)]
struct Entry {
    key: u32,
    value: u8,
    age: u8,
}

impl Entry {
    const fn empty() -> Self {
        Self {
            key: 0,
            value: 0,
            age: 0,
        }
    }
}

/// A cache mapping board keys to score bounds
///
/// # Notes
/// The table is direct-mapped with an always-replace collision policy: each
/// key owns exactly one slot and a store overwrites whatever lives there.
/// The entry count is the largest prime fitting the byte budget, so indexing
/// by `key % len` spreads the arithmetic board keys evenly without extra
/// mixing
///
/// A value of 0 means "nothing useful stored"; callers must never store 0
///
/// Clearing between solves is O(1): [`TranspositionTable::reset`] bumps a
/// generation tag that stored entries must match to be returned, and the
/// entries are physically zeroed only when the tag wraps around
///
/// [`TranspositionTable::reset`]: #method.reset
#[derive(Clone)]
pub struct TranspositionTable {
    entries: Vec<Entry>,
    generation: u8,
}

impl TranspositionTable {
    /// Creates a table of the default size ([`DEFAULT_TABLE_MB`])
    ///
    /// [`DEFAULT_TABLE_MB`]: ../constant.DEFAULT_TABLE_MB.html
    pub fn new() -> Self {
        Self::with_memory(DEFAULT_TABLE_MB)
    }

    /// Creates a table using at most `megabytes` of entry storage
    pub fn with_memory(megabytes: usize) -> Self {
        let capacity = (megabytes << 20) / std::mem::size_of::<Entry>();
        let len = previous_prime(capacity.max(MIN_ENTRIES));
        Self {
            entries: vec![Entry::empty(); len],
            generation: 1,
        }
    }

    /// Stores a value for a board key, overwriting any previous slot contents
    ///
    /// `value` must be non-zero, as 0 marks an empty slot
    pub fn set(&mut self, key: u64, value: u8) {
        debug_assert!(value != 0);
        let len = self.entries.len();
        self.entries[key as usize % len] = Entry {
            key: key as u32,
            value,
            age: self.generation,
        };
    }

    /// Fetches the value stored for a board key, or 0 if nothing useful is stored
    pub fn get(&self, key: u64) -> u8 {
        let entry = self.entries[key as usize % self.entries.len()];
        if entry.key == key as u32 && entry.age == self.generation {
            entry.value
        } else {
            0
        }
    }

    /// Logically empties the table by moving to a fresh generation
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // the tag wrapped, entries of the first generation would otherwise
            // come back to life
            self.entries.fill(Entry::empty());
            self.generation = 1;
        }
    }

    /// The number of entries the table holds
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false, the table never holds zero entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the largest prime less than or equal to `n`
fn previous_prime(n: usize) -> usize {
    let mut candidate = n;
    while !is_prime(candidate) {
        candidate -= 1;
    }
    candidate
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut divisor = 3;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}
