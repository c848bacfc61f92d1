#![forbid(unsafe_code)]

//! Ordered insert/remove difference between two sequences.
//!
//! The difference is a longest-common-subsequence edit script, expressed the
//! way a stack controller wants to consume it:
//!
//! - removal offsets index the **old** sequence,
//! - insertion offsets index the **new** sequence,
//! - both lists are ascending.
//!
//! # Algorithm
//!
//! Common prefix and suffix are stripped first (navigation changes are almost
//! always at the tail), then a dynamic-programming LCS runs over the middle:
//!
//! ```text
//! lcs[i][j] = lcs[i+1][j+1] + 1            if old[i] == new[j]
//!           = max(lcs[i+1][j], lcs[i][j+1])  otherwise
//! ```
//!
//! The backtrack prefers removals over insertions on ties, which keeps the
//! result deterministic.
//!
//! # Invariants
//!
//! 1. `old.len() - removals + insertions == new.len()`.
//! 2. Equal sequences produce an empty difference.
//! 3. The script is minimal: `removals + insertions` equals
//!    `old.len() + new.len() - 2 × LCS`.

/// One step of a [`Difference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Insert the new sequence's element at `offset`.
    Insert { offset: usize },
    /// Remove the old sequence's element at `offset`.
    Remove { offset: usize },
}

impl Change {
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Self::Insert { offset } | Self::Remove { offset } => offset,
        }
    }
}

/// Minimal edit script turning one sequence into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Difference {
    removals: Vec<usize>,
    insertions: Vec<usize>,
}

impl Difference {
    /// Compute the difference from `old` to `new`.
    #[must_use]
    pub fn between<T: PartialEq>(old: &[T], new: &[T]) -> Self {
        let prefix = old
            .iter()
            .zip(new.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let old_rest = &old[prefix..];
        let new_rest = &new[prefix..];
        let suffix = old_rest
            .iter()
            .rev()
            .zip(new_rest.iter().rev())
            .take_while(|(a, b)| a == b)
            .count();
        let old_mid = &old_rest[..old_rest.len() - suffix];
        let new_mid = &new_rest[..new_rest.len() - suffix];

        if old_mid.is_empty() || new_mid.is_empty() {
            return Self {
                removals: (prefix..prefix + old_mid.len()).collect(),
                insertions: (prefix..prefix + new_mid.len()).collect(),
            };
        }

        let (n, m) = (old_mid.len(), new_mid.len());
        let width = m + 1;
        let mut lcs = vec![0u32; (n + 1) * width];
        for i in (0..n).rev() {
            for j in (0..m).rev() {
                lcs[i * width + j] = if old_mid[i] == new_mid[j] {
                    lcs[(i + 1) * width + j + 1] + 1
                } else {
                    lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
                };
            }
        }

        let mut removals = Vec::new();
        let mut insertions = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < n && j < m {
            if old_mid[i] == new_mid[j] {
                i += 1;
                j += 1;
            } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
                removals.push(prefix + i);
                i += 1;
            } else {
                insertions.push(prefix + j);
                j += 1;
            }
        }
        removals.extend((i..n).map(|i| prefix + i));
        insertions.extend((j..m).map(|j| prefix + j));

        Self {
            removals,
            insertions,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.insertions.is_empty()
    }

    /// Total number of changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.removals.len() + self.insertions.len()
    }

    /// Removal offsets into the old sequence, ascending.
    #[must_use]
    pub fn removals(&self) -> &[usize] {
        &self.removals
    }

    /// Insertion offsets into the new sequence, ascending.
    #[must_use]
    pub fn insertions(&self) -> &[usize] {
        &self.insertions
    }

    /// All changes: removals first, then insertions.
    pub fn changes(&self) -> impl Iterator<Item = Change> + '_ {
        self.removals
            .iter()
            .map(|&offset| Change::Remove { offset })
            .chain(
                self.insertions
                    .iter()
                    .map(|&offset| Change::Insert { offset }),
            )
    }

    /// The only change, if there is exactly one.
    #[must_use]
    pub fn single(&self) -> Option<Change> {
        if self.len() == 1 {
            self.changes().next()
        } else {
            None
        }
    }

    /// Whether the removals form one unbroken run of offsets.
    #[must_use]
    pub fn removals_are_contiguous(&self) -> bool {
        self.removals.windows(2).all(|pair| pair[1] == pair[0] + 1)
    }
}
