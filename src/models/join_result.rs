use std::cmp::Ordering;
use std::fmt::Display;

/// Value type of the per-category sum
///
/// The pipeline sums into `u32`, which can never be NaN. Floating sums are
/// accepted too, and their NaN values always sort after every number.
pub trait SumAmount: Copy + PartialOrd + Display {
    fn is_nan(&self) -> bool;
}

impl SumAmount for u32 {
    fn is_nan(&self) -> bool {
        false
    }
}

impl SumAmount for f64 {
    fn is_nan(&self) -> bool {
        f64::is_nan(*self)
    }
}

/// Flattened aggregate table: one entry per category across three parallel columns
///
/// All three columns always have the same length. Entry order is arbitrary
/// until [`JoinResult::sort`] is called.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinResult<S = u32> {
    pub category_id: Vec<u8>,
    pub num_users: Vec<u32>,
    pub sum_amount: Vec<S>,
}

impl<S: SumAmount> JoinResult<S> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            category_id: Vec::with_capacity(capacity),
            num_users: Vec::with_capacity(capacity),
            sum_amount: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, category_id: u8, sum_amount: S, num_users: u32) {
        self.category_id.push(category_id);
        self.sum_amount.push(sum_amount);
        self.num_users.push(num_users);
    }

    pub fn len(&self) -> usize {
        self.category_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.category_id.is_empty()
    }

    /// Rows as `(category_id, sum_amount, num_users)` in stored order
    pub fn rows(&self) -> impl Iterator<Item = (u8, S, u32)> + '_ {
        self.category_id
            .iter()
            .zip(&self.sum_amount)
            .zip(&self.num_users)
            .map(|((c, s), n)| (*c, *s, *n))
    }

    /// Sort the three columns in lockstep by sum_amount
    ///
    /// In-place heapsort, so nothing is reallocated. Entries with equal sums
    /// end up in unspecified relative order. NaN sums go last in both directions.
    ///
    /// ```
    /// use category_report::models::JoinResult;
    ///
    /// let mut result = JoinResult {
    ///     category_id: vec![0, 1, 2],
    ///     num_users: vec![1, 2, 3],
    ///     sum_amount: vec![10u32, 30, 20],
    /// };
    /// result.sort(true);
    /// assert_eq!(result.category_id, vec![1, 2, 0]);
    /// assert_eq!(result.num_users, vec![2, 3, 1]);
    /// ```
    pub fn sort(&mut self, descending: bool) {
        let n = self.len();
        if n < 2 {
            return;
        }
        for root in (0..n / 2).rev() {
            self.sift_down(root, n, descending);
        }
        for end in (1..n).rev() {
            self.swap(0, end);
            self.sift_down(0, end, descending);
        }
    }

    /// Position ordering of entries `i` and `j` under the requested direction
    fn compare(&self, i: usize, j: usize, descending: bool) -> Ordering {
        let (a, b) = (self.sum_amount[i], self.sum_amount[j]);
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
                if descending {
                    ord.reverse()
                } else {
                    ord
                }
            }
        }
    }

    fn sift_down(&mut self, mut root: usize, end: usize, descending: bool) {
        loop {
            let mut child = 2 * root + 1;
            if child >= end {
                break;
            }
            if child + 1 < end && self.compare(child, child + 1, descending) == Ordering::Less {
                child += 1;
            }
            if self.compare(root, child, descending) != Ordering::Less {
                break;
            }
            self.swap(root, child);
            root = child;
        }
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.category_id.swap(i, j);
        self.num_users.swap(i, j);
        self.sum_amount.swap(i, j);
    }
}
