/// Lexicographic `k`-combinations of the indices `0..n`.
///
/// For `n = 3, k = 2` this yields `[0, 1]`, `[0, 2]`, `[1, 2]`, i.e. the
/// subsets of an ordered list in the order its items appear. The iterator
/// is `Clone`, so a pass can be replayed from any point.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    k: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            k,
            indices: (0..k).collect(),
            done: k == 0 || k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let current = self.indices.clone();

        // Find the rightmost index that can still move right.
        let mut i = self.k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.indices[i] < self.n - self.k + i {
                self.indices[i] += 1;
                for j in i + 1..self.k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }
        }

        Some(current)
    }
}

/// Every way of picking one entry from each of several ordered lists.
///
/// The first list varies slowest, so the first item yielded takes the
/// first entry of every list. Yields nothing if any list is empty or there
/// are no lists.
#[derive(Debug, Clone)]
pub struct TierProduct {
    sizes: Vec<usize>,
    indices: Vec<usize>,
    done: bool,
}

impl TierProduct {
    pub fn new(sizes: Vec<usize>) -> Self {
        let done = sizes.is_empty() || sizes.iter().any(|&s| s == 0);
        Self {
            indices: vec![0; sizes.len()],
            sizes,
            done,
        }
    }

    /// Number of items the product yields, `None` on overflow.
    pub fn count(sizes: &[usize]) -> Option<usize> {
        if sizes.is_empty() {
            return Some(0);
        }
        sizes.iter().try_fold(1usize, |acc, &s| acc.checked_mul(s))
    }
}

impl Iterator for TierProduct {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let current = self.indices.clone();

        let mut i = self.sizes.len();
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            self.indices[i] += 1;
            if self.indices[i] < self.sizes[i] {
                break;
            }
            self.indices[i] = 0;
        }

        Some(current)
    }
}
