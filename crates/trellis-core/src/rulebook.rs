//! Per-offset rule tables for gather-scatter convolution.

/// Table of `(input index, output index)` pairs, one bucket per filter offset.
///
/// Bucket `k` holds every pair whose output site sees its input site at the
/// `k`-th linearized position of the filter window. Each bucket is a flat
/// `Vec<u32>` read as alternating `input, output, input, output, ...` so that
/// a compute kernel can hand it straight to a gather/scatter loop.
///
/// Pair order inside a bucket is discovery order. Duplicate pairs are legal:
/// overlapping windows contribute one pair each.
///
/// # Examples
///
/// ```
/// use trellis_core::RuleBook;
///
/// let mut rules = RuleBook::with_volume(2);
/// rules.push_pair(1, 0, 5);
/// rules.push_pair(1, 3, 6);
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules.bucket(1), &[0, 5, 3, 6]);
/// assert_eq!(rules.pairs(1).collect::<Vec<_>>(), vec![(0, 5), (3, 6)]);
/// assert_eq!(rules.total_pairs(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RuleBook {
    buckets: Vec<Vec<u32>>,
}

impl RuleBook {
    /// Create a rule book with `volume` empty buckets.
    pub fn with_volume(volume: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); volume],
        }
    }

    /// Drop every bucket, leaving a zero-volume rule book.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Grow or shrink to exactly `volume` buckets.
    ///
    /// Existing buckets below `volume` keep their contents.
    pub fn resize(&mut self, volume: usize) {
        self.buckets.resize_with(volume, Vec::new);
    }

    /// Number of buckets (the filter volume).
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if there are no buckets at all.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Raw contents of bucket `offset` as alternating input/output indices.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= self.len()`.
    pub fn bucket(&self, offset: usize) -> &[u32] {
        &self.buckets[offset]
    }

    /// All buckets, in offset order.
    pub fn buckets(&self) -> &[Vec<u32>] {
        &self.buckets
    }

    /// Mutable access to all buckets, in offset order.
    ///
    /// The slice has fixed length, so callers can fill buckets independently
    /// (e.g. one bucket per worker) without changing the volume.
    pub fn buckets_mut(&mut self) -> &mut [Vec<u32>] {
        &mut self.buckets
    }

    /// Iterate the `(input, output)` pairs of bucket `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= self.len()`.
    pub fn pairs(&self, offset: usize) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.buckets[offset].chunks_exact(2).map(|p| (p[0], p[1]))
    }

    /// Append one pair to bucket `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= self.len()`.
    pub fn push_pair(&mut self, offset: usize, input: u32, output: u32) {
        let bucket = &mut self.buckets[offset];
        bucket.push(input);
        bucket.push(output);
    }

    /// Total number of pairs across all buckets.
    pub fn total_pairs(&self) -> usize {
        self.buckets.iter().map(|b| b.len() / 2).sum()
    }

    /// Number of pairs in the fullest bucket (0 for an empty book).
    pub fn max_bucket_pairs(&self) -> usize {
        self.buckets.iter().map(|b| b.len() / 2).max().unwrap_or(0)
    }

    /// Consume the rule book, returning its buckets.
    pub fn into_buckets(self) -> Vec<Vec<u32>> {
        self.buckets
    }
}

/// Append `src` pairs onto `dst`, adding `output_shift` to every output index.
///
/// Input indices are copied unchanged. Used when concatenating per-sample
/// buckets into a batch bucket. Returns `None` (leaving `dst` untouched) if
/// any shifted output index overflows `u32`.
///
/// ```
/// let mut dst = vec![0, 0];
/// assert_eq!(trellis_core::rulebook::append_shifted(&mut dst, &[4, 1, 5, 2], 10), Some(()));
/// assert_eq!(dst, vec![0, 0, 4, 11, 5, 12]);
/// ```
pub fn append_shifted(dst: &mut Vec<u32>, src: &[u32], output_shift: u32) -> Option<()> {
    let start = dst.len();
    dst.reserve(src.len());
    for pair in src.chunks_exact(2) {
        match pair[1].checked_add(output_shift) {
            Some(out) => {
                dst.push(pair[0]);
                dst.push(out);
            }
            None => {
                dst.truncate(start);
                return None;
            }
        }
    }
    Some(())
}
