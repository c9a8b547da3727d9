use super::NUM_SYMBOLS;

/// Occurrence count of every byte value.
///
/// Partial histograms over disjoint ranges combine with [`Histogram::merge`], which is
/// an element-wise sum and therefore independent of the order workers finish in.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Histogram {
    counts: [u64; NUM_SYMBOLS],
}

impl Default for Histogram {
    fn default() -> Self {
        Self { counts: [0; NUM_SYMBOLS] }
    }
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(bytes: &[u8]) -> Self {
        let mut histo = Self::default();
        histo.add(bytes);
        histo
    }

    #[inline(always)]
    pub fn add(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.counts[b as usize] += 1;
        }
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.merge_from(&other);
        self
    }

    pub fn merge_from(&mut self, other: &Self) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
    }

    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    pub fn counts(&self) -> &[u64; NUM_SYMBOLS] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of byte values that occur at least once.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// `(symbol, count)` for every present symbol, in ascending symbol order.
    pub fn present(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(s, &c)| (s as u8, c))
    }

    /// Shannon entropy in bits per symbol, the lower bound for the average code length.
    pub fn entropy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }

        let total = total as f64;
        self.present().fold(0.0, |entropy, (_, c)| {
            let p = c as f64 / total;
            entropy - p * p.log2()
        })
    }
}
