use serde::Serialize;

/// An even split of `total` bytes into `count` chunks of `size` bytes.
///
/// `count * size` may fall short of `total`; the bytes left over form one final short
/// chunk which [`ChunkPlan::ranges`] yields last.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChunkPlan {
    pub total: u64,
    pub count: u64,
    pub size: u64,
}

impl ChunkPlan {
    /// Splits `total` bytes into chunks no larger than `max` (a zero `max` counts as 1).
    pub fn macrochunks(total: u64, max: u64) -> Self {
        if total == 0 {
            return Self::default();
        }

        let max = max.max(1);
        let count = if total <= max { 1 } else { 1 + (total - 1) / max };

        Self { total, count, size: total / count }
    }

    /// Splits a macrochunk so that each microchunk's lookup buffer, `expansion` bytes per
    /// input byte, fits in `available` bytes of memory.
    ///
    /// One extra microchunk is always added on top of the strict quotient. An unknown
    /// (zero) memory estimate keeps the macrochunk whole.
    pub fn microchunks(total: u64, available: u64, expansion: u64) -> Self {
        if total == 0 {
            return Self::default();
        }
        if available == 0 {
            return Self { total, count: 1, size: total };
        }

        let needed = total.saturating_mul(expansion.max(1));
        let count = (1 + (needed - 1) / available + 1).min(total);

        Self { total, count, size: total / count }
    }

    /// Bytes not covered by the `count` even chunks.
    pub fn remainder(&self) -> u64 {
        self.total - self.count * self.size
    }

    /// Number of ranges [`ChunkPlan::ranges`] yields, the short chunk included.
    pub fn num_ranges(&self) -> u64 {
        self.count + u64::from(self.remainder() > 0)
    }

    /// `(offset, length)` of every chunk in order, ending with the short chunk if any.
    pub fn ranges(&self) -> impl Iterator<Item = (u64, u64)> {
        let plan = *self;
        let even = (0..plan.count).map(move |k| (k * plan.size, plan.size));
        let tail = Some(plan.remainder())
            .filter(|&r| r > 0)
            .map(move |r| (plan.count * plan.size, r));

        even.chain(tail)
    }
}
