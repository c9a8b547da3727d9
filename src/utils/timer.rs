use std::time::Instant;

/// Nanoseconds spent inside [`Timer::measure`], summed over every call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    nanos: u128,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` and adds its wall-clock time to the total.
    #[inline]
    pub fn measure<T>(&mut self, f: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let out = f();
        self.nanos += started.elapsed().as_nanos();
        out
    }

    pub fn nanos(&self) -> u128 {
        self.nanos
    }
}
