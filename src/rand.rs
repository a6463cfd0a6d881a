/// Small deterministic PRNG used for timer jitter.
#[derive(Debug, Clone)]
pub(crate) struct Rand {
    state: u64,
}

impl Rand {
    pub(crate) const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub(crate) fn rand_u32(&mut self) -> u32 {
        // sPCG32 from https://www.pcg-random.org/paper.html
        // see also https://nullprogram.com/blog/2017/09/21/
        const M: u64 = 0xbb2efcec3c39611d;
        const A: u64 = 0x7590ef39;

        let s = self.state.wrapping_mul(M).wrapping_add(A);
        self.state = s;

        let shift = 29 - (s >> 61);
        (s >> shift) as u32
    }

    /// Return a value uniformly drawn from `0..=max`.
    pub(crate) fn rand_inclusive(&mut self, max: u32) -> u32 {
        match max.checked_add(1) {
            Some(bound) => self.rand_u32() % bound,
            None => self.rand_u32(),
        }
    }
}
