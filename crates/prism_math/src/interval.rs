/// Parameter range `[min, max]` along a ray.
///
/// Hit tests accept a root only if it lies strictly inside; `min <= max` is
/// left to the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    /// Contains nothing; `min > max`.
    pub const EMPTY: Interval = Interval::new(f64::INFINITY, f64::NEG_INFINITY);

    /// Contains every finite value.
    pub const UNIVERSE: Interval = Interval::new(f64::NEG_INFINITY, f64::INFINITY);

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Same lower bound, upper bound moved to `max`.
    ///
    /// Used to narrow the search window to the closest hit found so far.
    #[inline]
    pub fn with_max(self, max: f64) -> Self {
        Self { max, ..self }
    }

    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    /// Inclusive membership.
    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    /// Exclusive membership. NaN is never surrounded.
    #[inline]
    pub fn surrounds(&self, x: f64) -> bool {
        self.min < x && x < self.max
    }

    /// Clamp `x` into the interval.
    ///
    /// Unlike `f64::clamp` this does not panic when `min > max`.
    #[inline]
    pub fn clamp(&self, x: f64) -> f64 {
        if x < self.min {
            self.min
        } else if x > self.max {
            self.max
        } else {
            x
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::EMPTY
    }
}
