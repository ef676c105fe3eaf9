//! Stereo width: mid/side scaling of a left/right pair.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoWidth {
    /// Side gain. 1.0 leaves the image alone, 0.0 collapses to mono.
    pub width: f64,
}

impl StereoWidth {
    pub fn new(width: f64) -> Self {
        let width = if width.is_finite() { width.clamp(0.0, 4.0) } else { 1.0 };
        Self { width }
    }

    /// Widen one frame. The mid (L+R)/2 is untouched.
    #[inline]
    pub fn process(&self, left: f64, right: f64) -> (f64, f64) {
        let mid = (left + right) * 0.5;
        let side = (left - right) * 0.5 * self.width;
        (mid + side, mid - side)
    }
}
