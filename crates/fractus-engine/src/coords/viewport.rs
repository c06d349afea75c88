/// Size of the drawable area in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameSize {
    pub width: f32,
    pub height: f32,
}

impl FrameSize {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The minor dimension; the fractal is normalized against it so that the
    /// picture is never stretched on non-square frames.
    #[inline]
    pub fn min_dim(self) -> f32 {
        self.width.min(self.height)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for FrameSize {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width as f32, size.height as f32)
    }
}

/// World-space window mapped onto the frame: one `[min, max]` range per axis.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ViewportRect {
    pub x: [f32; 2],
    pub y: [f32; 2],
}

impl ViewportRect {
    #[inline]
    pub const fn new(x: [f32; 2], y: [f32; 2]) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.x[1] - self.x[0]
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.y[1] - self.y[0]
    }

    #[inline]
    pub fn midpoint(self) -> (f32, f32) {
        ((self.x[0] + self.x[1]) * 0.5, (self.y[0] + self.y[1]) * 0.5)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.iter().chain(self.y.iter()).all(|v| v.is_finite())
    }
}
