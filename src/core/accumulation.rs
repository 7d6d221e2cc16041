use anyhow::Result;

/// Output resolution in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Edge length of one dispatch tile
pub const TILE_SIZE: u32 = 8;

/// Number of 8x8 tiles covering an extent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchGrid {
    pub x: u32,
    pub y: u32,
}

impl DispatchGrid {
    pub fn covering(extent: Extent) -> Self {
        Self {
            x: extent.width.div_ceil(TILE_SIZE),
            y: extent.height.div_ceil(TILE_SIZE),
        }
    }
}

/// Host-memory RGBA32F image
#[derive(Debug, Clone, PartialEq)]
pub struct HostImage {
    extent: Extent,
    pixels: Vec<[f32; 4]>,
}

impl HostImage {
    pub fn new(extent: Extent) -> Self {
        Self {
            extent,
            pixels: vec![[0.0; 4]; extent.pixel_count()],
        }
    }

    pub fn filled(extent: Extent, value: [f32; 4]) -> Self {
        Self {
            extent,
            pixels: vec![value; extent.pixel_count()],
        }
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [[f32; 4]] {
        &mut self.pixels
    }

    pub fn fill(&mut self, value: [f32; 4]) {
        self.pixels.fill(value);
    }
}

/// `history = (history * n + working) / (n + 1)` per channel.
///
/// With `n == 0` the working value is copied so stale history never leaks in.
pub fn blend_running_mean(history: &mut [[f32; 4]], working: &[[f32; 4]], sample_count: u32) {
    if sample_count == 0 {
        history.copy_from_slice(working);
        return;
    }

    let n = sample_count as f32;
    for (h, w) in history.iter_mut().zip(working) {
        for c in 0..4 {
            h[c] = (h[c] * n + w[c]) / (n + 1.0);
        }
    }
}

/// Whether history currently holds a valid mean
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Accumulating(u32),
}

/// Working and history images plus the running sample count
#[derive(Debug)]
pub struct AccumulationState<I> {
    extent: Extent,
    working: I,
    history: I,
    sample_count: u32,
}

impl<I> AccumulationState<I> {
    /// Allocate both images through `allocate`; the count starts at zero
    pub fn allocate(extent: Extent, mut allocate: impl FnMut(Extent, &str) -> Result<I>) -> Result<Self> {
        let working = allocate(extent, "Working Sample")?;
        let history = allocate(extent, "Accumulated History")?;
        Ok(Self {
            extent,
            working,
            history,
            sample_count: 0,
        })
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn phase(&self) -> Phase {
        match self.sample_count {
            0 => Phase::Idle,
            n => Phase::Accumulating(n),
        }
    }

    pub fn reset(&mut self) {
        self.sample_count = 0;
    }

    pub fn advance(&mut self) {
        self.sample_count = self.sample_count.saturating_add(1);
    }

    pub fn working(&self) -> &I {
        &self.working
    }

    pub fn history(&self) -> &I {
        &self.history
    }

    pub fn working_mut(&mut self) -> &mut I {
        &mut self.working
    }

    /// Split borrow for the blend step
    pub fn images_mut(&mut self) -> (&I, &mut I) {
        (&self.working, &mut self.history)
    }
}
