use anyhow::{ensure, Result};

use super::accumulation::{blend_running_mean, DispatchGrid, Extent, HostImage};
use crate::scene::SceneBuffers;
use crate::types::FrameUniforms;

/// Device-side operations the accumulation loop drives.
///
/// `trace` must not return before the working image is fully written; the
/// blend step reads it immediately afterwards.
pub trait FrameBackend {
    type Image;

    fn allocate_image(&mut self, extent: Extent, label: &str) -> Result<Self::Image>;

    /// Upload packed scene records, replacing any previous binding
    fn bind_scene(&mut self, scene: &SceneBuffers) -> Result<()>;

    /// Drop the current scene binding
    fn release_scene(&mut self);

    fn trace(
        &mut self,
        uniforms: &FrameUniforms,
        grid: DispatchGrid,
        working: &mut Self::Image,
    ) -> Result<()>;

    /// Blend `working` into `history` as a running mean over `sample_count` prior samples
    fn accumulate(
        &mut self,
        working: &Self::Image,
        history: &mut Self::Image,
        sample_count: u32,
    ) -> Result<()>;

    /// Write `history` to the display target
    fn present(&mut self, history: &Self::Image) -> Result<()>;
}

/// What a [`HostBackend`] has seen, for inspection in tests and headless runs
#[derive(Debug, Default, Clone)]
pub struct HostRecord {
    pub allocations: Vec<(Extent, String)>,
    pub scenes_bound: usize,
    pub scenes_released: usize,
    pub bound_sphere_count: u32,
    pub bound_triangle_count: u32,
    pub traces: usize,
    pub last_uniforms: Option<FrameUniforms>,
    pub last_grid: Option<DispatchGrid>,
    pub displayed: Option<HostImage>,
}

/// CPU backend. Each trace fills the working image with a caller-supplied
/// shading function; blending runs the same running mean the GPU pass does.
pub struct HostBackend<P> {
    shade: P,
    record: HostRecord,
}

impl<P> HostBackend<P>
where
    P: FnMut(&FrameUniforms, &mut HostImage),
{
    pub fn new(shade: P) -> Self {
        Self {
            shade,
            record: HostRecord::default(),
        }
    }

    pub fn record(&self) -> &HostRecord {
        &self.record
    }

    pub fn displayed(&self) -> Option<&HostImage> {
        self.record.displayed.as_ref()
    }
}

impl<P> FrameBackend for HostBackend<P>
where
    P: FnMut(&FrameUniforms, &mut HostImage),
{
    type Image = HostImage;

    fn allocate_image(&mut self, extent: Extent, label: &str) -> Result<HostImage> {
        self.record.allocations.push((extent, label.to_string()));
        Ok(HostImage::new(extent))
    }

    fn bind_scene(&mut self, scene: &SceneBuffers) -> Result<()> {
        self.record.scenes_bound += 1;
        self.record.bound_sphere_count = scene.sphere_count();
        self.record.bound_triangle_count = scene.triangle_count();
        Ok(())
    }

    fn release_scene(&mut self) {
        self.record.scenes_released += 1;
    }

    fn trace(
        &mut self,
        uniforms: &FrameUniforms,
        grid: DispatchGrid,
        working: &mut HostImage,
    ) -> Result<()> {
        (self.shade)(uniforms, working);
        self.record.traces += 1;
        self.record.last_uniforms = Some(*uniforms);
        self.record.last_grid = Some(grid);
        Ok(())
    }

    fn accumulate(
        &mut self,
        working: &HostImage,
        history: &mut HostImage,
        sample_count: u32,
    ) -> Result<()> {
        ensure!(
            working.extent() == history.extent(),
            "working {:?} and history {:?} extents differ",
            working.extent(),
            history.extent()
        );
        blend_running_mean(history.pixels_mut(), working.pixels(), sample_count);
        Ok(())
    }

    fn present(&mut self, history: &HostImage) -> Result<()> {
        self.record.displayed = Some(history.clone());
        Ok(())
    }
}
