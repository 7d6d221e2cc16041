use anyhow::{Context, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;

use super::accumulation::{AccumulationState, DispatchGrid, Extent, Phase};
use super::backend::FrameBackend;
use super::change_tracker::ChangeTracker;
use crate::environment::Environment;
use crate::scene::extraction::skipped_objects;
use crate::scene::{extract_triangles, generate_spheres, SceneBuffers, SphereSettings};
use crate::types::FrameUniforms;

/// Counts from the most recent scene rebuild
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub requested_spheres: u32,
    pub placed_spheres: u32,
    pub mesh_objects: usize,
    pub skipped_objects: usize,
    pub triangles: u32,
    pub rebuilds: u64,
}

impl SceneStats {
    pub fn dropped_spheres(&self) -> u32 {
        self.requested_spheres.saturating_sub(self.placed_spheres)
    }
}

/// What `tick` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Unchanged,
    /// Field of view changed; scene kept, accumulation restarted
    Reset,
    /// Scene regenerated and accumulation restarted
    Rebuilt,
}

/// What `render_frame` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameReport {
    /// Zero-area extent, nothing dispatched
    Skipped,
    Rendered {
        extent: Extent,
        /// Samples in history after this frame
        sample_count: u32,
        reallocated: bool,
    },
}

/// Owns the scene, the change tracker and the accumulation images, and
/// drives one backend through the per-frame tick/render cycle.
pub struct AccumulationCoordinator<B: FrameBackend> {
    backend: B,
    settings: SphereSettings,
    tracker: ChangeTracker,
    scene: SceneBuffers,
    stats: SceneStats,
    state: Option<AccumulationState<B::Image>>,
    rng: StdRng,
    regenerate_requested: bool,
}

impl<B: FrameBackend> AccumulationCoordinator<B> {
    /// Build the initial scene and bind it to `backend`
    pub fn new(backend: B, settings: SphereSettings, rng: StdRng, env: &mut Environment) -> Result<Self> {
        let mut coordinator = Self {
            backend,
            settings,
            tracker: ChangeTracker::new(),
            scene: SceneBuffers::default(),
            stats: SceneStats::default(),
            state: None,
            rng,
            regenerate_requested: false,
        };
        coordinator.rebuild_scene(env)?;
        Ok(coordinator)
    }

    /// Poll for changes and apply the invalidation policy
    pub fn tick(&mut self, env: &mut Environment) -> Result<TickOutcome> {
        let changes = self.tracker.poll(env);
        let regenerate = std::mem::take(&mut self.regenerate_requested);

        if regenerate || changes.transforms {
            self.rebuild_scene(env)?;
            Ok(TickOutcome::Rebuilt)
        } else if changes.field_of_view {
            debug!("Field of view now {:.1}, restarting accumulation", env.camera.field_of_view);
            self.reset_accumulation();
            Ok(TickOutcome::Reset)
        } else {
            Ok(TickOutcome::Unchanged)
        }
    }

    /// Regenerate spheres and triangles, rebind them and restart accumulation.
    ///
    /// The watch-set is refreshed so newly added mesh objects are tracked, and
    /// the tracker is re-primed so this rebuild's own state is not reported
    /// as a change on the next poll.
    pub fn rebuild_scene(&mut self, env: &mut Environment) -> Result<()> {
        self.backend.release_scene();

        let spheres = generate_spheres(&mut self.rng, &self.settings);
        let triangles = extract_triangles(&env.mesh_objects);
        self.scene = SceneBuffers::pack(&spheres, &triangles);
        self.backend
            .bind_scene(&self.scene)
            .context("Failed to bind scene buffers")?;

        self.tracker.watch(env.tracked_entities());
        self.tracker.poll(env);

        self.stats = SceneStats {
            requested_spheres: self.settings.count,
            placed_spheres: self.scene.sphere_count(),
            mesh_objects: env.mesh_objects.len(),
            skipped_objects: skipped_objects(&env.mesh_objects),
            triangles: self.scene.triangle_count(),
            rebuilds: self.stats.rebuilds + 1,
        };

        info!(
            "Scene rebuilt: {} spheres, {} triangles",
            self.stats.placed_spheres, self.stats.triangles
        );
        debug!(
            "Placement dropped {} of {} spheres; {} of {} mesh objects skipped",
            self.stats.dropped_spheres(),
            self.stats.requested_spheres,
            self.stats.skipped_objects,
            self.stats.mesh_objects
        );

        self.reset_accumulation();
        Ok(())
    }

    /// Trace one sample, blend it into history and present the result
    pub fn render_frame(&mut self, env: &Environment, extent: Extent) -> Result<FrameReport> {
        if extent.is_empty() {
            return Ok(FrameReport::Skipped);
        }

        let reallocated = self.ensure_extent(extent)?;

        let seed: f32 = self.rng.gen();
        let pixel_offset = [self.rng.gen::<f32>(), self.rng.gen::<f32>()];
        let aspect = extent.aspect();
        let uniforms = FrameUniforms::new(
            env.camera.camera_to_world(),
            env.camera.inverse_projection(aspect),
            env.light.forward(),
            env.light.intensity,
            pixel_offset,
            seed,
        )
        .with_counts(self.scene.sphere_count(), self.scene.triangle_count());

        let Some(state) = self.state.as_mut() else {
            return Ok(FrameReport::Skipped);
        };

        self.backend
            .trace(&uniforms, DispatchGrid::covering(extent), state.working_mut())
            .context("Path tracing dispatch failed")?;

        let sample_count = state.sample_count();
        let (working, history) = state.images_mut();
        self.backend
            .accumulate(working, history, sample_count)
            .context("Accumulation pass failed")?;
        self.backend
            .present(state.history())
            .context("Failed to present accumulated image")?;

        state.advance();

        Ok(FrameReport::Rendered {
            extent,
            sample_count: state.sample_count(),
            reallocated,
        })
    }

    /// The next `tick` rebuilds the scene regardless of detected changes
    pub fn request_regenerate(&mut self) {
        self.regenerate_requested = true;
    }

    pub fn reset_accumulation(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.reset();
        }
    }

    pub fn sample_count(&self) -> u32 {
        self.state.as_ref().map_or(0, |s| s.sample_count())
    }

    pub fn phase(&self) -> Phase {
        self.state.as_ref().map_or(Phase::Idle, |s| s.phase())
    }

    pub fn extent(&self) -> Option<Extent> {
        self.state.as_ref().map(|s| s.extent())
    }

    pub fn history(&self) -> Option<&B::Image> {
        self.state.as_ref().map(|s| s.history())
    }

    pub fn scene(&self) -> &SceneBuffers {
        &self.scene
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    pub fn settings(&self) -> &SphereSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn ensure_extent(&mut self, extent: Extent) -> Result<bool> {
        if self.state.as_ref().is_some_and(|s| s.extent() == extent) {
            return Ok(false);
        }

        debug!("Allocating accumulation images at {}x{}", extent.width, extent.height);
        let backend = &mut self.backend;
        let state = AccumulationState::allocate(extent, |e, label| backend.allocate_image(e, label))
            .context("Failed to allocate accumulation images")?;
        self.state = Some(state);
        Ok(true)
    }
}
