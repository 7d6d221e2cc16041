//! Interactive window: input, camera, progressive rendering and the title bar.

use std::sync::Arc;

use log::{error, info};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::camera::CameraRig;
use crate::config::TracerConfig;
use crate::core::clock::Clock;
use crate::core::controller::{Button, Controller};
use crate::core::gpu_context::GpuContext;
use crate::core::input_adapter::WinitController;
use crate::core::{AccumulationCoordinator, Extent, GpuBackend};
use crate::environment::Environment;
use crate::loaders::Skybox;

const WINDOW_TITLE: &str = "Path Tracer";

pub struct App {
    config: TracerConfig,
    env: Environment,
    skybox: Skybox,
    rig: CameraRig,
    window: Option<Arc<Window>>,
    coordinator: Option<AccumulationCoordinator<GpuBackend>>,
    controller: WinitController,
    clock: Clock,
}

impl App {
    pub fn new(config: TracerConfig, env: Environment, skybox: Skybox) -> Self {
        let rig = config.camera_rig();
        Self {
            config,
            env,
            skybox,
            rig,
            window: None,
            coordinator: None,
            controller: WinitController::new(),
            clock: Clock::new(),
        }
    }

    fn init_renderer(&mut self, window: Arc<Window>) -> anyhow::Result<AccumulationCoordinator<GpuBackend>> {
        let (gpu, surface) = pollster::block_on(GpuContext::new_with_window(window))?;
        let backend = GpuBackend::with_surface(gpu, surface, &self.skybox);
        AccumulationCoordinator::new(
            backend,
            self.config.spheres.clone(),
            self.config.rng(),
            &mut self.env,
        )
    }

    fn redraw(&mut self) {
        let (Some(window), Some(coordinator)) = (&self.window, &mut self.coordinator) else {
            return;
        };

        let delta = self.clock.tick();
        self.rig.drive(&mut self.env.camera, delta, &self.controller);
        if self.controller.just_pressed(Button::KeyR) {
            coordinator.request_regenerate();
        }

        let size = window.inner_size();
        let result = coordinator
            .tick(&mut self.env)
            .and_then(|_| coordinator.render_frame(&self.env, Extent::new(size.width, size.height)));
        if let Err(e) = result {
            error!("Render error: {:#}", e);
        }

        if self.clock.record_frame(delta) {
            let stats = coordinator.stats();
            window.set_title(&format!(
                "{} - {:.1} FPS - {} samples - {} spheres, {} triangles",
                WINDOW_TITLE,
                self.clock.fps(),
                coordinator.sample_count(),
                stats.placed_spheres,
                stats.triangles,
            ));
        }

        self.controller.end_frame();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(WINDOW_TITLE)
                .with_inner_size(winit::dpi::PhysicalSize::new(
                    self.config.output.width,
                    self.config.output.height,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match self.init_renderer(window.clone()) {
            Ok(coordinator) => {
                self.window = Some(window);
                self.coordinator = Some(coordinator);
            }
            Err(e) => {
                error!("Failed to initialize path tracer: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(coordinator) = &mut self.coordinator {
                    coordinator
                        .backend_mut()
                        .resize(Extent::new(size.width, size.height));
                }
            }
            WindowEvent::KeyboardInput { .. } => {
                self.controller.process_event(&event);
                if self.controller.quit_requested() {
                    info!("Exiting");
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
