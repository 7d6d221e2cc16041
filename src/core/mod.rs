//! Frame-loop core: change detection, progressive accumulation and the
//! backends that execute it.

pub mod accumulation;
pub mod backend;
pub mod change_tracker;
pub mod clock;
pub mod controller;
pub mod coordinator;
pub mod gpu_backend;
pub mod gpu_context;
pub mod input_adapter;

pub use accumulation::{AccumulationState, DispatchGrid, Extent, HostImage, Phase};
pub use backend::{FrameBackend, HostBackend};
pub use change_tracker::{ChangeTracker, Changes};
pub use coordinator::{AccumulationCoordinator, FrameReport, SceneStats, TickOutcome};
pub use gpu_backend::GpuBackend;
pub use gpu_context::GpuContext;
