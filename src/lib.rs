pub mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod demo;
pub mod environment;
pub mod loaders;
pub mod math;
pub mod output;
pub mod scene;
pub mod types;
