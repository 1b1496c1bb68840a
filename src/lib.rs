pub mod app;
pub mod config;
pub mod engine;
pub mod entity;
pub mod geometry;
pub mod ingress;
pub mod motion;
pub mod palette;
pub mod pool;
pub mod runner;
pub mod selector;
pub mod surface;
pub mod terminal;
pub mod text_sampler;
pub mod tuning;
