pub mod camera;
pub mod cli;
pub mod config;
pub mod content;
pub mod core;
pub mod entity;
pub mod error;
pub mod feed;
pub mod interaction;
pub mod math;
pub mod navigator;
pub mod orchestrator;
pub mod overlay;
pub mod render;
pub mod scene;
pub mod voice;

pub use camera::Camera;
pub use config::OfficeConfig;
pub use error::{OfficeError, Result};
pub use feed::{ContentSender, ContentUpdate, OfficeData};
pub use navigator::{CameraNavigator, Viewpoint};
pub use orchestrator::Orchestrator;
