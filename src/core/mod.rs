pub mod clock;
pub mod controller;
pub mod display_context;
pub mod input_adapter;
pub mod timer;

pub use clock::{Clock, FrameTelemetry};
pub use controller::{Button, Controller, IdleController};
pub use display_context::DisplayContext;
pub use input_adapter::WinitController;
pub use timer::Countdown;
