//! Process-wide session state

pub mod controller;

pub use controller::SessionController;
