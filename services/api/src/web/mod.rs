pub mod rest;
pub mod state;

pub use rest::{health_handler, root_handler, router};
