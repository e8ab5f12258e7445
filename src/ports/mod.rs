//! Port traits implemented by [`adapters`](crate::adapters).

pub mod config_port;
pub mod reference_port;
