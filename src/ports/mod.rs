//! Port traits: the seams between the domain and the outside world.

pub mod config_port;
pub mod quote_port;
pub mod report_port;
pub mod store_port;
