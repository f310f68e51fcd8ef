pub mod c2rc;
pub mod cli;
pub mod client;
pub mod config;
pub mod model;
pub mod params;
pub mod services;
pub mod transport;
