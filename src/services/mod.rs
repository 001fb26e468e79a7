//! Service layer: wiring of the external-service clients
//!
//! - `SimpleServices`: lightweight container creating the Genius and Spotify
//!   clients from the loaded configuration and credentials

pub mod simple_container;

pub use simple_container::SimpleServices;
