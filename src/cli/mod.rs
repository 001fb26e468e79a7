//! Command Line Interface module
//!
//! - `find`: scan the saved library for the song matching remembered words
//! - `login`: authorize Spotify access and cache the token
//! - `config`: inspect the effective configuration

pub mod config;
pub mod find;
pub mod login;
