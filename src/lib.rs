// Core infrastructure modules
pub mod core;

// Feature-specific modules
pub mod api;
pub mod config;
pub mod inventory;

#[cfg(test)]
mod test_utils;
