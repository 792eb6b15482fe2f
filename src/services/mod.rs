pub mod crud;
pub mod csrf;
pub mod envelope;
pub mod loader;
pub mod transport;
