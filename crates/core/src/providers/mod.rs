pub mod registry;
pub mod traits;

// Analysis service implementations
pub mod http;
