pub mod config;
pub mod models;
pub mod auth;
pub mod engine;
pub mod payloads;
pub mod verdict;
pub mod probes;
pub mod response_analysis;
pub mod reporting;

// Re-export commonly used items
pub use config::*;
pub use models::*;
pub use auth::*;
pub use engine::*;
pub use payloads::*;
pub use verdict::*;
pub use probes::*;
pub use response_analysis::*;
pub use reporting::*;
