pub mod settings;

// Re-export the primary Config struct
pub use settings::Config;
