/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - Persisted watermark profiles (profiles.rs)
pub mod data;
pub mod profiles;
