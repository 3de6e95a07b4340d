//! Suno Song Generation Client
//!
//! Pure HTTP client for the unofficial Suno studio API. Authentication runs
//! through the Clerk identity provider: the account cookie is exchanged for
//! a session id once, and the session id is exchanged for a short-lived JWT
//! before every operation.
//!
//! # Example
//!
//! ```no_run
//! use audiogen_providers::suno::{GenerateOptions, SunoClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = SunoClient::new("__client=...; __client_uat=...");
//! client.init().await?;
//! let mut options = GenerateOptions::new("a dreamy synthwave ballad about rain");
//! options.wait_audio = true;
//! let songs = client.generate(options).await?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod types;

pub use client::{SunoClient, SunoConfig, DEFAULT_MODEL};
pub use types::{CreditsInfo, CustomGenerateOptions, ExtendOptions, GenerateOptions, LyricsResult};
