//! FakeYou Voice Client
//!
//! Pure HTTP client for the unofficial FakeYou API: voice model listing and
//! search, text-to-speech inference, and voice-to-voice conversion. A
//! username/password login yields a session cookie; anonymous use is also
//! possible for the endpoints that allow it.
//!
//! # Example
//!
//! ```no_run
//! use audiogen_providers::fakeyou::{FakeYouClient, TtsOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = FakeYouClient::new();
//! client.login("username", "password").await?;
//! let models = client.search("mario", Some("en")).await?;
//! let audio = client
//!     .generate_tts(&models[0].model_token, "It's-a me!", &TtsOptions::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod types;

pub use client::{filter_models, FakeYouClient, FakeYouConfig};
pub use types::{JobState, TtsModel, TtsOptions, UserRatings, VoiceConversionOptions};
