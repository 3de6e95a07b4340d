// AudioGen Provider Clients
//
// This crate contains pure HTTP client implementations for two unofficial
// AI audio generation services:
// - Suno (song generation), authenticated through the Clerk identity provider
// - FakeYou (text-to-speech and voice conversion), authenticated with a
//   username/password login that yields a session cookie
//
// Both clients follow the same shape: a transport layer that rejects non-2xx
// responses, an envelope/credential layer on top of it, and one method per
// remote capability, some of which poll a job endpoint until the remote side
// reports a terminal state.

// Shared error types
pub mod error;

// Service-agnostic result record
pub mod types;

// HTTP clients
pub mod fakeyou;
pub mod suno;

// Re-export client types for convenience
pub use error::AudioClientError;
pub use fakeyou::{FakeYouClient, FakeYouConfig};
pub use suno::{SunoClient, SunoConfig};
pub use types::GeneratedAudio;
