#![warn(missing_docs)]
//! Retouch - AI-powered image editing.
//!
//! Hand over an image and a plain-language instruction, get back the edited
//! result from a remote generative image service (Google Gemini image
//! models). The crate provides the service client, the data-URL codec used
//! on both sides of the wire, and an interactive session controller that a
//! UI or CLI can drive.
//!
//! # Quick Start
//!
//! ```no_run
//! use retouch::{EditSession, GeminiProvider, PreviewStore};
//!
//! #[tokio::main]
//! async fn main() -> retouch::Result<()> {
//!     let provider = GeminiProvider::builder().build();
//!     let mut session = EditSession::new(Box::new(provider), PreviewStore::new());
//!
//!     session.select_image(std::fs::read("photo.png")?, "image/png");
//!     session.set_prompt("Make the colors more vibrant and add a warm sunset glow");
//!     session.submit_edit().await;
//!
//!     let snapshot = session.snapshot();
//!     match snapshot.edited_data_url {
//!         Some(url) => println!("edited image data URL: {} chars", url.len()),
//!         None => eprintln!("{}", snapshot.error.unwrap_or_default()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Requires the `GOOGLE_API_KEY` environment variable (or an explicit key on
//! the provider builder). A missing key is reported per submission rather
//! than at startup.

pub mod data_url;
pub mod edit;
mod error;
pub mod preview;
pub mod session;

// Re-export error types at crate root
pub use error::{Result, RetouchError};

// Re-export commonly used types
pub use edit::providers::{GeminiModel, GeminiProvider, GeminiProviderBuilder, API_KEY_ENV};
pub use edit::{EditProvider, EditRequest, EditedImage, ImageFormat};
pub use preview::{PreviewHandle, PreviewStore};
pub use session::{EditSession, SessionPhase, SessionSnapshot};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::edit::providers::GeminiProvider;
    pub use crate::edit::{EditProvider, EditRequest, EditedImage};
    pub use crate::error::{Result, RetouchError};
    pub use crate::preview::PreviewStore;
    pub use crate::session::{EditSession, SessionPhase, SessionSnapshot};
}
