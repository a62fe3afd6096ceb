pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod state;
pub mod upload;

// Re-export main types for convenience
pub use chat::{ChatView, GREETING};
pub use client::{QaClient, DEFAULT_API_URL};
pub use config::Config;
pub use error::AskError;
pub use state::{ChatEvent, Message, RequestState, Sender, UiPhase};
pub use upload::{DocumentUpload, SimulatedUpload, UploadReceipt};
