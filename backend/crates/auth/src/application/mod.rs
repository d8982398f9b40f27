//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
pub mod create_session;
pub mod external_sign_in;
pub mod profile;
pub mod sign_in;
pub mod sign_up;

// Re-exports
pub use check_session::CheckSessionUseCase;
pub use config::AuthConfig;
pub use create_session::{CreateSessionUseCase, IssuedSession};
pub use external_sign_in::{ExternalSignInInput, ExternalSignInOutput, ExternalSignInUseCase};
pub use profile::ProfileUseCase;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
