//! quizzki-core: Data model, envelope contract, and console flows.
//!
//! This crate defines the types exchanged with the Quizzki API, the single
//! place where responses are classified, the local session store, and the
//! login, teacher and student flows. Flows talk to the API only through the
//! [`QuizzkiApi`](traits::QuizzkiApi) trait.

pub mod auth;
pub mod envelope;
pub mod error;
pub mod mock;
pub mod model;
pub mod session;
pub mod student;
pub mod teacher;
pub mod traits;
pub mod validation;
pub mod view;

pub use envelope::{classify, classify_ack, Reply};
pub use error::{ApiError, FlowError, ValidationError};
pub use session::{Role, Session, SessionStore};
pub use traits::{ApiResult, QuizzkiApi};
