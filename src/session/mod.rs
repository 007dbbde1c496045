//! Sessions & Preferences
//!
//! Sign-in, sign-up, bearer tokens and theme preferences, with the active
//! session and preferences mirrored to a local storage directory.

mod local_storage;
mod manager;

pub use local_storage::{LocalStorage, StorageError, StorageResult};
pub use manager::{
    FieldError, RegistrationForm, Session, SessionError, SessionManager, SessionResult, Theme,
    MIN_PASSWORD_LEN,
};
