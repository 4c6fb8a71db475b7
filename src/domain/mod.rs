//! Modèles de données principaux de l'application.
//!
//! Les champs sensibles sont exclus de la sérialisation JSON, les
//! identifiants utilisent `uuid::Uuid` et les timestamps
//! `chrono::DateTime<chrono::Utc>`.

pub mod query;
pub mod user;

pub use query::{ListParams, Page, PageMeta, SortOrder};
pub use user::{NewUser, User, UserChanges, UserPatch};
