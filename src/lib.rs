// Modules principaux
pub mod api;
pub mod core;
pub mod domain;
pub mod infrastructure;

use crate::core::{AuthService, UserService};
use crate::infrastructure::UserRepository;

// Version de l'application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "Socle API";

/// État partagé entre tous les handlers
///
/// Distribué aux workers via `web::Data`, qui porte déjà le comptage de
/// références.
pub struct AppState {
    pub users: UserService<UserRepository>,
    pub auth: AuthService<UserRepository>,
}

// Configuration par défaut pour les tests
#[cfg(test)]
pub mod test_utils {
    use std::sync::Once;

    static INIT: Once = Once::new();

    pub fn init_test_logging() {
        INIT.call_once(|| {
            tracing_subscriber::fmt().with_test_writer().init();
        });
    }
}
