use std::time::Duration;

use tracing::warn;
use uuid::Uuid;

use crate::core::security;
use crate::domain::{ListParams, NewUser, Page, User, UserChanges, UserPatch};
use crate::infrastructure::cache::CacheClient;
use crate::infrastructure::database::users::{UserDraft, UserStore};
use crate::infrastructure::error::AppResult;
use crate::infrastructure::search::SearchClient;

/// TTL des entrées utilisateur dans le cache
pub const USER_CACHE_TTL: Duration = Duration::from_secs(300);

fn cache_key(id: Uuid) -> String {
    format!("user:{id}")
}

/// Service des utilisateurs
///
/// Orchestration fine au-dessus du repository: hashage des mots de passe,
/// cache de lecture (Valkey) et miroir dans l'index de recherche. Le cache
/// et l'index sont optionnels et toujours best-effort: la base reste la
/// source de vérité.
pub struct UserService<S: UserStore> {
    store: S,
    cache: Option<CacheClient>,
    search: Option<SearchClient>,
}

impl<S: UserStore> UserService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: None,
            search: None,
        }
    }

    pub fn with_cache(mut self, cache: CacheClient) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_search(mut self, search: SearchClient) -> Self {
        self.search = Some(search);
        self
    }

    /// Crée un utilisateur, mot de passe hashé avant persistance
    pub async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let password_hash = security::hash_password(&new_user.password)?;
        let draft = UserDraft {
            name: new_user.name,
            email: new_user.email,
            password_hash: Some(password_hash),
        };

        let user = self.store.insert(&draft).await?;
        self.mirror(&user).await;
        Ok(user)
    }

    /// Utilisateur par id, en lecture via le cache quand il est branché
    pub async fn get(&self, id: Uuid) -> AppResult<User> {
        if let Some(cache) = &self.cache {
            match cache.get::<User>(&cache_key(id)).await {
                Ok(Some(user)) => return Ok(user),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "lecture du cache impossible"),
            }
        }

        let user = self.store.get(id).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_ex(&cache_key(id), &user, USER_CACHE_TTL).await {
                warn!(error = %e, "écriture du cache impossible");
            }
        }

        Ok(user)
    }

    /// Liste paginée avec recherche et tri
    pub async fn list(&self, params: &ListParams) -> AppResult<Page<User>> {
        self.store.list(params).await
    }

    /// Mise à jour partielle, le mot de passe éventuel est hashé ici
    pub async fn update(&self, id: Uuid, patch: UserPatch) -> AppResult<User> {
        let password_hash = match &patch.password {
            Some(password) => Some(security::hash_password(password)?),
            None => None,
        };
        let changes = UserChanges {
            name: patch.name,
            email: patch.email,
            password_hash,
        };

        let user = self.store.update(id, &changes).await?;
        self.invalidate(id).await;
        self.mirror(&user).await;
        Ok(user)
    }

    /// Suppression logique, l'enregistrement est retourné une dernière fois
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<User> {
        let user = self.store.soft_delete(id).await?;
        self.invalidate(id).await;
        self.unmirror(id).await;
        Ok(user)
    }

    /// Suppression physique
    pub async fn delete(&self, id: Uuid) -> AppResult<User> {
        let user = self.store.hard_delete(id).await?;
        self.invalidate(id).await;
        self.unmirror(id).await;
        Ok(user)
    }

    async fn invalidate(&self, id: Uuid) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.delete(&cache_key(id)).await {
                warn!(error = %e, "invalidation du cache impossible");
            }
        }
    }

    async fn mirror(&self, user: &User) {
        if let Some(search) = &self.search {
            if let Err(e) = search.index_user(user).await {
                warn!(error = %e, user_id = %user.id, "indexation impossible");
            }
        }
    }

    async fn unmirror(&self, id: Uuid) {
        if let Some(search) = &self.search {
            if let Err(e) = search.delete_user(id).await {
                warn!(error = %e, user_id = %id, "désindexation impossible");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::error::AppError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Store enregistrant les appels et rejouant des réponses fixes
    #[derive(Default)]
    struct MockStore {
        calls: Mutex<Vec<String>>,
        inserted: Mutex<Option<UserDraft>>,
        updated: Mutex<Option<UserChanges>>,
        missing: bool,
    }

    impl MockStore {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn user_with(&self, id: Uuid, name: &str, email: &str) -> AppResult<User> {
            if self.missing {
                return Err(AppError::NotFound("Utilisateur".to_string()));
            }
            Ok(User {
                id,
                name: name.to_string(),
                email: email.to_string(),
                password_hash: Some("$argon2id$fake".to_string()),
                created_at: Utc::now(),
                updated_at: None,
                deleted_at: None,
            })
        }
    }

    #[async_trait]
    impl UserStore for MockStore {
        async fn insert(&self, draft: &UserDraft) -> AppResult<User> {
            self.calls.lock().unwrap().push("insert".to_string());
            *self.inserted.lock().unwrap() = Some(draft.clone());
            self.user_with(Uuid::new_v4(), &draft.name, &draft.email)
        }

        async fn get(&self, id: Uuid) -> AppResult<User> {
            self.calls.lock().unwrap().push(format!("get:{id}"));
            self.user_with(id, "Jean", "jean@example.com")
        }

        async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
            self.calls.lock().unwrap().push(format!("find:{email}"));
            Ok(None)
        }

        async fn list(&self, params: &ListParams) -> AppResult<Page<User>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("list:{}:{}", params.page, params.per_page));
            Ok(Page {
                data: vec![],
                meta: crate::domain::PageMeta::new(0, params),
            })
        }

        async fn update(&self, id: Uuid, changes: &UserChanges) -> AppResult<User> {
            self.calls.lock().unwrap().push(format!("update:{id}"));
            *self.updated.lock().unwrap() = Some(changes.clone());
            self.user_with(id, "Jean", "jean@example.com")
        }

        async fn soft_delete(&self, id: Uuid) -> AppResult<User> {
            self.calls.lock().unwrap().push(format!("soft_delete:{id}"));
            self.user_with(id, "Jean", "jean@example.com")
        }

        async fn hard_delete(&self, id: Uuid) -> AppResult<User> {
            self.calls.lock().unwrap().push(format!("hard_delete:{id}"));
            self.user_with(id, "Jean", "jean@example.com")
        }
    }

    fn service() -> UserService<MockStore> {
        UserService::new(MockStore::default())
    }

    #[tokio::test]
    async fn get_forwards_id_and_returns_store_result() {
        let svc = service();
        let id = Uuid::new_v4();

        let user = svc.get(id).await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(svc.store.calls(), vec![format!("get:{id}")]);
    }

    #[tokio::test]
    async fn create_hashes_password_before_persisting() {
        let svc = service();
        let user = svc
            .create(NewUser {
                name: "Jean".to_string(),
                email: "jean@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.email, "jean@example.com");

        let draft = svc.store.inserted.lock().unwrap().clone().unwrap();
        let hash = draft.password_hash.unwrap();
        assert_ne!(hash, "secret123");
        assert!(security::verify_password("secret123", &hash));
    }

    #[tokio::test]
    async fn list_forwards_params() {
        let svc = service();
        let params = ListParams {
            page: 3,
            per_page: 25,
            ..ListParams::default()
        };

        let page = svc.list(&params).await.unwrap();
        assert_eq!(page.meta.page, 3);
        assert_eq!(svc.store.calls(), vec!["list:3:25".to_string()]);
    }

    #[tokio::test]
    async fn update_forwards_changes_with_hashed_password() {
        let svc = service();
        let id = Uuid::new_v4();

        svc.update(
            id,
            UserPatch {
                name: Some("Martin".to_string()),
                email: None,
                password: Some("nouveau-secret".to_string()),
            },
        )
        .await
        .unwrap();

        let changes = svc.store.updated.lock().unwrap().clone().unwrap();
        assert_eq!(changes.name.as_deref(), Some("Martin"));
        assert!(changes.email.is_none());
        assert!(security::verify_password(
            "nouveau-secret",
            &changes.password_hash.unwrap()
        ));
    }

    #[tokio::test]
    async fn deletes_forward_to_store() {
        let svc = service();
        let id = Uuid::new_v4();

        svc.soft_delete(id).await.unwrap();
        svc.delete(id).await.unwrap();
        assert_eq!(
            svc.store.calls(),
            vec![format!("soft_delete:{id}"), format!("hard_delete:{id}")]
        );
    }

    #[tokio::test]
    async fn store_errors_are_propagated() {
        let svc = UserService::new(MockStore {
            missing: true,
            ..MockStore::default()
        });

        let err = svc.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
