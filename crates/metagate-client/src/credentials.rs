use crate::error::{ClientError, ClientResult};
use metagate_core::{store::AuthStore, AuthKey};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Resolves the privileged system identity's credentials once and caches
/// them for the process lifetime.
///
/// A failed first lookup leaves the cell empty, so the next caller retries;
/// a successful lookup is never repeated.
pub struct SystemCredentialSource {
    auths: Arc<dyn AuthStore>,
    subject: String,
    cached: OnceCell<AuthKey>,
}

impl SystemCredentialSource {
    pub fn new(auths: Arc<dyn AuthStore>, subject: impl Into<String>) -> Self {
        Self { auths, subject: subject.into(), cached: OnceCell::new() }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub async fn get(&self) -> ClientResult<AuthKey> {
        let key = self
            .cached
            .get_or_try_init(|| async {
                match self.auths.get_key(&self.subject).await {
                    Ok(Some(key)) => Ok(key),
                    Ok(None) => Err(ClientError::Credentials(format!(
                        "no auth record for subject '{}'",
                        self.subject
                    ))),
                    Err(e) => Err(ClientError::Credentials(e.to_string())),
                }
            })
            .await?;
        Ok(key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use metagate_core::{CoreError, CoreResult, SubjectRecord};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAuthStore {
        key: AuthKey,
        lookups: AtomicUsize,
        fail_first: bool,
    }

    #[async_trait]
    impl AuthStore for CountingAuthStore {
        async fn get_key(&self, subject: &str) -> CoreResult<Option<AuthKey>> {
            let n = self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && n == 0 {
                return Err(CoreError::Backend("store unavailable".to_string()));
            }
            if subject == "system" {
                Ok(Some(self.key.clone()))
            } else {
                Ok(None)
            }
        }

        async fn lookup_uuid(&self, _uuid: &str) -> CoreResult<Option<SubjectRecord>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn caches_credentials_after_first_lookup() {
        let store = Arc::new(CountingAuthStore {
            key: AuthKey::new("sys-uuid", "sys-key"),
            lookups: AtomicUsize::new(0),
            fail_first: false,
        });
        let source = SystemCredentialSource::new(store.clone(), "system");

        let first = source.get().await.unwrap();
        let second = source.get().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_lookup_after_initial_failure() {
        let store = Arc::new(CountingAuthStore {
            key: AuthKey::new("sys-uuid", "sys-key"),
            lookups: AtomicUsize::new(0),
            fail_first: true,
        });
        let source = SystemCredentialSource::new(store.clone(), "system");

        assert!(source.get().await.is_err());
        let recovered = source.get().await.unwrap();
        assert_eq!(recovered.uuid, "sys-uuid");
        assert_eq!(store.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_subject_is_a_credentials_error() {
        let store = Arc::new(CountingAuthStore {
            key: AuthKey::new("sys-uuid", "sys-key"),
            lookups: AtomicUsize::new(0),
            fail_first: false,
        });
        let source = SystemCredentialSource::new(store, "nobody");

        match source.get().await {
            Err(ClientError::Credentials(msg)) => assert!(msg.contains("nobody")),
            other => panic!("expected credentials error, got {other:?}"),
        }
    }
}
