//! Service layer for the relay protocol
//!
//! Services take their collaborators (repository, notifier, configuration) explicitly at
//! construction time and return results instead of talking to the transport.

pub mod issuer;
pub mod resolver;

pub use issuer::{IssueOutcome, IssuerService};
pub use resolver::ResolverService;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Duration;

    use super::*;
    use crate::{
        ChatLinkConfig, Error,
        error::{StorageError, ValidationError},
        notifier::MemoryNotifier,
        record::ChatId,
        repository::VerificationRepository,
        store::{ExpiringStore, InMemoryStore},
    };

    struct Harness<S: ExpiringStore> {
        issuer: IssuerService<S, MemoryNotifier>,
        resolver: ResolverService<S>,
        notifier: Arc<MemoryNotifier>,
        repository: Arc<VerificationRepository<S>>,
    }

    fn harness_with<S: ExpiringStore>(store: S, config: ChatLinkConfig) -> Harness<S> {
        let repository = Arc::new(VerificationRepository::new(store));
        let notifier = Arc::new(MemoryNotifier::new());
        let config = Arc::new(config);
        Harness {
            issuer: IssuerService::new(repository.clone(), notifier.clone(), config),
            resolver: ResolverService::new(repository.clone()),
            notifier,
            repository,
        }
    }

    fn harness() -> Harness<InMemoryStore> {
        harness_with(InMemoryStore::new(), ChatLinkConfig::new("s3cr3t").unwrap())
    }

    struct FailingStore;

    #[async_trait]
    impl ExpiringStore for FailingStore {
        async fn put(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), Error> {
            Err(StorageError::Connection("store unavailable".to_string()).into())
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, Error> {
            Err(StorageError::Connection("store unavailable".to_string()).into())
        }
    }

    #[tokio::test]
    async fn test_issue_then_resolve() {
        let h = harness();

        let outcome = h
            .issuer
            .issue(ChatId::from(123456789), "/start abc123")
            .await
            .unwrap();

        let IssueOutcome::Issued { code, record } = outcome else {
            panic!("expected an issued code");
        };
        assert_eq!(code.as_str(), "F5C79495");
        assert_eq!(record.chat_id, ChatId::from(123456789));

        let resolved = h.resolver.resolve(Some("f5c79495")).await.unwrap();
        assert_eq!(resolved.chat_id, ChatId::from(123456789));
        assert_eq!(resolved.issued_at, record.issued_at);
    }

    #[tokio::test]
    async fn test_issue_sends_markdown_confirmation() {
        let h = harness();
        h.issuer
            .issue(ChatId::from(42), "/start abc123")
            .await
            .unwrap();

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, ChatId::from(42));
        assert!(sent[0].markdown);
        assert!(sent[0].text.contains("F5C79495"));
    }

    #[tokio::test]
    async fn test_resolve_is_repeatable() {
        let h = harness();
        h.issuer
            .issue(ChatId::from(42), "/start abc123")
            .await
            .unwrap();

        for _ in 0..3 {
            let record = h.resolver.resolve(Some("F5C79495")).await.unwrap();
            assert_eq!(record.chat_id, ChatId::from(42));
        }
    }

    #[tokio::test]
    async fn test_missing_argument_sends_usage_and_stores_nothing() {
        let h = harness();

        let outcome = h.issuer.issue(ChatId::from(42), "/start").await.unwrap();
        assert_eq!(outcome, IssueOutcome::UsageError);

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(!sent[0].markdown);
        assert!(sent[0].text.contains("/start <código>"));

        assert!(h.repository.store().is_empty());
        assert!(h.resolver.resolve(Some("F5C79495")).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_other_text_is_ignored() {
        let h = harness();

        let outcome = h.issuer.issue(ChatId::from(42), "hola").await.unwrap();
        assert_eq!(outcome, IssueOutcome::Ignored);
        assert!(h.notifier.sent().is_empty());
        assert!(h.repository.store().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_before_issuance_is_not_found() {
        let h = harness();
        let err = h.resolver.resolve(Some("F5C79495")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_resolve_requires_code() {
        let h = harness();

        let err = h.resolver.resolve(None).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::MissingCode)));

        let err = h.resolver.resolve(Some("  ")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::MissingCode)));
    }

    #[tokio::test]
    async fn test_resolve_after_ttl_is_not_found() {
        let config = ChatLinkConfig::new("s3cr3t")
            .unwrap()
            .with_ttl(Duration::milliseconds(20))
            .unwrap();
        let h = harness_with(InMemoryStore::new(), config);

        h.issuer
            .issue(ChatId::from(42), "/start abc123")
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let err = h.resolver.resolve(Some("F5C79495")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_reissue_overwrites_chat() {
        let h = harness();
        h.issuer
            .issue(ChatId::from(1), "/start abc123")
            .await
            .unwrap();
        h.issuer
            .issue(ChatId::from(2), "/start ABC123")
            .await
            .unwrap();

        let record = h.resolver.resolve(Some("F5C79495")).await.unwrap();
        assert_eq!(record.chat_id, ChatId::from(2));
    }

    #[tokio::test]
    async fn test_store_failure_is_returned_without_notifying() {
        let h = harness_with(FailingStore, ChatLinkConfig::new("s3cr3t").unwrap());

        let err = h
            .issuer
            .issue(ChatId::from(42), "/start abc123")
            .await
            .unwrap_err();
        assert!(err.is_storage_error());
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_derive_matches_issued_code() {
        let h = harness();
        let activation = crate::record::ActivationCode::parse("xyz789").unwrap();
        assert_eq!(h.issuer.derive(&activation).unwrap().as_str(), "6B775D64");
    }
}
