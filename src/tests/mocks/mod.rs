//! Mock implementations for testing
//!
//! Mockall doubles for the seams the API client takes as trait objects.
//! `CampaignSubmitter` is auto-mocked next to its definition; the dedup store
//! is mocked here because its production implementation is in-memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;

use crate::core::dedup::DedupStore;

// ============================================================================
// Dedup Store Mock
// ============================================================================

mock! {
    pub Dedup {}

    #[async_trait]
    impl DedupStore for Dedup {
        async fn is_recent(&self, key: &str, now: DateTime<Utc>) -> bool;
        async fn try_record(&self, key: &str, at: DateTime<Utc>) -> bool;
        async fn forget(&self, key: &str);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, EmailDispatch, OneHandClient};
    use crate::tests::common::test_token;

    /// Nothing listens here; any request would fail with a connection error.
    fn offline_client() -> OneHandClient {
        OneHandClient::new("http://127.0.0.1:9").unwrap()
    }

    #[tokio::test]
    async fn test_recent_dispatch_skips_the_backend() {
        let mut dedup = MockDedup::new();
        dedup
            .expect_try_record()
            .withf(|key, _| key == "maria@example.com")
            .times(1)
            .returning(|_, _| false);
        dedup.expect_forget().times(0);

        let dispatch = offline_client()
            .send_verification_email(&test_token(), " maria@example.com ", &dedup)
            .await
            .unwrap();
        assert_eq!(dispatch, EmailDispatch::AlreadySent);
    }

    #[tokio::test]
    async fn test_blank_email_never_consults_store() {
        let mut dedup = MockDedup::new();
        dedup.expect_try_record().times(0);

        let result = offline_client()
            .send_verification_email(&test_token(), "   ", &dedup)
            .await;
        assert!(matches!(result, Err(ApiError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_failed_send_releases_the_address() {
        let mut dedup = MockDedup::new();
        dedup.expect_try_record().times(1).returning(|_, _| true);
        dedup
            .expect_forget()
            .withf(|key| key == "maria@example.com")
            .times(1)
            .returning(|_| ());

        let result = offline_client()
            .send_verification_email(&test_token(), "maria@example.com", &dedup)
            .await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }

    #[tokio::test]
    async fn test_missing_code_never_forgets() {
        let mut dedup = MockDedup::new();
        dedup.expect_forget().times(0);

        let result = offline_client()
            .verify_code(&test_token(), "maria@example.com", "", &dedup)
            .await;
        assert!(matches!(result, Err(ApiError::Invalid(_))));
    }
}
