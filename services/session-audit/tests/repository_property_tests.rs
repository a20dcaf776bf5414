//! Property-based tests for token hashing and the session lifecycle.

use std::sync::Arc;

use proptest::prelude::*;
use session_audit::{
    InMemorySessionRepository, SessionLifecycleService, SessionRepository, SessionStatus,
    hash_token,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Hashes are 64 lowercase hex characters and never echo the token.
    #[test]
    fn prop_hash_shape(token in "[ -~]{1,512}") {
        let hash = hash_token(&token);
        prop_assert_eq!(hash.len(), 64);
        prop_assert!(hash.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        prop_assert_eq!(hash_token(&token), hash.clone());
        prop_assert!(token.len() < 64 || hash != token);
    }

    /// Every create adds exactly one active row; ending one token closes
    /// only the first row for that token.
    #[test]
    fn prop_create_then_end(
        tokens in prop::collection::vec("[a-z0-9]{8,16}", 1..10),
        pick in any::<prop::sample::Index>(),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let service = SessionLifecycleService::new(Arc::new(InMemorySessionRepository::new()));
            for token in &tokens {
                service.create(token, "alice").await.unwrap();
            }
            prop_assert_eq!(service.repository().count().await.unwrap(), tokens.len() as u64);

            let chosen = pick.get(&tokens);
            service.end(chosen).await.unwrap();

            let rows = service.repository().find_all().await.unwrap();
            let first_match = rows.iter().position(|r| r.token_hash == hash_token(chosen));
            for (i, row) in rows.iter().enumerate() {
                let expected = if Some(i) == first_match {
                    SessionStatus::LoggedOut
                } else {
                    SessionStatus::Active
                };
                prop_assert_eq!(row.status, expected);
            }
            Ok(())
        })?;
    }
}
