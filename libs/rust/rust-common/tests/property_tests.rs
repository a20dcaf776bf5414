//! Property-based tests for rust-common crate.
//!
//! These tests verify the cache contract every fast-path backend must keep.

use proptest::prelude::*;
use rust_common::{CacheBackend, CacheClientConfig, LocalCache};
use std::time::Duration;

fn arb_key() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9:_-]{1,64}"
}

fn arb_value() -> impl Strategy<Value = String> {
    "[ -~]{0,256}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The last write under a key is the one that is read back.
    #[test]
    fn prop_last_write_wins(
        key in arb_key(),
        values in prop::collection::vec(arb_value(), 1..8),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let cache = LocalCache::new(CacheClientConfig::default());

            for value in &values {
                cache.set(&key, value, Duration::from_secs(60)).await.unwrap();
            }

            let stored = cache.get(&key).await.unwrap();
            prop_assert_eq!(stored.as_ref(), values.last());
            Ok(())
        })?;
    }

    /// Deleted keys read as absent no matter how often they were written.
    #[test]
    fn prop_delete_removes_value(
        key in arb_key(),
        value in arb_value(),
        writes in 1usize..5,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let cache = LocalCache::new(CacheClientConfig::default());

            for _ in 0..writes {
                cache.set(&key, &value, Duration::from_secs(60)).await.unwrap();
            }
            cache.delete(&key).await.unwrap();

            prop_assert_eq!(cache.get(&key).await.unwrap(), None);
            Ok(())
        })?;
    }

    /// Writing one key never disturbs another.
    #[test]
    fn prop_keys_are_independent(
        key_a in arb_key(),
        key_b in arb_key(),
        value_a in arb_value(),
        value_b in arb_value(),
    ) {
        prop_assume!(key_a != key_b);
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let cache = LocalCache::new(CacheClientConfig::default());

            cache.set(&key_a, &value_a, Duration::from_secs(60)).await.unwrap();
            cache.set(&key_b, &value_b, Duration::from_secs(60)).await.unwrap();
            cache.delete(&key_b).await.unwrap();

            prop_assert_eq!(cache.get(&key_a).await.unwrap(), Some(value_a));
            Ok(())
        })?;
    }
}
