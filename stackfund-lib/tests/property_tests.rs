//! Property-based tests for stackfund-lib
//!
//! These tests use proptest to verify invariants across a wide range of inputs.

mod id_properties {
    use proptest::prelude::*;
    use stackfund_lib::id::{is_valid_link_id, LinkIdGenerator, RandomIdGenerator};

    proptest! {
        /// Every generated id is 8 alphanumeric characters
        #[test]
        fn generated_ids_are_well_formed(_round in 0u32..500) {
            let id = RandomIdGenerator.generate();
            prop_assert_eq!(id.len(), 8);
            prop_assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
            prop_assert!(is_valid_link_id(&id));
        }

        /// Anything outside [A-Za-z0-9]{8} is rejected
        #[test]
        fn validator_rejects_other_shapes(s in "\\PC{0,12}") {
            let expected = s.len() == 8 && s.bytes().all(|b| b.is_ascii_alphanumeric());
            prop_assert_eq!(is_valid_link_id(&s), expected);
        }
    }
}

mod creation_properties {
    use proptest::prelude::*;
    use stackfund_lib::test_utils::sample_request;
    use stackfund_lib::{InMemoryLinkStore, LinkError, PaymentLinkService};
    use std::collections::HashSet;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// N creations yield N pairwise distinct ids
        #[test]
        fn ids_pairwise_distinct(n in 1usize..60) {
            let ids = runtime().block_on(async {
                let service = PaymentLinkService::new(InMemoryLinkStore::new());
                let mut ids = Vec::with_capacity(n);
                for _ in 0..n {
                    ids.push(service.create(sample_request()).await.unwrap().payment_link_id);
                }
                ids
            });
            let unique: HashSet<&String> = ids.iter().collect();
            prop_assert_eq!(unique.len(), n);
        }

        /// Positive amounts are accepted, zero and negatives never reach the store
        #[test]
        fn amount_sign_decides_acceptance(cents in -1_000_000i64..1_000_000i64) {
            let amount = format!("{}.{:02}", cents / 100, (cents % 100).abs());
            let amount = if cents < 0 && cents > -100 { format!("-{}", amount) } else { amount };

            let (result, stored) = runtime().block_on(async {
                let service = PaymentLinkService::new(InMemoryLinkStore::new());
                let mut input = sample_request();
                input.amount = Some(amount.clone());
                let result = service.create(input).await;
                (result, service.store().len())
            });

            if cents > 0 {
                prop_assert!(result.is_ok(), "amount {} rejected", amount);
                prop_assert_eq!(stored, 1);
            } else {
                prop_assert!(matches!(result, Err(LinkError::InvalidAmount(_))), "amount {} accepted", amount);
                prop_assert_eq!(stored, 0);
            }
        }
    }
}
