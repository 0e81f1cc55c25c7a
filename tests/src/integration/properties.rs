//! # Registry Properties
//!
//! Randomised checks of the rules that must hold for every input, not just
//! the hand-picked cases in the lifecycle tests.

#[cfg(test)]
mod tests {
    use hub_01_vpn::test_utils::address;
    use hub_01_vpn::{
        DeregisterNode, EndSubscription, KeeperError, Message, PageRequest, UpdateSessionBandwidth,
        VpnConfig, VpnQueryApi,
    };
    use proptest::prelude::*;
    use shared_types::{Bandwidth, Id, GIGABYTE};

    use crate::integration::Registry;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    fn reports() -> impl Strategy<Value = Vec<(i128, i128)>> {
        prop::collection::vec((0i128..300_000_000, 0i128..300_000_000), 1..24)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// The keeper accepts a report exactly when it is monotonic and
        /// within quota, and the subscription total never passes the quota.
        #[test]
        fn metering_is_monotonic_and_bounded(deposit in 1i128..=50, reports in reports()) {
            let registry = Registry::new(VpnConfig::for_testing());
            let ids = registry.open_session(&address(1), &address(2), deposit).unwrap();
            let quota = deposit * GIGABYTE / 100;

            let mut last = Bandwidth::zero();
            for (upload, download) in reports {
                let reported = Bandwidth::new(upload, download);
                let expected = upload >= last.upload
                    && download >= last.download
                    && upload + download <= quota;

                let msg = UpdateSessionBandwidth::new(address(1), ids.session_id, reported);
                match registry.deliver(msg) {
                    Ok(_) => {
                        prop_assert!(expected, "accepted {reported} after {last}");
                        last = reported;
                    }
                    Err(KeeperError::BandwidthDecreased(_))
                    | Err(KeeperError::QuotaExceeded { .. }) => {
                        prop_assert!(!expected, "rejected {reported} after {last}");
                    }
                    Err(other) => prop_assert!(false, "unexpected error {other}"),
                }
            }

            let (session, subscription) = block_on(async {
                (
                    registry.queries.get_session(ids.session_id).await.unwrap(),
                    registry.queries.get_subscription(ids.subscription_id).await.unwrap(),
                )
            });
            prop_assert_eq!(session.consumed, last);
            prop_assert_eq!(subscription.consumed, last);
            prop_assert!(subscription.consumed.sum() <= subscription.quota_bytes());
        }

        /// Walking every page visits each node once, in ascending id order.
        #[test]
        fn paging_visits_every_node_once(count in 0u8..12, limit in 1usize..=5) {
            let registry = Registry::new(VpnConfig::for_testing());
            for n in 1..=count {
                registry.register(&address(n)).unwrap();
            }

            let seen = block_on(async {
                let mut seen = Vec::new();
                let mut page = PageRequest::first(limit);
                loop {
                    let result = registry.queries.get_all_nodes(page).await.unwrap();
                    assert!(result.items.len() <= limit);
                    seen.extend(result.items.iter().map(|n| n.id.value()));
                    match result.next_start_after {
                        Some(cursor) => page = PageRequest::after(cursor, limit),
                        None => break seen,
                    }
                }
            });
            let expected: Vec<u64> = (1..=u64::from(count)).collect();
            prop_assert_eq!(seen, expected);
        }

        /// Messages of different kinds never share sign bytes, even with
        /// identical fields.
        #[test]
        fn sign_bytes_are_domain_separated(sender in 1u8..=255, id in 1u64..u64::MAX) {
            let deregister = DeregisterNode::new(address(sender), Id::new(id));
            let end = EndSubscription::new(address(sender), Id::new(id));
            prop_assert_ne!(deregister.sign_bytes().unwrap(), end.sign_bytes().unwrap());
            prop_assert_eq!(
                deregister.sign_bytes().unwrap(),
                deregister.clone().sign_bytes().unwrap()
            );
        }
    }
}
