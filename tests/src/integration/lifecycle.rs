//! # Registry Lifecycle Flows
//!
//! The keeper writes and the query service reads the same store. Every
//! test drives a realistic sequence of messages and checks what a client
//! would see afterwards.
//!
//! ```text
//! RegisterNode → StartSubscription → StartSession
//!      → UpdateSessionBandwidth* → EndSubscription → EndSession
//! ```

#[cfg(test)]
mod tests {
    use hub_01_vpn::test_utils::{address, stake};
    use hub_01_vpn::{
        ApplyOutcome, DeregisterNode, EndSession, EndSubscription, KeeperError, NodeStatus,
        PageRequest, QueryError, SessionStatus, SetNodeStatus, SubscriptionStatus,
        UpdateNodeInfo, UpdateSessionBandwidth, VpnConfig, VpnQueryApi,
    };
    use shared_types::{Bandwidth, Id, GIGABYTE};

    use crate::integration::{OpenSession, Registry};

    // =========================================================================
    // FIXTURES
    // =========================================================================

    /// 1000 stake at 100 stake/GB.
    const DEPOSIT: i128 = 1_000;
    const QUOTA: i128 = 10 * GIGABYTE;

    fn registry() -> Registry {
        Registry::new(VpnConfig::for_testing())
    }

    fn metered(registry: &Registry) -> OpenSession {
        registry
            .open_session(&address(1), &address(2), DEPOSIT)
            .unwrap()
    }

    fn report(ids: &OpenSession, upload: i128, download: i128) -> UpdateSessionBandwidth {
        UpdateSessionBandwidth::new(address(1), ids.session_id, Bandwidth::new(upload, download))
    }

    // =========================================================================
    // FULL MARKETPLACE FLOW
    // =========================================================================

    #[tokio::test]
    async fn test_full_marketplace_flow() {
        let registry = registry();
        let ids = metered(&registry);
        assert_eq!(ids.node_id, Id::new(1));
        assert_eq!(ids.subscription_id, Id::new(1));
        assert_eq!(ids.session_id, Id::new(1));

        registry.deliver(report(&ids, GIGABYTE, 2 * GIGABYTE)).unwrap();
        registry.deliver(report(&ids, 2 * GIGABYTE, 3 * GIGABYTE)).unwrap();

        let session = registry.queries.get_session(ids.session_id).await.unwrap();
        assert_eq!(session.consumed, Bandwidth::new(2 * GIGABYTE, 3 * GIGABYTE));

        let subscription = registry
            .queries
            .get_subscription(ids.subscription_id)
            .await
            .unwrap();
        assert_eq!(subscription.consumed, Bandwidth::new(2 * GIGABYTE, 3 * GIGABYTE));
        assert_eq!(subscription.quota_bytes(), QUOTA);

        // The owner asks to end while metering is still open.
        let outcome = registry
            .deliver(EndSubscription::new(address(2), ids.subscription_id))
            .unwrap();
        assert_eq!(
            outcome,
            ApplyOutcome::SubscriptionEnded {
                subscription_id: ids.subscription_id,
                status: SubscriptionStatus::EndRequested,
            }
        );

        // Node operator closes the session, which completes the end request.
        let outcome = registry
            .deliver(EndSession::new(address(1), ids.session_id))
            .unwrap();
        assert_eq!(
            outcome,
            ApplyOutcome::SessionEnded {
                session_id: ids.session_id,
                subscription_ended: true,
            }
        );

        let subscription = registry
            .queries
            .get_subscription(ids.subscription_id)
            .await
            .unwrap();
        assert_eq!(subscription.status, SubscriptionStatus::Ended);
        assert_eq!(subscription.status_modified_at, 7);

        let sessions = registry
            .queries
            .get_sessions_of_subscription(ids.subscription_id)
            .await
            .unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].status, SessionStatus::Ended);

        assert_eq!(registry.queries.latest_height().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_owner_and_node_indices() {
        let registry = registry();
        let first = registry.register(&address(1)).unwrap();
        let other = registry.register(&address(3)).unwrap();
        let second = registry.register(&address(1)).unwrap();

        registry.subscribe(&address(2), second, DEPOSIT).unwrap();
        registry.subscribe(&address(4), second, DEPOSIT).unwrap();
        registry.subscribe(&address(2), other, DEPOSIT).unwrap();

        let owned: Vec<Id> = registry
            .queries
            .get_nodes_of_owner(&address(1))
            .await
            .unwrap()
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(owned, vec![first, second]);

        let subscriptions = registry
            .queries
            .get_subscriptions_of_node(second)
            .await
            .unwrap();
        assert_eq!(
            subscriptions.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![Id::new(1), Id::new(2)]
        );
        assert!(registry
            .queries
            .get_subscriptions_of_node(first)
            .await
            .unwrap()
            .is_empty());
        assert!(registry
            .queries
            .get_nodes_of_owner(&address(9))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_paging_through_all_nodes() {
        let registry = registry();
        for n in 1..=5 {
            registry.register(&address(n)).unwrap();
        }

        let mut seen = Vec::new();
        let mut page = PageRequest::default();
        loop {
            let result = registry.queries.get_all_nodes(page).await.unwrap();
            assert!(result.items.len() <= 2);
            seen.extend(result.items.iter().map(|n| n.id.value()));
            match result.next_start_after {
                Some(cursor) => page = PageRequest::after(cursor, 2),
                None => break,
            }
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    // =========================================================================
    // METERING
    // =========================================================================

    #[tokio::test]
    async fn test_quota_exceeded_leaves_state_untouched() {
        let registry = registry();
        let ids = metered(&registry);
        registry.deliver(report(&ids, 4 * GIGABYTE, 4 * GIGABYTE)).unwrap();
        let height = registry.keeper.current_height();

        let err = registry
            .deliver(report(&ids, 6 * GIGABYTE, 5 * GIGABYTE))
            .unwrap_err();
        assert_eq!(
            err,
            KeeperError::QuotaExceeded {
                subscription_id: ids.subscription_id,
                quota: QUOTA,
                requested: 11 * GIGABYTE,
            }
        );
        assert_eq!(registry.keeper.current_height(), height);

        let session = registry.queries.get_session(ids.session_id).await.unwrap();
        assert_eq!(session.consumed, Bandwidth::new(4 * GIGABYTE, 4 * GIGABYTE));

        // Exactly the quota is still accepted.
        registry.deliver(report(&ids, 5 * GIGABYTE, 5 * GIGABYTE)).unwrap();
    }

    #[tokio::test]
    async fn test_quota_spans_sessions() {
        let registry = registry();
        let ids = metered(&registry);
        registry.deliver(report(&ids, 3 * GIGABYTE, 3 * GIGABYTE)).unwrap();
        registry
            .deliver(EndSession::new(address(2), ids.session_id))
            .unwrap();

        let second = registry
            .start_session(&address(2), ids.subscription_id)
            .unwrap();
        assert_eq!(second, Id::new(2));

        let update = UpdateSessionBandwidth::new(
            address(1),
            second,
            Bandwidth::new(2 * GIGABYTE, 3 * GIGABYTE),
        );
        assert!(matches!(
            registry.deliver(update).unwrap_err(),
            KeeperError::QuotaExceeded { requested, .. } if requested == 11 * GIGABYTE
        ));

        let update = UpdateSessionBandwidth::new(address(1), second, Bandwidth::new(GIGABYTE, 0));
        registry.deliver(update).unwrap();
        let subscription = registry
            .queries
            .get_subscription(ids.subscription_id)
            .await
            .unwrap();
        assert_eq!(subscription.consumed, Bandwidth::new(4 * GIGABYTE, 3 * GIGABYTE));
    }

    #[test]
    fn test_only_node_owner_reports_bandwidth() {
        let registry = registry();
        let ids = metered(&registry);

        let forged = UpdateSessionBandwidth::new(address(2), ids.session_id, Bandwidth::new(1, 1));
        assert!(matches!(
            registry.deliver(forged).unwrap_err(),
            KeeperError::Unauthorized { .. }
        ));

        registry.deliver(report(&ids, 10, 10)).unwrap();
        assert_eq!(
            registry.deliver(report(&ids, 9, 10)).unwrap_err(),
            KeeperError::BandwidthDecreased(ids.session_id)
        );
    }

    #[test]
    fn test_ended_session_rejects_reports() {
        let registry = registry();
        let ids = metered(&registry);
        registry
            .deliver(EndSession::new(address(1), ids.session_id))
            .unwrap();
        assert_eq!(
            registry.deliver(report(&ids, 1, 1)).unwrap_err(),
            KeeperError::SessionNotActive(ids.session_id)
        );
    }

    #[tokio::test]
    async fn test_inactive_node_pauses_metering() {
        let registry = registry();
        let ids = metered(&registry);
        registry.deliver(report(&ids, GIGABYTE, GIGABYTE)).unwrap();
        registry
            .deliver(SetNodeStatus::new(address(1), ids.node_id, NodeStatus::Inactive))
            .unwrap();

        assert_eq!(
            registry.deliver(report(&ids, 2 * GIGABYTE, 2 * GIGABYTE)).unwrap_err(),
            KeeperError::SubscriptionNotActive(ids.subscription_id)
        );
        let paused = registry
            .queries
            .get_subscription(ids.subscription_id)
            .await
            .unwrap();
        assert_eq!(paused.status, SubscriptionStatus::Inactive);
        assert_eq!(paused.consumed, Bandwidth::new(GIGABYTE, GIGABYTE));

        // Either side can still close the running session.
        let outcome = registry
            .deliver(EndSession::new(address(1), ids.session_id))
            .unwrap();
        assert_eq!(
            outcome,
            ApplyOutcome::SessionEnded {
                session_id: ids.session_id,
                subscription_ended: false,
            }
        );
        let session = registry.queries.get_session(ids.session_id).await.unwrap();
        assert_eq!(session.status, SessionStatus::Ended);
        assert_eq!(session.consumed, Bandwidth::new(GIGABYTE, GIGABYTE));
    }

    #[test]
    fn test_one_active_session_per_subscription() {
        let registry = registry();
        let ids = metered(&registry);
        assert_eq!(
            registry
                .start_session(&address(2), ids.subscription_id)
                .unwrap_err(),
            KeeperError::SessionAlreadyActive {
                subscription_id: ids.subscription_id,
                session_id: ids.session_id,
            }
        );
    }

    // =========================================================================
    // NODE STATUS CASCADE
    // =========================================================================

    #[tokio::test]
    async fn test_node_status_carries_subscriptions() {
        let registry = registry();
        let node = registry.register(&address(1)).unwrap();
        let a = registry.subscribe(&address(2), node, DEPOSIT).unwrap();
        let b = registry.subscribe(&address(3), node, DEPOSIT).unwrap();
        registry.deliver(EndSubscription::new(address(3), b)).unwrap();

        let outcome = registry
            .deliver(SetNodeStatus::new(address(1), node, NodeStatus::Inactive))
            .unwrap();
        assert_eq!(
            outcome,
            ApplyOutcome::NodeStatusChanged {
                node_id: node,
                status: NodeStatus::Inactive,
                affected_subscriptions: vec![a],
            }
        );
        assert_eq!(
            registry.start_session(&address(2), a).unwrap_err(),
            KeeperError::SubscriptionNotActive(a)
        );
        assert_eq!(
            registry.subscribe(&address(4), node, DEPOSIT).unwrap_err(),
            KeeperError::NodeNotActive(node)
        );

        registry
            .deliver(SetNodeStatus::new(address(1), node, NodeStatus::Registered))
            .unwrap();
        let resumed = registry.queries.get_subscription(a).await.unwrap();
        assert_eq!(resumed.status, SubscriptionStatus::Active);
        let ended = registry.queries.get_subscription(b).await.unwrap();
        assert_eq!(ended.status, SubscriptionStatus::Ended);
        registry.start_session(&address(2), a).unwrap();
    }

    #[tokio::test]
    async fn test_deregistered_node_is_frozen() {
        let registry = registry();
        let ids = metered(&registry);
        let (node, subscription) = (ids.node_id, ids.subscription_id);
        registry.deliver(report(&ids, GIGABYTE, 0)).unwrap();

        registry
            .deliver(DeregisterNode::new(address(1), node))
            .unwrap();
        let record = registry.queries.get_node(node).await.unwrap();
        assert_eq!(record.status, NodeStatus::Deregistered);
        let paused = registry.queries.get_subscription(subscription).await.unwrap();
        assert_eq!(paused.status, SubscriptionStatus::Inactive);

        let update = UpdateNodeInfo::new(
            address(1),
            node,
            "",
            "",
            "renamed",
            None,
            Bandwidth::zero(),
            "",
        );
        assert_eq!(
            registry.deliver(update).unwrap_err(),
            KeeperError::NodeDeregistered(node)
        );
        assert_eq!(
            registry.subscribe(&address(3), node, DEPOSIT).unwrap_err(),
            KeeperError::NodeDeregistered(node)
        );

        // The node owner can no longer bill the paused subscription.
        assert_eq!(
            registry.deliver(report(&ids, 2 * GIGABYTE, 0)).unwrap_err(),
            KeeperError::NodeDeregistered(node)
        );
        let paused = registry.queries.get_subscription(subscription).await.unwrap();
        assert_eq!(paused.consumed, Bandwidth::new(GIGABYTE, 0));

        // The open session and the paused subscription can still be closed.
        registry
            .deliver(EndSession::new(address(2), ids.session_id))
            .unwrap();
        registry
            .deliver(EndSubscription::new(address(2), subscription))
            .unwrap();
        let ended = registry.queries.get_subscription(subscription).await.unwrap();
        assert_eq!(ended.status, SubscriptionStatus::Ended);
    }

    #[tokio::test]
    async fn test_update_node_info_patches_fields() {
        let registry = registry();
        let node = registry.register(&address(1)).unwrap();

        let update = UpdateNodeInfo::new(
            address(1),
            node,
            "",
            "0.4.0",
            "",
            stake(250),
            Bandwidth::new(0, 5_000_000),
            "",
        );
        registry.deliver(update).unwrap();

        let record = registry.queries.get_node(node).await.unwrap();
        assert_eq!(record.version, "0.4.0");
        assert_eq!(record.node_type, "wireguard");
        assert_eq!(record.moniker, "moniker");
        assert_eq!(record.internet_speed, Bandwidth::new(1_000_000, 5_000_000));
        assert_eq!(record.prices_per_gb, stake(250).unwrap());

        // New subscriptions lock in the new price.
        let subscription = registry.subscribe(&address(2), node, 500).unwrap();
        let record = registry.queries.get_subscription(subscription).await.unwrap();
        assert_eq!(record.price_per_gb.amount, 250);
        assert_eq!(record.quota_bytes(), 2 * GIGABYTE);
    }

    // =========================================================================
    // HEIGHTS
    // =========================================================================

    #[tokio::test]
    async fn test_begin_block_stamps_height() {
        let registry = registry();
        registry.keeper.begin_block(10);
        let node = match registry
            .keeper
            .apply(&hub_01_vpn::test_utils::register_node_msg(address(1)).into())
            .unwrap()
        {
            ApplyOutcome::NodeRegistered { node_id } => node_id,
            other => panic!("unexpected outcome {other:?}"),
        };
        assert_eq!(registry.queries.get_node(node).await.unwrap().status_modified_at, 10);

        registry.keeper.begin_block(5);
        assert_eq!(registry.keeper.current_height(), 10);
        registry.register(&address(2)).unwrap();
        assert_eq!(registry.queries.latest_height().await.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_missing_records() {
        let registry = registry();
        assert!(matches!(
            registry.queries.get_node(Id::new(1)).await,
            Err(QueryError::NotFound { .. })
        ));
        assert!(matches!(
            registry.subscribe(&address(2), Id::new(1), DEPOSIT),
            Err(KeeperError::NotFound { .. })
        ));
        assert!(registry
            .queries
            .get_sessions_of_subscription(Id::new(1))
            .await
            .unwrap()
            .is_empty());
    }
}
