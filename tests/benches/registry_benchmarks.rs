//! # Bandwidth Hub Registry Benchmarks
//!
//! | Group | Operation | Expected cost |
//! |-------|-----------|---------------|
//! | hub-01-keeper | `apply_next` per message kind | O(log n) map lookups |
//! | hub-01-keeper | metering report | O(sessions of subscription) |
//! | hub-01-queries | one page of `get_all_nodes` | O(page size) |
//! | hub-01-messages | `validate_basic` + `sign_bytes` | O(message size) |

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hub_01_vpn::test_utils::{address, register_node_msg};
use hub_01_vpn::{Msg, PageRequest, UpdateSessionBandwidth, VpnConfig, VpnQueryApi};
use hub_tests::integration::Registry;
use shared_types::Bandwidth;

// ============================================================================
// hub-01: Keeper
// ============================================================================

fn bench_keeper(c: &mut Criterion) {
    let mut group = c.benchmark_group("hub-01-keeper");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("register_node", |b| {
        let registry = Registry::new(VpnConfig::default());
        let msg: Msg = register_node_msg(address(1)).into();
        b.iter(|| black_box(registry.keeper.apply_next(&msg).is_ok()))
    });

    group.bench_function("update_session_bandwidth", |b| {
        let registry = Registry::new(VpnConfig::default());
        // Deposit large enough that the quota never runs out.
        let ids = match registry.open_session(&address(1), &address(2), i128::from(u64::MAX)) {
            Ok(ids) => ids,
            Err(e) => panic!("setup failed: {e}"),
        };
        let mut consumed = 0i128;
        b.iter(|| {
            consumed += 1;
            let msg = UpdateSessionBandwidth::new(
                address(1),
                ids.session_id,
                Bandwidth::new(consumed, consumed),
            );
            black_box(registry.deliver(msg).is_ok())
        })
    });

    group.finish();
}

// ============================================================================
// hub-01: Queries
// ============================================================================

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("hub-01-queries");
    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(e) => panic!("runtime: {e}"),
    };

    for nodes in [100u32, 1_000, 10_000] {
        let registry = Registry::new(VpnConfig::default());
        for n in 0..nodes {
            let _ = registry.register(&address((n % 250) as u8 + 1));
        }
        let cursor = PageRequest::first(50);

        group.throughput(Throughput::Elements(50));
        group.bench_with_input(BenchmarkId::new("get_all_nodes_page", nodes), &nodes, |b, _| {
            b.iter(|| {
                let page = runtime.block_on(registry.queries.get_all_nodes(cursor));
                black_box(page.map(|p| p.items.len()).unwrap_or_default())
            })
        });
    }

    group.finish();
}

// ============================================================================
// hub-01: Messages
// ============================================================================

fn bench_messages(c: &mut Criterion) {
    let mut group = c.benchmark_group("hub-01-messages");
    let msg: Msg = register_node_msg(address(1)).into();

    group.bench_function("validate_basic", |b| {
        b.iter(|| black_box(msg.validate_basic().is_ok()))
    });
    group.bench_function("sign_bytes", |b| b.iter(|| black_box(msg.sign_bytes().is_ok())));

    group.finish();
}

criterion_group!(benches, bench_keeper, bench_queries, bench_messages);
criterion_main!(benches);
