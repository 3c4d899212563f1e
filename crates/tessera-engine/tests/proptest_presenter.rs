//! Property tests for the presenter's deferred destruction.
//!
//! Random sequences of spawns, destroy requests and reaps are checked
//! against a simple model of which views should exist.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use proptest::prelude::*;
use tessera_engine::prelude::*;

struct Wisp;
impl EntityKind for Wisp {
    const NAME: &'static str = "Wisp";

    fn assemble(entity: &Entity) {
        entity.insert(ViewBinding::with_prefab(Prefab::new("prefabs/wisp")));
    }
}

/// Operations we can perform on a presenter.
#[derive(Debug, Clone)]
enum PresenterOp {
    Spawn,
    Destroy(usize),
    Reap,
}

fn op_strategy() -> impl Strategy<Value = PresenterOp> {
    prop_oneof![
        3 => Just(PresenterOp::Spawn),
        3 => (0..64usize).prop_map(PresenterOp::Destroy),
        1 => Just(PresenterOp::Reap),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1_000))]

    #[test]
    fn destroy_and_reap_preserve_invariants(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let scene = Arc::new(Mutex::new(MemoryScene::new()));
        let mut presenter = Presenter::new(Arc::clone(&scene));

        let mut live: BTreeSet<NodeId> = BTreeSet::new();
        let mut queued: BTreeSet<NodeId> = BTreeSet::new();
        let mut spawned: Vec<NodeId> = Vec::new();

        for op in ops {
            match op {
                PresenterOp::Spawn => {
                    let view = presenter.spawn_of::<Wisp>(&Placement::default()).unwrap().unwrap();
                    live.insert(view.node());
                    spawned.push(view.node());
                }
                PresenterOp::Destroy(idx) => {
                    if !spawned.is_empty() {
                        let node = spawned[idx % spawned.len()];
                        let newly = presenter.destroy(node);
                        prop_assert_eq!(newly, queued.insert(node));
                    }
                }
                PresenterOp::Reap => {
                    let report = presenter.reap();
                    let destroyed = queued.iter().filter(|n| live.contains(n)).count();
                    prop_assert_eq!(report.drained, queued.len());
                    prop_assert_eq!(report.destroyed, destroyed);
                    for node in std::mem::take(&mut queued) {
                        live.remove(&node);
                    }
                }
            }

            // Invariant: associations are exactly the live views; queued
            // views stay visible until reaped.
            let views: BTreeSet<NodeId> = presenter.views().collect();
            prop_assert_eq!(&views, &live);

            // Invariant: every node is destroyed at most once.
            let scene = scene.lock();
            prop_assert_eq!(scene.live_count(), live.len());
            prop_assert_eq!(
                scene.destroyed_count() as usize,
                spawned.len() - live.len()
            );
        }
    }
}
