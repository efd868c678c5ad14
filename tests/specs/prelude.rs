// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for engine scenarios.

pub use std::path::{Path, PathBuf};
pub use std::time::Duration;
pub use tether_adapters::{FakeAgent, FakeLauncher, FakeNotifyAdapter, Skipper};
pub use tether_core::{FakeClock, Mapping, Signature};
pub use tether_daemon::engine::{self, Engine, EngineOpts, RecordingSink};
pub use tether_wire::Rpc;

pub const DEBOUNCE: Duration = Duration::from_millis(100);

pub struct World {
    pub temp: tempfile::TempDir,
    pub engine: Engine,
    pub agent: FakeAgent,
    pub sink: RecordingSink,
    pub notify: FakeNotifyAdapter,
    pub roots: Vec<PathBuf>,
}

impl World {
    pub fn local(&self, root: usize, sub: &str) -> PathBuf {
        self.roots[root].join(sub)
    }

    /// Feed a raw path batch, as the filesystem watcher would.
    pub fn touch(&self, root: usize, sub: &str) {
        self.engine.paths(vec![self.local(root, sub)]);
    }

    /// Names of every RPC the agent has seen, for order assertions.
    pub fn rpc_names(&self) -> Vec<&'static str> {
        self.agent.received().iter().map(Rpc::name).collect()
    }

    pub fn count_rpc(&self, name: &str) -> usize {
        self.agent.received().iter().filter(|r| r.name() == name).count()
    }
}

/// Build and start an engine over fresh temp roots mapped to the given
/// remote names. `prepare` runs against the fake agent before the engine
/// boots (failure injection, pre-seeded remote trees).
pub async fn world_with(remotes: &[&str], prepare: impl FnOnce(&FakeAgent)) -> World {
    let temp = tempfile::TempDir::new().expect("tempdir");
    let mut pairs = Vec::new();
    let mut roots = Vec::new();
    for (i, remote) in remotes.iter().enumerate() {
        let root = temp.path().join(format!("root{i}"));
        std::fs::create_dir(&root).expect("create root");
        pairs.push((root.clone(), PathBuf::from(remote)));
        roots.push(root);
    }
    let mapping = Mapping::new(pairs).expect("mapping");
    let skippers = remotes.iter().map(|_| Skipper::compile("").expect("skipper")).collect();

    let (launcher, agent) = FakeLauncher::new();
    prepare(&agent);
    let sink = RecordingSink::new();
    let notify = FakeNotifyAdapter::new();
    let engine = engine::start(
        EngineOpts { mapping, skippers, debounce_window: DEBOUNCE },
        launcher,
        notify.clone(),
        FakeClock::new(),
        sink.clone(),
    );
    let world = World { temp, engine, agent, sink, notify, roots };
    settle(&world.engine).await;
    world
}

pub async fn world(remotes: &[&str]) -> World {
    world_with(remotes, |_| {}).await
}

/// Drain the engine: quiesce the actors, let pipe traffic flow, repeat
/// until nothing new happens. Timer-driven work (debounce, backoff) is
/// advanced by the paused clock inside quiesce.
pub async fn settle(engine: &Engine) {
    for _ in 0..40 {
        engine.quiesce().await;
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }
}
