// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod clear;
pub mod daemon;
pub mod drain;
pub mod enqueue;
pub mod list;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;

use courier_core::QueueStore;

use crate::config::{self, queue_path, Config};
use crate::connectivity::{Connectivity, ProbeConnectivity, StaticConnectivity};
use crate::env;
use crate::error::Result;
use crate::host::DaemonHost;
use crate::queue::OfflineQueue;
use crate::trigger::HostTrigger;

/// Store, configuration and state directory for one command invocation.
pub struct Context {
    pub state_dir: PathBuf,
    pub config: Config,
    pub store: Arc<QueueStore>,
}

impl Context {
    /// Resolve the state directory, load config and open the queue store.
    pub fn open() -> Result<Self> {
        let state_dir = config::state_dir();
        let config = Config::load(&state_dir)?;
        let store = Arc::new(QueueStore::open(&queue_path(&state_dir))?);
        Ok(Context {
            state_dir,
            config,
            store,
        })
    }

    pub fn connectivity(&self) -> Box<dyn Connectivity> {
        if env::force_offline() {
            return Box::new(StaticConnectivity(false));
        }
        Box::new(ProbeConnectivity::new(
            self.config.trigger.connectivity_probe.clone(),
            self.config.trigger.probe_timeout(),
        ))
    }

    /// Host trigger over the daemon for this state directory.
    pub fn trigger(&self) -> HostTrigger<DaemonHost> {
        let host = DaemonHost::new(
            self.state_dir.clone(),
            Arc::clone(&self.store),
            self.config.delivery.clone(),
            self.connectivity(),
        );
        HostTrigger::detect(
            host,
            self.config.trigger.sync_tag.clone(),
            self.config.trigger.foreground_delay(),
        )
    }

    pub fn queue(&self) -> OfflineQueue<HostTrigger<DaemonHost>> {
        OfflineQueue::new(Arc::clone(&self.store), self.trigger())
    }
}
