use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::NetworkConfig;
use crate::error::Result;
use crate::stage::Stager;
use crate::supervisor::{CoreExecutable, NodeExit, Supervisor};
use crate::topology::{ModePolicy, Topology};

/// A local network rooted at one home directory.
///
/// Layout under `home`:
/// - `configs.json`: the [`NetworkConfig`]
/// - `<mode>/`: source bundle used by `reset`
/// - `X<mode>/V<i>/`: node working directories
#[derive(Clone, Debug)]
pub struct LocalNetwork {
    home: PathBuf,
    config: NetworkConfig,
}

impl LocalNetwork {
    pub fn new(home: impl Into<PathBuf>, config: NetworkConfig) -> Self {
        Self {
            home: home.into(),
            config,
        }
    }

    /// Loads `configs.json` from `home`.
    pub fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let home = home.into();
        let config = NetworkConfig::load(&home)?;
        Ok(Self::new(home, config))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Parent of the `V<i>` node directories.
    pub fn nodes_dir(&self) -> PathBuf {
        self.home.join(format!("X{}", self.config.net_mode))
    }

    pub fn bundle_dir(&self) -> PathBuf {
        self.home.join(&self.config.net_mode)
    }

    pub fn plan(&self, policy: ModePolicy) -> Result<Topology> {
        Topology::plan(&self.config.net_mode, &self.nodes_dir(), policy)
    }

    /// Launches every node against its existing state and waits for all of
    /// them to exit.
    pub async fn resume(&self, policy: ModePolicy) -> Result<Vec<NodeExit>> {
        let topology = self.plan(policy)?;
        info!(mode = %self.config.net_mode, nodes = topology.len(), "resuming network");
        self.run(&topology).await
    }

    /// Restages every node from the source bundle, then resumes.
    pub async fn reset(&self) -> Result<Vec<NodeExit>> {
        let topology = self.plan(ModePolicy::Strict)?;
        info!(mode = %self.config.net_mode, nodes = topology.len(), "resetting network");
        Stager::new(self.bundle_dir()).stage(&topology).await?;
        self.run(&topology).await
    }

    async fn run(&self, topology: &Topology) -> Result<Vec<NodeExit>> {
        let supervisor = Supervisor::new(CoreExecutable::new(&self.config.core_path));
        let handles = supervisor.launch(topology)?;
        let exits = Supervisor::await_all(handles).await?;
        info!(nodes = exits.len(), "all nodes exited");
        Ok(exits)
    }
}
