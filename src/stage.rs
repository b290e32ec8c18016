//! Populating node directories before a fresh start.
//!
//! A reset copies the shared genesis and each node's own config out of the
//! mode's source bundle, stamps every genesis with one shared start time and
//! drops whatever chain-data the nodes left behind.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{NetError, Result};
use crate::topology::{NodeSlot, Topology};

pub const GENESIS_FILE: &str = "genesis.json";
/// Per-node config name inside a node directory.
pub const NODE_CONFIG_FILE: &str = "configs.json";
pub const NODE_CONFIGS_DIR: &str = "configs_for_nodes";
pub const CHAINDATA_DIR: &str = "CHAINDATA";
pub const GENESIS_TIMESTAMP_FIELD: &str = "FIRST_EPOCH_START_TIMESTAMP";

/// Stages node directories from one source bundle.
#[derive(Clone, Debug)]
pub struct Stager {
    bundle: PathBuf,
}

impl Stager {
    /// `bundle` holds `genesis.json` and `configs_for_nodes/config_<i>.json`.
    pub fn new(bundle: impl Into<PathBuf>) -> Self {
        Self {
            bundle: bundle.into(),
        }
    }

    pub fn bundle(&self) -> &Path {
        &self.bundle
    }

    /// Stages with the current wall-clock time as the network start.
    pub async fn stage(&self, topology: &Topology) -> Result<u64> {
        self.copy_all(topology).await?;
        let now = now_millis();
        self.finish(topology, now).await?;
        Ok(now)
    }

    /// Stages with an explicit start timestamp (ms since the Unix epoch).
    pub async fn stage_at(&self, topology: &Topology, timestamp_ms: u64) -> Result<()> {
        self.copy_all(topology).await?;
        self.finish(topology, timestamp_ms).await
    }

    async fn copy_all(&self, topology: &Topology) -> Result<()> {
        let genesis = self.bundle.join(GENESIS_FILE);
        for slot in topology {
            fs::create_dir_all(&slot.dir)
                .await
                .map_err(|source| NetError::StageCopy {
                    node: slot.index,
                    from: self.bundle.clone(),
                    to: slot.dir.clone(),
                    source,
                })?;

            copy_file(slot, &genesis, &slot.dir.join(GENESIS_FILE)).await?;

            let node_config = self
                .bundle
                .join(NODE_CONFIGS_DIR)
                .join(format!("config_{}.json", slot.index));
            copy_file(slot, &node_config, &slot.dir.join(NODE_CONFIG_FILE)).await?;

            debug!(node = slot.index, dir = %slot.dir.display(), "staged node files");
        }
        Ok(())
    }

    async fn finish(&self, topology: &Topology, timestamp_ms: u64) -> Result<()> {
        for slot in topology {
            let genesis = slot.dir.join(GENESIS_FILE);
            if is_file(&genesis).await {
                update_genesis_timestamp(&genesis, timestamp_ms)
                    .await
                    .map_err(|reason| NetError::StageGenesis {
                        node: slot.index,
                        path: genesis.clone(),
                        reason,
                    })?;
            }
        }

        for slot in topology {
            let chaindata = slot.dir.join(CHAINDATA_DIR);
            if is_dir(&chaindata).await {
                fs::remove_dir_all(&chaindata)
                    .await
                    .map_err(|source| NetError::StageCleanup {
                        node: slot.index,
                        path: chaindata.clone(),
                        source,
                    })?;
                debug!(node = slot.index, "removed chain-data");
            }
        }

        info!(
            nodes = topology.len(),
            timestamp_ms, "staged network with shared genesis timestamp"
        );
        Ok(())
    }
}

async fn copy_file(slot: &NodeSlot, from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .await
        .map(drop)
        .map_err(|source| NetError::StageCopy {
            node: slot.index,
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
}

/// Rewrites `FIRST_EPOCH_START_TIMESTAMP` in a genesis file, keeping every
/// other field. The whole file is replaced with pretty-printed JSON.
pub async fn update_genesis_timestamp(
    path: &Path,
    timestamp_ms: u64,
) -> std::result::Result<(), String> {
    let raw = fs::read(path).await.map_err(|e| e.to_string())?;
    let mut genesis: Value = serde_json::from_slice(&raw).map_err(|e| e.to_string())?;

    let fields = genesis
        .as_object_mut()
        .ok_or_else(|| "genesis is not a JSON object".to_string())?;
    fields.insert(GENESIS_TIMESTAMP_FIELD.to_string(), Value::from(timestamp_ms));

    let rendered = serde_json::to_vec_pretty(&genesis).map_err(|e| e.to_string())?;
    fs::write(path, rendered).await.map_err(|e| e.to_string())
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}
