use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{NetError, Result};

/// Node count used when a permissive caller meets an unrecognized mode.
pub const DEFAULT_NODE_COUNT: usize = 2;

/// How a caller treats a mode tag that does not encode a node count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModePolicy {
    /// Fall back to [`DEFAULT_NODE_COUNT`].
    Permissive,
    /// Fail with [`NetError::InvalidModeFormat`].
    Strict,
}

/// Node count encoded in a mode tag: `TESTNET_5V` -> 5.
///
/// The last `_`-separated token must be `<N>V` with `N > 0`.
pub fn node_count(mode: &str) -> Result<usize> {
    let invalid = |reason| NetError::InvalidModeFormat {
        mode: mode.to_string(),
        reason,
    };

    let (_, last) = mode
        .rsplit_once('_')
        .ok_or_else(|| invalid("expected a trailing _<N>V token"))?;
    let digits = last
        .strip_suffix('V')
        .ok_or_else(|| invalid("last token must end with 'V'"))?;

    match digits.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid("node count must be a positive integer")),
    }
}

/// Applies `policy` to [`node_count`].
pub fn resolve_node_count(mode: &str, policy: ModePolicy) -> Result<usize> {
    match (node_count(mode), policy) {
        (Ok(n), _) => Ok(n),
        (Err(err), ModePolicy::Strict) => Err(err),
        (Err(err), ModePolicy::Permissive) => {
            warn!(%err, fallback = DEFAULT_NODE_COUNT, "unrecognized network mode, using default node count");
            Ok(DEFAULT_NODE_COUNT)
        }
    }
}

/// One network member: its ordinal and working directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeSlot {
    pub index: usize,
    pub dir: PathBuf,
}

impl NodeSlot {
    fn new(base: &Path, index: usize) -> Self {
        Self {
            index,
            dir: base.join(format!("V{index}")),
        }
    }
}

/// Ordered node slots `V1..VN` under one base directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    slots: Vec<NodeSlot>,
}

impl Topology {
    pub fn plan(mode: &str, base: &Path, policy: ModePolicy) -> Result<Self> {
        let count = resolve_node_count(mode, policy)?;
        Ok(Self::with_count(base, count))
    }

    pub fn with_count(base: &Path, count: usize) -> Self {
        Self {
            slots: (1..=count).map(|i| NodeSlot::new(base, i)).collect(),
        }
    }

    pub fn slots(&self) -> &[NodeSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeSlot> {
        self.slots.iter()
    }
}

impl<'a> IntoIterator for &'a Topology {
    type Item = &'a NodeSlot;
    type IntoIter = std::slice::Iter<'a, NodeSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous(topology: &Topology, base: &Path, expected: usize) {
        assert_eq!(topology.len(), expected);
        for (i, slot) in topology.iter().enumerate() {
            assert_eq!(slot.index, i + 1);
            assert_eq!(slot.dir, base.join(format!("V{}", i + 1)));
        }
    }

    #[test]
    fn known_modes_plan_their_node_count() {
        let base = Path::new("/tmp/XTESTNET");
        for (mode, expected) in [("TESTNET_2V", 2), ("TESTNET_5V", 5), ("TESTNET_21V", 21)] {
            let strict = Topology::plan(mode, base, ModePolicy::Strict).unwrap();
            let permissive = Topology::plan(mode, base, ModePolicy::Permissive).unwrap();
            assert_contiguous(&strict, base, expected);
            assert_eq!(strict, permissive);
        }
    }

    #[test]
    fn unrecognized_mode_depends_on_policy() {
        let base = Path::new("/tmp/net");
        let topology = Topology::plan("LOCAL", base, ModePolicy::Permissive).unwrap();
        assert_contiguous(&topology, base, DEFAULT_NODE_COUNT);

        assert!(matches!(
            Topology::plan("LOCAL", base, ModePolicy::Strict),
            Err(NetError::InvalidModeFormat { .. })
        ));
    }

    #[test]
    fn planning_is_deterministic() {
        let base = Path::new("/srv/XTESTNET_21V");
        let first = Topology::plan("TESTNET_21V", base, ModePolicy::Strict).unwrap();
        let second = Topology::plan("TESTNET_21V", base, ModePolicy::Strict).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn node_count_parses_trailing_token() {
        assert_eq!(node_count("TESTNET_5V").unwrap(), 5);
        assert_eq!(node_count("MY_LOCAL_NET_13V").unwrap(), 13);
    }

    #[test]
    fn node_count_rejects_bad_tags() {
        for mode in ["TESTNET_X", "TESTNET_0V", "TESTNET_5", "5V", "TESTNET_-3V", "TESTNET_V", ""] {
            assert!(
                matches!(node_count(mode), Err(NetError::InvalidModeFormat { .. })),
                "{mode:?} should be rejected"
            );
        }
    }
}
