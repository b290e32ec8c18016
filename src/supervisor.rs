//! Spawning node processes and forwarding their output.
//!
//! Every child gets three tasks: one copier per output stream and a watcher
//! that owns the child. The watcher waits for the process to exit, then for
//! both copiers to drain, and only then reports the node as finished.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{NetError, Result};
use crate::topology::{NodeSlot, Topology};

/// Environment variable telling a node which directory it owns.
pub const CHAINDATA_ENV: &str = "CHAINDATA_PATH";

/// The node binary. Started with no arguments; its only input is
/// [`CHAINDATA_ENV`].
#[derive(Clone, Debug)]
pub struct CoreExecutable {
    path: PathBuf,
}

impl CoreExecutable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Command for one slot: inherited environment plus the slot directory,
    /// no stdin, both output streams piped.
    pub fn command(&self, slot: &NodeSlot) -> Command {
        let mut cmd = Command::new(&self.path);
        cmd.env(CHAINDATA_ENV, &slot.dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

/// How one node ended.
#[derive(Clone, Debug)]
pub struct NodeExit {
    pub slot: NodeSlot,
    pub status: ExitStatus,
}

/// A launched node. Dropping it does not stop the process.
#[derive(Debug)]
pub struct NodeHandle {
    slot: NodeSlot,
    pid: Option<u32>,
    watcher: JoinHandle<Result<ExitStatus>>,
}

impl NodeHandle {
    pub fn slot(&self) -> &NodeSlot {
        &self.slot
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Waits until the process exited and both of its streams are drained.
    pub async fn wait(self) -> Result<NodeExit> {
        let NodeHandle { slot, watcher, .. } = self;
        let status = watcher.await.map_err(|e| NetError::Wait {
            node: slot.index,
            dir: slot.dir.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })??;
        Ok(NodeExit { slot, status })
    }
}

#[derive(Clone, Debug)]
pub struct Supervisor {
    executable: CoreExecutable,
}

impl Supervisor {
    pub fn new(executable: CoreExecutable) -> Self {
        Self { executable }
    }

    /// Starts one process per slot, in slot order.
    ///
    /// The first spawn failure aborts the remaining launches. Children that
    /// already started are left running.
    pub fn launch(&self, topology: &Topology) -> Result<Vec<NodeHandle>> {
        let mut handles = Vec::with_capacity(topology.len());
        for slot in topology {
            let handle = self.spawn_node(slot)?;
            info!(node = slot.index, pid = ?handle.pid, dir = %slot.dir.display(), "node started");
            handles.push(handle);
        }
        Ok(handles)
    }

    fn spawn_node(&self, slot: &NodeSlot) -> Result<NodeHandle> {
        let mut child = self
            .executable
            .command(slot)
            .spawn()
            .map_err(|source| NetError::Spawn {
                node: slot.index,
                dir: slot.dir.clone(),
                source,
            })?;

        let pid = child.id();
        let prefix = slot.dir.display().to_string();

        let stdout = child
            .stdout
            .take()
            .map(|out| forward_lines(out, prefix.clone(), io::stdout()));
        let stderr = child
            .stderr
            .take()
            .map(|err| forward_lines(err, prefix.clone(), io::stderr()));

        let watcher = tokio::spawn(watch(slot.clone(), child, [stdout, stderr]));

        Ok(NodeHandle {
            slot: slot.clone(),
            pid,
            watcher,
        })
    }

    /// Blocks until every node has exited and its output is flushed.
    pub async fn await_all(handles: Vec<NodeHandle>) -> Result<Vec<NodeExit>> {
        let mut exits = Vec::with_capacity(handles.len());
        for handle in handles {
            let exit = handle.wait().await?;
            if !exit.status.success() {
                warn!(node = exit.slot.index, status = %exit.status, "node exited with failure");
            }
            exits.push(exit);
        }
        Ok(exits)
    }
}

async fn watch(
    slot: NodeSlot,
    mut child: Child,
    drains: [Option<JoinHandle<io::Result<u64>>>; 2],
) -> Result<ExitStatus> {
    let status = child.wait().await.map_err(|source| NetError::Wait {
        node: slot.index,
        dir: slot.dir.clone(),
        source,
    })?;

    for drain in drains.into_iter().flatten() {
        match drain.await {
            Ok(Ok(lines)) => debug!(node = slot.index, lines, "stream drained"),
            Ok(Err(err)) => warn!(node = slot.index, %err, "stream copy failed"),
            Err(err) => warn!(node = slot.index, %err, "stream copy task failed"),
        }
    }

    let mut stdout = io::stdout();
    let notice = format!("[{}]: process exited\n", slot.dir.display());
    if let Err(err) = write_line(&mut stdout, notice.as_bytes()).await {
        warn!(node = slot.index, %err, "failed to write exit notice");
    }
    debug!(node = slot.index, %status, "node finished");
    Ok(status)
}

fn forward_lines<R, W>(reader: R, prefix: String, mut dst: W) -> JoinHandle<io::Result<u64>>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move { copy_lines_with_prefix(BufReader::new(reader), &prefix, &mut dst).await })
}

/// Copies `reader` line by line into `dst` as `[<prefix>]: <line>`.
///
/// Lines are split on `\n`, a trailing `\r` is dropped, and bytes are passed
/// through without UTF-8 validation. A final line without terminator is
/// still forwarded. Returns the number of lines written.
pub async fn copy_lines_with_prefix<R, W>(mut reader: R, prefix: &str, dst: &mut W) -> io::Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let head = format!("[{prefix}]: ");
    let mut buf = Vec::new();
    let mut out = Vec::new();
    let mut lines = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }

        out.clear();
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(&buf);
        out.push(b'\n');
        write_line(dst, &out).await?;
        lines += 1;
    }

    Ok(lines)
}

async fn write_line<W: AsyncWrite + Unpin>(dst: &mut W, line: &[u8]) -> io::Result<()> {
    dst.write_all(line).await?;
    dst.flush().await
}
