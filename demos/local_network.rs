// demos/local_network.rs
//
// Builds a throwaway 5-node network in a temp directory, with a shell stub
// standing in for the node binary, and runs a reset followed by a resume.
use netspawner::*;
use serde_json::json;

#[cfg(unix)]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let mode = "TESTNET_5V";
    let nodes = node_count(mode)?;
    let home = tempfile::tempdir()?;

    println!("🚀 Preparing local network {mode} in {}", home.path().display());

    // Source bundle: shared genesis plus one config per node
    let bundle = home.path().join(mode);
    std::fs::create_dir_all(bundle.join("configs_for_nodes"))?;
    std::fs::write(
        bundle.join("genesis.json"),
        json!({ "CHAIN_ID": "demo", "FIRST_EPOCH_START_TIMESTAMP": 0 }).to_string(),
    )?;
    for i in 1..=nodes {
        std::fs::write(
            bundle.join("configs_for_nodes").join(format!("config_{i}.json")),
            json!({ "NODE_INDEX": i }).to_string(),
        )?;
    }

    // Stub node: report the start timestamp it was given, then leave chain-data behind
    let stub = home.path().join("stub-node.sh");
    std::fs::write(
        &stub,
        r#"#!/bin/sh
echo "starting with $(grep FIRST_EPOCH_START_TIMESTAMP "$CHAINDATA_PATH/genesis.json")"
mkdir -p "$CHAINDATA_PATH/CHAINDATA"
echo "shutting down" >&2
"#,
    )?;
    std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755))?;

    std::fs::write(
        home.path().join("configs.json"),
        json!({ "corePath": stub, "netMode": mode }).to_string(),
    )?;

    let network = LocalNetwork::load(home.path())?;

    println!("\n🔄 Reset");
    let exits = network.reset().await?;
    println!("✅ {} nodes exited", exits.len());

    println!("\n▶️  Resume");
    let exits = network.resume(ModePolicy::Strict).await?;
    for exit in &exits {
        println!("   V{} -> {}", exit.slot.index, exit.status);
    }

    Ok(())
}

#[cfg(not(unix))]
fn main() {
    println!("This demo uses a /bin/sh stub node and only runs on unix");
}
