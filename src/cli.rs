use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::topology::ModePolicy;

#[derive(Debug, Parser)]
#[command(name = "netspawner")]
#[command(about = "NetSpawner - local blockchain network launcher", long_about = None)]
#[command(after_help = "Examples:\n  netspawner resume\n  netspawner reset\n  netspawner -h")]
pub struct Cli {
    /// Directory holding configs.json and the network layout (defaults to the binary's directory)
    #[arg(long, global = true, env = "NETSPAWNER_HOME")]
    pub home: Option<PathBuf>,

    /// Refuse network modes that do not encode a node count, also on resume
    #[arg(long, global = true)]
    pub strict_mode: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Resume network from the same point
    Resume,
    /// Reset and start the network from init (progress drop)
    Reset,
}

impl Cli {
    pub fn resume_policy(&self) -> ModePolicy {
        if self.strict_mode {
            ModePolicy::Strict
        } else {
            ModePolicy::Permissive
        }
    }
}

/// Accepts `-help` as `--help` and matches commands case-insensitively.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let mut out: Vec<OsString> = args.next().into_iter().collect();
    let mut expect_value = false;

    for arg in args {
        if expect_value {
            expect_value = false;
            out.push(arg);
            continue;
        }
        match arg.to_str() {
            Some("-help") => out.push("--help".into()),
            Some("--home") => {
                expect_value = true;
                out.push(arg);
            }
            Some(s) if !s.starts_with('-') => out.push(s.to_lowercase().into()),
            _ => out.push(arg),
        }
    }
    out
}
