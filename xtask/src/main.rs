use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for lumen")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Run every step below in order
    Check,
    /// cargo fmt --check
    Fmt,
    /// cargo clippy with warnings denied
    Clippy,
    /// cargo test for the whole workspace
    Test,
    /// cargo doc without dependencies
    Doc,
    /// Dump a traced frame through lumen-cli
    Smoke,
}

/// A named cargo invocation.
struct Step {
    name: &'static str,
    args: &'static [&'static str],
}

const FMT: Step = Step {
    name: "fmt",
    args: &["fmt", "--all", "--", "--check"],
};
const CLIPPY: Step = Step {
    name: "clippy",
    args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
};
const TEST: Step = Step {
    name: "test",
    args: &["test", "--workspace"],
};
const DOC: Step = Step {
    name: "doc",
    args: &["doc", "--workspace", "--no-deps"],
};
// Headless: exercises the flush pipeline through the trace backend.
const SMOKE: Step = Step {
    name: "smoke",
    args: &[
        "run", "-p", "lumen-cli", "--", "trace", "--opaque", "3", "--transparent", "2",
        "--outline-every", "2",
    ],
};

fn steps(command: Commands) -> Vec<&'static Step> {
    match command {
        Commands::Check => vec![&FMT, &CLIPPY, &TEST, &DOC, &SMOKE],
        Commands::Fmt => vec![&FMT],
        Commands::Clippy => vec![&CLIPPY],
        Commands::Test => vec![&TEST],
        Commands::Doc => vec![&DOC],
        Commands::Smoke => vec![&SMOKE],
    }
}

fn run(step: &Step) -> Result<()> {
    println!("==> cargo {}", step.args.join(" "));
    let status = Command::new("cargo").args(step.args).status()?;
    if !status.success() {
        bail!("{} failed ({status})", step.name);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    for step in steps(cli.command) {
        run(step)?;
    }
    println!("==> all steps passed");
    Ok(())
}
