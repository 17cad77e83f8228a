use std::process::Command;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about = "genparse automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the test suite with cargo nextest
    Nextest {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Review pending insta snapshots for the genparse crate
    Snapshots {
        /// Accept every pending snapshot without prompting.
        #[arg(long)]
        accept: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Nextest { profile, release } => {
            let mut args = vec!["nextest", "run", "--workspace"];
            if let Some(profile) = profile.as_deref() {
                args.extend(["--profile", profile]);
            }
            if release {
                args.push("--release");
            }
            cargo(&args)
        }
        Commands::Snapshots { accept } => {
            let action = if accept { "accept" } else { "review" };
            cargo(&["insta", action, "--package", "genparse"])
        }
    }
}

fn cargo(args: &[&str]) -> Result<()> {
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        bail!("cargo {} failed", args.join(" "));
    }
    Ok(())
}
