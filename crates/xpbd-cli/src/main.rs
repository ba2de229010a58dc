// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! xpbd CLI entrypoint.
//!
//! Runs built-in scenes headlessly and prints body state as JSON, in place
//! of a render loop.
//!
//! # Usage
//! ```text
//! xpbd [--config sim.json] run <scenario> [--ticks N] [--every K]
//! xpbd [--config sim.json] config <scenario>
//! xpbd list
//! ```
//!
//! Logs go to stderr and honour `RUST_LOG`; stdout carries only JSON (or the
//! scenario listing).

#![deny(rust_2018_idioms)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]
// The CLI is expected to print to stdout/stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod scenario;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use xpbd_sim::{BodySnapshot, SimConfig, TickReport};

use crate::scenario::Scenario;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless runner for the xpbd rigid-body kernel")]
struct Args {
    /// JSON config file; replaces the scenario's built-in config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Default log filter when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a scenario and print the final state.
    Run {
        /// Scene to build.
        #[arg(value_enum)]
        scenario: Scenario,
        /// Number of ticks to simulate.
        #[arg(long, default_value_t = 120)]
        ticks: u32,
        /// Also record a frame of body state every K ticks (0 = never).
        #[arg(long, default_value_t = 0)]
        every: u32,
    },
    /// Print the effective config for a scenario.
    Config {
        /// Scene whose defaults apply.
        #[arg(value_enum)]
        scenario: Scenario,
    },
    /// List the built-in scenarios.
    List,
}

/// Sum of per-tick reports.
#[derive(Debug, Default, Serialize)]
struct Totals {
    max_candidate_pairs: usize,
    contacts: usize,
    fallback_contacts: usize,
    ground_contacts: usize,
    impulses: usize,
    settled: usize,
    woken: usize,
}

impl Totals {
    fn absorb(&mut self, report: &TickReport) {
        self.max_candidate_pairs = self.max_candidate_pairs.max(report.candidate_pairs);
        self.contacts += report.contacts;
        self.fallback_contacts += report.fallback_contacts;
        self.ground_contacts += report.ground_contacts;
        self.impulses += report.impulses;
        self.settled += report.settled;
        self.woken += report.woken;
    }
}

#[derive(Debug, Serialize)]
struct Frame {
    tick: u64,
    bodies: Vec<BodySnapshot>,
}

#[derive(Debug, Serialize)]
struct RunOutput {
    scenario: &'static str,
    ticks: u32,
    totals: Totals,
    bodies: Vec<BodySnapshot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    frames: Vec<Frame>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(args.log_level.parse()?))
        .init();

    match args.command {
        Command::Run {
            scenario,
            ticks,
            every,
        } => {
            let config = resolve_config(args.config.as_deref(), scenario)?;
            let output = run(scenario, config, ticks, every)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Config { scenario } => {
            let config = resolve_config(args.config.as_deref(), scenario)?;
            println!("{}", config.to_json_pretty()?);
        }
        Command::List => {
            for scenario in Scenario::ALL {
                println!("{:<10} {}", scenario.name(), scenario.summary());
            }
        }
    }
    Ok(())
}

fn resolve_config(path: Option<&Path>, scenario: Scenario) -> Result<SimConfig> {
    match path {
        Some(path) => SimConfig::load_json(path)
            .with_context(|| format!("load config {}", path.display())),
        None => Ok(scenario.default_config()),
    }
}

fn run(scenario: Scenario, config: SimConfig, ticks: u32, every: u32) -> Result<RunOutput> {
    let mut sys = scenario.build(config).context("build scenario")?;
    info!(scenario = scenario.name(), ticks, "running");
    let mut totals = Totals::default();
    let mut frames = Vec::new();
    for _ in 0..ticks {
        let report = sys.step();
        totals.absorb(&report);
        if every > 0 && sys.tick_count() % u64::from(every) == 0 {
            frames.push(Frame {
                tick: sys.tick_count(),
                bodies: sys.snapshot(),
            });
        }
    }
    Ok(RunOutput {
        scenario: scenario.name(),
        ticks,
        totals,
        bodies: sys.snapshot(),
        frames,
    })
}
