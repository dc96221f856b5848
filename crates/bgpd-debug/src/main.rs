//! bgp-debugsh - interactive shell for the BGP debug subsystem.
//!
//! Loads the daemon configuration, replays its `debug bgp` lines and then reads
//! commands from stdin. Besides the debug commands it can feed simulated
//! protocol events through the trace gates.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use bgpd_debug::{
    execute_line, resolve_neighbor, write_config, CommandNode, DaemonConfig, DebugRegistry,
    Direction, FsmState, IpPrefix, Notification, NotifyDirection, NeighborTable, PathAttributes,
    ZebraAction,
};

#[derive(Debug, Parser)]
#[command(name = "bgp-debugsh", version, about = "BGP debug command shell")]
struct Args {
    /// Daemon configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default log filter when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

struct Shell {
    config: DaemonConfig,
    config_path: Option<PathBuf>,
    neighbors: NeighborTable,
    registry: DebugRegistry,
    node: CommandNode,
}

impl Shell {
    fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config = match &config_path {
            Some(path) => DaemonConfig::from_file(path)?,
            None => DaemonConfig::default(),
        };
        let neighbors = config.neighbor_table()?;
        let mut registry = DebugRegistry::new();
        let rejected = config.replay_debug(&mut registry, &neighbors);
        info!(neighbors = neighbors.len(), rejected, "Debug configuration applied");

        Ok(Self {
            config,
            config_path,
            neighbors,
            registry,
            node: CommandNode::Enable,
        })
    }

    fn prompt(&self) -> &'static str {
        match self.node {
            CommandNode::Enable => "bgpd# ",
            CommandNode::Config => "bgpd(config)# ",
        }
    }

    /// Handles one input line. Returns false when the shell should exit.
    fn handle(&mut self, line: &str, out: &mut impl Write) -> Result<bool> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match (self.node, tokens.as_slice()) {
            (_, []) => {}
            (CommandNode::Enable, ["exit" | "quit"]) => return Ok(false),
            (CommandNode::Enable, ["configure", "terminal"]) => self.node = CommandNode::Config,
            (CommandNode::Config, ["end" | "exit"]) => self.node = CommandNode::Enable,
            (_, ["show", "running-config"]) => {
                for line in write_config(&self.registry) {
                    writeln!(out, "{line}")?;
                }
            }
            (_, ["write"]) => self.save(out)?,
            (_, ["trace", rest @ ..]) => match self.simulate(rest) {
                Ok(Some(line)) => writeln!(out, "{line}")?,
                Ok(None) => writeln!(out, "(not traced)")?,
                Err(e) => writeln!(out, "% {e}")?,
            },
            _ => {
                let output = execute_line(&mut self.registry, &self.neighbors, self.node, line);
                for line in output.lines {
                    writeln!(out, "{line}")?;
                }
            }
        }
        Ok(true)
    }

    fn save(&mut self, out: &mut impl Write) -> Result<()> {
        let Some(path) = &self.config_path else {
            writeln!(out, "% No configuration file")?;
            return Ok(());
        };
        self.config.save_debug(&self.registry);
        self.config.to_file(path)?;
        writeln!(out, "Configuration saved to {}", path.display())?;
        Ok(())
    }

    /// Feeds a simulated protocol event through the trace gates.
    fn simulate(&self, tokens: &[&str]) -> Result<Option<String>> {
        let reg = &self.registry;
        let line = match tokens {
            ["state", peer, from, to] => {
                let neighbor = resolve_neighbor(&self.neighbors, peer)?;
                let (Ok(from), Ok(to)) = (from.parse::<FsmState>(), to.parse::<FsmState>()) else {
                    bail!("unknown FSM state");
                };
                reg.trace_state_change(&neighbor, from, to)
            }
            ["keepalive", peer, dir] => {
                let neighbor = resolve_neighbor(&self.neighbors, peer)?;
                reg.trace_keepalive(&neighbor, parse_direction(dir)?)
            }
            ["update", peer, prefix, dir, rest @ ..] => {
                let neighbor = resolve_neighbor(&self.neighbors, peer)?;
                let prefix: IpPrefix = prefix.parse()?;
                let attrs = PathAttributes::default();
                let attrs = match rest {
                    ["withdraw"] => None,
                    _ => Some(&attrs),
                };
                reg.trace_update(&neighbor, &prefix, parse_direction(dir)?, attrs)
            }
            ["zebra", prefix, action] => {
                let prefix: IpPrefix = prefix.parse()?;
                let action = match *action {
                    "add" => ZebraAction::Add,
                    "delete" => ZebraAction::Delete,
                    other => bail!("unknown zebra action '{other}'"),
                };
                reg.trace_zebra(&prefix, action)
            }
            ["notify", peer, code, subcode, dir] => {
                let neighbor = resolve_neighbor(&self.neighbors, peer)?;
                let notify = Notification::new(code.parse()?, subcode.parse()?);
                let direction = match *dir {
                    "sent" => NotifyDirection::Sent,
                    "received" => NotifyDirection::Received,
                    other => bail!("unknown direction '{other}'"),
                };
                reg.log_notification(
                    &neighbor,
                    &notify,
                    direction,
                    self.config.log_neighbor_changes,
                )
            }
            _ => bail!("usage: trace state|keepalive|update|zebra|notify ..."),
        };
        Ok(line)
    }
}

fn parse_direction(token: &str) -> Result<Direction> {
    match token {
        "in" => Ok(Direction::Inbound),
        "out" => Ok(Direction::Outbound),
        other => bail!("unknown direction '{other}'"),
    }
}

fn run(args: Args) -> Result<()> {
    let mut shell = Shell::load(args.config)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "{}", shell.prompt())?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if !shell.handle(line.trim(), &mut stdout)? {
            break;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logging(&args.log_level) {
        eprintln!("bgp-debugsh: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "bgp-debugsh exiting with error");
            ExitCode::FAILURE
        }
    }
}
