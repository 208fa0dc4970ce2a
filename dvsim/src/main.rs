mod scenario;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use dvnet::router::RouterStats;
use dvnet::{Address, Network};
use log::{info, warn};
use serde::Serialize;
use simplelog::*;
use tokio::time::{sleep, Instant};

use crate::scenario::Scenario;

#[derive(Parser, Debug)]
#[command(name = "dvsim", about = "Runs a distance-vector network, one thread per node")]
struct Cli {
    /// JSON scenario (topology plus timed sends), the built-in diamond if absent
    #[arg(long)]
    topology: Option<PathBuf>,

    /// How long to let the network run after the last send
    #[arg(long, default_value_t = 1000)]
    settle_ms: u64,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,

    /// Write the final routing state here as JSON instead of stdout
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Overrides the scenario's router settings
    #[arg(long)]
    split_horizon: bool,
}

#[derive(Serialize)]
struct RouterDump<'a> {
    routes: &'a dvnet::concepts::route::RoutingTable,
    global: &'a dvnet::concepts::route::GlobalView,
    stats: &'a RouterStats,
}

#[derive(Serialize)]
struct Dump<'a> {
    routers: BTreeMap<&'a Address, RouterDump<'a>>,
    received: BTreeMap<&'a Address, Vec<String>>,
    lost_on_links: u64,
}

fn dump(network: &Network) -> anyhow::Result<String> {
    let routers = network
        .routers()
        .iter()
        .map(|r| {
            (
                r.name(),
                RouterDump {
                    routes: r.routing_table(),
                    global: r.global_view(),
                    stats: r.stats(),
                },
            )
        })
        .collect();
    let received = network
        .hosts()
        .iter()
        .map(|h| {
            let payloads = h
                .received()
                .iter()
                .map(|p| String::from_utf8_lossy(p).into_owned())
                .collect();
            (h.address(), payloads)
        })
        .collect();
    let dump = Dump {
        routers,
        received,
        lost_on_links: network.link_layer().lost(),
    };
    Ok(serde_json::to_string_pretty(&dump)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    CombinedLogger::init(vec![TermLogger::new(
        cli.log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])?;

    let mut scenario = match &cli.topology {
        Some(path) => Scenario::load(path).await?,
        None => Scenario::diamond()?,
    };
    if cli.split_horizon {
        scenario.topology.router.split_horizon = true;
    }

    let mut network = Network::build(&scenario.topology).context("building network")?;
    network.announce();
    let running = network.spawn().context("starting workers")?;
    info!("Network is running");

    let started = Instant::now();
    let mut sends = scenario.sends.clone();
    sends.sort_by_key(|s| s.at);
    let deadline = started + scenario.last_send() + Duration::from_millis(cli.settle_ms);

    let interrupted = tokio::select! {
        res = async {
            for send in sends {
                tokio::time::sleep_until(started + send.at).await;
                running
                    .send(&send.from, send.to, send.payload)
                    .with_context(|| format!("sending from {}", send.from))?;
            }
            sleep(deadline.saturating_duration_since(Instant::now())).await;
            Ok::<_, anyhow::Error>(())
        } => {
            res?;
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        warn!("Interrupted, shutting down early");
    }

    // joining the workers blocks
    let network = tokio::task::spawn_blocking(move || running.stop())
        .await
        .context("joining workers")??;
    info!("All workers stopped");

    let out = dump(&network)?;
    match &cli.dump {
        Some(path) => tokio::fs::write(path, out)
            .await
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{out}"),
    }
    Ok(())
}
