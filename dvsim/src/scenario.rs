use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use dvnet::{Address, Topology};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};

/// A data packet to inject once the network is running.
#[serde_as]
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TimedSend {
    pub from: Address,
    pub to: Address,
    pub payload: String,
    /// delay after the workers start
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default, rename = "at_ms")]
    pub at: Duration,
}

/// A topology plus the traffic to push through it.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(flatten)]
    pub topology: Topology,
    #[serde(default)]
    pub sends: Vec<TimedSend>,
}

impl Scenario {
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing scenario {}", path.display()))
    }

    /// The diamond, with traffic both ways across it and one packet between hosts on the
    /// same router.
    pub fn diamond() -> anyhow::Result<Self> {
        let send = |from: &str, to: &str, payload: &str, at: u64| -> anyhow::Result<TimedSend> {
            Ok(TimedSend {
                from: Address::new(from)?,
                to: Address::new(to)?,
                payload: payload.to_string(),
                at: Duration::from_millis(at),
            })
        };
        Ok(Self {
            topology: Topology::diamond(),
            sends: vec![
                send("H1", "H3", "Sample data from H1", 0)?,
                send("H2", "H3", "Sample data from H2", 0)?,
                send("H3", "H1", "Reply from H3", 100)?,
                send("H1", "H2", "Next door", 100)?,
            ],
        })
    }

    /// When the last packet is sent.
    pub fn last_send(&self) -> Duration {
        self.sends.iter().map(|s| s.at).max().unwrap_or_default()
    }
}
