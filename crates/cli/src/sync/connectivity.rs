// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline reporting for the sync engine.
//!
//! A monitor publishes the current state on a tokio `watch` channel so the
//! engine can react to transitions. [`ManualConnectivity`] is set explicitly
//! (tests, `--offline`); [`TcpProbe`] with [`spawn_probe_loop`] feeds one from
//! periodic TCP connects to the server host.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Error type for connectivity setup.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The server URL has no usable host or port.
    #[error("invalid server url '{0}'")]
    InvalidUrl(String),
}

/// Source of online/offline state.
pub trait ConnectivityMonitor: Send + Sync {
    /// Current state.
    fn is_online(&self) -> bool;

    /// Receiver that observes every subsequent transition.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

impl<M: ConnectivityMonitor + ?Sized> ConnectivityMonitor for Arc<M> {
    fn is_online(&self) -> bool {
        (**self).is_online()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        (**self).subscribe()
    }
}

/// Connectivity state set by its owner.
#[derive(Debug)]
pub struct ManualConnectivity {
    tx: watch::Sender<bool>,
}

impl ManualConnectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        ManualConnectivity { tx }
    }

    /// Publish a new state. Returns true if it differs from the previous one.
    pub fn set_online(&self, online: bool) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        })
    }
}

impl ConnectivityMonitor for ManualConnectivity {
    fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Reachability check by opening a TCP connection to the server.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        TcpProbe {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Probe the host and port of `url`, using the scheme's default port if
    /// none is given.
    pub fn from_url(url: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let parsed = reqwest::Url::parse(url).map_err(|_| ProbeError::InvalidUrl(url.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| ProbeError::InvalidUrl(url.to_string()))?;
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| ProbeError::InvalidUrl(url.to_string()))?;
        Ok(TcpProbe::new(host, port, timeout))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// True if a connection was established within the timeout.
    pub async fn check(&self) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(host = %self.host, port = self.port, "probe failed: {}", e);
                false
            }
            Err(_) => {
                debug!(host = %self.host, port = self.port, "probe timed out");
                false
            }
        }
    }
}

/// Probe immediately, then every `interval`, publishing results to `monitor`
/// until `cancel` fires.
pub fn spawn_probe_loop(
    probe: TcpProbe,
    monitor: Arc<ManualConnectivity>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let online = probe.check().await;
                    if monitor.set_online(online) {
                        info!(online, "connectivity changed");
                    }
                }
            }
        }
    })
}
