use std::net::ToSocketAddrs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use tokio::time::{sleep, Instant};

use crate::config::types::DevServerSpec;
use crate::error::{ConfigError, Result};

const CONNECT_PROBE_TIMEOUT: Duration = Duration::from_millis(200);
const READINESS_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What the engine should do about the dev server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPlan {
    /// Something already listens at the url; the engine attaches to it
    ReuseExisting,
    /// Nothing listens; the engine launches the command itself
    StartNew,
}

/// Decide how the engine obtains its dev server. Never launches anything.
pub fn server_plan(spec: &DevServerSpec) -> Result<ServerPlan> {
    let (host, port) = host_port(spec)?;

    if port_in_use(&host, port) {
        if spec.reuse_existing_server {
            return Ok(ServerPlan::ReuseExisting);
        }
        return Err(ConfigError::PortConflict {
            url: spec.url.clone(),
        });
    }

    Ok(ServerPlan::StartNew)
}

/// Whether something accepts TCP connections at host:port
pub fn port_in_use(host: &str, port: u16) -> bool {
    match (host, port).to_socket_addrs() {
        Ok(mut addrs) => addrs.any(|addr| {
            std::net::TcpStream::connect_timeout(&addr, CONNECT_PROBE_TIMEOUT).is_ok()
        }),
        Err(_) => false,
    }
}

/// Resolve the launch command's program on PATH
pub fn command_on_path(spec: &DevServerSpec) -> Option<PathBuf> {
    spec.program().and_then(|program| which::which(program).ok())
}

/// Poll the readiness URL until it answers with a success status or the
/// startup budget runs out. Returns the elapsed wait in milliseconds.
pub async fn wait_until_ready(spec: &DevServerSpec) -> Result<u64> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to create HTTP client");

    let started = Instant::now();
    let budget = Duration::from_millis(spec.timeout_ms);

    loop {
        if is_ready(&client, &spec.url).await {
            return Ok(started.elapsed().as_millis() as u64);
        }

        if started.elapsed() >= budget {
            return Err(ConfigError::ServerStartup {
                url: spec.url.clone(),
                waited_ms: started.elapsed().as_millis() as u64,
            });
        }

        sleep(READINESS_POLL_INTERVAL).await;
    }
}

/// One readiness probe: any HTTP success status counts
async fn is_ready(client: &reqwest::Client, url: &str) -> bool {
    match client.get(url).send().await {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    }
}

fn host_port(spec: &DevServerSpec) -> Result<(String, u16)> {
    let url = Url::parse(&spec.url).map_err(|e| {
        ConfigError::validation(format!(
            "devServer.url `{}` is not a valid URL: {}",
            spec.url, e
        ))
    })?;

    let host = url
        .host_str()
        .ok_or_else(|| {
            ConfigError::validation(format!("devServer.url `{}` has no host", spec.url))
        })?
        .to_string();

    let port = url.port_or_known_default().ok_or_else(|| {
        ConfigError::validation(format!("devServer.url `{}` has no port", spec.url))
    })?;

    Ok((host, port))
}
