//! Per-worker HTTP client. Each probe worker builds exactly one and never shares it.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use std::time::Duration;

use crate::ProbeOpts;
use crate::utils::config::PoolConsts;

/// Deadlines applied to every probe made through a [`ProbeClient`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeSettings {
    pub timeout: Duration,
    pub segment_timeout: Duration,
}

impl From<&ProbeOpts> for ProbeSettings {
    fn from(o: &ProbeOpts) -> Self {
        Self {
            timeout: o.timeout,
            segment_timeout: o.segment_timeout,
        }
    }
}

/// Long-lived blocking client with its own keep-alive pool.
pub struct ProbeClient {
    pub(crate) http: Client,
    pub(crate) settings: ProbeSettings,
}

impl ProbeClient {
    /// Build a client. Failure here is systemic (TLS backend, runtime thread) and aborts the batch.
    pub fn new(settings: ProbeSettings) -> Result<Self> {
        let http = Client::builder()
            .pool_max_idle_per_host(PoolConsts::MAX_IDLE_PER_HOST)
            .pool_idle_timeout(PoolConsts::IDLE_TIMEOUT)
            .connect_timeout(settings.timeout)
            .timeout(settings.timeout)
            .redirect(Policy::limited(PoolConsts::MAX_REDIRECTS))
            .use_rustls_tls()
            .build()
            .context("build probe HTTP client")?;
        Ok(Self { http, settings })
    }

    /// Probe one URL with this client. See [`crate::engine::probe::probe_url`].
    pub fn probe(&self, url: &str) -> crate::Verdict {
        super::probe::probe_url(self, url)
    }
}

/// Build one client per worker up front so a construction failure aborts before any probing starts.
pub fn build_clients(count: usize, settings: ProbeSettings) -> Result<Vec<ProbeClient>> {
    (0..count)
        .map(|i| {
            ProbeClient::new(settings).with_context(|| format!("allocate client for worker {i}"))
        })
        .collect()
}
