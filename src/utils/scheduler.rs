// @file: up_proxy/src/utils/scheduler.rs
// @description: Self-ping jobs keeping the host awake and pre-warming the cache daily.
// @author: LAS.

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use log::{debug, info, warn};
use reqwest::Client;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Duration, Instant, MissedTickBehavior};
use url::Url;
use crate::core::error::ProxyError;
use crate::utils::config::AppConfig;

//
// PUBLIC INTERFACE
//

/// Spawns the keep-alive and pre-warm jobs. Returns no handles when there is
/// no `self_url` to ping or keep-alive is switched off.
pub fn spawn_jobs(config: &AppConfig) -> Result<Vec<JoinHandle<()>>, ProxyError> {
    let base: &str = match (&config.self_url, config.keep_alive_enabled) {
        (Some(url), true) if !url.trim().is_empty() => url,
        _ => {
            info!("Self-ping scheduler disabled");
            return Ok(Vec::new());
        }
    };

    let client: Client = Client::new();
    let keep_alive_url: Url = join_url(base, &config.keep_alive_path)?;
    let prewarm_url: Url = join_url(base, &config.prewarm_path)?;
    let period: Duration = config.keep_alive_interval();
    let hour: u32 = config.prewarm_hour_utc.min(23);

    info!("Keep-alive every {:?} -> {}", period, keep_alive_url);
    info!("Daily pre-warm at {:02}:00 UTC -> {}", hour, prewarm_url);

    let keep_alive = tokio::spawn(run_keep_alive(client.clone(), keep_alive_url, period));
    let prewarm = tokio::spawn(run_daily_prewarm(client, prewarm_url, hour));

    Ok(vec![keep_alive, prewarm])
}

/// Next occurrence of `hour:00` UTC strictly after `now`.
pub fn next_daily_run(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let at = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or_default();
    let today = now.date_naive().and_time(at).and_utc();

    if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    }
}


//
// JOB LOOPS
//

async fn run_keep_alive(client: Client, url: Url, period: Duration) {
    // First ping one period after startup
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        ping(&client, &url, "keep-alive").await;
    }
}

async fn run_daily_prewarm(client: Client, url: Url, hour: u32) {
    loop {
        let now: DateTime<Utc> = Utc::now();
        let next: DateTime<Utc> = next_daily_run(now, hour);
        let wait: Duration = (next - now).to_std().unwrap_or(Duration::ZERO);

        debug!("Next pre-warm at {}", next);
        sleep(wait).await;
        ping(&client, &url, "pre-warm").await;
    }
}

// Failures are logged and left for the next tick.
async fn ping(client: &Client, url: &Url, job: &str) {
    match client.get(url.clone()).send().await {
        Ok(resp) if resp.status().is_success() => {
            info!("{} ping ok ({})", job, resp.status());
        }
        Ok(resp) => {
            warn!("{} ping to {} returned {}", job, url, resp.status());
        }
        Err(e) => {
            warn!("{} ping to {} failed: {}", job, url, e);
        }
    }
}

fn join_url(base: &str, path: &str) -> Result<Url, ProxyError> {
    let base: Url = Url::parse(base.trim_end_matches('/'))?;
    Ok(base.join(path)?)
}
