//! gpsd location source
//!
//! Connects to a gpsd daemon over TCP, enables JSON watch mode, and
//! waits for the first TPV report with a 2D-or-better fix. Fresh fixes
//! refresh the last-known cache so later captures can fall back to it.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use super::cache::LastKnownCache;
use crate::application::ports::{LocationError, LocationSource};
use crate::domain::memo::GeoFix;

/// Watch command enabling JSON reports
const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true,\"json\":true}\n";

/// A gpsd time-position-velocity report. Only the fields we need;
/// everything else in the report is ignored.
#[derive(Debug, Deserialize)]
struct TpvReport {
    class: String,
    mode: Option<u8>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl TpvReport {
    /// A usable fix needs mode >= 2 (2D) and both coordinates
    fn fix(&self) -> Option<GeoFix> {
        if self.class != "TPV" || self.mode.unwrap_or(0) < 2 {
            return None;
        }
        Some(GeoFix::new(self.lat?, self.lon?))
    }
}

/// Location source backed by a gpsd daemon
pub struct GpsdLocationSource {
    addr: String,
    cache: LastKnownCache,
}

impl GpsdLocationSource {
    pub fn new(addr: impl Into<String>, cache: LastKnownCache) -> Self {
        Self {
            addr: addr.into(),
            cache,
        }
    }

    /// Connect and wait for the first report with a usable fix
    async fn await_fix(&self) -> Result<GeoFix, LocationError> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|e| LocationError::Unavailable(format!("gpsd at {}: {}", self.addr, e)))?;

        let (reader, mut writer) = stream.into_split();
        writer
            .write_all(WATCH_COMMAND)
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?
        {
            // Reports we don't understand (VERSION, SKY, ...) are skipped
            let Ok(report) = serde_json::from_str::<TpvReport>(&line) else {
                continue;
            };
            if let Some(fix) = report.fix() {
                tracing::debug!(lat = fix.latitude, lon = fix.longitude, "fix acquired");
                return Ok(fix);
            }
        }

        Err(LocationError::Unavailable(
            "gpsd closed the connection before a fix".to_string(),
        ))
    }
}

#[async_trait]
impl LocationSource for GpsdLocationSource {
    async fn current_fix(&self, timeout: StdDuration) -> Result<GeoFix, LocationError> {
        let fix = tokio::time::timeout(timeout, self.await_fix())
            .await
            .map_err(|_| LocationError::Timeout(timeout))??;

        self.cache.save(fix).await;
        Ok(fix)
    }

    async fn last_known(&self) -> Option<GeoFix> {
        self.cache.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn tpv_with_2d_fix_is_usable() {
        let report: TpvReport = serde_json::from_str(
            r#"{"class":"TPV","device":"/dev/ttyS0","mode":3,"lat":37.774929,"lon":-122.419416,"speed":12.3}"#,
        )
        .unwrap();

        let fix = report.fix().unwrap();
        assert_eq!(fix.latitude, 37.774929);
        assert_eq!(fix.longitude, -122.419416);
    }

    #[test]
    fn tpv_without_mode_is_ignored() {
        let report: TpvReport =
            serde_json::from_str(r#"{"class":"TPV","mode":1,"lat":1.0,"lon":2.0}"#).unwrap();
        assert!(report.fix().is_none());

        let report: TpvReport = serde_json::from_str(r#"{"class":"TPV"}"#).unwrap();
        assert!(report.fix().is_none());
    }

    #[test]
    fn non_tpv_classes_are_ignored() {
        let report: TpvReport =
            serde_json::from_str(r#"{"class":"SKY","mode":3,"lat":1.0,"lon":2.0}"#).unwrap();
        assert!(report.fix().is_none());
    }

    #[tokio::test]
    async fn reads_fix_from_fake_gpsd() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            // Consume the watch command
            let mut buf = [0u8; 128];
            let _ = socket.read(&mut buf).await;

            socket
                .write_all(b"{\"class\":\"VERSION\",\"release\":\"3.25\"}\n")
                .await
                .unwrap();
            socket
                .write_all(b"{\"class\":\"TPV\",\"mode\":3,\"lat\":48.1374,\"lon\":11.5755}\n")
                .await
                .unwrap();
        });

        let dir = TempDir::new().unwrap();
        let source = GpsdLocationSource::new(addr.to_string(), LastKnownCache::new(dir.path()));

        let fix = source
            .current_fix(StdDuration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(fix.latitude, 48.1374);
        assert_eq!(fix.longitude, 11.5755);

        // A fresh fix refreshes the cache
        assert!(source.last_known().await.is_some());
    }

    #[tokio::test]
    async fn slow_gpsd_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            // Hold the connection open without sending anything
            tokio::time::sleep(StdDuration::from_secs(10)).await;
        });

        let dir = TempDir::new().unwrap();
        let source = GpsdLocationSource::new(addr.to_string(), LastKnownCache::new(dir.path()));

        let result = source.current_fix(StdDuration::from_millis(50)).await;
        assert!(matches!(result, Err(LocationError::Timeout(_))));
    }

    #[tokio::test]
    async fn unreachable_gpsd_is_unavailable() {
        let dir = TempDir::new().unwrap();
        // Reserved port with nothing listening
        let source =
            GpsdLocationSource::new("127.0.0.1:1", LastKnownCache::new(dir.path()));

        let result = source.current_fix(StdDuration::from_secs(1)).await;
        assert!(matches!(result, Err(LocationError::Unavailable(_))));
    }
}
