//! Device discovery.
//!
//! Several Arduinos may be plugged in at once, so a candidate port only
//! counts as the event-code device after it echoes the vendor id back to a
//! probe frame.

use crate::connection::Connection;
use crate::error::{EventCodeError, Result};
use crate::frame::encode_vendor_probe;
use crate::link::PortBackend;
use crate::types::Config;
use log::{debug, info, warn};
use serialport::ClearBuffer;

/// Lazy listing of paths matching a glob pattern
pub struct Candidates {
    paths: glob::Paths,
}

impl Iterator for Candidates {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            match self.paths.next()? {
                Ok(path) => return Some(path.to_string_lossy().into_owned()),
                Err(e) => debug!("Skipping unreadable candidate: {}", e),
            }
        }
    }
}

/// Expand `pattern` into candidate device paths.
///
/// Call again to restart the listing.
pub fn list_candidates(pattern: &str) -> Result<Candidates> {
    Ok(Candidates {
        paths: glob::glob(pattern)?,
    })
}

/// Open `path` and check it answers the vendor probe.
///
/// On success the connection stays open with an unbounded read timeout.
/// On failure the connection is released without writing anything further.
pub fn identify(
    connection: &mut Connection,
    backend: &dyn PortBackend,
    path: &str,
    config: &Config,
) -> Result<()> {
    connection.open(backend, path, config.baud_rate, config.settle_delay())?;

    match probe(connection, config).and_then(|_| connection.set_timeout(None)) {
        Ok(()) => Ok(()),
        Err(e) => {
            connection.release();
            Err(e)
        }
    }
}

fn probe(connection: &mut Connection, config: &Config) -> Result<()> {
    let probe = encode_vendor_probe(config.vendor_id_code, config.vendor_id_repetition);
    connection.set_timeout(Some(config.handshake_timeout()))?;
    connection.write(&probe)?;

    let line = connection.read_line(config.handshake_timeout())?;
    connection.clear_buffers(ClearBuffer::Output)?;

    let id: i64 = line
        .trim()
        .parse()
        .map_err(|_| EventCodeError::InvalidResponse(format!("expected vendor id, got {:?}", line)))?;
    debug!("ID code: {}", id);

    if id != i64::from(config.vendor_id_code) {
        return Err(EventCodeError::VendorMismatch {
            expected: config.vendor_id_code,
            actual: id,
        });
    }
    Ok(())
}

/// Probe every candidate of `config.port_pattern` in listing order and keep
/// the first one that identifies.
///
/// Returns the path of the device; `connection` is left open on it.
pub fn find_device(
    connection: &mut Connection,
    backend: &dyn PortBackend,
    config: &Config,
) -> Result<String> {
    let candidates = backend.candidates(&config.port_pattern)?;
    info!(
        "Checking {} port(s) matching {} for the event-code device",
        candidates.len(),
        config.port_pattern
    );

    for path in &candidates {
        debug!("Probing {}", path);
        match identify(connection, backend, path, config) {
            Ok(()) => {
                info!(
                    "Found event-code device on {} (vendor id {})",
                    path, config.vendor_id_code
                );
                return Ok(path.clone());
            }
            Err(e) => warn!("{} is not the event-code device: {}", path, e),
        }
    }

    Err(EventCodeError::NoDeviceFound {
        pattern: config.port_pattern.clone(),
        candidates: candidates.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn lists_matching_paths_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["ttyACM0", "ttyACM1", "ttyUSB0", "ttyACMx"] {
            File::create(dir.path().join(name)).unwrap();
        }
        let pattern = format!("{}/ttyACM[0-9]*", dir.path().display());

        let mut found: Vec<String> = list_candidates(&pattern).unwrap().collect();
        found.sort();
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("ttyACM0"));
        assert!(found[1].ends_with("ttyACM1"));
    }

    #[test]
    fn listing_is_restartable() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("ttyACM3")).unwrap();
        let pattern = format!("{}/ttyACM*", dir.path().display());

        let first: Vec<String> = list_candidates(&pattern).unwrap().collect();
        let second: Vec<String> = list_candidates(&pattern).unwrap().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn no_match_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/ttyACM*", dir.path().display());
        assert_eq!(list_candidates(&pattern).unwrap().count(), 0);
    }

    #[test]
    fn malformed_pattern_is_rejected() {
        assert!(matches!(
            list_candidates("/dev/ttyACM[0-9"),
            Err(EventCodeError::Pattern(_))
        ));
    }
}
