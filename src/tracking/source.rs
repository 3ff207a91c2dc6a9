use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use crossbeam_channel::Receiver;

use crate::position::GeoFix;

/// Something that yields GPS fixes, one at a time.
pub trait LocationSource: Send {
    /// Next fix, or `None` when the source is exhausted.
    fn next_fix(&mut self) -> anyhow::Result<Option<GeoFix>>;
}

/// Newline-delimited JSON fixes from a file, pipe or stdin.
///
/// Each line is an object with `latitude`, `longitude`, `speed` (m/s) and
/// `course` (degrees). Blank lines and lines starting with `#` are skipped;
/// malformed lines are logged and skipped.
pub struct ReplaySource<R> {
    reader: R,
    line_number: usize,
}

impl<R: BufRead + Send> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
        }
    }
}

impl ReplaySource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl ReplaySource<BufReader<io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }
}

impl<R: BufRead + Send> LocationSource for ReplaySource<R> {
    fn next_fix(&mut self) -> anyhow::Result<Option<GeoFix>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            match serde_json::from_str::<GeoFix>(trimmed) {
                Ok(fix) => return Ok(Some(fix)),
                Err(e) => log::warn!("Skipping fix on line {}: {}", self.line_number, e),
            }
        }
    }
}

/// Pull fixes from `source` on a background thread and deliver them on a
/// channel, sleeping `pace` between fixes. The channel closes when the source
/// is exhausted or fails.
pub fn spawn_feed<S>(mut source: S, pace: Duration) -> (Receiver<GeoFix>, thread::JoinHandle<()>)
where
    S: LocationSource + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(16);

    let handle = thread::spawn(move || {
        loop {
            match source.next_fix() {
                Ok(Some(fix)) => {
                    if tx.send(fix).is_err() {
                        log::debug!("Fix receiver dropped");
                        break;
                    }
                    if !pace.is_zero() {
                        thread::sleep(pace);
                    }
                }
                Ok(None) => {
                    log::info!("Location source exhausted");
                    break;
                }
                Err(e) => {
                    log::error!("Location source failed: {:#}", e);
                    break;
                }
            }
        }
    });

    (rx, handle)
}
