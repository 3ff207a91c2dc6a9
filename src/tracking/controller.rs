//! Report scheduling.
//!
//! The controller turns a stream of fixes into at most one report per
//! interval. A backstop tick re-reports the last known fix when the provider
//! goes quiet. Fix delivery, the backstop and forced reports all run on the
//! controller's own thread, so sends reach the session strictly one at a time.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, select};

use crate::aprs::{AprsPacket, PacketEncoder};
use crate::config::{StationIdentity, TrackerConfig};
use crate::error::Result;
use crate::position::{DestinationTarget, GeoFix};
use crate::session::{Connector, SessionManager};

/// Backstop ticks per report interval
const BACKSTOP_TICKS_PER_INTERVAL: u32 = 4;

/// Why a report went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportReason {
    /// A fresh fix arrived and the interval had elapsed
    Fix,
    /// The interval elapsed; the most recent fix is re-used
    Backstop,
    /// Requested through [`TrackerHandle::force_report`]
    Forced,
}

impl fmt::Display for ReportReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportReason::Fix => "fix",
            ReportReason::Backstop => "backstop",
            ReportReason::Forced => "forced",
        };
        f.write_str(name)
    }
}

enum Command {
    SetDestination(Option<DestinationTarget>),
    ForceReport,
    Shutdown,
}

pub struct TrackingController<C: Connector> {
    encoder: PacketEncoder,
    identity: StationIdentity,
    session: Arc<SessionManager<C>>,
    interval: Duration,
    destination: Option<DestinationTarget>,
    last_fix: Option<GeoFix>,
    last_report: Option<Instant>,
}

impl<C: Connector + 'static> TrackingController<C> {
    pub fn new(config: &TrackerConfig, session: Arc<SessionManager<C>>) -> Self {
        Self {
            encoder: PacketEncoder::new(config.report.mode).with_comment(&config.report.comment),
            identity: config.station.clone(),
            session,
            interval: config.report.interval(),
            destination: config.destination,
            last_fix: None,
            last_report: None,
        }
    }

    pub fn destination(&self) -> Option<&DestinationTarget> {
        self.destination.as_ref()
    }

    pub fn set_destination(&mut self, destination: Option<DestinationTarget>) {
        match &destination {
            Some(target) => log::info!("Destination set to {}", target),
            None => log::info!("Destination cleared"),
        }
        self.destination = destination;
    }

    pub fn last_fix(&self) -> Option<&GeoFix> {
        self.last_fix.as_ref()
    }

    fn is_due(&self, now: Instant) -> bool {
        self.last_report
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval)
    }

    /// Record a fresh fix; report it if the interval has elapsed.
    ///
    /// Returns `None` when no report was attempted.
    pub fn on_fix(&mut self, fix: GeoFix, now: Instant) -> Option<Result<AprsPacket>> {
        log::debug!(
            "Fix: lat={:.6} lon={:.6} speed={:.1}m/s ({} kt) course={:.0}° ({})",
            fix.latitude,
            fix.longitude,
            fix.speed_mps,
            fix.speed_knots(),
            fix.course_degrees,
            fix.cardinal_direction()
        );
        self.last_fix = Some(fix);

        if self.is_due(now) {
            Some(self.report(fix, ReportReason::Fix, now))
        } else {
            None
        }
    }

    /// Re-report the last fix if nothing has gone out for a full interval.
    pub fn on_backstop(&mut self, now: Instant) -> Option<Result<AprsPacket>> {
        match self.last_fix {
            Some(fix) if self.is_due(now) => Some(self.report(fix, ReportReason::Backstop, now)),
            _ => None,
        }
    }

    /// Report the last fix immediately, regardless of cadence.
    pub fn force(&mut self, now: Instant) -> Option<Result<AprsPacket>> {
        match self.last_fix {
            Some(fix) => Some(self.report(fix, ReportReason::Forced, now)),
            None => {
                log::warn!("Forced report requested before any fix");
                None
            }
        }
    }

    /// Encode and send one fix.
    ///
    /// A failed send still counts as this cycle's attempt, so a dead server is
    /// retried once per interval rather than on every fix.
    fn report(&mut self, fix: GeoFix, reason: ReportReason, now: Instant) -> Result<AprsPacket> {
        self.last_report = Some(now);

        let packet = self
            .encoder
            .format(&fix, &self.identity, self.destination.as_ref());

        match self.session.send(&packet) {
            Ok(()) => {
                if reason == ReportReason::Fix {
                    log::info!("Reported: {}", packet);
                } else {
                    log::info!("Reported ({}): {}", reason, packet);
                }
                Ok(packet)
            }
            Err(e) => {
                log::warn!("Report ({}) not sent, will retry next cycle: {}", reason, e);
                Err(e)
            }
        }
    }

    /// Run on a dedicated thread until shut down or until `fixes` closes.
    ///
    /// The session is closed when the thread finishes.
    pub fn spawn(self, fixes: Receiver<GeoFix>) -> TrackerHandle {
        let (tx, rx) = crossbeam_channel::unbounded();
        let thread = thread::spawn(move || self.run(fixes, rx));
        TrackerHandle {
            commands: tx,
            thread: Some(thread),
        }
    }

    fn run(mut self, fixes: Receiver<GeoFix>, commands: Receiver<Command>) {
        let ticker = crossbeam_channel::tick(self.interval / BACKSTOP_TICKS_PER_INTERVAL);
        log::info!(
            "Tracking {} every {}s via {}",
            self.identity.callsign,
            self.interval.as_secs_f32(),
            self.session.endpoint()
        );

        loop {
            select! {
                recv(fixes) -> msg => match msg {
                    Ok(fix) => {
                        let _ = self.on_fix(fix, Instant::now());
                    }
                    Err(_) => {
                        log::info!("Location stream closed");
                        break;
                    }
                },
                recv(ticker) -> _ => {
                    let _ = self.on_backstop(Instant::now());
                }
                recv(commands) -> cmd => match cmd {
                    Ok(Command::SetDestination(destination)) => self.set_destination(destination),
                    Ok(Command::ForceReport) => {
                        let _ = self.force(Instant::now());
                    }
                    Ok(Command::Shutdown) | Err(_) => break,
                },
            }
        }

        self.session.close();
        let stats = self.session.stats();
        log::info!(
            "Tracking stopped: {} packets over {} connections, {} failures",
            stats.packets_sent,
            stats.connections,
            stats.failures
        );
    }
}

/// Control surface for a running [`TrackingController`].
pub struct TrackerHandle {
    commands: Sender<Command>,
    thread: Option<thread::JoinHandle<()>>,
}

impl TrackerHandle {
    /// Switch destination-distance reporting on or off from the next report.
    pub fn set_destination(&self, destination: Option<DestinationTarget>) {
        let _ = self.commands.send(Command::SetDestination(destination));
    }

    /// Report the last known fix now.
    pub fn force_report(&self) {
        let _ = self.commands.send(Command::ForceReport);
    }

    /// Stop the controller and wait for it. An in-flight send completes first.
    pub fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown);
        self.join();
    }

    /// Wait for the controller to stop on its own (fix stream closed).
    pub fn wait(mut self) {
        self.join();
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Tracking thread panicked");
            }
        }
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _ = self.commands.send(Command::Shutdown);
            self.join();
        }
    }
}
