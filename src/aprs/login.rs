use crate::config::{SoftwareConfig, StationIdentity};

/// APRS-IS login handshake line.
#[derive(Debug, Clone)]
pub struct Login {
    callsign: String,
    passcode: String,
    software: String,
    version: String,
    filter: String,
}

impl Login {
    pub fn new(identity: &StationIdentity, software: &SoftwareConfig) -> Self {
        Self {
            callsign: identity.callsign.clone(),
            passcode: identity.passcode.clone(),
            software: software.name.clone(),
            version: software.version.clone(),
            filter: software.filter.trim().to_string(),
        }
    }

    /// `user <CALL> pass <PASSCODE> vers <SOFTWARE> <VERSION> filter <FILTER>`
    ///
    /// The filter clause is omitted when no filter is configured.
    pub fn line(&self) -> String {
        self.render(&self.passcode)
    }

    /// Same as [`Login::line`] with the passcode masked, for logging.
    pub fn redacted(&self) -> String {
        self.render("*****")
    }

    pub fn callsign(&self) -> &str {
        &self.callsign
    }

    fn render(&self, passcode: &str) -> String {
        let mut line = format!(
            "user {} pass {} vers {} {}",
            self.callsign, passcode, self.software, self.version
        );
        if !self.filter.is_empty() {
            line.push_str(" filter ");
            line.push_str(&self.filter);
        }
        line
    }
}
