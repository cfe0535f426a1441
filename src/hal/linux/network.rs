//! NetworkManager-based WiFi control.

use std::net::IpAddr;
use std::process::Command;

use tracing::{debug, info};

use crate::config::WifiCredentials;
use crate::traits::{NetworkError, NetworkManager};

const NMCLI: &str = "/usr/bin/nmcli";

/// Reads the interface address with `if-addrs` and reconfigures WiFi
/// through `sudo nmcli`.
///
/// The service user needs passwordless sudo for `nmcli`.
#[derive(Debug, Clone)]
pub struct NmcliNetwork {
    interface: String,
}

impl NmcliNetwork {
    /// Manage `interface` (e.g. `wlan0`).
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
        }
    }

    /// Managed interface name.
    pub fn interface(&self) -> &str {
        &self.interface
    }
}

/// Run `sudo nmcli <args>`, failing on a non-zero exit.
fn nmcli(args: &[&str]) -> Result<(), NetworkError> {
    let output = Command::new("sudo")
        .arg(NMCLI)
        .args(args)
        .output()
        .map_err(|e| NetworkError::Command(e.to_string()))?;

    if output.status.success() {
        debug!(stdout = %String::from_utf8_lossy(&output.stdout).trim(), "nmcli ok");
        Ok(())
    } else {
        Err(NetworkError::Command(format!(
            "nmcli exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

impl NetworkManager for NmcliNetwork {
    fn address(&mut self) -> Option<IpAddr> {
        let interfaces = match if_addrs::get_if_addrs() {
            Ok(list) => list,
            Err(e) => {
                debug!(error = %e, "could not list interfaces");
                return None;
            }
        };
        interfaces
            .into_iter()
            .filter(|iface| iface.name == self.interface)
            .map(|iface| iface.ip())
            .find(IpAddr::is_ipv4)
    }

    fn connect(&mut self, credentials: &WifiCredentials) -> Result<(), NetworkError> {
        info!(ssid = %credentials.ssid, interface = %self.interface, "joining network");
        nmcli(&[
            "dev",
            "wifi",
            "connect",
            credentials.ssid.as_str(),
            "password",
            credentials.password.as_str(),
        ])
    }

    fn forget(&mut self, ssid: &str) -> Result<(), NetworkError> {
        info!(ssid, "removing network profile");
        nmcli(&["c", "delete", ssid])
    }
}
