//! Linux host implementations for a single-board computer driving the
//! display over a UART.
//!
//! # Host Configuration
//!
//! - **Display link**: `/dev/ttyS1` at 115200 baud, 8N1, 2 s read timeout
//! - **Observations**: HTTPS to the aviation weather JSON API, 10 s timeout
//! - **Network**: NetworkManager on `wlan0`, reconfigured through
//!   `sudo nmcli`

mod clock;
mod metar;
mod network;
mod serial;

pub use clock::SystemClock;
pub use metar::{HttpMetarSource, DEFAULT_METAR_URL};
pub use network::NmcliNetwork;
pub use serial::{LinuxSerial, BAUD_RATE};
