//! Serial port link to the display.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, Parity, SerialPort, StopBits};
use tracing::info;

use crate::traits::{SerialLink, TransportError};

/// Display controller line rate.
pub const BAUD_RATE: u32 = 115_200;

/// Read timeout; a read with nothing received returns after this long.
const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// A `serialport` device configured for the display: 8N1, no flow control.
///
/// # Example
///
/// ```ignore
/// use metar_clock::hal::LinuxSerial;
/// use metar_clock::Panel;
///
/// let link = LinuxSerial::open("/dev/ttyS1")?;
/// let mut panel = Panel::new(link);
/// panel.send("page splash");
/// ```
pub struct LinuxSerial {
    port: Box<dyn SerialPort>,
}

impl LinuxSerial {
    /// Open and configure `path`.
    ///
    /// # Errors
    ///
    /// [`TransportError::Port`] if the device cannot be opened or configured.
    pub fn open(path: &str) -> Result<Self, TransportError> {
        let port = serialport::new(path, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(port_error)?;
        info!(path, baud = BAUD_RATE, "serial port open");
        Ok(Self { port })
    }
}

fn port_error(e: serialport::Error) -> TransportError {
    TransportError::Port(e.to_string())
}

impl SerialLink for LinuxSerial {
    fn bytes_available(&mut self) -> Result<usize, TransportError> {
        self.port
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(port_error)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn clear_input(&mut self) -> Result<(), TransportError> {
        self.port.clear(ClearBuffer::Input).map_err(port_error)
    }

    fn clear_output(&mut self) -> Result<(), TransportError> {
        self.port.clear(ClearBuffer::Output).map_err(port_error)
    }
}
