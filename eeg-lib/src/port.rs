use crate::constants::PREFERRED_PORT_PATTERNS;
use crate::error::EegError;
use std::fmt;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::info;

/// Names of every serial port the OS reports.
pub fn list_ports() -> Result<Vec<String>, EegError> {
    let ports = tokio_serial::available_ports()?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

/// First port whose name looks like the acquisition board.
pub fn find_preferred_port(ports: &[String]) -> Option<&str> {
    ports
        .iter()
        .find(|p| PREFERRED_PORT_PATTERNS.iter().any(|pattern| p.contains(pattern)))
        .map(String::as_str)
}

/// Open `name` at `baud_rate` for async reads. Dropping the stream closes the port.
pub fn open_port(name: &str, baud_rate: u32) -> Result<SerialStream, EegError> {
    let stream = tokio_serial::new(name, baud_rate).open_native_async()?;
    info!(port = name, baud_rate, "Serial port opened");
    Ok(stream)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticReason {
    /// `mock` was requested on the command line.
    Requested,
    NoMatchingPort,
}

/// Which producer a run should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    Serial { port: String },
    Synthetic { reason: SyntheticReason },
}

impl fmt::Display for SourceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSelection::Serial { port } => write!(f, "serial port {}", port),
            SourceSelection::Synthetic {
                reason: SyntheticReason::Requested,
            } => write!(f, "synthetic source (requested)"),
            SourceSelection::Synthetic {
                reason: SyntheticReason::NoMatchingPort,
            } => write!(
                f,
                "synthetic source (no port matching {})",
                PREFERRED_PORT_PATTERNS.join(" or ")
            ),
        }
    }
}

/// Decide between a real port and the synthetic source.
///
/// An explicit mock request wins, then an explicitly named port, then the
/// first port matching [`PREFERRED_PORT_PATTERNS`].
pub fn select_source(force_synthetic: bool, explicit_port: Option<&str>, ports: &[String]) -> SourceSelection {
    if force_synthetic {
        return SourceSelection::Synthetic {
            reason: SyntheticReason::Requested,
        };
    }
    if let Some(port) = explicit_port {
        return SourceSelection::Serial { port: port.to_string() };
    }
    match find_preferred_port(ports) {
        Some(port) => SourceSelection::Serial { port: port.to_string() },
        None => SourceSelection::Synthetic {
            reason: SyntheticReason::NoMatchingPort,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_preferred_port_filter() {
        let ports = names(&["/dev/ttyS0", "/dev/cu.usbmodem1101", "/dev/cu.usbserial-A50285BI"]);
        assert_eq!(find_preferred_port(&ports), Some("/dev/cu.usbmodem1101"));

        let ports = names(&["/dev/ttyS0", "COM3"]);
        assert_eq!(find_preferred_port(&ports), None);
    }

    #[test]
    fn test_selection_order() {
        let ports = names(&["/dev/tty.usbserial-1"]);

        assert_eq!(
            select_source(true, Some("/dev/ttyACM0"), &ports),
            SourceSelection::Synthetic {
                reason: SyntheticReason::Requested
            }
        );
        assert_eq!(
            select_source(false, Some("/dev/ttyACM0"), &ports),
            SourceSelection::Serial {
                port: "/dev/ttyACM0".to_string()
            }
        );
        assert_eq!(
            select_source(false, None, &ports),
            SourceSelection::Serial {
                port: "/dev/tty.usbserial-1".to_string()
            }
        );
        assert_eq!(
            select_source(false, None, &[]),
            SourceSelection::Synthetic {
                reason: SyntheticReason::NoMatchingPort
            }
        );
    }
}
