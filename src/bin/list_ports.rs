use eeg_lib::port::find_preferred_port;
use tokio_serial::SerialPortType;
use tracing::info;

fn main() {
    // Initialize tracing (optional, but good for debugging)
    tracing_subscriber::fmt::init();

    info!("Listing serial ports...\n");

    match tokio_serial::available_ports() {
        Ok(ports) => {
            for (i, port) in ports.iter().enumerate() {
                info!("Port #{}: {}", i + 1, port.port_name);
                match &port.port_type {
                    SerialPortType::UsbPort(usb) => {
                        info!("  USB VID: {:#06x}, PID: {:#06x}", usb.vid, usb.pid);
                        info!("  Manufacturer: {}", usb.manufacturer.as_deref().unwrap_or("<Not available>"));
                        info!("  Product: {}", usb.product.as_deref().unwrap_or("<Not available>"));
                        info!("  Serial: {}", usb.serial_number.as_deref().unwrap_or("<Not available>"));
                    }
                    other => info!("  Type: {:?}", other),
                }
                info!("---");
            }
            if ports.is_empty() {
                info!("No serial ports found.");
            }

            let names: Vec<String> = ports.into_iter().map(|p| p.port_name).collect();
            match find_preferred_port(&names) {
                Some(port) => info!("The server would auto-select {}", port),
                None => info!("No acquisition board detected; the server would use the synthetic source"),
            }
        }
        Err(e) => {
            eprintln!("Error listing serial ports: {:?}", e);
        }
    }
}
