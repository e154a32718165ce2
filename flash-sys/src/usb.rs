// SPDX-License-Identifier: GPL-3.0-only

//! Jetson modules attached in USB recovery mode
//!
//! In forced recovery a module enumerates with NVIDIA's vendor id and a
//! product id that identifies the SoC family. The scan reads sysfs directly.

use std::fs;
use std::path::Path;
use tracing::trace;

pub const SYSFS_USB_DEVICES: &str = "/sys/bus/usb/devices";
pub const NVIDIA_VENDOR_ID: u16 = 0x0955;

/// Module family for a recovery-mode product id.
pub fn module_for_product_id(product_id: u16) -> Option<&'static str> {
    let module = match product_id {
        0x7023 | 0x7223 => "Jetson AGX Orin",
        0x7323 => "Jetson Orin NX 16GB",
        0x7423 => "Jetson Orin NX 8GB",
        0x7523 => "Jetson Orin Nano 8GB",
        0x7623 => "Jetson Orin Nano 4GB",
        0x7019 => "Jetson AGX Xavier",
        0x7e19 => "Jetson Xavier NX",
        0x7f21 => "Jetson Nano",
        0x7c18 => "Jetson TX2",
        _ => return None,
    };
    Some(module)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryDevice {
    /// sysfs device name, e.g. `1-4`.
    pub port: String,
    pub product_id: u16,
}

impl RecoveryDevice {
    pub fn module(&self) -> &'static str {
        module_for_product_id(self.product_id).unwrap_or("Unknown Jetson")
    }
}

fn read_hex_id(path: &Path) -> Option<u16> {
    let text = fs::read_to_string(path).ok()?;
    u16::from_str_radix(text.trim(), 16).ok()
}

/// Recovery-mode modules under `root`, sorted by port.
pub fn scan_recovery_devices_in(root: &Path) -> std::io::Result<Vec<RecoveryDevice>> {
    let mut devices = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let dir = entry.path();

        // Interfaces ("1-4:1.0") carry no ids.
        let port = entry.file_name().to_string_lossy().into_owned();
        if port.contains(':') {
            continue;
        }

        if read_hex_id(&dir.join("idVendor")) != Some(NVIDIA_VENDOR_ID) {
            continue;
        }
        let Some(product_id) = read_hex_id(&dir.join("idProduct")) else {
            continue;
        };

        trace!("NVIDIA device {} product {:04x}", port, product_id);
        devices.push(RecoveryDevice { port, product_id });
    }

    devices.sort_by(|a, b| a.port.cmp(&b.port));
    Ok(devices)
}

/// Scan the host's USB bus. A missing sysfs yields no devices.
pub fn scan_recovery_devices() -> Vec<RecoveryDevice> {
    scan_recovery_devices_in(Path::new(SYSFS_USB_DEVICES)).unwrap_or_else(|e| {
        trace!("USB scan unavailable: {}", e);
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct FakeSysfs(PathBuf);

    impl FakeSysfs {
        fn new(name: &str) -> Self {
            let root = std::env::temp_dir().join(format!(
                "jetson-flash-usb-{}-{}",
                name,
                std::process::id()
            ));
            let _ = fs::remove_dir_all(&root);
            fs::create_dir_all(&root).unwrap();
            Self(root)
        }

        fn device(&self, port: &str, vendor: &str, product: &str) {
            let dir = self.0.join(port);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("idVendor"), format!("{vendor}\n")).unwrap();
            fs::write(dir.join("idProduct"), format!("{product}\n")).unwrap();
        }
    }

    impl Drop for FakeSysfs {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn finds_only_nvidia_devices() {
        let sysfs = FakeSysfs::new("scan");
        sysfs.device("1-4", "0955", "7523");
        sysfs.device("1-2", "0955", "7e19");
        sysfs.device("2-1", "046d", "c52b");
        sysfs.device("1-4:1.0", "0955", "7523");

        let devices = scan_recovery_devices_in(&sysfs.0).unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].port, "1-2");
        assert_eq!(devices[0].module(), "Jetson Xavier NX");
        assert_eq!(devices[1].module(), "Jetson Orin Nano 8GB");
    }

    #[test]
    fn unknown_product_is_still_reported() {
        let sysfs = FakeSysfs::new("unknown");
        sysfs.device("3-1", "0955", "abcd");
        let devices = scan_recovery_devices_in(&sysfs.0).unwrap();
        assert_eq!(devices[0].module(), "Unknown Jetson");
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(scan_recovery_devices_in(Path::new("/nonexistent/usb")).is_err());
    }
}
