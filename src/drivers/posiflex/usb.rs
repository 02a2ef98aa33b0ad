//! USB printer port over bulk endpoints (feature `usb`)

use super::port::Port;
use crate::types::{EquipmentError, Result};
use rusb::{Device, DeviceHandle, Direction, GlobalContext, TransferType};
use std::time::Duration;
use tracing::{debug, warn};

const WRITE_TIMEOUT: Duration = Duration::from_millis(1000);

impl From<rusb::Error> for EquipmentError {
    fn from(e: rusb::Error) -> Self {
        match e {
            rusb::Error::Timeout => EquipmentError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "usb transfer timed out",
            )),
            other => EquipmentError::Usb(other.to_string()),
        }
    }
}

/// Vendor and product ids of an attached printer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbDeviceId {
    pub vendor_id: u16,
    pub product_id: u16,
}

/// First attached device from one of `vendors` with the given product id
pub fn find_device(vendors: &[u16], product_id: u16) -> Result<Option<UsbDeviceId>> {
    for device in rusb::devices()?.iter() {
        let descriptor = match device.device_descriptor() {
            Ok(d) => d,
            Err(e) => {
                debug!("Skipping USB device: {}", e);
                continue;
            }
        };
        if vendors.contains(&descriptor.vendor_id()) && descriptor.product_id() == product_id {
            return Ok(Some(UsbDeviceId {
                vendor_id: descriptor.vendor_id(),
                product_id,
            }));
        }
    }
    Ok(None)
}

struct Endpoints {
    interface: u8,
    bulk_in: Option<u8>,
    bulk_out: u8,
}

fn find_endpoints(device: &Device<GlobalContext>) -> Result<Endpoints> {
    let config = device.active_config_descriptor()?;
    for interface in config.interfaces() {
        for descriptor in interface.descriptors() {
            let mut bulk_in = None;
            let mut bulk_out = None;
            for endpoint in descriptor.endpoint_descriptors() {
                if endpoint.transfer_type() != TransferType::Bulk {
                    continue;
                }
                match endpoint.direction() {
                    Direction::In => bulk_in = Some(endpoint.address()),
                    Direction::Out => bulk_out = Some(endpoint.address()),
                }
            }
            if let Some(bulk_out) = bulk_out {
                return Ok(Endpoints {
                    interface: descriptor.interface_number(),
                    bulk_in,
                    bulk_out,
                });
            }
        }
    }
    Err(EquipmentError::Usb("no bulk OUT endpoint".into()))
}

/// Feed `data` to `transfer` until all of it is accepted
fn write_all_bulk(data: &[u8], mut transfer: impl FnMut(&[u8]) -> Result<usize>) -> Result<()> {
    let mut written = 0;
    while written < data.len() {
        match transfer(&data[written..])? {
            0 => {
                return Err(EquipmentError::Usb(format!(
                    "bulk write stalled after {} of {} bytes",
                    written,
                    data.len()
                )))
            }
            n => written += n,
        }
    }
    Ok(())
}

pub struct UsbPort {
    id: UsbDeviceId,
    handle: Option<(DeviceHandle<GlobalContext>, Endpoints)>,
}

impl UsbPort {
    pub fn new(id: UsbDeviceId) -> Self {
        Self { id, handle: None }
    }

    fn connection(&mut self) -> Result<&mut (DeviceHandle<GlobalContext>, Endpoints)> {
        self.handle
            .as_mut()
            .ok_or_else(|| EquipmentError::Usb("port is not open".into()))
    }
}

impl Port for UsbPort {
    fn describe(&self) -> String {
        format!("usb://{:04x}:{:04x}", self.id.vendor_id, self.id.product_id)
    }

    fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    fn open(&mut self) -> Result<()> {
        let handle = rusb::open_device_with_vid_pid(self.id.vendor_id, self.id.product_id)
            .ok_or_else(|| EquipmentError::DeviceNotFound(self.describe()))?;
        let endpoints = find_endpoints(&handle.device())?;
        // Not every platform supports detaching the kernel driver
        let _ = handle.set_auto_detach_kernel_driver(true);
        handle.claim_interface(endpoints.interface)?;
        debug!("Claimed interface {} on {}", endpoints.interface, self.describe());
        self.handle = Some((handle, endpoints));
        Ok(())
    }

    fn close(&mut self) {
        if let Some((handle, endpoints)) = self.handle.take() {
            if let Err(e) = handle.release_interface(endpoints.interface) {
                warn!("Failed to release {}: {}", self.describe(), e);
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        let (handle, endpoints) = self.connection()?;
        write_all_bulk(data, |chunk| {
            Ok(handle.write_bulk(endpoints.bulk_out, chunk, WRITE_TIMEOUT)?)
        })
    }

    fn read(&mut self, size: usize, timeout: Duration) -> Result<Vec<u8>> {
        let (handle, endpoints) = self.connection()?;
        let Some(address) = endpoints.bulk_in else {
            return Ok(Vec::new());
        };
        let mut data = vec![0u8; size];
        let count = match handle.read_bulk(address, &mut data, timeout) {
            Ok(n) => n,
            Err(rusb::Error::Timeout) => 0,
            Err(e) => return Err(e.into()),
        };
        data.truncate(count);
        Ok(data)
    }
}
