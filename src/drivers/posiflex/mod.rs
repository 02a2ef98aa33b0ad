//! Posiflex receipt printer driver
//!
//! Speaks plain ESC/POS over a [`Port`]. Only printing tasks are
//! meaningful for this printer; fiscal calls report `NotSupported`.

pub mod escpos;
pub mod port;
mod settings;
#[cfg(feature = "usb")]
pub mod usb;

pub use port::{Port, TcpPort};
pub use settings::{extract_settings, pack_settings, PosiflexSettings};

use super::EcrDriver;
use crate::model::{
    Alignment, DeviceConnectionType, EquipmentResponse, OfdStatusResponse, OpenShiftResponse,
    ResponseCode, SerialResponse, SessionStateResponse, Task, TaskType,
};
use crate::types::{EquipmentError, Result};
use std::io::ErrorKind;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const POSIFLEX_VENDOR_ID: u16 = 0x0D3A;
pub const ATOL_VENDOR_ID: u16 = 4070;

/// USB vendors whose printers speak this dialect
pub const VENDORS: [u16; 2] = [POSIFLEX_VENDOR_ID, ATOL_VENDOR_ID];

const PRINT_STRING_TRAIT: &str = "trait";
const PRINT_STRING_DASH: &str = "dash";

const TRAIT_TEMPLATE: &str = "=============================";
const DASH_TEMPLATE: &str = "------------------------------";

pub struct Posiflex {
    port: Box<dyn Port>,
    settings: PosiflexSettings,
}

impl Posiflex {
    pub fn new(port: Box<dyn Port>, settings: PosiflexSettings) -> Self {
        Self { port, settings }
    }

    /// Build the driver with the port its settings describe
    pub fn init(settings: PosiflexSettings) -> Result<Self> {
        match settings.connection_type {
            DeviceConnectionType::Network => {
                let port = TcpPort::new(settings.host.clone(), settings.port);
                Ok(Self::new(Box::new(port), settings))
            }
            DeviceConnectionType::Usb => Self::init_usb(settings),
        }
    }

    pub fn init_from_json(settings: &str) -> Result<Self> {
        Self::init(extract_settings(settings))
    }

    #[cfg(feature = "usb")]
    fn init_usb(mut settings: PosiflexSettings) -> Result<Self> {
        let id = usb::find_device(&VENDORS, settings.product_id)?.ok_or_else(|| {
            EquipmentError::DeviceNotFound(format!("USB product {:04x}", settings.product_id))
        })?;
        settings.code_page = match id.vendor_id {
            ATOL_VENDOR_ID => escpos::CODE_PAGE_1251_ATOL,
            _ => escpos::CODE_PAGE_1251_POSIFLEX,
        };
        Ok(Self::new(Box::new(usb::UsbPort::new(id)), settings))
    }

    #[cfg(not(feature = "usb"))]
    fn init_usb(_settings: PosiflexSettings) -> Result<Self> {
        Err(EquipmentError::NotSupported("USB connection"))
    }

    pub fn settings(&self) -> &PosiflexSettings {
        &self.settings
    }

    fn prepare(&mut self) -> Result<()> {
        if !self.port.is_open() {
            info!("Opening {}", self.port.describe());
            self.port.open()?;
        }
        Ok(())
    }

    fn execute_tasks(&mut self, tasks: &[Task]) -> Result<()> {
        self.port.write(&escpos::begin(self.settings.code_page))?;
        for task in tasks {
            self.execute_task(task).map_err(|e| EquipmentError::Execute {
                task: task.kind,
                reason: build_message(&e),
            })?;
        }
        self.port.write(&escpos::end())?;
        Ok(())
    }

    fn execute_task(&mut self, task: &Task) -> Result<()> {
        match task.kind {
            TaskType::String => self.print_string(task),
            TaskType::Cut => self.cut(),
            TaskType::PrintHeader | TaskType::PrintFooter => self.print_offset(),
            other => {
                warn!("Operation {} is not supported by Posiflex", other);
                Ok(())
            }
        }
    }

    fn print_offset(&mut self) -> Result<()> {
        for _ in 0..self.settings.offset_header_bottom {
            self.print_line(&Task::text(" "))?;
        }
        Ok(())
    }

    fn print_string(&mut self, task: &Task) -> Result<()> {
        let data = task.data.trim().to_lowercase();
        let template = if data.contains(PRINT_STRING_TRAIT) {
            Some(TRAIT_TEMPLATE)
        } else if data.contains(PRINT_STRING_DASH) {
            Some(DASH_TEMPLATE)
        } else {
            None
        };

        match template {
            Some(line) => {
                let mut separator = task.clone();
                separator.data = line.to_string();
                separator.param.alignment = Some(Alignment::Center);
                self.print_line(&separator)
            }
            None => self.print_line(task),
        }
    }

    fn cut(&mut self) -> Result<()> {
        self.write_paced(&escpos::cut(), escpos::CUT_DELAY)
    }

    fn print_line(&mut self, task: &Task) -> Result<()> {
        let bytes = escpos::text_line(task);
        self.write_paced(&bytes, escpos::line_delay(&task.data))
    }

    /// Write and give the print head time to catch up
    fn write_paced(&mut self, bytes: &[u8], delay: Duration) -> Result<()> {
        debug!("-> {:02X?}", bytes);
        self.port.write(bytes)?;
        thread::sleep(delay);
        Ok(())
    }
}

impl EcrDriver for Posiflex {
    fn name(&self) -> &str {
        "posiflex"
    }

    fn execute(&mut self, tasks: &[Task], finish_after: bool) -> Result<EquipmentResponse> {
        let result = self
            .prepare()
            .and_then(|_| self.execute_tasks(tasks));

        if finish_after {
            self.finish();
        }

        match result {
            Ok(()) => Ok(EquipmentResponse::success()),
            Err(e) => {
                warn!("Posiflex execution failed: {}", e);
                // the connection is in an unknown state; the next job reconnects
                self.port.close();
                Ok(EquipmentResponse::failure(
                    ResponseCode::HandlingError,
                    build_message(&e),
                ))
            }
        }
    }

    fn get_serial(&mut self, _finish_after: bool) -> Result<SerialResponse> {
        Ok(SerialResponse::default())
    }

    fn get_session_state(&mut self, _finish_after: bool) -> Result<SessionStateResponse> {
        Err(EquipmentError::NotSupported("getSessionState"))
    }

    fn open_shift(&mut self, _finish_after: bool) -> Result<OpenShiftResponse> {
        Err(EquipmentError::NotSupported("openShift"))
    }

    fn get_ofd_status(&mut self, _finish_after: bool) -> Result<OfdStatusResponse> {
        Err(EquipmentError::NotSupported("getOfdStatus"))
    }

    fn finish(&mut self) {
        self.port.close();
    }
}

/// Message reported in `resultInfo` for a failed job
pub fn build_message(e: &EquipmentError) -> String {
    match e {
        EquipmentError::Io(io) => match io.kind() {
            ErrorKind::ConnectionRefused
            | ErrorKind::HostUnreachable
            | ErrorKind::NetworkUnreachable
            | ErrorKind::AddrNotAvailable => "Host connection failure".to_string(),
            ErrorKind::TimedOut | ErrorKind::WouldBlock => "Time out".to_string(),
            _ => format!("I/O error: {}", io),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Port that records written bytes and can be told to fail
    #[derive(Default, Clone)]
    struct MockPort {
        written: Arc<Mutex<Vec<u8>>>,
        open: Arc<Mutex<bool>>,
        opens: Arc<Mutex<u32>>,
        fail_open: Option<ErrorKind>,
        fail_write_after: Option<usize>,
        /// Writes that fail with a reset before the port recovers
        resets_left: Arc<Mutex<u32>>,
    }

    impl Port for MockPort {
        fn describe(&self) -> String {
            "mock".into()
        }

        fn is_open(&self) -> bool {
            *self.open.lock().unwrap()
        }

        fn open(&mut self) -> Result<()> {
            if let Some(kind) = self.fail_open {
                return Err(io::Error::new(kind, "mock open failure").into());
            }
            *self.opens.lock().unwrap() += 1;
            *self.open.lock().unwrap() = true;
            Ok(())
        }

        fn close(&mut self) {
            *self.open.lock().unwrap() = false;
        }

        fn write(&mut self, data: &[u8]) -> Result<()> {
            {
                let mut resets = self.resets_left.lock().unwrap();
                if *resets > 0 {
                    *resets -= 1;
                    return Err(io::Error::new(ErrorKind::ConnectionReset, "reset").into());
                }
            }
            let mut written = self.written.lock().unwrap();
            if let Some(limit) = self.fail_write_after {
                if written.len() >= limit {
                    return Err(io::Error::new(ErrorKind::TimedOut, "stalled").into());
                }
            }
            written.extend_from_slice(data);
            Ok(())
        }

        fn read(&mut self, _size: usize, _timeout: Duration) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    fn driver(port: MockPort, settings: PosiflexSettings) -> Posiflex {
        Posiflex::new(Box::new(port), settings)
    }

    #[test]
    fn test_execute_writes_begin_tasks_end() {
        let port = MockPort::default();
        let mut posiflex = driver(port.clone(), PosiflexSettings::default());

        let tasks = vec![Task::text("OK"), Task::new(TaskType::Cut)];
        let response = posiflex.execute(&tasks, false).unwrap();
        assert!(response.is_success());

        let mut expected = escpos::begin(28);
        expected.extend_from_slice(&[0x1B, 0x21, 0x00, 0x1B, 0x61, 0x00, b'O', b'K', 0x0A]);
        expected.extend_from_slice(&escpos::cut());
        expected.extend_from_slice(&escpos::end());
        assert_eq!(*port.written.lock().unwrap(), expected);
        assert!(port.is_open());
    }

    #[test]
    fn test_finish_after_closes_port() {
        let port = MockPort::default();
        let mut posiflex = driver(port.clone(), PosiflexSettings::default());
        posiflex.execute(&[Task::text("x")], true).unwrap();
        assert!(!port.is_open());
    }

    #[test]
    fn test_port_opened_once_across_jobs() {
        let port = MockPort::default();
        let mut posiflex = driver(port.clone(), PosiflexSettings::default());
        posiflex.execute(&[], false).unwrap();
        posiflex.execute(&[], false).unwrap();
        assert_eq!(*port.opens.lock().unwrap(), 1);
    }

    #[test]
    fn test_trait_and_dash_templates() {
        let port = MockPort::default();
        let mut posiflex = driver(port.clone(), PosiflexSettings::default());
        posiflex
            .execute(&[Task::text("  TRAIT "), Task::text("dash")], false)
            .unwrap();

        let written = port.written.lock().unwrap().clone();
        let text = String::from_utf8_lossy(&written);
        assert!(text.contains(TRAIT_TEMPLATE));
        assert!(text.contains(DASH_TEMPLATE));
        // both separators are centered
        let centered = written.windows(3).filter(|w| *w == [0x1B, 0x61, 0x01]).count();
        assert_eq!(centered, 2);
    }

    #[test]
    fn test_header_offset_prints_blank_lines() {
        let port = MockPort::default();
        let settings = PosiflexSettings {
            offset_header_bottom: 2,
            ..Default::default()
        };
        let mut posiflex = driver(port.clone(), settings);
        posiflex
            .execute(&[Task::new(TaskType::PrintHeader)], false)
            .unwrap();

        let written = port.written.lock().unwrap().clone();
        let blank_lines = written.windows(2).filter(|w| *w == [b' ', 0x0A]).count();
        assert_eq!(blank_lines, 2);
    }

    #[test]
    fn test_unsupported_task_is_skipped() {
        let port = MockPort::default();
        let mut posiflex = driver(port.clone(), PosiflexSettings::default());
        let response = posiflex
            .execute(&[Task::new(TaskType::Payment)], false)
            .unwrap();
        assert!(response.is_success());

        let mut expected = escpos::begin(28);
        expected.extend_from_slice(&escpos::end());
        assert_eq!(*port.written.lock().unwrap(), expected);
    }

    #[test]
    fn test_connection_failure_becomes_handling_error() {
        let port = MockPort {
            fail_open: Some(ErrorKind::ConnectionRefused),
            ..Default::default()
        };
        let mut posiflex = driver(port, PosiflexSettings::default());
        let response = posiflex.execute(&[Task::text("x")], false).unwrap();
        assert_eq!(response.code(), Some(ResponseCode::HandlingError));
        assert_eq!(response.result_info, "Host connection failure");
    }

    #[test]
    fn test_failing_task_names_the_task() {
        let port = MockPort {
            fail_write_after: Some(6),
            ..Default::default()
        };
        let mut posiflex = driver(port, PosiflexSettings::default());
        let response = posiflex.execute(&[Task::new(TaskType::Cut)], false).unwrap();
        assert!(!response.is_success());
        assert_eq!(response.result_info, "Failed to execute task cut. Time out");
    }

    #[test]
    fn test_failed_job_closes_port() {
        let port = MockPort {
            resets_left: Arc::new(Mutex::new(1)),
            ..Default::default()
        };
        let mut posiflex = driver(port.clone(), PosiflexSettings::default());

        let response = posiflex.execute(&[Task::text("x")], false).unwrap();
        assert_eq!(response.code(), Some(ResponseCode::HandlingError));
        assert!(!port.is_open());

        let response = posiflex.execute(&[Task::text("x")], false).unwrap();
        assert!(response.is_success());
        assert!(port.is_open());
        assert_eq!(*port.opens.lock().unwrap(), 2);
    }

    #[test]
    fn test_reconnects_after_printer_drops_connection() {
        use std::io::Read;
        use std::net::TcpListener;
        use std::sync::mpsc;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // first connection dies after the begin sequence, as if the printer rebooted
            let (mut socket, _) = listener.accept().unwrap();
            let mut begin = [0u8; 6];
            socket.read_exact(&mut begin).unwrap();
            drop(socket);

            let (mut socket, _) = listener.accept().unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).unwrap();
            let _ = tx.send(received);
        });

        let settings = PosiflexSettings {
            host: "127.0.0.1".into(),
            port: addr.port(),
            ..Default::default()
        };
        let mut posiflex = Posiflex::init(settings).unwrap();
        let job: Vec<Task> = (0..5).map(|_| Task::text("line")).collect();

        let first = posiflex.execute(&job, false).unwrap();
        assert_eq!(first.code(), Some(ResponseCode::HandlingError));

        let second = posiflex.execute(&job, true).unwrap();
        assert!(second.is_success());

        let received = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(received.starts_with(&escpos::begin(28)));
        assert!(received.ends_with(&escpos::end()));
    }

    #[test]
    fn test_fiscal_calls_not_supported() {
        let mut posiflex = driver(MockPort::default(), PosiflexSettings::default());
        assert!(matches!(
            posiflex.get_session_state(false),
            Err(EquipmentError::NotSupported(_))
        ));
        assert!(matches!(
            posiflex.open_shift(false),
            Err(EquipmentError::NotSupported(_))
        ));
        assert!(matches!(
            posiflex.get_ofd_status(false),
            Err(EquipmentError::NotSupported(_))
        ));
        assert!(matches!(
            posiflex.get_taxes(false),
            Err(EquipmentError::NotSupported(_))
        ));
        assert_eq!(posiflex.get_serial(false).unwrap().serial, "");
    }

    #[test]
    fn test_build_message() {
        let timeout: EquipmentError = io::Error::new(ErrorKind::TimedOut, "t").into();
        assert_eq!(build_message(&timeout), "Time out");
        let other: EquipmentError = io::Error::new(ErrorKind::BrokenPipe, "pipe").into();
        assert_eq!(build_message(&other), "I/O error: pipe");
    }

    #[cfg(not(feature = "usb"))]
    #[test]
    fn test_usb_requires_feature() {
        let settings = PosiflexSettings {
            connection_type: DeviceConnectionType::Usb,
            ..Default::default()
        };
        assert!(matches!(
            Posiflex::init(settings),
            Err(EquipmentError::NotSupported(_))
        ));
    }

    #[test]
    fn test_end_to_end_over_tcp() {
        use std::io::Read;
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).unwrap();
            received
        });

        let settings = PosiflexSettings {
            host: "127.0.0.1".into(),
            port: addr.port(),
            ..Default::default()
        };
        let mut posiflex = Posiflex::init(settings).unwrap();
        let response = posiflex.execute(&[Task::text("Чек")], true).unwrap();
        assert!(response.is_success());

        let received = server.join().unwrap();
        assert!(received.starts_with(&escpos::begin(28)));
        assert!(received.ends_with(&escpos::end()));
        assert!(received
            .windows(4)
            .any(|w| w == [0xD7, 0xE5, 0xEA, 0x0A]));
    }
}
