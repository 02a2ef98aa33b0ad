//! Wire vocabulary shared by every driver

pub mod bool_as_int;

mod alignment;
mod connection;
mod parameters;
mod report_type;
mod response;
mod response_code;
mod task;
mod task_type;

pub use alignment::Alignment;
pub use connection::DeviceConnectionType;
pub use parameters::Parameters;
pub use report_type::ReportType;
pub use response::*;
pub use response_code::{ResponseCode, ResponseFlags};
pub use task::Task;
pub use task_type::{TaskType, UnknownTaskType};
