pub mod alert_processor;

pub use alert_processor::{AlertOutcome, AlertProcessor, AlertRequest, ProcessError};
