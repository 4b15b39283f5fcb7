/// Column positions inside the responsible-party directory table.
pub const RESP_COL_REGION: usize = 0;
pub const RESP_COL_EMAIL: usize = 1;

pub const RESP_HEADER: [&str; 2] = ["region", "email"];

/// Directory entry mapping a region to the address that gets the alert.
/// The directory is maintained by hand outside this service; we only read it.
#[derive(Debug, Clone)]
pub struct Responsible {
    pub region: String,
    pub email: String,
}

impl Responsible {
    /// Rows shorter than the layout (a half-filled manual entry) are skipped.
    pub fn from_row(row: &[String]) -> Option<Self> {
        Some(Self {
            region: row.get(RESP_COL_REGION)?.clone(),
            email: row.get(RESP_COL_EMAIL)?.clone(),
        })
    }
}
