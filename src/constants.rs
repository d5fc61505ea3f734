pub const DEFAULT_IMAP_SERVER: &str = "imap.gmail.com";
pub const DEFAULT_IMAP_PORT: u16 = 993;
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloaded_attachments";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 9090;

pub const INBOX: &str = "INBOX";

/// Date layout used by IMAP SEARCH (`01-Jan-2024`).
pub const IMAP_DATE_FORMAT: &str = "%d-%b-%Y";
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
pub const FILE_MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Finished runs kept around for `/progress/{run_id}` lookups.
pub const MAX_RETAINED_RUNS: usize = 16;
