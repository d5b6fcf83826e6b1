// document constants
pub const DOC_ID: &str = "id";
pub const PATH_SEPARATOR: &str = "/";

// auto id constants
pub const AUTO_ID_LENGTH: usize = 20;
pub const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

// transaction constants
pub const DEFAULT_MAX_TRANSACTION_ATTEMPTS: usize = 5;
