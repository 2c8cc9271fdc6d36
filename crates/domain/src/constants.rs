//! Engine constants
//!
//! Limits imposed by the platform's storage layer plus the default timing
//! of the retry and polling loops.

// Storage limits
pub const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;
pub const MAX_NUMBER_OF_PARTS: u64 = 10_000;

// Dispatcher retry policy
pub const MAX_DISPATCH_ATTEMPTS: u32 = 5;
pub const DISPATCH_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

// Chunk worker retry policy: one entry per attempt, slept before it runs
pub const PART_RETRY_DELAYS_MS: [u64; 3] = [0, 1_000, 2_000];

// Upload fan-out
pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 4;
pub const DIGEST_READ_BUFFER: usize = 1024 * 1024;
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

// Job polling
pub const JOB_POLL_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_JOB_TIMEOUT_MS: u64 = 60_000;

// Default REST roots
pub const DEFAULT_REPO_ENDPOINT: &str = "https://repo-prod.prod.sagebase.org/repo/v1";
pub const DEFAULT_FILE_ENDPOINT: &str = "https://repo-prod.prod.sagebase.org/file/v1";
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://repo-prod.prod.sagebase.org/auth/v1";

// Identity headers
pub const HEADER_USER_ID: &str = "userId";
pub const HEADER_SIGNATURE_TIMESTAMP: &str = "signatureTimestamp";
pub const HEADER_SIGNATURE: &str = "signature";
pub const HEADER_SESSION_TOKEN: &str = "sessionToken";
