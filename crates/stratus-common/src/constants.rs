//! Composition defaults and platform constants.

/// Default queue visibility timeout, in seconds.
pub const DEFAULT_VISIBILITY_TIMEOUT_SECONDS: i64 = 300;

/// Default delivery attempts before a message moves to the dead-letter queue.
pub const DEFAULT_MAX_RECEIVE_COUNT: i64 = 10;

/// Maximum message retention the platform allows, in seconds (14 days).
///
/// Dead-letter queues are always pinned to this value so failed messages
/// survive as long as the platform permits.
pub const MAX_MESSAGE_RETENTION_SECONDS: i64 = 1_209_600;

/// Default number of messages fetched per event-source invocation.
pub const DEFAULT_BATCH_SIZE: i64 = 1;

/// Default handler entry point for composed functions.
pub const DEFAULT_HANDLER: &str = "index.handler";

/// Default runtime for composed functions.
pub const DEFAULT_RUNTIME: &str = "nodejs22.x";

/// Default function memory allocation, in megabytes.
pub const DEFAULT_MEMORY_SIZE_MB: i64 = 128;

/// Default function timeout, in seconds.
pub const DEFAULT_FUNCTION_TIMEOUT_SECONDS: i64 = 300;

/// Default log-group retention, in days.
pub const DEFAULT_LOG_RETENTION_DAYS: i64 = 14;

/// Suffix the platform requires on FIFO queue names.
pub const FIFO_SUFFIX: &str = ".fifo";

/// Suffix appended to derived dead-letter queue names.
pub const DEAD_LETTER_SUFFIX: &str = "-dead-letter";

/// IAM policy language version.
pub const IAM_POLICY_VERSION: &str = "2012-10-17";

/// Template format version understood by the provisioning engine.
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Application name used in CLI output.
pub const APP_NAME: &str = "stratus";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "stratus";
