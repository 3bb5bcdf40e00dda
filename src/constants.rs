/// Number of committee members a validator key is split across when nothing else is configured.
pub const DEFAULT_COMMITTEE_SIZE: usize = 10;

/// Minimum number of committee members whose shares are needed to rebuild the public key.
pub const DEFAULT_THRESHOLD: usize = 3;

/// Size in bytes of a serialized scalar (secret key or key share).
pub const SCALAR_BYTES: usize = 32;

/// Size in bytes of a compressed G1 public key.
pub const PUBLIC_KEY_BYTES: usize = 48;

/// Directory holding `conf.toml` when no other path is given.
pub const DEFAULT_CONFIG_DIR: &str = ".splitkey";

/// Capacity of the command channel between a `Client` and the `EventLoop`.
pub const COMMAND_CHANNEL_SIZE: usize = 64;
