#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::Path;
use std::time::Duration;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// An endpoint that refuses connections immediately, so store-failure
/// paths resolve fast instead of waiting on DNS or timeouts.
#[allow(dead_code)]
pub const UNREACHABLE_ENDPOINT: &str = "http://127.0.0.1:9";

/// Create a configured `gachadex` command with an isolated data dir.
///
/// The store endpoint defaults to an unreachable address; tests that
/// exercise the remote path override `GACHADEX_STORE_ENDPOINT` with a
/// mock server URI.
#[allow(dead_code)]
pub fn gachadex_cmd(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gachadex"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("GACHADEX_DATA_DIR", data_dir);
    cmd.env("GACHADEX_STORE_ENDPOINT", UNREACHABLE_ENDPOINT);
    cmd.env("NO_COLOR", "1");
    cmd
}
