// SPDX-License-Identifier: GPL-3.0-only

//! Building the flash script command line

use crate::error::{Result, SysError};
use crate::paths::{find_script, resolve_working_dir};
use duct::Expression;
use flash_types::{Credential, FlashInvocation};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const UDISKS_SERVICE: &str = "udisks2.service";

/// How and where the flash script is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub script: PathBuf,
    pub working_dir: PathBuf,
    /// Run through `sudo`, feeding the credential on stdin.
    pub elevate: bool,
    /// Stop udisks2 first so it does not auto-mount the module's partitions.
    pub stop_udisks: bool,
}

impl LaunchOptions {
    pub fn discover(
        configured_script: Option<&Path>,
        elevate: bool,
        stop_udisks: bool,
    ) -> Result<Self> {
        let script = find_script(configured_script)?;
        let working_dir = resolve_working_dir(&script);
        debug!(
            "Flash script {} runs in {}",
            script.display(),
            working_dir.display()
        );
        Ok(Self {
            script,
            working_dir,
            elevate,
            stop_udisks,
        })
    }
}

/// Runs the script as a background job of a small supervisor shell.
///
/// A SIGTERM reaching the supervisor (directly, or relayed by `sudo`) is
/// forwarded to its whole process group, so foreground children of the
/// script stop too. `$0` is the script path.
const SUPERVISOR: &str =
    r#"trap 'trap "" TERM; kill -TERM 0; exit 143' TERM; bash "$0" "$@" & wait $!"#;

/// `sudo` flags: always read the password from stdin, even with a cached
/// timestamp, so it never reaches the script's stdin.
const SUDO_ARGS: [&str; 5] = ["-k", "-E", "-S", "-p", ""];

fn command_line(
    invocation: &FlashInvocation,
    options: &LaunchOptions,
    supervised: bool,
) -> (&'static str, Vec<String>) {
    let mut args = Vec::with_capacity(14);
    let program = if options.elevate {
        args.extend(SUDO_ARGS.map(String::from));
        args.push("bash".to_string());
        "sudo"
    } else {
        "bash"
    };
    if supervised {
        args.extend(["-c", SUPERVISOR].map(String::from));
    }
    args.push(options.script.to_string_lossy().into_owned());
    args.extend(invocation.script_args());
    (program, args)
}

fn quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// The command as it would be typed in a shell. Never contains the credential.
pub fn render_command(invocation: &FlashInvocation, options: &LaunchOptions) -> String {
    let (program, args) = command_line(invocation, options, false);
    if args.is_empty() {
        return program.to_string();
    }
    let args: Vec<String> = args.iter().map(|a| quote(a)).collect();
    format!("{} {}", program, args.join(" "))
}

fn require_tool(name: &'static str) -> Result<PathBuf> {
    which::which(name).map_err(|_| SysError::ToolNotFound(name))
}

fn with_credential(expression: Expression, credential: &Credential, elevate: bool) -> Expression {
    if elevate {
        expression.stdin_bytes(format!("{}\n", credential.expose()))
    } else {
        expression.stdin_null()
    }
}

/// An unchecked expression for the flash run with stderr folded into stdout.
///
/// The child leads a new process group whose id is its pid, so the whole
/// group can be signalled on cancel.
pub fn flash_expression(
    invocation: &FlashInvocation,
    options: &LaunchOptions,
) -> Result<Expression> {
    let (program, args) = command_line(invocation, options, true);
    require_tool(program)?;
    if !options.script.is_file() {
        return Err(SysError::ScriptNotFound {
            name: options.script.to_string_lossy().into_owned(),
            searched: options.script.display().to_string(),
        });
    }

    let expression = duct::cmd(program, args)
        .dir(&options.working_dir)
        .stderr_to_stdout()
        .unchecked()
        .before_spawn(|command| {
            command.process_group(0);
            Ok(())
        });
    Ok(with_credential(
        expression,
        &invocation.credential,
        options.elevate,
    ))
}

/// Stop the udisks2 service before flashing.
pub fn stop_udisks(credential: &Credential, elevate: bool) -> Result<()> {
    require_tool("systemctl")?;
    let expression = if elevate {
        require_tool("sudo")?;
        duct::cmd(
            "sudo",
            ["-k", "-S", "-p", "", "systemctl", "stop", UDISKS_SERVICE],
        )
    } else {
        duct::cmd("systemctl", ["stop", UDISKS_SERVICE])
    };

    let output = with_credential(expression, credential, elevate)
        .stderr_to_stdout()
        .stdout_capture()
        .unchecked()
        .run()
        .map_err(|e| SysError::SpawnFailed {
            command: "systemctl".to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        return Err(SysError::OperationFailed(format!(
            "systemctl stop {UDISKS_SERVICE} failed: {}",
            stdout.trim()
        )));
    }

    info!("Stopped {UDISKS_SERVICE}");
    Ok(())
}
