//! External command invocation.
//!
//! [`CommandRunner`] is the seam between the pipeline and the `plantuml`
//! executable. [`ProcessRunner`] spawns real processes; tests supply their
//! own implementations returning canned output.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, decoded lossily as UTF-8.
    pub stdout: String,
}

/// Error running an external command.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// The process could not be started.
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Piping input or collecting output failed.
    #[error("failed to communicate with `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exited unsuccessfully.
    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        /// Exit status as reported by the OS.
        status: String,
        /// Trimmed standard error.
        stderr: String,
    },
}

/// Runs an external command with text on standard input.
pub trait CommandRunner {
    /// Run `program` with `args`, writing `input` to its standard input.
    ///
    /// Returns the captured standard output when the command succeeds.
    fn run(
        &self,
        program: &str,
        args: &[String],
        input: &str,
    ) -> Result<CommandOutput, InvocationError>;
}

/// [`CommandRunner`] that spawns operating system processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        input: &str,
    ) -> Result<CommandOutput, InvocationError> {
        debug!(program, ?args, "spawning process");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| InvocationError::Spawn {
                program: program.to_owned(),
                source,
            })?;

        // Feed stdin from a separate thread so a child that writes before
        // reading all of its input cannot block on a full stdout pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = input.as_bytes().to_vec();
            std::thread::spawn(move || stdin.write_all(&input))
        });

        let output = child
            .wait_with_output()
            .map_err(|source| InvocationError::Io {
                program: program.to_owned(),
                source,
            })?;

        if let Some(writer) = writer {
            let written = writer.join().unwrap_or_else(|_| {
                Err(std::io::Error::other("stdin writer thread panicked"))
            });
            // A child may exit without reading its whole input; only its
            // exit status decides success then.
            if let Err(err) = written
                && err.kind() != std::io::ErrorKind::BrokenPipe
            {
                return Err(InvocationError::Io {
                    program: program.to_owned(),
                    source: err,
                });
            }
        }

        if !output.status.success() {
            return Err(InvocationError::Failed {
                program: program.to_owned(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn test_process_runner_pipes_stdin_to_stdout() {
        let output = ProcessRunner
            .run("cat", &[], "@startuml\nA -> B\n@enduml\n")
            .unwrap();
        assert_eq!(output.stdout, "@startuml\nA -> B\n@enduml\n");
    }

    #[test]
    fn test_process_runner_passes_arguments() {
        let output = ProcessRunner
            .run("sh", &args(&["-c", "echo \"$0 $1\"", "-ttxt", "-pipe"]), "")
            .unwrap();
        assert_eq!(output.stdout.trim(), "-ttxt -pipe");
    }

    #[test]
    fn test_process_runner_missing_program() {
        let err = ProcessRunner
            .run("plantpipe-definitely-missing-binary", &[], "")
            .unwrap_err();
        assert!(matches!(err, InvocationError::Spawn { .. }), "got {err:?}");
        assert!(err.to_string().contains("plantpipe-definitely-missing-binary"));
    }

    #[test]
    fn test_process_runner_non_zero_exit() {
        let err = ProcessRunner
            .run("sh", &args(&["-c", "echo boom >&2; exit 3"]), "")
            .unwrap_err();
        match err {
            InvocationError::Failed { program, stderr, .. } => {
                assert_eq!(program, "sh");
                assert_eq!(stderr, "boom");
            }
            other => panic!("Expected InvocationError::Failed, got {other:?}"),
        }
    }
}
