// ABOUTME: Test support utilities.
// ABOUTME: Provides a recording FakeRunner and tracing setup for integration tests.

use std::io;
use std::sync::{Mutex, Once};

use anthony_deploy::runner::{CommandResult, CommandSpec, ExecError, ProcessRunner};
use async_trait::async_trait;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("anthony_deploy=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// What the fake does when a command matches a rule.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Reply {
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    Timeout,
    SpawnFailure,
}

/// A `ProcessRunner` that records every command and answers from rules.
///
/// A rule matches when the space-joined argv contains its pattern. The most
/// recently added matching rule wins. Unmatched commands exit 0 with no
/// output, except `python --version`, which reports 3.11.
pub struct FakeRunner {
    rules: Vec<(String, Reply)>,
    calls: Mutex<Vec<CommandSpec>>,
}

#[allow(dead_code)]
impl FakeRunner {
    pub fn new() -> Self {
        Self {
            rules: vec![(
                "python --version".to_string(),
                Reply::Exit {
                    code: 0,
                    stdout: "Python 3.11.4\n".to_string(),
                    stderr: String::new(),
                },
            )],
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on(mut self, pattern: &str, reply: Reply) -> Self {
        self.rules.push((pattern.to_string(), reply));
        self
    }

    /// Commands matching `pattern` exit with `code`.
    pub fn exit(self, pattern: &str, code: i32) -> Self {
        self.on(
            pattern,
            Reply::Exit {
                code,
                stdout: String::new(),
                stderr: format!("{pattern} failed"),
            },
        )
    }

    /// Commands matching `pattern` succeed and print `stdout`.
    pub fn stdout(self, pattern: &str, stdout: &str) -> Self {
        self.on(
            pattern,
            Reply::Exit {
                code: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        )
    }

    pub fn timeout(self, pattern: &str) -> Self {
        self.on(pattern, Reply::Timeout)
    }

    pub fn missing(self, pattern: &str) -> Self {
        self.on(pattern, Reply::SpawnFailure)
    }

    /// Every recorded command, space-joined.
    pub fn calls(&self) -> Vec<String> {
        self.specs().iter().map(CommandSpec::display).collect()
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, pattern: &str) -> bool {
        self.calls().iter().any(|c| c.contains(pattern))
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn execute(&self, spec: &CommandSpec) -> Result<CommandResult, ExecError> {
        self.calls.lock().unwrap().push(spec.clone());

        let command = spec.display();
        let reply = self
            .rules
            .iter()
            .rev()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            None => Ok(CommandResult::default()),
            Some(Reply::Exit {
                code,
                stdout,
                stderr,
            }) => Ok(CommandResult {
                exit_code: code,
                stdout,
                stderr,
            }),
            Some(Reply::Timeout) => Err(ExecError::Timeout(spec.timeout)),
            Some(Reply::SpawnFailure) => Err(ExecError::Spawn {
                program: spec.argv[0].clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            }),
        }
    }
}
