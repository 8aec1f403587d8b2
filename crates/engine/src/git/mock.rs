// Recording executor for unit tests: queued responses, or a responder that
// answers based on the git arguments.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::worker::{CommandExecutor, CommandResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub envs: Vec<(String, String)>,
}

type Responder = Arc<dyn Fn(&[String]) -> Result<CommandResult, std::io::Error> + Send + Sync>;

#[derive(Clone)]
pub struct MockExecutor {
    calls: Arc<Mutex<Vec<Invocation>>>,
    responses: Arc<Mutex<VecDeque<Result<CommandResult, std::io::Error>>>>,
    responder: Option<Responder>,
}

impl MockExecutor {
    pub fn new(responses: Vec<Result<CommandResult, std::io::Error>>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            responder: None,
        }
    }

    pub fn with_responder(
        responder: impl Fn(&[String]) -> Result<CommandResult, std::io::Error> + Send + Sync + 'static,
    ) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(Mutex::new(VecDeque::new())),
            responder: Some(Arc::new(responder)),
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("mock calls lock poisoned").clone()
    }

    /// Calls whose first argument is `subcommand`.
    pub fn calls_to(&self, subcommand: &str) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|call| call.args.first().map(String::as_str) == Some(subcommand))
            .collect()
    }
}

impl std::fmt::Debug for MockExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockExecutor").field("calls", &self.calls().len()).finish()
    }
}

impl CommandExecutor for MockExecutor {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        envs: &[(String, String)],
    ) -> Result<CommandResult, std::io::Error> {
        self.calls.lock().expect("mock calls lock poisoned").push(Invocation {
            program: program.to_string(),
            args: args.to_vec(),
            cwd: cwd.to_path_buf(),
            envs: envs.to_vec(),
        });

        if let Some(responder) = &self.responder {
            return responder(args);
        }

        self.responses
            .lock()
            .expect("mock responses lock poisoned")
            .pop_front()
            .expect("missing mock response")
    }
}

pub fn ok(stdout: &str) -> CommandResult {
    CommandResult { success: true, code: Some(0), stdout: stdout.to_string(), stderr: String::new() }
}

pub fn failed(code: i32, stderr: &str) -> CommandResult {
    CommandResult { success: false, code: Some(code), stdout: String::new(), stderr: stderr.to_string() }
}
