use anyhow::{Result, anyhow};
use ollama_core::WorkingDir;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRunResult {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

pub trait ShellRunner {
    fn run(&self, cmd: &str, cwd: &Path, timeout: Duration) -> Result<ShellRunResult>;
}

#[derive(Debug, Default)]
pub struct PlatformShellRunner;

impl ShellRunner for PlatformShellRunner {
    fn run(&self, cmd: &str, cwd: &Path, timeout: Duration) -> Result<ShellRunResult> {
        let mut child = spawn_command(cmd, cwd)?;
        // Drain both pipes while waiting so a chatty child cannot block on a full pipe.
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let Some(status) = child.wait_timeout(timeout)? else {
            kill_process_tree(&mut child);
            let status = child.wait()?;
            return Ok(ShellRunResult {
                status: exit_code(status),
                stdout: String::new(),
                stderr: String::new(),
                timed_out: true,
            });
        };

        Ok(ShellRunResult {
            status: exit_code(status),
            stdout: join_reader(stdout),
            stderr: join_reader(stderr),
            timed_out: false,
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = source.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// The child leads its own process group, so background jobs it started go
/// down with it.
#[cfg(unix)]
fn kill_process_tree(child: &mut Child) {
    if let Ok(pid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: signals the group created for this child at spawn time.
        unsafe {
            libc::kill(-pid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
}

#[cfg(not(unix))]
fn kill_process_tree(child: &mut Child) {
    let _ = child.kill();
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.code().or_else(|| status.signal().map(|sig| -sig))
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> Option<i32> {
    status.code()
}

fn spawn_command(cmd: &str, cwd: &Path) -> Result<Child> {
    let cwd = if cwd.exists() {
        std::fs::canonicalize(cwd).unwrap_or_else(|_| cwd.to_path_buf())
    } else {
        cwd.to_path_buf()
    };
    let mut errors = Vec::new();
    for mut command in candidate_commands(cmd) {
        command.current_dir(&cwd);
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.stdin(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let program = command.get_program().to_string_lossy().to_string();
        match command.spawn() {
            Ok(child) => return Ok(child),
            Err(err) => errors.push(format!("{program}: {err}")),
        }
    }
    Err(anyhow!(
        "failed to spawn command '{cmd}' in '{}': {}",
        cwd.display(),
        errors.join(" | ")
    ))
}

#[cfg(target_os = "windows")]
fn candidate_commands(cmd: &str) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut cmd_shell = Command::new("cmd");
    cmd_shell.arg("/C").arg(cmd);
    commands.push(cmd_shell);

    let mut ps_shell = Command::new("powershell");
    ps_shell
        .arg("-NoLogo")
        .arg("-NoProfile")
        .arg("-Command")
        .arg(cmd);
    commands.push(ps_shell);

    commands
}

#[cfg(not(target_os = "windows"))]
fn candidate_commands(cmd: &str) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut sh_shell = Command::new("sh");
    sh_shell.arg("-c").arg(cmd);
    commands.push(sh_shell);

    let mut bash_shell = Command::new("bash");
    bash_shell.arg("-c").arg(cmd);
    commands.push(bash_shell);

    commands
}

/// Runs shell commands in the session's working directory.
pub struct CommandExecutor {
    workdir: WorkingDir,
    runner: Box<dyn ShellRunner>,
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(workdir: WorkingDir, timeout_seconds: u64) -> Self {
        Self::with_runner(workdir, Box::new(PlatformShellRunner), timeout_seconds)
    }

    pub fn with_runner(
        workdir: WorkingDir,
        runner: Box<dyn ShellRunner>,
        timeout_seconds: u64,
    ) -> Self {
        Self {
            workdir,
            runner,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    pub fn run_command(&self, command: &str) -> String {
        match self.runner.run(command, &self.workdir.get(), self.timeout) {
            Ok(result) if result.timed_out => format!(
                "Command timed out after {} seconds",
                self.timeout.as_secs()
            ),
            Ok(result) => render_run_result(&result),
            Err(err) => format!("Error running command: {err}"),
        }
    }
}

fn render_run_result(result: &ShellRunResult) -> String {
    let mut output = String::new();
    if !result.stdout.is_empty() {
        output.push_str(&format!("STDOUT:\n{}\n", result.stdout));
    }
    if !result.stderr.is_empty() {
        output.push_str(&format!("STDERR:\n{}\n", result.stderr));
    }
    let code = result
        .status
        .map_or_else(|| "unknown".to_string(), |code| code.to_string());
    output.push_str(&format!("Return code: {code}"));
    output
}
