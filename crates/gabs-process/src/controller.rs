//! `ProcessController`: the state machine and launch-mode branching from
//! §4.2.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use gabs_config::{GameDescriptor, LaunchMode};
use tokio::process::{Child, Command};

use crate::{artifact, env::BridgeEnv, ProcessError};

#[cfg(unix)]
use crate::procfs;
#[cfg(unix)]
use nix::sys::signal::Signal;

/// `Unconfigured -> Configured -> Running -> Stopped` (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Unconfigured,
    Configured,
    Running,
    Stopped,
}

impl ControllerState {
    fn label(self) -> &'static str {
        match self {
            ControllerState::Unconfigured => "Unconfigured",
            ControllerState::Configured => "Configured",
            ControllerState::Running => "Running",
            ControllerState::Stopped => "Stopped",
        }
    }
}

/// Status label for `games.status` (§4.4 table). Distinct from
/// [`ProcessController::is_running`]: a launcher that is still spinning up
/// counts as `LauncherRunning`, not `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLabel {
    Running,
    Stopped,
    LauncherRunning,
    LauncherTriggered,
}

/// Controls one game's host process across its configured lifetime.
///
/// Launcher-shielded modes are tagged by [`LaunchMode::is_launcher`]; every
/// liveness/stop operation below branches on that tag rather than treating
/// all four modes uniformly (§9).
pub struct ProcessController {
    descriptor: GameDescriptor,
    state: ControllerState,
    child: Option<Child>,
    pid: Option<u32>,
    launched_at: Option<Instant>,
}

impl ProcessController {
    /// `Configure`: validate the descriptor and move to `Configured`.
    pub fn configure(descriptor: GameDescriptor) -> Result<Self, ProcessError> {
        descriptor.validate()?;
        Ok(Self {
            descriptor,
            state: ControllerState::Configured,
            child: None,
            pid: None,
            launched_at: None,
        })
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn descriptor(&self) -> &GameDescriptor {
        &self.descriptor
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn launched_at(&self) -> Option<Instant> {
        self.launched_at
    }

    /// `Start`: spawn the child with the injected bridge environment (§6,
    /// §9). Never touches the parent process's own environment.
    pub async fn start(&mut self, bridge_env: &BridgeEnv) -> Result<(), ProcessError> {
        if self.state != ControllerState::Configured {
            return Err(ProcessError::InvalidState {
                expected: "Configured",
                actual: self.state.label(),
            });
        }

        let mut command = self.build_command();
        command.envs(bridge_env.as_pairs());
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());

        let child = command.spawn().map_err(|source| ProcessError::SpawnError {
            game_id: self.descriptor.id.clone(),
            launch_mode: self.descriptor.launch_mode,
            target: self.descriptor.target.clone(),
            source,
        })?;

        self.pid = child.id();
        self.launched_at = Some(Instant::now());
        self.child = Some(child);
        self.state = ControllerState::Running;
        Ok(())
    }

    fn build_command(&self) -> Command {
        let mut command = match self.descriptor.launch_mode {
            LaunchMode::DirectPath => {
                let mut c = Command::new(&self.descriptor.target);
                c.args(&self.descriptor.args);
                c
            }
            LaunchMode::CustomCommand => {
                let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
                let mut line = self.descriptor.target.clone();
                for arg in &self.descriptor.args {
                    line.push(' ');
                    line.push_str(arg);
                }
                let mut c = Command::new(shell);
                c.arg("-c").arg(line);
                c
            }
            LaunchMode::SteamAppId => {
                Self::url_handler_command(&format!("steam://run/{}", self.descriptor.target))
            }
            LaunchMode::EpicAppId => Self::url_handler_command(&format!(
                "com.epicgames.launcher://apps/{}?action=launch",
                self.descriptor.target
            )),
        };

        if let Some(dir) = &self.descriptor.working_dir {
            command.current_dir(dir);
        }
        command
    }

    #[cfg(unix)]
    fn url_handler_command(url: &str) -> Command {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    }

    #[cfg(not(unix))]
    fn url_handler_command(url: &str) -> Command {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", "", url]);
        c
    }

    /// `IsRunning`: per §4.2, direct modes probe the recorded pid; launcher
    /// modes are untrackable by pid once the launcher exits, falling back
    /// to `stopProcessName` scanning when configured.
    pub fn is_running(&mut self) -> bool {
        if self.state != ControllerState::Running {
            return false;
        }
        if self.descriptor.launch_mode.is_launcher() {
            return match self.descriptor.stop_process_name.as_deref() {
                Some(name) => Self::name_is_alive(name),
                None => false,
            };
        }
        self.reap_if_exited()
    }

    /// The richer label `games.status` needs (§4.4): distinguishes a
    /// launcher still warming up from the tracked game actually running.
    pub fn status_label(&mut self) -> StatusLabel {
        if self.state != ControllerState::Running {
            return StatusLabel::Stopped;
        }

        if self.descriptor.launch_mode.is_launcher() {
            if self.peek_child_alive() {
                return StatusLabel::LauncherRunning;
            }
            return match self.descriptor.stop_process_name.as_deref() {
                Some(name) if Self::name_is_alive(name) => StatusLabel::Running,
                Some(_) => StatusLabel::Stopped,
                None => StatusLabel::LauncherTriggered,
            };
        }

        if self.reap_if_exited() {
            StatusLabel::Running
        } else {
            StatusLabel::Stopped
        }
    }

    fn peek_child_alive(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    fn reap_if_exited(&mut self) -> bool {
        let alive = self.peek_child_alive();
        if !alive {
            self.state = ControllerState::Stopped;
        }
        alive
    }

    #[cfg(unix)]
    fn name_is_alive(name: &str) -> bool {
        procfs::find_pids_by_name(name)
            .map(|pids| !pids.is_empty())
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    fn name_is_alive(_name: &str) -> bool {
        false
    }

    /// `Stop(grace)`: polite signal, wait up to `grace`, forced-kill on
    /// survival. Always attempts artifact cleanup on success (§4.2, §6).
    pub async fn stop(&mut self, grace: Duration, config_root: &Path) -> Result<(), ProcessError> {
        self.stop_inner(Some(grace), config_root).await
    }

    /// `Kill`: forced-kill variant with no polite phase (§4.2).
    pub async fn kill(&mut self, config_root: &Path) -> Result<(), ProcessError> {
        self.stop_inner(None, config_root).await
    }

    async fn stop_inner(&mut self, grace: Option<Duration>, config_root: &Path) -> Result<(), ProcessError> {
        if self.state != ControllerState::Running {
            return Err(ProcessError::InvalidState {
                expected: "Running",
                actual: self.state.label(),
            });
        }

        if self.descriptor.launch_mode.is_launcher() {
            let Some(name) = self.descriptor.stop_process_name.clone() else {
                return Err(ProcessError::LauncherStopUnsupported {
                    game_id: self.descriptor.id.clone(),
                });
            };
            self.signal_by_name(&name, grace).await?;
        } else {
            self.signal_direct(grace).await?;
        }

        self.state = ControllerState::Stopped;
        artifact::remove_artifact(config_root, &self.descriptor.id).await?;
        Ok(())
    }

    #[cfg(unix)]
    async fn signal_direct(&mut self, grace: Option<Duration>) -> Result<(), ProcessError> {
        let pid = self
            .pid
            .ok_or(ProcessError::InvalidState {
                expected: "Running",
                actual: "no recorded pid",
            })?;

        if let Some(grace) = grace {
            procfs::send_signal(pid as i32, Signal::SIGTERM)?;
            let deadline = Instant::now() + grace;
            while Instant::now() < deadline {
                if !self.peek_child_alive() {
                    return Ok(());
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }

        if let Some(child) = self.child.as_mut() {
            let _ = child.start_kill();
            let _ = child.wait().await;
        } else {
            procfs::send_signal(pid as i32, Signal::SIGKILL)?;
        }
        Ok(())
    }

    #[cfg(unix)]
    async fn signal_by_name(&self, name: &str, grace: Option<Duration>) -> Result<(), ProcessError> {
        let pids = procfs::find_pids_by_name(name)?;
        if pids.is_empty() {
            return Ok(());
        }

        if let Some(grace) = grace {
            for pid in &pids {
                let _ = procfs::send_signal(*pid, Signal::SIGTERM);
            }
            let deadline = Instant::now() + grace;
            while Instant::now() < deadline {
                if procfs::find_pids_by_name(name)?.is_empty() {
                    return Ok(());
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }

        for pid in procfs::find_pids_by_name(name)? {
            let _ = procfs::send_signal(pid, Signal::SIGKILL);
        }
        Ok(())
    }

    #[cfg(not(unix))]
    async fn signal_direct(&mut self, _grace: Option<Duration>) -> Result<(), ProcessError> {
        Err(ProcessError::UnsupportedPlatform)
    }

    #[cfg(not(unix))]
    async fn signal_by_name(&self, _name: &str, _grace: Option<Duration>) -> Result<(), ProcessError> {
        Err(ProcessError::UnsupportedPlatform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{generate_token, write_artifact, BridgeArtifact};

    fn sleeper(id: &str, secs: &str) -> GameDescriptor {
        GameDescriptor {
            id: id.to_string(),
            launch_mode: LaunchMode::DirectPath,
            target: "/bin/sleep".to_string(),
            args: vec![secs.to_string()],
            working_dir: None,
            stop_process_name: None,
        }
    }

    #[test]
    fn starts_unconfigured_and_configure_rejects_ill_formed_descriptors() {
        let steam = GameDescriptor {
            id: "rimworld".to_string(),
            launch_mode: LaunchMode::SteamAppId,
            target: "294100".to_string(),
            args: vec![],
            working_dir: None,
            stop_process_name: None,
        };
        assert!(ProcessController::configure(steam).is_err());
    }

    #[tokio::test]
    async fn direct_process_lifecycle_reaches_running_then_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = sleeper("x", "30");
        let mut controller = ProcessController::configure(descriptor).unwrap();
        assert_eq!(controller.state(), ControllerState::Configured);

        let artifact = BridgeArtifact {
            port: 40000,
            token: generate_token(),
            game_id: "x".to_string(),
        };
        write_artifact(dir.path(), &artifact).await.unwrap();
        let bridge_env = BridgeEnv::new("x", artifact.port, artifact.token.clone(), dir.path());

        controller.start(&bridge_env).await.unwrap();
        assert_eq!(controller.state(), ControllerState::Running);
        assert!(controller.is_running());

        controller.stop(Duration::from_secs(2), dir.path()).await.unwrap();
        assert_eq!(controller.state(), ControllerState::Stopped);
        assert!(!dir.path().join("x/bridge.json").exists());
    }

    #[tokio::test]
    async fn kill_skips_the_polite_phase() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = sleeper("y", "30");
        let mut controller = ProcessController::configure(descriptor).unwrap();
        let bridge_env = BridgeEnv::new("y", 40001, generate_token(), &dir.path().join("y/bridge.json"));
        controller.start(&bridge_env).await.unwrap();

        controller.kill(dir.path()).await.unwrap();
        assert_eq!(controller.state(), ControllerState::Stopped);
    }

    #[tokio::test]
    async fn stop_before_start_is_rejected() {
        let descriptor = sleeper("z", "5");
        let mut controller = ProcessController::configure(descriptor).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = controller.stop(Duration::from_secs(1), dir.path()).await.unwrap_err();
        assert!(matches!(err, ProcessError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn launcher_mode_without_stop_process_name_fails_to_stop() {
        let descriptor = GameDescriptor {
            id: "no-tracking".to_string(),
            launch_mode: LaunchMode::SteamAppId,
            target: "1".to_string(),
            args: vec![],
            working_dir: None,
            stop_process_name: Some("placeholder.exe".to_string()),
        };
        let mut controller = ProcessController::configure(descriptor).unwrap();
        controller.descriptor.stop_process_name = None; // force the ill state past validate()
        let bridge_env = BridgeEnv::new("no-tracking", 1, "t", Path::new("/tmp/bridge.json"));
        // can't actually spawn steam://, so only the state machine guard is exercised
        controller.state = ControllerState::Running;
        let dir = tempfile::tempdir().unwrap();
        let err = controller.stop(Duration::from_secs(1), dir.path()).await.unwrap_err();
        assert!(matches!(err, ProcessError::LauncherStopUnsupported { .. }));
        let _ = bridge_env;
    }
}
