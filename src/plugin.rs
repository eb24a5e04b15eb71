use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tokio::task::JoinHandle;

use crate::announce::{JoinQuitHandler, MessageBroadcaster};
use crate::config::PluginConfig;
use crate::github::{GetReleases, GitHubRepo};
use crate::host::{
    Player, PermissionRegistry, PluginDescriptor, Scheduler, Server, TaskHandle,
    add_default_permission,
};
use crate::update::{UpdateChecker, UpdateStatus};

const TICKS_PER_SECOND: u64 = 20;

/// Everything the plugin needs from its host.
pub struct Host {
    pub server: Arc<dyn Server>,
    pub scheduler: Arc<dyn Scheduler>,
    pub permissions: Arc<dyn PermissionRegistry>,
    pub github: Arc<dyn GetReleases>,
}

pub struct AnnouncerPlugin {
    descriptor: PluginDescriptor,
    config: PluginConfig,
    host: Host,
    broadcasters: Vec<Arc<MessageBroadcaster>>,
    join_quit: JoinQuitHandler,
    timers: Mutex<Vec<TaskHandle>>,
    update_check: Mutex<Option<JoinHandle<Option<UpdateStatus>>>>,
}

impl AnnouncerPlugin {
    pub fn new(descriptor: PluginDescriptor, config: PluginConfig, host: Host) -> Self {
        let broadcasters = config
            .message_configs
            .iter()
            .map(|(name, message_config)| {
                Arc::new(MessageBroadcaster::new(
                    name.clone(),
                    message_config.clone(),
                    host.server.clone(),
                ))
            })
            .collect();
        let join_quit = JoinQuitHandler::new(config.join_quit.clone(), host.server.clone());

        Self {
            descriptor,
            config,
            host,
            broadcasters,
            join_quit,
            timers: Mutex::new(Vec::new()),
            update_check: Mutex::new(None),
        }
    }

    pub fn broadcasters(&self) -> &[Arc<MessageBroadcaster>] {
        &self.broadcasters
    }

    /// Registers permissions, starts the broadcast timers and kicks off the
    /// update check. The update check needs a tokio runtime.
    pub fn enable(&self) -> Result<()> {
        for problem in self.config.validate() {
            warn!("Configuration problem: {}", problem);
        }

        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        for broadcaster in &self.broadcasters {
            add_default_permission(
                self.host.permissions.as_ref(),
                broadcaster.permission(),
                broadcaster.config().permission_default,
            )
            .with_context(|| format!("Failed to register {}", broadcaster.permission()))?;

            if broadcaster.config().messages.is_empty() {
                debug!("'{}' has no messages, not scheduling it", broadcaster.name());
                continue;
            }

            let interval = broadcaster
                .config()
                .interval_seconds
                .saturating_mul(TICKS_PER_SECOND)
                .max(1);
            let task = broadcaster.clone();
            timers.push(self.host.scheduler.async_timer(
                interval,
                interval,
                Box::new(move || {
                    task.broadcast_next();
                }),
            ));
            debug!(
                "Scheduled '{}' every {} ticks",
                broadcaster.name(),
                interval
            );
        }
        drop(timers);

        if self.config.update_checker {
            self.start_update_check();
        }

        info!(
            "{} v{} enabled with {} message config(s)",
            self.descriptor.name,
            self.descriptor.version,
            self.broadcasters.len()
        );
        Ok(())
    }

    fn start_update_check(&self) {
        let repo: GitHubRepo = match self.config.update_checker_repo.parse() {
            Ok(repo) => repo,
            Err(e) => {
                warn!("Cannot look for updates: {:#}", e);
                return;
            }
        };

        let checker = Arc::new(UpdateChecker::new(
            self.host.github.clone(),
            repo,
            self.descriptor.clone(),
        ));
        *self
            .update_check
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(checker.spawn());
    }

    /// Handle of the update check started by [`enable`](Self::enable), if any.
    pub fn take_update_check(&self) -> Option<JoinHandle<Option<UpdateStatus>>> {
        self.update_check
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn disable(&self) {
        let timers: Vec<TaskHandle> = self
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for timer in &timers {
            timer.cancel();
        }
        if let Some(check) = self.take_update_check() {
            check.abort();
        }
        info!("{} disabled", self.descriptor.name);
    }

    pub fn on_join(&self, player: &dyn Player) -> bool {
        self.join_quit.on_join(player)
    }

    pub fn on_quit(&self, player: &dyn Player) -> bool {
        self.join_quit.on_quit(player)
    }
}
