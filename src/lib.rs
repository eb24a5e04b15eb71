pub mod announce;
pub mod audience;
pub mod config;
pub mod github;
pub mod host;
pub mod nbt;
pub mod plugin;
pub mod text;
pub mod update;

/// Recording doubles for the host seams.
#[cfg(test)]
pub mod test_utils {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::audience::{Audience, Sound, Title};
    use crate::host::{Player, RepeatingTask, Scheduler, Server, Task, TaskHandle};
    use crate::text::{Component, ComponentFlattener};

    fn plain(component: &Component) -> String {
        ComponentFlattener::basic().plain_text(component)
    }

    /// A player that keeps everything delivered to it as plain text.
    #[derive(Default)]
    pub struct RecordingPlayer {
        name: String,
        permissions: HashSet<String>,
        messages: Mutex<Vec<String>>,
        action_bars: Mutex<Vec<String>>,
        titles: Mutex<Vec<String>>,
        sounds: Mutex<Vec<String>>,
    }

    impl RecordingPlayer {
        pub fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                ..Self::default()
            }
        }

        pub fn granting(mut self, permission: &str) -> Self {
            self.permissions.insert(permission.to_string());
            self
        }

        pub fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }

        pub fn action_bars(&self) -> Vec<String> {
            self.action_bars.lock().unwrap().clone()
        }

        /// Titles as `title | subtitle`.
        pub fn titles(&self) -> Vec<String> {
            self.titles.lock().unwrap().clone()
        }

        pub fn sounds(&self) -> Vec<String> {
            self.sounds.lock().unwrap().clone()
        }
    }

    impl Audience for RecordingPlayer {
        fn send_message(&self, message: &Component) {
            self.messages.lock().unwrap().push(plain(message));
        }

        fn send_action_bar(&self, message: &Component) {
            self.action_bars.lock().unwrap().push(plain(message));
        }

        fn show_title(&self, title: &Title) {
            self.titles
                .lock()
                .unwrap()
                .push(format!("{} | {}", plain(&title.title), plain(&title.subtitle)));
        }

        fn play_sound(&self, sound: &Sound) {
            self.sounds.lock().unwrap().push(sound.name.clone());
        }
    }

    impl Player for RecordingPlayer {
        fn name(&self) -> &str {
            &self.name
        }

        fn has_permission(&self, permission: &str) -> bool {
            self.permissions.contains(permission)
        }
    }

    /// A server whose console and command dispatch are recorded.
    pub struct RecordingServer {
        players: Mutex<Vec<Arc<RecordingPlayer>>>,
        console: Arc<RecordingPlayer>,
        commands: Mutex<Vec<String>>,
    }

    impl RecordingServer {
        pub fn new() -> Self {
            Self {
                players: Mutex::new(Vec::new()),
                console: Arc::new(RecordingPlayer::new("console")),
                commands: Mutex::new(Vec::new()),
            }
        }

        pub fn add(&self, player: RecordingPlayer) -> Arc<RecordingPlayer> {
            let player = Arc::new(player);
            self.players.lock().unwrap().push(player.clone());
            player
        }

        pub fn remove(&self, name: &str) {
            self.players.lock().unwrap().retain(|p| p.name() != name);
        }

        pub fn commands(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }

        pub fn console_messages(&self) -> Vec<String> {
            self.console.messages()
        }
    }

    impl Server for RecordingServer {
        fn online_players(&self) -> Vec<Arc<dyn Player>> {
            self.players
                .lock()
                .unwrap()
                .iter()
                .map(|p| p.clone() as Arc<dyn Player>)
                .collect()
        }

        fn console(&self) -> Arc<dyn Audience> {
            self.console.clone()
        }

        fn dispatch_command_as_console(&self, command: &str) -> bool {
            self.commands.lock().unwrap().push(command.to_string());
            true
        }
    }

    struct Timer {
        handle: TaskHandle,
        interval: u64,
        task: RepeatingTask,
    }

    /// Runs one-shot tasks immediately and holds timers until fired by hand.
    #[derive(Default)]
    pub struct ManualScheduler {
        next_id: AtomicU64,
        timers: Mutex<Vec<Timer>>,
    }

    impl ManualScheduler {
        pub fn new() -> Self {
            Self::default()
        }

        fn handle(&self) -> TaskHandle {
            TaskHandle::new(self.next_id.fetch_add(1, Ordering::SeqCst))
        }

        /// Intervals of the timers that are still active.
        pub fn timer_intervals(&self) -> Vec<u64> {
            self.timers
                .lock()
                .unwrap()
                .iter()
                .filter(|t| !t.handle.is_cancelled())
                .map(|t| t.interval)
                .collect()
        }

        /// Runs every active timer once.
        pub fn fire_timers(&self) {
            for timer in self.timers.lock().unwrap().iter_mut() {
                if !timer.handle.is_cancelled() {
                    (timer.task)();
                }
            }
        }

        fn add_timer(&self, interval: u64, task: RepeatingTask) -> TaskHandle {
            let handle = self.handle();
            self.timers.lock().unwrap().push(Timer {
                handle: handle.clone(),
                interval,
                task,
            });
            handle
        }
    }

    impl Scheduler for ManualScheduler {
        fn run_sync(&self, _delay: u64, task: Task) -> TaskHandle {
            task();
            self.handle()
        }

        fn run_async(&self, _delay: u64, task: Task) -> TaskHandle {
            task();
            self.handle()
        }

        fn sync_timer(&self, _delay: u64, interval: u64, task: RepeatingTask) -> TaskHandle {
            self.add_timer(interval, task)
        }

        fn async_timer(&self, _delay: u64, interval: u64, task: RepeatingTask) -> TaskHandle {
            self.add_timer(interval, task)
        }
    }
}
