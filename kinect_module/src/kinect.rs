// Kinect v1 face tracking through a companion process that publishes the
// solver's animation units over shared memory.

use crate::channel::SharedChannel;
use crate::companion::CompanionProcess;
use crate::config::{KinectConfig, CONFIG_FILE};
use crate::error::Result;
use crate::poll::PollLoop;
use crate::sink::SharedTrackingData;
use anyhow::anyhow;
use api::{LegacyTrackingData, ModuleCapabilities, ModuleLogger, TrackingModule};
use std::path::Path;

pub struct KinectModule {
    config: KinectConfig,
    logger: Option<ModuleLogger>,
    companion: Option<CompanionProcess>,
    poll: Option<PollLoop>,
    shared: SharedTrackingData,
    capabilities: ModuleCapabilities,
}

impl KinectModule {
    pub fn new() -> Self {
        Self::with_config(KinectConfig::load_or_default(Path::new(CONFIG_FILE)))
    }

    pub fn with_config(config: KinectConfig) -> Self {
        let shared = SharedTrackingData::new(config.shape_write_mode);
        Self {
            config,
            logger: None,
            companion: None,
            poll: None,
            shared,
            capabilities: ModuleCapabilities::disabled(),
        }
    }

    pub fn config(&self) -> &KinectConfig {
        &self.config
    }

    pub fn capabilities(&self) -> ModuleCapabilities {
        self.capabilities
    }

    pub fn is_running(&self) -> bool {
        self.poll.as_ref().is_some_and(PollLoop::is_running)
    }

    /// Data the poll thread has published so far.
    pub fn shared_data(&self) -> &SharedTrackingData {
        &self.shared
    }

    fn start(&mut self) -> Result<()> {
        if self.config.launch_companion {
            let companion =
                CompanionProcess::launch(&self.config.companion_path, &self.config.companion_args)?;
            self.companion = Some(companion);
        }

        let mut channel = SharedChannel::new(self.config.channel_name.clone());
        channel.open_existing(&self.config.retry_policy())?;

        let poll = PollLoop::spawn(channel, self.shared.clone(), self.config.poll_interval())?;
        self.poll = Some(poll);
        Ok(())
    }

    /// Write-back and close happen on the poll thread before `stop` returns,
    /// so the companion is always the last thing to go.
    fn teardown(&mut self) {
        if let Some(mut poll) = self.poll.take() {
            poll.stop();
        }
        if let Some(mut companion) = self.companion.take() {
            companion.terminate();
        }
        self.capabilities = ModuleCapabilities::disabled();
    }

    fn log_info(&self, message: &str) {
        match &self.logger {
            Some(logger) => logger.info(message),
            None => log::info!("{}", message),
        }
    }

    fn log_error(&self, message: &str) {
        match &self.logger {
            Some(logger) => logger.error(message),
            None => log::error!("{}", message),
        }
    }
}

impl Default for KinectModule {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingModule for KinectModule {
    fn initialize(&mut self, logger: ModuleLogger) -> ModuleCapabilities {
        logger.info("Initializing Kinect Module");
        self.logger = Some(logger);

        // A second initialize starts from scratch.
        self.teardown();

        match self.start() {
            Ok(()) => {
                self.capabilities = ModuleCapabilities::enabled();
                self.log_info("Kinect Connected!");
            }
            Err(e) => {
                self.log_error(&format!("Failed to initialize Kinect module: {}", e));
                self.teardown();
            }
        }

        self.capabilities
    }

    fn update(&mut self, data: &mut LegacyTrackingData) -> anyhow::Result<()> {
        if self.poll.is_none() {
            return Err(anyhow!("Not connected to Kinect"));
        }
        self.shared.copy_into(data);
        Ok(())
    }

    fn unload(&mut self) {
        let was_running = self.poll.is_some() || self.companion.is_some();
        self.teardown();
        if was_running {
            self.log_info("Kinect Disconnected.");
        }
    }
}

impl Drop for KinectModule {
    fn drop(&mut self) {
        self.teardown();
    }
}
