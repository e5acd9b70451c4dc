//! Host-side event loop: feeds bus events into the presence manager.

use std::sync::Arc;
use std::time::Duration;

use scenecast_common::{EventBus, HostEvent};
use scenecast_config::ScenecastConfig;
use scenecast_presence::{PresenceDescriptor, PresenceManager};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// Owns the manager for the lifetime of the host loop.
pub struct Driver {
    manager: PresenceManager,
    /// Keep auto sync off regardless of config reloads.
    pin_auto_sync_off: bool,
    last_reported: Option<PresenceDescriptor>,
}

impl Driver {
    pub fn new(manager: PresenceManager, pin_auto_sync_off: bool) -> Self {
        Self {
            manager,
            pin_auto_sync_off,
            last_reported: None,
        }
    }

    /// Process events until `Shutdown` arrives or the bus closes, then hand
    /// the manager back.
    pub async fn run(
        mut self,
        mut events: broadcast::Receiver<HostEvent>,
        mut reload: Option<watch::Receiver<ScenecastConfig>>,
    ) -> PresenceManager {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(HostEvent::Shutdown) => {
                        info!("shutdown requested");
                        self.manager.shutdown();
                        break;
                    }
                    Ok(event) => {
                        self.manager.handle_event(&event);
                        self.report_change();
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("host event receiver lagged by {n} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("host event bus closed");
                        self.manager.shutdown();
                        break;
                    }
                },
                Some(config) = next_config(&mut reload) => self.apply_config(&config),
            }
        }
        self.manager
    }

    fn apply_config(&mut self, config: &ScenecastConfig) {
        let count = self
            .manager
            .registry()
            .reload_from_config(&config.contexts);
        self.manager
            .set_idle_presence(PresenceDescriptor::idle(config.presence.idle_state.clone()));
        if !self.pin_auto_sync_off {
            self.manager
                .set_auto_context_sync(config.presence.auto_context_sync);
        }
        info!(contexts = count, "context presences reloaded");
    }

    fn report_change(&mut self) {
        let current = self.manager.current_presence();
        if current != self.last_reported.as_ref() {
            if let Some(presence) = current {
                info!(presence = %presence, "presence confirmed");
            }
            self.last_reported = current.cloned();
        }
    }
}

/// Next config from the reloader; pends forever when there is none.
async fn next_config(
    reload: &mut Option<watch::Receiver<ScenecastConfig>>,
) -> Option<ScenecastConfig> {
    let Some(rx) = reload.as_mut() else {
        return std::future::pending().await;
    };
    match rx.changed().await {
        Ok(()) => Some(rx.borrow_and_update().clone()),
        Err(_) => {
            debug!("config reloader stopped");
            *reload = None;
            std::future::pending().await
        }
    }
}

/// Publish `Tick` every `interval` until the process exits.
pub fn spawn_ticker(bus: Arc<EventBus>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            bus.publish(HostEvent::Tick);
        }
    });
}

/// Activate `scenes` one after another, then request shutdown.
pub fn spawn_scene_script(bus: Arc<EventBus>, scenes: Vec<String>, interval: Duration) {
    tokio::spawn(async move {
        for scene in scenes {
            info!(scene = %scene, "activating scene");
            bus.publish(HostEvent::ContextActivated(scene));
            tokio::time::sleep(interval).await;
        }
        bus.publish(HostEvent::Shutdown);
    });
}

/// Request shutdown on Ctrl-C.
pub fn spawn_ctrl_c(bus: Arc<EventBus>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                bus.publish(HostEvent::Shutdown);
            }
            Err(e) => warn!("failed to listen for Ctrl-C: {e}"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenecast_config::ContextPresence;
    use scenecast_presence::{
        ConnectionState, ContextRegistry, InstanceSlot, LoopbackCall, LoopbackChannel,
        ManagerOptions,
    };

    fn manager_with(registry: ContextRegistry) -> (PresenceManager, scenecast_presence::LoopbackControl) {
        let channel = LoopbackChannel::new();
        let control = channel.control();
        let manager = PresenceManager::start_in(
            &InstanceSlot::new(),
            Box::new(channel),
            registry,
            ManagerOptions::default(),
        )
        .unwrap();
        (manager, control)
    }

    #[tokio::test]
    async fn runs_events_until_shutdown() {
        let registry = ContextRegistry::new();
        registry.register("Menu", PresenceDescriptor::idle("In Menu"));
        let (manager, control) = manager_with(registry);

        let bus = EventBus::new(16);
        let rx = bus.subscribe();
        bus.publish(HostEvent::ContextActivated("Menu".into()));
        bus.publish(HostEvent::Tick);
        bus.publish(HostEvent::Shutdown);

        let manager = Driver::new(manager, false).run(rx, None).await;
        assert_eq!(manager.current_presence(), Some(&PresenceDescriptor::idle("In Menu")));
        assert_eq!(manager.state(), ConnectionState::Terminated);
        assert_eq!(control.count(&LoopbackCall::ClearPresence), 1);
    }

    #[tokio::test]
    async fn closed_bus_shuts_down() {
        let (manager, _control) = manager_with(ContextRegistry::new());
        let bus = EventBus::new(4);
        let rx = bus.subscribe();
        drop(bus);

        let manager = Driver::new(manager, false).run(rx, None).await;
        assert_eq!(manager.state(), ConnectionState::Terminated);
    }

    #[test]
    fn reload_swaps_registry_and_flags() {
        let registry = ContextRegistry::new();
        registry.register("Old", PresenceDescriptor::idle("old"));
        let (manager, _control) = manager_with(registry.clone());
        let mut driver = Driver::new(manager, false);

        let mut config = ScenecastConfig::default();
        config.presence.auto_context_sync = false;
        config.presence.idle_state = "Away".into();
        config.contexts.insert(
            "New".into(),
            ContextPresence {
                state: Some("new".into()),
                ..Default::default()
            },
        );
        driver.apply_config(&config);

        assert!(registry.lookup("Old").is_none());
        assert_eq!(registry.lookup("New"), Some(PresenceDescriptor::idle("new")));
        assert!(!driver.manager.auto_context_sync());
        assert_eq!(driver.manager.idle_presence(), &PresenceDescriptor::idle("Away"));
    }

    #[test]
    fn pinned_auto_sync_survives_reload() {
        let (mut manager, _control) = manager_with(ContextRegistry::new());
        manager.set_auto_context_sync(false);
        let mut driver = Driver::new(manager, true);

        driver.apply_config(&ScenecastConfig::default());
        assert!(!driver.manager.auto_context_sync());
    }
}
