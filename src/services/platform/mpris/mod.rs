//! MPRIS D-Bus backend.
//!
//! Exposes the now-playing record as an MPRIS player on the session bus so
//! desktop shells, lock screens and media keys can display and control it.
//! Transport methods called by those clients are routed to the handlers
//! registered through [`RemoteCommandCenter`].

mod interface;
mod metadata;

use std::pin::pin;
use std::sync::PoisonError;

use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use zbus::Connection;

use interface::{PlayerInterface, RootInterface, SharedHandlers};

use super::{
    CommandHandler, CommandSlot, NowPlayingInfo, NowPlayingSurface, PlatformError,
    RemoteCommandCenter,
};
use crate::config::SessionConfig;
use crate::services::common::Property;

/// Prefix of every MPRIS well-known bus name.
const MPRIS_BUS_PREFIX: &str = "org.mpris.MediaPlayer2";

/// Object path MPRIS clients look the player up at.
const MPRIS_OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";

/// Now-playing surface and remote-command center backed by MPRIS.
///
/// Publishing only stores the latest record; a background task pushes it
/// to the bus, so a burst of publishes collapses into the last one.
pub struct MprisSurface {
    connection: Connection,
    state: Property<Option<NowPlayingInfo>>,
    handlers: SharedHandlers,
    updater: JoinHandle<()>,
}

impl MprisSurface {
    /// Claim the MPRIS bus name and serve the player interfaces.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::DbusError` if the session bus is unreachable
    /// or the bus name cannot be claimed.
    #[instrument(skip(config), fields(bus_name = %config.bus_name))]
    pub async fn start(config: &SessionConfig) -> Result<Self, PlatformError> {
        if config.bus_name.trim().is_empty() {
            return Err(PlatformError::InitializationFailed(String::from(
                "MPRIS bus name must not be empty",
            )));
        }

        let handlers = SharedHandlers::default();
        let bus_name = format!("{MPRIS_BUS_PREFIX}.{}", config.bus_name);

        let connection = zbus::connection::Builder::session()?
            .name(bus_name.as_str())?
            .serve_at(
                MPRIS_OBJECT_PATH,
                RootInterface::new(config.identity.clone(), handlers.clone()),
            )?
            .serve_at(MPRIS_OBJECT_PATH, PlayerInterface::new(handlers.clone()))?
            .build()
            .await?;

        info!("MPRIS player registered as {bus_name}");

        let state = Property::new(None);
        let updater = tokio::spawn(Self::forward_updates(connection.clone(), state.watch()));

        Ok(Self {
            connection,
            state,
            handlers,
            updater,
        })
    }

    /// The D-Bus connection owning the bus name.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    async fn forward_updates(
        connection: Connection,
        updates: impl Stream<Item = Option<NowPlayingInfo>> + Send + 'static,
    ) {
        let iface_ref = match connection
            .object_server()
            .interface::<_, PlayerInterface>(MPRIS_OBJECT_PATH)
            .await
        {
            Ok(iface_ref) => iface_ref,
            Err(e) => {
                warn!("MPRIS player interface unavailable: {e}");
                return;
            }
        };

        let mut updates = pin!(updates);
        while let Some(info) = updates.next().await {
            if let Err(e) = interface::apply_update(&iface_ref, info).await {
                warn!("Failed to update MPRIS properties: {e}");
            }
        }
    }
}

impl NowPlayingSurface for MprisSurface {
    fn publish(&self, info: &NowPlayingInfo) {
        self.state.set(Some(info.clone()));
    }

    fn clear(&self) {
        self.state.set(None);
    }
}

impl RemoteCommandCenter for MprisSurface {
    fn register(&self, slot: CommandSlot, handler: CommandHandler) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slot, handler);
    }

    fn unregister_all(&self) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Drop for MprisSurface {
    fn drop(&mut self) {
        self.updater.abort();
    }
}
