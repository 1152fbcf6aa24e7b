//! Media session bridge host - speaks JSON lines on stdin/stdout.
//!
//! Each input line is a call `{"id": .., "method": "..", "options": {..}}`
//! answered by `{"id": .., "ok": true}` or `{"id": .., "ok": false, "error": ".."}`.
//! Events are written as `{"listener": "mediaSessionEvent", "payload": {..}}`.
//! End of input closes the session.

use std::{error::Error, path::PathBuf, sync::Arc};

use clap::Parser;
use media_session_bridge::{
    config::Config,
    services::{
        media_session::{MEDIA_SESSION_EVENT, MediaSessionBridge, MediaSessionEvent},
        platform::{
            NoopAudioSession, NotificationLaunch, Platform,
            memory::{MemoryPlatform, QueuedLaunchOptions},
            mpris::MprisSurface,
        },
    },
    tracing_config,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::mpsc,
};
use tracing::{Level, debug, info, span, warn};

#[derive(Parser)]
#[command(name = "media-session-bridge")]
#[command(about = "Bridge a host application's media session to the OS now-playing surface")]
struct Cli {
    /// Configuration file, defaults to the XDG config location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep the now-playing record in memory instead of serving MPRIS
    #[arg(long)]
    headless: bool,

    /// The app was launched from the now-playing notification
    #[arg(long)]
    from_notification: bool,

    /// Page reported with the notification launch
    #[arg(long, requires = "from_notification")]
    target_page: Option<String>,
}

#[derive(Deserialize)]
struct Request {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    options: Value,
}

#[derive(Serialize)]
struct Response {
    id: Value,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Response {
    fn ok(id: Value) -> Self {
        Self {
            id,
            ok: true,
            error: None,
        }
    }

    fn error(id: Value, error: impl ToString) -> Self {
        Self {
            id,
            ok: false,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Serialize)]
struct EventLine<'a> {
    listener: &'static str,
    payload: &'a MediaSessionEvent,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    let _guard = tracing_config::init(config.general.log_level, config.general.log_to_file)?;
    let _span = span!(Level::INFO, "media_session_bridge").entered();
    info!("Starting media session bridge");

    let launch = cli.from_notification.then(|| NotificationLaunch {
        target_page: cli.target_page.clone(),
    });
    let launch_options = Arc::new(QueuedLaunchOptions::new(launch));
    let platform = build_platform(&cli, &config, launch_options.clone()).await?;

    let bridge = MediaSessionBridge::with_artwork_config(platform, &config.session.artwork);

    let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(write_lines(out_rx));

    let event_tx = out_tx.clone();
    let listener = bridge.add_listener(MEDIA_SESSION_EVENT, move |event| {
        let line = EventLine {
            listener: MEDIA_SESSION_EVENT,
            payload: event,
        };
        match serde_json::to_string(&line) {
            Ok(line) => {
                let _ = event_tx.send(line);
            }
            Err(e) => warn!("Failed to encode event: {e}"),
        }
    })?;

    bridge.app_launched();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                None
            }
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&bridge, &launch_options, &line).await;
        match serde_json::to_string(&response) {
            Ok(line) => {
                let _ = out_tx.send(line);
            }
            Err(e) => warn!("Failed to encode response: {e}"),
        }
    }

    bridge.app_closed();
    listener.remove();
    drop(bridge);
    drop(out_tx);

    writer.await??;
    info!("Media session bridge stopped");
    Ok(())
}

async fn build_platform(
    cli: &Cli,
    config: &Config,
    launch_options: Arc<QueuedLaunchOptions>,
) -> media_session_bridge::Result<Platform> {
    if cli.headless {
        info!("Running headless");
        let memory = MemoryPlatform::new();
        return Ok(Platform {
            surface: memory.surface,
            commands: memory.commands,
            audio_session: memory.audio_session,
            launch_options,
        });
    }

    let mpris = Arc::new(MprisSurface::start(&config.session).await?);
    Ok(Platform {
        surface: mpris.clone(),
        commands: mpris,
        audio_session: Arc::new(NoopAudioSession),
        launch_options,
    })
}

async fn handle_line(
    bridge: &MediaSessionBridge,
    launch_options: &QueuedLaunchOptions,
    line: &str,
) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => return Response::error(Value::Null, format!("invalid request: {e}")),
    };
    debug!(method = %request.method, "Request received");

    match request.method.as_str() {
        "appResumed" => {
            let from_notification = request
                .options
                .get("fromNotification")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if from_notification {
                launch_options.push(NotificationLaunch {
                    target_page: request
                        .options
                        .get("targetPage")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                });
            }
            bridge.app_resumed();
            Response::ok(request.id)
        }
        "notificationDismissed" => {
            bridge.notification_dismissed();
            Response::ok(request.id)
        }
        method => match bridge.dispatch(method, &request.options).await {
            Ok(()) => Response::ok(request.id),
            Err(e) => Response::error(request.id, e),
        },
    }
}

async fn write_lines(mut lines: mpsc::UnboundedReceiver<String>) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.recv().await {
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }
    Ok(())
}
