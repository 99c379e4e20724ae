use std::sync::Arc;

use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use syncrover_core::{PeerId, RoomId, RoverTuning, SessionRole, Viewport};
use syncrover_session::{
    LocalSessionHub, RoomClient, SessionManager, SessionProvider, TokenIssuer,
};
use syncrover_transport::{LoopbackHub, SignalChannel};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod host;
mod keys;
mod viewer;

use host::{run_host_loop, HostController};
use keys::KeyCommand;
use viewer::run_viewer_loop;

const USAGE: &str = "usage:
  syncrover create                 provision a new room id
  syncrover join <room-id> [--host]
  syncrover demo                   host + in-process viewer over loopback

environment:
  SYNCROVER_API_KEY   credential signing / provisioning key
  SYNCROVER_API_URL   provisioning service base URL (create only)";

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG=debug for per-frame detail
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(false)
        .init();

    info!("SyncRover v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("create") => create_room().await,
        Some("join") => {
            let Some(room) = args.get(1) else { bail!("{USAGE}") };
            let role = if args.iter().any(|a| a == "--host") {
                SessionRole::Host
            } else {
                SessionRole::Viewer
            };
            run_session(RoomId::new(room.clone()), role, false).await
        }
        Some("demo") => run_session(RoomId::new("local-demo"), SessionRole::Host, true).await,
        _ => bail!("{USAGE}"),
    };

    if let Err(e) = &result {
        error!("Fatal error: {e:#}");
    }
    result
}

fn api_key() -> String {
    std::env::var("SYNCROVER_API_KEY").unwrap_or_else(|_| {
        warn!("SYNCROVER_API_KEY not set — using a local development key");
        "dev-local-key".into()
    })
}

// MARK: - create

async fn create_room() -> Result<()> {
    let api_url =
        std::env::var("SYNCROVER_API_URL").context("SYNCROVER_API_URL must be set for create")?;
    let api_key =
        std::env::var("SYNCROVER_API_KEY").context("SYNCROVER_API_KEY must be set for create")?;

    let room = RoomClient::new(api_url, api_key)
        .create_room()
        .await
        .context("room provisioning failed — no room created")?;

    info!("Room created: {room}");
    info!("Host:   syncrover join {room} --host");
    info!("Viewer: syncrover join {room}");
    Ok(())
}

// MARK: - join / demo

/// Join `room` in `role` and run the matching loop until quit or ctrl-c.
///
/// Session provider and data channel are the in-process loopback
/// implementations; a windowed build substitutes the external realtime
/// provider behind the same two traits. `with_demo_viewer` attaches a second
/// peer that renders everything the host broadcasts.
async fn run_session(room: RoomId, role: SessionRole, with_demo_viewer: bool) -> Result<()> {
    let local_peer = PeerId::new(format!("peer-{}", uuid::Uuid::new_v4()));
    let issuer = TokenIssuer::new(api_key());

    // Credential first: if issuance fails the join is never attempted.
    let token = issuer
        .issue(&room, role)
        .context("credential issuance failed")?;

    let session_hub = LocalSessionHub::new();
    let data_hub = LoopbackHub::new();

    let manager = Arc::new(Mutex::new(SessionManager::new(local_peer.clone(), role)));
    manager.lock().begin_connecting();
    info!("Room {room} — joining as {role} ({})", manager.lock().state().label());

    let provider = session_hub.provider(local_peer.clone(), role);
    let events = provider.join_room(&room, &token).await?;
    let channel = Arc::new(data_hub.attach(local_peer.clone()));

    // Fold provider events into the state machine in the background.
    let events_task = tokio::spawn(fold_events(Arc::clone(&manager), events));

    let mut viewer_task = None;
    if with_demo_viewer {
        let viewer_peer = PeerId::new("demo-viewer");
        let viewer_provider = session_hub.provider(viewer_peer.clone(), SessionRole::Viewer);
        let viewer_token = issuer.issue(&room, SessionRole::Viewer)?;
        let mut viewer_events = viewer_provider.join_room(&room, &viewer_token).await?;
        tokio::spawn(async move { while viewer_events.recv().await.is_some() {} });
        let viewer_channel = data_hub.attach(viewer_peer);
        viewer_task = Some(tokio::spawn(run_viewer_loop(viewer_channel.subscribe())));
    }

    let run = async {
        match role {
            SessionRole::Host => {
                let (key_tx, key_rx) = mpsc::channel::<KeyCommand>(64);
                tokio::spawn(read_key_commands(key_tx));
                let controller =
                    HostController::new(channel.clone(), Viewport::FHD, RoverTuning::default());
                run_host_loop(controller, key_rx).await
            }
            SessionRole::Viewer => run_viewer_loop(channel.subscribe()).await,
        }
    };

    tokio::select! {
        result = run => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    // Scoped teardown: loop subscription and key listeners are gone once the
    // role future is dropped; release the session handle and the channel.
    provider.leave_room().await?;
    manager.lock().leave();
    data_hub.detach(&local_peer);
    events_task.abort();
    if let Some(task) = viewer_task {
        task.abort();
    }
    info!("Left room {room} ({})", manager.lock().state().label());
    Ok(())
}

async fn fold_events(
    manager: Arc<Mutex<SessionManager>>,
    mut events: mpsc::Receiver<syncrover_session::ProviderEvent>,
) {
    while let Some(event) = events.recv().await {
        let mut mgr = manager.lock();
        mgr.apply(event);
        if let Some(host) = mgr.host_peer() {
            tracing::debug!("Session {} — host is {host}", mgr.state().label());
        }
    }
}

/// Forward stdin lines as key commands until EOF or `q`.
async fn read_key_commands(tx: mpsc::Sender<KeyCommand>) {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(cmd) = keys::parse_line(&line) {
            let quit = cmd == KeyCommand::Quit;
            if tx.send(cmd).await.is_err() || quit {
                return;
            }
        }
    }
    let _ = tx.send(KeyCommand::Quit).await;
}
