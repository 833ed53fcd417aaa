mod command;
mod export;

use std::time::Duration;

use canvas::{CanvasState, Inbound, ObjectId, Renderer, Session};
use clap::{Args, Parser, Subcommand};
use frames::{FRAME_MESSAGE, Frame, SYSCALL_CONNECTED, Status};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::command::DrawCommand;

type WsStream = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket failed: {0}")]
    Ws(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("frame decode failed: {0}")]
    Decode(#[from] frames::CodecError),
    #[error("timed out waiting for websocket frame")]
    Timeout,
    #[error("relay returned {status} for health check")]
    Unhealthy { status: u16 },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for CliError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Ws(Box::new(error))
    }
}

#[derive(Parser, Debug)]
#[command(name = "canvas-cli", about = "Terminal participant for the canvas relay")]
struct Cli {
    #[arg(long, env = "CANVAS_BASE_URL", default_value = "http://127.0.0.1:3001")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the relay health endpoint.
    Ping,
    /// Join a room and draw with line commands read from stdin.
    Draw(DrawArgs),
}

#[derive(Args, Debug)]
struct DrawArgs {
    #[arg(long, env = "CANVAS_ROOM", default_value = "lobby")]
    room: String,

    /// Label stamped on outgoing frames. Defaults to a random `cli-` name.
    #[arg(long, env = "CANVAS_PARTICIPANT")]
    participant: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Ping => run_ping(&cli.base_url).await,
        Command::Draw(args) => run_draw(&cli.base_url, args).await,
    }
}

async fn run_ping(base_url: &str) -> Result<(), CliError> {
    let url = format!("{}/healthz", base_url.trim_end_matches('/'));
    let response = reqwest::Client::new().get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Unhealthy { status: status.as_u16() });
    }
    let body: Value = response.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

// =============================================================================
// DRAW
// =============================================================================

/// Prints one line per reconciled peer edit.
struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn object_reconciled(&mut self, id: &ObjectId, canvas: &CanvasState) {
        let state = if canvas.contains(id) { "updated" } else { "removed" };
        println!("~ {id} {state} by peer ({} objects)", canvas.len());
    }
}

enum Step {
    Send(Vec<Frame>),
    Quit,
}

async fn run_draw(base_url: &str, args: DrawArgs) -> Result<(), CliError> {
    let participant = args.participant.unwrap_or_else(|| format!("cli-{}", &Uuid::new_v4().simple().to_string()[..8]));
    let url = ws_url(base_url)?;
    let (mut stream, _) = connect_async(url.as_str()).await?;
    wait_for_session_connected(&mut stream).await?;

    let mut session = Session::new(participant.clone());
    if let Some(join) = session.join(&args.room) {
        send_frame(&mut stream, &join).await?;
    }
    info!(room = %args.room, %participant, "draw: joined");
    eprintln!("joined {} as {participant}; type `help` for commands", args.room);

    let mut renderer = TerminalRenderer;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let cmd = match command::parse(&line) {
                    Ok(Some(cmd)) => cmd,
                    Ok(None) => continue,
                    Err(message) => {
                        eprintln!("error: {message}");
                        continue;
                    }
                };
                match apply(&mut session, cmd) {
                    Step::Send(frames) => {
                        for frame in &frames {
                            send_frame(&mut stream, frame).await?;
                        }
                    }
                    Step::Quit => break,
                }
            }
            msg = stream.next() => {
                let Some(msg) = msg else { return Err(CliError::WsClosed) };
                match msg? {
                    Message::Binary(bytes) => handle_inbound(&mut session, &mut renderer, &bytes),
                    Message::Close(_) => return Err(CliError::WsClosed),
                    _ => {}
                }
            }
        }
    }

    stream.close(None).await?;
    Ok(())
}

/// Run one command against the session and return frames to send.
fn apply(session: &mut Session, cmd: DrawCommand) -> Step {
    let result = match cmd {
        DrawCommand::Shape { kind, initial } => session.add_shape(kind, &initial),
        DrawCommand::Stroke(points) => session.finish_stroke(points),
        DrawCommand::Delete(id) => session.remove(&id),
        DrawCommand::Clear => Ok(session.clear()),
        DrawCommand::Undo => Ok(session.undo().unwrap_or_else(|| {
            println!("nothing to undo");
            Vec::new()
        })),
        DrawCommand::Redo => Ok(session.redo().unwrap_or_else(|| {
            println!("nothing to redo");
            Vec::new()
        })),
        DrawCommand::Color(color) => {
            session.set_color(color);
            Ok(Vec::new())
        }
        DrawCommand::Width(width) => {
            session.set_width(width);
            println!("width {}", session.pen().width());
            Ok(Vec::new())
        }
        DrawCommand::Tool(tool) => {
            session.select_tool(tool);
            Ok(Vec::new())
        }
        DrawCommand::ToggleSelect => {
            let on = session.toggle_selection_mode();
            println!("selection mode {}", if on { "on" } else { "off" });
            Ok(Vec::new())
        }
        DrawCommand::List => {
            for obj in session.objects() {
                println!("{} {}", obj.id(), obj.kind().as_str());
            }
            Ok(Vec::new())
        }
        DrawCommand::Export(path) => {
            match export::export_to_path(session.objects(), &path) {
                Ok(count) => println!("exported {count} objects to {}", path.display()),
                Err(e) => eprintln!("error: export failed: {e}"),
            }
            Ok(Vec::new())
        }
        DrawCommand::Help => {
            println!("{}", command::HELP);
            Ok(Vec::new())
        }
        DrawCommand::Quit => return Step::Quit,
    };

    match result {
        Ok(frames) => Step::Send(frames),
        Err(e) => {
            eprintln!("error: {e}");
            Step::Send(Vec::new())
        }
    }
}

fn handle_inbound(session: &mut Session, renderer: &mut TerminalRenderer, bytes: &[u8]) {
    let frame = match frames::decode_frame(bytes) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "draw: undecodable frame from relay");
            return;
        }
    };
    if frame.status == Status::Error {
        let message = frame.data_str(FRAME_MESSAGE).unwrap_or("unknown relay error");
        eprintln!("relay error for {}: {message}", frame.syscall);
        return;
    }
    match session.receive(&frame, renderer) {
        Inbound::Reconciled(_) => {}
        outcome => debug!(syscall = %frame.syscall, ?outcome, "draw: frame not applied"),
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

fn ws_url(base_url: &str) -> Result<String, CliError> {
    let base = base_url.trim_end_matches('/');
    if let Some(rest) = base.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/api/ws"));
    }
    if let Some(rest) = base.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/api/ws"));
    }
    Err(CliError::InvalidBaseUrl(base_url.to_owned()))
}

async fn send_frame(stream: &mut WsStream, frame: &Frame) -> Result<(), CliError> {
    stream.send(Message::Binary(frames::encode_frame(frame).into())).await?;
    Ok(())
}

async fn wait_for_session_connected(stream: &mut WsStream) -> Result<(), CliError> {
    loop {
        let frame = recv_next(stream, Duration::from_secs(5)).await?;
        if frame.syscall == SYSCALL_CONNECTED {
            debug!(client_id = ?frame.data_str("client_id"), "draw: connected");
            return Ok(());
        }
    }
}

async fn recv_next(stream: &mut WsStream, timeout: Duration) -> Result<Frame, CliError> {
    let fut = async {
        loop {
            let Some(message) = stream.next().await else {
                return Err(CliError::WsClosed);
            };
            match message? {
                Message::Binary(bytes) => return frames::decode_frame(&bytes).map_err(CliError::from),
                Message::Close(_) => return Err(CliError::WsClosed),
                _ => {}
            }
        }
    };

    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| CliError::Timeout)?
}
