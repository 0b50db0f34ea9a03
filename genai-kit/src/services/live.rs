//! Bidirectional Live API sessions over WebSocket.
//!
//! A session is opened with a `setup` message naming the model and the
//! response modality. Text turns go out as `clientContent`, microphone audio
//! as `realtimeInput` chunks of 16 kHz PCM. Server frames are read back one
//! at a time with [`LiveSession::next_message`].
//!
//! ```ignore
//! let live = LiveService::new(api_key);
//! let session = live.connect_session(None, LiveConnectOptions::default()).await?;
//! live.send_text(&session, "Hello there").await?;
//! while let Some(message) = session.next_message().await {
//!     if let LiveMessage::Content { turn_complete: true, .. } = message? {
//!         break;
//!     }
//! }
//! live.close_session(&session).await?;
//! ```

use super::logged;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use genai_kit_core::errors::require_params;
use genai_kit_core::{Content, FunctionCall, GenAiError, Part, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

/// Model used when none is given.
pub const DEFAULT_LIVE_MODEL: &str = "gemini-2.0-flash-live-001";

/// MIME type of audio accepted by [`LiveSession::send_audio`].
pub const LIVE_AUDIO_MIME: &str = "audio/pcm;rate=16000";

/// Bidirectional generation endpoint.
pub const DEFAULT_LIVE_ENDPOINT: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What the model answers with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseModality {
    /// Text parts.
    #[default]
    Text,
    /// Inline PCM audio parts.
    Audio,
}

/// Session setup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveConnectOptions {
    /// Response modality.
    pub response_modality: ResponseModality,
    /// System instruction.
    pub system_instruction: Option<String>,
    /// Extra `generationConfig` fields, merged over the modality.
    pub generation_config: Option<Map<String, JsonValue>>,
}

impl LiveConnectOptions {
    /// Answer with audio.
    #[must_use]
    pub fn audio() -> Self {
        Self {
            response_modality: ResponseModality::Audio,
            ..Default::default()
        }
    }

    /// Set the system instruction.
    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Merge extra `generationConfig` fields.
    #[must_use]
    pub fn with_generation_config(mut self, config: Map<String, JsonValue>) -> Self {
        self.generation_config = Some(config);
        self
    }
}

/// One server frame.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveMessage {
    /// The server accepted the setup message.
    SetupComplete,
    /// Model output.
    Content {
        /// Parts of the model turn so far.
        parts: Vec<Part>,
        /// The model finished its turn.
        turn_complete: bool,
        /// The model was interrupted by new input.
        interrupted: bool,
    },
    /// The model wants functions called.
    ToolCall(Vec<FunctionCall>),
    /// Any other frame, kept as raw JSON.
    Other(JsonValue),
}

impl LiveMessage {
    /// Text of a [`LiveMessage::Content`] frame, empty otherwise.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Content { parts, .. } => parts.iter().filter_map(Part::as_text).collect(),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerFrame {
    #[serde(default)]
    setup_complete: Option<JsonValue>,
    #[serde(default)]
    server_content: Option<ServerContent>,
    #[serde(default)]
    tool_call: Option<ToolCallFrame>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerContent {
    #[serde(default)]
    model_turn: Option<Content>,
    #[serde(default)]
    turn_complete: bool,
    #[serde(default)]
    interrupted: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolCallFrame {
    #[serde(default)]
    function_calls: Vec<FunctionCall>,
}

fn parse_frame(raw: &str) -> Result<LiveMessage> {
    let value: JsonValue = serde_json::from_str(raw)
        .map_err(|e| GenAiError::api_with_source("Live frame is not JSON", e))?;
    let frame: ServerFrame = serde_json::from_value(value.clone())
        .map_err(|e| GenAiError::api_with_source("Unexpected live frame", e))?;

    if frame.setup_complete.is_some() {
        return Ok(LiveMessage::SetupComplete);
    }
    if let Some(content) = frame.server_content {
        return Ok(LiveMessage::Content {
            parts: content.model_turn.map(|t| t.parts).unwrap_or_default(),
            turn_complete: content.turn_complete,
            interrupted: content.interrupted,
        });
    }
    if let Some(call) = frame.tool_call {
        return Ok(LiveMessage::ToolCall(call.function_calls));
    }
    Ok(LiveMessage::Other(value))
}

fn setup_message(model: &str, options: &LiveConnectOptions) -> JsonValue {
    let model = if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    };

    let mut generation_config = Map::new();
    generation_config.insert(
        "responseModalities".into(),
        json!([options.response_modality]),
    );
    if let Some(extra) = &options.generation_config {
        generation_config.extend(extra.clone());
    }

    let mut setup = json!({
        "model": model,
        "generationConfig": generation_config,
    });
    if let Some(instruction) = options
        .system_instruction
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        setup["systemInstruction"] = json!(Content::instruction(instruction));
    }
    json!({ "setup": setup })
}

/// An open Live API connection.
pub struct LiveSession {
    model: String,
    connected: AtomicBool,
    sender: Mutex<SplitSink<WsStream, WsMessage>>,
    receiver: Mutex<SplitStream<WsStream>>,
}

impl LiveSession {
    async fn open(url: &Url, model: &str, options: &LiveConnectOptions) -> Result<Self> {
        let (stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| GenAiError::api_with_source("Failed to open live session", e))?;
        let (sink, source) = stream.split();

        let session = Self {
            model: model.to_string(),
            connected: AtomicBool::new(true),
            sender: Mutex::new(sink),
            receiver: Mutex::new(source),
        };
        info!(model, "Live session opened");
        session.send_json(&setup_message(model, options)).await?;
        Ok(session)
    }

    /// Model the session was opened for.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether the connection is still open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Send one complete user text turn.
    pub async fn send_text(&self, text: &str) -> Result<()> {
        require_params(&[("text", text)])?;
        self.send_json(&json!({
            "clientContent": {
                "turns": [Content::user(text)],
                "turnComplete": true,
            }
        }))
        .await
    }

    /// Stream a chunk of base64 16-bit mono PCM at 16 kHz.
    pub async fn send_audio(&self, base64_audio: &str) -> Result<()> {
        require_params(&[("audio", base64_audio)])?;
        self.send_json(&json!({
            "realtimeInput": {
                "audio": {
                    "data": base64_audio,
                    "mimeType": LIVE_AUDIO_MIME,
                }
            }
        }))
        .await
    }

    /// Next server frame, or `None` once the connection is closed.
    ///
    /// Ping and pong frames are skipped.
    pub async fn next_message(&self) -> Option<Result<LiveMessage>> {
        let mut receiver = self.receiver.lock().await;
        loop {
            let raw = match receiver.next().await {
                Some(Ok(WsMessage::Text(text))) => text,
                Some(Ok(WsMessage::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(e) => {
                        return Some(Err(GenAiError::api_with_source(
                            "Live frame is not UTF-8",
                            e,
                        )))
                    }
                },
                Some(Ok(WsMessage::Close(frame))) => {
                    debug!(?frame, "Live session closed by server");
                    self.connected.store(false, Ordering::SeqCst);
                    return None;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    self.connected.store(false, Ordering::SeqCst);
                    return Some(Err(GenAiError::api_with_source("Live receive failed", e)));
                }
                None => {
                    self.connected.store(false, Ordering::SeqCst);
                    return None;
                }
            };
            return Some(parse_frame(&raw));
        }
    }

    /// Send a close frame. Closing twice is a no-op.
    pub async fn close(&self) -> Result<()> {
        if !self.connected.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.sender
            .lock()
            .await
            .send(WsMessage::Close(None))
            .await
            .map_err(|e| GenAiError::api_with_source("Failed to close live session", e))?;
        info!(model = %self.model, "Live session closed");
        Ok(())
    }

    async fn send_json(&self, value: &JsonValue) -> Result<()> {
        if !self.is_connected() {
            return Err(GenAiError::api("Live session is closed"));
        }
        let text = serde_json::to_string(value)
            .map_err(|e| GenAiError::api_with_source("Failed to encode live message", e))?;
        self.sender
            .lock()
            .await
            .send(WsMessage::Text(text))
            .await
            .map_err(|e| GenAiError::api_with_source("Live send failed", e))
    }
}

impl std::fmt::Debug for LiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSession")
            .field("model", &self.model)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Opens and drives Live API sessions.
#[derive(Clone)]
pub struct LiveService {
    api_key: String,
    endpoint: String,
}

impl LiveService {
    /// Create a service for `api_key` against the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_LIVE_ENDPOINT.to_string(),
        }
    }

    /// Point at another WebSocket endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Open a session for `model`, or [`DEFAULT_LIVE_MODEL`].
    ///
    /// Returns once the setup message is sent; the server acknowledges it
    /// with a [`LiveMessage::SetupComplete`] frame.
    pub async fn connect_session(
        &self,
        model: Option<&str>,
        options: LiveConnectOptions,
    ) -> Result<LiveSession> {
        let result: Result<LiveSession> = async {
            let model = model.unwrap_or(DEFAULT_LIVE_MODEL);
            require_params(&[("model", model), ("api_key", self.api_key.as_str())])?;
            let url = self.url()?;
            LiveSession::open(&url, model, &options).await
        }
        .await;
        logged("live.connect_session", result)
    }

    /// Send a text turn on `session`.
    pub async fn send_text(&self, session: &LiveSession, text: &str) -> Result<()> {
        logged("live.send_text", session.send_text(text).await)
    }

    /// Send base64 PCM audio on `session`.
    pub async fn send_audio(&self, session: &LiveSession, base64_audio: &str) -> Result<()> {
        logged("live.send_audio", session.send_audio(base64_audio).await)
    }

    /// Close `session`.
    pub async fn close_session(&self, session: &LiveSession) -> Result<()> {
        logged("live.close_session", session.close().await)
    }

    fn url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| GenAiError::api_with_source("Invalid live endpoint", e))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            warn!(endpoint = %self.endpoint, "Live endpoint is not a WebSocket URL");
        }
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

impl std::fmt::Debug for LiveService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveService")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
