use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Notification contract
// ---------------------------------------------------------------------------

/// Which payload the render engine expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyMode {
    Frame,
    #[default]
    Percentage,
}

/// Body posted to the render engine: `{"frame": n}` or `{"percentage": p}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NotifyRequest {
    Frame { frame: u64 },
    Percentage { percentage: f64 },
}

impl NotifyRequest {
    /// A frame request; negative frame numbers are not sendable.
    pub fn frame(frame: i64) -> Option<Self> {
        u64::try_from(frame).ok().map(|frame| NotifyRequest::Frame { frame })
    }

    /// A percentage request; only `0..=100` is sendable.
    pub fn percentage(percentage: f64) -> Option<Self> {
        (0.0..=100.0)
            .contains(&percentage)
            .then_some(NotifyRequest::Percentage { percentage })
    }

    /// Build the request for the inspected frame in the configured mode.
    ///
    /// The percentage is the frame number over the frame count, so recordings
    /// whose numbering does not start near zero can fall outside `0..=100`.
    pub fn for_frame(mode: NotifyMode, frame_number: i64, frame_count: usize) -> Option<Self> {
        match mode {
            NotifyMode::Frame => Self::frame(frame_number),
            NotifyMode::Percentage if frame_count > 0 => {
                Self::percentage(frame_number as f64 / frame_count as f64 * 100.0)
            }
            NotifyMode::Percentage => None,
        }
    }
}

/// Structured reply from the render engine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Ack {
    #[serde(default = "Ack::ok_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Any other fields the engine sends back.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Ack {
    fn ok_status() -> String {
        "ok".to_string()
    }

    /// The error shape every transport failure is converted to.
    pub fn error(message: impl Into<String>) -> Self {
        Ack {
            status: "error".to_string(),
            message: Some(message.into()),
            extra: serde_json::Map::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

/// One notification channel to an external render engine.
///
/// Implementations never fail: transport problems come back as
/// [`Ack::error`].
pub trait RenderNotifier {
    fn send(&mut self, request: &NotifyRequest) -> Ack;
}

// ---------------------------------------------------------------------------
// HTTP transport
// ---------------------------------------------------------------------------

/// Posts JSON requests to a render-engine endpoint.
pub struct HttpNotifier {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpNotifier {
    /// `timeout` bounds the whole exchange so a slow engine cannot stall the UI.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        HttpNotifier {
            endpoint: endpoint.into(),
            agent,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post(&self, request: &NotifyRequest) -> Result<Ack, ureq::Error> {
        let mut response = self.agent.post(&self.endpoint).send_json(request)?;
        response.body_mut().read_json::<Ack>()
    }
}

impl RenderNotifier for HttpNotifier {
    fn send(&mut self, request: &NotifyRequest) -> Ack {
        match self.post(request) {
            Ok(ack) => ack,
            Err(e) => Ack::error(e.to_string()),
        }
    }
}
