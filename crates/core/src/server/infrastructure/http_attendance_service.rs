use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::server::domain::attendance_service::{
    AttendanceService, CaptureRequest, CaptureResponse, RecognitionRequest, RecognitionResponse,
    TrainingResponse, TransportError,
};
use crate::shared::constants::{CAPTURE_ENDPOINT, RECOGNITION_ENDPOINT, TRAINING_ENDPOINT};

/// JSON-over-HTTP client for the attendance server.
///
/// Sampling calls (recognize, capture) are bounded by `request_timeout`
/// so a hung server cannot pile up request threads; training is left
/// unbounded because fitting the model can take minutes.
pub struct HttpAttendanceService {
    base_url: String,
    client: Client,
    request_timeout: Duration,
}

impl HttpAttendanceService {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(None)
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    fn post<B: Serialize>(&self, endpoint: &str, body: Option<&B>) -> RequestBuilder {
        let request = self
            .client
            .post(self.url(endpoint))
            .header(CONTENT_TYPE, "application/json");
        match body {
            Some(body) => request.json(body),
            None => request,
        }
    }

    fn send<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<R, TransportError> {
        let response = request.send().map_err(|e| TransportError::Request {
            endpoint: endpoint.to_string(),
            source: e,
        })?;

        let status = response.status();
        let body = response.text().map_err(|e| TransportError::Request {
            endpoint: endpoint.to_string(),
            source: e,
        })?;

        if !status.is_success() {
            return Err(TransportError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| TransportError::Decode {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }
}

impl AttendanceService for HttpAttendanceService {
    fn recognize(
        &self,
        request: &RecognitionRequest,
    ) -> Result<RecognitionResponse, TransportError> {
        let builder = self
            .post(RECOGNITION_ENDPOINT, Some(request))
            .timeout(self.request_timeout);
        self.send(RECOGNITION_ENDPOINT, builder)
    }

    fn capture_face(&self, request: &CaptureRequest) -> Result<CaptureResponse, TransportError> {
        let builder = self
            .post(CAPTURE_ENDPOINT, Some(request))
            .timeout(self.request_timeout);
        self.send(CAPTURE_ENDPOINT, builder)
    }

    fn train_model(&self) -> Result<TrainingResponse, TransportError> {
        let builder = self.post::<()>(TRAINING_ENDPOINT, None);
        self.send(TRAINING_ENDPOINT, builder)
    }
}
