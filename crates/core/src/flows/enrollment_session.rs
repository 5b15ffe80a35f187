use crate::flows::flow_error::FlowError;
use crate::flows::notices;
use crate::server::domain::attendance_service::CaptureResponse;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnrollmentState {
    Idle,
    Capturing,
    Complete,
}

/// The person being enrolled. Immutable once the session starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enrollee {
    id: String,
    name: String,
}

impl Enrollee {
    /// Trims both fields; either being empty is a validation error.
    pub fn parse(id: &str, name: &str) -> Result<Self, FlowError> {
        let (id, name) = (id.trim(), name.trim());
        if id.is_empty() || name.is_empty() {
            return Err(FlowError::Validation(
                notices::MISSING_ENROLLEE_FIELDS.to_string(),
            ));
        }
        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureProgress {
    Capturing { count: u32 },
    /// The first `done` response. Reported once per session.
    Completed { count: u32 },
    /// The session is not capturing.
    Ignored,
}

/// `Idle → Capturing → Complete` for one enrollee.
///
/// The captured count only ever comes from the server; a response
/// reporting fewer samples than already shown leaves the count as is.
#[derive(Debug)]
pub struct EnrollmentSession {
    state: EnrollmentState,
    enrollee: Option<Enrollee>,
    captured: u32,
    target: u32,
}

impl EnrollmentSession {
    pub fn new(target: u32) -> Self {
        Self {
            state: EnrollmentState::Idle,
            enrollee: None,
            captured: 0,
            target,
        }
    }

    pub fn begin(&mut self, enrollee: Enrollee) -> Result<(), FlowError> {
        if self.state != EnrollmentState::Idle {
            return Err(FlowError::SessionAlreadyStarted);
        }
        self.enrollee = Some(enrollee);
        self.state = EnrollmentState::Capturing;
        Ok(())
    }

    pub fn record(&mut self, response: CaptureResponse) -> CaptureProgress {
        if self.state != EnrollmentState::Capturing {
            return CaptureProgress::Ignored;
        }
        if response.count >= self.captured {
            self.captured = response.count;
        } else {
            log::debug!(
                "Server reported {} captures after {}; keeping {}",
                response.count,
                self.captured,
                self.captured
            );
        }

        if response.done {
            self.state = EnrollmentState::Complete;
            CaptureProgress::Completed {
                count: self.captured,
            }
        } else {
            CaptureProgress::Capturing {
                count: self.captured,
            }
        }
    }

    pub fn state(&self) -> EnrollmentState {
        self.state
    }

    pub fn enrollee(&self) -> Option<&Enrollee> {
        self.enrollee.as_ref()
    }

    pub fn captured(&self) -> u32 {
        self.captured
    }

    pub fn progress_message(&self) -> String {
        notices::capture_progress(self.captured, self.target)
    }
}
