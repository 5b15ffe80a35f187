use std::sync::Arc;

use crate::display::domain::display_surface::DisplaySurface;
use crate::flows::flow_error::FlowError;
use crate::flows::notices;
use crate::server::domain::attendance_service::AttendanceService;

/// Single-shot request for the server to retrain its model.
///
/// No retry, no timeout and no guard against overlapping calls; callers
/// that care disable their trigger while a call is outstanding.
pub struct TrainingTrigger {
    service: Arc<dyn AttendanceService>,
    enabled: bool,
}

impl TrainingTrigger {
    /// Trigger that stays disabled until [`TrainingTrigger::enable`].
    pub fn disabled(service: Arc<dyn AttendanceService>) -> Self {
        Self {
            service,
            enabled: false,
        }
    }

    /// Trigger usable right away, for training outside an enrollment.
    pub fn armed(service: Arc<dyn AttendanceService>) -> Self {
        Self {
            service,
            enabled: true,
        }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sends one training request and reports the outcome on `surface`.
    ///
    /// Server-reported failure and transport failure show the same
    /// notice; only the log tells them apart.
    pub fn train(&self, surface: &mut dyn DisplaySurface) -> Result<(), FlowError> {
        if !self.enabled {
            return Err(FlowError::TrainingDisabled);
        }

        surface.show_status(notices::TRAINING_STARTED);
        match self.service.train_model() {
            Ok(response) if response.success => {
                log::info!("Model training succeeded");
                surface.show_status(notices::TRAINING_SUCCEEDED);
                Ok(())
            }
            Ok(_) => {
                log::error!("Server reported model training failure");
                surface.show_status(notices::TRAINING_FAILED);
                Err(FlowError::TrainingFailure)
            }
            Err(e) => {
                log::error!("Training request failed: {e}");
                surface.show_status(notices::TRAINING_FAILED);
                Err(e.into())
            }
        }
    }
}
