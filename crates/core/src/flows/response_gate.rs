/// Decides whether a server response may still change what the operator
/// sees.
///
/// Closed gates reject everything, so responses that land after a flow
/// stopped are dropped. While open, only a sequence newer than the last
/// applied one passes, so a slow response for an old frame can never
/// overwrite a newer result.
#[derive(Debug, Default)]
pub struct ResponseGate {
    active: bool,
    last_applied: Option<u64>,
}

impl ResponseGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.active = true;
        self.last_applied = None;
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Admits `sequence` and records it as applied, or rejects it.
    pub fn admit(&mut self, sequence: u64) -> bool {
        if !self.active {
            return false;
        }
        if self.last_applied.is_some_and(|last| sequence <= last) {
            return false;
        }
        self.last_applied = Some(sequence);
        true
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }
}
