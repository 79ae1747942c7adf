/// Maximum length of a key label typed into the dialog
const MAX_LABEL_LENGTH: usize = 64;

/// The "create API key" dialog.
///
/// Closed → open (user intent) → creating → closed on success, or back to
/// open with an error on failure. Cancel is ignored while creating.
#[derive(Debug, Default)]
pub struct CreateKeyDialog {
    open: bool,
    creating: bool,
    pub label: String,
    pub error: Option<String>,
}

impl CreateKeyDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
        self.error = None;
    }

    pub fn cancel(&mut self) {
        if self.creating {
            return;
        }
        self.open = false;
        self.error = None;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_creating(&self) -> bool {
        self.creating
    }

    pub fn push_char(&mut self, c: char) {
        if !self.creating && !c.is_control() && self.label.chars().count() < MAX_LABEL_LENGTH {
            self.label.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if !self.creating {
            self.label.pop();
        }
    }

    /// Enter the creating state and hand out the label to send.
    /// `None` when the dialog is closed or a create is already in flight;
    /// `Some(None)` when the label is empty and must be omitted.
    pub fn begin_create(&mut self) -> Option<Option<String>> {
        if !self.open || self.creating {
            return None;
        }
        self.creating = true;
        self.error = None;

        Some((!self.label.is_empty()).then(|| self.label.clone()))
    }

    /// Called once the create (and, on success, its refetch) has finished.
    pub fn finish_create(&mut self, result: Result<(), String>) {
        self.creating = false;
        match result {
            Ok(()) => {
                self.open = false;
                self.label.clear();
            }
            Err(message) => self.error = Some(message),
        }
    }
}
