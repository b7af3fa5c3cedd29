use emco_api::path::ResourcePath;

/// A modal form: open while editing, submitting while its request is in
/// flight.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FormDialog {
    open: bool,
    submitting: bool,
}

impl FormDialog {
    pub fn opened() -> Self {
        Self {
            open: true,
            submitting: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Returns `false` if a submission is already running.
    pub fn begin_submit(&mut self) -> bool {
        if self.submitting {
            false
        } else {
            self.submitting = true;
            true
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.submitting = false;
    }

    /// Keeps the form open for the user to retry.
    pub fn fail(&mut self) {
        self.submitting = false;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

/// A pending deletion, holding the identity of its target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmDialog {
    target: ResourcePath,
}

impl ConfirmDialog {
    pub fn new(target: ResourcePath) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &ResourcePath {
        &self.target
    }

    pub fn message(&self) -> String {
        match (self.target.kind(), self.target.name()) {
            (Some(kind), Some(name)) => format!("Are you sure you want to delete {kind} {name:?}?"),
            _ => "Are you sure you want to delete this?".into(),
        }
    }
}
