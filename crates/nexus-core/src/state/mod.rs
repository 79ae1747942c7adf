//! Short-lived presentation state: copy confirmation, the create-key dialog
//! and the auth form submission. None of it is persisted.

pub mod copy;
pub mod dialog;
pub mod form;

pub use copy::{CopyConfirmation, COPY_CONFIRMATION_DURATION};
pub use dialog::CreateKeyDialog;
pub use form::{AuthForm, AuthMode, AuthSubmission, FormField, FormStatus};
