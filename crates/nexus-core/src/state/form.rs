/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for email input.
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Username,
    Email,
    Password,
    Submit,
}

/// idle → submitting → idle (signed in) | failed (error shown)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Idle,
    Submitting,
    Failed(String),
}

/// Everything a submission needs, captured when it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSubmission {
    pub mode: AuthMode,
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub focus: FormField,
    pub username: String,
    pub email: String,
    pub password: String,
    status: FormStatus,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            mode: AuthMode::Login,
            focus: FormField::Email,
            username: String::new(),
            email: String::new(),
            password: String::new(),
            status: FormStatus::Idle,
        }
    }
}

fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

fn can_add_char(current_len: usize, max_len: usize, c: char) -> bool {
    current_len < max_len && is_valid_input_char(c)
}

impl AuthForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == FormStatus::Submitting
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            FormStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Switch between login and register. Ignored while submitting.
    pub fn set_mode(&mut self, mode: AuthMode) {
        if self.is_submitting() {
            return;
        }
        self.mode = mode;
        self.status = FormStatus::Idle;
        self.focus = self.fields()[0];
    }

    pub fn toggle_mode(&mut self) {
        let mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.set_mode(mode);
    }

    /// Fields shown for the current mode, in tab order
    pub fn fields(&self) -> &'static [FormField] {
        match self.mode {
            AuthMode::Login => &[FormField::Email, FormField::Password, FormField::Submit],
            AuthMode::Register => &[
                FormField::Username,
                FormField::Email,
                FormField::Password,
                FormField::Submit,
            ],
        }
    }

    pub fn next_field(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + 1) % fields.len()];
    }

    pub fn prev_field(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + fields.len() - 1) % fields.len()];
    }

    pub fn push_char(&mut self, c: char) {
        if self.is_submitting() {
            return;
        }
        let (field, max_len) = match self.focus {
            FormField::Username => (&mut self.username, MAX_USERNAME_LENGTH),
            FormField::Email => (&mut self.email, MAX_EMAIL_LENGTH),
            FormField::Password => (&mut self.password, MAX_PASSWORD_LENGTH),
            FormField::Submit => return,
        };
        if can_add_char(field.chars().count(), max_len, c) {
            field.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if self.is_submitting() {
            return;
        }
        match self.focus {
            FormField::Username => {
                self.username.pop();
            }
            FormField::Email => {
                self.email.pop();
            }
            FormField::Password => {
                self.password.pop();
            }
            FormField::Submit => {}
        }
    }

    /// Start a submission. Returns `None` while one is already in flight
    /// or when required fields are empty (the form shows why).
    pub fn begin_submit(&mut self) -> Option<AuthSubmission> {
        if self.is_submitting() {
            return None;
        }

        let email = self.email.trim();
        let missing_username = self.mode == AuthMode::Register && self.username.trim().is_empty();
        if email.is_empty() || self.password.is_empty() || missing_username {
            let message = match self.mode {
                AuthMode::Login => "Email and password required",
                AuthMode::Register => "Username, email and password required",
            };
            self.status = FormStatus::Failed(message.to_string());
            return None;
        }

        let submission = AuthSubmission {
            mode: self.mode,
            username: self.username.trim().to_string(),
            email: email.to_string(),
            password: self.password.clone(),
        };
        self.status = FormStatus::Submitting;
        Some(submission)
    }

    /// Resolve the in-flight submission
    pub fn finish(&mut self, result: Result<(), String>) {
        match result {
            Ok(()) => {
                self.password.clear();
                self.status = FormStatus::Idle;
            }
            Err(message) => self.status = FormStatus::Failed(message),
        }
    }

    /// Forget everything but the email, e.g. after signing out
    pub fn reset(&mut self) {
        let email = std::mem::take(&mut self.email);
        *self = Self {
            email,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_login() -> AuthForm {
        let mut form = AuthForm::new();
        form.email = "a@b.com".to_string();
        form.password = "pw".to_string();
        form
    }

    #[test]
    fn test_can_add_char() {
        assert!(can_add_char(0, MAX_USERNAME_LENGTH, 'a'));
        assert!(can_add_char(49, MAX_USERNAME_LENGTH, 'z'));
        assert!(!can_add_char(50, MAX_USERNAME_LENGTH, 'a'));
        assert!(can_add_char(127, MAX_PASSWORD_LENGTH, '!'));
        assert!(!can_add_char(128, MAX_PASSWORD_LENGTH, 'a'));
        // Control characters rejected
        assert!(!can_add_char(0, MAX_PASSWORD_LENGTH, '\x00'));
        assert!(!can_add_char(0, MAX_PASSWORD_LENGTH, '\n'));
        assert!(!can_add_char(0, MAX_PASSWORD_LENGTH, '\t'));
    }

    #[test]
    fn test_single_submission_in_flight() {
        let mut form = filled_login();

        let submission = form.begin_submit().unwrap();
        assert_eq!(submission.mode, AuthMode::Login);
        assert_eq!(submission.email, "a@b.com");
        assert!(form.is_submitting());

        assert!(form.begin_submit().is_none());
    }

    #[test]
    fn test_failure_shows_error_and_allows_retry() {
        let mut form = filled_login();
        form.begin_submit();
        form.finish(Err("Invalid credentials".to_string()));

        assert_eq!(form.error(), Some("Invalid credentials"));
        assert!(!form.is_submitting());
        assert!(form.begin_submit().is_some());
    }

    #[test]
    fn test_success_returns_to_idle_and_clears_password() {
        let mut form = filled_login();
        form.begin_submit();
        form.finish(Ok(()));

        assert_eq!(form.status(), &FormStatus::Idle);
        assert!(form.password.is_empty());
        assert_eq!(form.email, "a@b.com");
    }

    #[test]
    fn test_register_requires_username() {
        let mut form = filled_login();
        form.set_mode(AuthMode::Register);

        assert!(form.begin_submit().is_none());
        assert!(form.error().is_some());

        form.username = "a".to_string();
        let submission = form.begin_submit().unwrap();
        assert_eq!(submission.mode, AuthMode::Register);
    }

    #[test]
    fn test_mode_and_input_locked_while_submitting() {
        let mut form = filled_login();
        form.begin_submit();

        form.toggle_mode();
        assert_eq!(form.mode, AuthMode::Login);

        form.focus = FormField::Password;
        form.push_char('x');
        form.pop_char();
        assert_eq!(form.password, "pw");
    }

    #[test]
    fn test_field_cycle_depends_on_mode() {
        let mut form = AuthForm::new();
        assert_eq!(form.focus, FormField::Email);
        form.next_field();
        form.next_field();
        assert_eq!(form.focus, FormField::Submit);
        form.next_field();
        assert_eq!(form.focus, FormField::Email);

        form.set_mode(AuthMode::Register);
        assert_eq!(form.focus, FormField::Username);
        form.prev_field();
        assert_eq!(form.focus, FormField::Submit);
    }

    #[test]
    fn test_reset_keeps_email() {
        let mut form = filled_login();
        form.set_mode(AuthMode::Register);
        form.reset();

        assert_eq!(form.mode, AuthMode::Login);
        assert_eq!(form.email, "a@b.com");
        assert!(form.password.is_empty());
    }
}
