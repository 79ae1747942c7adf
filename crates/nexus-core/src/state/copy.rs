use std::time::{Duration, Instant};

/// How long the "Copied" confirmation stays visible
pub const COPY_CONFIRMATION_DURATION: Duration = Duration::from_secs(2);

/// Remembers the most recently copied value until its deadline passes.
///
/// There is one deadline at a time: a new copy replaces both the value and
/// the deadline, so an older confirmation can never clear a newer one.
#[derive(Debug, Default)]
pub struct CopyConfirmation {
    copied: Option<(String, Instant)>,
}

impl CopyConfirmation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy(&mut self, value: &str) {
        self.copy_at(value, Instant::now());
    }

    pub fn copy_at(&mut self, value: &str, now: Instant) {
        self.copied = Some((value.to_string(), now + COPY_CONFIRMATION_DURATION));
    }

    /// The value whose confirmation is still visible
    pub fn current(&self) -> Option<&str> {
        self.current_at(Instant::now())
    }

    pub fn current_at(&self, now: Instant) -> Option<&str> {
        match &self.copied {
            Some((value, deadline)) if now < *deadline => Some(value),
            _ => None,
        }
    }

    pub fn is_confirmed(&self, value: &str) -> bool {
        self.current() == Some(value)
    }

    /// Drop an expired confirmation. Returns true when something was cleared.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> bool {
        if matches!(&self.copied, Some((_, deadline)) if now >= *deadline) {
            self.copied = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_expires() {
        let start = Instant::now();
        let mut copy = CopyConfirmation::new();
        copy.copy_at("nx_1", start);

        assert_eq!(copy.current_at(start + Duration::from_millis(1999)), Some("nx_1"));
        assert_eq!(copy.current_at(start + COPY_CONFIRMATION_DURATION), None);

        assert!(!copy.tick_at(start + Duration::from_secs(1)));
        assert!(copy.tick_at(start + Duration::from_secs(2)));
        assert_eq!(copy.current_at(start), None);
    }

    #[test]
    fn test_second_copy_restarts_timer() {
        let start = Instant::now();
        let mut copy = CopyConfirmation::new();
        copy.copy_at("v1", start);
        copy.copy_at("v2", start + Duration::from_millis(1500));

        // Only the newest value is visible
        assert_eq!(copy.current_at(start + Duration::from_millis(1600)), Some("v2"));

        // v1's deadline passes without clearing v2
        let after_first_deadline = start + Duration::from_millis(2100);
        assert!(!copy.tick_at(after_first_deadline));
        assert_eq!(copy.current_at(after_first_deadline), Some("v2"));

        // Two seconds after the last copy nothing is visible
        let after_last = start + Duration::from_millis(3500);
        assert_eq!(copy.current_at(after_last), None);
        assert!(copy.tick_at(after_last));
    }

    #[test]
    fn test_is_confirmed_uses_wall_clock() {
        let mut copy = CopyConfirmation::new();
        copy.copy("nx_1");
        assert!(copy.is_confirmed("nx_1"));
        assert!(!copy.is_confirmed("nx_2"));
    }
}
