/// How the dashboard talks back to the user outside of rendered views.
pub trait Notifier: Send + Sync {
    /// Blocking failure message. Returns once the user has seen it.
    fn alert(&self, message: &str);

    /// Confirmation of a completed action, such as a saved download.
    fn info(&self, message: &str);
}

#[cfg(test)]
pub(crate) mod recording {
    use parking_lot::Mutex;

    use super::Notifier;

    /// Keeps every message for later inspection.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        alerts: Mutex<Vec<String>>,
        infos: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        pub fn alerts(&self) -> Vec<String> {
            self.alerts.lock().clone()
        }

        pub fn infos(&self) -> Vec<String> {
            self.infos.lock().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn alert(&self, message: &str) {
            self.alerts.lock().push(message.to_string());
        }

        fn info(&self, message: &str) {
            self.infos.lock().push(message.to_string());
        }
    }
}
