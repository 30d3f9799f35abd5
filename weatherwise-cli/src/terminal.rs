use inquire::Text;
use weatherwise_core::Notifier;

/// Prints notifications to the terminal.
///
/// In interactive sessions an alert waits for Enter before the dashboard
/// continues, so the message is not scrolled away by the next menu.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    interactive: bool,
}

impl TerminalNotifier {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }
}

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        eprintln!("\n⚠️  {message}");
        if self.interactive {
            // Any outcome, including Esc, dismisses the alert.
            let _ = Text::new("Press Enter to continue").prompt();
        }
    }

    fn info(&self, message: &str) {
        println!("✅ {message}");
    }
}
