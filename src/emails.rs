//! Account notification emails.
//!
//! Delivery is pluggable through [`Mailer`]; the bundled [`LogMailer`] only
//! records what would have been sent. Sending never fails a request.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub text: String,
}

impl Email {
    pub fn welcome(from: &str, to: &str, name: &str) -> Self {
        Self {
            to: to.to_string(),
            from: from.to_string(),
            subject: "Thanks for joining in!".to_string(),
            text: format!(
                "Welcome to the app, {}. Let me know how you get along with the app",
                name
            ),
        }
    }

    pub fn cancellation(from: &str, to: &str, name: &str) -> Self {
        Self {
            to: to.to_string(),
            from: from.to_string(),
            subject: "Sorry to see you go!".to_string(),
            text: format!("Goodbye, {}. I hope to see you back sometimes soon.", name),
        }
    }
}

pub trait Mailer: Send + Sync {
    /// Sender address for outgoing mail.
    fn sender(&self) -> &str;

    /// Hands a message to the transport. Fire-and-forget.
    fn deliver(&self, email: Email);

    fn send_welcome(&self, to: &str, name: &str) {
        self.deliver(Email::welcome(self.sender(), to, name));
    }

    fn send_cancellation(&self, to: &str, name: &str) {
        self.deliver(Email::cancellation(self.sender(), to, name));
    }
}

/// Writes outgoing mail to the log instead of a mail provider.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

impl Mailer for LogMailer {
    fn sender(&self) -> &str {
        &self.from
    }

    fn deliver(&self, email: Email) {
        log::info!(
            "mail to={} from={} subject={:?}",
            email.to,
            email.from,
            email.subject
        );
        log::debug!("mail body: {}", email.text);
    }
}
