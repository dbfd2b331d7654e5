use serde::{Deserialize, Serialize};

use super::domain::{Company, Decision, Employee, Position};
use super::messages::Locale;

/// Outbound mail contract. A single synchronous attempt; retries are the caller's business.
pub trait NotificationDispatcher: Send + Sync {
    fn send(&self, message: MailMessage) -> Result<(), DispatchError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body_html: String,
}

/// Mail dispatch error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
    #[error("mail rejected by provider: {0}")]
    Rejected(String),
}

/// Builds the acceptance and rejection mails sent after a transition.
#[derive(Debug, Clone)]
pub struct DecisionTemplates {
    from: String,
    locale: Locale,
}

impl DecisionTemplates {
    pub fn new(from: impl Into<String>, locale: Locale) -> Self {
        Self {
            from: from.into(),
            locale,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn render(
        &self,
        decision: Decision,
        employee: &Employee,
        position: &Position,
        company: &Company,
    ) -> MailMessage {
        let name = escape_html(&employee.name);
        let role = escape_html(&position.position_name);
        let firm = escape_html(&company.name);

        let (subject, paragraph) = match (self.locale, decision) {
            (Locale::En, Decision::Accepted) => (
                format!("Your application at {} has been accepted", company.name),
                format!(
                    "Congratulations! Your application for <strong>{role}</strong> at \
                     <strong>{firm}</strong> has been accepted. The team will contact you \
                     about next steps."
                ),
            ),
            (Locale::En, Decision::Rejected) => (
                format!("Update on your application at {}", company.name),
                format!(
                    "Thank you for applying for <strong>{role}</strong> at \
                     <strong>{firm}</strong>. After careful review, we will not be moving \
                     forward with your application."
                ),
            ),
            (Locale::Id, Decision::Accepted) => (
                format!("Lamaran Anda di {} diterima", company.name),
                format!(
                    "Selamat! Lamaran Anda untuk posisi <strong>{role}</strong> di \
                     <strong>{firm}</strong> telah diterima. Tim kami akan menghubungi Anda \
                     untuk langkah selanjutnya."
                ),
            ),
            (Locale::Id, Decision::Rejected) => (
                format!("Kabar lamaran Anda di {}", company.name),
                format!(
                    "Terima kasih telah melamar posisi <strong>{role}</strong> di \
                     <strong>{firm}</strong>. Setelah peninjauan, kami belum dapat \
                     melanjutkan lamaran Anda."
                ),
            ),
        };

        let greeting = match self.locale {
            Locale::En => "Hello",
            Locale::Id => "Halo",
        };

        MailMessage {
            from: self.from.clone(),
            to: employee.email.clone(),
            subject,
            body_html: format!("<p>{greeting} {name},</p>\n<p>{paragraph}</p>"),
        }
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
