//! Outbound notification dispatch.

mod email;

pub use email::{EmailMessage, EmailSender, NoopEmailSender, SmtpEmailService};
