use std::sync::Arc;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::models::settings::SiteSettings;
use crate::store::Store;

/// Confirmation mail for a contact-form submission.
pub fn send_contact_confirmation(store: Arc<dyn Store>, to: String, name: String) {
    send_in_background(store, to, move |settings| {
        let signature = signature(settings);
        (
            format!("Message Received - {}", settings.site_name),
            format!(
                "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
                 <h2>Thank you for reaching out!</h2>\
                 <p>Hi {},</p>\
                 <p>Your message has been received and will be answered within 24 hours.</p>\
                 <p>Best regards,<br>{}</p>\
                 </div>",
                name, signature
            ),
        )
    });
}

/// Confirmation mail for a service request.
pub fn send_service_request_confirmation(
    store: Arc<dyn Store>,
    to: String,
    name: String,
    service: String,
) {
    send_in_background(store, to, move |settings| {
        let signature = signature(settings);
        (
            format!("Service Request Received - {}", settings.site_name),
            format!(
                "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
                 <h2>Service Request Received</h2>\
                 <p>Hi {},</p>\
                 <p>Thank you for your interest in <strong>{}</strong> services.</p>\
                 <p>Your requirements will be reviewed and you will receive a detailed proposal within 48 hours.</p>\
                 <p>Best regards,<br>{}</p>\
                 </div>",
                name, service, signature
            ),
        )
    });
}

/// Welcome mail for a new (or re-activated) newsletter subscriber.
pub fn send_newsletter_welcome(store: Arc<dyn Store>, to: String, name: Option<String>) {
    send_in_background(store, to, move |settings| {
        let signature = signature(settings);
        let greeting = name.clone().unwrap_or_else(|| "there".to_string());
        (
            format!("Welcome to the Newsletter - {}", settings.site_name),
            format!(
                "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
                 <h2>Welcome to the Newsletter!</h2>\
                 <p>Hi {},</p>\
                 <p>Thank you for subscribing. You'll receive updates about:</p>\
                 <ul>\
                 <li>Latest blog posts and tutorials</li>\
                 <li>New projects and case studies</li>\
                 <li>Tech insights and tips</li>\
                 </ul>\
                 <p>Best regards,<br>{}</p>\
                 </div>",
                greeting, signature
            ),
        )
    });
}

fn signature(settings: &SiteSettings) -> String {
    if settings.email.from_name.is_empty() {
        settings.site_name.clone()
    } else {
        settings.email.from_name.clone()
    }
}

/// Fire-and-forget: the SMTP round trip happens on its own thread and
/// failures never propagate to the request that triggered the mail.
fn send_in_background<F>(store: Arc<dyn Store>, to: String, build: F)
where
    F: FnOnce(&SiteSettings) -> (String, String) + Send + 'static,
{
    std::thread::spawn(move || {
        let settings = match store.settings_get() {
            Ok(s) => s,
            Err(e) => {
                log::warn!("[email] Could not load settings, skipping mail to {}: {}", to, e);
                return;
            }
        };
        if settings.email.smtp_user.is_empty() || settings.email.smtp_password.is_empty() {
            log::info!("[email] SMTP not configured, skipping mail to {}", to);
            return;
        }
        let (subject, html) = build(&settings);
        match deliver(&settings, &to, &subject, html) {
            Ok(()) => log::info!("[email] Sent \"{}\" to {}", subject, to),
            Err(e) => log::warn!("[email] Failed to send \"{}\" to {}: {}", subject, to, e),
        }
    });
}

fn deliver(settings: &SiteSettings, to: &str, subject: &str, html: String) -> Result<(), String> {
    let email_cfg = &settings.email;
    let from_addr = if email_cfg.from_email.is_empty() {
        email_cfg.smtp_user.clone()
    } else {
        email_cfg.from_email.clone()
    };
    let from = if email_cfg.from_name.is_empty() {
        from_addr
    } else {
        format!("{} <{}>", email_cfg.from_name, from_addr)
    };

    let message = Message::builder()
        .from(from.parse().map_err(|e| format!("bad from address: {}", e))?)
        .to(to.parse().map_err(|e| format!("bad to address: {}", e))?)
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(html)
        .map_err(|e| e.to_string())?;

    let creds = Credentials::new(email_cfg.smtp_user.clone(), email_cfg.smtp_password.clone());
    let mailer = SmtpTransport::starttls_relay(&email_cfg.smtp_host)
        .map_err(|e| e.to_string())?
        .port(email_cfg.smtp_port)
        .credentials(creds)
        .build();

    mailer.send(&message).map_err(|e| e.to_string())?;
    Ok(())
}
