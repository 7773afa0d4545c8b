use std::sync::Arc;

use tera::{Context, Tera};
use tracing::{info, warn};

use crate::domain::ports::EmailService;

/// Renders and dispatches the two event emails. Individual recipient failures
/// are logged and skipped so one bad address never aborts a batch.
pub struct NotificationService {
    email: Arc<dyn EmailService>,
    templates: Arc<Tera>,
    app_base_url: String,
}

pub struct InvitationNotice {
    pub recipient: String,
    pub invite_token: String,
}

pub struct ConfirmationDetails {
    pub event_title: String,
    pub final_date: String,
    pub final_time: Option<String>,
    pub location: Option<String>,
    /// (game name, responsible participant name)
    pub games: Vec<(String, String)>,
}

impl NotificationService {
    pub fn new(email: Arc<dyn EmailService>, templates: Arc<Tera>, app_base_url: String) -> Self {
        Self { email, templates, app_base_url }
    }

    /// Sends one invitation per recipient. Returns how many went out.
    pub async fn send_invitations(
        &self,
        event_title: &str,
        organizer_name: &str,
        proposed_dates: &[String],
        notices: &[InvitationNotice],
    ) -> usize {
        let subject = format!("{} invites you to: {}", organizer_name, event_title);
        let mut sent = 0;

        for notice in notices {
            let mut context = Context::new();
            context.insert("event_title", event_title);
            context.insert("organizer_name", organizer_name);
            context.insert("proposed_dates", proposed_dates);
            context.insert("invite_link", &format!("{}/invite/{}", self.app_base_url, notice.invite_token));

            let body = match self.templates.render("invitation.html", &context) {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to render invitation for {}: {:?}", notice.recipient, e);
                    continue;
                }
            };

            match self.email.send(&notice.recipient, &subject, &body).await {
                Ok(()) => sent += 1,
                Err(e) => warn!("Invitation email to {} failed: {}", notice.recipient, e),
            }
        }

        info!("Sent {}/{} invitation emails for '{}'", sent, notices.len(), event_title);
        sent
    }

    /// Sends the confirmation email to every attending participant.
    pub async fn send_confirmations(&self, details: &ConfirmationDetails, recipients: &[String]) -> usize {
        let subject = format!("Game night confirmed: {}", details.event_title);
        let games: Vec<serde_json::Value> = details
            .games
            .iter()
            .map(|(name, responsible)| serde_json::json!({ "name": name, "responsible": responsible }))
            .collect();

        let mut context = Context::new();
        context.insert("event_title", &details.event_title);
        context.insert("final_date", &details.final_date);
        context.insert("final_time", &details.final_time);
        context.insert("location", &details.location);
        context.insert("games", &games);

        let body = match self.templates.render("confirmation.html", &context) {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to render confirmation email: {:?}", e);
                return 0;
            }
        };

        let mut sent = 0;
        for recipient in recipients {
            match self.email.send(recipient, &subject, &body).await {
                Ok(()) => sent += 1,
                Err(e) => warn!("Confirmation email to {} failed: {}", recipient, e),
            }
        }

        info!("Sent {}/{} confirmation emails for '{}'", sent, recipients.len(), details.event_title);
        sent
    }
}
