//! Notification messages for orders and contact requests

use handlebars::Handlebars;
use serde_json::json;

use super::task::DeliveryTask;
use crate::error::NotificationError;
use crate::generation::GeneratedTracks;
use crate::order::OrderBrief;

const ORDER_CONFIRMATION: &str = "order_confirmation";
const TRACKS_READY: &str = "tracks_ready";

const ORDER_CONFIRMATION_HTML: &str = "<h2>Köszönjük a megrendelést!</h2>\
<p>A(z) <strong>{{title}}</strong> című dalod elkészítése elindult. \
Amint kész, e-mailben küldjük a letöltési linkeket.</p>\
<h3>Dalszöveg</h3><pre>{{lyrics}}</pre>";

const TRACKS_READY_HTML: &str = "<h2>Elkészült a dalod!</h2><p>Letöltés:</p>\
<ul>{{#each links}}<li><a href=\"{{this}}\">{{this}}</a></li>{{/each}}</ul>";

/// HTML mail templates for customer-facing messages.
///
/// Values are HTML-escaped by the registry, so customer text and lyrics can
/// be passed through as-is.
pub struct MailTemplates {
    handlebars: Handlebars<'static>,
}

impl MailTemplates {
    pub fn new() -> Result<Self, NotificationError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        for (name, template) in [
            (ORDER_CONFIRMATION, ORDER_CONFIRMATION_HTML),
            (TRACKS_READY, TRACKS_READY_HTML),
        ] {
            handlebars
                .register_template_string(name, template)
                .map_err(|e| NotificationError::Template(e.to_string()))?;
        }
        Ok(Self { handlebars })
    }

    fn render(&self, name: &str, data: &serde_json::Value) -> Result<String, NotificationError> {
        self.handlebars
            .render(name, data)
            .map_err(|e| NotificationError::Render(e.to_string()))
    }

    /// Confirmation sent to the customer after an order is accepted
    pub fn order_confirmation(
        &self,
        order: &OrderBrief,
        lyrics: &str,
    ) -> Result<DeliveryTask, NotificationError> {
        let title = if order.title.is_empty() {
            "egyedi dal"
        } else {
            order.title.as_str()
        };
        let body = self.render(
            ORDER_CONFIRMATION,
            &json!({ "title": title, "lyrics": lyrics }),
        )?;
        Ok(DeliveryTask::html(
            &order.email,
            "EnZenem: megrendelés visszaigazolás",
            body,
        ))
    }

    /// Download links for a synchronously generated order
    pub fn tracks_ready(
        &self,
        order: &OrderBrief,
        tracks: &GeneratedTracks,
    ) -> Result<DeliveryTask, NotificationError> {
        let links: Vec<&str> = [&tracks.link1, &tracks.link2]
            .into_iter()
            .filter(|l| !l.is_empty())
            .map(String::as_str)
            .collect();
        let body = self.render(TRACKS_READY, &json!({ "links": links }))?;
        Ok(DeliveryTask::html(
            &order.email,
            "EnZenem: elkészült a dalod",
            body,
        ))
    }
}

impl std::fmt::Debug for MailTemplates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailTemplates").finish_non_exhaustive()
    }
}

/// Staff notice about a new order
pub fn staff_order_notice(
    notify_to: &str,
    order: &OrderBrief,
    task_id: Option<&str>,
) -> DeliveryTask {
    let body = format!(
        "Új megrendelés\n\nE-mail: {}\nCím: {}\nStílus: {}\nÉnek: {}\nNyelv: {}\nFormátum: {}\nFeladat: {}\n\nLeírás:\n{}",
        order.email,
        order.title,
        order.styles,
        order.vocal,
        order.language,
        order.format,
        task_id.unwrap_or("-"),
        order.brief
    );
    let task = DeliveryTask::text(notify_to, format!("Új megrendelés: {}", order.email), body);
    if order.email.is_empty() {
        task
    } else {
        task.with_reply_to(&order.email)
    }
}

/// Staff notice for a contact form message; replies go to the sender
pub fn contact_notice(notify_to: &str, name: &str, email: &str, message: &str) -> DeliveryTask {
    let body = format!("Név: {}\nE-mail: {}\n\n{}", name, email, message);
    DeliveryTask::text(notify_to, format!("Kapcsolatfelvétel: {}", email), body).with_reply_to(email)
}
