use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::utils::value::{lenient_opt_string, lenient_string, string_or_empty};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Contract,
    Payment,
    Update,
    #[serde(other)]
    Other,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageProject {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentUrls {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub contract_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub payment_url: Option<String>,
}

/// One entry of the `GET /api/messages` feed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub project_id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub project: Option<MessageProject>,
    #[serde(default)]
    pub urls: Option<DocumentUrls>,
}

impl Message {
    pub fn project_name(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.name.as_str())
    }
}

/// Body of `POST /api/messages`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub project_id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

/// Messages keyed by project id, each list in feed order.
pub fn group_by_project(messages: &[Message]) -> BTreeMap<&str, Vec<&Message>> {
    let mut grouped: BTreeMap<&str, Vec<&Message>> = BTreeMap::new();
    for message in messages {
        grouped
            .entry(message.project_id.as_str())
            .or_default()
            .push(message);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn feed_entries_decode() {
        let raw = json!([
            {
                "id": 4,
                "project_id": "p-1",
                "type": "contract",
                "content": "Documents uploaded.",
                "created_at": "2024-05-02T10:00:00",
                "project": {"name": "Storefront"},
                "urls": {"contract_url": "https://files/c.pdf", "payment_url": null}
            },
            {
                "id": "u-9",
                "project_id": "p-2",
                "type": "update",
                "content": "Walls painted",
                "project": {"name": "Office"}
            },
            {
                "id": 5,
                "project_id": "p-1",
                "type": "reminder",
                "content": "?"
            }
        ]);
        let messages: Vec<Message> = serde_json::from_value(raw).unwrap();
        assert_eq!(messages[0].kind, MessageKind::Contract);
        assert_eq!(messages[0].id, "4");
        assert_eq!(messages[0].project_name(), Some("Storefront"));
        let urls = messages[0].urls.clone().unwrap();
        assert_eq!(urls.contract_url.as_deref(), Some("https://files/c.pdf"));
        assert_eq!(urls.payment_url, None);
        assert_eq!(messages[1].urls, None);
        assert_eq!(messages[2].kind, MessageKind::Other);

        let grouped = group_by_project(&messages);
        assert_eq!(grouped["p-1"].len(), 2);
        assert_eq!(grouped["p-2"].len(), 1);
    }

    #[test]
    fn new_message_uses_type_field() {
        let body = serde_json::to_value(NewMessage {
            project_id: "p-1".to_string(),
            content: "Payment received".to_string(),
            kind: MessageKind::Payment,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"project_id": "p-1", "content": "Payment received", "type": "payment"})
        );
    }
}
