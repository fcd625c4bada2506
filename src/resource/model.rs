//! Resource model and crudcrud wire payload

use serde::{Deserialize, Serialize};

/// The `Brianterry::Unicorn::Maker` resource as seen by the host.
///
/// `uid` is assigned by crudcrud and is present only once the record has
/// been created remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceModel {
    #[serde(rename = "UID", default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Color", default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ResourceModel {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            uid: None,
            name: Some(name.into()),
            color: Some(color.into()),
        }
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Non-empty identifier, if any
    pub fn identifier(&self) -> Option<&str> {
        self.uid.as_deref().filter(|s| !s.is_empty())
    }

    /// Look up a property by its schema name
    pub fn property(&self, name: &str) -> Option<&str> {
        let value = match name {
            "UID" => &self.uid,
            "Name" => &self.name,
            "Color" => &self.color,
            _ => return None,
        };
        value.as_deref().filter(|s| !s.is_empty())
    }

    /// Encode as a request body. The identifier is never sent.
    pub fn to_wire(&self) -> Unicorn {
        Unicorn {
            id: String::new(),
            name: self.name.clone().unwrap_or_default(),
            color: self.color.clone().unwrap_or_default(),
        }
    }
}

/// A unicorn record as stored by crudcrud
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unicorn {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

impl From<Unicorn> for ResourceModel {
    fn from(unicorn: Unicorn) -> Self {
        Self {
            uid: non_empty(unicorn.id),
            name: non_empty(unicorn.name),
            color: non_empty(unicorn.color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_payload_omits_empty_fields() {
        let model = ResourceModel {
            uid: Some("abc".into()),
            name: Some("Sparkle".into()),
            color: None,
        };
        let body = serde_json::to_value(model.to_wire()).unwrap();
        assert_eq!(body, json!({"name": "Sparkle"}));
    }

    #[test]
    fn test_decode_server_record() {
        let unicorn: Unicorn =
            serde_json::from_value(json!({"_id": "5f1", "name": "Sparkle", "color": "pink"}))
                .unwrap();
        let model = ResourceModel::from(unicorn);
        assert_eq!(model, ResourceModel::new("Sparkle", "pink").with_uid("5f1"));
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let unicorn: Unicorn =
            serde_json::from_value(json!({"_id": "1", "name": "a", "horn": true})).unwrap();
        assert_eq!(unicorn.color, "");
        assert_eq!(ResourceModel::from(unicorn).color, None);
    }

    #[test]
    fn test_host_field_names() {
        let model = ResourceModel::new("Sparkle", "pink").with_uid("x");
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value, json!({"UID": "x", "Name": "Sparkle", "Color": "pink"}));

        let empty: ResourceModel = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, ResourceModel::default());
    }

    #[test]
    fn test_property_treats_empty_as_absent() {
        let model = ResourceModel {
            uid: Some(String::new()),
            name: Some("n".into()),
            color: Some(String::new()),
        };
        assert_eq!(model.property("Name"), Some("n"));
        assert_eq!(model.property("Color"), None);
        assert_eq!(model.property("Horn"), None);
        assert_eq!(model.identifier(), None);
    }
}
