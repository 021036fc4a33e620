use serde::{Deserialize, Serialize};
use super::{generate_id, impl_entity, Extra, Field, State};

/// A channel tag (`channel/tag/{id}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tag {
    #[serde(skip)]
    pub id: String,
    #[serde(skip)]
    pub state: State,

    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub enabled: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub index: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub internal: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub private: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub icon: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub titled_icon: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub comment: Field<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl_entity!(Tag, "tag");

impl Tag {
    pub fn new(name: &str) -> Self {
        Self {
            id: generate_id(),
            state: State::New,
            enabled: Field::Set(true),
            index: Field::Set(-1),
            name: Field::Set(name.to_string()),
            internal: Field::Set(false),
            private: Field::Set(false),
            icon: Field::Set(String::new()),
            titled_icon: Field::Set(false),
            comment: Field::Set(String::new()),
            extra: Extra::new(),
        }
    }
}
