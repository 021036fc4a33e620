use serde::{Deserialize, Serialize};
use super::field::string_list;
use super::{generate_id, impl_entity, Extra, Field, State};

/// A channel (`channel/config/{id}`).
///
/// `services` and `tags` hold ids of other records. They are not checked on
/// load: an id that no longer resolves is simply carried along.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Channel {
    #[serde(skip)]
    pub id: String,
    #[serde(skip)]
    pub state: State,

    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub enabled: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub number: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub icon: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub epgauto: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub dvr_pre_time: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub dvr_pst_time: Field<i64>,
    #[serde(default, deserialize_with = "string_list")]
    pub services: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub bouquet: Field<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl_entity!(Channel, "channel");

impl Channel {
    pub fn new(name: &str) -> Self {
        Self {
            id: generate_id(),
            state: State::New,
            enabled: Field::Set(true),
            name: Field::Set(name.to_string()),
            number: Field::Set(-1),
            icon: Field::Set(String::new()),
            epgauto: Field::Set(true),
            dvr_pre_time: Field::Set(0),
            dvr_pst_time: Field::Set(0),
            services: Vec::new(),
            tags: Vec::new(),
            bouquet: Field::Set(String::new()),
            extra: Extra::new(),
        }
    }

    /// Reference a tag. Returns false if it was already referenced.
    pub fn add_tag(&mut self, tag_id: &str) -> bool {
        add_reference(&mut self.tags, tag_id)
    }

    /// Reference a service. Returns false if it was already referenced.
    pub fn add_service(&mut self, service_id: &str) -> bool {
        add_reference(&mut self.services, service_id)
    }
}

fn add_reference(ids: &mut Vec<String>, id: &str) -> bool {
    if ids.iter().any(|existing| existing == id) {
        return false;
    }
    ids.push(id.to_string());
    true
}
