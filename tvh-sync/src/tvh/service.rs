use serde::{Deserialize, Serialize};
use shared::protocol::SERVICE_TYPE_TV;
use super::{Field, generate_id, impl_entity, unix_now, Extra, State};

/// A service inside a mux (`.../services/{id}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Service {
    #[serde(skip)]
    pub id: String,
    #[serde(skip)]
    pub state: State,

    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub sid: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub svcname: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub dvb_servicetype: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub created: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub last_seen: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub enabled: Field<bool>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl_entity!(Service, "service");

impl Service {
    pub fn new(name: &str) -> Self {
        let now = unix_now();
        Self {
            id: generate_id(),
            state: State::New,
            sid: Field::Set(1),
            svcname: Field::Set(name.to_string()),
            dvb_servicetype: Field::Set(SERVICE_TYPE_TV),
            created: Field::Set(now),
            last_seen: Field::Set(now),
            enabled: Field::Set(true),
            extra: Extra::new(),
        }
    }
}
