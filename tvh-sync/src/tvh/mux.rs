use serde::{Deserialize, Serialize};
use super::{generate_id, impl_entity, Extra, Field, Service, State};

/// An IPTV mux, one stream endpoint (`.../muxes/{id}/config`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mux {
    #[serde(skip)]
    pub id: String,
    #[serde(skip)]
    pub state: State,
    #[serde(skip)]
    pub services: Vec<Service>,

    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub iptv_url: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub iptv_interface: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub iptv_atsc: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub iptv_muxname: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub iptv_sname: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub iptv_respawn: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub enabled: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub scan_result: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub epg: Field<i64>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl_entity!(Mux, "mux");

impl Mux {
    /// A mux always starts out with exactly one service
    pub fn with_service(service: Service) -> Self {
        Self {
            id: generate_id(),
            state: State::New,
            services: vec![service],
            iptv_url: Field::Absent,
            iptv_interface: Field::Absent,
            iptv_atsc: Field::Set(false),
            iptv_muxname: Field::Absent,
            iptv_sname: Field::Absent,
            iptv_respawn: Field::Set(false),
            enabled: Field::Set(true),
            scan_result: Field::Set(1),
            epg: Field::Set(1),
            extra: Extra::new(),
        }
    }

    /// Index of the first service named `name`
    pub fn find_service(&self, name: &str) -> Option<usize> {
        self.services
            .iter()
            .position(|s| s.svcname.as_deref() == Some(name))
    }
}
