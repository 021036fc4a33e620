use serde::{Deserialize, Serialize};
use super::{generate_id, impl_entity, Extra, Field, Mux, State};

/// An IPTV network (`input/iptv/networks/{id}/config`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Network {
    #[serde(skip)]
    pub id: String,
    #[serde(skip)]
    pub state: State,
    /// Muxes stored under this network's `muxes` folder, in load order
    #[serde(skip)]
    pub muxes: Vec<Mux>,

    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub networkname: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub nid: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub priority: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub spriority: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub max_streams: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub max_bandwidth: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub max_timeout: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub autodiscovery: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub skipinitscan: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub idlescan: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub sid_chnum: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub ignore_chnum: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub satip_source: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub localtime: Field<bool>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl_entity!(Network, "network");

impl Network {
    pub fn new(name: &str) -> Self {
        Self {
            id: generate_id(),
            state: State::New,
            muxes: Vec::new(),
            networkname: Field::Set(name.to_string()),
            nid: Field::Set(0),
            priority: Field::Set(1),
            spriority: Field::Set(1),
            max_streams: Field::Set(0),
            max_bandwidth: Field::Set(0),
            max_timeout: Field::Set(15),
            autodiscovery: Field::Set(true),
            skipinitscan: Field::Set(true),
            idlescan: Field::Set(false),
            sid_chnum: Field::Set(false),
            ignore_chnum: Field::Set(false),
            satip_source: Field::Set(0),
            localtime: Field::Set(false),
            extra: Extra::new(),
        }
    }

    /// Network names are matched case-insensitively, like Tvheadend's UI does
    pub fn is_named(&self, name: &str) -> bool {
        self.networkname
            .as_deref()
            .is_some_and(|n| n.eq_ignore_ascii_case(name))
    }
}
