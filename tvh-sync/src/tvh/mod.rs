//! Tvheadend configuration records.
//!
//! Each record mirrors one JSON file in the Tvheadend config tree. Fields we
//! know about are typed; everything else Tvheadend writes is kept in `extra`
//! and written back untouched.

pub mod channel;
pub mod field;
pub mod mux;
pub mod network;
pub mod service;
pub mod tag;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

pub use channel::Channel;
pub use field::Field;
pub use mux::Mux;
pub use network::Network;
pub use service::Service;
pub use tag::Tag;

/// JSON keys not modelled by a record, in file order
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Where a record stands relative to the files on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum State {
    /// Created this run, not written yet
    #[default]
    New,
    /// Read from disk, not written yet
    Loaded,
    /// Written to a path that did not exist before
    Created,
    /// Written over an existing file
    Updated,
}

/// A record that lives in its own file named after its id
pub trait Entity: Serialize + DeserializeOwned {
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn state(&self) -> State;
    fn set_state(&mut self, state: State);
}

macro_rules! impl_entity {
    ($ty:ty, $kind:literal) => {
        impl $crate::tvh::Entity for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }

            fn state(&self) -> $crate::tvh::State {
                self.state
            }

            fn set_state(&mut self, state: $crate::tvh::State) {
                self.state = state;
            }
        }
    };
}
pub(crate) use impl_entity;

/// New random id, formatted the way Tvheadend names its files (32 hex digits)
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Current time as Unix seconds, the unit Tvheadend stores timestamps in
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_format() {
        let id = generate_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, generate_id());
    }
}
