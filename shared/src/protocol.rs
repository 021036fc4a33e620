/// Folder of the IPTV input relative to the Tvheadend root
pub const IPTV_DIR: [&str; 2] = ["input", "iptv"];

/// Sub-folder names inside the IPTV input tree
pub const NETWORKS_DIR: &str = "networks";
pub const MUXES_DIR: &str = "muxes";
pub const SERVICES_DIR: &str = "services";

/// Name of the per-folder config file (networks, muxes and the IPTV input itself)
pub const CONFIG_FILE: &str = "config";

/// Channel and tag folders relative to the Tvheadend root
pub const CHANNEL_CONFIG_DIR: [&str; 2] = ["channel", "config"];
pub const CHANNEL_TAG_DIR: [&str; 2] = ["channel", "tag"];

/// XMLTV channel folder, created for Tvheadend but never populated here
pub const EPG_CHANNELS_DIR: [&str; 3] = ["epggrab", "xmltv", "channels"];

/// Tag names assigned by the radio flag of a scraped channel
pub const TAG_TV: &str = "TV";
pub const TAG_RADIO: &str = "Radio";

/// Network that receives newly discovered muxes unless configured otherwise
pub const DEFAULT_NETWORK_NAME: &str = "IPTV";

/// `dvb_servicetype` values
pub const SERVICE_TYPE_TV: i64 = 1;
pub const SERVICE_TYPE_RADIO: i64 = 2;
