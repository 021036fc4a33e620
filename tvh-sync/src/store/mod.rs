pub mod codec;
pub mod hash;
pub mod layout;
pub mod loader;
