pub(crate) mod atlas;
pub(crate) mod cache;
pub(crate) mod decode;
pub(crate) mod loader;
pub(crate) mod sheet;
pub(crate) mod source;
