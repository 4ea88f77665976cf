pub(crate) mod base;
pub(crate) mod cache;
pub(crate) mod region;
