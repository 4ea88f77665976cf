pub(crate) mod rope;
pub(crate) mod strip;
