pub(crate) mod buffers;
pub(crate) mod path;
