pub(crate) mod escapes;
pub(crate) mod wire_json;
