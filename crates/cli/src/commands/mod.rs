pub(crate) mod find;
pub(crate) mod import;
pub(crate) mod migrate;
pub(crate) mod serve;
