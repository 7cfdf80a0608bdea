pub(crate) mod cache;
pub(crate) mod notice;
pub(crate) mod orchestrator;
pub(crate) mod sink;
pub(crate) mod surface;
pub(crate) mod view;
