pub(crate) mod compositor;
pub(crate) mod cpu;
pub(crate) mod layout;
pub(crate) mod scene;
pub(crate) mod text;
