pub mod build_ops;
pub mod cache_ops;
pub mod config_ops;
pub mod gate_ops;
pub mod translate_ops;
