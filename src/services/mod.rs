pub mod log_dirs;
pub mod tracing_setup;
