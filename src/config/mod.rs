mod build_config;

pub use build_config::{BuildConfig, CONFIG_FILE_NAME};
