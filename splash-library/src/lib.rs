//! Sound library for Splash - settings and sample loading

mod config;
mod loader;

pub use splash_core::fold_key;

pub use config::{ConfigError, KeyBinding, Settings, MAX_VOLUME};
pub use loader::{validate_asset, AudioFormat, LoadError, LoadedSample, SampleLoader};
