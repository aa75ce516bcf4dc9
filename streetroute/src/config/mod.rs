//! User configuration stored in `~/.streetroute/config.ini`.
//!
//! ```ini
//! [imagery]
//! api_key = AIza...
//! image_size = 640x640
//!
//! [sampling]
//! interval = 50
//!
//! [export]
//! format = archive
//! quality = 90
//! ```
//!
//! A missing file yields [`ConfigFile::default`]; a present but invalid value
//! fails the load with [`ConfigFileError::InvalidValue`].

mod file;
mod keys;
mod parser;
mod settings;
mod size;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{
    ConfigFile, ExportSettings, ImagerySettings, LoggingSettings, ResolverSettings,
    SamplingSettings, DEFAULT_FIELD_OF_VIEW, DEFAULT_PITCH,
};
pub use size::{format_size, parse_size, SizeParseError};
