//! # flac2alac Library
//!
//! Converts a directory tree of FLAC files into a mirrored tree of ALAC
//! (`.m4a`) files, carrying embedded cover art across.
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione e validazione parametri
//! - `error`: Tipi di errore della pipeline
//! - `file_manager`: Discovery dei file FLAC
//! - `converter`: Path mapping, replica directory e orchestrazione
//! - `artwork`: Estrazione e import della cover, escape di `%`
//! - `cleanup`: Rimozione degli output parziali dopo un errore
//! - `tools` / `tool_resolver`: Invocazione di ffmpeg e AtomicParsley
//! - `progress` / `json_output`: Progress bar, riepilogo ed eventi JSON
//! - `prompt`: Interazione da terminale per il binario
//!
//! ## Utilizzo:
//! ```ignore
//! use flac2alac::{BatchConverter, Config, ExternalTools};
//!
//! let config = Config::default();
//! let tools = ExternalTools::discover(config.tool_timeout())?;
//! let converter = BatchConverter::new(config, Arc::new(tools))?;
//! let summary = converter.run(&source, &dest).await?;
//! ```

pub mod artwork;
pub mod cleanup;
pub mod config;
pub mod converter;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod progress;
pub mod prompt;
pub mod tool_resolver;
pub mod tools;

pub use config::{Config, FailurePolicy};
pub use converter::{BatchConverter, ConversionPlan};
pub use error::ConvertError;
pub use progress::RunSummary;
pub use tools::{ExternalTools, MediaTools};
