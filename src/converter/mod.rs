//! # Converter Module
//!
//! Separa le responsabilità della conversione in sottomoduli:
//! - `batch_converter`: Orchestratore principale
//! - `task_converter`: Worker per singoli file
//! - `progress_tracker`: Contatori e reporting condivisi tra i worker
//! - `path_resolver`: Mapping source → destination e replica delle directory
//! - `task`: Descrizione di un singolo file da convertire

pub mod batch_converter;
pub mod path_resolver;
pub mod progress_tracker;
pub mod task;
pub mod task_converter;

pub use batch_converter::{BatchConverter, ConversionPlan};
pub use path_resolver::PathResolver;
pub use progress_tracker::ProgressTracker;
pub use task::{ConversionTask, TaskOutcome};
pub use task_converter::TaskConverter;
