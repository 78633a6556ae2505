//! Record validation against a synthesized constraint document
//!
//! Validation never fails on bad data: every violation becomes a
//! [`Diagnostic`]. Only a structurally unusable document is an error.

pub mod compiled;

use rayon::ThreadPool;
use rayon::prelude::*;
use schematic_core::prelude::*;
use tracing::{debug, info};

pub use compiled::{CompiledSchema, LIST_DELIMITER, cell};

/// Batch size at which records are evaluated on the rayon pool
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

/// Options for [`RecordValidator`]
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Whether large batches are evaluated in parallel
    pub parallel: bool,
    /// Minimum batch size for parallel evaluation
    pub parallel_threshold: usize,
    /// Size of a dedicated thread pool; the global pool is used when `None`
    pub thread_count: Option<usize>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            thread_count: None,
        }
    }
}

/// Evaluates records against a [`ConstraintDocument`]
#[derive(Debug, Default)]
pub struct RecordValidator {
    options: ValidationOptions,
    pool: Option<ThreadPool>,
}

impl RecordValidator {
    /// Create a validator with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with the given options
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::ConfigError` if a dedicated thread pool was
    /// requested and cannot be started.
    pub fn with_options(options: ValidationOptions) -> Result<Self> {
        let pool = match options.thread_count {
            Some(threads) if options.parallel => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("schematic-validate-{i}"))
                    .build()
                    .map_err(|e| {
                        SchematicError::config(format!("Failed to start validation pool: {e}"))
                    })?,
            ),
            _ => None,
        };
        Ok(Self { options, pool })
    }

    /// Validate `records` against `schema`
    ///
    /// Diagnostics are ordered by row; within a row they follow property
    /// order, with cross-record duplicates last.
    ///
    /// # Errors
    ///
    /// Returns `SchematicError::MalformedSchema` if `schema` is structurally
    /// unusable.
    pub fn validate(&self, records: &[Record], schema: &ConstraintDocument) -> Result<Vec<Diagnostic>> {
        let compiled = CompiledSchema::compile(schema)?;
        let parallel = self.options.parallel && records.len() >= self.options.parallel_threshold;

        debug!(
            schema = %schema.title,
            records = records.len(),
            parallel,
            "Validating records"
        );

        let mut diagnostics: Vec<Diagnostic> = if parallel {
            let evaluate = || {
                records
                    .par_iter()
                    .enumerate()
                    .flat_map_iter(|(index, record)| compiled.check_record(index, record))
                    .collect()
            };
            match &self.pool {
                Some(pool) => pool.install(evaluate),
                None => evaluate(),
            }
        } else {
            records
                .iter()
                .enumerate()
                .flat_map(|(index, record)| compiled.check_record(index, record))
                .collect()
        };

        if compiled.has_unique_fields() {
            diagnostics.extend(compiled.check_unique(records));
        }
        diagnostics.sort_by_key(|diagnostic| diagnostic.row);

        info!(
            schema = %schema.title,
            records = records.len(),
            diagnostics = diagnostics.len(),
            "Validation complete"
        );

        Ok(diagnostics)
    }
}

/// Validate with default options
///
/// # Errors
///
/// See [`RecordValidator::validate`].
pub fn validate(records: &[Record], schema: &ConstraintDocument) -> Result<Vec<Diagnostic>> {
    RecordValidator::new().validate(records, schema)
}
