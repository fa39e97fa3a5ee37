//! Sort and count configuration.

use std::{path::PathBuf, sync::Arc};

use cqp_corpus::{DefaultNormalizer, TextNormalizer};

/// Settings of a sort call.
#[derive(Clone)]
pub struct SortOptions {
    cache_ids: bool,
    backend: SortBackend,
    normalizer: Arc<dyn TextNormalizer>,
}

impl SortOptions {
    pub fn new() -> SortOptions {
        SortOptions {
            cache_ids: true,
            backend: SortBackend::InProcess,
            normalizer: Arc::new(DefaultNormalizer),
        }
    }

    /// Enables or disables the per-entry token id cache.
    ///
    /// The cache holds the ids of the first two window positions of every
    /// entry, which is where most comparisons are decided. It trades `2×N`
    /// integers of memory for fewer attribute lookups.
    pub fn cache_ids(mut self, cache_ids: bool) -> Self {
        self.cache_ids = cache_ids;
        self
    }

    /// Selects the sort backend.
    pub fn backend(mut self, backend: SortBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the normalizer used for case and diacritic folding.
    pub fn normalizer(mut self, normalizer: Arc<dyn TextNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn get_cache_ids(&self) -> bool {
        self.cache_ids
    }

    pub fn get_backend(&self) -> &SortBackend {
        &self.backend
    }

    pub fn get_normalizer(&self) -> &Arc<dyn TextNormalizer> {
        &self.normalizer
    }
}

impl Default for SortOptions {
    fn default() -> Self {
        SortOptions::new()
    }
}

impl std::fmt::Debug for SortOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortOptions")
            .field("cache_ids", &self.cache_ids)
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

/// Where the ordering is computed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SortBackend {
    /// Stable comparison sort over the token windows.
    #[default]
    InProcess,
    /// Delegate to an external line sorter.
    External(ExternalSortConfig),
}

/// Configuration of the external line sorter.
///
/// The sorter receives a file with one line per entry and must print the
/// same lines reordered. With `standard_key_args`, POSIX `sort` options
/// selecting the key columns are appended to `extra_args`:
/// `-s -t <TAB> -k2,2 [-k3,3] [-r]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalSortConfig {
    pub program: PathBuf,
    pub extra_args: Vec<String>,
    pub standard_key_args: bool,
    /// Directory for the temporary key file; the system default if `None`.
    pub temp_dir: Option<PathBuf>,
}

impl ExternalSortConfig {
    pub fn new(program: impl Into<PathBuf>) -> ExternalSortConfig {
        ExternalSortConfig {
            program: program.into(),
            extra_args: Vec::new(),
            standard_key_args: true,
            temp_dir: None,
        }
    }

    pub fn extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn standard_key_args(mut self, enabled: bool) -> Self {
        self.standard_key_args = enabled;
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }
}

impl Default for ExternalSortConfig {
    fn default() -> Self {
        ExternalSortConfig::new("sort")
    }
}

/// Settings of a frequency count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountOptions {
    /// Groups smaller than this are not reported.
    pub min_frequency: usize,
    /// Prefix every output line with the display line of the group's first
    /// entry.
    pub show_first_index: bool,
}

impl CountOptions {
    pub fn new() -> CountOptions {
        CountOptions {
            min_frequency: 1,
            show_first_index: false,
        }
    }

    pub fn min_frequency(mut self, min_frequency: usize) -> Self {
        self.min_frequency = min_frequency;
        self
    }

    pub fn show_first_index(mut self, show: bool) -> Self {
        self.show_first_index = show;
        self
    }
}

impl Default for CountOptions {
    fn default() -> Self {
        CountOptions::new()
    }
}
