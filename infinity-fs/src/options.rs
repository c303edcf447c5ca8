use crate::catalog::CatalogFilters;
use crate::error::{FsError, Result};
use crate::filter::Filter;
use crate::resource_type::ResourceType;

/// Default number of idle archive handles kept open.
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

/// Options for building an [`InfinityFs`](crate::InfinityFs).
///
/// ```rust
/// use infinity_fs::{FsOptions, ResourceType};
///
/// let options = FsOptions::new()
///     .with_type_filter([ResourceType::DLG])
///     .with_archive_filter("area*")
///     .unwrap()
///     .with_cache_capacity(4)
///     .unwrap();
/// assert_eq!(options.cache_capacity(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct FsOptions {
    filters: CatalogFilters,
    cache_capacity: usize,
}

impl Default for FsOptions {
    fn default() -> Self {
        Self {
            filters: CatalogFilters::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl FsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only catalog resources of these types. Repeated calls add types.
    pub fn with_type_filter<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = ResourceType>,
    {
        self.filters.types.extend(types);
        self
    }

    /// Only catalog resources from archives whose path matches `pattern`.
    ///
    /// Case-insensitive. The `data/` prefix and the `.bif` extension are
    /// ignored unless the pattern contains a slash or a dot respectively.
    /// An empty pattern removes the filter.
    pub fn with_archive_filter(mut self, pattern: &str) -> Result<Self> {
        self.filters.archive = Filter::archive(pattern)?;
        Ok(self)
    }

    /// Only catalog resources whose full name matches `pattern`.
    ///
    /// Case-insensitive. Without a dot in the pattern the extension is
    /// ignored, so `ABELA01` matches `ABELA01.WAV`. An empty pattern
    /// removes the filter.
    pub fn with_name_filter(mut self, pattern: &str) -> Result<Self> {
        self.filters.name = Filter::resource(pattern)?;
        Ok(self)
    }

    /// Number of idle archives kept open after their last file is closed.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(FsError::InvalidCapacity);
        }
        self.cache_capacity = capacity;
        Ok(self)
    }

    pub fn filters(&self) -> &CatalogFilters {
        &self.filters
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }
}
