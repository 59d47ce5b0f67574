/// Filters shared by every manifest query.
///
/// An empty list imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub application: Vec<String>,
    pub repository: Vec<String>,
    pub platform: Vec<String>,
    pub manifest_tag: Vec<String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn application<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.application = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn repository<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.repository = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn platform<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platform = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn manifest_tag<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manifest_tag = values.into_iter().map(Into::into).collect();
        self
    }
}

/// A question asked about a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Names of applications with at least one image passing the filters
    Application(Filters),
    /// Repositories of the images passing the filters
    Repository(Filters),
    /// Full image references
    Image { filters: Filters, no_platform: bool },
    /// Image tags
    Tag { filters: Filters, no_platform: bool },
    /// Platform identifiers
    Platform(Filters),
}

impl Query {
    pub fn filters(&self) -> &Filters {
        match self {
            Query::Application(filters)
            | Query::Repository(filters)
            | Query::Platform(filters)
            | Query::Image { filters, .. }
            | Query::Tag { filters, .. } => filters,
        }
    }
}
