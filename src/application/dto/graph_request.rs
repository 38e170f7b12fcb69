use crate::graph_query::domain::FilterCriteria;

/// Parameters of one `apply_filters` call
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRequest {
    pub criteria: FilterCriteria,
    /// Adds the public-exposure branch and the synthetic `internet` node
    pub show_internet: bool,
}

impl GraphRequest {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self {
            criteria,
            show_internet: false,
        }
    }

    pub fn with_internet(mut self, show_internet: bool) -> Self {
        self.show_internet = show_internet;
        self
    }
}

impl Default for GraphRequest {
    fn default() -> Self {
        Self::new(FilterCriteria::default())
    }
}
