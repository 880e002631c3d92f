/// A Helm release to install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRelease {
    pub release_name: String,
    pub chart: String,
    pub namespace: String,
    pub repo: Option<String>,
    /// `--set` overrides, applied in order
    pub values: Vec<(String, String)>,
}

impl ChartRelease {
    pub fn new(
        release_name: impl Into<String>,
        chart: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            release_name: release_name.into(),
            chart: chart.into(),
            namespace: namespace.into(),
            repo: None,
            values: Vec::new(),
        }
    }

    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.push((key.into(), value.into()));
        self
    }
}
