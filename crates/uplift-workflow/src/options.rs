#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub query: Option<String>,
    pub version: Option<String>,
    pub include_unknown: bool,
    pub include_pinned: bool,
    pub force: bool,
    pub no_upgrade: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub max_parallel_resolutions: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_parallel_resolutions: 1,
        }
    }
}
