use std::sync::Arc;

use anyhow::anyhow;
use uplift_core::Package;

use crate::codes::TerminationCode;
use crate::context::ExecutionContext;
use crate::data;
use crate::messages::Message;
use crate::pipeline::Step;

#[derive(Debug, Clone)]
pub struct SearchMatch {
    pub package: Arc<dyn Package>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub matches: Vec<SearchMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub installed_only: bool,
}

pub trait PackageSource: Send + Sync {
    fn search(&self, request: &SearchRequest) -> anyhow::Result<SearchResult>;
}

pub struct SearchSourceForSingle;

impl Step for SearchSourceForSingle {
    fn name(&self) -> &'static str {
        "search-source-for-single"
    }

    fn execute(&self, context: &mut ExecutionContext) -> anyhow::Result<()> {
        let query = context
            .args()
            .query
            .clone()
            .ok_or_else(|| anyhow!("a package query is required"))?;
        let request = SearchRequest {
            query: Some(query),
            installed_only: false,
        };
        let result = context.ambient().source.search(&request)?;
        context.add::<data::SearchResult>(result)?;
        Ok(())
    }
}

pub struct SearchInstalled;

impl Step for SearchInstalled {
    fn name(&self) -> &'static str {
        "search-installed"
    }

    fn execute(&self, context: &mut ExecutionContext) -> anyhow::Result<()> {
        let request = SearchRequest {
            query: None,
            installed_only: true,
        };
        let result = context.ambient().source.search(&request)?;
        context.add::<data::SearchResult>(result)?;
        Ok(())
    }
}

pub struct HandleSearchResultFailures;

impl Step for HandleSearchResultFailures {
    fn name(&self) -> &'static str {
        "handle-search-result-failures"
    }

    fn execute(&self, context: &mut ExecutionContext) -> anyhow::Result<()> {
        if context.get::<data::SearchResult>()?.matches.is_empty() {
            context.report(Message::NoPackageFound);
            context.terminate(TerminationCode::NoPackageFound);
        }
        Ok(())
    }
}

pub struct EnsureOneMatchFromSearchResult {
    pub is_upgrade: bool,
}

impl Step for EnsureOneMatchFromSearchResult {
    fn name(&self) -> &'static str {
        "ensure-one-match-from-search-result"
    }

    fn execute(&self, context: &mut ExecutionContext) -> anyhow::Result<()> {
        let matches = context.get::<data::SearchResult>()?.matches.clone();
        match matches.as_slice() {
            [] => {
                context.report(Message::NoPackageFound);
                context.terminate(TerminationCode::NoPackageFound);
            }
            [single] => {
                let package = Arc::clone(&single.package);
                if self.is_upgrade && package.installed_version().is_none() {
                    context.report(Message::NoInstalledPackageFound);
                    context.terminate(TerminationCode::NoPackageFound);
                    return Ok(());
                }
                context.add::<data::Package>(package)?;
            }
            many => {
                let ids = many
                    .iter()
                    .map(|entry| entry.package.id().to_string())
                    .collect();
                context.report(Message::MultiplePackagesFound(ids));
                context.terminate(TerminationCode::MultiplePackagesFound);
            }
        }
        Ok(())
    }
}
