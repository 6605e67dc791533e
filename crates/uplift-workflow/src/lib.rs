mod codes;
mod context;
pub mod data;
mod messages;
mod options;
mod pipeline;
mod search;
mod select_version;
mod single;
mod stages;
mod update_all;

pub use codes::TerminationCode;
pub use context::{
    Ambient, ContextError, ContextFlag, ContextStatus, ExecutionContext, ResolvedTarget,
    Termination,
};
pub use messages::{Level, Message};
pub use options::{RunOptions, WorkflowConfig};
pub use pipeline::{Pipeline, Step};
pub use search::{
    EnsureOneMatchFromSearchResult, HandleSearchResultFailures, PackageSource, SearchInstalled,
    SearchMatch, SearchRequest, SearchResult, SearchSourceForSingle,
};
pub use select_version::{
    EnsureUpdateVersionApplicable, GetInstalledPackageVersion, SelectLatestApplicableVersion,
};
pub use single::{
    EnsureApplicableInstaller, GetManifestFromPackage, InstallOrUpgradeSinglePackage,
    InstallSinglePackage, SelectInstaller, SelectSinglePackageVersionForInstallOrUpgrade,
};
pub use stages::{
    BatchInstallEntry, BatchInstallOutcome, BatchInstallReport, BatchInstallRequest, InstallStage,
};
pub use update_all::{
    build_update_plan, upgrade_all_pipeline, UpdateAllApplicable, UpdateAllSummary, UpdatePlan,
    UpdatePlanOutcome,
};
