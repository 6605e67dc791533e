use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::{info, warn};
use uplift_core::{PinState, Version};

use crate::codes::TerminationCode;
use crate::context::{ContextFlag, ExecutionContext};
use crate::data;
use crate::messages::Message;
use crate::pipeline::{Pipeline, Step};
use crate::search::{SearchInstalled, SearchMatch};
use crate::select_version::{GetInstalledPackageVersion, SelectLatestApplicableVersion};
use crate::stages::BatchInstallRequest;

#[derive(Debug, Default)]
pub struct UpdatePlan {
    entries: Vec<ExecutionContext>,
}

impl UpdatePlan {
    pub fn push_if_absent(&mut self, context: ExecutionContext) -> bool {
        let Some(key) = plan_key(&context) else {
            return false;
        };
        if self
            .entries
            .iter()
            .any(|existing| plan_key(existing).as_ref() == Some(&key))
        {
            return false;
        }
        self.entries.push(context);
        true
    }

    pub fn entries(&self) -> &[ExecutionContext] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_contexts(self) -> Vec<ExecutionContext> {
        self.entries
    }
}

fn plan_key(context: &ExecutionContext) -> Option<(String, Version, String)> {
    let target = context.resolved_target()?;
    Some((
        target.manifest.id.clone(),
        target.manifest.version.clone(),
        target.package_version.source_id.clone(),
    ))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateAllSummary {
    pub found_update: bool,
    pub unknown_version_skipped: usize,
    pub explicit_upgrade_skipped: usize,
    pub resolution_failures: usize,
}

#[derive(Debug, Default)]
pub struct UpdatePlanOutcome {
    pub plan: UpdatePlan,
    pub summary: UpdateAllSummary,
}

enum MatchOutcome {
    Planned(ExecutionContext),
    NotApplicable,
    UnknownVersionSkipped,
    ExplicitUpgradeSkipped,
    Failed,
}

fn resolve_match(parent: &ExecutionContext, candidate: &SearchMatch) -> MatchOutcome {
    let package_id = candidate.package.id().to_string();
    let mut update_context = parent.create_sub_context();

    if let Err(err) = update_context.add::<data::Package>(Arc::clone(&candidate.package)) {
        warn!(package = %package_id, error = %err, "could not prepare update context");
        return MatchOutcome::Failed;
    }

    if !parent.args().include_unknown
        && candidate
            .package
            .installed_version()
            .is_some_and(|installed| installed.version.is_unknown())
    {
        info!(package = %package_id, "skipping package with unknown installed version");
        return MatchOutcome::UnknownVersionSkipped;
    }

    update_context.set_flag(ContextFlag::InstallerExecutionUseUpdate);
    Pipeline::new()
        .then(GetInstalledPackageVersion)
        .then(SelectLatestApplicableVersion::batch())
        .run(&mut update_context);

    match update_context.termination_code() {
        None => {}
        Some(TerminationCode::UpdateNotApplicable) => return MatchOutcome::NotApplicable,
        Some(code) => {
            warn!(package = %package_id, %code, "skipping package whose resolution failed");
            return MatchOutcome::Failed;
        }
    }

    // Judged on the installed package's pin rather than the resolved version so bulk updates
    // agree with the list of available updates, and each such package is checked once.
    let pinned_by_manifest = update_context
        .get_optional::<data::InstalledPackageVersion>()
        .is_some_and(|installed| installed.pin_state() == PinState::PinnedByManifest);
    if pinned_by_manifest {
        info!(package = %package_id, "skipping package that requires explicit upgrade");
        return MatchOutcome::ExplicitUpgradeSkipped;
    }

    MatchOutcome::Planned(update_context)
}

fn resolve_matches_parallel(
    parent: &ExecutionContext,
    matches: &[SearchMatch],
    workers: usize,
) -> Vec<MatchOutcome> {
    let next = &AtomicUsize::new(0);
    let mut indexed = thread::scope(|scope| {
        let handles = (0..workers.min(matches.len()))
            .map(|_| {
                scope.spawn(move || {
                    let mut resolved = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(candidate) = matches.get(index) else {
                            break;
                        };
                        resolved.push((index, resolve_match(parent, candidate)));
                    }
                    resolved
                })
            })
            .collect::<Vec<_>>();

        let mut indexed = Vec::with_capacity(matches.len());
        for handle in handles {
            match handle.join() {
                Ok(resolved) => indexed.extend(resolved),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        indexed
    });

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, outcome)| outcome).collect()
}

pub fn build_update_plan(parent: &ExecutionContext, matches: &[SearchMatch]) -> UpdatePlanOutcome {
    let workers = parent.ambient().config.max_parallel_resolutions.max(1);
    let outcomes = if workers == 1 || matches.len() < 2 {
        matches
            .iter()
            .map(|candidate| resolve_match(parent, candidate))
            .collect::<Vec<_>>()
    } else {
        resolve_matches_parallel(parent, matches, workers)
    };

    let mut result = UpdatePlanOutcome::default();
    for outcome in outcomes {
        match outcome {
            MatchOutcome::Planned(update_context) => {
                result.summary.found_update = true;
                result.plan.push_if_absent(update_context);
            }
            MatchOutcome::NotApplicable => {}
            MatchOutcome::UnknownVersionSkipped => result.summary.unknown_version_skipped += 1,
            MatchOutcome::ExplicitUpgradeSkipped => result.summary.explicit_upgrade_skipped += 1,
            MatchOutcome::Failed => result.summary.resolution_failures += 1,
        }
    }
    result
}

pub struct UpdateAllApplicable;

impl Step for UpdateAllApplicable {
    fn name(&self) -> &'static str {
        "update-all-applicable"
    }

    fn execute(&self, context: &mut ExecutionContext) -> anyhow::Result<()> {
        let matches = context.get::<data::SearchResult>()?.matches.clone();
        let UpdatePlanOutcome { plan, summary } = build_update_plan(context, &matches);

        let mut partial_failure = false;
        if summary.found_update {
            context.add::<data::PackageSubContexts>(plan.into_contexts())?;
            let stage = Arc::clone(&context.ambient().install_stage);
            let report = stage.install_batch(BatchInstallRequest {
                packages: context.get::<data::PackageSubContexts>()?,
                partial_failure_code: TerminationCode::UpdateAllPartialFailure,
                tolerated_codes: &[TerminationCode::UpdateNotApplicable],
            })?;
            partial_failure = report.has_failures();
            context.add::<data::BatchInstallReport>(report)?;
        }

        if summary.unknown_version_skipped > 0 {
            info!(
                count = summary.unknown_version_skipped,
                "package(s) skipped due to unknown installed version"
            );
            context.report(Message::UpgradeUnknownVersionCount(
                summary.unknown_version_skipped,
            ));
        }
        if summary.explicit_upgrade_skipped > 0 {
            info!(
                count = summary.explicit_upgrade_skipped,
                "package(s) skipped due to requiring explicit upgrade"
            );
            context.report(Message::UpgradeRequireExplicitCount(
                summary.explicit_upgrade_skipped,
            ));
        }
        if summary.resolution_failures > 0 {
            warn!(
                count = summary.resolution_failures,
                "package(s) skipped because their resolution failed"
            );
        }

        let found_update = summary.found_update;
        context.add::<data::UpdateAllSummary>(summary)?;
        if !found_update {
            context.report(Message::UpdateNotApplicable);
        }
        if partial_failure {
            context.terminate(TerminationCode::UpdateAllPartialFailure);
        }
        Ok(())
    }
}

pub fn upgrade_all_pipeline() -> Pipeline {
    Pipeline::new()
        .then(SearchInstalled)
        .then(UpdateAllApplicable)
}
