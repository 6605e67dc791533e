use crate::codes::TerminationCode;
use crate::context::{ExecutionContext, ResolvedTarget};

#[derive(Debug, Clone, Copy)]
pub struct BatchInstallRequest<'a> {
    pub packages: &'a [ExecutionContext],
    pub partial_failure_code: TerminationCode,
    pub tolerated_codes: &'a [TerminationCode],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchInstallOutcome {
    Installed,
    Tolerated(TerminationCode),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInstallEntry {
    pub id: String,
    pub version: String,
    pub outcome: BatchInstallOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchInstallReport {
    pub entries: Vec<BatchInstallEntry>,
}

impl BatchInstallReport {
    pub fn installed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.outcome == BatchInstallOutcome::Installed)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.outcome, BatchInstallOutcome::Failed(_)))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }
}

pub trait InstallStage: Send + Sync {
    // `Ok(Some(code))` reports a classified non-success such as a re-check finding the update
    // no longer applicable.
    fn install(&self, target: ResolvedTarget<'_>) -> anyhow::Result<Option<TerminationCode>>;

    fn install_batch(&self, request: BatchInstallRequest<'_>) -> anyhow::Result<BatchInstallReport> {
        let mut report = BatchInstallReport::default();
        for package in request.packages {
            let Some(target) = package.resolved_target() else {
                continue;
            };

            let outcome = match self.install(target) {
                Ok(None) => BatchInstallOutcome::Installed,
                Ok(Some(code)) if request.tolerated_codes.contains(&code) => {
                    BatchInstallOutcome::Tolerated(code)
                }
                Ok(Some(code)) => BatchInstallOutcome::Failed(code.to_string()),
                Err(err) => BatchInstallOutcome::Failed(format!("{err:#}")),
            };
            report.entries.push(BatchInstallEntry {
                id: target.manifest.id.clone(),
                version: target.manifest.version.to_string(),
                outcome,
            });
        }
        Ok(report)
    }
}
