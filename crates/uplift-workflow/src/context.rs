use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};
use uplift_core::{Installer, PackageManifest, PackageVersion};
use uplift_resolver::InstallerSelector;

use crate::codes::TerminationCode;
use crate::data::{self, DataBag, DataSlot};
use crate::messages::Message;
use crate::options::{RunOptions, WorkflowConfig};
use crate::pipeline::Step;
use crate::search::PackageSource;
use crate::stages::InstallStage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context data '{0}' is already set")]
    SlotAlreadySet(&'static str),
    #[error("context data '{0}' is not set")]
    SlotMissing(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContextFlag {
    InstallerExecutionUseUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
    pub code: TerminationCode,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContextStatus {
    #[default]
    Running,
    Terminated(Termination),
}

pub struct Ambient {
    pub config: WorkflowConfig,
    pub source: Arc<dyn PackageSource>,
    pub selector: Arc<dyn InstallerSelector>,
    pub install_stage: Arc<dyn InstallStage>,
    next_context_id: AtomicU64,
}

impl Ambient {
    pub fn new(
        config: WorkflowConfig,
        source: Arc<dyn PackageSource>,
        selector: Arc<dyn InstallerSelector>,
        install_stage: Arc<dyn InstallStage>,
    ) -> Self {
        Self {
            config,
            source,
            selector,
            install_stage,
            next_context_id: AtomicU64::new(0),
        }
    }

    fn allocate_context_id(&self) -> u64 {
        self.next_context_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl fmt::Debug for Ambient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ambient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolvedTarget<'a> {
    pub manifest: &'a PackageManifest,
    pub package_version: &'a PackageVersion,
    pub installer: &'a Installer,
}

#[derive(Debug)]
pub struct ExecutionContext {
    id: u64,
    parent_id: Option<u64>,
    ambient: Arc<Ambient>,
    args: RunOptions,
    flags: BTreeSet<ContextFlag>,
    status: ContextStatus,
    data: DataBag,
    messages: Vec<Message>,
}

impl ExecutionContext {
    pub fn new(ambient: Arc<Ambient>, args: RunOptions) -> Self {
        let id = ambient.allocate_context_id();
        Self {
            id,
            parent_id: None,
            ambient,
            args,
            flags: BTreeSet::new(),
            status: ContextStatus::Running,
            data: DataBag::default(),
            messages: Vec::new(),
        }
    }

    pub fn create_sub_context(&self) -> Self {
        let mut child = Self::new(Arc::clone(&self.ambient), self.args.clone());
        child.parent_id = Some(self.id);
        child
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn parent_id(&self) -> Option<u64> {
        self.parent_id
    }

    pub fn ambient(&self) -> &Arc<Ambient> {
        &self.ambient
    }

    pub fn args(&self) -> &RunOptions {
        &self.args
    }

    pub fn has_flag(&self, flag: ContextFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn set_flag(&mut self, flag: ContextFlag) {
        self.flags.insert(flag);
    }

    pub fn add<S: DataSlot>(&mut self, value: S::Value) -> Result<(), ContextError> {
        let slot = S::slot_mut(&mut self.data);
        if slot.is_some() {
            return Err(ContextError::SlotAlreadySet(S::NAME));
        }
        *slot = Some(value);
        Ok(())
    }

    pub fn get<S: DataSlot>(&self) -> Result<&S::Value, ContextError> {
        S::slot(&self.data)
            .as_ref()
            .ok_or(ContextError::SlotMissing(S::NAME))
    }

    pub fn get_mut<S: DataSlot>(&mut self) -> Result<&mut S::Value, ContextError> {
        S::slot_mut(&mut self.data)
            .as_mut()
            .ok_or(ContextError::SlotMissing(S::NAME))
    }

    pub fn get_optional<S: DataSlot>(&self) -> Option<&S::Value> {
        S::slot(&self.data).as_ref()
    }

    pub fn contains<S: DataSlot>(&self) -> bool {
        S::slot(&self.data).is_some()
    }

    pub fn status(&self) -> &ContextStatus {
        &self.status
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.status, ContextStatus::Terminated(_))
    }

    pub fn termination_code(&self) -> Option<TerminationCode> {
        match &self.status {
            ContextStatus::Running => None,
            ContextStatus::Terminated(termination) => Some(termination.code),
        }
    }

    pub fn terminate(&mut self, code: TerminationCode) {
        self.set_termination(Termination { code, detail: None });
    }

    pub fn terminate_with_detail(&mut self, code: TerminationCode, detail: impl Into<String>) {
        self.set_termination(Termination {
            code,
            detail: Some(detail.into()),
        });
    }

    // The first termination wins; later ones are logged and dropped.
    fn set_termination(&mut self, termination: Termination) {
        if let ContextStatus::Terminated(existing) = &self.status {
            debug!(
                context = self.id,
                existing = %existing.code,
                ignored = %termination.code,
                "context already terminated"
            );
            return;
        }
        debug!(context = self.id, code = %termination.code, "terminating context");
        self.status = ContextStatus::Terminated(termination);
    }

    pub fn report(&mut self, message: Message) {
        debug!(context = self.id, ?message, "reporting message");
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    // A step error terminates the context with `InternalError` instead of propagating.
    pub fn run(&mut self, step: &dyn Step) {
        if self.is_terminated() {
            return;
        }

        debug!(context = self.id, step = step.name(), "running step");
        if let Err(err) = step.execute(self) {
            let detail = format!("{err:#}");
            warn!(context = self.id, step = step.name(), error = %detail, "step failed");
            self.terminate_with_detail(TerminationCode::InternalError, detail);
        }
    }

    pub fn resolved_target(&self) -> Option<ResolvedTarget<'_>> {
        if self.is_terminated() {
            return None;
        }

        Some(ResolvedTarget {
            manifest: self.get_optional::<data::Manifest>()?,
            package_version: self.get_optional::<data::PackageVersion>()?,
            installer: self.get_optional::<data::Installer>()?,
        })
    }
}
