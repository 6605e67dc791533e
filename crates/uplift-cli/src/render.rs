use std::io::IsTerminal;
use std::process::ExitCode;

use anstyle::{AnsiColor, Effects, Style};
use serde::Serialize;
use uplift_workflow::{
    data, BatchInstallOutcome, BatchInstallReport, ContextFlag, ContextStatus, ExecutionContext,
    Level, Message, TerminationCode, UpdateAllSummary,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn current_output_style() -> OutputStyle {
    if std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none() {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!("{} {message}", status_badge(status)),
    }
}

fn status_badge(status: &str) -> &'static str {
    match status {
        "ok" => "[OK]",
        "warn" => "[WARN]",
        "err" => "[ERR]",
        _ => "[..]",
    }
}

pub(crate) fn render_section_header(style: OutputStyle, title: &str) -> Option<String> {
    match style {
        OutputStyle::Plain => None,
        OutputStyle::Rich => Some(colorize(section_style(), &format!("== {title} =="))),
    }
}

fn section_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightBlue.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

pub(crate) fn level_status(level: Level) -> &'static str {
    match level {
        Level::Info => "info",
        Level::Warn => "warn",
        Level::Error => "err",
    }
}

pub(crate) fn message_text(message: &Message) -> String {
    match message {
        Message::UpgradeUnknownVersionExplanation => "The installed version of this package cannot \
            be determined. Add --include-unknown to upgrade it anyway."
            .to_string(),
        Message::UpgradeDifferentInstallTechnologyInNewerVersions => "A newer version was found, \
            but it uses a different install technology than the installed version. Uninstall the \
            package and install the newer version instead."
            .to_string(),
        Message::UpgradeIsPinned => {
            "A newer version is available, but the package is pinned. Use --force to override \
             the pin."
                .to_string()
        }
        Message::UpdateNotApplicable => "No newer package versions are available.".to_string(),
        Message::NoApplicableInstallers => {
            "No applicable installer found for this system.".to_string()
        }
        Message::PackageAlreadyInstalled => {
            "The package is already installed. Run without --no-upgrade to upgrade it."
                .to_string()
        }
        Message::ConvertInstallFlowToUpgrade => {
            "Found an existing installation; upgrading it instead.".to_string()
        }
        Message::NoPackageFound => "No package found matching the query.".to_string(),
        Message::NoInstalledPackageFound => {
            "No installed package found matching the query.".to_string()
        }
        Message::MultiplePackagesFound(ids) => {
            format!("Multiple packages match the query: {}", ids.join(", "))
        }
        Message::NoManifestFound { version } => {
            format!("Version {version} was not found in the configured sources.")
        }
        Message::VersionIsPinned { version } => {
            format!("Version {version} is pinned. Use --force to install it anyway.")
        }
        Message::UpgradeUnknownVersionCount(count) => format!(
            "{count} package(s) have an installed version that cannot be determined. Use \
             --include-unknown to include them."
        ),
        Message::UpgradeRequireExplicitCount(count) => format!(
            "{count} package(s) require an explicit upgrade. Upgrade them by id to include them."
        ),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct MessageReport {
    pub(crate) level: &'static str,
    pub(crate) text: String,
}

impl From<&Message> for MessageReport {
    fn from(message: &Message) -> Self {
        Self {
            level: level_status(message.level()),
            text: message_text(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct EntryReport {
    pub(crate) status: &'static str,
    pub(crate) id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) version: Option<String>,
    pub(crate) text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub(crate) struct SummaryReport {
    pub(crate) found_update: bool,
    pub(crate) installed: usize,
    pub(crate) failed: usize,
    pub(crate) unknown_version_skipped: usize,
    pub(crate) explicit_upgrade_skipped: usize,
    pub(crate) resolution_failures: usize,
}

impl SummaryReport {
    fn new(summary: &UpdateAllSummary, batch: Option<&BatchInstallReport>) -> Self {
        Self {
            found_update: summary.found_update,
            installed: batch.map_or(0, BatchInstallReport::installed_count),
            failed: batch.map_or(0, BatchInstallReport::failed_count),
            unknown_version_skipped: summary.unknown_version_skipped,
            explicit_upgrade_skipped: summary.explicit_upgrade_skipped,
            resolution_failures: summary.resolution_failures,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct RunReport {
    pub(crate) command: String,
    pub(crate) outcome: String,
    pub(crate) exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) detail: Option<String>,
    pub(crate) entries: Vec<EntryReport>,
    pub(crate) messages: Vec<MessageReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) summary: Option<SummaryReport>,
}

impl RunReport {
    pub(crate) fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            outcome: "ok".to_string(),
            exit_code: 0,
            detail: None,
            entries: Vec::new(),
            messages: Vec::new(),
            summary: None,
        }
    }

    pub(crate) fn entry(
        &mut self,
        status: &'static str,
        id: &str,
        version: Option<String>,
        text: String,
    ) {
        self.entries.push(EntryReport {
            status,
            id: id.to_string(),
            version,
            text,
        });
    }

    pub(crate) fn message(&mut self, message: &Message) {
        self.messages.push(MessageReport::from(message));
    }

    pub(crate) fn terminate(&mut self, code: TerminationCode, detail: Option<String>) {
        self.outcome = code.to_string();
        self.exit_code = code.exit_code();
        self.detail = detail;
    }

    pub(crate) fn from_single(command: &str, context: &ExecutionContext) -> Self {
        let mut report = Self::new(command);
        if let Some(target) = context.resolved_target() {
            let verb = if context.has_flag(ContextFlag::InstallerExecutionUseUpdate) {
                "upgraded"
            } else {
                "installed"
            };
            report.entry(
                "ok",
                &target.manifest.id,
                Some(target.manifest.version.to_string()),
                format!(
                    "{verb} {} {} from {}",
                    target.manifest.package_name(),
                    target.manifest.version,
                    target.package_version.source_id
                ),
            );
        }
        report.apply_context(context);
        report
    }

    pub(crate) fn from_upgrade_all(context: &ExecutionContext) -> Self {
        let mut report = Self::new("upgrade");
        let batch = context.get_optional::<data::BatchInstallReport>();
        if let Some(batch) = batch {
            for entry in &batch.entries {
                let (status, text) = match &entry.outcome {
                    BatchInstallOutcome::Installed => {
                        ("ok", format!("upgraded {} to {}", entry.id, entry.version))
                    }
                    BatchInstallOutcome::Tolerated(code) => {
                        ("info", format!("{} {}: {code}", entry.id, entry.version))
                    }
                    BatchInstallOutcome::Failed(reason) => (
                        "err",
                        format!("{} {}: failed ({reason})", entry.id, entry.version),
                    ),
                };
                report.entry(status, &entry.id, Some(entry.version.clone()), text);
            }
        }
        if let Some(summary) = context.get_optional::<data::UpdateAllSummary>() {
            report.summary = Some(SummaryReport::new(summary, batch));
        }
        report.apply_context(context);
        report
    }

    fn apply_context(&mut self, context: &ExecutionContext) {
        for message in context.messages() {
            self.message(message);
        }
        if let ContextStatus::Terminated(termination) = context.status() {
            self.terminate(termination.code, termination.detail.clone());
        }
    }

    pub(crate) fn lines(&self, style: OutputStyle) -> Vec<String> {
        let mut lines = Vec::new();
        for entry in &self.entries {
            lines.push(render_status_line(style, entry.status, &entry.text));
        }
        for message in &self.messages {
            lines.push(render_status_line(style, message.level, &message.text));
        }
        if let Some(summary) = &self.summary {
            if summary.found_update {
                if let Some(header) = render_section_header(style, "summary") {
                    lines.push(header);
                }
                lines.push(render_status_line(
                    style,
                    if summary.failed > 0 { "warn" } else { "ok" },
                    &format!(
                        "{} upgraded, {} failed",
                        summary.installed, summary.failed
                    ),
                ));
            }
        }
        if let Some(detail) = &self.detail {
            lines.push(render_status_line(
                style,
                "err",
                &format!("{}: {detail}", self.outcome),
            ));
        }
        lines
    }

    pub(crate) fn exit_code(&self) -> ExitCode {
        ExitCode::from(u8::try_from(self.exit_code).unwrap_or(1))
    }
}
