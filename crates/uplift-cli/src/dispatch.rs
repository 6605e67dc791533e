use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;
use uplift_core::{PinRule, PinState, Scope};
use uplift_installer::{
    default_user_prefix, read_all_pins, read_install_receipt, read_install_receipts,
    read_installed_versions, remove_pin, write_pin, PrefixLayout, ReceiptInstallStage,
};
use uplift_registry::{ConfiguredRegistryIndex, RegistrySource};
use uplift_resolver::{ManifestComparator, SelectorConfig};
use uplift_workflow::{
    build_update_plan, data, upgrade_all_pipeline, Ambient, ExecutionContext,
    InstallOrUpgradeSinglePackage, Message, RunOptions, SearchInstalled, WorkflowConfig,
};

use crate::render::RunReport;
use crate::{Cli, Commands, InstallArgs, PinCommands, UpgradeArgs};

pub(crate) fn execute(cli: Cli) -> Result<RunReport> {
    let prefix = match &cli.prefix {
        Some(prefix) => prefix.clone(),
        None => default_user_prefix()?,
    };
    let layout = PrefixLayout::new(prefix);
    debug!(prefix = %layout.prefix().display(), "using prefix");

    match &cli.command {
        Commands::Install(args) => {
            let ambient = open_ambient(&cli, &layout)?;
            Ok(run_single(ambient, "install", install_options(args), false))
        }
        Commands::Upgrade(args) => {
            let ambient = open_ambient(&cli, &layout)?;
            let options = upgrade_options(args);
            if args.all {
                Ok(run_upgrade_all(ambient, options))
            } else if args.query.is_some() {
                Ok(run_single(ambient, "upgrade", options, true))
            } else {
                list_upgrades(ambient, options)
            }
        }
        Commands::List => list_installed(&layout),
        Commands::Pin(command) => run_pin_command(&layout, command),
    }
}

fn install_options(args: &InstallArgs) -> RunOptions {
    RunOptions {
        query: Some(args.query.clone()),
        version: args.version.clone(),
        include_unknown: args.include_unknown,
        include_pinned: false,
        force: args.force,
        no_upgrade: args.no_upgrade,
    }
}

fn upgrade_options(args: &UpgradeArgs) -> RunOptions {
    RunOptions {
        query: args.query.clone(),
        version: args.version.clone(),
        include_unknown: args.include_unknown,
        include_pinned: args.include_pinned,
        force: args.force,
        no_upgrade: false,
    }
}

fn open_ambient(cli: &Cli, layout: &PrefixLayout) -> Result<Arc<Ambient>> {
    layout.ensure_base_dirs()?;

    let index = if cli.registry_roots.is_empty() {
        ConfiguredRegistryIndex::discover(&layout.catalogs_dir())?
    } else {
        ConfiguredRegistryIndex::from_roots(cli.registry_roots.iter().cloned())?
    };
    if index.is_empty() {
        debug!("no catalogs are available");
    }

    let source = RegistrySource::new(index)
        .with_installed(read_installed_versions(layout)?)
        .with_pins(read_all_pins(layout)?);

    let required_scope = cli
        .scope
        .as_deref()
        .map(|scope| Scope::parse(scope).with_context(|| format!("unknown scope '{scope}'")))
        .transpose()?;
    let selector = ManifestComparator::new(SelectorConfig {
        required_scope,
        preferred_locales: cli.locales.clone(),
        ..SelectorConfig::default()
    });

    Ok(Arc::new(Ambient::new(
        WorkflowConfig {
            max_parallel_resolutions: usize::from(cli.jobs),
        },
        Arc::new(source),
        Arc::new(selector),
        Arc::new(ReceiptInstallStage::new(layout.clone())),
    )))
}

fn run_single(
    ambient: Arc<Ambient>,
    command: &str,
    options: RunOptions,
    is_upgrade: bool,
) -> RunReport {
    let mut context = ExecutionContext::new(ambient, options);
    InstallOrUpgradeSinglePackage { is_upgrade }
        .pipeline()
        .run(&mut context);
    RunReport::from_single(command, &context)
}

fn run_upgrade_all(ambient: Arc<Ambient>, options: RunOptions) -> RunReport {
    let mut context = ExecutionContext::new(ambient, options);
    upgrade_all_pipeline().run(&mut context);
    RunReport::from_upgrade_all(&context)
}

// `upgrade` without arguments plans updates without installing them.
fn list_upgrades(ambient: Arc<Ambient>, options: RunOptions) -> Result<RunReport> {
    let mut report = RunReport::new("upgrade");
    let mut context = ExecutionContext::new(ambient, options);
    context.run(&SearchInstalled);
    if let Some(code) = context.termination_code() {
        report.terminate(code, None);
        return Ok(report);
    }

    let matches = context.get::<data::SearchResult>()?.matches.clone();
    let outcome = build_update_plan(&context, &matches);
    for entry in outcome.plan.entries() {
        let Some(target) = entry.resolved_target() else {
            continue;
        };
        let installed = entry
            .get_optional::<data::InstalledPackageVersion>()
            .map(|installed| installed.version.to_string())
            .unwrap_or_default();
        report.entry(
            "info",
            &target.manifest.id,
            Some(target.manifest.version.to_string()),
            format!(
                "{} {installed} -> {} ({})",
                target.manifest.id, target.manifest.version, target.package_version.source_id
            ),
        );
    }

    let summary = &outcome.summary;
    if summary.unknown_version_skipped > 0 {
        report.message(&Message::UpgradeUnknownVersionCount(
            summary.unknown_version_skipped,
        ));
    }
    if summary.explicit_upgrade_skipped > 0 {
        report.message(&Message::UpgradeRequireExplicitCount(
            summary.explicit_upgrade_skipped,
        ));
    }
    if !summary.found_update {
        report.message(&Message::UpdateNotApplicable);
    }
    Ok(report)
}

fn list_installed(layout: &PrefixLayout) -> Result<RunReport> {
    let mut report = RunReport::new("list");
    let pins = read_all_pins(layout)?;
    for receipt in read_install_receipts(layout)? {
        let mut text = format!("{} {}", receipt.id, receipt.version);
        if let Some(source) = &receipt.source {
            text.push_str(&format!(" ({source})"));
        }
        if let Some(pin) = pins.get(&receipt.id) {
            text.push_str(&format!(" [pin: {}]", describe_pin(pin)));
        }
        if receipt.require_explicit_upgrade {
            text.push_str(" [explicit upgrade]");
        }
        report.entry("info", &receipt.id, Some(receipt.version.clone()), text);
    }
    Ok(report)
}

fn describe_pin(pin: &PinRule) -> String {
    match &pin.gated_range {
        Some(range) => format!("{} {range}", pin.state.as_str()),
        None => pin.state.as_str().to_string(),
    }
}

fn run_pin_command(layout: &PrefixLayout, command: &PinCommands) -> Result<RunReport> {
    let mut report = RunReport::new("pin");
    match command {
        PinCommands::Add {
            id,
            blocking,
            gating,
        } => {
            if read_install_receipt(layout, id)?.is_none() {
                anyhow::bail!("package '{id}' is not installed");
            }
            let rule = match (*blocking, gating.as_deref()) {
                (true, _) => PinRule::new(PinState::Blocking),
                (false, Some(range)) => PinRule::gating(
                    semver::VersionReq::parse(range)
                        .with_context(|| format!("invalid gating range '{range}'"))?,
                ),
                (false, None) => PinRule::new(PinState::UserPin),
            };
            let path = write_pin(layout, id, &rule)?;
            report.entry(
                "ok",
                id,
                None,
                format!("pinned {id} ({}) at {}", describe_pin(&rule), path.display()),
            );
        }
        PinCommands::Remove { id } => {
            if remove_pin(layout, id)? {
                report.entry("ok", id, None, format!("unpinned {id}"));
            } else {
                report.entry("warn", id, None, format!("{id} is not pinned"));
            }
        }
        PinCommands::List => {
            for (id, pin) in read_all_pins(layout)? {
                let text = format!("{id} {}", describe_pin(&pin));
                report.entry("info", &id, None, text);
            }
        }
    }
    Ok(report)
}
