//! The setup command: check, confirm, install and summarize

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use dialoguer::Confirm;

use crate::checker::SystemChecker;
use crate::config::SetupConfig;
use crate::installer::Installer;
use crate::interrupt::{EXIT_INTERRUPTED, Interrupt};
use crate::models::{InstallMethod, InstallOutcome, ToolSpec, ToolState, ToolStatus};
use crate::orchestrator::{
    ConfirmPrompt, Orchestrator, PlannedInstall, RunEnd, RunObserver, RunReport, ToolReport,
};
use crate::platform::PlatformInfo;
use crate::remote::{RemoteResolver, ResolvedVersion, VersionOrigin};
use crate::tools::MANAGED_TOOLS;
use crate::version::change_kind;

/// Run the setup workflow for every managed tool
pub fn cmd_setup(
    config: &SetupConfig,
    platform: PlatformInfo,
    interrupt: &Interrupt,
) -> Result<ExitCode> {
    println!(
        "{} Checking tools on {}",
        "→".dimmed(),
        platform.to_string().cyan()
    );

    let checker = SystemChecker;
    let resolver = RemoteResolver::new(config.metadata_timeout);
    let installer = Installer::new(config).with_interrupt(interrupt.clone());
    let prompt = TerminalPrompt { interrupt };
    let observer = ConsoleObserver;

    let report = Orchestrator::new(
        MANAGED_TOOLS,
        platform,
        config.mode,
        &checker,
        &resolver,
        &installer,
    )
    .with_prompt(&prompt)
    .with_observer(&observer)
    .with_interrupt(interrupt.clone())
    .run()
    .context("Setup run failed")?;

    print_summary(&report);

    Ok(if report.end == RunEnd::Interrupted {
        ExitCode::from(EXIT_INTERRUPTED)
    } else if report.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Confirmation through dialoguer, refusing when stdin is not a terminal
struct TerminalPrompt<'a> {
    interrupt: &'a Interrupt,
}

impl ConfirmPrompt for TerminalPrompt<'_> {
    fn confirm(&self, message: &str) -> Result<bool> {
        if !std::io::stdin().is_terminal() {
            println!(
                "{} Not running in a terminal, pass {} to install without asking",
                "!".yellow(),
                "--auto".bold()
            );
            return Ok(false);
        }

        // The prompt reads keys in raw mode, so Ctrl-C arrives as an error
        match Confirm::new().with_prompt(message).default(true).interact() {
            Ok(answer) => Ok(answer),
            Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => {
                self.interrupt.trigger();
                Ok(false)
            }
            Err(e) => Err(e).context("Failed to read confirmation"),
        }
    }
}

/// Prints progress as colored status lines
struct ConsoleObserver;

impl RunObserver for ConsoleObserver {
    fn checked(&self, reports: &[ToolReport]) {
        for report in reports {
            print_status_line(&report.spec, &report.status);
        }
    }

    fn planned(&self, plan: &[PlannedInstall]) {
        println!();
        println!("{}", "Planned:".bold());
        for item in plan {
            let action = match item.current.version.as_deref() {
                Some(current) => format!(
                    "{} → {} ({})",
                    current,
                    item.target.version.green(),
                    change_kind(current, &item.target.version)
                ),
                None => format!("install {}", item.target.version.green()),
            };
            println!("  {} {:<11} {}", "→".dimmed(), item.spec.name, action);
            if item.target.origin == VersionOrigin::Fallback {
                println!(
                    "    {} latest {} version unavailable, using {}",
                    "!".yellow(),
                    item.spec.name,
                    item.spec.fallback_version
                );
            }
        }
        println!();
    }

    fn installing(&self, spec: &ToolSpec, target: &ResolvedVersion) {
        println!(
            "{} Installing {} {}...",
            "→".dimmed(),
            spec.name.cyan(),
            target.version
        );
    }

    fn installed(&self, outcome: &InstallOutcome) {
        match outcome {
            InstallOutcome::Installed {
                tool,
                version,
                method,
            } => {
                let via = match method {
                    InstallMethod::Homebrew => "via Homebrew".to_string(),
                    InstallMethod::Download { path, .. } => format!("to {}", path.display()),
                };
                println!("  {} {} {} {}", "✓".green(), tool, version, via.dimmed());
            }
            InstallOutcome::Failed { tool, error } => {
                println!("  {} {} {}", "✗".red(), tool, error.to_string().red());
            }
        }
    }
}

fn state_icon(state: ToolState) -> ColoredString {
    let icon = state.icon();
    match state {
        ToolState::Ok => icon.green(),
        ToolState::BelowRecommended | ToolState::Unknown => icon.yellow(),
        ToolState::Outdated | ToolState::Missing => icon.red(),
    }
}

fn print_status_line(spec: &ToolSpec, status: &ToolStatus) {
    let detail = match status.state {
        ToolState::Ok => status.version_str().to_string(),
        ToolState::BelowRecommended => format!(
            "{} (recommended {})",
            status.version_str(),
            spec.recommended_version.unwrap_or(spec.min_version)
        ),
        ToolState::Outdated => format!(
            "{} (minimum {})",
            status.version_str(),
            spec.min_version
        ),
        ToolState::Missing | ToolState::Unknown => String::new(),
    };
    println!(
        "  {} {:<11} {:<18} {}",
        state_icon(status.state),
        spec.name,
        status.state.label(),
        detail.dimmed()
    );
}

fn print_summary(report: &RunReport) {
    match report.end {
        RunEnd::CheckOnly => {
            if report.initial.iter().any(|r| r.status.state.needs_install()) {
                println!();
                println!("Run {} to install missing or outdated tools", "tfsetup".cyan());
            }
        }
        RunEnd::AllOk => {
            println!();
            println!("{} All tools are up to date", "✓".green());
        }
        RunEnd::Cancelled => {
            println!();
            println!("{} Cancelled, nothing installed", "!".yellow());
        }
        RunEnd::Installed => print_install_summary(report),
        RunEnd::Interrupted => {
            if !report.outcomes.is_empty() {
                print_install_summary(report);
            }
            println!();
            println!("{} Interrupted, remaining installs skipped", "✗".red());
        }
    }
}

fn print_install_summary(report: &RunReport) {
    println!();
    println!("{}", "Summary:".bold());
    for final_report in &report.final_statuses {
        print_status_line(&final_report.spec, &final_report.status);
    }

    for outcome in &report.outcomes {
        if let InstallOutcome::Installed {
            method: InstallMethod::Download {
                path,
                on_path: false,
            },
            ..
        } = outcome
            && let Some(dir) = path.parent()
        {
            println!();
            println!(
                "{} {} is not on your PATH, add it with:",
                "!".yellow(),
                dir.display()
            );
            println!("    export PATH=\"{}:$PATH\"", dir.display());
        }
    }

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!();
        println!("{}", "Failures:".red().bold());
        for outcome in failures {
            if let InstallOutcome::Failed { tool, error } = outcome {
                println!("  {} {} ({}): {}", "✗".red(), tool, error.class(), error);
            }
        }
    }

    for unsatisfied in report.unsatisfied() {
        println!(
            "{} {} still does not meet minimum {} after install",
            "✗".red(),
            unsatisfied.spec.name,
            unsatisfied.spec.min_version
        );
    }

    if report.success() {
        println!();
        println!("{} Setup complete", "✓".green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_icons_keep_symbols() {
        colored::control::set_override(false);
        assert_eq!(state_icon(ToolState::Ok).to_string(), "✓");
        assert_eq!(state_icon(ToolState::Missing).to_string(), "✗");
    }
}
