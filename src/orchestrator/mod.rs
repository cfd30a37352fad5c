//! Check → confirm → install → recheck workflow
//!
//! The orchestrator owns no I/O of its own. Checking, version lookup,
//! installation and the confirmation prompt come in through traits, and
//! progress is reported to a [`RunObserver`].

use anyhow::Result;

use crate::checker::StatusCheck;
use crate::config::RunMode;
use crate::installer::{InstallError, ToolInstaller};
use crate::interrupt::Interrupt;
use crate::models::{InstallOutcome, ToolSpec, ToolStatus};
use crate::platform::PlatformInfo;
use crate::remote::{ResolvedVersion, VersionLookup, resolve_version};

/// Asks the user a yes/no question
pub trait ConfirmPrompt {
    fn confirm(&self, message: &str) -> Result<bool>;
}

/// Receives progress notifications during a run
pub trait RunObserver {
    /// Initial check of every tool finished
    fn checked(&self, _reports: &[ToolReport]) {}
    /// Tools about to be installed, with their target versions
    fn planned(&self, _plan: &[PlannedInstall]) {}
    fn installing(&self, _spec: &ToolSpec, _target: &ResolvedVersion) {}
    fn installed(&self, _outcome: &InstallOutcome) {}
}

/// Observer that ignores everything
pub struct Silent;

impl RunObserver for Silent {}

/// Prompt that always answers no
pub struct Decline;

impl ConfirmPrompt for Decline {
    fn confirm(&self, _message: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Status of one tool at a point in the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReport {
    pub spec: ToolSpec,
    pub status: ToolStatus,
}

/// A tool scheduled for install or upgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedInstall {
    pub spec: ToolSpec,
    pub current: ToolStatus,
    pub target: ResolvedVersion,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// Check-only mode, nothing attempted
    CheckOnly,
    /// Every tool already satisfied its constraints
    AllOk,
    /// The user declined the install
    Cancelled,
    /// Installs were attempted and tools rechecked
    Installed,
    /// Ctrl-C stopped the run before every planned install was done
    Interrupted,
}

/// Everything a run observed, handed to the summary
#[derive(Debug)]
pub struct RunReport {
    pub initial: Vec<ToolReport>,
    pub outcomes: Vec<InstallOutcome>,
    /// Statuses after the recheck, or the initial ones when nothing was installed
    pub final_statuses: Vec<ToolReport>,
    pub end: RunEnd,
}

impl RunReport {
    fn without_installs(initial: Vec<ToolReport>, end: RunEnd) -> Self {
        Self {
            final_statuses: initial.clone(),
            initial,
            outcomes: Vec::new(),
            end,
        }
    }

    /// Install attempts that failed
    pub fn failures(&self) -> impl Iterator<Item = &InstallOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// Tools that were installed but still do not meet their minimum on recheck
    pub fn unsatisfied(&self) -> Vec<&ToolReport> {
        self.final_statuses
            .iter()
            .filter(|report| {
                self.outcomes
                    .iter()
                    .any(|o| !o.is_failure() && o.tool() == report.spec.name)
                    && !report.status.state.satisfies_minimum()
            })
            .collect()
    }

    /// Whether the process should exit successfully
    pub fn success(&self) -> bool {
        match self.end {
            RunEnd::CheckOnly | RunEnd::AllOk | RunEnd::Cancelled => true,
            RunEnd::Installed => {
                self.failures().next().is_none() && self.unsatisfied().is_empty()
            }
            RunEnd::Interrupted => false,
        }
    }
}

pub struct Orchestrator<'a> {
    tools: &'a [ToolSpec],
    platform: PlatformInfo,
    mode: RunMode,
    checker: &'a dyn StatusCheck,
    lookup: &'a dyn VersionLookup,
    installer: &'a dyn ToolInstaller,
    prompt: &'a dyn ConfirmPrompt,
    observer: &'a dyn RunObserver,
    interrupt: Interrupt,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        tools: &'a [ToolSpec],
        platform: PlatformInfo,
        mode: RunMode,
        checker: &'a dyn StatusCheck,
        lookup: &'a dyn VersionLookup,
        installer: &'a dyn ToolInstaller,
    ) -> Self {
        Self {
            tools,
            platform,
            mode,
            checker,
            lookup,
            installer,
            prompt: &Decline,
            observer: &Silent,
            interrupt: Interrupt::new(),
        }
    }

    /// Prompt used in interactive mode, [`Decline`] unless set
    pub fn with_prompt(mut self, prompt: &'a dyn ConfirmPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn RunObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Stop between steps once `interrupt` is raised
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    fn check_all(&self) -> Vec<ToolReport> {
        self.tools
            .iter()
            .map(|spec| ToolReport {
                spec: *spec,
                status: self.checker.check(spec),
            })
            .collect()
    }

    pub fn run(&self) -> Result<RunReport> {
        let initial = self.check_all();
        self.observer.checked(&initial);

        if self.mode == RunMode::CheckOnly {
            return Ok(RunReport::without_installs(initial, RunEnd::CheckOnly));
        }

        let pending: Vec<&ToolReport> = initial
            .iter()
            .filter(|report| report.status.state.needs_install())
            .collect();
        if pending.is_empty() {
            return Ok(RunReport::without_installs(initial, RunEnd::AllOk));
        }

        let mut plan = Vec::with_capacity(pending.len());
        for report in pending {
            if self.interrupt.is_raised() {
                return Ok(RunReport::without_installs(initial, RunEnd::Interrupted));
            }
            plan.push(PlannedInstall {
                spec: report.spec,
                current: report.status.clone(),
                target: resolve_version(self.lookup, &report.spec),
            });
        }
        self.observer.planned(&plan);

        if self.mode == RunMode::Interactive {
            let message = if plan.len() == 1 {
                format!("Install {}?", plan[0].spec.name)
            } else {
                format!("Install {} tools?", plan.len())
            };
            if !self.prompt.confirm(&message)? {
                let end = if self.interrupt.is_raised() {
                    RunEnd::Interrupted
                } else {
                    RunEnd::Cancelled
                };
                return Ok(RunReport::without_installs(initial, end));
            }
        }

        // One failure never stops the remaining installs, an interrupt does
        let mut outcomes = Vec::with_capacity(plan.len());
        let mut end = RunEnd::Installed;
        for item in &plan {
            if self.interrupt.is_raised() {
                end = RunEnd::Interrupted;
                break;
            }
            self.observer.installing(&item.spec, &item.target);
            let outcome = self
                .installer
                .install(&item.spec, &self.platform, &item.target.version);
            self.observer.installed(&outcome);
            let interrupted = matches!(
                outcome,
                InstallOutcome::Failed {
                    error: InstallError::Interrupted,
                    ..
                }
            );
            outcomes.push(outcome);
            if interrupted {
                end = RunEnd::Interrupted;
                break;
            }
        }

        let final_statuses = if outcomes.is_empty() {
            initial.clone()
        } else {
            self.check_all()
        };

        Ok(RunReport {
            initial,
            outcomes,
            final_statuses,
            end,
        })
    }
}
