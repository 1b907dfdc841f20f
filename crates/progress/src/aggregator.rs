//! Completion aggregation over already-fetched submodules.
//!
//! Everything here is a pure function of its input and is recomputed in
//! full on every view load.

use courseflow_core::{
    CatalogSummary, Module, ModuleProgress, ProgressStatus, Submodule, SubmoduleStatus,
};
use serde::{Deserialize, Serialize};

/// A module together with its submodules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleContent {
    /// The module
    pub module: Module,
    /// Its submodules, in display order
    pub submodules: Vec<Submodule>,
}

/// A module with its computed progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleProgressEntry {
    /// The module
    pub module: Module,
    /// Computed progress
    pub progress: ModuleProgress,
}

/// Progress across the whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogProgress {
    /// Per-module progress, in catalog order
    pub modules: Vec<ModuleProgressEntry>,

    /// Completed submodules over all submodules (0-100)
    pub overall_percentage: f64,

    /// Modules per reported status
    pub summary: CatalogSummary,

    /// Modules with at least one submodule, all of them Completed
    pub completed_modules: usize,
}

/// `100 * completed / total`, or 0 for an empty set.
pub fn percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * completed as f64 / total as f64
    }
}

/// Status implied by child counts alone.
pub fn derive_status(completed: usize, in_progress: usize, total: usize) -> ProgressStatus {
    if total == 0 {
        ProgressStatus::NotStarted
    } else if completed == total {
        ProgressStatus::Completed
    } else if completed > 0 || in_progress > 0 {
        ProgressStatus::InProgress
    } else {
        ProgressStatus::NotStarted
    }
}

/// Progress of one module from its submodules.
///
/// `manually_completed` forces the reported status to Completed. It never
/// lowers a computed status and never touches the percentage.
pub fn aggregate_module(submodules: &[Submodule], manually_completed: bool) -> ModuleProgress {
    let total = submodules.len();
    let completed = count(submodules, SubmoduleStatus::Completed);
    let in_progress = count(submodules, SubmoduleStatus::InProgress);

    let status = if manually_completed {
        ProgressStatus::Completed
    } else {
        derive_status(completed, in_progress, total)
    };

    ModuleProgress {
        percentage: percentage(completed, total),
        status,
        completed,
        in_progress,
        total,
    }
}

/// Overall percentage across every submodule of every module.
pub fn aggregate_catalog(modules: &[ModuleContent]) -> f64 {
    let (completed, total) = modules
        .iter()
        .flat_map(|m| m.submodules.iter())
        .fold((0, 0), |(done, all), s| {
            let done = done + usize::from(s.status == SubmoduleStatus::Completed);
            (done, all + 1)
        });
    percentage(completed, total)
}

/// Full catalog view: per-module progress, overall ratio and counts.
pub fn summarize_catalog(modules: Vec<ModuleContent>) -> CatalogProgress {
    let overall_percentage = aggregate_catalog(&modules);

    let mut summary = CatalogSummary::default();
    let mut completed_modules = 0;
    let mut entries = Vec::with_capacity(modules.len());

    for content in modules {
        let progress = aggregate_module(&content.submodules, content.module.manually_completed);

        summary.total += 1;
        match progress.status {
            ProgressStatus::Completed => summary.completed += 1,
            ProgressStatus::InProgress => summary.in_progress += 1,
            ProgressStatus::NotStarted => summary.not_started += 1,
        }
        if progress.total > 0 && progress.completed == progress.total {
            completed_modules += 1;
        }

        entries.push(ModuleProgressEntry {
            module: content.module,
            progress,
        });
    }

    CatalogProgress {
        modules: entries,
        overall_percentage,
        summary,
        completed_modules,
    }
}

/// Group a flat submodule list under its modules, keeping module order.
///
/// Submodules whose module is not in `modules` are dropped.
pub fn group_by_module(modules: Vec<Module>, submodules: Vec<Submodule>) -> Vec<ModuleContent> {
    let mut grouped: Vec<ModuleContent> = modules
        .into_iter()
        .map(|module| ModuleContent {
            module,
            submodules: Vec::new(),
        })
        .collect();

    for sub in submodules {
        if let Some(content) = grouped.iter_mut().find(|c| c.module.id == sub.module) {
            content.submodules.push(sub);
        }
    }
    grouped
}

fn count(submodules: &[Submodule], status: SubmoduleStatus) -> usize {
    submodules.iter().filter(|s| s.status == status).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use courseflow_core::{ModuleId, SubmoduleId};

    fn module(id: &str, manually_completed: bool) -> Module {
        Module {
            id: ModuleId::from(id),
            title: format!("Module {id}"),
            description: String::new(),
            category: String::new(),
            order: 0,
            thumbnail: None,
            manually_completed,
            created: None,
            updated: None,
        }
    }

    fn sub(module: &str, status: SubmoduleStatus) -> Submodule {
        Submodule {
            id: SubmoduleId::new(),
            title: "Lesson".to_string(),
            description: String::new(),
            order: 0,
            module: ModuleId::from(module),
            status,
        }
    }

    use courseflow_core::SubmoduleStatus::{Completed, InProgress, Pending};

    #[test]
    fn test_two_of_three_completed() {
        let subs = vec![sub("m", Completed), sub("m", Completed), sub("m", Pending)];
        let p = aggregate_module(&subs, false);
        assert!((p.percentage - 66.67).abs() < 0.01);
        assert_eq!(p.status, ProgressStatus::InProgress);
        assert_eq!((p.completed, p.total), (2, 3));
    }

    #[test]
    fn test_empty_module_is_not_started() {
        let p = aggregate_module(&[], false);
        assert_eq!(p.percentage, 0.0);
        assert_eq!(p.status, ProgressStatus::NotStarted);
    }

    #[test]
    fn test_in_progress_child_starts_module() {
        let subs = vec![sub("m", InProgress), sub("m", Pending)];
        let p = aggregate_module(&subs, false);
        assert_eq!(p.percentage, 0.0);
        assert_eq!(p.status, ProgressStatus::InProgress);

        let subs = vec![sub("m", Pending), sub("m", Pending)];
        assert_eq!(aggregate_module(&subs, false).status, ProgressStatus::NotStarted);
    }

    #[test]
    fn test_all_completed() {
        let subs = vec![sub("m", Completed), sub("m", Completed)];
        let p = aggregate_module(&subs, false);
        assert_eq!(p.percentage, 100.0);
        assert_eq!(p.status, ProgressStatus::Completed);
    }

    #[test]
    fn test_override_forces_status_but_not_percentage() {
        let subs = vec![sub("m", Completed), sub("m", Pending)];
        let p = aggregate_module(&subs, true);
        assert_eq!(p.status, ProgressStatus::Completed);
        assert_eq!(p.percentage, 50.0);

        // An override on an empty module still reports Completed at 0%.
        let p = aggregate_module(&[], true);
        assert_eq!(p.status, ProgressStatus::Completed);
        assert_eq!(p.percentage, 0.0);

        // Without override, a fully completed module stays Completed.
        let subs = vec![sub("m", Completed)];
        assert_eq!(aggregate_module(&subs, false).status, ProgressStatus::Completed);
    }

    #[test]
    fn test_completed_iff_full_or_override() {
        let sets: Vec<Vec<Submodule>> = vec![
            vec![],
            vec![sub("m", Pending)],
            vec![sub("m", InProgress), sub("m", Completed)],
            vec![sub("m", Completed), sub("m", Completed), sub("m", Completed)],
        ];
        for set in &sets {
            for manual in [false, true] {
                let p = aggregate_module(set, manual);
                let expected = p.percentage == 100.0 || manual;
                assert_eq!(p.status == ProgressStatus::Completed, expected);
            }
        }
    }

    #[test]
    fn test_empty_catalog_is_zero() {
        assert_eq!(aggregate_catalog(&[]), 0.0);
        let catalog = summarize_catalog(Vec::new());
        assert_eq!(catalog.overall_percentage, 0.0);
        assert_eq!(catalog.summary, CatalogSummary::default());
        assert!(catalog.modules.is_empty());
    }

    #[test]
    fn test_catalog_flattens_submodules() {
        let modules = vec![
            ModuleContent {
                module: module("a", false),
                submodules: vec![sub("a", Completed), sub("a", Pending)],
            },
            ModuleContent {
                module: module("b", false),
                submodules: vec![sub("b", Completed), sub("b", Completed)],
            },
            ModuleContent {
                module: module("c", true),
                submodules: vec![],
            },
        ];
        assert_eq!(aggregate_catalog(&modules), 75.0);

        let catalog = summarize_catalog(modules);
        assert_eq!(catalog.overall_percentage, 75.0);
        assert_eq!(catalog.summary.total, 3);
        assert_eq!(catalog.summary.completed, 2);
        assert_eq!(catalog.summary.in_progress, 1);
        assert_eq!(catalog.summary.not_started, 0);
        // Module "c" is only completed by override.
        assert_eq!(catalog.completed_modules, 1);
    }

    #[test]
    fn test_group_by_module_keeps_order_and_drops_orphans() {
        let grouped = group_by_module(
            vec![module("b", false), module("a", false)],
            vec![sub("a", Pending), sub("b", Completed), sub("zz", Completed)],
        );
        assert_eq!(grouped[0].module.id.as_str(), "b");
        assert_eq!(grouped[0].submodules.len(), 1);
        assert_eq!(grouped[1].submodules.len(), 1);
    }
}
