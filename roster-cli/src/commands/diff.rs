//! `roster diff <current> <target>` - show what a patch would change.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use roster_core::{Change, ItemId};

use crate::output::{self, Roster};
use crate::script;

/// Arguments for `roster diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Current items: a sequence of objects (YAML or JSON).
    pub current: PathBuf,

    /// Target: a sequence (full pass) or a ref-keyed mapping (keyed merge).
    pub target: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

/// Per-item outcome of a diff.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
struct DiffSummary {
    removed: Vec<ItemId>,
    added: Vec<ItemId>,
    retained: Vec<ItemId>,
    moved: Vec<ItemId>,
}

#[derive(Serialize)]
struct DiffReportJson<'a> {
    summary: DiffSummary,
    changes: Vec<Change>,
    order: Vec<output::PlacedJson<'a>>,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let current = script::load_value(&self.current)?;
        if !current.is_array() {
            bail!(
                "{} must contain a sequence of items",
                self.current.display()
            );
        }
        let target = script::load_value(&self.target)?;

        let mut list = output::roster();
        list.patch_value(&current)
            .context("failed to install current items")?;
        let before = list.get().to_vec();
        list.hooks_mut().take();

        list.patch_value(&target).context("failed to apply target")?;
        let changes = list.hooks_mut().take();
        let summary = summarize(&before, &list, &changes);

        if self.json {
            let payload = DiffReportJson {
                summary,
                changes,
                order: output::placed_json(&list),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize diff JSON")?
            );
            return Ok(());
        }

        if summary.is_unchanged() && list.get() == before.as_slice() {
            println!("No structural changes.");
        } else {
            for change in &changes {
                println!("{}", output::change_line(&list, change));
            }
            print_group(&list, "removed", &summary.removed);
            print_group(&list, "added", &summary.added);
            print_group(&list, "moved", &summary.moved);
            print_group(&list, "retained", &summary.retained);
        }
        output::print_order(&list);
        Ok(())
    }
}

impl DiffSummary {
    fn is_unchanged(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty() && self.moved.is_empty()
    }
}

fn summarize(before: &[ItemId], list: &Roster, changes: &[Change]) -> DiffSummary {
    let mut summary = DiffSummary::default();
    for change in changes {
        match change {
            Change::Add { item, .. } | Change::Set { item, .. } => summary.added.push(*item),
            Change::Remove { item, .. } => summary.removed.push(*item),
            Change::Move { item, .. } => summary.moved.push(*item),
            Change::Sync { removed, added, .. } => {
                summary.removed.extend(removed);
                summary.added.extend(added);
            }
        }
    }

    let after: HashSet<ItemId> = list.get().iter().copied().collect();
    for id in before {
        if !after.contains(id) && !summary.removed.contains(id) {
            // Overwritten by `set_at`, which reports no removal of its own.
            summary.removed.push(*id);
        }
    }

    let added: HashSet<ItemId> = summary.added.iter().copied().collect();
    summary.retained = list
        .get()
        .iter()
        .copied()
        .filter(|id| !added.contains(id))
        .collect();
    summary
}

fn print_group(list: &Roster, label: &str, ids: &[ItemId]) {
    if ids.is_empty() {
        return;
    }
    let names: Vec<_> = ids.iter().map(|id| output::describe(list, *id)).collect();
    println!("{:>9}: {}", label.bold(), names.join(", "));
}
