//! `roster replay <script>` - run a script and print every notification.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use roster_core::{Change, ItemFactory, ListError, RecordFactory};

use crate::output::{self, Roster};
use crate::script::{self, Step};

/// Arguments for `roster replay`.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Script file (YAML or JSON).
    pub script: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StepReport {
    step: String,
    changes: Vec<Change>,
}

#[derive(Serialize)]
struct ReplayReportJson<'a> {
    steps: Vec<StepReport>,
    order: Vec<output::PlacedJson<'a>>,
}

impl ReplayArgs {
    pub fn run(self) -> Result<()> {
        let script = script::load(&self.script)?;
        let mut list = output::roster();
        let mut reports = Vec::new();

        if !script.initial.is_empty() {
            list.patch_value(&Value::Array(script.initial.clone()))
                .context("failed to install initial items")?;
            self.report(&mut list, &mut reports, "initial".to_string());
        }

        for (n, step) in script.steps.iter().enumerate() {
            apply(&mut list, step)
                .with_context(|| format!("step {} ({}) failed", n + 1, step.label()))?;
            self.report(&mut list, &mut reports, format!("{}. {}", n + 1, step.label()));
        }

        if self.json {
            let payload = ReplayReportJson {
                steps: reports,
                order: output::placed_json(&list),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize replay JSON")?
            );
            return Ok(());
        }

        println!("{}", "final order".bold());
        output::print_order(&list);
        Ok(())
    }

    /// Drains the hook log into `reports`, printing it unless in JSON mode.
    fn report(&self, list: &mut Roster, reports: &mut Vec<StepReport>, step: String) {
        let changes = list.hooks_mut().take();
        if !self.json {
            println!("{}", step.bold());
            if changes.is_empty() {
                println!("  {}", "no changes".bright_black());
            }
            for change in &changes {
                println!("  {}", output::change_line(list, change));
            }
        }
        reports.push(StepReport { step, changes });
    }
}

fn apply(list: &mut Roster, step: &Step) -> Result<()> {
    match step {
        Step::Patch(value) => list.patch_value(value)?,
        Step::Add(value) => {
            list.ingest(script::ingest(value)?)?;
        }
        Step::Insert { at, item } => {
            if *at > list.len() {
                return Err(ListError::IndexOutOfBounds {
                    op: "add_at",
                    index: *at,
                    len: list.len(),
                }
                .into());
            }
            let fields = script::fields(item)?;
            let record = RecordFactory.create_item(&fields)?;
            let id = list.insert(record);
            list.add_at(id, *at)?;
        }
        Step::Move { item_ref, to } => {
            let id = list
                .find_ref(item_ref)
                .with_context(|| format!("no placed item with ref '{item_ref}'"))?;
            list.set_at(id, *to)?;
        }
        Step::Remove { item_ref } => {
            if let Some(id) = list.find_ref(item_ref) {
                list.remove(id);
            } else {
                tracing::debug!("remove: no placed item with ref {item_ref:?}");
            }
        }
        Step::RemoveAt(index) => {
            list.remove_at(*index);
        }
        Step::Clear => list.clear(),
    }
    Ok(())
}
