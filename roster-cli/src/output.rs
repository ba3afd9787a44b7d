//! Human and JSON rendering shared by the commands.

use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use roster_core::{Change, ChangeLog, ItemId, ObjectList, Record, RecordFactory};

/// The list every command drives.
pub type Roster = ObjectList<RecordFactory, ChangeLog>;

pub fn roster() -> Roster {
    ObjectList::with_hooks(RecordFactory, ChangeLog::new())
}

/// `#3 (a)` for keyed items, `#3` otherwise.
pub fn describe(list: &Roster, id: ItemId) -> String {
    match list.item(id).and_then(|r| r.item_ref.as_deref()) {
        Some(r) => format!("{id} ({r})"),
        None => id.to_string(),
    }
}

fn describe_all(list: &Roster, ids: &[ItemId]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(|id| describe(list, *id))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn change_line(list: &Roster, change: &Change) -> String {
    match change {
        Change::Add { item, index } => {
            format!("{} add {} at {index}", "+".green().bold(), describe(list, *item))
        }
        Change::Remove { item, index } => {
            format!("{} remove {} from {index}", "-".red().bold(), describe(list, *item))
        }
        Change::Set { item, index } => {
            format!("{} set {} at {index}", "=".yellow().bold(), describe(list, *item))
        }
        Change::Move { item, from, to } => {
            format!(
                "{} move {} {from} -> {to}",
                "~".cyan().bold(),
                describe(list, *item)
            )
        }
        Change::Sync { removed, added, order } => {
            format!(
                "{} sync removed [{}] added [{}] order [{}]",
                "*".magenta().bold(),
                describe_all(list, removed),
                describe_all(list, added),
                describe_all(list, order),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Final order
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct PlacedJson<'a> {
    pub index: usize,
    pub id: ItemId,
    #[serde(flatten)]
    pub record: &'a Record,
}

pub fn placed_json(list: &Roster) -> Vec<PlacedJson<'_>> {
    list.iter()
        .enumerate()
        .map(|(index, (id, record))| PlacedJson { index, id, record })
        .collect()
}

#[derive(Tabled)]
struct OrderTableRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "ref")]
    item_ref: String,
    #[tabled(rename = "fields")]
    fields: String,
}

pub fn print_order(list: &Roster) {
    if list.is_empty() {
        println!("{}", "(empty)".bright_black());
        return;
    }
    let rows: Vec<OrderTableRow> = list
        .iter()
        .enumerate()
        .map(|(index, (id, record))| OrderTableRow {
            index,
            id: id.to_string(),
            item_ref: record.item_ref.clone().unwrap_or_default(),
            fields: serde_json::Value::Object(record.fields.clone()).to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
