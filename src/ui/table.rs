use crate::item::StoredItem;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
struct ItemRow<'a> {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Created")]
    created_at: &'a str,
    #[tabled(rename = "Message")]
    message: &'a str,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// Render items newest first, as listed
pub fn items_table(items: &[StoredItem]) -> String {
    if items.is_empty() {
        return String::new();
    }

    let rows = items.iter().map(|item| ItemRow {
        id: item.id,
        created_at: &item.created_at,
        message: &item.message,
    });
    Table::new(rows).with(Style::rounded()).to_string()
}
