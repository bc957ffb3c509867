//! Interactive menu session.
//!
//! The console only moves strings in and rendered results out. Every decision about
//! tables, columns, types and relationships is delegated to the `db` layer.

pub mod prompt;
pub mod render;

pub use prompt::{LinePrompt, Prompt};
pub use render::{OutputFormat, Renderer, TerminalRenderer};

use crate::coerce::{CoercionError, coerce};
use crate::db::{
    AnalyticalQuery, CrudExecutor, DataGenerator, Database, IntegrityGuard, ReportRunner,
    SchemaCatalog,
};
use crate::error::DbError;
use crate::models::{ColumnInfo, RowData, Table, Value};
use std::io;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default number of attempts at entering a valid record.
pub const DEFAULT_MAX_INPUT_ATTEMPTS: u32 = 3;

const MENU: &[(&str, &str)] = &[
    ("1", "List tables"),
    ("2", "Show table"),
    ("3", "Find record by primary key"),
    ("4", "Add record"),
    ("5", "Update record"),
    ("6", "Delete record"),
    ("7", "Generate test data"),
    ("8", "Analytical reports"),
    ("9", "Check for child rows"),
    ("0", "Exit"),
];

/// Whether the session keeps going after a menu action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Failure of a single menu action.
///
/// Database errors are shown to the operator and the session continues; I/O errors
/// (including end of input) end the session.
#[derive(Debug, Error)]
enum ActionError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<CoercionError> for ActionError {
    fn from(err: CoercionError) -> Self {
        Self::Db(err.into())
    }
}

type ActionResult<T = ()> = Result<T, ActionError>;

/// One operator session over an open database.
pub struct Console<P, R> {
    prompt: P,
    renderer: R,
    db: Database,
    executor: CrudExecutor,
    generator: DataGenerator,
    max_input_attempts: u32,
}

impl<P: Prompt, R: Renderer> Console<P, R> {
    pub fn new(prompt: P, renderer: R, db: Database) -> Self {
        Self {
            prompt,
            renderer,
            db,
            executor: CrudExecutor::new(),
            generator: DataGenerator::new(),
            max_input_attempts: DEFAULT_MAX_INPUT_ATTEMPTS,
        }
    }

    pub fn with_executor(mut self, executor: CrudExecutor) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_generator(mut self, generator: DataGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_max_input_attempts(mut self, attempts: u32) -> Self {
        self.max_input_attempts = attempts.max(1);
        self
    }

    /// Give back the prompt, renderer and database handle.
    pub fn into_parts(self) -> (P, R, Database) {
        (self.prompt, self.renderer, self.db)
    }

    /// Show the menu until the operator exits or input ends.
    pub async fn run(&mut self) -> io::Result<()> {
        self.renderer.banner("Supply management console")?;

        loop {
            self.renderer.menu(MENU)?;
            let choice = match self.prompt.required("Choose an option") {
                Ok(choice) => choice,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e),
            };

            match self.dispatch(&choice).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e),
            }
        }

        self.renderer.message("Goodbye!")
    }

    /// Run one menu action.
    pub async fn dispatch(&mut self, choice: &str) -> io::Result<Flow> {
        let choice = choice.trim();
        debug!(choice, "Menu action");

        let result = match choice {
            "1" => self.list_tables().await,
            "2" => self.show_table().await,
            "3" => self.show_record().await,
            "4" => self.add_record().await,
            "5" => self.update_record().await,
            "6" => self.delete_record().await,
            "7" => self.generate().await,
            "8" => self.run_report().await,
            "9" => self.check_children().await,
            "0" => return Ok(Flow::Exit),
            _ => {
                self.renderer.error("Unknown option, choose 0-9.")?;
                return Ok(Flow::Continue);
            }
        };

        match result {
            Ok(()) => {}
            Err(ActionError::Io(e)) => return Err(e),
            Err(ActionError::Db(e)) => self.render_db_error(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn render_db_error(&mut self, err: &DbError) -> io::Result<()> {
        if err.is_rejection() {
            debug!(error = %err, "Operation rejected");
        } else {
            warn!(error = %err, "Operation failed");
        }
        self.renderer.error(&err.to_string())?;
        if let Some(suggestion) = err.suggestion() {
            self.renderer.message(&format!("Suggestion: {}", suggestion))?;
        }
        Ok(())
    }

    async fn list_tables(&mut self) -> ActionResult {
        let tables = SchemaCatalog::list_tables(&self.db).await?;
        self.renderer.tables(&tables)?;
        Ok(())
    }

    async fn show_table(&mut self) -> ActionResult {
        let table = self.ask_table()?;
        let rows = self.executor.select_all(&self.db, table, None).await?;
        self.renderer.rows(&rows)?;
        Ok(())
    }

    async fn show_record(&mut self) -> ActionResult {
        let table = self.ask_table()?;
        let (pk, value) = self.ask_primary_key(table).await?;
        let row = self
            .executor
            .select_by_primary_key(&self.db, table, &pk, &value)
            .await?;
        self.renderer.row(row.as_ref())?;
        Ok(())
    }

    async fn add_record(&mut self) -> ActionResult {
        let table = self.ask_table()?;
        let columns = SchemaCatalog::columns_info(&self.db, table).await?;
        let pk = SchemaCatalog::primary_key(&self.db, table).await?;
        let fields: Vec<ColumnInfo> = columns
            .into_iter()
            .filter(|c| pk.as_deref() != Some(c.name.as_str()))
            .collect();

        let Some(row) = self.collect_record(&fields, None)? else {
            self.renderer.message("Cancelled.")?;
            return Ok(());
        };

        IntegrityGuard::check_parents(&self.db, table, &row).await?;
        self.executor.insert(&self.db, table, &row).await?;
        info!(table = %table, "Record added");
        self.renderer.success("Record added.")?;
        Ok(())
    }

    async fn update_record(&mut self) -> ActionResult {
        let table = self.ask_table()?;
        let (pk, pk_value) = self.ask_primary_key(table).await?;
        let Some(current) = self
            .executor
            .select_by_primary_key(&self.db, table, &pk, &pk_value)
            .await?
        else {
            self.renderer.row(None)?;
            return Ok(());
        };
        self.renderer.row(Some(&current))?;
        self.renderer.message("Press Enter to keep the current value.")?;

        let fields: Vec<ColumnInfo> = SchemaCatalog::columns_info(&self.db, table)
            .await?
            .into_iter()
            .filter(|c| c.name != pk)
            .collect();

        let Some(changes) = self.collect_record(&fields, Some(&current))? else {
            self.renderer.message("Cancelled.")?;
            return Ok(());
        };
        if changes.is_empty() {
            self.renderer.message("Nothing changed.")?;
            return Ok(());
        }

        let affected = self
            .executor
            .update(&self.db, table, &pk, &pk_value, &changes)
            .await?;
        info!(table = %table, affected, "Record updated");
        self.renderer.success("Record updated.")?;
        Ok(())
    }

    async fn delete_record(&mut self) -> ActionResult {
        let table = self.ask_table()?;
        let (pk, value) = self.ask_primary_key(table).await?;

        IntegrityGuard::check_no_dependents(&self.db, table, &pk, &value).await?;

        let answer = self
            .prompt
            .required(&format!("Delete {}={} from {}? (y/n)", pk, value, table))?;
        if !is_yes(&answer) {
            self.renderer.message("Cancelled.")?;
            return Ok(());
        }

        let affected = self.executor.delete(&self.db, table, &pk, &value).await?;
        if affected == 0 {
            self.renderer.row(None)?;
        } else {
            info!(table = %table, "Record deleted");
            self.renderer.success("Record deleted.")?;
        }
        Ok(())
    }

    async fn generate(&mut self) -> ActionResult {
        let raw = self.prompt.required("Number of rows per table")?;
        let count = match raw.parse::<usize>() {
            Ok(count) if count > 0 => count,
            _ => {
                return Err(DbError::invalid_input(format!(
                    "'{}' is not a positive number of rows",
                    raw
                ))
                .into());
            }
        };

        for (table, result) in self.generator.generate_all(&self.db, count).await {
            match result {
                Ok(report) if report.inserted < report.requested => {
                    self.renderer.message(&format!(
                        "{}: inserted {} of {} rows, not enough parent rows for more",
                        table, report.inserted, report.requested
                    ))?;
                }
                Ok(report) => {
                    self.renderer.success(&format!(
                        "{}: inserted {} rows starting at id {}",
                        table, report.inserted, report.first_id
                    ))?;
                }
                Err(e) => {
                    self.renderer.error(&format!("{}: {}", table, e))?;
                }
            }
        }
        Ok(())
    }

    async fn run_report(&mut self) -> ActionResult {
        let keys: Vec<String> = (1..=AnalyticalQuery::ALL.len())
            .map(|i| i.to_string())
            .collect();
        let entries: Vec<(&str, &str)> = keys
            .iter()
            .zip(AnalyticalQuery::ALL)
            .map(|(key, query)| (key.as_str(), query.title()))
            .collect();
        self.renderer.menu(&entries)?;

        let choice = self.prompt.required("Choose a report")?;
        let query = AnalyticalQuery::from_choice(&choice).ok_or_else(|| {
            DbError::invalid_input(format!("'{}' is not a report number", choice))
        })?;

        let report = ReportRunner::run(&self.db, query).await?;
        self.renderer.query_result(&report)?;
        Ok(())
    }

    async fn check_children(&mut self) -> ActionResult {
        let table = self.ask_table()?;
        let (pk, value) = self.ask_primary_key(table).await?;
        if IntegrityGuard::has_child_rows(&self.db, table, &pk, &value).await? {
            self.renderer.message("Child rows exist.")?;
        } else {
            self.renderer.message("No child rows.")?;
        }
        Ok(())
    }

    fn ask_table(&mut self) -> ActionResult<Table> {
        let name = self
            .prompt
            .required(&format!("Table ({})", Table::allowed_names()))?;
        Ok(name.parse::<Table>()?)
    }

    /// Primary-key column of `table` and the operator's value for it, typed for the column.
    async fn ask_primary_key(&mut self, table: Table) -> ActionResult<(String, Value)> {
        let pk = SchemaCatalog::require_primary_key(&self.db, table).await?;
        let mut column = SchemaCatalog::resolve_column(&self.db, table, &pk).await?;
        column.nullable = false;

        let raw = self.prompt.required(&format!("{} value", pk))?;
        let value = coerce(Some(raw.as_str()), &column)?;
        Ok((pk, value))
    }

    /// Collect one value per field, re-asking for the whole record after an invalid
    /// entry.
    ///
    /// With `current`, empty input keeps the existing value and is left out of the
    /// result. Returns `None` when the operator gives up or the attempts run out.
    fn collect_record(
        &mut self,
        fields: &[ColumnInfo],
        current: Option<&RowData>,
    ) -> io::Result<Option<RowData>> {
        for attempt in 1..=self.max_input_attempts {
            match self.collect_once(fields, current)? {
                Ok(row) => return Ok(Some(row)),
                Err(e) => {
                    debug!(attempt, error = %e, "Invalid record input");
                    self.renderer.error(&e.to_string())?;
                }
            }

            if attempt == self.max_input_attempts {
                self.renderer.error("Too many invalid attempts.")?;
                break;
            }
            let again = self.prompt.required("Try again? (y/n)")?;
            if !is_yes(&again) {
                break;
            }
        }
        Ok(None)
    }

    fn collect_once(
        &mut self,
        fields: &[ColumnInfo],
        current: Option<&RowData>,
    ) -> io::Result<Result<RowData, CoercionError>> {
        let mut row = RowData::new();
        for column in fields {
            let raw = self.prompt.nullable(&field_label(column, current))?;
            if current.is_some() && raw.is_none() {
                continue;
            }
            match coerce(raw.as_deref(), column) {
                Ok(value) => row.insert(column.name.clone(), value),
                Err(e) => return Ok(Err(e)),
            }
        }
        Ok(Ok(row))
    }
}

fn field_label(column: &ColumnInfo, current: Option<&RowData>) -> String {
    match current {
        Some(row) => format!(
            "{} [{}]",
            column.name,
            row.get(&column.name).unwrap_or(&Value::Null)
        ),
        None if column.nullable => format!("{} ({}, optional)", column.name, column.declared_type),
        None => format!("{} ({})", column.name, column.declared_type),
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("n"));
        assert!(!is_yes(""));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn test_field_label() {
        let column = ColumnInfo::new("email", "VARCHAR(100)", true);
        assert_eq!(field_label(&column, None), "email (VARCHAR(100), optional)");

        let column = ColumnInfo::new("min_stock", "INTEGER", false);
        assert_eq!(field_label(&column, None), "min_stock (INTEGER)");

        let current = RowData::new().with("min_stock", 10i64);
        assert_eq!(field_label(&column, Some(&current)), "min_stock [10]");
    }

    #[test]
    fn test_menu_covers_all_actions() {
        let keys: Vec<&str> = MENU.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"]);
    }
}
