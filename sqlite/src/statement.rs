//! CRUD statement rendering.
//!
//! Builds statement text with positional `?` placeholders for values.
//! Conflict policies, `WHERE` conditions and advanced select clauses are
//! *trusted fragments*: they are inserted verbatim and bypass all escaping,
//! so they must only ever come from code the caller controls.

/// Which fields a typed select returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fields {
    /// Every field of the table, in live column order.
    All,
    /// The named fields, in the given order.
    Named(Vec<String>),
}

impl Fields {
    /// Parses `"*"` or a comma-separated field list.
    ///
    /// # Examples
    ///
    /// ```
    /// use table_schema_sqlite::Fields;
    ///
    /// assert_eq!(Fields::parse(" * "), Fields::All);
    /// assert_eq!(Fields::parse("id, name"), Fields::Named(vec!["id".into(), "name".into()]));
    /// ```
    pub fn parse(fields: &str) -> Self {
        if fields.trim() == "*" {
            Self::All
        } else {
            Self::Named(
                fields
                    .split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(String::from)
                    .collect(),
            )
        }
    }
}

impl From<&str> for Fields {
    fn from(fields: &str) -> Self {
        Self::parse(fields)
    }
}

impl From<&[&str]> for Fields {
    fn from(fields: &[&str]) -> Self {
        Self::Named(fields.iter().map(|f| f.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Fields {
    fn from(fields: [&str; N]) -> Self {
        Self::from(fields.as_slice())
    }
}

impl From<Vec<String>> for Fields {
    fn from(fields: Vec<String>) -> Self {
        Self::Named(fields)
    }
}

fn trusted(fragment: Option<&str>) -> Option<&str> {
    fragment.map(str::trim).filter(|f| !f.is_empty())
}

fn push_where(sql: &mut String, condition: Option<&str>) {
    if let Some(condition) = trusted(condition) {
        sql.push_str(" WHERE ");
        sql.push_str(condition);
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}

/// Renders `INSERT [<conflict>] INTO table (cols) VALUES (?, ...)`.
///
/// `conflict` is a trusted fragment such as `"OR REPLACE"` or
/// `"OR IGNORE"`. An insert with no columns uses `DEFAULT VALUES`.
pub fn insert_sql(table: &str, columns: &[&str], conflict: Option<&str>) -> String {
    let verb = match trusted(conflict) {
        Some(policy) => format!("INSERT {policy} INTO"),
        None => "INSERT INTO".to_string(),
    };
    if columns.is_empty() {
        return format!("{verb} {table} DEFAULT VALUES;");
    }
    format!(
        "{verb} {table} ({})\nVALUES ({});",
        columns.join(","),
        placeholders(columns.len())
    )
}

/// Renders `UPDATE table SET col=?, ... [WHERE condition]`.
pub fn update_sql(table: &str, columns: &[&str], condition: Option<&str>) -> String {
    let assignments: Vec<String> = columns.iter().map(|c| format!("{c}=?")).collect();
    let mut sql = format!("UPDATE {table} SET {}", assignments.join(","));
    push_where(&mut sql, condition);
    sql.push(';');
    sql
}

/// Renders `DELETE FROM table [WHERE condition]`.
pub fn delete_sql(table: &str, condition: Option<&str>) -> String {
    let mut sql = format!("DELETE FROM {table}");
    push_where(&mut sql, condition);
    sql.push(';');
    sql
}

/// Renders `SELECT cols FROM table [WHERE condition]`.
pub fn select_sql(table: &str, columns: &[&str], condition: Option<&str>) -> String {
    let mut sql = format!("SELECT {} FROM {table}", columns.join(","));
    push_where(&mut sql, condition);
    sql.push(';');
    sql
}

/// Renders `SELECT fields FROM table [clause]` for ad hoc queries.
///
/// Both `fields` and `clause` are trusted fragments; `clause` may hold any
/// trailing text (`WHERE ...`, `ORDER BY ...`, `LIMIT ...`).
pub fn advanced_select_sql(table: &str, fields: &str, clause: Option<&str>) -> String {
    let mut sql = format!("SELECT {fields} FROM {table}");
    if let Some(clause) = trusted(clause) {
        sql.push(' ');
        sql.push_str(clause);
    }
    sql.push(';');
    sql
}
