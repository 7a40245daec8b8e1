use crate::alias::AliasTable;
use crate::classifier::{is_operator, is_reserved_keyword, is_valid_name, keyword_eq};
use crate::error::ExtractError;
use crate::reader::TokenReader;
use crate::references::References;
use crate::scope::{ActiveTables, ScopeStack};
use crate::state::{ParserState, StatePair, Transition};

/// Outcome of scanning one statement.
///
/// `references` holds everything found before the scan ended, whether or
/// not it ended cleanly.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub references: References,
    pub error: Option<ExtractError>,
}

impl Extraction {
    /// Whether the whole statement was scanned.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Tables and `table.column` references in `statement`.
///
/// A malformed statement yields whatever was collected before the problem.
/// Use [`extract`] to learn whether that happened.
pub fn process_query(statement: &str) -> References {
    extract(statement).references
}

/// Like [`process_query`], but also reports why the scan stopped early.
pub fn extract(statement: &str) -> Extraction {
    Extractor::new(statement).run()
}

/// Per-statement scanning state. Nothing here outlives one statement.
struct Extractor<'a> {
    reader: TokenReader<'a>,
    states: StatePair,
    active_tables: ActiveTables,
    aliases: AliasTable,
    scopes: ScopeStack,
    references: References,
    /// Set by SELECT/UNION; empties `active_tables` before the next token
    /// that does not itself change state.
    pending_clear: bool,
}

impl<'a> Extractor<'a> {
    fn new(statement: &'a str) -> Self {
        Self {
            reader: TokenReader::new(statement),
            states: StatePair::default(),
            active_tables: ActiveTables::new(),
            aliases: AliasTable::new(),
            scopes: ScopeStack::new(),
            references: References::new(),
            pending_clear: false,
        }
    }

    fn run(mut self) -> Extraction {
        let error = self.scan().err();
        if let Some(ref err) = error {
            log::warn!("stopped early: {}", err);
        }
        Extraction {
            references: self.references,
            error,
        }
    }

    fn scan(&mut self) -> Result<(), ExtractError> {
        while let Some(token) = self.reader.next_valid_token()? {
            self.step(token)?;
        }
        Ok(())
    }

    fn step(&mut self, token: &'a str) -> Result<(), ExtractError> {
        match token {
            "(" => return self.open_paren(),
            ")" => {
                self.close_paren();
                return Ok(());
            }
            _ => {}
        }

        if let Some(transition) = Transition::for_token(token) {
            if transition == Transition::Restart {
                self.pending_clear = true;
            }
            if self.states.apply(transition) {
                log::trace!(
                    "{:?} -> {:?} on {:?}",
                    self.states.previous,
                    self.states.current,
                    token
                );
                return Ok(());
            }
        }

        if std::mem::take(&mut self.pending_clear) {
            self.active_tables.clear();
        }

        if is_reserved_keyword(token) || is_operator(token) || token == "," || token == ";" {
            return Ok(());
        }

        match self.states.current {
            ParserState::From => self.from_clause(token),
            ParserState::Where => self.where_clause(token),
            ParserState::None | ParserState::Select => Ok(()),
        }
    }

    /// A subquery scope opens only when the parenthesis is followed by SELECT.
    fn open_paren(&mut self) -> Result<(), ExtractError> {
        let next = self.reader.next_valid_token()?;
        if self
            .scopes
            .enter_parenthesis(next, &mut self.states, &mut self.active_tables)
        {
            log::debug!("entered subquery, depth {}", self.scopes.depth());
        }
        if let Some(token) = next {
            self.reader.push_back(token);
        }
        Ok(())
    }

    fn close_paren(&mut self) {
        if let Some(frame) = self.scopes.exit_parenthesis() {
            self.states = frame.states;
            self.active_tables = frame.active_tables;
            log::debug!("left subquery, depth {}", self.scopes.depth());
        }
    }

    /// Table list entries: `t`, `t alias` or `t AS alias`.
    fn from_clause(&mut self, table: &'a str) -> Result<(), ExtractError> {
        if !is_valid_name(table) {
            return Ok(());
        }

        let alias = match self.reader.next_valid_token()? {
            Some(next) if keyword_eq(next, "AS") => match self.reader.next_valid_token()? {
                Some(alias) if is_valid_name(alias) => alias,
                _ => {
                    return Err(ExtractError::MalformedAlias {
                        position: self.reader.position(),
                    })
                }
            },
            Some(next) if is_valid_name(next) => next,
            next => {
                // Not ours; the driver decides what it means.
                if let Some(token) = next {
                    self.reader.push_back(token);
                }
                ""
            }
        };

        self.active_tables.push(table.into());
        self.aliases.register(table, alias);
        Ok(())
    }

    /// Column references: `alias.col`, `table.col` or a bare `col`.
    fn where_clause(&mut self, name: &'a str) -> Result<(), ExtractError> {
        if !is_valid_name(name) {
            return Ok(());
        }

        match self.reader.next_valid_token()? {
            Some(".") => {
                let column = match self.reader.next_valid_token()? {
                    Some(column) if is_valid_name(column) => column,
                    _ => {
                        return Err(ExtractError::MalformedComposite {
                            position: self.reader.position(),
                        })
                    }
                };
                let table = self.aliases.resolve(name);
                self.references.add_table_column(table, column);
            }
            next => {
                if let Some(token) = next {
                    self.reader.push_back(token);
                }
                self.record_bare_column(name);
            }
        }
        Ok(())
    }

    /// With exactly one table in scope the column belongs to it. Otherwise
    /// every table in scope counts as referenced and the column stays
    /// unqualified.
    fn record_bare_column(&mut self, column: &str) {
        if let [table] = self.active_tables.as_slice() {
            self.references.add_table_column(table, column);
            return;
        }
        for table in &self.active_tables {
            self.references.add_table(table);
        }
        self.references.add_bare_column(column);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(refs: &References) -> Vec<&str> {
        refs.tables().collect()
    }

    fn columns(refs: &References) -> Vec<&str> {
        refs.table_columns().collect()
    }

    #[test]
    fn test_qualified_column() {
        let refs = process_query("select name from emp where emp.id=5");
        assert_eq!(tables(&refs), vec!["emp"]);
        assert_eq!(columns(&refs), vec!["emp.id"]);
    }

    #[test]
    fn test_as_alias() {
        let refs = process_query("select t.name from employee as t where t.id>9");
        assert_eq!(tables(&refs), vec!["employee"]);
        assert_eq!(columns(&refs), vec!["employee.id"]);
    }

    #[test]
    fn test_uppercase_as_alias() {
        let refs = process_query("SELECT t.name FROM employee AS t WHERE t.id > 9");
        assert_eq!(columns(&refs), vec!["employee.id"]);
    }

    #[test]
    fn test_implicit_alias() {
        let refs = process_query("select * from employee e, dept d where e.dept_id = d.id");
        assert_eq!(tables(&refs), vec!["employee", "dept"]);
        assert_eq!(columns(&refs), vec!["employee.dept_id", "dept.id"]);
    }

    #[test]
    fn test_table_names_used_as_qualifiers() {
        let refs = process_query("select * from t1,t2 where t1.x>t2.y");
        assert_eq!(tables(&refs), vec!["t1", "t2"]);
        assert_eq!(columns(&refs), vec!["t1.x", "t2.y"]);
    }

    #[test]
    fn test_bare_column_single_table() {
        let refs = process_query("select rollno from class where rollno>9");
        assert_eq!(tables(&refs), vec!["class"]);
        assert_eq!(columns(&refs), vec!["class.rollno"]);
    }

    #[test]
    fn test_bare_column_multiple_tables() {
        let refs = process_query("select * from a,b where flag=1");
        assert_eq!(tables(&refs), vec!["a", "b"]);
        assert_eq!(columns(&refs), vec!["flag"]);
    }

    #[test]
    fn test_bare_column_without_tables() {
        let refs = process_query("where flag = 1");
        assert_eq!(refs.table_count(), 0);
        assert_eq!(columns(&refs), vec!["flag"]);
    }

    #[test]
    fn test_max_is_transparent() {
        let refs = process_query("select * from sales where max(amount) > 100");
        assert!(refs.contains_table_column("sales.amount"));
    }

    #[test]
    fn test_select_list_is_ignored() {
        let refs = process_query("select a, b, c from t");
        assert_eq!(tables(&refs), Vec::<&str>::new());
        assert!(refs.is_empty());
    }

    #[test]
    fn test_join_on_columns() {
        let refs = process_query(
            "select * from orders o inner join customers c on o.cust_id = c.id where o.total > 10",
        );
        assert_eq!(tables(&refs), vec!["orders", "customers"]);
        assert_eq!(
            columns(&refs),
            vec!["orders.cust_id", "customers.id", "orders.total"]
        );
    }

    #[test]
    fn test_order_by_column() {
        let refs = process_query("select name from emp where emp.age > 30 order by emp.name");
        assert_eq!(columns(&refs), vec!["emp.age", "emp.name"]);
    }

    #[test]
    fn test_subquery_restores_outer_scope() {
        let refs = process_query(
            "select * from emp where dept_id in (select id from dept where dname = 'x') and salary > 10",
        );
        assert_eq!(tables(&refs), vec!["emp", "dept"]);
        assert_eq!(
            columns(&refs),
            vec!["emp.dept_id", "dept.dname", "emp.salary"]
        );
    }

    #[test]
    fn test_subquery_alias_visible_afterwards() {
        let refs = process_query(
            "select * from a where a.id in (select b.aid from bbb as b where b.z = 1) and b.k = 2",
        );
        assert_eq!(tables(&refs), vec!["a", "bbb"]);
        assert_eq!(columns(&refs), vec!["a.id", "bbb.z", "bbb.k"]);
    }

    #[test]
    fn test_plain_parentheses_are_transparent() {
        let refs = process_query("select * from coupon c where c.id=5 and (c.roll>9)");
        assert_eq!(columns(&refs), vec!["coupon.id", "coupon.roll"]);
    }

    #[test]
    fn test_unmatched_close_paren_is_ignored() {
        let refs = process_query("select * from t where ) x = 1");
        assert_eq!(columns(&refs), vec!["t.x"]);
    }

    #[test]
    fn test_derived_table_close_paren_read_as_alias() {
        // `)` binds as the alias of `t`, so `as` is taken for a table named "as".
        let refs = process_query("select * from (select id from t) as s where s.id = 1");
        assert_eq!(tables(&refs), vec!["as"]);
        assert_eq!(columns(&refs), vec!["as.id"]);
    }

    #[test]
    fn test_union_clears_active_tables() {
        let refs =
            process_query("select a from t1 where x = 1 union select b from t2, t3 where y = 2");
        assert_eq!(tables(&refs), vec!["t1", "t2", "t3"]);
        assert_eq!(columns(&refs), vec!["t1.x", "y"]);
    }

    #[test]
    fn test_concat_span_skipped_and_scan_resumes() {
        let refs = process_query("select * from t where concat(first, last) = x and y > 1");
        assert_eq!(tables(&refs), vec!["t"]);
        assert_eq!(columns(&refs), vec!["t.x", "t.y"]);
        assert!(!refs.contains_table_column("t.first"));
    }

    #[test]
    fn test_backtick_identifiers() {
        let refs = process_query("select * from `order items` oi where oi.`qty` > 1");
        assert_eq!(tables(&refs), vec!["order items"]);
        assert_eq!(columns(&refs), vec!["order items.qty"]);
    }

    #[test]
    fn test_malformed_alias_aborts() {
        let result = extract("select * from emp as where x = 1");
        assert!(!result.is_complete());
        assert!(matches!(
            result.error,
            Some(ExtractError::MalformedAlias { .. })
        ));
        assert!(result.references.is_empty());
    }

    #[test]
    fn test_malformed_composite_keeps_partial_result() {
        let result = extract("select * from emp where emp.id = 1 and emp. = 3");
        assert!(matches!(
            result.error,
            Some(ExtractError::MalformedComposite { .. })
        ));
        assert_eq!(tables(&result.references), vec!["emp"]);
        assert_eq!(columns(&result.references), vec!["emp.id"]);
    }

    #[test]
    fn test_malformed_max_keeps_partial_result() {
        let result = extract("select * from emp where emp.id = 1 and max amount");
        assert!(matches!(
            result.error,
            Some(ExtractError::MalformedFunctionWrapper { expected: '(', .. })
        ));
        assert_eq!(columns(&result.references), vec!["emp.id"]);
    }

    #[test]
    fn test_clean_statement_is_complete() {
        assert!(extract("select * from t where t.a = 1").is_complete());
        assert!(extract("").is_complete());
    }
}
