use super::*;
use crate::record::FieldDef;
use crate::value::ColumnSlot;

#[allow(dead_code)]
#[derive(Debug, Clone, Default)]
struct Post {
    pub id: i64,
    pub title: String,
    pub author: i64,
    pub body: String,
}

impl Record for Post {
    fn table_name(&self) -> &str {
        "test_data"
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("id", None, true),
            FieldDef::new("title", None, true),
            FieldDef::new("author", Some("author_id"), true),
            FieldDef::new("body", Some("-"), true),
        ];
        FIELDS
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::from(self.id),
            Value::from(self.title.clone()),
            Value::from(self.author),
        ]
    }

    fn slots(&mut self) -> Vec<&mut dyn ColumnSlot> {
        vec![
            &mut self.id as &mut dyn ColumnSlot,
            &mut self.title as &mut dyn ColumnSlot,
            &mut self.author as &mut dyn ColumnSlot,
        ]
    }
}

fn post() -> Post {
    Post {
        id: 123,
        title: "my post".into(),
        author: 1,
        body: "this is a test post".into(),
    }
}

/// A committed statement with `args` zero-valued arguments.
fn raw_statement(sql: &str, args: usize) -> Statement {
    let mut stmt = Statement::new(sql);
    stmt.args = vec![Value::Int(0); args];
    stmt
}

fn assert_mismatch(stmt: &Statement, expected: usize, found: usize) {
    for dialect in [Dialect::Postgres, Dialect::MySql] {
        match stmt.render(dialect) {
            Err(Error::ArgumentCountMismatch {
                expected: e,
                found: f,
            }) => assert_eq!((e, f), (expected, found), "{dialect:?}"),
            other => panic!("expected argument count mismatch for {dialect:?}, got {other:?}"),
        }
    }
}

#[test]
fn renders_one_argument() {
    let stmt = raw_statement("This query expects ? one arg", 1);
    assert_eq!(stmt.postgres_sql().unwrap(), "This query expects $1 one arg;");
    assert_eq!(stmt.mysql_sql().unwrap(), "This query expects ? one arg;");
}

#[test]
fn mismatched_counts_fail_in_both_dialects() {
    assert_mismatch(&raw_statement("This query expects ? one arg but won't get it", 0), 1, 0);
    assert_mismatch(&raw_statement("This query expects no arguments but will get one", 1), 0, 1);
    assert_mismatch(&raw_statement("This query expects ? two args ? but will get one", 1), 2, 1);
    assert_mismatch(&raw_statement("This query expects ? ? two args but will get three", 3), 2, 3);
}

#[test]
fn mismatch_message() {
    let err = raw_statement("?", 3).mysql_sql().unwrap_err();
    assert!(err.is_argument_count_mismatch());
    assert_eq!(err.to_string(), "Expected 1 arguments, got 3.");
}

#[test]
fn numbering_is_ordered_and_one_based() {
    let stmt = raw_statement("a ? b ? c", 2);
    assert_eq!(stmt.postgres_sql().unwrap(), "a $1 b $2 c;");
    assert_eq!(stmt.mysql_sql().unwrap(), "a ? b ? c;");
}

#[test]
fn multibyte_characters_survive() {
    let stmt = raw_statement("Unicode test 世 ?", 1);
    assert_eq!(stmt.postgres_sql().unwrap(), "Unicode test 世 $1;");
    assert_eq!(stmt.mysql_sql().unwrap(), "Unicode test 世 ?;");

    let stmt = raw_statement("Unicode boundary test ? \u{80}", 1);
    assert_eq!(stmt.postgres_sql().unwrap(), "Unicode boundary test $1 \u{80};");
    assert_eq!(stmt.mysql_sql().unwrap(), "Unicode boundary test ? \u{80};");
}

#[test]
fn many_arguments() {
    let mut sql = String::from("lots of args");
    let mut postgres = sql.clone();
    for i in 1..=1000 {
        sql.push_str(" ?");
        postgres.push_str(&format!(" ${i}"));
        if i == 10 || i == 100 || i == 1000 {
            let stmt = raw_statement(&sql, i);
            assert_eq!(stmt.mysql_sql().unwrap(), format!("{sql};"));
            assert_eq!(stmt.postgres_sql().unwrap(), format!("{postgres};"));
        }
    }
}

#[test]
fn pending_expressions_need_flush() {
    let mut stmt = Statement::new("SELECT * FROM mytable WHERE");
    stmt.expression("this = ?", [0]);
    assert!(stmt.has_pending());
    assert!(stmt.postgres_sql().unwrap_err().is_needs_flush());
    assert!(stmt.mysql_sql().unwrap_err().is_needs_flush());

    stmt.flush(" ");
    assert_eq!(stmt.mysql_sql().unwrap(), "SELECT * FROM mytable WHERE this = ?;");
}

#[test]
fn rendering_is_repeatable() {
    let mut stmt = Statement::new("SELECT * FROM t");
    stmt.where_().expression("a = ?", [1]).flush(" ");
    let first = stmt.postgres_sql().unwrap();
    assert_eq!(first, stmt.postgres_sql().unwrap());
    assert_eq!(stmt.mysql_sql().unwrap(), stmt.mysql_sql().unwrap());
    assert_eq!(stmt.args(), [Value::Int(1)]);
}

#[test]
fn flush_trims_and_joins() {
    let mut stmt = Statement::new("SELECT * FROM t   ");
    stmt.where_()
        .expression("  a = ?  ", [1])
        .expression("b = ?", ["x"])
        .flush(" AND ");
    assert_eq!(stmt.sql(), "SELECT * FROM t WHERE a = ? AND b = ?");

    let mut stmt = Statement::new("SELECT 1");
    stmt.flush(", ");
    assert_eq!(stmt.sql(), "SELECT 1");
}

#[test]
fn where_is_added_once() {
    let mut stmt = Statement::new("SELECT * FROM t");
    stmt.where_().expression("a = ?", [1]).where_().flush(" ");
    stmt.where_();
    assert_eq!(stmt.mysql_sql().unwrap(), "SELECT * FROM t WHERE a = ?;");
    assert_eq!(stmt.sql().matches("WHERE").count(), 1);
}

#[test]
fn repeated_order_shares_one_clause() {
    let mut stmt = Statement::new("SELECT * FROM test_data");
    stmt.order_by("id").order_by("name").order_by_desc("date");
    let res = stmt.flush(" ").mysql_sql().unwrap();
    assert_eq!(res, "SELECT * FROM test_data ORDER BY id, name, date DESC;");
}

#[test]
fn order_continues_across_flushes() {
    let mut stmt = Statement::new("SELECT * FROM test_data");
    stmt.order_by("id").flush(" ");
    stmt.order_by_desc("name").flush(" ");
    assert_eq!(stmt.sql(), "SELECT * FROM test_data ORDER BY id, name DESC");
}

#[test]
fn offset_renders_placeholder() {
    let mut stmt = Statement::new("SELECT * FROM test_data");
    stmt.offset(10).flush(" ");
    assert_eq!(stmt.mysql_sql().unwrap(), "SELECT * FROM test_data OFFSET ?;");
    assert_eq!(stmt.postgres_sql().unwrap(), "SELECT * FROM test_data OFFSET $1;");
    assert_eq!(stmt.args(), [Value::Int(10)]);
}

#[test]
fn limit_and_offset_are_added_once() {
    let mut stmt = Statement::new("SELECT * FROM t");
    stmt.limit(5).limit(6).offset(10).offset(20).flush(" ");
    assert_eq!(stmt.postgres_sql().unwrap(), "SELECT * FROM t LIMIT $1 OFFSET $2;");
    assert_eq!(stmt.args(), [Value::Int(5), Value::Int(10)]);
}

#[test]
fn comparison_uses_qualified_column() {
    let p = post();
    let mut stmt = Statement::new("SELECT * FROM test_data");
    stmt.where_()
        .comparison(&p, "author", ">=", p.author)
        .unwrap()
        .flush(" ");
    assert_eq!(
        stmt.postgres_sql().unwrap(),
        "SELECT * FROM test_data WHERE test_data.author_id >= $1;"
    );
    assert_eq!(stmt.args(), [Value::Int(1)]);
}

#[test]
fn column_flags_are_configurable() {
    let p = post();
    let mut stmt = Statement::new("SELECT * FROM test_data");
    stmt.with_column_flags(&[Flag::Ticked])
        .where_()
        .comparison(&p, "title", "=", "x")
        .unwrap()
        .flush(" ");
    assert_eq!(stmt.mysql_sql().unwrap(), "SELECT * FROM test_data WHERE `title` = ?;");
}

#[test]
fn unknown_field_is_an_error() {
    let p = post();
    let mut stmt = Statement::new("SELECT * FROM test_data");
    let err = stmt.comparison(&p, "NotARealProperty", "=", 1).unwrap_err();
    assert!(err.is_field_not_found());
    assert!(stmt.args().is_empty());
    assert!(!stmt.has_pending());

    assert!(stmt.assign(&p, "body", "x").unwrap_err().is_field_not_found());
}

#[test]
fn in_list_binds_every_value() {
    let p = post();
    let mut stmt = Statement::new("SELECT * FROM test_data");
    stmt.where_().in_list(&p, "id", [1, 2, 3]).unwrap().flush(" ");
    assert_eq!(
        stmt.postgres_sql().unwrap(),
        "SELECT * FROM test_data WHERE test_data.id IN($1,$2,$3);"
    );
    assert_eq!(stmt.args(), [Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn empty_in_list_is_valid_sql() {
    let p = post();
    let mut stmt = Statement::new("SELECT * FROM test_data");
    stmt.where_()
        .in_list(&p, "id", Vec::<i64>::new())
        .unwrap()
        .flush(" ");
    assert_eq!(
        stmt.mysql_sql().unwrap(),
        "SELECT * FROM test_data WHERE test_data.id IN(NULL);"
    );
    assert!(stmt.args().is_empty());
}

#[test]
fn assignments_join_with_commas() {
    let p = post();
    let mut stmt = Statement::new("UPDATE test_data SET");
    stmt.with_column_flags(&[])
        .assign(&p, "title", "new")
        .unwrap()
        .assign(&p, "author", 2)
        .unwrap()
        .flush(", ");
    stmt.where_().comparison(&p, "id", "=", p.id).unwrap().flush(" ");
    assert_eq!(
        stmt.postgres_sql().unwrap(),
        "UPDATE test_data SET title = $1, author_id = $2 WHERE id = $3;"
    );
}

#[test]
fn insert_expands_every_record() {
    let mut second = post();
    second.id = 124;
    let stmt = Statement::insert(&[post(), second]).unwrap();
    assert_eq!(
        stmt.postgres_sql().unwrap(),
        "INSERT INTO test_data (id, title, author_id) VALUES ($1,$2,$3), ($4,$5,$6);"
    );
    assert_eq!(stmt.args().len(), 6);
    assert_eq!(stmt.args()[3], Value::Int(124));
}

#[test]
fn insert_requires_records() {
    assert!(matches!(Statement::insert::<Post>(&[]), Err(Error::NoRecords)));
}

#[test]
fn update_assigns_all_columns() {
    let p = post();
    let mut stmt = Statement::update(&p);
    stmt.where_().comparison(&p, "id", "=", p.id).unwrap().flush(" ");
    assert_eq!(
        stmt.mysql_sql().unwrap(),
        "UPDATE test_data SET id = ?, title = ?, author_id = ? WHERE test_data.id = ?;"
    );
    assert_eq!(stmt.args()[1], Value::Text("my post".into()));
}

#[test]
fn select_lists_decorated_columns() {
    let p = post();
    let mut stmt = Statement::select(&p, &[Flag::Full, Flag::Ticked]);
    stmt.where_()
        .comparison(&p, "id", "=", 123)
        .unwrap()
        .flush(" ")
        .order_by_desc("id")
        .limit(19)
        .flush(" ");
    assert_eq!(
        stmt.postgres_sql().unwrap(),
        "SELECT `test_data`.`id`, `test_data`.`title`, `test_data`.`author_id` FROM test_data \
         WHERE test_data.id = $1 ORDER BY id DESC LIMIT $2;"
    );
}

#[test]
fn debug_string_substitutes_arguments() {
    let mut stmt = Statement::new("SELECT * FROM t");
    stmt.where_()
        .expression("a = ? AND b = ?", [Value::from(1), Value::from("x")])
        .flush(" ");
    assert_eq!(stmt.debug_string(), "SELECT * FROM t WHERE a = 1 AND b = x");

    let stmt = Statement::new("a = ? AND b = ?");
    assert_eq!(stmt.to_string(), "a = !{MISSING} AND b = !{MISSING}");
}

#[test]
fn into_parts_returns_text_and_args() {
    let mut stmt = Statement::new("SELECT ?");
    stmt.args.push(Value::Bool(true));
    let (sql, args) = stmt.into_parts();
    assert_eq!(sql, "SELECT ?");
    assert_eq!(args, vec![Value::Bool(true)]);
}

#[test]
fn dialect_placeholders() {
    assert_eq!(Dialect::Postgres.placeholder(12), "$12");
    assert_eq!(Dialect::MySql.placeholder(12), "?");
}
