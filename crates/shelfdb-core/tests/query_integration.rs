//! Integration tests for the query and mutation engines.

use shelfdb_core::catalog::{BridgeDef, EntityDef, FieldDef, FieldKind, Registry, RelationDef};
use shelfdb_core::mutation::{parse_batch, MutationEngine};
use shelfdb_core::query::QueryExecutor;
use shelfdb_core::{Database, Error};
use shelfdb_proto::{Guid, MutationBatch, MutationRequest, QueryDocument, QueryRequest, Row, Value};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Records every statement and replays queued responses in order.
#[derive(Default)]
struct MockDb {
    responses: RefCell<VecDeque<Vec<Row>>>,
    statements: RefCell<Vec<(String, Vec<Value>)>>,
    transaction_log: RefCell<Vec<&'static str>>,
    fail_execute: bool,
}

impl MockDb {
    fn respond(&self, rows: Vec<Row>) {
        self.responses.borrow_mut().push_back(rows);
    }

    fn count_row(&self, total: i64) {
        let mut row = Row::new();
        row.insert("count".to_string(), Value::Int(total));
        self.respond(vec![row]);
    }

    fn statements(&self) -> Vec<String> {
        self.statements
            .borrow()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }
}

impl Database for MockDb {
    fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>, Error> {
        self.statements
            .borrow_mut()
            .push((sql.to_string(), args.to_vec()));
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Error::Database("no queued response".to_string()))
    }

    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, Error> {
        self.statements
            .borrow_mut()
            .push((sql.to_string(), args.to_vec()));
        if self.fail_execute {
            return Err(Error::Database("constraint violation".to_string()));
        }
        Ok(1)
    }

    fn begin(&self) -> Result<(), Error> {
        self.transaction_log.borrow_mut().push("begin");
        Ok(())
    }

    fn commit(&self) -> Result<(), Error> {
        self.transaction_log.borrow_mut().push("commit");
        Ok(())
    }

    fn rollback(&self) -> Result<(), Error> {
        self.transaction_log.borrow_mut().push("rollback");
        Ok(())
    }
}

fn library_registry() -> Registry {
    let book = EntityDef::new("Book", "book", "pid")
        .with_tag(1)
        .with_field(FieldDef::new("pid", FieldKind::Guid))
        .with_field(FieldDef::new("title", FieldKind::String))
        .with_field(FieldDef::new("inPrint", FieldKind::Bool).with_column("in_print"))
        .with_field(FieldDef::new("publishedAt", FieldKind::Timestamp).with_column("published_at"))
        .with_relation(RelationDef::new("pages", "pid", "Page", "bookRef"));

    let page = EntityDef::new("Page", "page", "pid")
        .with_tag(2)
        .with_field(FieldDef::new("pid", FieldKind::Guid))
        .with_field(FieldDef::new("bookRef", FieldKind::Guid))
        .with_field(FieldDef::new("number", FieldKind::Int));

    let tag = EntityDef::new("Tag", "tag", "pid")
        .with_tag(3)
        .with_field(FieldDef::new("pid", FieldKind::Guid))
        .with_field(FieldDef::new("name", FieldKind::String))
        .with_bridge(BridgeDef::new("BookTags", "TagBridge", "tag_id", "Book", "book_id"));

    let tag_bridge = EntityDef::new("TagBridge", "tagbridge", "pid")
        .with_tag(4)
        .with_field(FieldDef::new("pid", FieldKind::Guid))
        .with_field(FieldDef::new("tag_id", FieldKind::Guid))
        .with_field(FieldDef::new("book_id", FieldKind::Guid));

    Registry::builder()
        .entity(book)
        .entity(page)
        .entity(tag)
        .entity(tag_bridge)
        .build()
        .unwrap()
}

fn book_row(title: &str) -> Row {
    let mut row = Row::new();
    row.insert("pid".to_string(), Value::String("0123456789ABCDEF0123456789ABCDEF".into()));
    row.insert("title".to_string(), Value::String(title.to_string()));
    row
}

#[test]
fn test_document_round_trip() {
    let db = MockDb::default();
    db.count_row(1);
    db.respond(vec![book_row("dune")]);

    let registry = library_registry();
    let executor = QueryExecutor::new(&db, &registry);
    let document = QueryDocument::new()
        .with("books", QueryRequest::model("Book").with_where("title", "dune"));

    let response = executor.execute_all(&document).unwrap();
    let part = &response["books"];
    assert_eq!(part.total, 1);
    assert_eq!(part.model, "Book");
    assert_eq!(part.slice[0]["title"], Value::String("dune".into()));

    let statements = db.statements();
    assert_eq!(
        statements[0],
        "SELECT COUNT(*) FROM book AS alias1 WHERE title = $1"
    );
    assert_eq!(
        statements[1],
        "SELECT alias1.* FROM book AS alias1 WHERE title = $1 LIMIT 200 OFFSET 0"
    );
}

#[test]
fn test_subgraph_document_joins() {
    let db = MockDb::default();
    db.count_row(1);
    db.count_row(3);
    db.respond(vec![book_row("dune")]);
    db.respond(vec![Row::new(), Row::new(), Row::new()]);

    let registry = library_registry();
    let executor = QueryExecutor::new(&db, &registry);
    let document = QueryDocument::new()
        .with("books", QueryRequest::model("Book").with_where("title", "dune"))
        .with("pages", QueryRequest::subgraph("books", "pages"));

    let response = executor.execute_all(&document).unwrap();
    assert_eq!(response["books"].model, "Book");
    assert_eq!(response["pages"].model, "Page");
    assert_eq!(response["pages"].total, 3);

    // The pages request joins through the books request by reference.
    let statements = db.statements();
    assert!(statements
        .iter()
        .any(|sql| sql.contains("INNER JOIN book") && sql.contains("FROM page")));
}

#[test]
fn test_bridge_document_joins_through_bridge_table() {
    let db = MockDb::default();
    db.count_row(0);

    let registry = library_registry();
    let executor = QueryExecutor::new(&db, &registry);
    let document = QueryDocument::new()
        .with("cat", QueryRequest::model("Tag").with_where("name", "cat").transient())
        .with("tagged", QueryRequest::subgraph("cat", "BookTags"));

    let response = executor.execute_all(&document).unwrap();
    assert_eq!(response.len(), 1);
    assert_eq!(response["tagged"].total, 0);

    let statements = db.statements();
    assert_eq!(statements.len(), 1);
    assert!(statements[0].contains("INNER JOIN tagbridge"));
    assert!(statements[0].contains("INNER JOIN tag"));
}

#[test]
fn test_mixed_document_reports_per_request_results() {
    let db = MockDb::default();
    db.count_row(0);

    let registry = library_registry();
    let executor = QueryExecutor::new(&db, &registry);
    let document = QueryDocument::new()
        .with("books", QueryRequest::model("Book"))
        .with("broken", QueryRequest::model("Missing"));

    let results = executor.execute(&document);
    assert!(results["books"].is_ok());
    assert!(results["broken"].is_err());

    // The fail-fast form surfaces the same failure.
    let db = MockDb::default();
    db.count_row(0);
    let executor = QueryExecutor::new(&db, &registry);
    assert!(executor.execute_all(&document).is_err());
}

#[test]
fn test_mutation_batch_commits_transactionally() {
    let db = MockDb::default();
    let registry = library_registry();
    let engine = MutationEngine::new(&db, &registry);

    let first = Guid::parse("0123456789ABCDEF0123456789ABCDEF").unwrap();
    let second = Guid::parse("FEDCBA9876543210FEDCBA9876543210").unwrap();
    let batch: MutationBatch = vec![
        MutationRequest::new("Book", first).with_field("title", "dune"),
        MutationRequest::new("Page", second).with_field("number", Value::Int(3)),
    ]
    .into_iter()
    .collect();

    engine.apply(&batch).unwrap();

    assert_eq!(*db.transaction_log.borrow(), vec!["begin", "commit"]);
    let statements = db.statements();
    assert_eq!(
        statements[0],
        "INSERT INTO book (pid, title) VALUES ($1, $2) \
         ON CONFLICT (pid) DO UPDATE SET title = excluded.title"
    );
    assert_eq!(
        statements[1],
        "INSERT INTO page (pid, number) VALUES ($1, $2) \
         ON CONFLICT (pid) DO UPDATE SET number = excluded.number"
    );
    assert_eq!(
        db.statements.borrow()[0].1[0],
        Value::String(first.to_string())
    );
}

#[test]
fn test_mutation_failure_rolls_back() {
    let db = MockDb {
        fail_execute: true,
        ..MockDb::default()
    };
    let registry = library_registry();
    let engine = MutationEngine::new(&db, &registry);

    let guid = Guid::parse("0123456789ABCDEF0123456789ABCDEF").unwrap();
    let batch: MutationBatch = vec![MutationRequest::new("Book", guid).with_field("title", "dune")]
        .into_iter()
        .collect();

    assert!(matches!(engine.apply(&batch), Err(Error::Database(_))));
    assert_eq!(*db.transaction_log.borrow(), vec!["begin", "rollback"]);
}

#[test]
fn test_duplicate_identifiers_reject_before_any_statement() {
    let db = MockDb::default();
    let registry = library_registry();
    let engine = MutationEngine::new(&db, &registry);

    let guid = Guid::parse("0123456789ABCDEF0123456789ABCDEF").unwrap();
    let batch: MutationBatch = vec![
        MutationRequest::new("Book", guid).with_field("title", "a"),
        MutationRequest::new("Book", guid).with_field("title", "b"),
    ]
    .into_iter()
    .collect();

    assert!(matches!(
        engine.apply(&batch),
        Err(Error::InvalidInputFormat(_))
    ));
    assert!(db.statements().is_empty());
    assert!(db.transaction_log.borrow().is_empty());
}

#[test]
fn test_delete_requests_persist_nothing() {
    let db = MockDb::default();
    let registry = library_registry();
    let engine = MutationEngine::new(&db, &registry);

    let guid = Guid::parse("0123456789ABCDEF0123456789ABCDEF").unwrap();
    let batch: MutationBatch = vec![MutationRequest::new("Book", guid).delete()]
        .into_iter()
        .collect();

    engine.apply(&batch).unwrap();
    assert!(db.statements().is_empty());
    assert_eq!(*db.transaction_log.borrow(), vec!["begin", "commit"]);
}

#[test]
fn test_wire_batch_end_to_end() {
    let db = MockDb::default();
    let registry = library_registry();

    let raw = serde_json::json!([
        { "#model": "Book"
        , "#primary": "0123456789ABCDEF0123456789ABCDEF"
        , "title": "dune"
        , "inPrint": 0
        , "publishedAt": "1970-01-01T00:16:40Z"
        }
    ]);

    let batch = parse_batch(&raw, &registry).unwrap();
    let engine = MutationEngine::new(&db, &registry);
    engine.apply(&batch).unwrap();

    let statements = db.statements.borrow();
    assert_eq!(statements.len(), 1);
    let (sql, args) = &statements[0];
    assert_eq!(
        sql,
        "INSERT INTO book (pid, in_print, published_at, title) VALUES ($1, $2, $3, $4) \
         ON CONFLICT (pid) DO UPDATE SET in_print = excluded.in_print, \
         published_at = excluded.published_at, title = excluded.title"
    );
    // The numeric bool inverts on the way in.
    assert_eq!(args[1], Value::Bool(true));
    assert_eq!(args[2], Value::Timestamp(1000));
    assert_eq!(args[3], Value::String("dune".into()));
}

#[test]
fn test_pagination_flows_into_sql() {
    let db = MockDb::default();
    db.count_row(50);
    db.respond(Vec::new());

    let registry = library_registry();
    let executor = QueryExecutor::new(&db, &registry);
    let document = QueryDocument::new().with(
        "books",
        QueryRequest::model("Book").with_limit(10).with_offset(20),
    );

    executor.execute_all(&document).unwrap();

    let statements = db.statements();
    assert_eq!(statements[0], "SELECT COUNT(*) FROM book AS alias1");
    assert_eq!(
        statements[1],
        "SELECT alias1.* FROM book AS alias1 LIMIT 10 OFFSET 20"
    );
}
