//! End-to-end export tests against an in-memory query source.

mod common;

use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use common::{users, MemorySource, MemoryTable};
use flate2::read::GzDecoder;
use mysql_csv_dump::{
    export_batch, Config, Dialect, DumpError, Dumper, ExportOptions, SqlValue, TableExporter,
};

fn exporter(dir: &Path) -> TableExporter {
    TableExporter::new(ExportOptions {
        output_dir: dir.to_path_buf(),
        ..Default::default()
    })
}

fn read_gzip(path: &Path) -> String {
    let mut out = String::new();
    GzDecoder::new(fs::File::open(path).unwrap())
        .read_to_string(&mut out)
        .unwrap();
    out
}

// =============================================================================
// Table Exporter
// =============================================================================

#[tokio::test]
async fn test_users_example_default_dialect() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![users()]);

    let summary = exporter(dir.path())
        .export_table(&mut source, "users")
        .await
        .unwrap();

    assert_eq!(summary.rows, 2);
    assert_eq!(summary.path, dir.path().join("users.csv"));
    assert_eq!(
        fs::read_to_string(dir.path().join("users.csv")).unwrap(),
        "id\tname\n1\t\"Jane\tDoe\"\n2\t\n"
    );
    assert_eq!(source.statements, vec!["SELECT * FROM `users`"]);
}

#[tokio::test]
async fn test_skip_header() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![users()]);
    let exporter = TableExporter::new(ExportOptions {
        output_dir: dir.path().to_path_buf(),
        skip_header: true,
        ..Default::default()
    });

    let summary = exporter.export_table(&mut source, "users").await.unwrap();

    assert_eq!(summary.rows, 2);
    assert_eq!(
        fs::read_to_string(dir.path().join("users.csv")).unwrap(),
        "1\t\"Jane\tDoe\"\n2\t\n"
    );
}

#[tokio::test]
async fn test_empty_table_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![MemoryTable::new("empty", &["a", "b", "c"])]);

    let summary = exporter(dir.path())
        .export_table(&mut source, "empty")
        .await
        .unwrap();

    assert_eq!(summary.rows, 0);
    assert_eq!(
        fs::read_to_string(dir.path().join("empty.csv")).unwrap(),
        "a\tb\tc\n"
    );
}

#[tokio::test]
async fn test_round_trip_through_csv_reader() {
    let tricky = [
        "plain",
        "",
        "say \"hi\"",
        "C:\\temp\\file",
        "tab\there",
        "line one\nline two",
        "carriage\rreturn",
        "\"\\\t\n",
    ];
    let mut table = MemoryTable::new("notes", &["id", "body"]);
    for (i, text) in tricky.iter().enumerate() {
        table = table.row(vec![SqlValue::I64(i as i64), SqlValue::from(*text)]);
    }

    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![table]);
    exporter(dir.path())
        .export_table(&mut source, "notes")
        .await
        .unwrap();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quote(b'"')
        .escape(Some(b'\\'))
        .double_quote(false)
        .from_path(dir.path().join("notes.csv"))
        .unwrap();

    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["id", "body"]);

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), tricky.len());
    for (i, (record, expected)) in records.iter().zip(tricky.iter()).enumerate() {
        assert_eq!(&record[0], i.to_string());
        assert_eq!(&record[1], *expected, "row {}", i);
    }
}

#[tokio::test]
async fn test_custom_dialect() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![MemoryTable::new("t", &["a", "b"])
        .row(vec![SqlValue::from("x,y"), SqlValue::from("it's")])
        .row(vec![SqlValue::from("plain"), SqlValue::Null])]);

    let exporter = TableExporter::new(ExportOptions {
        output_dir: dir.path().to_path_buf(),
        dialect: Dialect::new(",", "'", "\\", "\r\n").unwrap(),
        ..Default::default()
    });
    exporter.export_table(&mut source, "t").await.unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("t.csv")).unwrap(),
        "a,b\r\n'x,y','it\\'s'\r\nplain,\r\n"
    );
}

#[tokio::test]
async fn test_typed_values_render_per_kind() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    let table = MemoryTable::new("kinds", &["b", "u", "f", "d", "bin", "day", "at"]).row(vec![
        SqlValue::Bool(true),
        SqlValue::U64(7),
        SqlValue::F64(2.5),
        SqlValue::decimal_owned("10.50".to_string()),
        SqlValue::bytes_owned(vec![0x01, 0xff]),
        SqlValue::Date(date),
        SqlValue::DateTime(date.and_hms_opt(23, 59, 1).unwrap()),
    ]);

    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![table]);
    let exporter = TableExporter::new(ExportOptions {
        output_dir: dir.path().to_path_buf(),
        skip_header: true,
        ..Default::default()
    });
    exporter.export_table(&mut source, "kinds").await.unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("kinds.csv")).unwrap(),
        "1\t7\t2.5\t10.50\t01ff\t2024-01-31\t2024-01-31 23:59:01\n"
    );
}

#[tokio::test]
async fn test_gzip_output_matches_plain_output() {
    let plain_dir = tempfile::tempdir().unwrap();
    let gz_dir = tempfile::tempdir().unwrap();

    let mut source = MemorySource::new(vec![users()]);
    exporter(plain_dir.path())
        .export_table(&mut source, "users")
        .await
        .unwrap();

    let compressed = TableExporter::new(ExportOptions {
        output_dir: gz_dir.path().to_path_buf(),
        compress: true,
        ..Default::default()
    });
    let summary = compressed.export_table(&mut source, "users").await.unwrap();

    assert_eq!(summary.path, gz_dir.path().join("users.csv.gz"));
    assert!(!gz_dir.path().join("users.csv").exists());
    assert_eq!(
        read_gzip(&summary.path),
        fs::read_to_string(plain_dir.path().join("users.csv")).unwrap()
    );
}

#[tokio::test]
async fn test_write_table_into_memory() {
    let mut source = MemorySource::new(vec![users()]);
    let (rows, buf) = exporter(Path::new("."))
        .write_table(&mut source, "users", Vec::new())
        .await
        .unwrap();

    assert_eq!(rows, 2);
    assert_eq!(String::from_utf8(buf).unwrap(), "id\tname\n1\t\"Jane\tDoe\"\n2\t\n");
}

#[tokio::test]
async fn test_rows_before_failure_stay_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![MemoryTable::new("big", &["n"])
        .row(vec![SqlValue::I64(1)])
        .row(vec![SqlValue::I64(2)])
        .row(vec![SqlValue::I64(3)])
        .failing_after(2)]);

    let err = exporter(dir.path())
        .export_table(&mut source, "big")
        .await
        .unwrap_err();

    assert!(matches!(err, DumpError::Query(_)));
    // dropping the buffered writer flushes what it already holds
    assert_eq!(
        fs::read_to_string(dir.path().join("big.csv")).unwrap(),
        "n\n1\n2\n"
    );
}

#[tokio::test]
async fn test_invalid_table_name_creates_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![users()]);

    let err = exporter(dir.path())
        .export_table(&mut source, "../escape")
        .await
        .unwrap_err();

    assert!(matches!(err, DumpError::InvalidIdentifier(_)));
    assert!(source.statements.is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_row_shape_mismatch_fails_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![
        MemoryTable::new("ragged", &["a", "b"]).row(vec![SqlValue::I64(1)])
    ]);

    let err = exporter(dir.path())
        .export_table(&mut source, "ragged")
        .await
        .unwrap_err();

    assert!(matches!(err, DumpError::RowShape { expected: 2, actual: 1 }));
    assert!(!err.is_fatal());
}

// =============================================================================
// Batch Driver
// =============================================================================

#[tokio::test]
async fn test_failing_table_does_not_abort_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![
        MemoryTable::new("a", &["id"]).row(vec![SqlValue::I64(1)]),
        MemoryTable::new("b", &["id"]).failing_query("Table 'shop.b' is marked as crashed"),
        MemoryTable::new("c", &["id"]).row(vec![SqlValue::I64(3)]),
    ]);
    let tables = vec!["a".to_string(), "b".to_string(), "c".to_string()];

    let report = export_batch(&exporter(dir.path()), &mut source, &tables)
        .await
        .unwrap();

    assert_eq!(report.tables_total(), 3);
    assert_eq!(
        report.exported.iter().map(|s| s.table.as_str()).collect::<Vec<_>>(),
        vec!["a", "c"]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].table, "b");
    assert!(report.failed[0].error.contains("marked as crashed"));

    assert_eq!(fs::read_to_string(dir.path().join("a.csv")).unwrap(), "id\n1\n");
    assert_eq!(fs::read_to_string(dir.path().join("c.csv")).unwrap(), "id\n3\n");
    // created before the query ran
    assert_eq!(fs::read_to_string(dir.path().join("b.csv")).unwrap(), "");
}

#[tokio::test]
async fn test_unknown_table_is_a_per_table_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![users()]);
    let tables = vec!["missing".to_string(), "users".to_string()];

    let report = export_batch(&exporter(dir.path()), &mut source, &tables)
        .await
        .unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.exported.len(), 1);
    assert_eq!(report.rows_exported(), 2);
}

#[tokio::test]
async fn test_missing_column_list_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![
        MemoryTable::without_columns("broken"),
        MemoryTable::new("after", &["id"]),
    ]);
    let tables = vec!["broken".to_string(), "after".to_string()];

    let err = export_batch(&exporter(dir.path()), &mut source, &tables)
        .await
        .unwrap_err();

    assert!(matches!(err, DumpError::Schema { ref table } if table == "broken"));
    assert_eq!(source.statements, vec!["SELECT * FROM `broken`"]);
    assert!(!dir.path().join("after.csv").exists());
}

#[tokio::test]
async fn test_batch_creates_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let outdir = dir.path().join("nested").join("out");
    let mut source = MemorySource::new(vec![users()]);

    let report = export_batch(&exporter(&outdir), &mut source, &["users".to_string()])
        .await
        .unwrap();

    assert!(report.is_complete());
    assert!(outdir.join("users.csv").is_file());
}

#[tokio::test]
async fn test_output_path_that_is_a_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let not_a_dir = dir.path().join("file");
    fs::write(&not_a_dir, "x").unwrap();
    let mut source = MemorySource::new(vec![users()]);

    let err = export_batch(&exporter(&not_a_dir), &mut source, &["users".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, DumpError::OutputDir { .. }));
    assert!(source.statements.is_empty());
}

// =============================================================================
// Dumper
// =============================================================================

fn dumper(outdir: &Path, tables: &[&str]) -> Dumper {
    let mut config = Config::default();
    config.source.database = "shop".to_string();
    config.export.output_dir = outdir.to_path_buf();
    config.export.tables = tables.iter().map(|t| t.to_string()).collect();
    Dumper::new(config).unwrap()
}

#[tokio::test]
async fn test_dumper_discovers_tables_when_none_given() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![
        users(),
        MemoryTable::new("orders", &["id", "user_id"]).row(vec![SqlValue::I64(10), SqlValue::I64(1)]),
    ]);

    let report = dumper(dir.path(), &[])
        .run_with_source(&mut source)
        .await
        .unwrap();

    assert_eq!(
        source.statements,
        vec![
            "SHOW TABLES",
            "SELECT * FROM `users`",
            "SELECT * FROM `orders`"
        ]
    );
    assert_eq!(report.rows_exported(), 3);
    assert!(dir.path().join("users.csv").is_file());
    assert_eq!(
        fs::read_to_string(dir.path().join("orders.csv")).unwrap(),
        "id\tuser_id\n10\t1\n"
    );
}

#[tokio::test]
async fn test_dumper_uses_configured_tables_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![users(), MemoryTable::new("orders", &["id"])]);

    let report = dumper(dir.path(), &["users"])
        .run_with_source(&mut source)
        .await
        .unwrap();

    assert_eq!(source.statements, vec!["SELECT * FROM `users`"]);
    assert_eq!(report.exported.len(), 1);
    assert!(!dir.path().join("orders.csv").exists());
}

#[tokio::test]
async fn test_dumper_with_empty_database() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![]);

    let report = dumper(dir.path(), &[])
        .run_with_source(&mut source)
        .await
        .unwrap();

    assert_eq!(report.tables_total(), 0);
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_dumper_discovery_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut source =
        MemorySource::new(vec![users()]).failing_discovery("Access denied for user 'dump'");

    let err = dumper(dir.path(), &[])
        .run_with_source(&mut source)
        .await
        .unwrap_err();

    assert!(matches!(err, DumpError::Query(_)));
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("Access denied"));
    assert_eq!(source.statements, vec!["SHOW TABLES"]);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_dumper_discovers_binary_table_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(vec![
        users(),
        MemoryTable::new("order-items", &["id"]).row(vec![SqlValue::I64(7)]),
    ])
    .binary_table_names();

    let report = dumper(dir.path(), &[])
        .run_with_source(&mut source)
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(
        source.statements,
        vec![
            "SHOW TABLES",
            "SELECT * FROM `users`",
            "SELECT * FROM `order-items`"
        ]
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("order-items.csv")).unwrap(),
        "id\n7\n"
    );
}
