use crate::errors::LedgerError;
use crate::models::IntakeRecord;
use async_trait::async_trait;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::debug;

/// Tabular backing store for intake rows.
///
/// `append` adds exactly one row and never rewrites what is already stored,
/// so concurrent appends cannot drop each other's rows.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn read_all(&self) -> Result<Vec<IntakeRecord>, LedgerError>;

    async fn append(&self, record: IntakeRecord) -> Result<(), LedgerError>;
}

/// Non-persistent store. Whoever constructs it owns the rows; dropping it
/// discards them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<IntakeRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<IntakeRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn read_all(&self) -> Result<Vec<IntakeRecord>, LedgerError> {
        Ok(self.records.lock().await.clone())
    }

    async fn append(&self, record: IntakeRecord) -> Result<(), LedgerError> {
        self.records.lock().await.push(record);
        Ok(())
    }
}

/// CSV table with the columns `Date,User,Intake,Goal`.
#[derive(Debug)]
pub struct CsvFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordStore for CsvFileStore {
    async fn read_all(&self) -> Result<Vec<IntakeRecord>, LedgerError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(LedgerError::unavailable(err)),
        };
        parse_table(&bytes)
    }

    async fn append(&self, record: IntakeRecord) -> Result<(), LedgerError> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(LedgerError::unavailable)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(LedgerError::unavailable)?;
        let len = file
            .metadata()
            .await
            .map_err(LedgerError::unavailable)?
            .len();

        // A table holding only whitespace reads as empty, so it gets a fresh
        // header rather than a headerless first row.
        let blank = len == 0 || is_blank_file(&mut file).await?;
        if blank && len > 0 {
            file.set_len(0).await.map_err(LedgerError::unavailable)?;
        }

        let mut payload = Vec::new();
        if !blank && !ends_with_newline(&mut file, len).await? {
            payload.push(b'\n');
        }
        payload.extend(encode_row(&record, blank)?);

        file.write_all(&payload)
            .await
            .map_err(LedgerError::unavailable)?;
        file.flush().await.map_err(LedgerError::unavailable)?;
        debug!(path = %self.path.display(), user = %record.user, "appended intake row");
        Ok(())
    }
}

/// Parses a full table. Blank input is an empty table; any unreadable row
/// makes the whole table malformed.
pub fn parse_table(bytes: &[u8]) -> Result<Vec<IntakeRecord>, LedgerError> {
    if is_blank(bytes) {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let mut records = Vec::new();
    for row in reader.deserialize::<IntakeRecord>() {
        let record = row.map_err(LedgerError::unavailable)?;
        record
            .validate()
            .map_err(|err| LedgerError::unavailable(format!("malformed row: {err}")))?;
        records.push(record);
    }
    Ok(records)
}

fn encode_row(record: &IntakeRecord, with_header: bool) -> Result<Vec<u8>, LedgerError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());
    writer.serialize(record).map_err(LedgerError::unavailable)?;
    writer.into_inner().map_err(LedgerError::unavailable)
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

async fn is_blank_file(file: &mut fs::File) -> Result<bool, LedgerError> {
    file.seek(SeekFrom::Start(0))
        .await
        .map_err(LedgerError::unavailable)?;
    let mut chunk = [0u8; 4096];
    loop {
        let read = file
            .read(&mut chunk)
            .await
            .map_err(LedgerError::unavailable)?;
        if read == 0 {
            return Ok(true);
        }
        if !is_blank(&chunk[..read]) {
            return Ok(false);
        }
    }
}

async fn ends_with_newline(file: &mut fs::File, len: u64) -> Result<bool, LedgerError> {
    file.seek(SeekFrom::Start(len - 1))
        .await
        .map_err(LedgerError::unavailable)?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)
        .await
        .map_err(LedgerError::unavailable)?;
    Ok(last[0] == b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn unique_path(label: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("h2o_{label}_{}_{nanos}", std::process::id()));
        path.push("intake.csv");
        path
    }

    fn record(user: &str, amount: f64) -> IntakeRecord {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        IntakeRecord::new(date, user, amount, 135.0).unwrap()
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty_table() {
        let store = CsvFileStore::new(unique_path("missing"));
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[test]
    fn blank_table_without_header_is_empty() {
        assert!(parse_table(b"").unwrap().is_empty());
        assert!(parse_table(b"\n  \n").unwrap().is_empty());
        assert!(parse_table(b"Date,User,Intake,Goal\n").unwrap().is_empty());
    }

    #[test]
    fn parses_spreadsheet_rows() {
        let table = b"Date,User,Intake,Goal\n2026-03-14,Coach Sam,16,135\n2026-03-14, Coach Alex ,8.5,120\n";
        let records = parse_table(table).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].user, "Coach Sam");
        assert_eq!(records[1].user, "Coach Alex");
        assert_eq!(records[1].amount, 8.5);
    }

    #[test]
    fn malformed_rows_mark_table_unavailable() {
        let bad_number = b"Date,User,Intake,Goal\n2026-03-14,Coach Sam,lots,135\n";
        assert!(matches!(
            parse_table(bad_number),
            Err(LedgerError::StorageUnavailable(_))
        ));

        let negative = b"Date,User,Intake,Goal\n2026-03-14,Coach Sam,-8,135\n";
        assert!(matches!(
            parse_table(negative),
            Err(LedgerError::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn append_writes_header_once_and_keeps_prior_rows() {
        let path = unique_path("append");
        let store = CsvFileStore::new(&path);
        store.append(record("Coach Sam", 8.0)).await.unwrap();
        store.append(record("Coach Sam", 16.0)).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents.matches("Date,User,Intake,Goal").count(), 1);

        let records = store.read_all().await.unwrap();
        let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![8.0, 16.0]);
    }

    #[tokio::test]
    async fn append_after_external_edit_without_trailing_newline() {
        let path = unique_path("edited");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, "Date,User,Intake,Goal\n2026-03-14,Coach Jordan,32,140")
            .await
            .unwrap();

        let store = CsvFileStore::new(&path);
        store.append(record("Coach Jordan", 8.0)).await.unwrap();

        let records = store.read_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].amount, 8.0);
    }

    #[tokio::test]
    async fn append_to_whitespace_only_table_writes_header() {
        let path = unique_path("blank");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        let store = CsvFileStore::new(&path);
        tokio::fs::write(store.path(), "\n  \n").await.unwrap();
        assert!(store.read_all().await.unwrap().is_empty());

        store.append(record("Coach Sam", 8.0)).await.unwrap();
        store.append(record("Coach Sam", 16.0)).await.unwrap();

        let contents = tokio::fs::read_to_string(store.path()).await.unwrap();
        assert!(contents.starts_with("Date,User,Intake,Goal\n"));
        let records = store.read_all().await.unwrap();
        let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![8.0, 16.0]);
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_retained() {
        let store = Arc::new(CsvFileStore::new(unique_path("concurrent")));
        let mut tasks = Vec::new();
        for _ in 0..20 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store.append(record("Coach Taylor", 8.0)).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let records = store.read_all().await.unwrap();
        assert_eq!(records.len(), 20);
    }
}
