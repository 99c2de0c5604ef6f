mod schema;

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, Row, Transaction};

use crate::models::*;
use crate::search::{self, SearchFilters, SearchResult};
use crate::seed;

/// SQLite-backed roadmap dataset.
///
/// The dataset is written once (seeded or imported) and read back as a
/// [`Dataset`] snapshot for every search. Cloning shares the connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open the database in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Dataset lifecycle
    // ============================================================

    pub fn is_empty(&self) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let count: i64 = conn.query_row(
            "SELECT (SELECT COUNT(*) FROM modules) + (SELECT COUNT(*) FROM timeline_events)",
            [],
            |row| row.get(0),
        )?;
        Ok(count == 0)
    }

    /// Seed the built-in roadmap if the database holds no records.
    /// Returns whether anything was written.
    pub fn seed_default(&self) -> Result<bool> {
        if !self.is_empty()? {
            return Ok(false);
        }
        let dataset = seed::default_dataset();
        self.replace_dataset(&dataset)?;
        tracing::info!(
            "Seeded roadmap with {} modules and {} timeline events",
            dataset.modules.len(),
            dataset.timeline.len()
        );
        Ok(true)
    }

    /// Replace every stored record with `dataset`, atomically.
    pub fn replace_dataset(&self, dataset: &Dataset) -> Result<()> {
        dataset.validate()?;

        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM module_features", [])?;
        tx.execute("DELETE FROM modules", [])?;
        tx.execute("DELETE FROM timeline_events", [])?;

        for (position, module) in dataset.modules.iter().enumerate() {
            insert_module(&tx, position, module)?;
        }
        for (position, event) in dataset.timeline.iter().enumerate() {
            insert_timeline_event(&tx, position, event)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Read the full dataset in stored order.
    pub fn load_dataset(&self) -> Result<Dataset> {
        let conn = self.conn.lock().expect("database lock poisoned");
        Ok(Dataset {
            modules: query_modules(&conn, None)?,
            timeline: query_timeline(&conn, None)?,
        })
    }

    /// Search a fresh snapshot of the dataset.
    pub fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<SearchResult>> {
        let dataset = self.load_dataset()?;
        Ok(search::search(&dataset, query, filters))
    }

    // ============================================================
    // Module operations
    // ============================================================

    pub fn list_modules(&self) -> Result<Vec<Module>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        query_modules(&conn, None)
    }

    pub fn get_module(&self, id: &str) -> Result<Option<Module>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        Ok(query_modules(&conn, Some(id))?.into_iter().next())
    }

    // ============================================================
    // Timeline operations
    // ============================================================

    pub fn list_timeline(&self) -> Result<Vec<TimelineEvent>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        query_timeline(&conn, None)
    }

    pub fn get_timeline_event(&self, id: &str) -> Result<Option<TimelineEvent>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        Ok(query_timeline(&conn, Some(id))?.into_iter().next())
    }
}

/// `<data dir>/ehb-roadmap/roadmap.db` for the current platform.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "ehb-roadmap")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("roadmap.db"))
}

fn insert_module(tx: &Transaction<'_>, position: usize, module: &Module) -> Result<()> {
    tx.execute(
        "INSERT INTO modules (id, position, title, description, status, priority, tags,
                              progress, owner, start_date, end_date)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &module.id,
            position as i64,
            &module.title,
            &module.description,
            module.status.as_str(),
            module.priority.map(|p| p.as_str()),
            serde_json::to_string(&module.tags)?,
            module.progress,
            &module.owner,
            module.start_date.map(|d| d.to_string()),
            module.end_date.map(|d| d.to_string()),
        ),
    )
    .with_context(|| format!("Failed to insert module {}", module.id))?;

    for (position, feature) in module.features.iter().enumerate() {
        tx.execute(
            "INSERT INTO module_features (id, module_id, position, title, description, status,
                                          priority, tags)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                &feature.id,
                &module.id,
                position as i64,
                &feature.title,
                &feature.description,
                feature.status.as_str(),
                feature.priority.map(|p| p.as_str()),
                serde_json::to_string(&feature.tags)?,
            ),
        )
        .with_context(|| format!("Failed to insert feature {}", feature.id))?;
    }

    Ok(())
}

fn insert_timeline_event(tx: &Transaction<'_>, position: usize, event: &TimelineEvent) -> Result<()> {
    tx.execute(
        "INSERT INTO timeline_events (id, position, title, description, date, status, priority,
                                      tags, module_ids)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &event.id,
            position as i64,
            &event.title,
            &event.description,
            event.date.to_string(),
            event.status.as_str(),
            event.priority.map(|p| p.as_str()),
            serde_json::to_string(&event.tags)?,
            serde_json::to_string(&event.module_ids)?,
        ),
    )
    .with_context(|| format!("Failed to insert timeline event {}", event.id))?;
    Ok(())
}

/// Modules in dataset order with their features attached; `id` narrows to one module.
fn query_modules(conn: &Connection, id: Option<&str>) -> Result<Vec<Module>> {
    let mut features = query_features(conn, id)?;

    let mut stmt = conn.prepare(
        "SELECT id, title, description, status, priority, tags, progress, owner,
                start_date, end_date
         FROM modules WHERE (?1 IS NULL OR id = ?1) ORDER BY position",
    )?;

    let mut modules = stmt
        .query_map([id], |row| {
            Ok(Module {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                status: parse_status(row, 3)?,
                priority: parse_priority(row, 4)?,
                tags: parse_json(row.get::<_, String>(5)?),
                progress: row.get(6)?,
                owner: row.get(7)?,
                start_date: row.get::<_, Option<String>>(8)?.and_then(parse_date),
                end_date: row.get::<_, Option<String>>(9)?.and_then(parse_date),
                features: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for module in &mut modules {
        module.features = features.remove(&module.id).unwrap_or_default();
    }

    Ok(modules)
}

/// Features grouped by module id, each group in position order.
fn query_features(conn: &Connection, module_id: Option<&str>) -> Result<HashMap<String, Vec<Feature>>> {
    let mut stmt = conn.prepare(
        "SELECT module_id, id, title, description, status, priority, tags
         FROM module_features WHERE (?1 IS NULL OR module_id = ?1)
         ORDER BY module_id, position",
    )?;

    let rows = stmt
        .query_map([module_id], |row| {
            let module_id: String = row.get(0)?;
            let feature = Feature {
                id: row.get(1)?,
                title: row.get(2)?,
                description: row.get(3)?,
                status: parse_status(row, 4)?,
                priority: parse_priority(row, 5)?,
                tags: parse_json(row.get::<_, String>(6)?),
            };
            Ok((module_id, feature))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut grouped: HashMap<String, Vec<Feature>> = HashMap::new();
    for (module_id, feature) in rows {
        grouped.entry(module_id).or_default().push(feature);
    }
    Ok(grouped)
}

fn query_timeline(conn: &Connection, id: Option<&str>) -> Result<Vec<TimelineEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, date, status, priority, tags, module_ids
         FROM timeline_events WHERE (?1 IS NULL OR id = ?1) ORDER BY position",
    )?;

    let events = stmt
        .query_map([id], |row| {
            Ok(TimelineEvent {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                date: parse_date(row.get::<_, String>(3)?).unwrap_or(NaiveDate::MIN),
                status: parse_status(row, 4)?,
                priority: parse_priority(row, 5)?,
                tags: parse_json::<BTreeSet<String>>(row.get::<_, String>(6)?),
                module_ids: parse_json(row.get::<_, String>(7)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

fn parse_status(row: &Row<'_>, idx: usize) -> rusqlite::Result<Status> {
    Ok(Status::from_str(&row.get::<_, String>(idx)?).unwrap_or(Status::Planned))
}

fn parse_priority(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Priority>> {
    Ok(row
        .get::<_, Option<String>>(idx)?
        .and_then(|s| Priority::from_str(&s).ok()))
}

fn parse_json<T: serde::de::DeserializeOwned + Default>(s: String) -> T {
    serde_json::from_str(&s).unwrap_or_default()
}

fn parse_date(s: String) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}
