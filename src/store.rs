//! Record store collaborator
//!
//! The core treats persistence as an external collaborator behind a trait;
//! the bundled implementation is a plain sqlite file mirroring the hosted
//! schema. Lookups are read-then-act with no locking: concurrent commands
//! against the same vehicle have no ordering guarantee, last write wins.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{MagnoError, MagnoResult};
use crate::extract::expense::ExtractedExpense;

/// A stored vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: i64,
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub plate: Option<String>,
    pub mileage: Option<i64>,
    pub purchase_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub status: String,
    pub purchase_date: Option<String>,
    pub notes: Option<String>,
}

/// Fields for a vehicle about to be created
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub plate: Option<String>,
    pub mileage: Option<i64>,
    pub purchase_price: f64,
    pub purchase_date: String,
    pub notes: Option<String>,
}

/// A stored expense line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub vehicle_id: i64,
    pub expense_type: String,
    pub amount: f64,
    pub date: String,
}

/// One processed-command audit row
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub session_id: String,
    pub command: String,
    pub response: String,
    pub ai_used: String,
    pub confidence: f32,
}

/// Inventory aggregates the local responder answers from
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
    pub total: i64,
    pub in_stock: i64,
    pub sold: i64,
    pub total_invested: f64,
    pub total_sales: f64,
    pub total_expenses: f64,
}

/// External record store interface
pub trait RecordStore: Send + Sync {
    fn list_vehicles(&self) -> MagnoResult<Vec<VehicleRecord>>;
    fn create_vehicle(&self, vehicle: NewVehicle) -> MagnoResult<VehicleRecord>;
    /// All-or-nothing: either every line lands or none does
    fn create_expenses(
        &self,
        vehicle_id: i64,
        expenses: &[ExtractedExpense],
    ) -> MagnoResult<Vec<ExpenseRecord>>;
    fn stats(&self) -> MagnoResult<Stats>;
    fn append_log(&self, entry: &LogEntry) -> MagnoResult<()>;
}

/// Sqlite-backed store; one connection per operation
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    pub fn new(db_path: PathBuf) -> MagnoResult<Self> {
        let store = Self { db_path };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> MagnoResult<()> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = self.open()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS veiculos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                marca TEXT NOT NULL,
                modelo TEXT NOT NULL,
                ano INTEGER,
                cor TEXT,
                placa TEXT,
                km INTEGER,
                preco_compra REAL,
                preco_venda REAL,
                status TEXT NOT NULL DEFAULT 'estoque',
                data_compra TEXT,
                observacoes TEXT
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS gastos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                veiculo_id INTEGER NOT NULL REFERENCES veiculos(id),
                tipo TEXT NOT NULL,
                valor REAL NOT NULL CHECK (valor > 0),
                data TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS agent_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT,
                command TEXT,
                response TEXT,
                ai_used TEXT,
                confidence REAL,
                created_at TEXT
            )",
            [],
        )?;
        Ok(())
    }

    fn open(&self) -> MagnoResult<Connection> {
        Connection::open(&self.db_path).map_err(MagnoError::from)
    }
}

fn row_to_vehicle(row: &rusqlite::Row<'_>) -> rusqlite::Result<VehicleRecord> {
    Ok(VehicleRecord {
        id: row.get(0)?,
        brand: row.get(1)?,
        model: row.get(2)?,
        year: row.get(3)?,
        color: row.get(4)?,
        plate: row.get(5)?,
        mileage: row.get(6)?,
        purchase_price: row.get(7)?,
        sale_price: row.get(8)?,
        status: row.get(9)?,
        purchase_date: row.get(10)?,
        notes: row.get(11)?,
    })
}

impl RecordStore for SqliteStore {
    fn list_vehicles(&self) -> MagnoResult<Vec<VehicleRecord>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT id, marca, modelo, ano, cor, placa, km, preco_compra, preco_venda,
                    status, data_compra, observacoes
             FROM veiculos ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_vehicle)?;
        let mut vehicles = Vec::new();
        for row in rows {
            vehicles.push(row?);
        }
        Ok(vehicles)
    }

    fn create_vehicle(&self, vehicle: NewVehicle) -> MagnoResult<VehicleRecord> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO veiculos (marca, modelo, ano, cor, placa, km, preco_compra,
                                   status, data_compra, observacoes)
             VALUES (?, ?, ?, ?, ?, ?, ?, 'estoque', ?, ?)",
            (
                &vehicle.brand,
                &vehicle.model,
                vehicle.year,
                &vehicle.color,
                &vehicle.plate,
                vehicle.mileage,
                vehicle.purchase_price,
                &vehicle.purchase_date,
                &vehicle.notes,
            ),
        )?;
        let id = conn.last_insert_rowid();
        Ok(VehicleRecord {
            id,
            brand: vehicle.brand,
            model: vehicle.model,
            year: Some(vehicle.year),
            color: vehicle.color,
            plate: vehicle.plate,
            mileage: vehicle.mileage,
            purchase_price: Some(vehicle.purchase_price),
            sale_price: None,
            status: "estoque".to_string(),
            purchase_date: Some(vehicle.purchase_date),
            notes: vehicle.notes,
        })
    }

    fn create_expenses(
        &self,
        vehicle_id: i64,
        expenses: &[ExtractedExpense],
    ) -> MagnoResult<Vec<ExpenseRecord>> {
        let mut conn = self.open()?;
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();

        let tx = conn.transaction()?;
        let mut created = Vec::new();
        for expense in expenses {
            tx.execute(
                "INSERT INTO gastos (veiculo_id, tipo, valor, data) VALUES (?, ?, ?, ?)",
                (
                    vehicle_id,
                    &expense.expense_type,
                    expense.amount,
                    &today,
                ),
            )?;
            created.push(ExpenseRecord {
                id: tx.last_insert_rowid(),
                vehicle_id,
                expense_type: expense.expense_type.clone(),
                amount: expense.amount,
                date: today.clone(),
            });
        }
        tx.commit()?;
        Ok(created)
    }

    fn stats(&self) -> MagnoResult<Stats> {
        let conn = self.open()?;
        let mut stats = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN status = 'estoque' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'vendido' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(preco_compra), 0),
                    COALESCE(SUM(CASE WHEN status = 'vendido' THEN preco_venda ELSE 0 END), 0)
             FROM veiculos",
            [],
            |row| {
                Ok(Stats {
                    total: row.get(0)?,
                    in_stock: row.get(1)?,
                    sold: row.get(2)?,
                    total_invested: row.get(3)?,
                    total_sales: row.get(4)?,
                    total_expenses: 0.0,
                })
            },
        )?;
        stats.total_expenses =
            conn.query_row("SELECT COALESCE(SUM(valor), 0) FROM gastos", [], |row| {
                row.get(0)
            })?;
        Ok(stats)
    }

    fn append_log(&self, entry: &LogEntry) -> MagnoResult<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO agent_logs (session_id, command, response, ai_used, confidence, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                &entry.session_id,
                &entry.command,
                &entry.response,
                &entry.ai_used,
                entry.confidence,
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            ),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, SqliteStore) {
        let dir = TempDir::new().expect("temp dir");
        let store = SqliteStore::new(dir.path().join("test.db")).expect("store");
        (dir, store)
    }

    fn new_vehicle(plate: Option<&str>) -> NewVehicle {
        NewVehicle {
            brand: "Honda".to_string(),
            model: "Civic".to_string(),
            year: 2020,
            color: Some("Preto".to_string()),
            plate: plate.map(|p| p.to_string()),
            mileage: None,
            purchase_price: 50000.0,
            purchase_date: "2026-01-15".to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_create_and_list() {
        let (_dir, store) = test_store();
        let created = store.create_vehicle(new_vehicle(Some("ABC1234"))).unwrap();
        assert_eq!(created.status, "estoque");

        let vehicles = store.list_vehicles().unwrap();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].brand, "Honda");
        assert_eq!(vehicles[0].plate.as_deref(), Some("ABC1234"));
    }

    #[test]
    fn test_no_dedup_across_commands() {
        let (_dir, store) = test_store();
        store.create_vehicle(new_vehicle(None)).unwrap();
        store.create_vehicle(new_vehicle(None)).unwrap();
        assert_eq!(store.list_vehicles().unwrap().len(), 2);
    }

    #[test]
    fn test_expense_batch_transactional() {
        let (_dir, store) = test_store();
        let vehicle = store.create_vehicle(new_vehicle(None)).unwrap();

        let good = vec![
            ExtractedExpense {
                expense_type: "Câmbio".to_string(),
                amount: 200.0,
            },
            ExtractedExpense {
                expense_type: "Documentação".to_string(),
                amount: 1000.0,
            },
        ];
        let created = store.create_expenses(vehicle.id, &good).unwrap();
        assert_eq!(created.len(), 2);

        // A non-positive amount violates the check constraint and must roll
        // back the entire batch, including the valid first line
        let bad = vec![
            ExtractedExpense {
                expense_type: "Pneu".to_string(),
                amount: 350.0,
            },
            ExtractedExpense {
                expense_type: "Inválido".to_string(),
                amount: 0.0,
            },
        ];
        assert!(store.create_expenses(vehicle.id, &bad).is_err());

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_expenses, 1200.0);
    }

    #[test]
    fn test_stats() {
        let (_dir, store) = test_store();
        store.create_vehicle(new_vehicle(None)).unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.in_stock, 1);
        assert_eq!(stats.sold, 0);
        assert_eq!(stats.total_invested, 50000.0);
    }

    #[test]
    fn test_append_log() {
        let (_dir, store) = test_store();
        store
            .append_log(&LogEntry {
                session_id: "s1".to_string(),
                command: "quantos veículos tenho".to_string(),
                response: "Você tem 0 veículos".to_string(),
                ai_used: "local".to_string(),
                confidence: 0.95,
            })
            .unwrap();
    }
}
