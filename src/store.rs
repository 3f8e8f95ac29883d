//! LMDB-backed role/catalog store
//!
//! The durable source of the roles and catalog snapshots the engine resolves.
//! Records are stored as JSON strings keyed by role name and decoded one at a
//! time, so a single malformed record is skipped with a warning instead of
//! poisoning the whole snapshot.

use std::path::Path;
use std::sync::{Mutex, OnceLock};

use heed::types::Str;
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};
use tracing::warn;

use crate::catalog::Catalog;
use crate::error::{err, Error, Result};
use crate::model::{Role, RoleSet};

type Db = Database<Str, Str>;

struct Dbs {
    /// role name -> JSON-encoded Role
    roles: Db,
    /// "catalog" -> JSON-encoded Catalog, plus misc metadata
    meta: Db,
}

static ENV: OnceLock<Env> = OnceLock::new();
static DBS: OnceLock<Dbs> = OnceLock::new();
static INIT_PATH: OnceLock<String> = OnceLock::new();
static TEST_LOCK: Mutex<()> = Mutex::new(());

const CATALOG_KEY: &str = "catalog";

fn dbs() -> Result<&'static Dbs> {
    DBS.get().ok_or(Error::NotInitialized)
}

fn env() -> Result<&'static Env> {
    ENV.get().ok_or(Error::NotInitialized)
}

fn read<T, F: FnOnce(&Dbs, &RoTxn) -> Result<T>>(f: F) -> Result<T> {
    f(dbs()?, &env()?.read_txn().map_err(err)?)
}

fn write<T, F: FnOnce(&Dbs, &mut RwTxn) -> Result<T>>(f: F) -> Result<T> {
    let mut txn = env()?.write_txn().map_err(err)?;
    let r = f(dbs()?, &mut txn)?;
    txn.commit().map_err(err)?;
    Ok(r)
}

/// Initialize the store at `path`. Idempotent for the same path; a second
/// init with a different path is an error.
pub fn init(path: &str) -> Result<()> {
    if let Some(p) = INIT_PATH.get() {
        return if p == path { Ok(()) } else { Err(Error::AlreadyInitialized(p.clone())) };
    }
    std::fs::create_dir_all(path).map_err(err)?;
    // SAFETY: LMDB requires no other process to open this path concurrently.
    let e = unsafe {
        EnvOpenOptions::new()
            .map_size(1 << 30)
            .max_dbs(2)
            .open(Path::new(path))
            .map_err(err)?
    };
    let mut tx = e.write_txn().map_err(err)?;
    let d = Dbs {
        roles: e.create_database(&mut tx, Some("roles")).map_err(err)?,
        meta: e.create_database(&mut tx, Some("meta")).map_err(err)?,
    };
    tx.commit().map_err(err)?;
    let _ = (ENV.set(e), DBS.set(d), INIT_PATH.set(path.to_string()));
    Ok(())
}

/// Insert or replace a role record
pub fn put_role(role: &Role) -> Result<()> {
    let json = serde_json::to_string(role).map_err(err)?;
    write(|d, tx| d.roles.put(tx, &role.name, &json).map_err(err))
}

/// Fetch one role by name
pub fn get_role(name: &str) -> Result<Option<Role>> {
    read(|d, tx| {
        Ok(d.roles
            .get(tx, name)
            .map_err(err)?
            .and_then(|json| decode_role(name, json)))
    })
}

/// Delete a role record, returning whether it existed
pub fn delete_role(name: &str) -> Result<bool> {
    write(|d, tx| d.roles.delete(tx, name).map_err(err))
}

/// Load the full role snapshot. Undecodable records are skipped with a
/// warning so one bad role does not abort resolution for all others.
pub fn list_roles() -> Result<RoleSet> {
    read(|d, tx| {
        let mut roles = RoleSet::new();
        for item in d.roles.iter(tx).map_err(err)? {
            let (name, json) = item.map_err(err)?;
            if let Some(role) = decode_role(name, json) {
                roles.insert(role.name.clone(), role);
            }
        }
        Ok(roles)
    })
}

/// Store the catalog snapshot
pub fn put_catalog(catalog: &Catalog) -> Result<()> {
    let json = serde_json::to_string(catalog).map_err(err)?;
    write(|d, tx| d.meta.put(tx, CATALOG_KEY, &json).map_err(err))
}

/// Load the catalog snapshot, if one has been stored
pub fn get_catalog() -> Result<Option<Catalog>> {
    read(|d, tx| {
        match d.meta.get(tx, CATALOG_KEY).map_err(err)? {
            Some(json) => match serde_json::from_str(json) {
                Ok(catalog) => Ok(Some(catalog)),
                Err(e) => {
                    warn!(error = %e, "stored catalog is malformed, ignoring");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    })
}

/// Write a raw role record without encoding, so tests can exercise the
/// malformed-record skip path
#[doc(hidden)]
pub fn put_raw_role(name: &str, json: &str) -> Result<()> {
    write(|d, tx| d.roles.put(tx, name, json).map_err(err))
}

fn decode_role(name: &str, json: &str) -> Option<Role> {
    match serde_json::from_str::<Role>(json) {
        Ok(role) => Some(role),
        Err(e) => {
            warn!(role = %name, error = %e, "malformed role record skipped");
            None
        }
    }
}

/// Clear all databases (for testing)
pub fn clear_all() -> Result<()> {
    write(|d, tx| {
        d.roles.clear(tx).map_err(err)?;
        d.meta.clear(tx).map_err(err)
    })
}

/// Get the test lock (for single-threaded tests)
pub fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner())
}
