use log::info;
use rusqlite::{params, Connection, Transaction};

use crate::{
    error::StoreError,
    reference::{CLASS_TYPES, LOCATIONS, THEMES},
};

const CURRENT_SCHEMA_VERSION: i32 = 2;

pub fn run_migrations(conn: &mut Connection) -> Result<(), StoreError> {
    let mut version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::Connection(format!(
            "database version ({version}) is newer than supported schema ({CURRENT_SCHEMA_VERSION})"
        )));
    }

    if version == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;

    while version < CURRENT_SCHEMA_VERSION {
        let next_version = version + 1;
        apply_migration(&tx, next_version)?;
        info!("Applied schema migration {next_version}");
        version = next_version;
    }

    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;
    tx.commit()?;

    Ok(())
}

fn apply_migration(tx: &Transaction<'_>, version: i32) -> Result<(), StoreError> {
    match version {
        1 => {
            tx.execute_batch(include_str!("schemas/schema_v1.sql"))?;
            Ok(())
        }
        2 => seed_reference_data(tx),
        _ => Err(StoreError::Connection(format!(
            "unknown migration target version: {version}"
        ))),
    }
}

fn seed_reference_data(tx: &Transaction<'_>) -> Result<(), StoreError> {
    for (name, neighborhood, address) in LOCATIONS {
        tx.execute(
            "INSERT OR IGNORE INTO locations (location_name, neighborhood, address) VALUES (?1, ?2, ?3)",
            params![name, neighborhood, address],
        )?;
    }
    for (class_name, duration, heated, display) in CLASS_TYPES {
        tx.execute(
            "INSERT OR IGNORE INTO class_types (class_name, duration_minutes, is_heated, display_name)
             VALUES (?1, ?2, ?3, ?4)",
            params![class_name, duration, heated, display],
        )?;
    }
    for (name, category, notes) in THEMES {
        tx.execute(
            "INSERT OR IGNORE INTO themes (theme_name, category, notes) VALUES (?1, ?2, ?3)",
            params![name, category, notes],
        )?;
    }
    Ok(())
}
