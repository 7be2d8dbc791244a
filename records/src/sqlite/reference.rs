use rusqlite::Connection;

use crate::{
    error::StoreError,
    model::{ClassType, Location, Theme},
};

pub(super) fn locations(conn: &mut Connection) -> Result<Vec<Location>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT location_id, location_name, neighborhood, address
         FROM locations
         WHERE is_active = 1
         ORDER BY location_name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Location {
            id: row.get(0)?,
            name: row.get(1)?,
            neighborhood: row.get(2)?,
            address: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(super) fn class_types(conn: &mut Connection) -> Result<Vec<ClassType>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT class_type_id, class_name, duration_minutes, is_heated, display_name
         FROM class_types
         WHERE is_active = 1
         ORDER BY class_name, duration_minutes, display_name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ClassType {
            id: row.get(0)?,
            class_name: row.get(1)?,
            duration_minutes: row.get(2)?,
            is_heated: row.get(3)?,
            display_name: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(super) fn themes(conn: &mut Connection) -> Result<Vec<Theme>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT theme_id, theme_name, category, notes
         FROM themes
         WHERE is_active = 1
         ORDER BY category, theme_name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Theme {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            notes: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
