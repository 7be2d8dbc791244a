use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Row};

use crate::{
    error::StoreError,
    filter::ClassFilter,
    model::{ClassId, ClassRecord, Energy, NewClass, SequenceNotes, VibeRating},
};

const SELECT_CLASSES: &str = "SELECT
        c.class_id,
        c.class_date,
        c.class_time,
        c.day_of_week,
        l.location_name,
        ct.display_name AS class_type,
        ct.is_heated,
        COALESCE(t.theme_name, c.custom_theme) AS theme,
        t.category AS theme_category,
        c.peak_pose,
        c.energy_level,
        c.student_count,
        c.vibe_rating,
        c.intention,
        c.personal_notes,
        c.sequence_notes
    FROM classes_taught c
    LEFT JOIN locations l ON c.location_id = l.location_id
    LEFT JOIN class_types ct ON c.class_type_id = ct.class_type_id
    LEFT JOIN themes t ON c.theme_id = t.theme_id";

fn invalid(field: &str, detail: impl std::fmt::Display) -> StoreError {
    StoreError::InvalidRow(format!("{field}: {detail}"))
}

fn parse_date(value: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|err| invalid("class_date", err))
}

fn parse_time(value: &str) -> Result<NaiveTime, StoreError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|err| invalid("class_time", err))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn row_to_class(row: &Row) -> Result<ClassRecord, StoreError> {
    let date: String = row.get("class_date")?;
    let time: Option<String> = row.get("class_time")?;
    let energy: Option<String> = row.get("energy_level")?;
    let students: i64 = row.get("student_count")?;
    let vibe: i64 = row.get("vibe_rating")?;
    let sequence: Option<String> = row.get("sequence_notes")?;

    Ok(ClassRecord {
        id: row.get("class_id")?,
        date: parse_date(&date)?,
        time: non_blank(time).map(|t| parse_time(&t)).transpose()?,
        day_of_week: row.get("day_of_week")?,
        location: row.get("location_name")?,
        class_type: row.get("class_type")?,
        is_heated: row.get("is_heated")?,
        theme: non_blank(row.get("theme")?),
        theme_category: row.get("theme_category")?,
        peak_pose: non_blank(row.get("peak_pose")?),
        energy: non_blank(energy)
            .map(|e| e.parse::<Energy>().map_err(|err| invalid("energy_level", err)))
            .transpose()?,
        student_count: u32::try_from(students)
            .map_err(|_| invalid("student_count", format!("{students} is not a valid count")))?,
        vibe_rating: VibeRating::new(vibe)?,
        intention: non_blank(row.get("intention")?),
        notes: non_blank(row.get("personal_notes")?),
        sequence: sequence
            .map(|raw| serde_json::from_str::<SequenceNotes>(&raw))
            .transpose()
            .map_err(|err| invalid("sequence_notes", err))?,
    })
}

fn lookup_id(
    conn: &Connection,
    sql: &str,
    kind: &'static str,
    name: &str,
) -> Result<i64, StoreError> {
    conn.query_row(sql, params![name], |row| row.get(0))
        .optional()?
        .ok_or_else(|| StoreError::UnknownReference {
            kind,
            name: name.to_string(),
        })
}

struct Resolved {
    location_id: i64,
    class_type_id: i64,
    theme_id: Option<i64>,
    custom_theme: Option<String>,
    sequence_json: Option<String>,
}

fn resolve(conn: &Connection, class: &NewClass) -> Result<Resolved, StoreError> {
    let location_id = lookup_id(
        conn,
        "SELECT location_id FROM locations WHERE location_name = ?1 AND is_active = 1",
        "location",
        &class.location,
    )?;
    let class_type_id = lookup_id(
        conn,
        "SELECT class_type_id FROM class_types WHERE display_name = ?1 AND is_active = 1",
        "class type",
        &class.class_type,
    )?;

    let theme = class
        .theme
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let theme_id: Option<i64> = match theme {
        Some(name) => conn
            .query_row(
                "SELECT theme_id FROM themes WHERE LOWER(theme_name) = LOWER(?1) AND is_active = 1",
                params![name],
                |row| row.get(0),
            )
            .optional()?,
        None => None,
    };
    let custom_theme = match theme_id {
        Some(_) => None,
        None => theme.map(str::to_string),
    };

    let sequence_json = class
        .sequence_json()
        .map_err(|err| invalid("sequence_notes", err))?;

    Ok(Resolved {
        location_id,
        class_type_id,
        theme_id,
        custom_theme,
        sequence_json,
    })
}

pub(super) fn insert(conn: &mut Connection, class: &NewClass) -> Result<ClassId, StoreError> {
    let resolved = resolve(conn, class)?;
    conn.execute(
        "INSERT INTO classes_taught (
            class_date, class_time, day_of_week, location_id, class_type_id,
            theme_id, custom_theme, intention, peak_pose,
            sequence_notes, energy_level, student_count, vibe_rating, personal_notes, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            class.date.format("%Y-%m-%d").to_string(),
            class.time.map(|t| t.format("%H:%M").to_string()),
            class.day_of_week(),
            resolved.location_id,
            resolved.class_type_id,
            resolved.theme_id,
            resolved.custom_theme,
            class.intention,
            class.peak_pose,
            resolved.sequence_json,
            class.energy.map(|e| e.as_str()),
            class.student_count,
            i64::from(class.vibe_rating),
            class.notes,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(super) fn update(conn: &mut Connection, id: ClassId, class: &NewClass) -> Result<(), StoreError> {
    let resolved = resolve(conn, class)?;
    let rows_affected = conn.execute(
        "UPDATE classes_taught
         SET class_date = ?1,
             class_time = ?2,
             day_of_week = ?3,
             location_id = ?4,
             class_type_id = ?5,
             theme_id = ?6,
             custom_theme = ?7,
             intention = ?8,
             peak_pose = ?9,
             sequence_notes = ?10,
             energy_level = ?11,
             student_count = ?12,
             vibe_rating = ?13,
             personal_notes = ?14
         WHERE class_id = ?15",
        params![
            class.date.format("%Y-%m-%d").to_string(),
            class.time.map(|t| t.format("%H:%M").to_string()),
            class.day_of_week(),
            resolved.location_id,
            resolved.class_type_id,
            resolved.theme_id,
            resolved.custom_theme,
            class.intention,
            class.peak_pose,
            resolved.sequence_json,
            class.energy.map(|e| e.as_str()),
            class.student_count,
            i64::from(class.vibe_rating),
            class.notes,
            id,
        ],
    )?;

    if rows_affected == 0 {
        return Err(StoreError::NotFound(id));
    }
    Ok(())
}

pub(super) fn delete(conn: &mut Connection, id: ClassId) -> Result<(), StoreError> {
    let rows_affected = conn.execute("DELETE FROM classes_taught WHERE class_id = ?1", params![id])?;
    if rows_affected == 0 {
        return Err(StoreError::NotFound(id));
    }
    Ok(())
}

pub(super) fn get(conn: &mut Connection, id: ClassId) -> Result<ClassRecord, StoreError> {
    let sql = format!("{SELECT_CLASSES} WHERE c.class_id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(row) => row_to_class(row),
        None => Err(StoreError::NotFound(id)),
    }
}

pub(super) fn list(conn: &mut Connection, filter: &ClassFilter) -> Result<Vec<ClassRecord>, StoreError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(since) = filter.since {
        clauses.push("c.class_date >= ?");
        values.push(Value::Text(since.format("%Y-%m-%d").to_string()));
    }
    if let Some(until) = filter.until {
        clauses.push("c.class_date <= ?");
        values.push(Value::Text(until.format("%Y-%m-%d").to_string()));
    }
    if let Some(location) = &filter.location {
        clauses.push("l.location_name = ?");
        values.push(Value::Text(location.clone()));
    }
    if let Some(class_type) = &filter.class_type {
        clauses.push("ct.display_name = ?");
        values.push(Value::Text(class_type.clone()));
    }
    if let Some(theme) = &filter.theme {
        clauses.push("COALESCE(t.theme_name, c.custom_theme) = ?");
        values.push(Value::Text(theme.clone()));
    }
    if let Some(min) = filter.min_students {
        clauses.push("c.student_count >= ?");
        values.push(Value::Integer(min as i64));
    }
    // Search is applied to decoded rows; SQLite's LOWER and LIKE only fold
    // ASCII and treat % and _ as wildcards.

    let mut sql = SELECT_CLASSES.to_string();
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY c.class_date DESC, c.class_time DESC, c.class_id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(values.iter()))?;
    let mut classes = Vec::new();
    while let Some(row) = rows.next()? {
        let class = row_to_class(row)?;
        if filter.matches_search(&class) {
            classes.push(class);
        }
    }
    Ok(classes)
}
