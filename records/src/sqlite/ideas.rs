use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};

use crate::{
    error::StoreError,
    model::{GeneratedIdea, IdeaKind},
};

fn table(kind: IdeaKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        IdeaKind::Theme => ("ai_generated_themes", "theme_name", "theme_approach"),
        IdeaKind::Sequence => ("ai_generated_sequences", "peak_pose", "sequence_outline"),
    }
}

pub(super) fn insert(conn: &mut Connection, idea: &GeneratedIdea) -> Result<(), StoreError> {
    let (table, title, body) = table(idea.kind);
    conn.execute(
        &format!("INSERT INTO {table} ({title}, {body}, created_at) VALUES (?1, ?2, ?3)"),
        params![idea.title, idea.body, idea.created_at.to_rfc3339_opts(SecondsFormat::Micros, true)],
    )?;
    Ok(())
}

pub(super) fn recent(
    conn: &mut Connection,
    kind: IdeaKind,
    limit: usize,
) -> Result<Vec<GeneratedIdea>, StoreError> {
    let (table, title, body) = table(kind);
    let mut stmt = conn.prepare(&format!(
        "SELECT {title}, {body}, created_at FROM {table} ORDER BY created_at DESC, id DESC LIMIT ?1"
    ))?;
    let mut rows = stmt.query(params![limit as i64])?;
    let mut ideas = Vec::new();
    while let Some(row) = rows.next()? {
        let created_at: String = row.get(2)?;
        ideas.push(GeneratedIdea {
            kind,
            title: row.get(0)?,
            body: row.get(1)?,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|err| StoreError::InvalidRow(format!("created_at: {err}")))?,
        });
    }
    Ok(ideas)
}
