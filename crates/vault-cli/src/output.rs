//! Text and JSON rendering of command results

use serde::Serialize;
use serde_json::json;
use std::io::Write;
use vault_core::{
    ActivityEntry, AuditReport, CredentialRecord, HistoryEntry, SecretString, ShareRecord,
    StrengthLabel,
};

pub type Out<'a> = &'a mut dyn Write;

pub fn json<T: Serialize + ?Sized>(out: Out<'_>, value: &T) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

pub fn strength(out: Out<'_>, score: u8) -> std::io::Result<()> {
    writeln!(out, "Strength: {} ({}%)", StrengthLabel::from_score(score), score)
}

pub fn credential_line(out: Out<'_>, record: &CredentialRecord) -> std::io::Result<()> {
    writeln!(
        out,
        "{}  {:<24} {:<28} [{}]",
        record.id, record.title, record.username, record.category
    )
}

pub fn credential_detail(
    out: Out<'_>,
    record: &CredentialRecord,
    password: Option<&SecretString>,
) -> std::io::Result<()> {
    writeln!(out, "ID:       {}", record.id)?;
    writeln!(out, "Title:    {}", record.title)?;
    writeln!(out, "Username: {}", record.username)?;
    match password {
        Some(password) => writeln!(out, "Password: {}", password.expose())?,
        None => writeln!(out, "Password: ••••••••••••")?,
    }
    if let Some(url) = &record.url {
        writeln!(out, "URL:      {}", url)?;
    }
    writeln!(out, "Category: {}", record.category)?;
    if let Some(notes) = &record.notes {
        writeln!(out, "Notes:    {}", notes)?;
    }
    writeln!(out, "Updated:  {}", record.updated_at.to_rfc3339())
}

pub fn credential_json(
    out: Out<'_>,
    record: &CredentialRecord,
    password: Option<&SecretString>,
) -> std::io::Result<()> {
    let mut value = json!(record);
    if let (Some(password), Some(object)) = (password, value.as_object_mut()) {
        object.insert("password".to_string(), json!(password.expose()));
    }
    json(out, &value)
}

pub fn history(
    out: Out<'_>,
    entries: &[(HistoryEntry, Option<SecretString>)],
) -> std::io::Result<()> {
    for (entry, password) in entries {
        let shown = password
            .as_ref()
            .map(SecretString::expose)
            .unwrap_or("••••••••••••");
        writeln!(
            out,
            "{}  {:<10} {:>3}%  {}",
            entry.created_at.to_rfc3339(),
            entry.label(),
            entry.strength,
            shown
        )?;
    }
    Ok(())
}

pub fn activity(out: Out<'_>, entries: &[ActivityEntry]) -> std::io::Result<()> {
    for entry in entries {
        writeln!(
            out,
            "{}  {:<16} {}",
            entry.created_at.to_rfc3339(),
            entry.kind,
            entry.title
        )?;
    }
    Ok(())
}

pub fn shares(out: Out<'_>, records: &[ShareRecord]) -> std::io::Result<()> {
    for record in records {
        writeln!(
            out,
            "{}  {:<24} -> {}",
            record.sent_at.to_rfc3339(),
            record.title,
            record.recipient_email
        )?;
    }
    Ok(())
}

pub fn audit(out: Out<'_>, report: &AuditReport) -> std::io::Result<()> {
    writeln!(out, "Credentials: {}", report.total)?;
    writeln!(
        out,
        "Excellent: {}  Strong: {}  Medium: {}  Weak: {}",
        report.strength.excellent,
        report.strength.strong,
        report.strength.medium,
        report.strength.weak
    )?;
    writeln!(out, "Expired: {}", report.expired.len())?;
    for id in &report.weak {
        writeln!(out, "  weak:    {}", id)?;
    }
    for id in &report.expired {
        writeln!(out, "  expired: {}", id)?;
    }
    Ok(())
}
