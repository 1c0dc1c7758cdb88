use std::fs;
use std::io::{self, Write};
use std::path::Path;

use chrono::{NaiveDate, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::auth::{self, Session};
use crate::config::Config;
use crate::documents;
use crate::error::{Error, Result};
use crate::expansion::expand;
use crate::lifecycle::{self, NewAval};
use crate::models::{Activity, ActivityType, Aval, AvalStatus, DocumentType, InternalDocument, Member, Role, Task};
use crate::storage::Store;

/// Storage bucket that receives request forms attached to avales.
pub const FORMS_BUCKET: &str = "avales-files";

/// Reason suggested when rejecting from the dashboard.
pub const DEFAULT_REJECTION_REASON: &str = "Documentación incompleta";

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|n| Cell::new(n).add_attribute(Attribute::Bold))
        .collect()
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Badge color for a status, matching the web dashboard.
pub fn status_color(status: AvalStatus) -> Color {
    match status {
        AvalStatus::Pendiente => Color::Yellow,
        AvalStatus::EnProceso => Color::Blue,
        AvalStatus::Aprobado => Color::Green,
        AvalStatus::Rechazado => Color::Red,
        AvalStatus::Finalizado => Color::Grey,
    }
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|source| Error::InvalidDate { input: input.to_string(), source })
}

fn non_empty(value: &str, field: &'static str) -> Result<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(Error::InvalidInput { field, reason: "must not be empty".into() });
    }
    Ok(v.to_string())
}

/// Fails with `AuthenticationRequired` unless an admin is signed in.
///
/// Every admin command calls this before touching the store.
pub fn require_admin(store: &Store) -> Result<Session> {
    let session = auth::require_session(store).inspect_err(|_| {
        tracing::warn!("admin command attempted without a session");
    })?;
    Ok(session)
}

/// Signs in as the committee admin.
pub fn cmd_login(store: &Store, config: &Config, email: &str, password: &str, silent: bool) -> Result<Session> {
    let session = auth::sign_in(store, config, email, password)?;
    if !silent { println!("Signed in as {}.", session.email); }
    Ok(session)
}

pub fn cmd_logout(store: &Store, silent: bool) -> Result<()> {
    auth::sign_out(store)?;
    if !silent { println!("Signed out."); }
    Ok(())
}

/// Prints who is signed in.
pub fn cmd_whoami(store: &Store) -> Result<()> {
    match auth::current_session(store)? {
        Some(s) => println!("{} (since {})", s.email, s.signed_in_at.format("%Y-%m-%d %H:%M")),
        None => println!("Not signed in."),
    }
    Ok(())
}

/// Creates an activity and its task checklist.
///
/// The activity is persisted first so its id is known, then the current
/// roster is expanded against the role catalog and the tasks are persisted.
pub fn cmd_activity_add(
    store: &Store,
    title: String,
    kind: ActivityType,
    date: String,
    hours: Option<f64>,
    silent: bool,
) -> Result<(Activity, Vec<Task>)> {
    require_admin(store)?;
    let title = non_empty(&title, "title")?;
    let date = parse_date(&date)?;
    let hours = hours.unwrap_or(0.0);
    if !hours.is_finite() || hours < 0.0 {
        return Err(Error::InvalidInput { field: "hours", reason: format!("{} is not a valid duration", hours) });
    }

    let activity = store.insert(Activity {
        id: 0,
        title,
        kind,
        date,
        hours,
        created_at: Utc::now(),
    })?;

    let members: Vec<Member> = store.load_all()?;
    let tasks = store.insert_many(expand(&activity, &members))?;
    tracing::info!(activity_id = activity.id, tasks = tasks.len(), "activity created");

    if !silent {
        println!("Activity added (id = {}) with {} tasks.", activity.id, tasks.len());
    }
    Ok((activity, tasks))
}

/// Lists activities, newest first.
pub fn cmd_activity_list(store: &Store) -> Result<()> {
    require_admin(store)?;
    let activities: Vec<Activity> = store.list_recent()?;
    if activities.is_empty() {
        println!("No activities found.");
        return Ok(());
    }
    let tasks: Vec<Task> = store.load_all()?;

    let mut table = new_table();
    table.set_header(header(&["ID", "Title", "Type", "Date", "Hours", "Tasks"]));
    for a in activities {
        let count = tasks.iter().filter(|t| t.activity_id == a.id).count();
        table.add_row(vec![
            Cell::new(a.id),
            Cell::new(&a.title),
            Cell::new(a.kind),
            Cell::new(a.date),
            Cell::new(format!("{:.1}", a.hours)),
            Cell::new(count),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Tasks generated for one activity, in catalog order.
pub fn activity_tasks(store: &Store, activity_id: u64) -> Result<Vec<Task>> {
    require_admin(store)?;
    store.get::<Activity>(activity_id)?;
    let mut tasks: Vec<Task> = store.load_all()?;
    tasks.retain(|t| t.activity_id == activity_id);
    Ok(tasks)
}

pub fn cmd_activity_tasks(store: &Store, activity_id: u64) -> Result<()> {
    let tasks = activity_tasks(store, activity_id)?;
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    let mut table = new_table();
    table.set_header(header(&["ID", "Role", "Title", "Description", "Assigned To", "Evidence"]));
    for t in tasks {
        let unassigned = t.assigned_to == crate::models::UNASSIGNED;
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(t.role),
            Cell::new(&t.title),
            Cell::new(&t.description),
            Cell::new(&t.assigned_to).fg(if unassigned { Color::Red } else { Color::Reset }),
            Cell::new(if t.evidence_required { "Yes" } else { "-" }),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Adds a committee member.
pub fn cmd_member_add(store: &Store, name: String, role: Role, silent: bool) -> Result<Member> {
    require_admin(store)?;
    let name = non_empty(&name, "name")?;
    let member = store.insert(Member { id: 0, name, role, active: true })?;
    tracing::info!(member_id = member.id, role = %member.role, "member added");
    if !silent { println!("Member added (id = {}).", member.id); }
    Ok(member)
}

/// Marks a member active or inactive. Inactive members receive no new tasks.
pub fn cmd_member_set_active(store: &Store, id: u64, active: bool, silent: bool) -> Result<Member> {
    require_admin(store)?;
    let mut member: Member = store.get(id)?;
    member.active = active;
    store.update(&member)?;
    if !silent {
        println!("Member {} {}.", id, if active { "activated" } else { "deactivated" });
    }
    Ok(member)
}

pub fn cmd_member_list(store: &Store) -> Result<()> {
    require_admin(store)?;
    let members: Vec<Member> = store.load_all()?;
    if members.is_empty() {
        println!("No members found.");
        return Ok(());
    }
    let mut table = new_table();
    table.set_header(header(&["ID", "Name", "Role", "Status"]));
    for m in members {
        table.add_row(vec![
            Cell::new(m.id),
            Cell::new(&m.name),
            Cell::new(m.role),
            if m.active {
                Cell::new("Active").fg(Color::Green)
            } else {
                Cell::new("Inactive").fg(Color::Grey)
            },
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Submits an external approval request, uploading the form first if given.
pub fn cmd_aval_submit(
    store: &Store,
    applicant_name: String,
    activity_name: String,
    email: String,
    form: Option<&Path>,
    silent: bool,
) -> Result<Aval> {
    let request = NewAval { applicant_name, activity_name, email, form_url: None };
    // Validate first: a rejected submission must not leave an uploaded file.
    let mut aval = lifecycle::submit(request)?;

    if let Some(path) = form {
        aval.form_url = Some(store.upload(FORMS_BUCKET, path)?);
    }
    let uploaded = aval.form_url.clone();
    let aval = store.insert(aval).inspect_err(|_| {
        if let Some(url) = &uploaded {
            if let Err(e) = fs::remove_file(store.blob_path(FORMS_BUCKET, url)) {
                tracing::warn!(error = %e, path = %url, "could not remove orphaned upload");
            }
        }
    })?;
    tracing::info!(aval_id = aval.id, has_form = aval.form_url.is_some(), "aval submitted");
    if !silent { println!("Request submitted (id = {}).", aval.id); }
    Ok(aval)
}

/// Records an admin decision on an aval.
pub fn cmd_aval_decide(store: &Store, id: u64, status: AvalStatus, reason: Option<String>, silent: bool) -> Result<Aval> {
    require_admin(store)?;
    let current: Aval = store.get(id)?;
    let decided = lifecycle::decide(&current, status, reason.as_deref())?;
    store.update(&decided)?;
    tracing::info!(aval_id = id, status = %decided.status, "aval decided");
    if !silent { println!("Aval {} marked as {}.", id, decided.status); }
    Ok(decided)
}

pub fn cmd_aval_approve(store: &Store, id: u64, silent: bool) -> Result<Aval> {
    cmd_aval_decide(store, id, AvalStatus::Aprobado, None, silent)
}

pub fn cmd_aval_reject(store: &Store, id: u64, reason: String, silent: bool) -> Result<Aval> {
    cmd_aval_decide(store, id, AvalStatus::Rechazado, Some(reason), silent)
}

/// Lists avales newest first, optionally only those with one status.
pub fn cmd_aval_list(store: &Store, status: Option<AvalStatus>) -> Result<()> {
    require_admin(store)?;
    let mut avales: Vec<Aval> = store.list_recent()?;
    if let Some(s) = status {
        avales.retain(|a| a.status == s);
    }
    if avales.is_empty() {
        println!("No requests found.");
        return Ok(());
    }
    let mut table = new_table();
    table.set_header(header(&["ID", "Applicant", "Activity", "Email", "Form", "Status", "Reason"]));
    for a in avales {
        table.add_row(vec![
            Cell::new(a.id),
            Cell::new(&a.applicant_name),
            Cell::new(&a.activity_name),
            Cell::new(&a.email),
            Cell::new(a.form_url.as_deref().unwrap_or("-")),
            Cell::new(a.status).fg(status_color(a.status)),
            Cell::new(a.rejection_reason.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Generates a payment or supplies letter for an activity and registers it.
///
/// Returns the stored document and the rendered letter.
pub fn cmd_letter(
    store: &Store,
    activity_id: u64,
    kind: DocumentType,
    author: Option<String>,
    silent: bool,
) -> Result<(InternalDocument, String)> {
    require_admin(store)?;
    let activity: Activity = store.get(activity_id)?;
    let doc = store.insert(documents::generate(kind, &activity, author.as_deref()))?;
    let letter = documents::render_letter(&doc, &activity);
    tracing::info!(document_id = doc.id, kind = %doc.kind, activity_id, "letter generated");
    if !silent {
        println!("{letter}");
        println!("Letter registered (id = {}).", doc.id);
    }
    Ok((doc, letter))
}

/// Prints the history: every aval with its status and every generated document.
pub fn cmd_report(store: &Store) -> Result<()> {
    require_admin(store)?;
    let avales: Vec<Aval> = store.list_recent()?;
    let docs: Vec<InternalDocument> = store.list_recent()?;

    let mut avales_table = new_table();
    avales_table.set_header(header(&["Activity", "Applicant", "Status"]));
    for a in &avales {
        avales_table.add_row(vec![
            Cell::new(&a.activity_name),
            Cell::new(&a.applicant_name),
            Cell::new(a.status).fg(status_color(a.status)),
        ]);
    }
    println!("Registered avales ({})", avales.len());
    println!("{avales_table}");

    let summary: Vec<String> = [AvalStatus::Pendiente, AvalStatus::Aprobado, AvalStatus::Rechazado]
        .iter()
        .map(|s| format!("{}: {}", s, avales.iter().filter(|a| a.status == *s).count()))
        .collect();
    println!("{}", summary.join(" | "));
    println!();

    let mut docs_table = new_table();
    docs_table.set_header(header(&["Type", "Activity", "Author", "Date"]));
    for d in &docs {
        docs_table.add_row(vec![
            Cell::new(d.kind.to_string().to_uppercase()).add_attribute(Attribute::Bold),
            Cell::new(&d.activity_name),
            Cell::new(&d.author),
            Cell::new(d.created_at.format("%Y-%m-%d")),
        ]);
    }
    println!("Generated documents ({})", docs.len());
    println!("{docs_table}");
    Ok(())
}

/// Resets the data directory by deleting all collections, the session and uploads.
pub fn cmd_reset(store: &Store, force: bool) -> Result<()> {
    require_admin(store)?;
    if !force {
        print!("Are you sure you want to delete all data? This cannot be undone. [y/N] ");
        io::stdout().flush().map_err(crate::error::StoreError::from)?;
        let mut input = String::new();
        io::stdin().read_line(&mut input).map_err(crate::error::StoreError::from)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }
    store.reset()?;
    tracing::info!(root = %store.root().display(), "data reset");
    println!("Data reset successfully.");
    Ok(())
}
