use avales::catalog::{task_count, templates_for, ROLE_TEMPLATES};
use avales::expansion::{assignee_for, expand};
use avales::models::{Activity, ActivityType, Member, Role, UNASSIGNED};
use chrono::{NaiveDate, Utc};

fn activity(id: u64) -> Activity {
    Activity {
        id,
        title: "Curso X".into(),
        kind: ActivityType::Diplomado,
        date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        hours: 40.0,
        created_at: Utc::now(),
    }
}

fn member(id: u64, name: &str, role: Role, active: bool) -> Member {
    Member { id, name: name.into(), role, active }
}

#[test]
fn test_catalog_covers_every_role() {
    assert_eq!(ROLE_TEMPLATES.len(), 7);
    assert_eq!(task_count(), 10);
    for role in Role::ALL {
        assert!(!templates_for(role).is_empty(), "{} has no templates", role);
    }
    // Declaration order, not alphabetical
    let order: Vec<Role> = ROLE_TEMPLATES.iter().map(|(r, _)| *r).collect();
    assert_eq!(order, Role::ALL.to_vec());
}

#[test]
fn test_expand_with_empty_roster() {
    let tasks = expand(&activity(7), &[]);
    assert_eq!(tasks.len(), 10);
    assert!(tasks.iter().all(|t| t.assigned_to == UNASSIGNED));
    assert!(tasks.iter().all(|t| t.activity_id == 7));
    assert!(tasks.iter().all(|t| t.id == 0));
}

#[test]
fn test_expand_assigns_role_holder() {
    let members = vec![member(1, "Dra. Rebeca Ramírez", Role::Coordinadora, true)];
    let tasks = expand(&activity(1), &members);

    let coord: Vec<_> = tasks.iter().filter(|t| t.role == Role::Coordinadora).collect();
    assert_eq!(coord.len(), 2);
    assert!(coord.iter().all(|t| t.assigned_to == "Dra. Rebeca Ramírez"));

    assert!(tasks
        .iter()
        .filter(|t| t.role != Role::Coordinadora)
        .all(|t| t.assigned_to == UNASSIGNED));
}

#[test]
fn test_expand_follows_catalog_order() {
    let tasks = expand(&activity(1), &[]);
    let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles[0], "Aprobar agenda y lineamientos");
    assert_eq!(titles[1], "Firmar solicitudes");
    assert_eq!(titles[2], "Abrir expediente interno");
    assert_eq!(titles[9], "Apoyo actas y difusión");
    assert_eq!(tasks[9].role, Role::Prosecretaria);
}

#[test]
fn test_expand_copies_blueprint_fields() {
    let tasks = expand(&activity(1), &[]);
    let review = tasks.iter().find(|t| t.title == "Revisión científica").unwrap();
    assert_eq!(review.role, Role::GestorDelConocimiento);
    assert_eq!(review.description, "Verificación académica (Art. 10).");
    assert!(review.evidence_required);

    let support = tasks.iter().find(|t| t.role == Role::VocalI).unwrap();
    assert!(!support.evidence_required);
}

#[test]
fn test_inactive_members_are_skipped() {
    let members = vec![
        member(1, "Inactiva", Role::Secretaria, false),
        member(2, "Activa", Role::Secretaria, true),
    ];
    let tasks = expand(&activity(1), &members);
    assert!(tasks
        .iter()
        .filter(|t| t.role == Role::Secretaria)
        .all(|t| t.assigned_to == "Activa"));

    let only_inactive = vec![member(1, "Inactiva", Role::Secretaria, false)];
    let tasks = expand(&activity(1), &only_inactive);
    assert!(tasks
        .iter()
        .filter(|t| t.role == Role::Secretaria)
        .all(|t| t.assigned_to == UNASSIGNED));
}

#[test]
fn test_duplicate_role_holders_resolve_deterministically() {
    let a = member(5, "Segunda", Role::VocalII, true);
    let b = member(3, "Primera", Role::VocalII, true);

    let forward = expand(&activity(1), &[a.clone(), b.clone()]);
    let backward = expand(&activity(1), &[b.clone(), a.clone()]);
    assert_eq!(forward, backward);
    assert_eq!(forward, expand(&activity(1), &[a.clone(), b.clone()]));

    let members = [a, b];
    assert_eq!(assignee_for(Role::VocalII, &members).map(|m| m.id), Some(3));
    assert!(assignee_for(Role::VocalI, &members).is_none());
}
