use std::fs;

use avales::auth::{current_session, require_session, sign_in, sign_out};
use avales::commands::*;
use avales::config::Config;
use avales::error::{AuthError, Error, LifecycleError, StoreError};
use avales::models::{Activity, ActivityType, Aval, AvalStatus, DocumentType, InternalDocument, Member, Role, Task, UNASSIGNED};
use avales::storage::Store;
use tempfile::TempDir;

fn with_signed_out_store<F>(f: F)
where
    F: FnOnce(&Store, &Config),
{
    let dir = TempDir::new().expect("tempdir");
    let config = Config::with_data_dir(dir.path());
    let store = Store::open(dir.path()).expect("open store");
    f(&store, &config);
}

/// Runs `f` against a fresh store with the admin signed in.
fn with_test_store<F>(f: F)
where
    F: FnOnce(&Store, &Config),
{
    with_signed_out_store(|store, config| {
        sign_in(store, config, &config.admin_email, &config.admin_password).expect("sign in");
        f(store, config);
    });
}

fn submit(store: &Store, applicant: &str) -> Aval {
    cmd_aval_submit(store, applicant.into(), "Congreso 2025".into(), "x@y.com".into(), None, true).unwrap()
}

#[test]
fn test_activity_add_creates_tasks() {
    with_test_store(|store, _| {
        cmd_member_add(store, "Dra. Rebeca Ramírez".into(), Role::Coordinadora, true).unwrap();

        let (activity, tasks) = cmd_activity_add(
            store, "Curso X".into(), ActivityType::Taller, "2025-03-01".into(), Some(16.0), true,
        ).unwrap();
        assert_eq!(activity.id, 1);
        assert_eq!(tasks.len(), 10);

        let stored: Vec<Task> = store.load_all().unwrap();
        assert_eq!(stored, tasks);
        let mut ids: Vec<u64> = stored.iter().map(|t| t.id).collect();
        ids.dedup();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
        assert!(stored.iter().all(|t| t.activity_id == activity.id));
        assert!(stored
            .iter()
            .filter(|t| t.role == Role::Coordinadora)
            .all(|t| t.assigned_to == "Dra. Rebeca Ramírez"));
        assert!(stored
            .iter()
            .filter(|t| t.role != Role::Coordinadora)
            .all(|t| t.assigned_to == UNASSIGNED));
    });
}

#[test]
fn test_second_activity_gets_its_own_tasks() {
    with_test_store(|store, _| {
        let (first, _) = cmd_activity_add(store, "A".into(), ActivityType::Diplomado, "2025-01-10".into(), None, true).unwrap();
        let (second, tasks) = cmd_activity_add(store, "B".into(), ActivityType::Conferencia, "2025-02-10".into(), None, true).unwrap();
        assert_eq!(second.id, first.id + 1);
        assert_eq!(tasks.first().map(|t| t.id), Some(11));

        assert_eq!(activity_tasks(store, first.id).unwrap().len(), 10);
        assert_eq!(activity_tasks(store, second.id).unwrap().len(), 10);

        let listed: Vec<Activity> = store.list_recent().unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    });
}

#[test]
fn test_activity_add_rejects_bad_input() {
    with_test_store(|store, _| {
        let err = cmd_activity_add(store, "X".into(), ActivityType::Taller, "01/03/2025".into(), None, true).unwrap_err();
        assert!(matches!(err, Error::InvalidDate { .. }));

        let err = cmd_activity_add(store, "  ".into(), ActivityType::Taller, "2025-03-01".into(), None, true).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { field: "title", .. }));

        let err = cmd_activity_add(store, "X".into(), ActivityType::Taller, "2025-03-01".into(), Some(-2.0), true).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { field: "hours", .. }));

        // Nothing was persisted
        assert!(store.load_all::<Activity>().unwrap().is_empty());
        assert!(store.load_all::<Task>().unwrap().is_empty());
    });
}

#[test]
fn test_deactivated_member_is_not_assigned() {
    with_test_store(|store, _| {
        let m = cmd_member_add(store, "Lic. Pérez".into(), Role::Secretaria, true).unwrap();
        cmd_member_set_active(store, m.id, false, true).unwrap();

        let stored: Member = store.get(m.id).unwrap();
        assert!(!stored.active);

        let (_, tasks) = cmd_activity_add(store, "Taller".into(), ActivityType::Taller, "2025-05-05".into(), None, true).unwrap();
        assert!(tasks
            .iter()
            .filter(|t| t.role == Role::Secretaria)
            .all(|t| t.assigned_to == UNASSIGNED));
    });
}

#[test]
fn test_submit_and_reject() {
    with_test_store(|store, _| {
        let aval = submit(store, "Asoc. Psiquiatría");
        assert_eq!(aval.id, 1);
        assert_eq!(aval.status, AvalStatus::Pendiente);

        let rejected = cmd_aval_reject(store, aval.id, "Documentación incompleta".into(), true).unwrap();
        assert_eq!(rejected.status, AvalStatus::Rechazado);

        let stored: Aval = store.get(aval.id).unwrap();
        assert_eq!(stored.status, AvalStatus::Rechazado);
        assert_eq!(stored.rejection_reason.as_deref(), Some("Documentación incompleta"));
    });
}

#[test]
fn test_decided_aval_cannot_be_decided_again() {
    with_test_store(|store, _| {
        let aval = submit(store, "Colegio");
        cmd_aval_approve(store, aval.id, true).unwrap();

        let err = cmd_aval_reject(store, aval.id, "cambio de opinión".into(), true).unwrap_err();
        assert!(matches!(
            err,
            Error::Lifecycle(LifecycleError::InvalidTransition { from: AvalStatus::Aprobado, .. })
        ));
        let stored: Aval = store.get(aval.id).unwrap();
        assert_eq!(stored.status, AvalStatus::Aprobado);
        assert_eq!(stored.rejection_reason, None);
    });
}

#[test]
fn test_reject_without_reason_keeps_request_pending() {
    with_test_store(|store, _| {
        let aval = submit(store, "Colegio");
        let err = cmd_aval_reject(store, aval.id, "".into(), true).unwrap_err();
        assert!(matches!(err, Error::Lifecycle(LifecycleError::MissingReason)));
        let stored: Aval = store.get(aval.id).unwrap();
        assert_eq!(stored.status, AvalStatus::Pendiente);
    });
}

#[test]
fn test_decide_unknown_aval() {
    with_test_store(|store, _| {
        let err = cmd_aval_approve(store, 42, true).unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::NotFound { collection: "avales", id: 42 })));
    });
}

#[test]
fn test_submit_with_form_upload() {
    with_test_store(|store, _| {
        let src_dir = TempDir::new().expect("tempdir");
        let form = src_dir.path().join("formulario.pdf");
        fs::write(&form, b"%PDF-1.4 test").unwrap();

        let aval = cmd_aval_submit(
            store, "Asoc.".into(), "Congreso".into(), "a@b.gt".into(), Some(form.as_path()), true,
        ).unwrap();
        let url = aval.form_url.expect("form url");
        assert!(url.starts_with("forms/"));
        assert!(url.ends_with("_formulario.pdf"));

        let copied = store.blob_path(FORMS_BUCKET, &url);
        assert_eq!(fs::read(copied).unwrap(), b"%PDF-1.4 test");
    });
}

#[test]
fn test_submit_with_missing_form_fails() {
    with_test_store(|store, _| {
        let missing = store.root().join("nope.pdf");
        let err = cmd_aval_submit(
            store, "Asoc.".into(), "Congreso".into(), "a@b.gt".into(), Some(missing.as_path()), true,
        ).unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::MissingFile(_))));
        assert!(store.load_all::<Aval>().unwrap().is_empty());
    });
}

#[test]
fn test_invalid_submission_is_not_stored() {
    with_test_store(|store, _| {
        let err = cmd_aval_submit(store, "".into(), "Congreso".into(), "a@b.gt".into(), None, true).unwrap_err();
        assert!(matches!(err, Error::Lifecycle(LifecycleError::Validation { field: "applicant_name" })));
        assert!(store.load_all::<Aval>().unwrap().is_empty());
    });
}

#[test]
fn test_avales_listed_newest_first() {
    with_test_store(|store, _| {
        let first = submit(store, "Primero");
        let second = submit(store, "Segundo");
        let listed: Vec<Aval> = store.list_recent().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    });
}

#[test]
fn test_letter_registers_document() {
    with_test_store(|store, _| {
        let (activity, _) = cmd_activity_add(store, "Curso X".into(), ActivityType::Diplomado, "2025-03-01".into(), Some(40.0), true).unwrap();

        let (doc, letter) = cmd_letter(store, activity.id, DocumentType::Pago, None, true).unwrap();
        assert_eq!(doc.kind, DocumentType::Pago);
        assert_eq!(doc.activity_name, "Curso X");
        assert_eq!(doc.author, "Sistema");
        assert!(letter.contains("Curso X"));
        assert!(letter.contains("Solicitud de pago"));

        let (doc2, _) = cmd_letter(store, activity.id, DocumentType::Suministros, Some("Secretaría".into()), true).unwrap();
        assert_eq!(doc2.author, "Secretaría");

        let docs: Vec<InternalDocument> = store.load_all().unwrap();
        assert_eq!(docs.len(), 2);
    });
}

#[test]
fn test_letter_for_unknown_activity() {
    with_test_store(|store, _| {
        let err = cmd_letter(store, 9, DocumentType::Pago, None, true).unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::NotFound { collection: "activities", id: 9 })));
        assert!(store.load_all::<InternalDocument>().unwrap().is_empty());
    });
}

#[test]
fn test_login_and_logout() {
    with_signed_out_store(|store, config| {
        assert!(matches!(require_session(store), Err(AuthError::AuthenticationRequired)));

        let err = cmd_login(store, config, "admin@caeduc.gt", "wrong", true).unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
        assert!(current_session(store).unwrap().is_none());

        let session = cmd_login(store, config, "admin@caeduc.gt", "admin", true).unwrap();
        assert_eq!(session.email, "admin@caeduc.gt");
        assert_eq!(require_session(store).unwrap().email, "admin@caeduc.gt");

        cmd_logout(store, true).unwrap();
        assert!(current_session(store).unwrap().is_none());
        // Signing out twice is fine
        sign_out(store).unwrap();
    });
}

#[test]
fn test_corrupt_collection_is_reported() {
    with_test_store(|store, _| {
        fs::write(store.root().join("avales.json"), "{ not json").unwrap();
        let err = store.load_all::<Aval>().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    });
}

#[test]
fn test_reset_clears_everything() {
    with_test_store(|store, config| {
        cmd_login(store, config, "admin@caeduc.gt", "admin", true).unwrap();
        submit(store, "Asoc.");
        cmd_activity_add(store, "Curso".into(), ActivityType::Taller, "2025-03-01".into(), None, true).unwrap();

        cmd_reset(store, true).unwrap();

        assert!(store.load_all::<Aval>().unwrap().is_empty());
        assert!(store.load_all::<Activity>().unwrap().is_empty());
        assert!(store.load_all::<Task>().unwrap().is_empty());
        assert!(current_session(store).unwrap().is_none());
    });
}

#[test]
fn test_admin_commands_require_session() {
    with_signed_out_store(|store, config| {
        let aval = submit(store, "Asoc.");

        let err = cmd_activity_add(store, "X".into(), ActivityType::Taller, "2025-03-01".into(), None, true).unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::AuthenticationRequired)));
        let err = cmd_member_add(store, "Lic. Pérez".into(), Role::Secretaria, true).unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::AuthenticationRequired)));
        let err = cmd_aval_approve(store, aval.id, true).unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::AuthenticationRequired)));
        let err = cmd_reset(store, true).unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::AuthenticationRequired)));

        // Nothing changed
        assert!(store.load_all::<Activity>().unwrap().is_empty());
        assert!(store.load_all::<Task>().unwrap().is_empty());
        assert!(store.load_all::<Member>().unwrap().is_empty());
        let stored: Aval = store.get(aval.id).unwrap();
        assert_eq!(stored.status, AvalStatus::Pendiente);

        // Works once signed in, and stops working after sign-out
        cmd_login(store, config, "admin@caeduc.gt", "admin", true).unwrap();
        cmd_aval_approve(store, aval.id, true).unwrap();
        cmd_logout(store, true).unwrap();
        let err = cmd_letter(store, 1, DocumentType::Pago, None, true).unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::AuthenticationRequired)));
    });
}

#[test]
fn test_failed_submit_removes_uploaded_form() {
    with_test_store(|store, _| {
        let src_dir = TempDir::new().expect("tempdir");
        let form = src_dir.path().join("formulario.pdf");
        fs::write(&form, b"%PDF-1.4 test").unwrap();
        fs::write(store.root().join("avales.json"), "{ not json").unwrap();

        let err = cmd_aval_submit(
            store, "Asoc.".into(), "Congreso".into(), "a@b.gt".into(), Some(form.as_path()), true,
        ).unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::Corrupt { .. })));

        let forms_dir = store.blob_path(FORMS_BUCKET, "forms");
        assert_eq!(fs::read_dir(forms_dir).unwrap().count(), 0);
    });
}

#[test]
fn test_uploads_with_same_name_are_kept_apart() {
    with_test_store(|store, _| {
        let src_dir = TempDir::new().expect("tempdir");
        let form = src_dir.path().join("formulario.pdf");
        fs::write(&form, b"first").unwrap();
        let first = store.upload(FORMS_BUCKET, &form).unwrap();
        fs::write(&form, b"second").unwrap();
        let second = store.upload(FORMS_BUCKET, &form).unwrap();

        assert_ne!(first, second);
        assert!(second.ends_with("_formulario.pdf"));
        assert_eq!(fs::read(store.blob_path(FORMS_BUCKET, &first)).unwrap(), b"first");
        assert_eq!(fs::read(store.blob_path(FORMS_BUCKET, &second)).unwrap(), b"second");
    });
}
