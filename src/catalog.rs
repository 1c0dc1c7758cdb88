use crate::models::Role;

/// A task every new activity hands to a role-holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskBlueprint {
    pub title: &'static str,
    pub description: &'static str,
    pub evidence_required: bool,
}

const fn blueprint(title: &'static str, description: &'static str, evidence_required: bool) -> TaskBlueprint {
    TaskBlueprint { title, description, evidence_required }
}

/// Role template catalog, in declaration order.
///
/// Articles refer to the committee's internal regulations.
pub static ROLE_TEMPLATES: &[(Role, &[TaskBlueprint])] = &[
    (Role::Coordinadora, &[
        blueprint("Aprobar agenda y lineamientos", "Convoca, preside y dirige (Art. 6).", true),
        blueprint("Firmar solicitudes", "Gestión ante Junta Directiva.", true),
    ]),
    (Role::Secretaria, &[
        blueprint("Abrir expediente interno", "Archivo y correspondencia (Art. 8).", true),
        blueprint("Redactar actas", "Documentación oficial.", true),
    ]),
    (Role::GestorDelConocimiento, &[
        blueprint("Revisión científica", "Verificación académica (Art. 10).", true),
        blueprint("Coordinar difusión", "Enlace con redes.", true),
    ]),
    (Role::VocalI, &[
        blueprint("Apoyo logístico", "Cooperación (Art. 11).", false),
    ]),
    (Role::VocalII, &[
        blueprint("Apoyo logístico", "Cooperación (Art. 11).", false),
    ]),
    (Role::Subcoordinador, &[
        blueprint("Seguimiento ejecución", "Supervisión (Art. 7).", false),
    ]),
    (Role::Prosecretaria, &[
        blueprint("Apoyo actas y difusión", "Colaboración (Art. 9).", false),
    ]),
];

/// Returns the blueprints for one role, or an empty slice if the role has none.
pub fn templates_for(role: Role) -> &'static [TaskBlueprint] {
    ROLE_TEMPLATES
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, t)| *t)
        .unwrap_or(&[])
}

/// Total number of tasks a single activity expands into.
pub fn task_count() -> usize {
    ROLE_TEMPLATES.iter().map(|(_, t)| t.len()).sum()
}
