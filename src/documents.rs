use chrono::Utc;

use crate::models::{Activity, DocumentType, InternalDocument};

/// Author recorded when a letter is generated without an explicit signer.
pub const DEFAULT_AUTHOR: &str = "Sistema";

/// Builds the record for a letter about `activity`. The id is assigned on insert.
pub fn generate(kind: DocumentType, activity: &Activity, author: Option<&str>) -> InternalDocument {
    let author = author
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(DEFAULT_AUTHOR);
    InternalDocument {
        id: 0,
        kind,
        activity_name: activity.title.clone(),
        author: author.to_string(),
        created_at: Utc::now(),
    }
}

fn subject(kind: DocumentType) -> &'static str {
    match kind {
        DocumentType::Pago => "Solicitud de pago",
        DocumentType::Suministros => "Solicitud de suministros",
    }
}

/// Renders the plain-text body of a generated letter.
pub fn render_letter(doc: &InternalDocument, activity: &Activity) -> String {
    let request = match doc.kind {
        DocumentType::Pago => "el pago correspondiente a",
        DocumentType::Suministros => "los suministros necesarios para",
    };
    format!(
        "Guatemala, {date}\n\
         \n\
         Asunto: {subject} (documento No. {id})\n\
         \n\
         Por este medio se solicita {request} la actividad \"{title}\" \
         ({kind}), programada para el {activity_date} con una duración de {hours} horas.\n\
         \n\
         Atentamente,\n\
         {author}\n",
        date = doc.created_at.format("%Y-%m-%d"),
        subject = subject(doc.kind),
        id = doc.id,
        request = request,
        title = activity.title,
        kind = activity.kind,
        activity_date = activity.date,
        hours = activity.hours,
        author = doc.author,
    )
}
