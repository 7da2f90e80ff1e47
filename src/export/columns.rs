use super::Format;
use crate::model::AgendaItem;
use crate::time::short_display;

pub(crate) const NO_FILING_NUMBER: &str = "Sin radicado";

pub(crate) const TASK_LABELS: &[&str] = &[
    "Cliente",
    "Número de Radicado",
    "Despacho",
    "Tarea",
    "Descripción",
    "Fecha de Vencimiento",
];

pub(crate) const HEARING_LABELS: &[&str] = &[
    "Cliente",
    "Número de Radicado",
    "Despacho",
    "Audiencia",
    "Descripción",
    "Estado de la Audiencia",
    "Fecha",
];

pub(crate) const TERM_LABELS: &[&str] = &[
    "Cliente",
    "Número de Radicado",
    "Despacho",
    "Término",
    "Descripción",
    "Días de Término",
    "Fecha de Notificación",
    "Fecha de Vencimiento",
];

pub(crate) fn labels(format: Format) -> &'static [&'static str] {
    match format {
        Format::Tasks => TASK_LABELS,
        Format::Hearings => HEARING_LABELS,
        Format::Terms => TERM_LABELS,
    }
}

fn date_cell(value: Option<&str>) -> String {
    value.map(short_display).unwrap_or_default()
}

fn text_cell(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

/// Display values of one item, in the order of [`labels`] for the sheet.
pub(crate) fn project(format: Format, item: &AgendaItem) -> Vec<String> {
    let (client, filing_number, court) = match &item.process {
        Some(process) => (
            process.client.name.clone(),
            process
                .filing_number
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| NO_FILING_NUMBER.to_string()),
            process.court.clone(),
        ),
        None => (String::new(), NO_FILING_NUMBER.to_string(), String::new()),
    };

    let mut cells = vec![client, filing_number, court, item.name.clone()];
    cells.push(text_cell(item.description.as_deref()));
    match format {
        Format::Tasks => {
            cells.push(date_cell(item.due_date.as_deref()));
        }
        Format::Hearings => {
            cells.push(text_cell(item.hearing_status.as_deref()));
            cells.push(date_cell(item.due_date.as_deref()));
        }
        Format::Terms => {
            cells.push(item.days_term.map(|d| d.to_string()).unwrap_or_default());
            cells.push(date_cell(item.notification_date.as_deref()));
            cells.push(date_cell(item.due_date.as_deref()));
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sheet_projects_one_cell_per_label() {
        let item = AgendaItem {
            id: "i1".into(),
            process_id: "p1".into(),
            name: "Item".into(),
            description: None,
            due_date: Some("2024-03-15".into()),
            priority: Default::default(),
            status: Default::default(),
            responsable: None,
            created_at: "2024-03-01T00:00:00.000Z".into(),
            hearing_status: None,
            days_term: Some(5),
            notification_date: None,
            location: None,
            comments: Vec::new(),
            process: None,
        };
        for format in [Format::Tasks, Format::Hearings, Format::Terms] {
            assert_eq!(project(format, &item).len(), labels(format).len(), "{format:?}");
        }
    }
}
