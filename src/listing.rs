//! Client-side filter → sort → paginate pipeline shared by every list
//! screen. Each stage is an injectable function so screens only describe
//! what differs.

use std::cmp::Ordering;

use serde::Serialize;

use crate::model::{AgendaItem, Client, Process, ProcessAction, Status};
use crate::store::SortDirection;

pub type Predicate<'a, T> = Box<dyn Fn(&T) -> bool + 'a>;
pub type Comparator<'a, T> = Box<dyn Fn(&T, &T) -> Ordering + 'a>;

pub const ACTIONS_PAGE_SIZE: usize = 10;
pub const CLIENTS_PAGE_SIZE: usize = 5;
pub const PROCESSES_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number that was requested.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// 1-based index of the first item shown, or 0 for an empty page.
    pub fn first_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.page_size + 1
        }
    }

    /// 1-based index of the last item shown, or 0 for an empty page.
    pub fn last_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.first_index() + self.items.len() - 1
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

pub struct Listing<'a, T> {
    predicate: Option<Predicate<'a, T>>,
    comparator: Option<Comparator<'a, T>>,
    page_size: usize,
}

impl<'a, T: Clone> Listing<'a, T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            predicate: None,
            comparator: None,
            page_size: page_size.max(1),
        }
    }

    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + 'a) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    pub fn sort(mut self, comparator: impl Fn(&T, &T) -> Ordering + 'a) -> Self {
        self.comparator = Some(Box::new(comparator));
        self
    }

    /// Items that pass the filter, stably sorted, without paging.
    pub fn collect(&self, items: &[T]) -> Vec<T> {
        let mut selected: Vec<T> = match &self.predicate {
            Some(predicate) => items.iter().filter(|&item| predicate(item)).cloned().collect(),
            None => items.to_vec(),
        };
        if let Some(comparator) = &self.comparator {
            selected.sort_by(|a, b| comparator(a, b));
        }
        selected
    }

    /// Filters, sorts and returns the requested 1-based page. Pages past
    /// the end come back empty; page 0 is treated as page 1.
    pub fn apply(&self, items: &[T], page: usize) -> Page<T> {
        let selected = self.collect(items);
        let page = page.max(1);
        let total_items = selected.len();
        let total_pages = total_items.div_ceil(self.page_size);
        let start = (page - 1).saturating_mul(self.page_size);
        let items = selected
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect();
        Page {
            items,
            page,
            page_size: self.page_size,
            total_items,
            total_pages,
        }
    }
}

/// Case-insensitive substring match over any of the given fields. An empty
/// query matches everything.
pub fn text_search<'a, T: 'a>(
    query: &str,
    fields: impl Fn(&T) -> Vec<Option<&str>> + 'a,
) -> impl Fn(&T) -> bool + 'a {
    let needle = query.to_lowercase();
    move |item| {
        needle.is_empty()
            || fields(item)
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// `None` (the "all" option) accepts every item.
pub fn responsable_filter(responsable: Option<&str>) -> impl Fn(&AgendaItem) -> bool + '_ {
    move |item| match responsable {
        None => true,
        Some(wanted) => item.responsable.as_deref() == Some(wanted),
    }
}

/// `None` keeps every status.
pub fn status_filter(status: Option<Status>) -> impl Fn(&AgendaItem) -> bool {
    move |item| status.map_or(true, |wanted| item.status == wanted)
}

/// Records stamped with an RFC 3339 `created_at` on insert.
pub trait Stamped {
    fn created_at(&self) -> &str;
}

impl Stamped for Client {
    fn created_at(&self) -> &str {
        &self.created_at
    }
}

impl Stamped for Process {
    fn created_at(&self) -> &str {
        &self.created_at
    }
}

impl Stamped for ProcessAction {
    fn created_at(&self) -> &str {
        &self.created_at
    }
}

impl Stamped for AgendaItem {
    fn created_at(&self) -> &str {
        &self.created_at
    }
}

pub fn by_created_at<T: Stamped>(direction: SortDirection) -> impl Fn(&T, &T) -> Ordering {
    move |a, b| direction.apply(a.created_at().cmp(b.created_at()))
}

pub fn by_priority(direction: SortDirection) -> impl Fn(&AgendaItem, &AgendaItem) -> Ordering {
    move |a, b| direction.apply(a.priority.rank().cmp(&b.priority.rank()))
}

pub fn by_action_date(direction: SortDirection) -> impl Fn(&ProcessAction, &ProcessAction) -> Ordering {
    move |a, b| direction.apply(a.action_date.cmp(&b.action_date))
}

/// Distinct non-empty responsables in first-seen order, for the filter
/// drop-down.
pub fn responsables(items: &[AgendaItem]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for name in items.iter().filter_map(|i| i.responsable.as_deref()) {
        if !name.is_empty() && !seen.iter().any(|s| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

/// Splits agenda items into the three kanban columns, keeping input order.
pub fn by_status(items: &[AgendaItem]) -> Vec<(Status, Vec<AgendaItem>)> {
    Status::ALL
        .into_iter()
        .map(|status| {
            let column = items.iter().filter(|i| i.status == status).cloned().collect();
            (status, column)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;

    fn numbers() -> Vec<u32> {
        (1..=12).collect()
    }

    fn agenda(name: &str, priority: Priority, responsable: Option<&str>) -> AgendaItem {
        AgendaItem {
            id: name.into(),
            process_id: "p1".into(),
            name: name.into(),
            description: None,
            due_date: None,
            priority,
            status: Status::Pending,
            responsable: responsable.map(str::to_string),
            created_at: "2024-01-01T00:00:00.000Z".into(),
            hearing_status: None,
            days_term: None,
            notification_date: None,
            location: None,
            comments: Vec::new(),
            process: None,
        }
    }

    #[test]
    fn pages_use_ceiling_division() {
        let listing = Listing::new(5);
        let page = listing.apply(&numbers(), 3);
        assert_eq!(page.items, vec![11, 12]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 12);
        assert_eq!((page.first_index(), page.last_index()), (11, 12));
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = Listing::new(5).apply(&numbers(), 9);
        assert!(page.items.is_empty());
        assert_eq!(page.first_index(), 0);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn filter_then_sort_then_slice() {
        let listing = Listing::new(2)
            .filter(|n: &u32| n % 2 == 0)
            .sort(|a: &u32, b: &u32| b.cmp(a));
        let page = listing.apply(&numbers(), 2);
        assert_eq!(page.items, vec![8, 6]);
        assert_eq!(page.total_items, 6);
    }

    #[test]
    fn empty_input_has_zero_pages() {
        let page = Listing::<u32>::new(10).apply(&[], 1);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());
    }

    #[test]
    fn text_search_is_case_insensitive_over_optional_fields() {
        let items = vec![
            agenda("Radicar memorial", Priority::Low, None),
            agenda("Llamar cliente", Priority::Low, Some("Laura")),
        ];
        let search = text_search("LAURA", |i: &AgendaItem| {
            vec![Some(i.name.as_str()), i.responsable.as_deref()]
        });
        let found = Listing::new(10).filter(search).collect(&items);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Llamar cliente");
    }

    #[test]
    fn priority_sort_is_stable_and_directional() {
        let items = vec![
            agenda("a", Priority::Medium, None),
            agenda("b", Priority::High, None),
            agenda("c", Priority::Low, None),
            agenda("d", Priority::High, None),
        ];
        fn names(listing: Listing<'_, AgendaItem>, items: &[AgendaItem]) -> Vec<String> {
            listing.collect(items).into_iter().map(|i| i.name).collect()
        }
        assert_eq!(
            names(Listing::new(10).sort(by_priority(SortDirection::Desc)), &items),
            vec!["b", "d", "a", "c"]
        );
        assert_eq!(
            names(Listing::new(10).sort(by_priority(SortDirection::Asc)), &items),
            vec!["c", "a", "b", "d"]
        );
    }

    #[test]
    fn responsable_filter_and_choices() {
        let items = vec![
            agenda("a", Priority::Low, Some("Laura")),
            agenda("b", Priority::Low, Some("Andrés")),
            agenda("c", Priority::Low, Some("Laura")),
            agenda("d", Priority::Low, None),
        ];
        assert_eq!(responsables(&items), vec!["Laura", "Andrés"]);
        let only_laura = Listing::new(10)
            .filter(responsable_filter(Some("Laura")))
            .collect(&items);
        assert_eq!(only_laura.len(), 2);
        let all = Listing::new(10).filter(responsable_filter(None)).collect(&items);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn status_filter_and_newest_first() {
        let mut older = agenda("older", Priority::Low, None);
        older.created_at = "2023-12-31T00:00:00.000Z".into();
        older.status = Status::InProgress;
        let items = vec![older, agenda("newer", Priority::Low, None)];
        let newest = Listing::new(10)
            .sort(by_created_at::<AgendaItem>(SortDirection::Desc))
            .collect(&items);
        assert_eq!(newest[0].name, "newer");
        let in_progress = Listing::new(10)
            .filter(status_filter(Some(Status::InProgress)))
            .collect(&items);
        assert_eq!(in_progress.len(), 1);
        assert_eq!(Listing::new(10).filter(status_filter(None)).collect(&items).len(), 2);
    }

    #[test]
    fn kanban_columns_follow_status_order() {
        let mut done = agenda("b", Priority::Low, None);
        done.status = Status::Completed;
        let items = vec![agenda("a", Priority::Low, None), done];
        let columns = by_status(&items);
        assert_eq!(columns[0].0, Status::Pending);
        assert_eq!(columns[0].1.len(), 1);
        assert!(columns[1].1.is_empty());
        assert_eq!(columns[2].1[0].name, "b");
    }
}
