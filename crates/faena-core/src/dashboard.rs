//! Derived dashboard views.
//!
//! Pure, side-effect-free functions over the already-loaded `Client` and
//! `Work` collections: free-text filtering, single-key sorting, and the
//! dashboard metrics. Nothing here talks to a backend.

use uuid::Uuid;

use crate::models::{Client, Work};

// =============================================================================
// SEARCH FILTERS
// =============================================================================

/// Retain works whose description, client name, or client company
/// case-insensitively contains `term`. A blank term filters nothing.
/// Relative order is preserved.
pub fn filter_works<'a>(works: &'a [Work], clients: &[Client], term: &str) -> Vec<&'a Work> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return works.iter().collect();
    }

    works
        .iter()
        .filter(|work| {
            if work.description.to_lowercase().contains(&term) {
                return true;
            }
            match client_by_id(clients, work.client_id) {
                Some(client) => {
                    client.name.to_lowercase().contains(&term)
                        || client
                            .company
                            .as_deref()
                            .is_some_and(|c| c.to_lowercase().contains(&term))
                }
                None => false,
            }
        })
        .collect()
}

/// Retain clients whose name or company case-insensitively contains
/// `term`, or whose phone contains it verbatim (phones are numeric, no
/// case folding). A blank term filters nothing.
pub fn filter_clients<'a>(clients: &'a [Client], term: &str) -> Vec<&'a Client> {
    let folded = term.trim().to_lowercase();
    if folded.is_empty() {
        return clients.iter().collect();
    }

    clients
        .iter()
        .filter(|client| {
            client.name.to_lowercase().contains(&folded)
                || client
                    .company
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&folded))
                || client.phone.contains(term.trim())
        })
        .collect()
}

// =============================================================================
// SORTING
// =============================================================================

/// The single active sort column for the works table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Date,
    /// Associated client's name; missing client sorts as empty string.
    Name,
    /// `budget.amount`, numeric.
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Sort state for the works table: one active key plus a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkSort {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl WorkSort {
    /// Selecting a new column resets the direction to descending;
    /// reselecting the active column toggles it.
    pub fn select(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Desc;
        }
    }
}

/// Sort works in place by the active key. The sort is stable: ties keep
/// their prior relative order, there is no secondary key.
pub fn sort_works(works: &mut [&Work], clients: &[Client], sort: WorkSort) {
    works.sort_by(|a, b| {
        let ordering = match sort.key {
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::Name => {
                let name_a = client_name(clients, a.client_id).to_lowercase();
                let name_b = client_name(clients, b.client_id).to_lowercase();
                name_a.cmp(&name_b)
            }
            SortKey::Amount => a.budget.amount.total_cmp(&b.budget.amount),
        };
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn client_by_id(clients: &[Client], id: Uuid) -> Option<&Client> {
    clients.iter().find(|c| c.id == id)
}

/// Name of the referenced client, or empty string when the reference
/// dangles.
pub fn client_name(clients: &[Client], id: Uuid) -> &str {
    client_by_id(clients, id).map(|c| c.name.as_str()).unwrap_or("")
}

// =============================================================================
// METRICS
// =============================================================================

/// Sum of `budget.amount` over all loaded works. Always computed over the
/// full set, never the filtered view.
pub fn total_earnings(works: &[Work]) -> f64 {
    works.iter().map(|w| w.budget.amount).sum()
}

/// Count of works dated in the given calendar month, compared by calendar
/// fields rather than elapsed-time arithmetic.
pub fn works_in_month(works: &[Work], year: i32, month: u32) -> usize {
    works
        .iter()
        .filter(|w| w.date.year() == year && w.date.month() == month)
        .count()
}

/// Count of works dated in the current local calendar month.
pub fn works_this_month(works: &[Work]) -> usize {
    let today = crate::dates::WorkDate::today();
    works_in_month(works, today.year(), today.month())
}

// =============================================================================
// DISPLAY FORMATTING
// =============================================================================

/// Format an amount as `$1,234.56`.
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::WorkDate;
    use crate::models::Budget;
    use chrono::Utc;

    fn client(name: &str, company: Option<&str>, phone: &str) -> Client {
        Client {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: phone.to_string(),
            company: company.map(str::to_string),
            address: None,
            created_at: Utc::now(),
        }
    }

    fn work(client_id: Uuid, description: &str, date: &str, amount: f64) -> Work {
        Work {
            id: Uuid::new_v4(),
            client_id,
            description: description.to_string(),
            date: WorkDate::parse(date).unwrap(),
            budget: Budget { amount, pdf: None },
            image: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn filter_clients_matches_substring_case_insensitively() {
        let clients = vec![client("Acme Corp", None, "123"), client("Bob", None, "456")];
        let hits = filter_clients(&clients, "acme");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Acme Corp");
    }

    #[test]
    fn blank_term_is_identity_in_original_order() {
        let clients = vec![client("Acme Corp", None, "123"), client("Bob", None, "456")];
        let hits = filter_clients(&clients, "");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "Acme Corp");
        assert_eq!(hits[1].name, "Bob");
    }

    #[test]
    fn filter_clients_matches_phone_verbatim() {
        let clients = vec![client("Acme", None, "611-555"), client("Bob", None, "789")];
        assert_eq!(filter_clients(&clients, "611").len(), 1);
    }

    #[test]
    fn filter_works_reaches_through_to_client_fields() {
        let clients = vec![
            client("Acme Corp", Some("Acme Holdings"), "1"),
            client("Bob", None, "2"),
        ];
        let works = vec![
            work(clients[0].id, "Paint fence", "2024-01-01", 100.0),
            work(clients[1].id, "Fix roof", "2024-01-02", 200.0),
        ];

        assert_eq!(filter_works(&works, &clients, "holdings").len(), 1);
        assert_eq!(filter_works(&works, &clients, "ROOF").len(), 1);
        assert_eq!(filter_works(&works, &clients, "nothing").len(), 0);
    }

    #[test]
    fn dangling_client_reference_matches_on_description_only() {
        let works = vec![work(Uuid::new_v4(), "Paint fence", "2024-01-01", 100.0)];
        assert_eq!(filter_works(&works, &[], "paint").len(), 1);
        assert_eq!(filter_works(&works, &[], "acme").len(), 0);
    }

    #[test]
    fn sort_by_amount_ascending_then_toggle() {
        let id = Uuid::new_v4();
        let works = vec![
            work(id, "a", "2024-01-01", 300.0),
            work(id, "b", "2024-01-02", 100.0),
            work(id, "c", "2024-01-03", 200.0),
        ];
        let mut view: Vec<&Work> = works.iter().collect();

        let mut sort = WorkSort::default();
        sort.select(SortKey::Amount); // new key -> desc
        sort.select(SortKey::Amount); // same key -> toggles to asc
        sort_works(&mut view, &[], sort);
        let amounts: Vec<f64> = view.iter().map(|w| w.budget.amount).collect();
        assert_eq!(amounts, vec![100.0, 200.0, 300.0]);

        sort.select(SortKey::Amount);
        sort_works(&mut view, &[], sort);
        let amounts: Vec<f64> = view.iter().map(|w| w.budget.amount).collect();
        assert_eq!(amounts, vec![300.0, 200.0, 100.0]);
    }

    #[test]
    fn selecting_a_new_key_resets_to_descending() {
        let mut sort = WorkSort {
            key: SortKey::Amount,
            direction: SortDirection::Asc,
        };
        sort.select(SortKey::Date);
        assert_eq!(sort.key, SortKey::Date);
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn sort_by_date_is_chronological() {
        let id = Uuid::new_v4();
        let works = vec![
            work(id, "a", "2024-02-01", 1.0),
            work(id, "b", "2023-12-31", 2.0),
            work(id, "c", "2024-01-15", 3.0),
        ];
        let mut view: Vec<&Work> = works.iter().collect();
        sort_works(
            &mut view,
            &[],
            WorkSort {
                key: SortKey::Date,
                direction: SortDirection::Asc,
            },
        );
        let dates: Vec<&str> = view.iter().map(|w| w.date.as_str()).collect();
        assert_eq!(dates, vec!["2023-12-31", "2024-01-15", "2024-02-01"]);
    }

    #[test]
    fn sort_by_name_uses_empty_string_for_missing_client() {
        let clients = vec![client("Zed", None, "1"), client("Ana", None, "2")];
        let works = vec![
            work(clients[0].id, "a", "2024-01-01", 1.0),
            work(Uuid::new_v4(), "orphan", "2024-01-02", 2.0),
            work(clients[1].id, "c", "2024-01-03", 3.0),
        ];
        let mut view: Vec<&Work> = works.iter().collect();
        sort_works(
            &mut view,
            &clients,
            WorkSort {
                key: SortKey::Name,
                direction: SortDirection::Asc,
            },
        );
        let descriptions: Vec<&str> = view.iter().map(|w| w.description.as_str()).collect();
        assert_eq!(descriptions, vec!["orphan", "c", "a"]);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let id = Uuid::new_v4();
        let works = vec![
            work(id, "first", "2024-01-01", 100.0),
            work(id, "second", "2024-01-01", 100.0),
            work(id, "third", "2024-01-01", 100.0),
        ];
        let mut view: Vec<&Work> = works.iter().collect();
        sort_works(
            &mut view,
            &[],
            WorkSort {
                key: SortKey::Amount,
                direction: SortDirection::Desc,
            },
        );
        let descriptions: Vec<&str> = view.iter().map(|w| w.description.as_str()).collect();
        assert_eq!(descriptions, vec!["first", "second", "third"]);
    }

    #[test]
    fn total_earnings_sums_the_full_set() {
        let id = Uuid::new_v4();
        let works = vec![
            work(id, "a", "2024-01-01", 100.5),
            work(id, "b", "2024-01-02", 200.0),
        ];
        assert_eq!(total_earnings(&works), 300.5);
        assert_eq!(total_earnings(&[]), 0.0);
    }

    #[test]
    fn works_in_month_compares_calendar_fields() {
        let id = Uuid::new_v4();
        let works = vec![
            work(id, "a", "2024-01-01", 1.0),
            work(id, "b", "2024-01-31", 1.0),
            work(id, "c", "2024-02-01", 1.0),
            work(id, "d", "2023-01-15", 1.0),
        ];
        assert_eq!(works_in_month(&works, 2024, 1), 2);
        assert_eq!(works_in_month(&works, 2024, 2), 1);
        assert_eq!(works_in_month(&works, 2023, 1), 1);
        assert_eq!(works_in_month(&works, 2022, 6), 0);
    }

    #[test]
    fn format_currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1500.0), "$1,500.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-42.5), "-$42.50");
    }
}
