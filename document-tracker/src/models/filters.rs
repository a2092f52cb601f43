use super::document::{Division, Document, DocumentStatus};
use crate::error::TrackerError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

impl FromStr for ViewMode {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(TrackerError::Validation(format!("Unknown view: {}", other))),
        }
    }
}

/// View-side predicate over the document list. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub division: Option<Division>,
    pub status: Option<DocumentStatus>,
    pub search: String,
}

fn parse_choice<T>(raw: &str) -> Result<Option<T>, TrackerError>
where
    T: FromStr<Err = TrackerError>,
{
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        Ok(None)
    } else {
        raw.parse().map(Some)
    }
}

impl Filters {
    /// Build filters from raw form values (`"all"` or empty selects everything).
    pub fn parse(division: &str, status: &str, search: &str) -> Result<Self, TrackerError> {
        Ok(Self {
            division: parse_choice(division)?,
            status: parse_choice(status)?,
            search: search.to_string(),
        })
    }

    pub fn is_active(&self) -> bool {
        self.division.is_some() || self.status.is_some() || !self.search.is_empty()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        let division_ok = self.division.map_or(true, |d| doc.division == d);
        let status_ok = self.status.map_or(true, |s| doc.status == s);
        let search_ok = self.search.is_empty() || {
            let needle = self.search.to_lowercase();
            doc.name.to_lowercase().contains(&needle)
                || doc.file_name.to_lowercase().contains(&needle)
        };
        division_ok && status_ok && search_ok
    }

    /// Matching documents, in collection order.
    pub fn apply<'a>(&self, documents: &'a [Document]) -> Vec<&'a Document> {
        documents.iter().filter(|doc| self.matches(doc)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: u64, name: &str, file: &str, division: Division, status: DocumentStatus) -> Document {
        Document {
            id,
            name: name.into(),
            division,
            status,
            file_name: file.into(),
            file_url: format!("https://blob.test/{}", file),
        }
    }

    fn sample() -> Vec<Document> {
        vec![
            doc(1, "Q3 Budget", "budget.xlsx", Division::Finance, DocumentStatus::Approved),
            doc(2, "Onboarding", "handbook.pdf", Division::HR, DocumentStatus::Pending),
            doc(3, "Launch plan", "campaign.docx", Division::Marketing, DocumentStatus::Rejected),
            doc(4, "Design review", "BUDGET-notes.txt", Division::Engineering, DocumentStatus::Pending),
        ]
    }

    #[test]
    fn all_filters_return_everything_in_order() {
        let docs = sample();
        let filters = Filters::parse("all", "all", "").unwrap();
        let ids: Vec<u64> = filters.apply(&docs).iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(!filters.is_active());
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_file_name() {
        let docs = sample();
        let filters = Filters::parse("all", "all", "budget").unwrap();
        let ids: Vec<u64> = filters.apply(&docs).iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn criteria_combine_with_and() {
        let docs = sample();
        let filters = Filters::parse("Engineering", "Pending", "BUDGET").unwrap();
        let ids: Vec<u64> = filters.apply(&docs).iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![4]);

        let none = Filters::parse("HR", "Approved", "").unwrap();
        assert!(none.apply(&docs).is_empty());
    }

    #[test]
    fn unknown_choice_is_rejected() {
        assert!(matches!(
            Filters::parse("Legal", "all", ""),
            Err(TrackerError::Validation(_))
        ));
    }

    #[test]
    fn view_mode_parses() {
        assert_eq!("LIST".parse::<ViewMode>().unwrap(), ViewMode::List);
        assert_eq!(ViewMode::default(), ViewMode::Grid);
        assert!("table".parse::<ViewMode>().is_err());
    }
}
