//! Search, filter and paginate
//!
//! The one list-view pipeline shared by the student, faculty, course and
//! announcement listings:
//!
//! ```text
//!   items → search (case-insensitive substring) → category tab → sort → page
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::{Announcement, Course, FacultyMember, StudentProfile};

/// Tab value that disables category filtering
pub const ALL_CATEGORIES: &str = "all";

/// Default page size when none is requested
pub const DEFAULT_PER_PAGE: usize = 10;

/// Records that can appear in a list view
pub trait Searchable {
    /// Fields matched against the free-text query
    fn search_fields(&self) -> Vec<&str>;

    /// Key matched against the active category tab
    fn category(&self) -> Option<&str> {
        None
    }

    fn matches_search(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle_lower))
    }
}

/// A list-view request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// 1-based page number; 0 is treated as 1
    #[serde(default)]
    pub page: usize,
    /// Page size; 0 selects the default
    #[serde(default)]
    pub per_page: usize,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: free-text search
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Builder: category tab
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Builder: page number
    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Builder: page size
    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    fn effective_page(&self) -> usize {
        self.page.max(1)
    }

    fn effective_per_page(&self) -> usize {
        if self.per_page == 0 {
            DEFAULT_PER_PAGE
        } else {
            self.per_page
        }
    }

    /// Whether `item` passes both the search and the category tab
    pub fn matches<T: Searchable>(&self, item: &T) -> bool {
        let needle = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default();
        self.matches_with(item, &needle)
    }

    fn matches_with<T: Searchable>(&self, item: &T, needle_lower: &str) -> bool {
        if !item.matches_search(needle_lower) {
            return false;
        }
        match self.category.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(tab) if tab.eq_ignore_ascii_case(ALL_CATEGORIES) => true,
            Some(tab) => item
                .category()
                .map(|c| c.eq_ignore_ascii_case(tab))
                .unwrap_or(false),
        }
    }

    /// Filter without sorting or paging, preserving input order
    pub fn filter<'a, T: Searchable>(&self, items: &'a [T]) -> Vec<&'a T> {
        let needle = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default();
        items
            .iter()
            .filter(|item| self.matches_with(*item, &needle))
            .collect()
    }

    /// Filter, then page, preserving input order
    pub fn apply<T: Searchable + Clone>(&self, items: &[T]) -> Page<T> {
        self.apply_sorted(items, |_, _| Ordering::Equal)
    }

    /// Filter, sort with `compare` (stable), then page
    pub fn apply_sorted<T, F>(&self, items: &[T], compare: F) -> Page<T>
    where
        T: Searchable + Clone,
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut matched: Vec<T> = self.filter(items).into_iter().cloned().collect();
        matched.sort_by(compare);
        Page::slice(matched, self.effective_page(), self.effective_per_page())
    }
}

/// One page of a filtered list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Cut page `page` (1-based) of size `per_page` out of `all`
    pub fn slice(all: Vec<T>, page: usize, per_page: usize) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let total_items = all.len();
        let total_pages = total_items.div_ceil(per_page);

        let start = (page - 1).saturating_mul(per_page);
        let items = all.into_iter().skip(start).take(per_page).collect();

        Self {
            items,
            page,
            per_page,
            total_items,
            total_pages,
        }
    }
}

/// Announcements newest first
pub fn newest_first(a: &Announcement, b: &Announcement) -> Ordering {
    b.posted_at.cmp(&a.posted_at).then(b.id.cmp(&a.id))
}

impl Searchable for Course {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.code.as_str(),
            self.title.as_str(),
            self.instructor.as_str(),
            self.department.as_str(),
        ]
    }

    fn category(&self) -> Option<&str> {
        Some(self.department.as_str())
    }
}

impl Searchable for Announcement {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.body.as_str(), self.author.as_str()]
    }

    fn category(&self) -> Option<&str> {
        Some(self.kind.as_str())
    }
}

impl Searchable for FacultyMember {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.id.as_str(),
            self.email.as_str(),
            self.designation.as_str(),
        ]
    }

    fn category(&self) -> Option<&str> {
        Some(self.department.as_str())
    }
}

impl Searchable for StudentProfile {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.id.as_str(), self.email.as_str()]
    }

    fn category(&self) -> Option<&str> {
        Some(self.program.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, name: &str, email: &str, program: &str) -> StudentProfile {
        StudentProfile {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            program: program.to_string(),
            year: 1,
            phone: None,
        }
    }

    fn roster() -> Vec<StudentProfile> {
        vec![
            profile("STU001", "Alex Johnson", "alex@uni.edu", "Computer Science"),
            profile("STU002", "Maria Garcia", "maria@uni.edu", "Mathematics"),
            profile("STU003", "James Chen", "jchen@uni.edu", "Computer Science"),
            profile("STU004", "Priya Patel", "priya@uni.edu", "Physics"),
        ]
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let items = roster();
        let hits = ListQuery::new().search("ALEX").filter(&items);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "STU001");

        // substring of the email, not an exact match
        let hits = ListQuery::new().search("chen@").filter(&items);
        assert_eq!(hits.len(), 1);

        let hits = ListQuery::new().search("stu00").filter(&items);
        assert_eq!(hits.len(), 4);

        let hits = ListQuery::new().search("Alex Johnson Jr").filter(&items);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_blank_search_matches_all() {
        let items = roster();
        assert_eq!(ListQuery::new().search("   ").filter(&items).len(), 4);
        assert_eq!(ListQuery::new().filter(&items).len(), 4);
    }

    #[test]
    fn test_category_tab() {
        let items = roster();
        let hits = ListQuery::new().category("computer science").filter(&items);
        assert_eq!(hits.len(), 2);

        let hits = ListQuery::new().category("all").filter(&items);
        assert_eq!(hits.len(), 4);

        let hits = ListQuery::new().search("james").category("Physics").filter(&items);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_pagination_bounds() {
        let items = roster();

        let page = ListQuery::new().per_page(3).apply(&items);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total_items, 4);
        assert_eq!(page.total_pages, 2);

        let page = ListQuery::new().per_page(3).page(2).apply(&items);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "STU004");
        assert_eq!(page.page, page.total_pages);

        let page = ListQuery::new().per_page(3).page(9).apply(&items);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 2);

        let page = ListQuery::new().page(0).apply(&items);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_empty_collection() {
        let page = ListQuery::new().apply::<StudentProfile>(&[]);
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_sorted_listing() {
        let items = roster();
        let page = ListQuery::new().apply_sorted(&items, |a, b| b.name.cmp(&a.name));
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Priya Patel", "Maria Garcia", "James Chen", "Alex Johnson"]);
    }
}
