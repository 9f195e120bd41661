use crate::index::path;

/// Cursor, back-stack and the per-view query state that resets on navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    current_path: String,
    history: Vec<String>,
    search_text: String,
    page: usize,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            current_path: path::ROOT.to_string(),
            history: Vec::new(),
            search_text: String::new(),
            page: 1,
        }
    }
}

impl NavigationState {
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Forward move into `child`, which the caller has already verified.
    pub(crate) fn descend(&mut self, child: &str) {
        let next = path::join(&self.current_path, child);
        let previous = std::mem::replace(&mut self.current_path, next);
        self.history.push(previous);
        self.reset_view();
    }

    pub fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.current_path = previous;
                self.reset_view();
                true
            }
            None => false,
        }
    }

    pub fn home(&mut self) {
        self.history.clear();
        self.current_path = path::ROOT.to_string();
        self.reset_view();
    }

    /// Breadcrumb jump. A target found in the back-stack truncates it to the
    /// paths visited before that target; any other target clears it.
    pub fn jump_to(&mut self, target: &str) {
        let target = path::normalize(target);
        match self.history.iter().position(|p| *p == target) {
            Some(idx) => self.history.truncate(idx),
            None => self.history.clear(),
        }
        self.current_path = target;
        self.reset_view();
    }

    pub fn set_search(&mut self, text: &str) {
        self.search_text = text.trim().to_string();
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    fn reset_view(&mut self) {
        self.search_text.clear();
        self.page = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descend_and_back() {
        let mut nav = NavigationState::default();
        nav.descend("docs");
        nav.descend("2024");
        assert_eq!(nav.current_path(), "docs/2024");
        assert_eq!(nav.history(), &["".to_string(), "docs".to_string()]);

        assert!(nav.back());
        assert_eq!(nav.current_path(), "docs");
        assert!(nav.back());
        assert_eq!(nav.current_path(), "");
        assert!(!nav.back());
        assert_eq!(nav.current_path(), "");
    }

    #[test]
    fn test_navigation_clears_search_and_page() {
        let mut nav = NavigationState::default();
        nav.set_search("  report ");
        nav.set_page(3);
        assert_eq!(nav.search_text(), "report");
        assert_eq!(nav.page(), 3);

        nav.descend("docs");
        assert_eq!(nav.search_text(), "");
        assert_eq!(nav.page(), 1);
    }

    #[test]
    fn test_jump_to_visited_path_truncates_history() {
        let mut nav = NavigationState::default();
        nav.descend("a");
        nav.descend("b");
        nav.descend("c");
        // history: ["", "a", "a/b"]
        nav.jump_to("a");
        assert_eq!(nav.current_path(), "a");
        assert_eq!(nav.history(), &["".to_string()]);
        assert!(nav.back());
        assert_eq!(nav.current_path(), "");
    }

    #[test]
    fn test_jump_to_unvisited_path_clears_history() {
        let mut nav = NavigationState::default();
        nav.descend("a");
        nav.descend("b");
        nav.jump_to("/x/y/");
        assert_eq!(nav.current_path(), "x/y");
        assert!(nav.history().is_empty());
    }

    #[test]
    fn test_home() {
        let mut nav = NavigationState::default();
        nav.descend("a");
        nav.set_search("q");
        nav.home();
        assert_eq!(nav.current_path(), "");
        assert!(!nav.can_go_back());
        assert_eq!(nav.search_text(), "");
    }

    #[test]
    fn test_page_is_at_least_one() {
        let mut nav = NavigationState::default();
        nav.set_page(0);
        assert_eq!(nav.page(), 1);
    }
}
