//! Browsing state for the rules list: category filter, search text and expanded rows.

use std::collections::BTreeSet;

use super::{Rule, RulesResponse, RulesSource};

/// State behind the rules view.
///
/// Indices returned by [`RulesViewer::filtered`] point into [`RulesViewer::rules`], so the set of
/// expanded rules stays stable while the search text changes.
#[derive(Clone, Debug, Default)]
pub struct RulesViewer {
    rules: Vec<Rule>,
    categories: Vec<String>,
    selected_category: Option<String>,
    search: String,
    expanded: BTreeSet<usize>,
    loading: bool,
}

impl RulesViewer {
    /// Creates an empty viewer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loaded rules, in API order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Known categories.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Category passed to the next [`RulesViewer::refresh`].
    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    /// Selects a category; an empty string clears the selection.
    pub fn select_category(&mut self, category: Option<String>) {
        self.selected_category = category.filter(|c| !c.is_empty());
    }

    /// Current search text.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Replaces the search text.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Whether a fetch is in progress.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Replaces rules and categories and collapses every rule.
    pub fn set_response(&mut self, response: RulesResponse) {
        self.rules = response.rules;
        self.categories = response.categories;
        self.expanded.clear();
    }

    /// Indices of rules matching the search text, case-insensitively, over description,
    /// patterns and category.
    pub fn filtered(&self) -> Vec<usize> {
        let needle = self.search.trim().to_lowercase();
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.matches(&needle))
            .map(|(index, _)| index)
            .collect()
    }

    /// Matching rules grouped by category, categories in order of first appearance.
    pub fn grouped(&self) -> Vec<(&str, Vec<usize>)> {
        let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
        for index in self.filtered() {
            let category = self.rules[index].category.as_str();
            match groups.iter_mut().find(|(name, _)| *name == category) {
                Some((_, indices)) => indices.push(index),
                None => groups.push((category, vec![index])),
            }
        }
        groups
    }

    /// Expands a collapsed rule or collapses an expanded one.  Unknown indices are ignored.
    pub fn toggle(&mut self, index: usize) {
        if index >= self.rules.len() {
            return;
        }
        if !self.expanded.remove(&index) {
            self.expanded.insert(index);
        }
    }

    /// Whether the rule at `index` is expanded.
    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.contains(&index)
    }

    /// Collapses every rule.
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Fetches rules for the selected category.
    ///
    /// On failure the error is logged and the current rules are kept.  The loading flag is
    /// cleared in both cases.
    pub async fn refresh<S>(&mut self, source: &S)
    where
        S: RulesSource + ?Sized,
    {
        self.loading = true;
        let category = self.selected_category.clone();
        match source.fetch_rules(category.as_deref()).await {
            Ok(response) => self.set_response(response),
            Err(err) => log::error!("failed to fetch rules: {err}"),
        }
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ReportError, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn rule(category: &str, description: &str, patterns: &[&str]) -> Rule {
        Rule {
            category: category.into(),
            description: description.into(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            ..Rule::default()
        }
    }

    fn viewer() -> RulesViewer {
        let mut viewer = RulesViewer::new();
        viewer.set_response(RulesResponse {
            rules: vec![
                rule("Portefeuille", "Encours total", &["encours global"]),
                rule("Risque", "Créances douteuses", &["taux de NPL", "douteux"]),
                rule("Portefeuille", "Clients actifs", &["nombre de clients"]),
            ],
            categories: vec!["Portefeuille".into(), "Risque".into()],
        });
        viewer
    }

    #[test]
    fn pattern_only_search_returns_one_rule() {
        let mut viewer = viewer();
        viewer.set_search("NPL");
        assert_eq!(viewer.filtered(), vec![1]);
    }

    #[test]
    fn empty_search_returns_everything() {
        let mut viewer = viewer();
        viewer.set_search("   ");
        assert_eq!(viewer.filtered(), vec![0, 1, 2]);
    }

    #[test]
    fn category_text_matches() {
        let mut viewer = viewer();
        viewer.set_search("portefeuille");
        assert_eq!(viewer.filtered(), vec![0, 2]);
        assert_eq!(viewer.grouped(), vec![("Portefeuille", vec![0, 2])]);
    }

    #[test]
    fn toggle_survives_filtering() {
        let mut viewer = viewer();
        viewer.toggle(2);
        viewer.set_search("clients");
        assert_eq!(viewer.filtered(), vec![2]);
        assert!(viewer.is_expanded(2));
        viewer.toggle(2);
        assert!(!viewer.is_expanded(2));
        viewer.toggle(99);
        assert!(!viewer.is_expanded(99));
    }

    #[test]
    fn collapse_all_clears() {
        let mut viewer = viewer();
        viewer.toggle(0);
        viewer.toggle(1);
        viewer.collapse_all();
        assert!(!viewer.is_expanded(0) && !viewer.is_expanded(1));
    }

    /// Serves a copy of `response`; `None` fails like a missing token would.
    struct FakeSource {
        response: Option<RulesResponse>,
        requested: Mutex<Vec<Option<String>>>,
    }

    impl FakeSource {
        fn new(response: Option<RulesResponse>) -> Self {
            Self {
                response,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RulesSource for FakeSource {
        async fn fetch_rules(&self, category: Option<&str>) -> Result<RulesResponse> {
            self.requested
                .lock()
                .unwrap()
                .push(category.map(str::to_string));
            self.response.clone().ok_or_else(|| ReportError::MissingToken {
                key: "token".into(),
                path: "storage.json".into(),
            })
        }
    }

    #[tokio::test]
    async fn refresh_replaces_rules_and_collapses() {
        let mut viewer = viewer();
        viewer.toggle(0);
        viewer.select_category(Some("Risque".into()));
        let source = FakeSource::new(Some(RulesResponse {
            rules: vec![rule("Risque", "Provisions", &["provision"])],
            categories: vec!["Risque".into()],
        }));

        viewer.refresh(&source).await;

        assert_eq!(viewer.rules().len(), 1);
        assert!(!viewer.is_expanded(0));
        assert!(!viewer.is_loading());
        assert_eq!(
            *source.requested.lock().unwrap(),
            vec![Some("Risque".to_string())]
        );
    }

    #[tokio::test]
    async fn refresh_failure_keeps_rules() {
        let mut viewer = viewer();
        let source = FakeSource::new(None);

        viewer.refresh(&source).await;

        assert_eq!(viewer.rules().len(), 3);
        assert!(!viewer.is_loading());
    }
}
