//! Multi-criteria task filtering.

use serde::{Deserialize, Serialize};

use crate::id::UserId;
use crate::task::{Priority, Task};
use crate::text_matcher::TextMatcher;

/// Active board filters. Every empty criterion imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    /// Allowed assignees (tasks without an assignee always pass).
    #[serde(default)]
    pub assignees: Vec<UserId>,
    /// Tags of which a task must carry at least one.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Allowed priorities.
    #[serde(default)]
    pub priorities: Vec<Priority>,
    /// Free-text query matched against title, description and tags.
    #[serde(default)]
    pub query: String,
}

impl Filters {
    /// Returns true when no criterion is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignees.is_empty()
            && self.tags.is_empty()
            && self.priorities.is_empty()
            && self.query.trim().is_empty()
    }

    /// Clear every criterion.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Add the assignee if absent, remove it otherwise.
    pub fn toggle_assignee(&mut self, user: UserId) {
        toggle(&mut self.assignees, user);
    }

    /// Add the tag if absent, remove it otherwise.
    pub fn toggle_tag(&mut self, tag: impl Into<String>) {
        toggle(&mut self.tags, tag.into());
    }

    /// Add the priority if absent, remove it otherwise.
    pub fn toggle_priority(&mut self, priority: Priority) {
        toggle(&mut self.priorities, priority);
    }

    /// Evaluate every active criterion against `task`.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.compile().matches(task)
    }

    fn compile(&self) -> CompiledFilters<'_> {
        CompiledFilters {
            filters: self,
            text: TextMatcher::new(&self.query),
        }
    }
}

fn toggle<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if let Some(pos) = values.iter().position(|existing| *existing == value) {
        values.remove(pos);
    } else {
        values.push(value);
    }
}

struct CompiledFilters<'a> {
    filters: &'a Filters,
    text: Option<TextMatcher>,
}

impl CompiledFilters<'_> {
    fn matches(&self, task: &Task) -> bool {
        let Filters {
            assignees,
            tags,
            priorities,
            ..
        } = self.filters;

        if !assignees.is_empty()
            && task
                .assignee
                .is_some_and(|assignee| !assignees.contains(&assignee))
        {
            return false;
        }

        if !tags.is_empty() && !task.tags.iter().any(|tag| tags.contains(tag)) {
            return false;
        }

        if !priorities.is_empty() && !priorities.contains(&task.priority) {
            return false;
        }

        self.text.as_ref().is_none_or(|matcher| matcher.matches(task))
    }
}

/// Subsequence of `tasks` satisfying every active criterion, in input order.
#[must_use]
pub fn apply_filters<'a, I>(tasks: I, filters: &Filters) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let compiled = filters.compile();
    tasks.into_iter().filter(|task| compiled.matches(task)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDraft;
    use time::macros::datetime;

    fn task(draft: TaskDraft) -> Task {
        Task::from_draft(draft, datetime!(2025-01-01 00:00 UTC))
    }

    fn titles<'a>(tasks: &[&'a Task]) -> Vec<&'a str> {
        tasks.iter().map(|task| task.title.as_str()).collect()
    }

    #[test]
    fn empty_filters_keep_everything_in_order() {
        let tasks = vec![task(TaskDraft::new("b")), task(TaskDraft::new("a"))];
        let filtered = apply_filters(&tasks, &Filters::default());
        assert_eq!(titles(&filtered), vec!["b", "a"]);
        assert!(Filters::default().is_empty());
    }

    #[test]
    fn unassigned_tasks_pass_assignee_filter() {
        let alice = UserId::new();
        let bob = UserId::new();
        let tasks = vec![
            task(TaskDraft::new("alice").with_assignee(alice)),
            task(TaskDraft::new("bob").with_assignee(bob)),
            task(TaskDraft::new("nobody")),
        ];
        let filters = Filters {
            assignees: vec![alice],
            ..Filters::default()
        };
        assert_eq!(titles(&apply_filters(&tasks, &filters)), vec!["alice", "nobody"]);
    }

    #[test]
    fn tags_are_or_within_and_across_criteria() {
        let tasks = vec![
            task(TaskDraft::new("api bug").with_tags(["api", "bug"]).with_priority(Priority::High)),
            task(TaskDraft::new("ui").with_tags(["frontend"]).with_priority(Priority::High)),
            task(TaskDraft::new("slow api").with_tags(["api"]).with_priority(Priority::Low)),
        ];
        let filters = Filters {
            tags: vec!["bug".into(), "api".into()],
            priorities: vec![Priority::High],
            ..Filters::default()
        };
        assert_eq!(titles(&apply_filters(&tasks, &filters)), vec!["api bug"]);
    }

    #[test]
    fn query_matches_title_description_or_tag() {
        let tasks = vec![
            task(TaskDraft::new("Fix authentication bug")),
            task(TaskDraft::new("Login screen").with_tags(["auth-flow"])),
            task(TaskDraft::new("Refresh tokens").with_description("Rotate AUTH secrets")),
            task(TaskDraft::new("Dark mode").with_tags(["ui"])),
        ];
        let filters = Filters {
            query: "auth".into(),
            ..Filters::default()
        };
        assert_eq!(
            titles(&apply_filters(&tasks, &filters)),
            vec!["Fix authentication bug", "Login screen", "Refresh tokens"]
        );
    }

    #[test]
    fn query_whitespace_is_part_of_the_search_text() {
        let tasks = vec![
            task(TaskDraft::new("Fix authentication bug")),
            task(TaskDraft::new("Refresh tokens").with_description("Rotate AUTH secrets")),
        ];
        let trailing = Filters {
            query: "auth ".into(),
            ..Filters::default()
        };
        assert_eq!(titles(&apply_filters(&tasks, &trailing)), vec!["Refresh tokens"]);

        let padded = Filters {
            query: "  auth".into(),
            ..Filters::default()
        };
        assert!(apply_filters(&tasks, &padded).is_empty());

        let inner = Filters {
            query: "fix auth".into(),
            ..Filters::default()
        };
        assert_eq!(titles(&apply_filters(&tasks, &inner)), vec!["Fix authentication bug"]);
    }

    #[test]
    fn blank_query_is_ignored() {
        let tasks = vec![task(TaskDraft::new("anything"))];
        let filters = Filters {
            query: "   ".into(),
            ..Filters::default()
        };
        assert!(filters.is_empty());
        assert_eq!(apply_filters(&tasks, &filters).len(), 1);
    }

    #[test]
    fn toggles_add_then_remove() {
        let mut filters = Filters::default();
        let user = UserId::new();
        filters.toggle_tag("bug");
        filters.toggle_priority(Priority::Low);
        filters.toggle_assignee(user);
        assert_eq!(filters.tags, vec!["bug".to_owned()]);
        assert_eq!(filters.priorities, vec![Priority::Low]);
        assert_eq!(filters.assignees, vec![user]);

        filters.toggle_tag("bug");
        filters.toggle_priority(Priority::Low);
        filters.toggle_assignee(user);
        assert!(filters.is_empty());

        filters.query = "x".into();
        filters.reset();
        assert_eq!(filters, Filters::default());
    }
}
