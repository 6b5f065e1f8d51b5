//! Story prompts offered to the child: a fixed built-in set plus stories
//! authored at runtime. The registry is plain owned state; whoever serves
//! the stories holds it and passes it around.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub const BUILTIN_STORIES: [(&str, &str); 3] = [
    (
        "Mountains and Trees",
        "One day, there were two tall mountains standing side by side. The sun was shining brightly in the sky, spreading its warm light over everything. Three birds were flying high near the sun, enjoying the fresh air. At the bottom of the mountains, there were two big trees with lots of leaves. The trees stood tall, giving shade and making the place look peaceful.",
    ),
    (
        "Ocean Adventure",
        "Imagine a blue ocean with gentle waves. On the surface, a small red boat is floating. There's a happy dolphin jumping out of the water next to the boat. Above, three seagulls are flying in the sky. The bright sun is shining down on everything, making the water sparkle.",
    ),
    (
        "Playground Fun",
        "Draw a playground with a tall slide in the center. On the left side, there's a swing set with two swings. On the right side, there's a sandbox. Two children are playing - one on the slide and one on a swing. A big tree provides shade over part of the playground.",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryKind {
    Builtin,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    pub title: String,
    pub text: String,
    pub kind: StoryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoryError {
    #[error("Please enter both a title and description for your story.")]
    MissingField,

    #[error("No story titled '{0}'")]
    NotFound(String),

    #[error("'{0}' is a built-in story and cannot be changed")]
    BuiltIn(String),
}

#[derive(Debug, Default)]
pub struct StoryRegistry {
    custom: Vec<Story>,
}

fn builtin(title: &str) -> Option<Story> {
    BUILTIN_STORIES
        .iter()
        .find(|(t, _)| *t == title)
        .map(|(t, text)| Story {
            title: t.to_string(),
            text: text.to_string(),
            kind: StoryKind::Builtin,
            created_at: None,
        })
}

impl StoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves a custom story. Saving an existing custom title replaces its
    /// text in place.
    pub fn add(&mut self, title: &str, text: &str) -> Result<Story, StoryError> {
        let (title, text) = (title.trim(), text.trim());
        if title.is_empty() || text.is_empty() {
            return Err(StoryError::MissingField);
        }
        if builtin(title).is_some() {
            return Err(StoryError::BuiltIn(title.to_string()));
        }

        let story = Story {
            title: title.to_string(),
            text: text.to_string(),
            kind: StoryKind::Custom,
            created_at: Some(Utc::now()),
        };
        match self.custom.iter_mut().find(|s| s.title == title) {
            Some(existing) => *existing = story.clone(),
            None => self.custom.push(story.clone()),
        }
        Ok(story)
    }

    pub fn remove(&mut self, title: &str) -> Result<Story, StoryError> {
        if builtin(title).is_some() {
            return Err(StoryError::BuiltIn(title.to_string()));
        }
        let idx = self
            .custom
            .iter()
            .position(|s| s.title == title)
            .ok_or_else(|| StoryError::NotFound(title.to_string()))?;
        Ok(self.custom.remove(idx))
    }

    pub fn get(&self, title: &str) -> Option<Story> {
        builtin(title).or_else(|| self.custom.iter().find(|s| s.title == title).cloned())
    }

    /// Built-in stories first, then custom stories in the order they were
    /// first saved.
    pub fn list(&self) -> Vec<Story> {
        BUILTIN_STORIES
            .iter()
            .filter_map(|(title, _)| builtin(title))
            .chain(self.custom.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_titles(registry: &StoryRegistry) -> Vec<String> {
        registry
            .list()
            .into_iter()
            .filter(|s| s.kind == StoryKind::Custom)
            .map(|s| s.title)
            .collect()
    }

    #[test]
    fn test_builtins_listed_first() {
        let mut registry = StoryRegistry::new();
        registry.add("Space Trip", "A rocket flies past two moons.").unwrap();

        let titles: Vec<_> = registry.list().into_iter().map(|s| s.title).collect();
        assert_eq!(
            titles,
            vec!["Mountains and Trees", "Ocean Adventure", "Playground Fun", "Space Trip"]
        );
    }

    #[test]
    fn test_add_requires_title_and_text() {
        let mut registry = StoryRegistry::new();
        assert_eq!(registry.add("  ", "text"), Err(StoryError::MissingField));
        assert_eq!(registry.add("title", ""), Err(StoryError::MissingField));
        assert!(custom_titles(&registry).is_empty());
    }

    #[test]
    fn test_resave_replaces_text_in_place() {
        let mut registry = StoryRegistry::new();
        registry.add("A", "first").unwrap();
        registry.add("B", "second").unwrap();
        registry.add("A", "updated").unwrap();

        assert_eq!(registry.get("A").unwrap().text, "updated");
        assert_eq!(custom_titles(&registry), vec!["A", "B"]);
    }

    #[test]
    fn test_remove() {
        let mut registry = StoryRegistry::new();
        registry.add("Garden", "Three flowers and a bee.").unwrap();

        assert_eq!(registry.remove("Garden").unwrap().title, "Garden");
        assert!(registry.get("Garden").is_none());
        assert_eq!(
            registry.remove("Garden"),
            Err(StoryError::NotFound("Garden".to_string()))
        );
    }

    #[test]
    fn test_builtins_are_read_only() {
        let mut registry = StoryRegistry::new();
        assert!(matches!(registry.remove("Ocean Adventure"), Err(StoryError::BuiltIn(_))));
        assert!(matches!(registry.add("Ocean Adventure", "x"), Err(StoryError::BuiltIn(_))));
        assert_eq!(registry.get("Ocean Adventure").unwrap().kind, StoryKind::Builtin);
    }
}
