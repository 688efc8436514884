use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tessera_image::DynamicImage;
use tessera_imgproc::filter::FilterOptions;

use crate::definition::{FilterCell, FilterDefinition, FilterKind, FilterSettings};
use crate::dispatch::apply_filter;
use crate::error::ActionError;

/// One step of a filter queue: an inline definition or the name of a preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueueEntry {
    /// A definition stored in the queue itself.
    Definition(FilterDefinition),
    /// A preset looked up in a [`PresetRegistry`] when the queue runs.
    Preset(String),
}

/// The persisted project document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// The filters applied to the image, in order.
    pub filterqueue: Vec<QueueEntry>,
    /// Whether the viewer shows the filtered image.
    #[serde(default)]
    pub image_view_mode: bool,
}

impl ProjectFile {
    /// Parse a project document.
    pub fn from_json(json: &str) -> Result<Self, ActionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the project document.
    pub fn to_json(&self) -> Result<String, ActionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The document of a new project: a single pass-through filter.
    pub fn template() -> Self {
        Self {
            filterqueue: vec![QueueEntry::Definition(FilterDefinition {
                settings: FilterSettings {
                    size: [1, 1],
                    spatial_sampling_rate: [1, 1],
                    factor: 1.0,
                    kind: FilterKind::Custom,
                },
                grid: vec![vec![FilterCell {
                    value: 1.0,
                    disabled: false,
                }]],
            })],
            image_view_mode: true,
        }
    }

    /// A queue running this project's filters.
    pub fn queue(&self) -> FilterQueue {
        FilterQueue::new(self.filterqueue.clone())
    }
}

/// Named filter definitions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PresetRegistry {
    presets: BTreeMap<String, FilterDefinition>,
}

impl PresetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object mapping preset names to definitions.
    pub fn from_json(json: &str) -> Result<Self, ActionError> {
        Ok(Self {
            presets: serde_json::from_str(json)?,
        })
    }

    /// Register a preset, returning the definition it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        definition: FilterDefinition,
    ) -> Option<FilterDefinition> {
        self.presets.insert(name.into(), definition)
    }

    /// Add the presets of `other` whose names are not registered yet.
    pub fn merge(&mut self, other: PresetRegistry) {
        for (name, definition) in other.presets {
            self.presets.entry(name).or_insert(definition);
        }
    }

    /// Look up a preset.
    pub fn get(&self, name: &str) -> Option<&FilterDefinition> {
        self.presets.get(name)
    }

    /// The registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// Number of registered presets.
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Whether no preset is registered.
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

/// An ordered list of filters applied one after the other.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterQueue {
    entries: Vec<QueueEntry>,
    options: FilterOptions,
}

impl FilterQueue {
    /// Create a queue with the default engine options.
    pub fn new(entries: Vec<QueueEntry>) -> Self {
        Self {
            entries,
            options: FilterOptions::default(),
        }
    }

    /// Set the engine options used for every filter.
    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }

    /// The entries of the queue.
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Resolve every entry to a definition.
    pub fn resolve<'a>(
        &'a self,
        registry: &'a PresetRegistry,
    ) -> Result<Vec<&'a FilterDefinition>, ActionError> {
        self.entries
            .iter()
            .map(|entry| match entry {
                QueueEntry::Definition(definition) => Ok(definition),
                QueueEntry::Preset(name) => registry
                    .get(name)
                    .ok_or_else(|| ActionError::UnknownPreset(name.clone())),
            })
            .collect()
    }

    /// Apply every filter to `image` in order.
    ///
    /// Presets are resolved before the first filter runs. `cancel` is checked
    /// before each filter; once it is set the run stops with
    /// [`ActionError::Cancelled`] and the partial result is dropped.
    ///
    /// # Arguments
    ///
    /// * `image` - The source image.
    /// * `registry` - Presets named by the queue.
    /// * `cancel` - Cooperative cancellation flag, set from another thread.
    pub fn run(
        &self,
        image: &DynamicImage,
        registry: &PresetRegistry,
        cancel: &AtomicBool,
    ) -> Result<DynamicImage, ActionError> {
        let definitions = self.resolve(registry)?;

        let mut current = image.clone();
        for (idx, definition) in definitions.into_iter().enumerate() {
            if cancel.load(Ordering::Acquire) {
                log::info!("filter queue cancelled before step {idx}");
                return Err(ActionError::Cancelled);
            }

            log::info!(
                "applying {:?} filter {}/{} ({}x{})",
                definition.settings.kind,
                idx + 1,
                self.entries.len(),
                definition.settings.size[0],
                definition.settings.size[1]
            );
            current = apply_filter(&current, definition, &self.options)?;
        }

        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESETS: &str = r#"{
        "box": {
            "settings": {"size": [3, 3], "spatial_sampling_rate": [1, 1], "factor": 0.1111111, "type": "smoothing"},
            "grid": [
                [{"value": 1, "disabled": false}, {"value": 1, "disabled": false}, {"value": 1, "disabled": false}],
                [{"value": 1, "disabled": false}, {"value": 1, "disabled": false}, {"value": 1, "disabled": false}],
                [{"value": 1, "disabled": false}, {"value": 1, "disabled": false}, {"value": 1, "disabled": false}]
            ]
        },
        "passthrough": {
            "settings": {"size": [1, 1], "spatial_sampling_rate": [1, 1], "factor": 1.0, "type": "custom"},
            "grid": [[{"value": 1, "disabled": false}]]
        }
    }"#;

    #[test]
    fn test_registry_merge_keeps_existing() -> Result<(), ActionError> {
        let mut defaults = PresetRegistry::from_json(PRESETS)?;
        assert_eq!(defaults.names().collect::<Vec<_>>(), vec!["box", "passthrough"]);

        let mut extra = PresetRegistry::new();
        let template = ProjectFile::template();
        let QueueEntry::Definition(custom) = &template.filterqueue[0] else {
            panic!("template holds an inline definition");
        };
        let mut replacement = custom.clone();
        replacement.settings.factor = 2.0;
        extra.insert("passthrough", replacement);
        extra.insert("other", custom.clone());

        defaults.merge(extra);
        assert_eq!(defaults.len(), 3);
        assert_eq!(defaults.get("passthrough").map(|d| d.settings.factor), Some(1.0));
        Ok(())
    }

    #[test]
    fn test_project_file_entries() -> Result<(), ActionError> {
        let project = ProjectFile::from_json(
            r#"{
                "filterqueue": [
                    "box",
                    {
                        "settings": {"size": [1, 1], "spatial_sampling_rate": [2, 2], "factor": 1.0, "type": "maximum"},
                        "grid": [[{"value": 1, "disabled": false}]]
                    }
                ],
                "image_view_mode": false
            }"#,
        )?;
        assert_eq!(project.filterqueue[0], QueueEntry::Preset("box".to_string()));
        assert!(matches!(project.filterqueue[1], QueueEntry::Definition(_)));

        let round = ProjectFile::from_json(&project.to_json()?)?;
        assert_eq!(round, project);
        Ok(())
    }

    #[test]
    fn test_unknown_preset_fails_before_running() {
        let queue = FilterQueue::new(vec![QueueEntry::Preset("missing".into())]);
        let registry = PresetRegistry::new();
        assert!(matches!(
            queue.resolve(&registry),
            Err(ActionError::UnknownPreset(name)) if name == "missing"
        ));
    }
}
