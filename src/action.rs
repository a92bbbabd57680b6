//! Revealable swipe actions and their presets.
use std::fmt;

use strum::{Display, EnumString, IntoStaticStr};

/// Built-in action styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ActionPreset {
    Add,
    Favorite,
    Delete,
    Edit,
    Share,
    Archive,
}

impl ActionPreset {
    /// Symbolic icon name for the preset.
    pub fn icon(self) -> &'static str {
        match self {
            ActionPreset::Add => "plus",
            ActionPreset::Favorite => "heart",
            ActionPreset::Delete => "trash.fill",
            ActionPreset::Edit => "pencil",
            ActionPreset::Share => "square.and.arrow.up",
            ActionPreset::Archive => "archivebox.fill",
        }
    }

    /// Short label shown under the icon.
    pub fn label(self) -> &'static str {
        match self {
            ActionPreset::Add => "Add",
            ActionPreset::Favorite => "Favorite",
            ActionPreset::Delete => "Delete",
            ActionPreset::Edit => "Edit",
            ActionPreset::Share => "Share",
            ActionPreset::Archive => "Archive",
        }
    }

    /// Opaque tint token handed to the view layer.
    pub fn color(self) -> &'static str {
        match self {
            ActionPreset::Add | ActionPreset::Edit => "accent",
            ActionPreset::Favorite => "protein",
            ActionPreset::Delete => "destructive",
            ActionPreset::Share => "#007AFF",
            ActionPreset::Archive => "#FF9500",
        }
    }
}

type Callback = Box<dyn Fn()>;

/// One action revealed behind a card.
///
/// Immutable once built: the only way to "change" an action is to build a
/// new one.
pub struct SwipeAction {
    icon: String,
    label: Option<String>,
    color: String,
    on_trigger: Callback,
}

impl SwipeAction {
    pub fn new(
        icon: impl Into<String>,
        label: Option<String>,
        color: impl Into<String>,
        on_trigger: impl Fn() + 'static,
    ) -> Self {
        Self {
            icon: icon.into(),
            label,
            color: color.into(),
            on_trigger: Box::new(on_trigger),
        }
    }

    /// Build an action from one of the presets.
    pub fn preset(preset: ActionPreset, on_trigger: impl Fn() + 'static) -> Self {
        Self::new(
            preset.icon(),
            Some(preset.label().to_string()),
            preset.color(),
            on_trigger,
        )
    }

    /// Favorite toggle; the icon is filled when the item is already a favorite.
    pub fn favorite(is_favorite: bool, on_trigger: impl Fn() + 'static) -> Self {
        let mut action = Self::preset(ActionPreset::Favorite, on_trigger);
        if is_favorite {
            action.icon = "heart.fill".to_string();
        }
        action
    }

    pub fn add(on_trigger: impl Fn() + 'static) -> Self {
        Self::preset(ActionPreset::Add, on_trigger)
    }

    pub fn delete(on_trigger: impl Fn() + 'static) -> Self {
        Self::preset(ActionPreset::Delete, on_trigger)
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// Label if present, otherwise the icon name.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.icon)
    }

    /// Run the callback.  Only [`crate::dispatch::ActionDispatcher`] should
    /// call this, so the single-fire guard holds.
    pub(crate) fn trigger(&self) {
        (self.on_trigger)();
    }
}

impl fmt::Debug for SwipeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwipeAction")
            .field("icon", &self.icon)
            .field("label", &self.label)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}
