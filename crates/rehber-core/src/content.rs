//! Update notes and nostalgia photos.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{or_default, required, Result};
use crate::ids::PhotoId;

/// Importance assigned when the admin leaves it blank.
pub const DEFAULT_IMPORTANCE: &str = "normal";

/// A release note shown on the app's "what's new" screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNote {
    /// Store-assigned id.
    pub id: i64,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Free-form importance tag (`normal`, `high`, ...).
    pub importance: String,
    /// Display date (`dd.mm.yyyy`) stamped at creation.
    pub date: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UpdateNote {
    /// Materialize a stored note from its creation input.
    #[must_use]
    pub fn from_new(id: i64, new: NewUpdateNote, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            content: new.content,
            importance: new.importance,
            date: new.date,
            created_at,
        }
    }
}

/// Validated input for a new update note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUpdateNote {
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Importance tag.
    pub importance: String,
    /// Display date.
    pub date: String,
}

impl NewUpdateNote {
    /// Validate admin input, defaulting the importance and stamping today's date.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingField` if the title or content is absent or blank.
    pub fn new(
        title: Option<String>,
        content: Option<String>,
        importance: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            title: required("title", title)?,
            content: required("content", content)?,
            importance: or_default(importance, DEFAULT_IMPORTANCE),
            date: display_date(&Local::now()),
        })
    }
}

/// A nostalgia photo shown in the app's gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NostalgiaPhoto {
    /// Store-assigned `k<n>` id.
    pub id: PhotoId,
    /// Caption.
    pub title: String,
    /// Image location.
    pub image_url: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NostalgiaPhoto {
    /// Materialize a stored photo from its creation input.
    #[must_use]
    pub fn from_new(id: PhotoId, new: NewPhoto, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            image_url: new.image_url,
            created_at,
        }
    }
}

/// Validated input for a new photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhoto {
    /// Caption.
    pub title: String,
    /// Image location.
    pub image_url: String,
}

impl NewPhoto {
    /// Validate admin input.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingField` if the title or url is absent or blank.
    pub fn new(title: Option<String>, url: Option<String>) -> Result<Self> {
        Ok(Self {
            title: required("title", title)?,
            image_url: required("url", url)?,
        })
    }
}

/// Format a date the way the app displays it (`19.11.2024`).
#[must_use]
pub fn display_date<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%d.%m.%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn update_note_defaults_importance() {
        let note = NewUpdateNote::new(Some("v1.1".into()), Some("Fixes".into()), None).unwrap();
        assert_eq!(note.importance, DEFAULT_IMPORTANCE);
        assert_eq!(note.date.len(), "19.11.2024".len());
    }

    #[test]
    fn update_note_requires_title_and_content() {
        assert_eq!(
            NewUpdateNote::new(None, Some("body".into()), None),
            Err(CoreError::MissingField("title"))
        );
        assert_eq!(
            NewUpdateNote::new(Some("t".into()), Some(String::new()), None),
            Err(CoreError::MissingField("content"))
        );
    }

    #[test]
    fn photo_requires_url() {
        assert_eq!(
            NewPhoto::new(Some("Old castle".into()), None),
            Err(CoreError::MissingField("url"))
        );
    }

    #[test]
    fn display_date_format() {
        let at = Utc.with_ymd_and_hms(2024, 11, 19, 8, 30, 0).unwrap();
        assert_eq!(display_date(&at), "19.11.2024");
    }

    #[test]
    fn photo_json_uses_snake_case() {
        let photo = NostalgiaPhoto::from_new(
            PhotoId::from_sequence(2),
            NewPhoto::new(Some("Moradon".into()), Some("/ko2.jpg".into())).unwrap(),
            Utc::now(),
        );
        let json = serde_json::to_value(&photo).unwrap();
        assert_eq!(json["id"], "k2");
        assert_eq!(json["image_url"], "/ko2.jpg");
        assert!(json.get("created_at").is_some());
    }
}
