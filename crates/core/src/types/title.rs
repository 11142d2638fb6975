//! Display titles for catalog records.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Title`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TitleError {
    /// The input string is empty after trimming.
    #[error("title cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("title must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A display title for a menu item or category.
///
/// Titles come straight from client input and end up rendered by arbitrary
/// frontends, so markup is neutralized at the boundary: `&`, `<` and `>` are
/// HTML-escaped on parse. The stored value therefore never contains live
/// markup.
///
/// Categories and menu items carry different length limits, so each has its
/// own constructor; both validate length before escaping.
///
/// ## Examples
///
/// ```
/// use bistro_core::Title;
///
/// let title = Title::parse_menu_item("Fish & Chips").unwrap();
/// assert_eq!(title.as_str(), "Fish &amp; Chips");
///
/// let title = Title::parse_menu_item("<b>Special</b>").unwrap();
/// assert_eq!(title.as_str(), "&lt;b&gt;Special&lt;/b&gt;");
///
/// assert!(Title::parse_category("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Title(String);

impl Title {
    /// Maximum length of a category title as submitted, before escaping.
    pub const CATEGORY_MAX_LENGTH: usize = 120;

    /// Maximum length of a menu item title as submitted, before escaping.
    pub const MENU_ITEM_MAX_LENGTH: usize = 200;

    /// Parse a category title, trimming and escaping markup.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty after trimming or longer than
    /// [`Title::CATEGORY_MAX_LENGTH`] characters.
    pub fn parse_category(s: &str) -> Result<Self, TitleError> {
        Self::parse(s, Self::CATEGORY_MAX_LENGTH)
    }

    /// Parse a menu item title, trimming and escaping markup.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty after trimming or longer than
    /// [`Title::MENU_ITEM_MAX_LENGTH`] characters.
    pub fn parse_menu_item(s: &str) -> Result<Self, TitleError> {
        Self::parse(s, Self::MENU_ITEM_MAX_LENGTH)
    }

    fn parse(s: &str, max: usize) -> Result<Self, TitleError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TitleError::Empty);
        }
        if trimmed.chars().count() > max {
            return Err(TitleError::TooLong { max });
        }

        Ok(Self(escape_markup(trimmed)))
    }

    /// Wrap a title read back from storage.
    ///
    /// Stored titles were already escaped when first parsed; escaping again
    /// here would corrupt them.
    #[must_use]
    pub const fn from_db(value: String) -> Self {
        Self(value)
    }

    /// Returns the escaped title as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Title` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Escape the characters that can open markup contexts.
///
/// `&` must be replaced before the angle brackets.
fn escape_markup(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
