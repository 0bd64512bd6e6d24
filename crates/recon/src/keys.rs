//! Entity keys and form names: the join vocabulary between sheet rows and
//! species files.

use std::fmt;

use serde::Serialize;

/// Sheet spellings of regional forms mapped to the names used in species files.
pub const FORM_ALIASES: [(&str, &str); 4] = [
    ("Alolan", "Alola"),
    ("Galarian", "Galar"),
    ("Hisuian", "Hisui"),
    ("Paldean", "Paldea"),
];

/// Form name a species file uses for an explicit base form.
pub const EXPLICIT_BASE_FORM: &str = "None";

// ---------------------------------------------------------------------------
// EntityKey
// ---------------------------------------------------------------------------

/// Canonical species identifier, e.g. `"Mr. Mime"` -> `mrmime`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    /// Canonicalize a display name. Anything from the first `[` on is a form
    /// suffix and is dropped.
    pub fn from_display(raw: &str) -> Self {
        let base = match raw.find('[') {
            Some(pos) => &raw[..pos],
            None => raw,
        };

        let mut key = String::with_capacity(base.len());
        for ch in base.trim().chars() {
            match ch {
                ' ' | '-' | '.' | '\'' | '\u{2019}' | ':' => {}
                'é' | 'É' => key.push('e'),
                '♀' => key.push('f'),
                '♂' => key.push('m'),
                c => key.extend(c.to_lowercase()),
            }
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// FormName
// ---------------------------------------------------------------------------

/// Which variant of an entity a row or a file entry describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormName {
    Base,
    Named(String),
}

impl FormName {
    /// Form name as written in a sheet discriminator, alias-normalized.
    /// `[None]` names the base form explicitly.
    pub fn from_discriminator(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some(EXPLICIT_BASE_FORM) => Self::Base,
            Some(label) => {
                let canonical = FORM_ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == label)
                    .map(|(_, name)| *name)
                    .unwrap_or(label);
                Self::Named(canonical.to_string())
            }
        }
    }

    /// Form name as found in a species file's `forms` list.
    pub fn from_file_form(name: &str) -> Self {
        if name == EXPLICIT_BASE_FORM {
            Self::Base
        } else {
            Self::Named(name.to_string())
        }
    }
}

impl fmt::Display for FormName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Split `"Vulpix [Alolan]"` into the raw species part and the bracket interior.
pub fn split_display_name(raw: &str) -> (&str, Option<&str>) {
    let Some(open) = raw.find('[') else {
        return (raw.trim(), None);
    };
    let prefix = raw[..open].trim();
    let rest = &raw[open + 1..];
    let interior = match rest.find(']') {
        Some(close) => &rest[..close],
        None => rest,
    };
    (prefix, Some(interior.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn key_strips_punctuation_and_case() {
        assert_eq!(EntityKey::from_display("Mr. Mime").as_str(), "mrmime");
        assert_eq!(EntityKey::from_display("Farfetch'd").as_str(), "farfetchd");
        assert_eq!(EntityKey::from_display("Ho-Oh").as_str(), "hooh");
        assert_eq!(EntityKey::from_display("Type: Null").as_str(), "typenull");
        assert_eq!(EntityKey::from_display("Flabébé").as_str(), "flabebe");
        assert_eq!(EntityKey::from_display("Nidoran♀").as_str(), "nidoranf");
        assert_eq!(EntityKey::from_display("  Pikachu ").as_str(), "pikachu");
    }

    #[test]
    fn key_drops_bracket_suffix() {
        assert_eq!(EntityKey::from_display("Vulpix [Alolan]").as_str(), "vulpix");
    }

    #[test]
    fn split_with_and_without_form() {
        assert_eq!(split_display_name("Vulpix [Alolan]"), ("Vulpix", Some("Alolan")));
        assert_eq!(split_display_name(" Pikachu "), ("Pikachu", None));
        assert_eq!(split_display_name("Meowth [Galarian"), ("Meowth", Some("Galarian")));
    }

    #[test]
    fn discriminator_aliases() {
        assert_eq!(
            FormName::from_discriminator(Some("Alolan")),
            FormName::Named("Alola".into())
        );
        assert_eq!(
            FormName::from_discriminator(Some("Paldean")),
            FormName::Named("Paldea".into())
        );
        assert_eq!(
            FormName::from_discriminator(Some("Partner")),
            FormName::Named("Partner".into())
        );
        assert_eq!(FormName::from_discriminator(Some("  ")), FormName::Base);
        assert_eq!(FormName::from_discriminator(None), FormName::Base);
        assert_eq!(FormName::from_discriminator(Some("None")), FormName::Base);
    }

    #[test]
    fn explicit_base_form_in_files() {
        assert_eq!(FormName::from_file_form("None"), FormName::Base);
        assert_eq!(
            FormName::from_file_form("Alola"),
            FormName::Named("Alola".into())
        );
    }

    proptest! {
        #[test]
        fn key_is_idempotent(name in "[A-Za-z .'\\-:]{0,24}") {
            let once = EntityKey::from_display(&name);
            let twice = EntityKey::from_display(once.as_str());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn key_ignores_form_suffix(name in "[A-Za-z]{1,12}", form in "[A-Za-z ]{0,12}") {
            let with_form = format!("{name} [{form}]");
            prop_assert_eq!(EntityKey::from_display(&with_form), EntityKey::from_display(&name));
        }

        #[test]
        fn key_has_no_separators(name in "\\PC{0,32}") {
            let key = EntityKey::from_display(&name);
            prop_assert!(!key.as_str().contains([' ', '-', '.', '\'', ':', '[']));
        }
    }
}
