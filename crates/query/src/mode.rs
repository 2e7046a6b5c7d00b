use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Word-count bound under which a question naming a known entity is
/// treated as entity-focused.
pub const SHORT_QUERY_WORDS: usize = 12;

/// Retrieval emphasis for a question. `Auto` defers the choice to the
/// shape of the question at answer time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Local,
    Global,
    #[default]
    Auto,
}

impl Mode {
    /// Collapse `Auto` into `Local` or `Global`: a question of at most
    /// [`SHORT_QUERY_WORDS`] whitespace-separated words that mentions a
    /// known entity (case-insensitive substring) goes local, everything
    /// else global. Explicit modes pass through unchanged.
    pub fn resolve<'a, I>(self, question: &str, entities: I) -> Mode
    where
        I: IntoIterator<Item = &'a str>,
    {
        match self {
            Mode::Local | Mode::Global => self,
            Mode::Auto => {
                if question.split_whitespace().count() > SHORT_QUERY_WORDS {
                    return Mode::Global;
                }
                let question = question.to_lowercase();
                let mentions_entity = entities
                    .into_iter()
                    .filter(|name| !name.is_empty())
                    .any(|name| question.contains(&name.to_lowercase()));
                if mentions_entity { Mode::Local } else { Mode::Global }
            }
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Local => write!(f, "local"),
            Mode::Global => write!(f, "global"),
            Mode::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Mode::Local),
            "global" => Ok(Mode::Global),
            "auto" => Ok(Mode::Auto),
            other => Err(format!(
                "unknown mode '{other}', expected local, global or auto"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTITIES: [&str; 2] = ["ambedkar", "constitution"];

    #[test]
    fn short_question_naming_an_entity_goes_local() {
        let mode = Mode::Auto.resolve("Who drafted the Constitution?", ENTITIES);
        assert_eq!(mode, Mode::Local);
    }

    #[test]
    fn short_question_without_entities_goes_global() {
        let mode = Mode::Auto.resolve("What are the main themes?", ENTITIES);
        assert_eq!(mode, Mode::Global);
    }

    #[test]
    fn long_question_goes_global_even_with_an_entity() {
        let question = "Considering every argument made across all chapters, \
                        how does the Constitution relate to the broader themes?";
        let mode = Mode::Auto.resolve(question, ENTITIES);
        assert_eq!(mode, Mode::Global);
    }

    #[test]
    fn explicit_modes_pass_through() {
        assert_eq!(Mode::Local.resolve("anything at all", ENTITIES), Mode::Local);
        assert_eq!(
            Mode::Global.resolve("Who drafted the Constitution?", ENTITIES),
            Mode::Global
        );
    }

    #[test]
    fn no_entities_means_global() {
        let mode = Mode::Auto.resolve("Who drafted the Constitution?", []);
        assert_eq!(mode, Mode::Global);
    }

    #[test]
    fn modes_parse_from_strings() {
        assert_eq!("local".parse::<Mode>().unwrap(), Mode::Local);
        assert_eq!("GLOBAL".parse::<Mode>().unwrap(), Mode::Global);
        assert_eq!("auto".parse::<Mode>().unwrap(), Mode::Auto);
        assert!("hybrid".parse::<Mode>().is_err());
    }
}
