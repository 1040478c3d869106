use std::io::{self, Write};

use serde::Serialize;

use crate::case::Node;

/// Plain-text query the board hands to the surrounding application when the
/// analyst asks to dig into a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeepDive {
    pub label: String,
    pub description: Option<String>,
}

impl DeepDive {
    pub fn from_node(node: &Node) -> Self {
        let description = node.description.trim();
        Self {
            label: node.label.clone(),
            description: (!description.is_empty()).then(|| description.to_owned()),
        }
    }
}

/// Callbacks into whatever embeds the board.
pub trait BoardHost {
    fn deep_dive(&mut self, request: DeepDive);

    /// Called once when the board is dismissed.
    fn close(&mut self);
}

/// Writes each deep dive to stdout as one JSON line.
#[derive(Debug, Default)]
pub struct StdoutHost;

impl BoardHost for StdoutHost {
    fn deep_dive(&mut self, request: DeepDive) {
        let line = match serde_json::to_string(&request) {
            Ok(line) => line,
            Err(error) => {
                tracing::warn!(%error, "failed to encode deep dive request");
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(error) = writeln!(stdout, "{line}").and_then(|()| stdout.flush()) {
            tracing::warn!(%error, "failed to forward deep dive request");
        }
    }

    fn close(&mut self) {
        tracing::info!("investigation board closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::fixtures::node;

    #[test]
    fn deep_dive_carries_label_and_trimmed_description() {
        let mut suspect = node("s1", "Marcus Hale");
        suspect.description = "  Owner of the van.  ".to_owned();

        let request = DeepDive::from_node(&suspect);
        assert_eq!(request.label, "Marcus Hale");
        assert_eq!(request.description.as_deref(), Some("Owner of the van."));
    }

    #[test]
    fn deep_dive_omits_blank_description() {
        let request = DeepDive::from_node(&node("s2", "Unknown caller"));
        assert_eq!(request.description, None);
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"label":"Unknown caller","description":null}"#
        );
    }
}
