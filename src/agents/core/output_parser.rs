//! Parsing of ReAct-formatted model output

use regex::Regex;
use std::sync::LazyLock;

use crate::agents::domain::AgentStep;

pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";
pub const OBSERVATION_STOP: &str = "\nObservation";

const BOTH_ACTION_AND_ANSWER: &str =
    "Parsing LLM output produced both a final answer and a parse-able action:";
const MISSING_ACTION: &str = "Invalid Format: Missing 'Action:' after 'Thought:'";
const MISSING_ACTION_INPUT: &str = "Invalid Format: Missing 'Action Input:' after 'Action:'";

/// What a single model reply asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedOutput {
    Action { tool: String, input: String },
    Finish { output: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputParseError {
    pub message: String,
}

impl std::fmt::Display for OutputParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for OutputParseError {}

static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("output parser: static regex pattern must compile")
});

static ACTION_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:").expect("output parser: static regex pattern must compile")
});

static ACTION_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*Input\s*\d*\s*:")
        .expect("output parser: static regex pattern must compile")
});

/// Parse one reply into a tool call or a final answer.
///
/// A reply carrying both is rejected. The tool input keeps everything after
/// `Action Input:`, minus surrounding spaces and double quotes.
pub fn parse_output(text: &str) -> Result<ParsedOutput, OutputParseError> {
    let includes_answer = text.contains(FINAL_ANSWER_MARKER);

    if let Some(captures) = ACTION.captures(text) {
        if includes_answer {
            return Err(OutputParseError {
                message: format!("{} {}", BOTH_ACTION_AND_ANSWER, text),
            });
        }

        let tool = captures.get(1).map_or("", |m| m.as_str()).trim().to_string();
        let input = captures
            .get(2)
            .map_or("", |m| m.as_str())
            .trim_matches(' ')
            .trim_matches('"')
            .to_string();

        return Ok(ParsedOutput::Action { tool, input });
    }

    if includes_answer {
        let output = text
            .rsplit(FINAL_ANSWER_MARKER)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        return Ok(ParsedOutput::Finish { output });
    }

    let message = if !ACTION_ONLY.is_match(text) {
        MISSING_ACTION.to_string()
    } else if !ACTION_INPUT.is_match(text) {
        MISSING_ACTION_INPUT.to_string()
    } else {
        format!("Could not parse LLM output: `{}`", text)
    };

    Err(OutputParseError { message })
}

/// Replay earlier steps so the model can continue where it stopped
pub fn format_scratchpad(steps: &[AgentStep]) -> String {
    let mut thoughts = String::new();
    for step in steps {
        thoughts.push_str(&step.invocation.log);
        thoughts.push_str("\nObservation: ");
        thoughts.push_str(&step.observation);
        thoughts.push_str("\nThought: ");
    }
    thoughts
}
