//! Prompt composition for pipeline stages

use crate::crew::agent::AgentSpec;
use crate::crew::task::TaskSpec;
use crate::review::result::TaskResult;
use crate::source::document::SourceDocument;
use chrono::{DateTime, Local};

/// Placeholders a task description may reference.
pub const KNOWN_PLACEHOLDERS: &[&str] = &[
    "code_file_path",
    "code_file_name",
    "code_content",
    "total_lines",
    "datetime",
];

/// Values substituted into a task description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptVars {
    pub code_file_path: String,
    pub code_file_name: String,
    pub code_content: String,
    pub total_lines: usize,
    pub datetime: String,
}

impl PromptVars {
    pub fn from_source(source: &SourceDocument, now: DateTime<Local>) -> Self {
        Self {
            code_file_path: source.location.clone(),
            code_file_name: source.name.clone(),
            code_content: source.content.clone(),
            total_lines: source.line_count(),
            datetime: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "code_file_path" => Some(self.code_file_path.clone()),
            "code_file_name" => Some(self.code_file_name.clone()),
            "code_content" => Some(self.code_content.clone()),
            "total_lines" => Some(self.total_lines.to_string()),
            "datetime" => Some(self.datetime.clone()),
            _ => None,
        }
    }
}

/// A piece of a parsed template.
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

/// Split a template into literal text and `{name}` placeholders.
///
/// `{{` and `}}` produce literal braces. A `{` not followed by an identifier
/// and a closing `}` is kept as text.
fn parse(template: &str) -> Vec<Segment<'_>> {
    let bytes = template.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                segments.push(Segment::Text(&template[start..i + 1]));
                i += 2;
                start = i;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                segments.push(Segment::Text(&template[start..i + 1]));
                i += 2;
                start = i;
            }
            b'{' => {
                let name_len = bytes[i + 1..]
                    .iter()
                    .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                    .count();
                let close = i + 1 + name_len;
                if name_len > 0
                    && !bytes[i + 1].is_ascii_digit()
                    && bytes.get(close) == Some(&b'}')
                {
                    segments.push(Segment::Text(&template[start..i]));
                    segments.push(Segment::Placeholder(&template[i + 1..close]));
                    i = close + 1;
                    start = i;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    segments.push(Segment::Text(&template[start..]));
    segments.retain(|s| !matches!(s, Segment::Text("")));
    segments
}

/// Names of all placeholders referenced by a template, in order of first use.
pub fn placeholders_in(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for segment in parse(template) {
        if let Segment::Placeholder(name) = segment
            && !names.iter().any(|n| n == name)
        {
            names.push(name.to_string());
        }
    }
    names
}

/// Builds the prompts sent to each stage's agent.
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt establishing the agent's persona.
    pub fn system_prompt(agent: &AgentSpec) -> String {
        format!(
            "You are {}.\n\nYour goal: {}\n\nBackground: {}\n\n\
             Ground every finding in the code you are given. Cite line numbers \
             and rate each issue as CRITICAL, HIGH, MEDIUM, LOW or INFO.",
            agent.role.trim(),
            agent.goal.trim(),
            agent.backstory.trim()
        )
    }

    /// Substitute known placeholders; unknown ones are left verbatim.
    pub fn render_description(template: &str, vars: &PromptVars) -> String {
        let mut out = String::with_capacity(template.len() + vars.code_content.len());
        for segment in parse(template) {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder(name) => match vars.lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                },
            }
        }
        out
    }

    /// Full user prompt for one stage.
    ///
    /// `context` holds the prerequisite results in pipeline order.
    pub fn stage_prompt(
        task: &TaskSpec,
        source: &SourceDocument,
        context: &[&TaskResult],
        now: DateTime<Local>,
    ) -> String {
        let vars = PromptVars::from_source(source, now);
        let mut prompt = Self::render_description(&task.description, &vars);

        if !placeholders_in(&task.description)
            .iter()
            .any(|p| p == "code_content")
        {
            prompt.push_str(&format!(
                "\n\nSource `{}` ({} lines):\n```{}\n{}\n```",
                source.name,
                vars.total_lines,
                source.language_hint(),
                source.content.trim_end()
            ));
        }

        if !context.is_empty() {
            prompt.push_str("\n\n## Context from previous analyses\n");
            for result in context {
                prompt.push_str(&format!(
                    "\n### {}\n\n{}\n",
                    result.stage.display_name(),
                    result.output.trim()
                ));
            }
        }

        prompt.push_str("\n\n## Expected output\n\n");
        prompt.push_str(task.expected_output.trim());
        prompt.push('\n');
        prompt
    }
}
