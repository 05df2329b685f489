//! Prompt rendering for the booking persona

use tera::{Context, Tera};

use super::PlanningContext;
use crate::agents::domain::{Message, Role};
use crate::agents::error::AgentResult;
use crate::domain::Tool;

/// Built-in ReAct prompt. Variables: `tools`, `tool_names`, `today`,
/// `example_iso_time`, `chat_history`, `input`, `agent_scratchpad`.
pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"
You are a friendly and helpful AI assistant named TailorTalk. Your goal is to help users book appointments in their Google Calendar.

You have access to the following tools:
{{ tools }}

To use a tool, please use the following format:
Thought: Do I need to use a tool? Yes
Action: the action to take, should be one of [{{ tool_names }}]
Action Input: the input to the action
Observation: the result of the action


When you have a response to say to the Human, or if you do not need to use a tool, you MUST use the format:
Thought: Do I need to use a tool? No
Final Answer: [your response here]


IMPORTANT:
- Today's date is {{ today }}.
- Always be conversational and ask for clarification if the user's request is ambiguous.
- Before booking, always confirm the availability first unless the user explicitly asks to book without checking.
- The user's timezone is likely India Standard Time (IST, UTC+5:30). When you need to generate a time string for the tools, assume it's for today or a future date and include the timezone offset. For example: `{{ example_iso_time }}`.

Begin!

Previous conversation history:
{{ chat_history }}

New input: {{ input }}
{{ agent_scratchpad }}
"#;

/// One `name: description` line per tool
pub fn render_tool_list(tools: &[Tool]) -> String {
    tools
        .iter()
        .map(|t| format!("{}: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prior turns as `Human:` / `AI:` lines
pub fn render_history(history: &[Message]) -> String {
    history
        .iter()
        .map(|m| match m.role {
            Role::User => format!("Human: {}", m.content),
            Role::Assistant => format!("AI: {}", m.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fill the template for one planner call
pub fn render_prompt(template: &str, ctx: &PlanningContext, scratchpad: &str) -> AgentResult<String> {
    let tool_names: Vec<&str> = ctx.tools.iter().map(|t| t.name.as_str()).collect();

    let mut context = Context::new();
    context.insert("tools", &render_tool_list(&ctx.tools));
    context.insert("tool_names", &tool_names.join(", "));
    context.insert("today", &ctx.today);
    context.insert("example_iso_time", &ctx.example_instant);
    context.insert("chat_history", &render_history(&ctx.history));
    context.insert("input", &ctx.input);
    context.insert("agent_scratchpad", scratchpad);

    Ok(Tera::one_off(template, &context, false)?)
}
