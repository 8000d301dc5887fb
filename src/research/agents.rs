//! The search-agent roster and the prompts sent to each agent.

use crate::types::{AgentDescriptor, PreprintPolicy};

/// The four agents launched for every search unless configuration
/// supplies its own roster.
pub fn default_roster() -> Vec<AgentDescriptor> {
    vec![
        AgentDescriptor::new(
            "Journal Scout",
            "Only return articles published in peer-reviewed academic journals. \
             Do not return conference papers, preprints, theses or blog posts.",
            PreprintPolicy::Exclude,
        ),
        AgentDescriptor::new(
            "Conference Scout",
            "Only return papers published in the proceedings of established, \
             peer-reviewed conferences and workshops.",
            PreprintPolicy::Exclude,
        ),
        AgentDescriptor::new(
            "Survey Scout",
            "Only return survey papers, systematic reviews, meta-analyses and \
             highly cited foundational works that define the field.",
            PreprintPolicy::Exclude,
        ),
        AgentDescriptor::new(
            "Frontier Scout",
            "Return the most recent and most relevant work from any credible \
             scholarly venue.",
            PreprintPolicy::FollowSession,
        ),
    ]
}

/// System prompt shared by every search agent.
pub const AGENT_SYSTEM_PROMPT: &str = "You are a meticulous research librarian. \
You search the web for real, citable scholarly work and never invent references. \
You answer with a JSON array and nothing else.";

/// Build the user prompt for one agent invocation.
pub fn build_agent_prompt(
    descriptor: &AgentDescriptor,
    topic: &str,
    context: &str,
    include_preprints: bool,
) -> String {
    let preprints = if descriptor.preprint_policy.allows_preprints(include_preprints) {
        "Preprints (arXiv, bioRxiv, SSRN and similar) are allowed; set \"isPreprint\" to true for them."
    } else {
        "Do not return preprints."
    };

    let context = context.trim();
    let context_block = if context.is_empty() {
        String::new()
    } else {
        format!("\nAdditional context from the author:\n{}\n", context)
    };

    format!(
        r#"Find 5 to 8 scholarly references about: {topic}
{context_block}
Constraint: {focus}
{preprints}

Respond with a JSON array. Each element must have these fields:
  "title": string,
  "authors": array of strings,
  "year": string,
  "doi": string or null,
  "url": string or null,
  "venue": string or null,
  "isPreprint": boolean,
  "snippet": one sentence on why the work is relevant
"#,
        topic = topic.trim(),
        context_block = context_block,
        focus = descriptor.focus_constraint,
        preprints = preprints,
    )
}
