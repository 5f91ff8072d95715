//! Prompt Assembler: renders one recommendation prompt from a scoped view.
//!
//! Output is a pure function of its inputs: no timestamps, no ids, and list
//! sections keep input order. Lists are capped so the prompt stays bounded.

use std::fmt::Write as _;

use crate::models::generation::GenerationParameters;
use crate::models::github::{GitHubContextBundle, LanguageStat, SkillSet};
use crate::prompt::context::{scoped_view, ContextScope, ProfileView, RepositoryView, ScopedView};
use crate::prompt::display_name::{display_name_for_contributor, display_name_for_user};
use crate::prompt::prompts::{FORMATTING_TEMPLATE, PROFILE_SCOPE_RULE, REPOSITORY_SCOPE_RULE};

const MAX_LANGUAGES: usize = 8;
const MAX_SKILLS_PER_CATEGORY: usize = 12;
const MAX_TOPICS: usize = 10;
const MAX_COMMITS: usize = 10;
const MAX_COMMIT_MESSAGE_CHARS: usize = 120;
const MAX_CUSTOM_PROMPT_CHARS: usize = 1000;

/// A rendered prompt plus the display name it addresses.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPrompt {
    pub text: String,
    pub display_name: String,
    pub scope: ContextScope,
}

/// Renders the base prompt (before any experiment block) for `scope`.
pub fn build_prompt(
    bundle: &GitHubContextBundle,
    params: &GenerationParameters,
    scope: ContextScope,
) -> AssembledPrompt {
    let view = scoped_view(scope, bundle);
    let display_name = match &view {
        ScopedView::Profile(p) => display_name_for_user(p.user),
        ScopedView::Repository(r) => display_name_for_contributor(r.contributor, r.user),
    };

    let mut sections: Vec<String> = Vec::new();

    match &view {
        ScopedView::Profile(profile) => {
            sections.push(format!(
                "Write a {} LinkedIn recommendation for {}, a software developer, \
                 based on their GitHub profile.",
                params.recommendation_type.as_str(),
                display_name
            ));
            sections.extend(render_profile(profile));
            sections.push(PROFILE_SCOPE_RULE.to_string());
        }
        ScopedView::Repository(repo) => {
            // Short name only: `owner/name` would put the owner's handle in the prompt.
            let target = match non_blank(repo.repository.map(|r| r.name.as_str())) {
                Some(name) => format!("the {name} repository"),
                None => "this repository".to_string(),
            };
            let relation = if repo.contributor.is_some() {
                "their contributions to"
            } else {
                "their work on"
            };
            sections.push(format!(
                "Write a {} LinkedIn recommendation for {} based on {} {}.",
                params.recommendation_type.as_str(),
                display_name,
                relation,
                target
            ));
            sections.extend(render_repository(repo));
            sections.push(REPOSITORY_SCOPE_RULE.to_string());
        }
    }

    sections.push(render_parameters(params));
    sections.push(
        FORMATTING_TEMPLATE
            .replace("{paragraphs}", &params.length.paragraph_count().to_string())
            .replace("{display_name}", &display_name),
    );

    AssembledPrompt {
        text: sections.join("\n\n"),
        display_name,
        scope,
    }
}

fn render_profile(profile: &ProfileView<'_>) -> Vec<String> {
    let mut sections = Vec::new();

    if let Some(user) = profile.user {
        let mut lines = Vec::new();
        push_field(&mut lines, "Bio", user.bio.as_deref());
        push_field(&mut lines, "Company", user.company.as_deref());
        push_field(&mut lines, "Location", user.location.as_deref());
        if let Some(repos) = user.public_repos {
            lines.push(format!("- Public repositories: {repos}"));
        }
        if let Some(followers) = user.followers {
            lines.push(format!("- Followers: {followers}"));
        }
        if !lines.is_empty() {
            sections.push(format!("DEVELOPER PROFILE:\n{}", lines.join("\n")));
        }
    }

    if let Some(languages) = render_languages(profile.languages) {
        sections.push(format!("PRIMARY LANGUAGES:\n{languages}"));
    }
    if let Some(skills) = render_skills(profile.skills) {
        sections.push(format!("SKILLS:\n{skills}"));
    }

    if let Some(analysis) = profile.commit_analysis {
        let mut lines = vec![format!("- Commits analyzed: {}", analysis.total_commits)];
        push_list(&mut lines, "Focus areas", &analysis.focus_areas, MAX_SKILLS_PER_CATEGORY);
        push_list(&mut lines, "Working patterns", &analysis.patterns, MAX_SKILLS_PER_CATEGORY);
        sections.push(format!("COMMIT ANALYSIS:\n{}", lines.join("\n")));
    }

    sections
}

fn render_repository(repo: &RepositoryView<'_>) -> Vec<String> {
    let mut sections = Vec::new();

    if let Some(info) = repo.repository {
        let mut lines = Vec::new();
        push_field(&mut lines, "Name", Some(info.name.as_str()));
        push_field(&mut lines, "Description", info.description.as_deref());
        push_field(&mut lines, "Primary language", info.language.as_deref());
        lines.push(format!("- Stars: {}", info.stars));
        lines.push(format!("- Forks: {}", info.forks));
        push_list(&mut lines, "Topics", &info.topics, MAX_TOPICS);
        sections.push(format!("REPOSITORY:\n{}", lines.join("\n")));
    }

    if let Some(languages) = render_languages(repo.languages) {
        sections.push(format!("REPOSITORY LANGUAGES:\n{languages}"));
    }
    if let Some(skills) = render_skills(repo.skills) {
        sections.push(format!("REPOSITORY SKILLS:\n{skills}"));
    }

    if !repo.commits.is_empty() {
        let shown = repo.commits.len().min(MAX_COMMITS);
        let mut block = format!(
            "RECENT COMMITS ({} shown of {}):",
            shown,
            repo.commits.len()
        );
        for commit in repo.commits.iter().take(MAX_COMMITS) {
            let _ = write!(block, "\n- {}", summarize_commit_message(&commit.message));
        }
        sections.push(block);
    }

    if let Some(contributor) = repo.contributor {
        sections.push(format!(
            "CONTRIBUTION:\n- Contributions to this repository: {}",
            contributor.contributions
        ));
    }

    sections
}

fn render_parameters(params: &GenerationParameters) -> String {
    let mut lines = vec![
        format!(
            "RECOMMENDATION TYPE: {}. Emphasize {}.",
            params.recommendation_type.as_str(),
            params.recommendation_type.focus()
        ),
        format!("TONE: {}. Keep it {}.", params.tone.as_str(), params.tone.guidance()),
    ];

    if let Some(role) = non_blank(params.target_role.as_deref()) {
        lines.push(format!(
            "TARGET ROLE: Position the developer as a strong fit for a {role} role."
        ));
    }
    if !params.specific_skills.is_empty() {
        lines.push(format!(
            "SKILLS TO HIGHLIGHT: {}",
            params
                .specific_skills
                .iter()
                .take(MAX_SKILLS_PER_CATEGORY)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    if let Some(custom) = non_blank(params.custom_prompt.as_deref()) {
        lines.push(format!(
            "ADDITIONAL CONTEXT FROM THE RECOMMENDER:\n{}",
            truncate_chars(custom, MAX_CUSTOM_PROMPT_CHARS)
        ));
    }

    lines.join("\n")
}

fn render_languages(languages: &[LanguageStat]) -> Option<String> {
    if languages.is_empty() {
        return None;
    }
    Some(
        languages
            .iter()
            .take(MAX_LANGUAGES)
            .map(|l| format!("- {} ({:.1}%)", l.language, l.percentage))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

fn render_skills(skills: &SkillSet) -> Option<String> {
    if skills.is_empty() {
        return None;
    }
    let mut lines = Vec::new();
    push_list(&mut lines, "Technical skills", &skills.technical_skills, MAX_SKILLS_PER_CATEGORY);
    push_list(&mut lines, "Frameworks", &skills.frameworks, MAX_SKILLS_PER_CATEGORY);
    push_list(&mut lines, "Tools", &skills.tools, MAX_SKILLS_PER_CATEGORY);
    push_list(&mut lines, "Domains", &skills.domains, MAX_SKILLS_PER_CATEGORY);
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn push_field(lines: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(value) = non_blank(value) {
        lines.push(format!("- {label}: {}", value.trim()));
    }
}

fn push_list(lines: &mut Vec<String>, label: &str, items: &[String], cap: usize) {
    if items.is_empty() {
        return;
    }
    let joined = items
        .iter()
        .take(cap)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("- {label}: {joined}"));
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// First line of a commit message, capped at `MAX_COMMIT_MESSAGE_CHARS`.
fn summarize_commit_message(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or("").trim();
    truncate_chars(first_line, MAX_COMMIT_MESSAGE_CHARS)
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max).collect();
    truncated.push_str("...");
    truncated
}
