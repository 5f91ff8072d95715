//! Context Selector: decides which slice of a GitHub bundle a prompt may see.
//!
//! CRITICAL: a repository-scoped letter must never see profile-wide languages,
//! skills, bio, company, or location. Isolation is enforced structurally:
//! the assembler renders from a [`ScopedView`], which only borrows the
//! in-scope sections of the bundle.

use serde::{Deserialize, Serialize};

use crate::models::github::{
    CommitAnalysis, ContributorInfo, GitHubContextBundle, GitHubUser, LanguageStat,
    RepositoryCommit, RepositoryInfo, SkillSet,
};

/// Analysis context requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisContextType {
    #[default]
    Profile,
    RepoOnly,
    RepositoryContributor,
}

/// Resolved scope tag. Differs from the requested type only when a
/// repository context was requested without a repository reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextScope {
    Profile,
    RepoOnly,
    RepositoryContributor,
}

impl ContextScope {
    pub fn is_repository(&self) -> bool {
        !matches!(self, ContextScope::Profile)
    }
}

/// Resolves the effective scope for a request.
///
/// `repo_only` and `repository_contributor` hold only when a non-blank
/// repository reference is supplied; otherwise the scope falls back to
/// `profile`. Pure function, never fails.
pub fn resolve_scope(
    context_type: AnalysisContextType,
    repository_ref: Option<&str>,
) -> ContextScope {
    let has_repository = repository_ref
        .map(|r| !r.trim().is_empty())
        .unwrap_or(false);

    match (context_type, has_repository) {
        (AnalysisContextType::RepoOnly, true) => ContextScope::RepoOnly,
        (AnalysisContextType::RepositoryContributor, true) => ContextScope::RepositoryContributor,
        _ => ContextScope::Profile,
    }
}

/// Profile-wide sections, visible only in profile scope.
#[derive(Debug, Clone, Copy)]
pub struct ProfileView<'a> {
    pub user: Option<&'a GitHubUser>,
    pub languages: &'a [LanguageStat],
    pub skills: &'a SkillSet,
    pub commit_analysis: Option<&'a CommitAnalysis>,
}

/// Repository sections, visible only in repository scopes.
///
/// `user` is carried for identity (display name) only; its bio, company and
/// location are never rendered.
#[derive(Debug, Clone, Copy)]
pub struct RepositoryView<'a> {
    pub user: Option<&'a GitHubUser>,
    pub repository: Option<&'a RepositoryInfo>,
    pub languages: &'a [LanguageStat],
    pub skills: &'a SkillSet,
    pub commits: &'a [RepositoryCommit],
    /// Populated only in `repository_contributor` scope.
    pub contributor: Option<&'a ContributorInfo>,
}

#[derive(Debug, Clone, Copy)]
pub enum ScopedView<'a> {
    Profile(ProfileView<'a>),
    Repository(RepositoryView<'a>),
}

/// Projects a bundle onto the sections eligible for `scope`.
pub fn scoped_view(scope: ContextScope, bundle: &GitHubContextBundle) -> ScopedView<'_> {
    match scope {
        ContextScope::Profile => ScopedView::Profile(ProfileView {
            user: bundle.user_data.as_ref(),
            languages: &bundle.languages,
            skills: &bundle.skills,
            commit_analysis: bundle.commit_analysis.as_ref(),
        }),
        ContextScope::RepoOnly | ContextScope::RepositoryContributor => {
            ScopedView::Repository(RepositoryView {
                user: bundle.user_data.as_ref(),
                repository: bundle.repository_info.as_ref(),
                languages: &bundle.repository_languages,
                skills: &bundle.repository_skills,
                commits: &bundle.repository_commits,
                contributor: match scope {
                    ContextScope::RepositoryContributor => bundle.contributor_info.as_ref(),
                    _ => None,
                },
            })
        }
    }
}
