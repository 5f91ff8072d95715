use serde::{Deserialize, Serialize};

/// Public profile fields of the developer being recommended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitHubUser {
    pub github_username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub public_repos: Option<u32>,
    #[serde(default)]
    pub followers: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageStat {
    pub language: String,
    pub percentage: f64,
}

/// Skills extracted from either a whole profile or a single repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillSet {
    #[serde(default)]
    pub technical_skills: Vec<String>,
    #[serde(default)]
    pub frameworks: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub domains: Vec<String>,
}

impl SkillSet {
    pub fn is_empty(&self) -> bool {
        self.technical_skills.is_empty()
            && self.frameworks.is_empty()
            && self.tools.is_empty()
            && self.domains.is_empty()
    }
}

/// Profile-level summary of commit history across all repositories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitAnalysis {
    pub total_commits: u32,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stars: u32,
    #[serde(default)]
    pub forks: u32,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryCommit {
    pub sha: String,
    pub message: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// A single contributor's footprint inside one repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributorInfo {
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub contributions: u32,
}

/// Everything upstream fetchers know about a GitHub entity.
///
/// Profile-wide and repository-scoped sections may both be populated here;
/// only one of them is ever rendered into a prompt. See
/// [`crate::prompt::context::scoped_view`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitHubContextBundle {
    #[serde(default)]
    pub user_data: Option<GitHubUser>,
    #[serde(default)]
    pub languages: Vec<LanguageStat>,
    #[serde(default)]
    pub skills: SkillSet,
    #[serde(default)]
    pub commit_analysis: Option<CommitAnalysis>,
    #[serde(default)]
    pub repository_info: Option<RepositoryInfo>,
    #[serde(default)]
    pub repository_languages: Vec<LanguageStat>,
    #[serde(default)]
    pub repository_skills: SkillSet,
    #[serde(default)]
    pub repository_commits: Vec<RepositoryCommit>,
    #[serde(default)]
    pub contributor_info: Option<ContributorInfo>,
}
