//! Weighted fit-score computation.
//!
//! Three factors contribute, each scaled by its weight:
//! - skill overlap: `skill_weight * matched / required` (floor);
//! - availability: `availability_weight * availability / 100` (floor);
//! - role fit: `role_weight` when the role appears in the project name or
//!   description as a whole-token run, else 0.
//!
//! The total is clamped to 100. The reason names the factor with the largest
//! contribution; ties go to skill, then availability, then role.

use crate::model::allocation::AvailabilitySnapshot;
use crate::model::person::Person;
use crate::model::project::Project;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("valid token regex"));

const MAX_SCORE: u32 = 100;
const NO_MATCH_REASON: &str = "No matching factors";

/// How a project with no required skills scores on the skill factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyRequirements {
    /// Nothing to violate: full skill weight.
    #[default]
    FullMarks,
    /// Nothing to match: zero skill contribution.
    NoMarks,
}

impl EmptyRequirements {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" | "full_marks" => Some(Self::FullMarks),
            "none" | "no_marks" => Some(Self::NoMarks),
            _ => None,
        }
    }
}

/// Factor weights and edge-case policy. Passed by value into every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub skill_weight: u8,
    pub availability_weight: u8,
    pub role_weight: u8,
    pub empty_requirements: EmptyRequirements,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            skill_weight: 60,
            availability_weight: 30,
            role_weight: 10,
            empty_requirements: EmptyRequirements::FullMarks,
        }
    }
}

/// Scoring factor, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFactor {
    Skill,
    Availability,
    Role,
}

impl MatchFactor {
    pub fn reason(self) -> &'static str {
        match self {
            Self::Skill => "Strong skill match",
            Self::Availability => "High availability",
            Self::Role => "Role alignment",
        }
    }
}

/// Per-factor weighted contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skill: u8,
    pub availability: u8,
    pub role: u8,
}

impl ScoreBreakdown {
    /// Factor with the largest contribution; `None` when all are zero.
    pub fn dominant(&self) -> Option<MatchFactor> {
        let ordered = [
            (MatchFactor::Skill, self.skill),
            (MatchFactor::Availability, self.availability),
            (MatchFactor::Role, self.role),
        ];
        let mut best: Option<(MatchFactor, u8)> = None;
        for (factor, value) in ordered {
            if value == 0 {
                continue;
            }
            match best {
                Some((_, best_value)) if best_value >= value => {}
                _ => best = Some((factor, value)),
            }
        }
        best.map(|(factor, _)| factor)
    }

    fn total(&self) -> u8 {
        let sum = u32::from(self.skill) + u32::from(self.availability) + u32::from(self.role);
        // Clamped to 100, so the narrowing cannot fail.
        sum.min(MAX_SCORE) as u8
    }
}

/// Fit of one person for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitScore {
    pub score: u8,
    pub reason: String,
    pub breakdown: ScoreBreakdown,
    /// Number of required skills the person holds.
    pub matched_skills: usize,
}

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub person: Person,
    pub score: u8,
    pub reason: String,
    pub breakdown: ScoreBreakdown,
    pub matched_skills: usize,
}

/// Scores `person` against `project` using availability from `snapshot`.
///
/// `reason` names the dominant factor: "Strong skill match",
/// "High availability" or "Role alignment", with ties going to the factor
/// listed first. A score of zero has no dominant factor and carries
/// "No matching factors" instead.
pub fn score(
    person: &Person,
    project: &Project,
    snapshot: &AvailabilitySnapshot,
    policy: &ScoringPolicy,
) -> FitScore {
    let matched_skills = project
        .required_skills
        .iter()
        .filter(|required| person.has_skill(required.id))
        .count();

    let skill = if project.required_skills.is_empty() {
        match policy.empty_requirements {
            EmptyRequirements::FullMarks => policy.skill_weight,
            EmptyRequirements::NoMarks => 0,
        }
    } else {
        scale(policy.skill_weight, matched_skills, project.required_skills.len())
    };

    let availability = scale(
        policy.availability_weight,
        usize::from(snapshot.availability_of(person)),
        100,
    );

    let role = if role_matches(&person.role, project) {
        policy.role_weight
    } else {
        0
    };

    let breakdown = ScoreBreakdown {
        skill,
        availability,
        role,
    };
    let reason = breakdown
        .dominant()
        .map_or(NO_MATCH_REASON, MatchFactor::reason)
        .to_string();

    FitScore {
        score: breakdown.total(),
        reason,
        breakdown,
        matched_skills,
    }
}

/// Scores and ranks every person for `project`.
///
/// Order: score descending, ties by ascending person id. No candidate is
/// dropped; fully booked people rank low rather than disappear.
pub fn rank(
    people: impl IntoIterator<Item = Person>,
    project: &Project,
    snapshot: &AvailabilitySnapshot,
    policy: &ScoringPolicy,
) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = people
        .into_iter()
        .map(|person| {
            let fit = score(&person, project, snapshot, policy);
            Suggestion {
                person,
                score: fit.score,
                reason: fit.reason,
                breakdown: fit.breakdown,
                matched_skills: fit.matched_skills,
            }
        })
        .collect();
    suggestions.sort_by(|left, right| {
        right
            .score
            .cmp(&left.score)
            .then_with(|| left.person.id.cmp(&right.person.id))
    });
    suggestions
}

/// `weight * numerator / denominator`, floored; `denominator` is at least 1.
fn scale(weight: u8, numerator: usize, denominator: usize) -> u8 {
    let denominator = denominator.max(1);
    let numerator = numerator.min(denominator);
    // numerator <= denominator keeps the result <= weight.
    (usize::from(weight) * numerator / denominator) as u8
}

/// Whether the role's tokens occur as a contiguous run in the project name
/// or description (case-insensitive, whole tokens only).
fn role_matches(role: &str, project: &Project) -> bool {
    let role_tokens = tokenize(role);
    if role_tokens.is_empty() {
        return false;
    }
    [project.name.as_str(), project.description.as_str()]
        .into_iter()
        .any(|text| {
            tokenize(text)
                .windows(role_tokens.len())
                .any(|window| window == role_tokens.as_slice())
        })
}

fn tokenize(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|token| token.as_str().to_lowercase())
        .collect()
}
