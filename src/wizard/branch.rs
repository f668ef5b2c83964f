/// Registration branches
///
/// The three branch-affecting draft fields collapse into one tagged value so
/// that step plans, validators and payload shapes are looked up from a single
/// place instead of re-testing the raw fields everywhere.

use super::draft::{LawyerMode, LawyerWorkMode, RegistrationDraft, UserType};
use super::steps::StepPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Client,
    /// Lawyer listed on the marketplace
    Marketplace,
    /// Lawyer using the dashboard; work mode may not be chosen yet
    Dashboard(Option<LawyerWorkMode>),
}

impl Branch {
    /// Resolve the branch, or `None` while the choice is incomplete
    pub fn from_draft(draft: &RegistrationDraft) -> Option<Branch> {
        match (draft.user_type, draft.lawyer_mode) {
            (Some(UserType::Client), _) => Some(Branch::Client),
            (Some(UserType::Lawyer), Some(LawyerMode::Marketplace)) => Some(Branch::Marketplace),
            (Some(UserType::Lawyer), Some(LawyerMode::Dashboard)) => {
                Some(Branch::Dashboard(draft.lawyer_work_mode))
            }
            _ => None,
        }
    }

    pub fn plan(&self) -> StepPlan {
        StepPlan::for_branch(*self)
    }

    pub fn is_lawyer(&self) -> bool {
        !matches!(self, Branch::Client)
    }

    /// Whether branch selection can leave step 0
    pub fn is_ready(&self) -> bool {
        !matches!(self, Branch::Dashboard(None))
    }

    /// Phone is collected on the basic-info step for these branches
    pub fn collects_phone_with_identity(&self) -> bool {
        matches!(self, Branch::Client | Branch::Dashboard(_))
    }

    pub fn work_mode(&self) -> Option<LawyerWorkMode> {
        match self {
            Branch::Dashboard(mode) => *mode,
            _ => None,
        }
    }
}

/// Total numbered steps for the draft's branch
pub fn compute_total_steps(draft: &RegistrationDraft) -> usize {
    match Branch::from_draft(draft) {
        Some(branch) => branch.plan().total_steps(),
        None => StepPlan::FALLBACK_TOTAL,
    }
}
