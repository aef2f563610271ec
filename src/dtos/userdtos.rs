use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::referralmodel::{ReferralOutcome, ReferralStats};

#[derive(Validate, Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteProfileDto {
    #[validate(length(max = 20, message = "Referral code is too long"))]
    pub referral_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCompletedDto {
    pub referral: ReferralOutcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralSummaryDto {
    pub referral_code: Option<String>,
    pub coin_earned: i32,
    #[serde(flatten)]
    pub stats: ReferralStats,
}
