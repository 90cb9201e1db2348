use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
pub struct SignInData {
    pub signin: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNameExistsData {
    pub user_name_exists: UserNameExists,
}

#[derive(Debug, Deserialize)]
pub struct UserNameExists {
    pub exists: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalxeIdExistData {
    pub galxe_id_exist: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountData {
    pub create_new_account: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicUserInfoData {
    pub address_info: AddressInfo,
}

#[derive(Debug, Deserialize)]
pub struct AddressInfo {
    pub id: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct CampaignData {
    pub campaign: Campaign,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub campaign_type: Option<String>,
    #[serde(default)]
    pub recurring_type: Option<String>,
    #[serde(default)]
    pub loyalty_points: i64,
    #[serde(default)]
    pub claimed_loyalty_points: i64,
    #[serde(default)]
    pub whitelist_info: WhitelistInfo,
    #[serde(default)]
    pub credential_groups: Vec<CredentialGroup>,
    #[serde(default)]
    pub gamification: Option<Gamification>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistInfo {
    #[serde(default)]
    pub current_period_claimed_loyalty_points: i64,
    #[serde(default)]
    pub current_period_max_loyalty_points: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialGroup {
    #[serde(default)]
    pub claimed_loyalty_points: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Gamification {
    #[serde(rename = "type")]
    pub kind: String,
}

impl Campaign {
    fn is_parent(&self) -> bool {
        self.campaign_type.as_deref() == Some("Parent")
    }

    fn is_daily(&self) -> bool {
        self.recurring_type.as_deref() == Some("DAILY")
    }

    fn daily_points_claimed(&self) -> bool {
        if !self.is_daily() || self.is_parent() {
            return true;
        }

        let info = &self.whitelist_info;
        if info.current_period_claimed_loyalty_points < info.current_period_max_loyalty_points {
            return false;
        }
        if info.current_period_max_loyalty_points > 0 {
            return true;
        }

        self.credential_groups
            .iter()
            .all(|group| group.claimed_loyalty_points > 0)
    }

    fn points_claimed(&self) -> bool {
        let info = &self.whitelist_info;
        info.current_period_claimed_loyalty_points >= info.current_period_max_loyalty_points
            && self.claimed_loyalty_points >= self.loyalty_points
            && self.daily_points_claimed()
    }

    /// Whether nothing is left to claim for this address. Campaigns with an
    /// unknown gamification type are treated as claimable so a claim attempt
    /// is still made.
    pub fn is_already_claimed(&self) -> bool {
        match self.gamification.as_ref().map(|g| g.kind.as_str()) {
            None => true,
            Some("Points") => self.points_claimed(),
            Some(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points_campaign() -> Campaign {
        Campaign {
            campaign_type: Some("Drop".to_string()),
            recurring_type: Some("DAILY".to_string()),
            loyalty_points: 10,
            claimed_loyalty_points: 0,
            whitelist_info: WhitelistInfo {
                current_period_claimed_loyalty_points: 0,
                current_period_max_loyalty_points: 10,
            },
            gamification: Some(Gamification {
                kind: "Points".to_string(),
            }),
            ..Campaign::default()
        }
    }

    #[test]
    fn unclaimed_daily_campaign_is_claimable() {
        assert!(!points_campaign().is_already_claimed());
    }

    #[test]
    fn fully_claimed_campaign_is_done() {
        let mut campaign = points_campaign();
        campaign.claimed_loyalty_points = 10;
        campaign.whitelist_info.current_period_claimed_loyalty_points = 10;
        assert!(campaign.is_already_claimed());
    }

    #[test]
    fn campaign_without_gamification_has_nothing_to_claim() {
        let mut campaign = points_campaign();
        campaign.gamification = None;
        assert!(campaign.is_already_claimed());
    }

    #[test]
    fn zero_period_cap_falls_back_to_credential_groups() {
        let mut campaign = points_campaign();
        campaign.claimed_loyalty_points = 10;
        campaign.whitelist_info.current_period_max_loyalty_points = 0;
        campaign.credential_groups = vec![CredentialGroup {
            claimed_loyalty_points: 0,
        }];
        assert!(!campaign.is_already_claimed());

        campaign.credential_groups = vec![CredentialGroup {
            claimed_loyalty_points: 5,
        }];
        assert!(campaign.is_already_claimed());
    }

    #[test]
    fn parent_campaigns_skip_daily_accounting() {
        let mut campaign = points_campaign();
        campaign.campaign_type = Some("Parent".to_string());
        campaign.claimed_loyalty_points = 10;
        campaign.whitelist_info.current_period_claimed_loyalty_points = 10;
        assert!(campaign.is_already_claimed());
    }
}
