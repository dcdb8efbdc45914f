//! Workspace admin grant and revoke.

use async_trait::async_trait;
use serde::Serialize;

use crate::{AccessAdmin, ApiError, PowerBiClient, http::check_response, segment};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupUserBody<'a> {
    email_address: &'a str,
    group_user_access_right: &'a str,
}

#[async_trait]
impl AccessAdmin for PowerBiClient {
    async fn grant_admin(&self, workspace_id: &str, user: &str) -> Result<(), ApiError> {
        let path = format!("admin/groups/{}/users", segment(workspace_id));
        let body = GroupUserBody {
            email_address: user,
            group_user_access_right: "Admin",
        };
        check_response(self.post(&path).json(&body).send().await?).await?;
        tracing::info!(workspace_id, user, "granted workspace admin");
        Ok(())
    }

    async fn revoke_admin(&self, workspace_id: &str, user: &str) -> Result<(), ApiError> {
        let path = format!(
            "admin/groups/{}/users/{}",
            segment(workspace_id),
            segment(user)
        );
        check_response(self.delete(&path).send().await?).await?;
        tracing::info!(workspace_id, user, "revoked workspace admin");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_body_shape() {
        let body = GroupUserBody {
            email_address: "ops@contoso.com",
            group_user_access_right: "Admin",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"emailAddress": "ops@contoso.com", "groupUserAccessRight": "Admin"})
        );
    }
}
