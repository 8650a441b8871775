use serde::{Deserialize, Serialize};

/// Roles recognized in the identity provider's `role` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Moderator,
    Admin,
}

impl Role {
    /// Map a raw claim onto the closed role set. Absent or unknown claims are
    /// treated as `Guest`.
    pub fn from_claim(claim: Option<&str>) -> Self {
        let Some(raw) = claim else {
            return Role::Guest;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "guest" => Role::Guest,
            "moderator" => Role::Moderator,
            "admin" => Role::Admin,
            other => {
                tracing::warn!(role = %other, "Unknown role claim, treating as guest");
                Role::Guest
            }
        }
    }

    /// Moderators and admins may edit or remove any wish.
    pub fn can_moderate(self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }
}
